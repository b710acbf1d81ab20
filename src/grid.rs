// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use fixedbitset::FixedBitSet;

/// Offsets to the 4-connected neighbors of a cell, in the order in which
/// they are visited by both the router and the flood fill.
pub(crate) const DIRECTIONS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Occupancy grid of a single floor: every cell is either free or blocked.
///
/// Cells are stored in row-major order. Any coordinate outside of the grid
/// is considered blocked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    blocked: FixedBitSet,
}

/// Error returned when parsing a [Grid] from its textual representation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridParseError {
    #[error("row {row} has {got} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        got: usize,
        expected: usize,
    },

    #[error("invalid cell {0:?} (expected '.' or '#')")]
    InvalidCell(char),
}

impl Grid {
    /// Creates a grid of the provided dimensions with all cells free.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            blocked: FixedBitSet::with_capacity(rows * cols),
        }
    }

    /// Creates a grid from row-major occupancy values (`true` meaning blocked).
    ///
    /// Returns `None` if the iterator doesn't yield exactly `rows * cols` values.
    pub fn from_occupancy<I: IntoIterator<Item = bool>>(
        rows: usize,
        cols: usize,
        cells: I,
    ) -> Option<Self> {
        let mut g = Self::new(rows, cols);
        let mut count = 0;
        for blocked in cells {
            if count >= rows * cols {
                return None;
            }
            g.blocked.set(count, blocked);
            count += 1;
        }

        if count == rows * cols {
            Some(g)
        } else {
            None
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns true if the grid has no cells at all.
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Returns the row-major index of a cell, or `None` if it lies outside of the grid.
    pub(crate) fn index(&self, row: i32, col: i32) -> Option<usize> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        if row < self.rows && col < self.cols {
            Some(row * self.cols + col)
        } else {
            None
        }
    }

    /// Returns true if the cell lies within the grid bounds.
    pub fn contains(&self, row: i32, col: i32) -> bool {
        self.index(row, col).is_some()
    }

    /// Returns true if the cell lies within the grid and is not blocked.
    pub fn is_free(&self, row: i32, col: i32) -> bool {
        self.index(row, col)
            .map(|idx| !self.blocked.contains(idx))
            .unwrap_or(false)
    }

    /// Marks a cell as blocked or free. Out-of-bounds cells are ignored.
    pub fn set_blocked(&mut self, row: i32, col: i32, blocked: bool) {
        if let Some(idx) = self.index(row, col) {
            self.blocked.set(idx, blocked);
        }
    }

    /// Moves a cell onto the nearest cell within the grid bounds.
    ///
    /// Must not be called on an [empty](Grid::is_empty) grid.
    pub fn clamp(&self, row: i32, col: i32) -> (i32, i32) {
        debug_assert!(!self.is_empty());
        let max_row = i32::try_from(self.rows - 1).unwrap_or(i32::MAX);
        let max_col = i32::try_from(self.cols - 1).unwrap_or(i32::MAX);
        (row.clamp(0, max_row), col.clamp(0, max_col))
    }

    /// Returns the number of free cells in the grid.
    pub fn free_cells(&self) -> usize {
        self.rows * self.cols - self.blocked.count_ones(..)
    }
}

impl std::str::FromStr for Grid {
    type Err = GridParseError;

    /// Parses a grid drawn with `.` (free) and `#` (blocked) characters,
    /// one line per row. Blank lines and surrounding whitespace are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let rows = lines.len();
        let cols = lines.first().map(|line| line.chars().count()).unwrap_or(0);
        let mut g = Self::new(rows, cols);

        for (row, line) in lines.iter().enumerate() {
            let got = line.chars().count();
            if got != cols {
                return Err(GridParseError::RaggedRow {
                    row,
                    got,
                    expected: cols,
                });
            }

            for (col, ch) in line.chars().enumerate() {
                match ch {
                    '.' => {}
                    '#' => g.blocked.insert(row * cols + col),
                    other => return Err(GridParseError::InvalidCell(other)),
                }
            }
        }

        Ok(g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        let g: Grid = "
            ..#
            #..
        "
        .parse()
        .unwrap();

        assert_eq!(g.rows(), 2);
        assert_eq!(g.cols(), 3);
        assert!(g.is_free(0, 0));
        assert!(!g.is_free(0, 2));
        assert!(!g.is_free(1, 0));
        assert_eq!(g.free_cells(), 4);
    }

    #[test]
    fn parse_ragged() {
        let err = "...\n..".parse::<Grid>().unwrap_err();
        assert_eq!(
            err,
            GridParseError::RaggedRow {
                row: 1,
                got: 2,
                expected: 3
            }
        );
        assert_eq!(
            "..x".parse::<Grid>().unwrap_err(),
            GridParseError::InvalidCell('x')
        );
    }

    #[test]
    fn out_of_bounds_is_blocked() {
        let g = Grid::new(2, 2);
        assert!(g.is_free(1, 1));
        assert!(!g.is_free(-1, 0));
        assert!(!g.is_free(0, 2));
        assert!(!g.is_free(2, 0));
        assert!(!g.contains(0, -1));
    }

    #[test]
    fn from_occupancy() {
        let g = Grid::from_occupancy(2, 2, [false, true, true, false]).unwrap();
        assert!(g.is_free(0, 0));
        assert!(!g.is_free(0, 1));
        assert!(!g.is_free(1, 0));
        assert!(g.is_free(1, 1));

        assert!(Grid::from_occupancy(2, 2, [false; 3]).is_none());
        assert!(Grid::from_occupancy(2, 2, [false; 5]).is_none());
    }

    #[test]
    fn clamp() {
        let g = Grid::new(3, 4);
        assert_eq!(g.clamp(-5, 2), (0, 2));
        assert_eq!(g.clamp(7, 9), (2, 3));
        assert_eq!(g.clamp(1, 1), (1, 1));
    }
}
