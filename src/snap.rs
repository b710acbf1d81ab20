// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::VecDeque;

use fixedbitset::FixedBitSet;

use crate::grid::DIRECTIONS;
use crate::{Position, Repository};

/// Moves a [Position] onto the nearest free cell of its grid.
///
/// Free positions are returned unchanged. Positions outside of the grid bounds
/// are first clamped onto the grid. Blocked positions are repaired with a
/// breadth-first flood fill over 4-connected cells, returning the first free cell
/// discovered (ties are resolved by visitation order, up-down-left-right).
///
/// If the grid has no free cell at all, or the floor isn't loaded,
/// the input position is returned as-is. Callers must check
/// [Repository::is_free] on the result.
pub fn snap_to_free(repo: &Repository, at: &Position) -> Position {
    let grid = match repo.grid(at) {
        Some(g) if !g.is_empty() => g,
        _ => return at.clone(),
    };

    let (row, col) = grid.clamp(at.row, at.col);
    if grid.is_free(row, col) {
        return at.with_cell(row, col);
    }

    let mut queue: VecDeque<(i32, i32)> = VecDeque::from([(row, col)]);
    let mut seen = FixedBitSet::with_capacity(grid.rows() * grid.cols());
    if let Some(idx) = grid.index(row, col) {
        seen.insert(idx);
    }

    while let Some((r, c)) = queue.pop_front() {
        for (dr, dc) in DIRECTIONS {
            let (nr, nc) = (r + dr, c + dc);
            let idx = match grid.index(nr, nc) {
                Some(idx) => idx,
                None => continue,
            };

            if seen.put(idx) {
                continue;
            }

            if grid.is_free(nr, nc) {
                log::debug!("snapped {} to free cell ({}, {})", at, nr, nc);
                return at.with_cell(nr, nc);
            }
            queue.push_back((nr, nc));
        }
    }

    log::debug!("no free cell to snap {} to", at);
    at.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{building, repository};

    fn walled_repo() -> Repository {
        repository([building(
            "ne01",
            &[
                (
                    1,
                    "
                    ......
                    .####.
                    .####.
                    .####.
                    ......
                    ",
                ),
                (2, "###\n###"),
            ],
        )])
    }

    #[test]
    fn free_positions_are_unchanged() {
        let repo = walled_repo();
        for row in 0..5 {
            for col in 0..6 {
                let at = Position::new("ne01", 1, row, col);
                if repo.is_free(&at) {
                    assert_eq!(snap_to_free(&repo, &at), at);
                }
            }
        }
    }

    #[test]
    fn snaps_to_nearest_in_visit_order() {
        let repo = walled_repo();

        // (1, 1) touches (0, 1) going up first
        let at = Position::new("ne01", 1, 1, 1);
        assert_eq!(snap_to_free(&repo, &at), Position::new("ne01", 1, 0, 1));

        // (2, 2) is two steps from the ring; the up-first flood reaches (0, 2)
        let at = Position::new("ne01", 1, 2, 2);
        assert_eq!(snap_to_free(&repo, &at), Position::new("ne01", 1, 0, 2));

        // (2, 4) reaches (2, 5) on its first ring, before anything else
        let at = Position::new("ne01", 1, 2, 4);
        assert_eq!(snap_to_free(&repo, &at), Position::new("ne01", 1, 2, 5));
    }

    #[test]
    fn clamps_out_of_bounds() {
        let repo = walled_repo();
        let at = Position::new("ne01", 1, -3, 40);
        assert_eq!(snap_to_free(&repo, &at), Position::new("ne01", 1, 0, 5));
    }

    #[test]
    fn fully_blocked_grid() {
        let repo = walled_repo();
        let at = Position::new("ne01", 2, 1, 1);
        let snapped = snap_to_free(&repo, &at);
        assert_eq!(snapped, at);
        assert!(!repo.is_free(&snapped));
    }

    #[test]
    fn unknown_floor() {
        let repo = walled_repo();
        let at = Position::new("ne01", 3, 1, 1);
        assert_eq!(snap_to_free(&repo, &at), at);
    }
}
