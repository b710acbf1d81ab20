// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::Position;

/// Heuristic cost of changing floors, per floor.
pub const FLOOR_PENALTY: u64 = 10;

/// Heuristic cost of changing buildings.
pub const BUILDING_PENALTY: u64 = 1000;

/// Estimates the walking cost between two positions: Manhattan distance between
/// the cells, plus [FLOOR_PENALTY] for every floor of difference, plus
/// [BUILDING_PENALTY] when the buildings differ.
///
/// Every edge of the routing graph costs 1, including stair and portal jumps,
/// so this estimate can overshoot the true cost. A* guided by it is greedy
/// towards resolving floor and building changes early, and is not guaranteed
/// to return the shortest route.
///
/// The sum is computed in `u64`, so it can't overflow for any pair of `i32` coordinates.
pub fn heuristic(a: &Position, b: &Position) -> u64 {
    let building_penalty = if a.building != b.building {
        BUILDING_PENALTY
    } else {
        0
    };

    u64::from(a.row.abs_diff(b.row))
        + u64::from(a.col.abs_diff(b.col))
        + FLOOR_PENALTY * u64::from(a.floor.abs_diff(b.floor))
        + building_penalty
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_floor() {
        let a = Position::new("ne01", 1, 2, 3);
        let b = Position::new("ne01", 1, 7, 1);
        assert_eq!(heuristic(&a, &b), 7);
        assert_eq!(heuristic(&b, &a), 7);
        assert_eq!(heuristic(&a, &a), 0);
    }

    #[test]
    fn floor_and_building_penalties() {
        let a = Position::new("ne01", 1, 0, 0);
        let b = Position::new("ne01", -2, 1, 1);
        assert_eq!(heuristic(&a, &b), 2 + 30);

        let c = Position::new("ne02", 3, 0, 0);
        assert_eq!(heuristic(&a, &c), 20 + 1000);
    }

    #[test]
    fn extreme_coordinates() {
        let a = Position::new("ne01", 1, 0, i32::MIN);
        let b = Position::new("ne01", 1, 5, i32::MAX);
        assert_eq!(heuristic(&a, &b), 5 + u64::from(u32::MAX));

        let a = Position::new("ne01", i32::MIN, i32::MIN, i32::MIN);
        let b = Position::new("ne02", i32::MAX, i32::MAX, i32::MAX);
        let span = u64::from(u32::MAX);
        assert_eq!(heuristic(&a, &b), span + span + 10 * span + 1000);
    }
}
