// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Walking routes inside multi-floor, multi-building indoor environments.
//!
//! Every floor of a [Building] is an occupancy [Grid] with named rooms, stairwells
//! and entrances on top. Stairwells connect floors of one building, while entrance
//! [Portals](Portal) connect buildings. Routing runs A* over the implicit graph of
//! [Positions](Position), then prunes the cell-by-cell result into waypoints using
//! line-of-sight checks.
//!
//! # Example
//!
//! ```no_run
//! let mut repo = floorpath::Repository::default();
//! let options = floorpath::map::Options::default();
//! floorpath::map::add_building_from_dir(&mut repo, &options, "floorPlans", "se06")
//!     .expect("failed to load building se06");
//!
//! let route = floorpath::find_route(
//!     &repo,
//!     ("se06", "102"),
//!     ("se06", "entrance a"),
//!     floorpath::DEFAULT_STEP_LIMIT,
//! )
//! .expect("failed to find route");
//!
//! println!("Waypoints: {:?}", route.waypoints);
//! ```

mod astar;
mod building;
pub mod c;
mod grid;
mod heuristic;
mod locate;
pub mod map;
mod neighbors;
mod route;
mod simplify;
mod snap;

#[cfg(test)]
mod testing;

use std::sync::Arc;

pub use astar::{find_raw_path, AStarError, DEFAULT_STEP_LIMIT};
pub use building::{Building, DanglingConnection, Floor, Portal, Repository};
pub use grid::{Grid, GridParseError};
pub use heuristic::{heuristic, BUILDING_PENALTY, FLOOR_PENALTY};
pub use locate::{resolve_location, select_endpoints};
pub use neighbors::{neighbors, Edge};
pub use route::{find_route, Route, RouteError};
pub use simplify::{line_of_sight, simplify_path};
pub use snap::snap_to_free;

/// Opaque building identifier, shared cheaply between all [Positions](Position)
/// of a building.
pub type BuildingCode = Arc<str>;

/// A single cell of the routing graph: a (row, col) grid cell on a specific floor
/// of a specific building.
///
/// Rows grow downwards and columns grow rightwards. Coordinates are signed,
/// as labels placed outside of the drawing bounds map to cells outside of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub building: BuildingCode,
    pub floor: i32,
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new<B: Into<BuildingCode>>(building: B, floor: i32, row: i32, col: i32) -> Self {
        Self {
            building: building.into(),
            floor,
            row,
            col,
        }
    }

    /// Returns a Position on the same building and floor, but at a different cell.
    pub fn with_cell(&self, row: i32, col: i32) -> Self {
        Self {
            building: self.building.clone(),
            floor: self.floor,
            row,
            col,
        }
    }

    /// Returns true if both positions lie on the same grid (same building and floor).
    pub fn same_map(&self, other: &Position) -> bool {
        self.floor == other.floor && self.building == other.building
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} F{} ({}, {})",
            self.building, self.floor, self.row, self.col
        )
    }
}

impl serde::Serialize for Position {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&*self.building, self.floor, self.row, self.col).serialize(serializer)
    }
}
