// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{
    find_raw_path, resolve_location, select_endpoints, simplify_path, snap_to_free, AStarError,
    Position, Repository,
};

/// Error returned by [find_route].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("location {location:?} not found in building {building}")]
    UnresolvedLocation { building: String, location: String },

    #[error("no floor data available for building {0}")]
    BuildingDataUnavailable(String),

    #[error("no free cell near {0}")]
    NoFreeCell(Position),

    #[error("no path found")]
    NoPathFound,

    #[error("step limit exceeded")]
    StepLimitExceeded,
}

/// Result of a successful [find_route] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Free cell the route starts from, after snapping.
    pub start: Position,

    /// Free cell the route ends at, after snapping.
    pub goal: Position,

    /// Cell-by-cell path, as returned by [find_raw_path].
    pub raw: Vec<Position>,

    /// Simplified path, as returned by [simplify_path].
    pub waypoints: Vec<Position>,
}

fn ensure_building(repo: &Repository, building: &str) -> Result<(), RouteError> {
    match repo.get(building) {
        Some(b) if b.floors().next().is_some() => Ok(()),
        _ => Err(RouteError::BuildingDataUnavailable(building.to_string())),
    }
}

fn snap_endpoint(repo: &Repository, at: &Position) -> Result<Position, RouteError> {
    if repo.grid(at).is_none() {
        return Err(RouteError::BuildingDataUnavailable(at.building.to_string()));
    }

    let snapped = snap_to_free(repo, at);
    if repo.is_free(&snapped) {
        Ok(snapped)
    } else {
        Err(RouteError::NoFreeCell(at.clone()))
    }
}

/// Finds a walking route between two locations, each given as a
/// `(building code, location)` pair. See [resolve_location] for the accepted
/// location formats.
///
/// Out of all candidate positions of both locations, the pair closest according
/// to the [heuristic](crate::heuristic) is routed between. Both endpoints are
/// [snapped](snap_to_free) onto free cells before searching.
///
/// `step_limit` is passed through to [find_raw_path].
///
/// The [Repository] is only read, so any number of routes may be searched
/// concurrently over a shared reference.
pub fn find_route(
    repo: &Repository,
    start: (&str, &str),
    goal: (&str, &str),
    step_limit: usize,
) -> Result<Route, RouteError> {
    ensure_building(repo, start.0)?;
    ensure_building(repo, goal.0)?;

    let starts = resolve_location(repo, start.0, start.1)?;
    let goals = resolve_location(repo, goal.0, goal.1)?;
    let (start, goal) = select_endpoints(&starts, &goals).ok_or(RouteError::NoPathFound)?;
    log::debug!("routing between candidates {} and {}", start, goal);

    let start = snap_endpoint(repo, start)?;
    let goal = snap_endpoint(repo, goal)?;

    let raw = match find_raw_path(repo, &start, &goal, step_limit) {
        Ok(path) => path,
        Err(AStarError::StepLimitExceeded) => return Err(RouteError::StepLimitExceeded),
        Err(AStarError::InvalidReference(p)) => return Err(RouteError::NoFreeCell(p)),
    };
    if raw.is_empty() {
        return Err(RouteError::NoPathFound);
    }

    let waypoints = simplify_path(repo, &raw);
    log::debug!(
        "route {} -> {}: {} cells, {} waypoints",
        start,
        goal,
        raw.len(),
        waypoints.len()
    );

    Ok(Route {
        start,
        goal,
        raw,
        waypoints,
    })
}
