// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{heuristic, Position, Repository, RouteError};

/// Prefix shared by all entrance labels.
const ENTRANCE_PREFIX: &str = "entrance";

/// Finds all candidate [Positions](Position) of a location within a building.
///
/// Numeric locations (`"102"`) are looked up in the room index. Anything else
/// is matched case-insensitively against entrance labels, either verbatim
/// (`"Entrance A"`) or with the `entrance` prefix omitted (`"a"`).
///
/// Candidates are returned in the order they were loaded.
pub fn resolve_location(
    repo: &Repository,
    building: &str,
    location: &str,
) -> Result<Vec<Position>, RouteError> {
    let b = repo
        .get(building)
        .ok_or_else(|| RouteError::BuildingDataUnavailable(building.to_string()))?;

    let unresolved = || RouteError::UnresolvedLocation {
        building: building.to_string(),
        location: location.to_string(),
    };

    let location = location.trim();
    if location.is_empty() {
        return Err(unresolved());
    }

    let candidates: &[Position] = if location.bytes().all(|ch| ch.is_ascii_digit()) {
        match location.parse::<u32>() {
            Ok(room) => b.room_positions(room),
            Err(_) => &[],
        }
    } else {
        let label = location.to_lowercase();
        let found = b.entrance_positions(&label);
        if found.is_empty() && !label.starts_with(ENTRANCE_PREFIX) {
            b.entrance_positions(&format!("{} {}", ENTRANCE_PREFIX, label))
        } else {
            found
        }
    };

    if candidates.is_empty() {
        Err(unresolved())
    } else {
        Ok(candidates.to_vec())
    }
}

/// Picks the (start, goal) pair with the lowest [heuristic] value out of
/// all combinations of the provided candidates.
///
/// Ties are resolved in favor of the pair seen first, iterating over goals
/// for every start. Returns `None` if either slice is empty.
pub fn select_endpoints<'a>(
    starts: &'a [Position],
    goals: &'a [Position],
) -> Option<(&'a Position, &'a Position)> {
    let mut best: Option<(u64, &'a Position, &'a Position)> = None;

    for start in starts {
        for goal in goals {
            let cost = heuristic(start, goal);
            if best.map(|(best_cost, _, _)| cost < best_cost).unwrap_or(true) {
                best = Some((cost, start, goal));
            }
        }
    }

    best.map(|(_, start, goal)| (start, goal))
}
