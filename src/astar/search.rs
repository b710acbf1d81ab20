// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::{heuristic, neighbors, AStarError, Position, Repository};

#[derive(Debug, Clone)]
struct QueueItem {
    at: Position,
    cost: u32,
    score: u64,
    seq: u64,
}

impl QueueItem {
    #[inline]
    fn key(&self) -> (u64, u32, u64) {
        (self.score, self.cost, self.seq)
    }
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for QueueItem {}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // NOTE: We revert the order of comparison,
        // as lower scores are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap.
        other.key().cmp(&self.key())
    }
}

fn reconstruct_path(came_from: &HashMap<Position, Position>, mut last: Position) -> Vec<Position> {
    let mut path = vec![last.clone()];

    while let Some(p) = came_from.get(&last) {
        path.push(p.clone());
        last = p.clone();
    }

    path.reverse();
    return path;
}

/// Uses the [A* algorithm](https://en.wikipedia.org/wiki/A*_search_algorithm)
/// to find a cell-by-cell path between two positions, moving over free cells,
/// stairwells and entrance portals (see [neighbors](crate::neighbors)).
///
/// Returns an empty vector if there is no path between the two positions.
///
/// The search is guided by [heuristic](crate::heuristic), which overestimates
/// the cost of floor and building changes. The returned path is therefore a good,
/// but not necessarily the shortest, path.
///
/// Queue ties are broken by lower cost-so-far and then by insertion order,
/// so results are deterministic.
///
/// `step_limit` limits how many positions may be expanded during the search
/// before returning [AStarError::StepLimitExceeded]. Concluding that no path exists
/// requires expanding all positions reachable from the start. The recommended value is
/// [DEFAULT_STEP_LIMIT](crate::DEFAULT_STEP_LIMIT).
pub fn find_raw_path(
    repo: &Repository,
    from: &Position,
    to: &Position,
    step_limit: usize,
) -> Result<Vec<Position>, AStarError> {
    for p in [from, to] {
        let on_grid = repo
            .grid(p)
            .map(|g| g.contains(p.row, p.col))
            .unwrap_or(false);
        if !on_grid {
            return Err(AStarError::InvalidReference(p.clone()));
        }
    }

    let mut queue: BinaryHeap<QueueItem> = BinaryHeap::default();
    let mut came_from: HashMap<Position, Position> = HashMap::default();
    let mut known_costs: HashMap<Position, u32> = HashMap::default();
    let mut closed: HashSet<Position> = HashSet::default();
    let mut seq: u64 = 0;
    let mut steps: usize = 0;

    queue.push(QueueItem {
        at: from.clone(),
        cost: 0,
        score: heuristic(from, to),
        seq,
    });
    known_costs.insert(from.clone(), 0);

    while let Some(item) = queue.pop() {
        // Stale queue entries are kept instead of being updated in place
        if closed.contains(&item.at) {
            continue;
        }

        if item.at == *to {
            log::debug!("A* reached {} after {} expansions", to, steps);
            return Ok(reconstruct_path(&came_from, item.at));
        }

        steps += 1;
        if steps > step_limit {
            return Err(AStarError::StepLimitExceeded);
        }

        for edge in neighbors(repo, &item.at) {
            let neighbor = edge.into_position();

            // Check if this is the cheapest way to the neighbor
            let neighbor_cost = item.cost + 1;
            if neighbor_cost >= known_costs.get(&neighbor).cloned().unwrap_or(u32::MAX) {
                continue;
            }

            // Push the new item into the queue
            seq += 1;
            let score = u64::from(neighbor_cost) + heuristic(&neighbor, to);
            came_from.insert(neighbor.clone(), item.at.clone());
            known_costs.insert(neighbor.clone(), neighbor_cost);
            queue.push(QueueItem {
                at: neighbor,
                cost: neighbor_cost,
                score,
                seq,
            });
        }

        closed.insert(item.at);
    }

    log::debug!(
        "A* exhausted the open set after {} expansions without reaching {}",
        steps,
        to
    );
    return Ok(vec![]);
}
