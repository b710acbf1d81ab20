// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::grid::DIRECTIONS;
use crate::{Position, Repository};

/// An outgoing edge of the routing graph, tagged with the kind of movement.
///
/// All edges have the same cost of 1, regardless of their kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Step onto an adjacent free cell of the same grid.
    Grid(Position),

    /// Take a stairwell to another floor of the same building.
    Stair(Position),

    /// Walk through an entrance into another building (or floor).
    Portal(Position),
}

impl Edge {
    /// Returns the destination of the edge.
    pub fn to(&self) -> &Position {
        match self {
            Self::Grid(p) | Self::Stair(p) | Self::Portal(p) => p,
        }
    }

    pub fn into_position(self) -> Position {
        match self {
            Self::Grid(p) | Self::Stair(p) | Self::Portal(p) => p,
        }
    }
}

/// Generates all outgoing [Edges](Edge) from a [Position]: moves onto adjacent free
/// cells, followed by stair transitions, followed by entrance portals.
///
/// Positions on floors which are not loaded have no edges at all.
pub fn neighbors<'a>(repo: &'a Repository, at: &'a Position) -> impl Iterator<Item = Edge> + 'a {
    grid_edges(repo, at)
        .chain(stair_edges(repo, at))
        .chain(portal_edges(repo, at))
}

fn grid_edges<'a>(repo: &'a Repository, at: &'a Position) -> impl Iterator<Item = Edge> + 'a {
    let grid = repo.grid(at);
    DIRECTIONS.iter().filter_map(move |&(dr, dc)| {
        let (row, col) = (at.row + dr, at.col + dc);
        if grid?.is_free(row, col) {
            Some(Edge::Grid(at.with_cell(row, col)))
        } else {
            None
        }
    })
}

fn stair_edges<'a>(repo: &'a Repository, at: &'a Position) -> impl Iterator<Item = Edge> + 'a {
    repo.get(&at.building)
        .into_iter()
        .flat_map(move |b| b.stair_transitions(at.floor, at.row, at.col))
        .map(move |(floor, (row, col))| {
            Edge::Stair(Position {
                building: at.building.clone(),
                floor,
                row,
                col,
            })
        })
}

fn portal_edges<'a>(repo: &'a Repository, at: &'a Position) -> impl Iterator<Item = Edge> + 'a {
    repo.floor(&at.building, at.floor)
        .into_iter()
        .flat_map(|floor| floor.connections.iter())
        .filter(move |portal| repo.is_entrance(at, portal.local_entrance()))
        .filter_map(move |portal| match repo.portal_destination(portal) {
            Some(to) => Some(Edge::Portal(to.clone())),
            None => {
                log::trace!(
                    "{}: skipping connection to missing {:?} on {} F{}",
                    at,
                    portal.remote_entrance(),
                    portal.remote_building(),
                    portal.remote_floor(),
                );
                None
            }
        })
}
