// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::btree_map::{BTreeMap, Entry};

use crate::{BuildingCode, Grid, Position};

/// One-way connection from an entrance on the current floor to an entrance
/// of another building (or another floor).
///
/// Entrance labels are stored lower-cased, the same way as in the entrance index
/// of a [Building].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Portal {
    local_entrance: String,
    remote_entrance: String,
    remote_building: BuildingCode,
    remote_floor: i32,
}

impl Portal {
    pub fn new<B: Into<BuildingCode>>(
        local_entrance: &str,
        remote_entrance: &str,
        remote_building: B,
        remote_floor: i32,
    ) -> Self {
        Self {
            local_entrance: local_entrance.trim().to_lowercase(),
            remote_entrance: remote_entrance.trim().to_lowercase(),
            remote_building: remote_building.into(),
            remote_floor,
        }
    }

    pub fn local_entrance(&self) -> &str {
        &self.local_entrance
    }

    pub fn remote_entrance(&self) -> &str {
        &self.remote_entrance
    }

    pub fn remote_building(&self) -> &BuildingCode {
        &self.remote_building
    }

    pub fn remote_floor(&self) -> i32 {
        self.remote_floor
    }
}

/// Single floor of a [Building]: its occupancy grid and the ordered
/// list of connections to other buildings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Floor {
    pub grid: Grid,
    pub connections: Vec<Portal>,
}

impl Floor {
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            connections: Vec::default(),
        }
    }
}

/// All routing data of a single building: per-floor grids and connection tables,
/// together with the room, stair and entrance indices.
///
/// A Building is filled in once, when loading, and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Building {
    code: BuildingCode,
    floors: BTreeMap<i32, Floor>,
    rooms: BTreeMap<u32, Vec<Position>>,
    stairs: BTreeMap<String, BTreeMap<i32, (i32, i32)>>,
    entrances: BTreeMap<String, Vec<Position>>,
}

impl Building {
    pub fn new<B: Into<BuildingCode>>(code: B) -> Self {
        Self {
            code: code.into(),
            floors: BTreeMap::default(),
            rooms: BTreeMap::default(),
            stairs: BTreeMap::default(),
            entrances: BTreeMap::default(),
        }
    }

    pub fn code(&self) -> &BuildingCode {
        &self.code
    }

    /// Returns an iterator over all floors, ordered by floor number.
    pub fn floors(&self) -> impl Iterator<Item = (i32, &Floor)> {
        self.floors.iter().map(|(&number, floor)| (number, floor))
    }

    pub fn floor(&self, number: i32) -> Option<&Floor> {
        self.floors.get(&number)
    }

    pub fn floor_mut(&mut self, number: i32) -> Option<&mut Floor> {
        self.floors.get_mut(&number)
    }

    /// Creates or replaces a floor. Indices referring to this floor are preserved.
    pub fn set_floor(&mut self, number: i32, floor: Floor) {
        self.floors.insert(number, floor);
    }

    fn position(&self, floor: i32, row: i32, col: i32) -> Position {
        Position {
            building: self.code.clone(),
            floor,
            row,
            col,
        }
    }

    /// Records another labeled occurrence of a room.
    pub fn add_room(&mut self, id: u32, floor: i32, row: i32, col: i32) {
        let position = self.position(floor, row, col);
        self.rooms.entry(id).or_default().push(position);
    }

    /// Records the point of a stairwell on a specific floor.
    ///
    /// A stairwell has at most one point per floor; the previous point is replaced
    /// and returned.
    pub fn add_stair(&mut self, name: &str, floor: i32, row: i32, col: i32) -> Option<(i32, i32)> {
        self.stairs
            .entry(name.to_string())
            .or_default()
            .insert(floor, (row, col))
    }

    /// Records another physical point of an entrance. The label is matched case-insensitively.
    pub fn add_entrance(&mut self, label: &str, floor: i32, row: i32, col: i32) {
        let position = self.position(floor, row, col);
        self.entrances
            .entry(label.trim().to_lowercase())
            .or_default()
            .push(position);
    }

    /// Appends a connection to the connection table of a floor.
    /// Returns false if the floor doesn't exist.
    pub fn add_portal(&mut self, floor: i32, portal: Portal) -> bool {
        match self.floors.entry(floor) {
            Entry::Occupied(mut e) => {
                e.get_mut().connections.push(portal);
                true
            }
            Entry::Vacant(_) => false,
        }
    }

    /// Returns all labeled occurrences of a room, in the order they were added.
    pub fn room_positions(&self, id: u32) -> &[Position] {
        self.rooms
            .get(&id)
            .map(|p| p.as_slice())
            .unwrap_or_default()
    }

    /// Returns all points of an entrance (matched case-insensitively),
    /// in the order they were added.
    pub fn entrance_positions(&self, label: &str) -> &[Position] {
        let label = label.trim();
        let found = match self.entrances.get(label) {
            Some(positions) => Some(positions),
            None => self.entrances.get(&label.to_lowercase()),
        };
        found.map(|p| p.as_slice()).unwrap_or_default()
    }

    /// Returns the per-floor points of a stairwell.
    pub fn stair(&self, name: &str) -> Option<&BTreeMap<i32, (i32, i32)>> {
        self.stairs.get(name)
    }

    pub fn stair_names(&self) -> impl Iterator<Item = &str> {
        self.stairs.keys().map(String::as_str)
    }

    pub fn entrance_labels(&self) -> impl Iterator<Item = &str> {
        self.entrances.keys().map(String::as_str)
    }

    /// Returns every (floor, cell) reachable by taking a stairwell
    /// whose point on `floor` is exactly at (`row`, `col`).
    pub fn stair_transitions(
        &self,
        floor: i32,
        row: i32,
        col: i32,
    ) -> impl Iterator<Item = (i32, (i32, i32))> + '_ {
        self.stairs
            .values()
            .filter(move |points| points.get(&floor) == Some(&(row, col)))
            .flat_map(move |points| {
                points
                    .iter()
                    .filter(move |&(&other, _)| other != floor)
                    .map(|(&other, &cell)| (other, cell))
            })
    }
}

/// A connection whose remote entrance can't be found in the remote building.
///
/// Such connections are skipped during routing and only reported as a
/// data-quality warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingConnection {
    pub building: BuildingCode,
    pub floor: i32,
    pub portal: Portal,
}

impl std::fmt::Display for DanglingConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} F{}: {:?} connects to {:?}, which does not exist on {} F{}",
            self.building,
            self.floor,
            self.portal.local_entrance,
            self.portal.remote_entrance,
            self.portal.remote_building,
            self.portal.remote_floor,
        )
    }
}

impl std::error::Error for DanglingConnection {}

/// Collection of all loaded [Buildings](Building), keyed by their code.
///
/// A Repository is read-only while routing, so it can be shared (by reference)
/// between any number of concurrent route searches.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Repository(BTreeMap<BuildingCode, Building>);

impl Repository {
    /// Returns the number of buildings in the repository.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over all [Buildings](Building), ordered by their code.
    pub fn iter(&self) -> impl Iterator<Item = &Building> {
        self.0.values()
    }

    /// Adds a [Building], replacing any previous building with the same code.
    pub fn insert(&mut self, building: Building) {
        self.0.insert(building.code.clone(), building);
    }

    pub fn get(&self, code: &str) -> Option<&Building> {
        self.0.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.contains_key(code)
    }

    /// Retrieves the [Floor] of a building.
    pub fn floor(&self, building: &str, floor: i32) -> Option<&Floor> {
        self.get(building).and_then(|b| b.floor(floor))
    }

    /// Retrieves the [Grid] on which a [Position] lies.
    pub fn grid(&self, at: &Position) -> Option<&Grid> {
        self.floor(&at.building, at.floor).map(|f| &f.grid)
    }

    /// Returns true if the [Position] is a free cell of a loaded grid.
    pub fn is_free(&self, at: &Position) -> bool {
        self.grid(at)
            .map(|g| g.is_free(at.row, at.col))
            .unwrap_or(false)
    }

    /// Returns true if the [Position] is one of the points of a specific entrance.
    pub fn is_entrance(&self, at: &Position, label: &str) -> bool {
        self.get(&at.building)
            .map(|b| b.entrance_positions(label).contains(at))
            .unwrap_or(false)
    }

    /// Finds the destination of a [Portal]: the first point of the remote entrance
    /// on the remote floor. Returns `None` for dangling connections.
    pub fn portal_destination(&self, portal: &Portal) -> Option<&Position> {
        self.get(&portal.remote_building)?
            .entrance_positions(&portal.remote_entrance)
            .iter()
            .find(|p| p.building == portal.remote_building && p.floor == portal.remote_floor)
    }

    /// Lists all connections (across all buildings) whose destination is missing.
    pub fn dangling_connections(&self) -> Vec<DanglingConnection> {
        self.0
            .values()
            .flat_map(|b| {
                b.floors().flat_map(move |(number, floor)| {
                    floor.connections.iter().map(move |portal| (b, number, portal))
                })
            })
            .filter(|(_, _, portal)| self.portal_destination(portal).is_none())
            .map(|(b, number, portal)| DanglingConnection {
                building: b.code.clone(),
                floor: number,
                portal: portal.clone(),
            })
            .collect()
    }
}
