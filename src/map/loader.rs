// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::{Building, Floor, Grid, Portal};

use super::{
    model::{self, LabelKind},
    npy, Error, GridFormat, Options,
};

/// Helper object used for storing state related to converting a building's
/// floor plan directory into a [Building].
pub(super) struct BuildingLoader<'a> {
    options: &'a Options,
    dir: PathBuf,
    building: Building,
}

impl<'a> BuildingLoader<'a> {
    /// Creates a loader for a building directory, which must exist.
    pub(super) fn new(options: &'a Options, code: &str, dir: PathBuf) -> Result<Self, Error> {
        if !dir.is_dir() {
            return Err(Error::BuildingNotFound(dir));
        }

        Ok(Self {
            options,
            dir,
            building: Building::new(code),
        })
    }

    /// Loads all complete floors, returning the [Building].
    pub(super) fn load(mut self) -> Result<Building, Error> {
        for (number, path) in self.list_floors()? {
            self.add_floor(number, &path)?;
        }

        if self.building.floors().next().is_none() {
            return Err(Error::NoFloors(self.building.code().to_string()));
        }

        log::debug!(
            "loaded building {} with {} floor(s) from {}",
            self.building.code(),
            self.building.floors().count(),
            self.dir.display(),
        );
        Ok(self.building)
    }

    /// Lists `F<number>` subdirectories, ordered by the floor number.
    fn list_floors(&self) -> Result<Vec<(i32, PathBuf)>, Error> {
        let entries = fs::read_dir(&self.dir).map_err(|source| Error::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut floors = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| Error::Io {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            let name = entry.file_name();

            match name.to_str().and_then(model::parse_floor_name) {
                Some(number) if path.is_dir() => floors.push((number, path)),
                _ => log::debug!("{}: not a floor directory", path.display()),
            }
        }

        floors.sort_by_key(|&(number, _)| number);
        Ok(floors)
    }

    fn add_floor(&mut self, number: i32, dir: &Path) -> Result<(), Error> {
        // 1. Check that all required files are present
        let grid_file = self.options.grid_format.locate(dir);
        let labels_path = dir.join("labels.json");
        let meta_path = dir.join("meta.json");

        let (grid_path, format) = match grid_file {
            Some(found) if labels_path.is_file() && meta_path.is_file() => found,
            _ => {
                log::debug!("{}: incomplete floor, skipping", dir.display());
                return Ok(());
            }
        };

        // 2. Load the grid and the drawing transform
        let grid = read_grid(&grid_path, format)?;
        let meta: model::Meta = read_json(&meta_path)?;
        if !meta.is_valid() {
            return Err(Error::InvalidMeta(meta_path));
        }
        self.building.set_floor(number, Floor::new(grid));

        // 3. Index labels
        let labels: Vec<model::Label> = read_json(&labels_path)?;
        for label in labels {
            self.add_label(number, &meta, label);
        }

        // 4. Add connections
        let connections_path = dir.join("connections.json");
        if connections_path.is_file() {
            let connections: model::Connections = read_json(&connections_path)?;
            self.add_connections(number, connections);
        }

        Ok(())
    }

    fn add_label(&mut self, floor: i32, meta: &model::Meta, label: model::Label) {
        let (row, col) = meta.to_cell(label.x, label.y);
        let kind = LabelKind::classify(&label.label);

        if kind != LabelKind::Other {
            let in_bounds = self
                .building
                .floor(floor)
                .map(|f| f.grid.contains(row, col))
                .unwrap_or(false);
            if !in_bounds {
                log::warn!(
                    "{} F{}: label {:?} lies outside of the grid at ({}, {})",
                    self.building.code(),
                    floor,
                    label.label,
                    row,
                    col,
                );
            }
        }

        match kind {
            LabelKind::Stair(name) => {
                if let Some(prev) = self.building.add_stair(&name, floor, row, col) {
                    log::warn!(
                        "{} F{}: stairs {} appear more than once, replacing {:?} with {:?}",
                        self.building.code(),
                        floor,
                        name,
                        prev,
                        (row, col),
                    );
                }
            }

            LabelKind::Entrance(name) => self.building.add_entrance(&name, floor, row, col),

            LabelKind::Room(id) => self.building.add_room(id, floor, row, col),

            LabelKind::Other => {}
        }
    }

    fn add_connections(&mut self, floor: i32, c: model::Connections) {
        for (i, entrances) in c.connected_entrances.iter().enumerate() {
            let (local, remote) = match entrances.as_slice() {
                [local, remote] => (local, remote),
                _ => {
                    log::warn!(
                        "{} F{}: connection {} is not a [local, remote] pair",
                        self.building.code(),
                        floor,
                        i,
                    );
                    continue;
                }
            };

            let remote_building = c.connected_buildings.get(i);
            let remote_floor = c
                .connected_floors
                .get(i)
                .and_then(|f| model::parse_floor_name(f));

            match (remote_building, remote_floor) {
                (Some(b), Some(f)) => {
                    let b = b.trim().to_lowercase();
                    let portal = Portal::new(local, remote, b.as_str(), f);
                    self.building.add_portal(floor, portal);
                }

                _ => log::warn!(
                    "{} F{}: connection {} has no valid destination building or floor",
                    self.building.code(),
                    floor,
                    i,
                ),
            }
        }
    }
}

/// Opens a grid file and decodes it, taking care of decompression.
fn read_grid(path: &Path, format: GridFormat) -> Result<Grid, Error> {
    let f = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let b = io::BufReader::new(f);

    let result = match format {
        GridFormat::NpyGz => npy::read_grid(flate2::read::MultiGzDecoder::new(b)),
        GridFormat::NpyBz2 => npy::read_grid(bzip2::read::MultiBzDecoder::new(b)),
        GridFormat::Npy | GridFormat::Unknown => npy::read_grid(b),
    };

    result.map_err(|source| Error::Npy {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Error> {
    let f = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_reader(io::BufReader::new(f)).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}
