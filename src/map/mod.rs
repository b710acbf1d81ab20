// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Loading [Buildings](Building) from preprocessed floor plan directories.
//!
//! Every building lives under `<base>/<code[..2]>/<code[2..]>/`, e.g. `floorPlans/se/06/`
//! for building `se06`. Each floor is a `F<number>` subdirectory containing:
//!
//! - `floorplan_grid.npy` - 2-D occupancy grid, zero meaning a free cell,
//!   optionally compressed as `floorplan_grid.npy.gz` or `floorplan_grid.npy.bz2`,
//! - `meta.json` - `min_x`, `max_y` and `cell_size` of the drawing,
//! - `labels.json` - list of `{"label", "x", "y"}` objects in drawing coordinates,
//! - `connections.json` (optional) - entrances leading to other buildings.
//!
//! Floors missing any of the required files are skipped.

use std::collections::{BTreeSet, VecDeque};
use std::path::{Path, PathBuf};

use crate::{Building, Repository};

mod loader;
mod model;
mod npy;

pub use npy::{read_grid, NpyError};

/// Format of the floor grid files
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum GridFormat {
    /// Use whichever grid file is present, trying `.npy`, `.npy.gz` and `.npy.bz2` in order
    #[default]
    Unknown,

    /// Force uncompressed `floorplan_grid.npy`
    Npy,

    /// Force `floorplan_grid.npy.gz` with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    NpyGz,

    /// Force `floorplan_grid.npy.bz2` with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    NpyBz2,
}

impl GridFormat {
    const PROBE_ORDER: [GridFormat; 3] = [GridFormat::Npy, GridFormat::NpyGz, GridFormat::NpyBz2];

    fn file_name(self) -> Option<&'static str> {
        match self {
            GridFormat::Unknown => None,
            GridFormat::Npy => Some("floorplan_grid.npy"),
            GridFormat::NpyGz => Some("floorplan_grid.npy.gz"),
            GridFormat::NpyBz2 => Some("floorplan_grid.npy.bz2"),
        }
    }

    /// Finds the grid file inside a floor directory, returning its path
    /// and the concrete format.
    fn locate(self, floor_dir: &Path) -> Option<(PathBuf, GridFormat)> {
        let candidates: &[GridFormat] = match self {
            GridFormat::Unknown => &Self::PROBE_ORDER,
            _ => std::slice::from_ref(&self),
        };

        candidates.iter().find_map(|&format| {
            let path = floor_dir.join(format.file_name()?);
            if path.is_file() {
                Some((path, format))
            } else {
                None
            }
        })
    }
}

/// Additional controls for loading floor plan directories.
#[derive(Debug, Default, Clone)]
pub struct Options {
    /// Format of the occupancy grid files.
    pub grid_format: GridFormat,
}

/// Error returned when a building can't be loaded.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid building code: {0:?}")]
    InvalidBuildingCode(String),

    #[error("building directory not found: {}", .0.display())]
    BuildingNotFound(PathBuf),

    #[error("building {0} has no usable floors")]
    NoFloors(String),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{}: {source}", path.display())]
    Npy {
        path: PathBuf,
        #[source]
        source: NpyError,
    },

    #[error("{}: invalid drawing transform", .0.display())]
    InvalidMeta(PathBuf),
}

/// Returns the directory holding all floors of a building.
///
/// Codes must be at least 3 ASCII alphanumeric characters; the first two
/// select the campus area directory and the rest the building directory.
pub fn building_dir<P: AsRef<Path>>(base: P, code: &str) -> Result<PathBuf, Error> {
    if code.len() < 3 || !code.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(Error::InvalidBuildingCode(code.to_string()));
    }
    Ok(base.as_ref().join(&code[..2]).join(&code[2..]))
}

/// Loads a single [Building] from its floor plan directory.
///
/// The building code is lower-cased, and all [Positions](crate::Position) of the
/// building use the lower-cased code.
pub fn load_building<P: AsRef<Path>>(
    options: &Options,
    base: P,
    code: &str,
) -> Result<Building, Error> {
    let code = code.trim().to_lowercase();
    let dir = building_dir(base, &code)?;
    loader::BuildingLoader::new(options, &code, dir)?.load()
}

/// Loads a [Building] from its floor plan directory into a [Repository],
/// replacing any building with the same code.
pub fn add_building_from_dir<P: AsRef<Path>>(
    repo: &mut Repository,
    options: &Options,
    base: P,
    code: &str,
) -> Result<(), Error> {
    let b = load_building(options, base, code)?;
    repo.insert(b);
    Ok(())
}

/// Loads the requested buildings into a [Repository], followed by every building
/// reachable through their connection tables (transitively).
///
/// Failure to load any of the requested buildings is an error, while referenced buildings
/// which can't be loaded are only logged, leaving their connections dangling.
/// Buildings already present in the repository are not reloaded.
pub fn load_with_connections<P: AsRef<Path>>(
    repo: &mut Repository,
    options: &Options,
    base: P,
    codes: &[&str],
) -> Result<(), Error> {
    let base = base.as_ref();
    let mut queue: VecDeque<(String, bool)> = codes
        .iter()
        .map(|code| (code.trim().to_lowercase(), true))
        .collect();
    let mut attempted: BTreeSet<String> = BTreeSet::default();

    while let Some((code, requested)) = queue.pop_front() {
        if !attempted.insert(code.clone()) {
            continue;
        }

        if !repo.contains(&code) {
            match load_building(options, base, &code) {
                Ok(b) => repo.insert(b),
                Err(e) if requested => return Err(e),
                Err(e) => {
                    log::warn!("failed to load connected building {}: {}", code, e);
                    continue;
                }
            }
        }

        if let Some(b) = repo.get(&code) {
            for (_, floor) in b.floors() {
                for portal in &floor.connections {
                    let remote = portal.remote_building().to_string();
                    if !attempted.contains(&remote) {
                        queue.push_back((remote, false));
                    }
                }
            }
        }
    }

    Ok(())
}

impl Repository {
    /// Loads a [Building] from its floor plan directory, see [add_building_from_dir].
    pub fn load_building<P: AsRef<Path>>(
        &mut self,
        base: P,
        code: &str,
        options: &Options,
    ) -> Result<(), Error> {
        add_building_from_dir(self, options, base, code)
    }
}
