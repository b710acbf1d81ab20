// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use serde::Deserialize;

/// Contents of `meta.json`: the affine transform from drawing coordinates to grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub(super) struct Meta {
    pub min_x: f64,
    pub max_y: f64,
    pub cell_size: f64,
}

impl Meta {
    pub fn is_valid(&self) -> bool {
        self.min_x.is_finite()
            && self.max_y.is_finite()
            && self.cell_size.is_finite()
            && self.cell_size > 0.0
    }

    /// Converts drawing coordinates into a (row, col) cell, truncating towards zero.
    pub fn to_cell(&self, x: f64, y: f64) -> (i32, i32) {
        let col = ((x - self.min_x) / self.cell_size).trunc() as i32;
        let row = ((self.max_y - y) / self.cell_size).trunc() as i32;
        (row, col)
    }
}

/// Single entry of `labels.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(super) struct Label {
    pub label: String,
    pub x: f64,
    pub y: f64,
}

/// Contents of `connections.json`: parallel arrays describing entrances
/// leading out of the floor.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct Connections {
    #[serde(default)]
    pub connected_entrances: Vec<Vec<String>>,

    #[serde(default)]
    pub connected_buildings: Vec<String>,

    #[serde(default)]
    pub connected_floors: Vec<String>,
}

/// Meaning of a label placed on a floor plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum LabelKind {
    /// `stairs …`, named by the last word, upper-cased.
    Stair(String),

    /// `entrance …`, keyed by the whole (lower-cased) label.
    Entrance(String),

    /// Numeric room identifier.
    Room(u32),

    Other,
}

impl LabelKind {
    pub fn classify(label: &str) -> Self {
        let label = label.trim().to_lowercase();

        if label.starts_with("stairs") {
            let name = label.split_whitespace().last().unwrap_or_default();
            Self::Stair(name.to_uppercase())
        } else if label.starts_with("entrance") {
            Self::Entrance(label)
        } else {
            let digits: String = label.chars().filter(|c| !c.is_whitespace()).collect();
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                digits.parse().map(Self::Room).unwrap_or(Self::Other)
            } else {
                Self::Other
            }
        }
    }
}

/// Parses floor names of the form `F<number>`, as used by both
/// floor directories and `connectedFloors`.
pub(super) fn parse_floor_name(name: &str) -> Option<i32> {
    let name = name.trim();
    let number = name.strip_prefix('F').or_else(|| name.strip_prefix('f'))?;
    number.parse().ok()
}
