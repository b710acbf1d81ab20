// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Fixtures shared by unit tests.

use crate::{Building, Floor, Grid, Repository};

/// Creates a [Building] with one floor per `(number, map)` pair,
/// maps drawn with `.` and `#` as accepted by [Grid]'s `FromStr`.
pub(crate) fn building(code: &str, floors: &[(i32, &str)]) -> Building {
    let mut b = Building::new(code);
    for &(number, map) in floors {
        let grid: Grid = map.parse().expect("invalid test map");
        b.set_floor(number, Floor::new(grid));
    }
    b
}

pub(crate) fn repository<I: IntoIterator<Item = Building>>(buildings: I) -> Repository {
    let mut repo = Repository::default();
    for b in buildings {
        repo.insert(b);
    }
    repo
}

/// An all-free square floor.
pub(crate) fn open_floor(size: usize) -> String {
    let row = ".".repeat(size);
    vec![row; size].join("\n")
}

/// Encodes a map drawn with `.` and `#` as a version 1.0 `.npy` file
/// holding a `<i8` array, the way `numpy.save` writes integer grids.
pub(crate) fn npy(map: &str) -> Vec<u8> {
    let grid: Grid = map.parse().expect("invalid test map");

    let mut header = format!(
        "{{'descr': '<i8', 'fortran_order': False, 'shape': ({}, {}), }}",
        grid.rows(),
        grid.cols()
    );
    while (10 + header.len() + 1) % 64 != 0 {
        header.push(' ');
    }
    header.push('\n');

    let mut out = b"\x93NUMPY\x01\x00".to_vec();
    out.extend_from_slice(&(header.len() as u16).to_le_bytes());
    out.extend_from_slice(header.as_bytes());
    for row in 0..grid.rows() as i32 {
        for col in 0..grid.cols() as i32 {
            let v: i64 = if grid.is_free(row, col) { 0 } else { 1 };
            out.extend_from_slice(&v.to_le_bytes());
        }
    }
    out
}
