// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Decoder for 2-D occupancy grids stored in the
//! [NumPy `.npy` format](https://numpy.org/doc/stable/reference/generated/numpy.lib.format.html).

use std::io::{self, Read};

use crate::Grid;

const MAGIC: &[u8; 6] = b"\x93NUMPY";
const MAX_HEADER_SIZE: usize = 1 << 20;

#[derive(Debug, thiserror::Error)]
pub enum NpyError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("not a .npy file (bad magic string)")]
    BadMagic,

    #[error("unsupported .npy version {0}.{1}")]
    UnsupportedVersion(u8, u8),

    #[error("malformed header: {0}")]
    BadHeader(&'static str),

    #[error("unsupported dtype: {0:?} (supported: b1, i1-i8, u1-u8, f4, f8)")]
    UnsupportedDtype(String),

    #[error("expected a 2-dimensional array, got {0} dimensions")]
    NotTwoDimensional(usize),

    #[error("array data is truncated")]
    Truncated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Bool,
    Int,
    Float,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Dtype {
    kind: Kind,
    size: usize,
    big_endian: bool,
}

impl Dtype {
    fn parse(descr: &str) -> Option<Self> {
        let mut chars = descr.chars();
        let big_endian = match chars.next()? {
            '>' => true,
            '<' | '|' | '=' => false,
            _ => return None,
        };
        let kind = match chars.next()? {
            'b' => Kind::Bool,
            'i' | 'u' => Kind::Int,
            'f' => Kind::Float,
            _ => return None,
        };
        let size: usize = chars.as_str().parse().ok()?;

        let valid = match kind {
            Kind::Bool => size == 1,
            Kind::Int => matches!(size, 1 | 2 | 4 | 8),
            Kind::Float => matches!(size, 4 | 8),
        };
        if valid {
            Some(Self {
                kind,
                size,
                big_endian,
            })
        } else {
            None
        }
    }

    /// Returns true if an element is considered blocked (nonzero).
    fn is_nonzero(&self, bytes: &[u8]) -> bool {
        match (self.kind, self.size) {
            (Kind::Float, 4) => {
                let raw: [u8; 4] = [bytes[0], bytes[1], bytes[2], bytes[3]];
                let v = if self.big_endian {
                    f32::from_be_bytes(raw)
                } else {
                    f32::from_le_bytes(raw)
                };
                v != 0.0
            }

            (Kind::Float, _) => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(&bytes[..8]);
                let v = if self.big_endian {
                    f64::from_be_bytes(raw)
                } else {
                    f64::from_le_bytes(raw)
                };
                v != 0.0
            }

            // Integer zero is all-zero bytes, regardless of the byte order
            _ => bytes.iter().any(|&b| b != 0),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Header {
    dtype: Dtype,
    fortran_order: bool,
    shape: Vec<usize>,
}

/// Returns the text following `'key':` in a Python dict literal.
fn dict_value<'a>(dict: &'a str, key: &str) -> Option<&'a str> {
    for quote in ['\'', '"'] {
        let needle = format!("{quote}{key}{quote}");
        if let Some(idx) = dict.find(&needle) {
            let rest = dict[idx + needle.len()..].trim_start();
            return rest.strip_prefix(':').map(str::trim_start);
        }
    }
    None
}

fn parse_header(header: &str) -> Result<Header, NpyError> {
    // 1. descr - a quoted dtype string
    let descr = dict_value(header, "descr").ok_or(NpyError::BadHeader("missing 'descr'"))?;
    let quote = descr
        .chars()
        .next()
        .filter(|&c| c == '\'' || c == '"')
        .ok_or(NpyError::BadHeader("'descr' is not a string"))?;
    let descr = &descr[1..];
    let descr = &descr[..descr
        .find(quote)
        .ok_or(NpyError::BadHeader("unterminated 'descr'"))?];
    let dtype = Dtype::parse(descr).ok_or_else(|| NpyError::UnsupportedDtype(descr.to_string()))?;

    // 2. fortran_order - a Python bool
    let fortran = dict_value(header, "fortran_order")
        .ok_or(NpyError::BadHeader("missing 'fortran_order'"))?;
    let fortran_order = if fortran.starts_with("True") {
        true
    } else if fortran.starts_with("False") {
        false
    } else {
        return Err(NpyError::BadHeader("'fortran_order' is not a bool"));
    };

    // 3. shape - a tuple of ints
    let shape = dict_value(header, "shape")
        .and_then(|s| s.strip_prefix('('))
        .and_then(|s| s.split_once(')'))
        .map(|(inner, _)| inner)
        .ok_or(NpyError::BadHeader("missing 'shape'"))?;
    let shape = shape
        .split(',')
        .map(str::trim)
        .filter(|dim| !dim.is_empty())
        .map(|dim| dim.trim_end_matches('L').parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| NpyError::BadHeader("'shape' is not a tuple of ints"))?;

    Ok(Header {
        dtype,
        fortran_order,
        shape,
    })
}

/// Reads an occupancy [Grid] from a `.npy` stream: zero elements are free,
/// any other value is blocked. Both C and Fortran memory orders are supported.
pub fn read_grid<R: Read>(mut reader: R) -> Result<Grid, NpyError> {
    let read_exact = |r: &mut R, buf: &mut [u8]| -> Result<(), NpyError> {
        r.read_exact(buf).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => NpyError::Truncated,
            _ => NpyError::Io(e),
        })
    };

    // 1. Magic string and version
    let mut preamble = [0u8; 8];
    read_exact(&mut reader, &mut preamble)?;
    if &preamble[..6] != MAGIC {
        return Err(NpyError::BadMagic);
    }

    // 2. Header length - u16 in version 1, u32 in versions 2 and 3
    let header_len = match (preamble[6], preamble[7]) {
        (1, _) => {
            let mut len = [0u8; 2];
            read_exact(&mut reader, &mut len)?;
            u16::from_le_bytes(len) as usize
        }
        (2 | 3, _) => {
            let mut len = [0u8; 4];
            read_exact(&mut reader, &mut len)?;
            u32::from_le_bytes(len) as usize
        }
        (major, minor) => return Err(NpyError::UnsupportedVersion(major, minor)),
    };
    if header_len > MAX_HEADER_SIZE {
        return Err(NpyError::BadHeader("header too large"));
    }

    // 3. Header dict
    let mut header = vec![0u8; header_len];
    read_exact(&mut reader, &mut header)?;
    let header = std::str::from_utf8(&header).map_err(|_| NpyError::BadHeader("not UTF-8"))?;
    let header = parse_header(header)?;

    let (rows, cols) = match header.shape[..] {
        [rows, cols] => (rows, cols),
        _ => return Err(NpyError::NotTwoDimensional(header.shape.len())),
    };

    // 4. Array data
    let size = rows
        .checked_mul(cols)
        .and_then(|n| n.checked_mul(header.dtype.size))
        .ok_or(NpyError::BadHeader("array too large"))?;
    // The declared size is untrusted, so the buffer only grows as data arrives
    let mut data = Vec::new();
    reader.by_ref().take(size as u64).read_to_end(&mut data)?;
    if data.len() != size {
        return Err(NpyError::Truncated);
    }

    let elem = header.dtype.size;
    let cells = (0..rows).flat_map(|r| (0..cols).map(move |c| (r, c))).map(|(r, c)| {
        let idx = if header.fortran_order {
            c * rows + r
        } else {
            r * cols + c
        };
        header.dtype.is_nonzero(&data[idx * elem..(idx + 1) * elem])
    });

    Grid::from_occupancy(rows, cols, cells).ok_or(NpyError::Truncated)
}
