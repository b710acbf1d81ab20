// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::Position;

/// Recommended number of allowed node expansions in [find_raw_path](crate::find_raw_path)
/// and [find_route](crate::find_route) before [AStarError::StepLimitExceeded] is returned.
pub const DEFAULT_STEP_LIMIT: usize = 1_000_000;

/// Error conditions which may occur during [find_raw_path](crate::find_raw_path).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AStarError {
    /// The start or goal position doesn't lie on any loaded grid.
    InvalidReference(Position),

    /// Route search has exceeded its limit of steps.
    /// Either the positions are really far apart, or no route exists.
    ///
    /// Concluding that no route exists requires expanding every reachable cell,
    /// which on large floor plans can take a long time. The step limit protects
    /// against resource exhaustion.
    StepLimitExceeded,
}

impl std::fmt::Display for AStarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidReference(at) => write!(f, "position outside of any loaded grid: {}", at),
            Self::StepLimitExceeded => write!(f, "step limit exceeded"),
        }
    }
}

impl std::error::Error for AStarError {}
