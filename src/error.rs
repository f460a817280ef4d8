// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Errors that can occur during grid setup, coordinate generation, delay
/// computation, or I/O.
#[derive(Debug, Error)]
pub enum GatoError {
    /// The grid type cannot produce nodes in the requested coordinate system.
    #[error("coordinate system not supported for {grid}: {system}")]
    UnsupportedCoordinateSystem {
        /// Name of the grid type.
        grid: &'static str,
        /// The requested system.
        system: String,
    },
    /// The coordinate system name is not known at all.
    #[error("unknown coordinate system: {0}")]
    UnknownCoordinateSystem(String),
    /// Axis spacing is not positive and finite.
    #[error("invalid grid spacing on axis {axis}: {delta} (must be positive and finite)")]
    InvalidGridSpacing {
        /// The axis name.
        axis: &'static str,
        /// The spacing provided.
        delta: f64,
    },
    /// Axis maximum is below its minimum.
    #[error("invalid range on axis {axis}: [{min}, {max}]")]
    InvalidAxisRange {
        /// The axis name.
        axis: &'static str,
        /// Axis minimum.
        min: f64,
        /// Axis maximum.
        max: f64,
    },
    /// Axis range is not an integer multiple of the spacing (exact snapping).
    #[error("axis {axis} range [{min}, {max}] is not a multiple of spacing {delta}")]
    InexactGridSpacing {
        /// The axis name.
        axis: &'static str,
        /// Axis minimum.
        min: f64,
        /// Axis maximum.
        max: f64,
        /// Axis spacing.
        delta: f64,
    },
    /// The axis spacing is so small that the node count is out of range.
    #[error("axis {axis} would have {nodes} nodes (at most {max} allowed)", max = crate::core::MAX_AXIS_NODES)]
    TooManyNodes {
        /// The axis name.
        axis: &'static str,
        /// Requested node count (may be infinite).
        nodes: f64,
    },
    /// Nodes were requested before `update()` was called.
    #[error("{0} has not been updated; call update() before querying nodes")]
    GridNotUpdated(&'static str),
    /// Wave velocity is not positive and finite.
    #[error("invalid velocity: {0} (must be positive and finite)")]
    InvalidVelocity(f64),
    /// A per-node delay correction does not match the grid size.
    #[error("{which} delay corrections have length {got}, grid has {expected} nodes")]
    CorrectionLengthMismatch {
        /// Either "source" or "receiver".
        which: &'static str,
        /// The grid size.
        expected: usize,
        /// The correction vector length.
        got: usize,
    },
    /// Array shape does not match expected shape.
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// The expected shape (0 stands for any length).
        expected: Vec<usize>,
        /// The actual shape encountered.
        got: Vec<usize>,
    },
    /// The operation needs at least one node.
    #[error("grid has no nodes")]
    EmptyGrid,
    /// Unsupported data type in file.
    #[error("unsupported dtype: {0}")]
    UnsupportedDtype(String),
    /// Unsupported file format (unrecognized extension).
    #[error("unsupported file format: {0}")]
    UnsupportedFileFormat(String),
    /// Expected MAT variable not found in file.
    #[error("MAT variable '{expected}' not found; available variables: {available:?}")]
    MatVariableNotFound {
        /// The variable name that was requested.
        expected: String,
        /// The variable names that are available.
        available: Vec<String>,
    },
    /// Delay table setup file is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Other error with a descriptive message.
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results with GatoError.
pub type Result<T> = std::result::Result<T, GatoError>;
