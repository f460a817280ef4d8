// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! Geometric delay tables for seismic array processing.
//!
//! This library describes source and receiver geometries as grids anchored
//! on a spherical earth model (regular cartesian grids, unstructured station
//! lists, and grids in slowness space) and computes the full matrix of
//! travel-time delays between every source node and every receiver node,
//! using either a plane-wave or a constant-velocity spherical-wave model.
//! Node coordinates and delay matrices are computed lazily and cached.

#![warn(missing_docs)]

/// Loading delay tables from JSON configuration.
pub mod config;
/// Coordinate systems, axis generation and the grid trait.
pub mod core;
/// Delay methods and the delay table.
pub mod delays;
/// Error types for the library.
pub mod error;
/// File I/O for coordinate lists and delay matrices.
pub mod io;
/// Geographic point with a cartesian offset.
pub mod location;
/// Grids anchored at geographic locations.
pub mod location_grid;
/// Spherical earth geometry.
pub mod orthodrome;
/// Grids in slowness space.
pub mod slowness_grid;

pub use crate::config::DelayTableConfig;
pub use crate::core::{CoordinateSystem, Grid, GridSnap};
pub use crate::delays::{
    shared, DelayMethod, GenericDelayTable, PlaneWaveDM, SharedGrid, SphericalWaveDM,
};
pub use crate::error::{GatoError, Result};
pub use crate::location::Location;
pub use crate::location_grid::{CartesianLocationGrid, UnstructuredLocationGrid};
pub use crate::slowness_grid::CartesianSlownessGrid;
