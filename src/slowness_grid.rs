// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::cell::OnceCell;

use ndarray::Array2;
use tracing::debug;

use crate::core::{cached, rotate_to_ned, Axes, CoordinateSystem, Grid, GridSnap};
use crate::error::{GatoError, Result};

const SLOWNESS_SYSTEMS: &[CoordinateSystem] = &[CoordinateSystem::Xyz, CoordinateSystem::Ned];

/// Regular cartesian grid in slowness space with optional rotation.
///
/// Same layout as [`crate::location_grid::CartesianLocationGrid`] but
/// without geographic anchoring: nodes are slowness vectors [s/m], available
/// unrotated (`xyz`) or rotated into north-east-down (`ned`).
///
/// If any parameter is changed, [`Grid::update`] must be called before
/// nodes are queried again.
#[derive(Debug, Clone)]
pub struct CartesianSlownessGrid {
    /// Angle of sx against north [deg].
    pub azimuth: f64,
    /// Angle of sy against horizontal [deg], rotation around sx.
    pub dip: f64,
    /// Sx axis minimum [s/m].
    pub sx_min: f64,
    /// Sx axis maximum [s/m].
    pub sx_max: f64,
    /// Sy axis minimum [s/m].
    pub sy_min: f64,
    /// Sy axis maximum [s/m].
    pub sy_max: f64,
    /// Sz axis minimum [s/m].
    pub sz_min: f64,
    /// Sz axis maximum [s/m].
    pub sz_max: f64,
    /// Sx axis spacing [s/m].
    pub sx_delta: f64,
    /// Sy axis spacing [s/m].
    pub sy_delta: f64,
    /// Sz axis spacing [s/m].
    pub sz_delta: f64,
    /// How ranges that do not fit the spacing are handled.
    pub snap: GridSnap,
    axes: Option<Axes>,
    xyz: OnceCell<Array2<f64>>,
    ned: OnceCell<Array2<f64>>,
}

impl Default for CartesianSlownessGrid {
    fn default() -> Self {
        CartesianSlownessGrid {
            azimuth: 0.0,
            dip: 0.0,
            sx_min: 0.0,
            sx_max: 0.0,
            sy_min: 0.0,
            sy_max: 0.0,
            sz_min: 0.0,
            sz_max: 0.0,
            sx_delta: 1.0,
            sy_delta: 1.0,
            sz_delta: 1.0,
            snap: GridSnap::default(),
            axes: None,
            xyz: OnceCell::new(),
            ned: OnceCell::new(),
        }
    }
}

impl CartesianSlownessGrid {
    const NAME: &'static str = "CartesianSlownessGrid";

    /// Single zero-slowness node. Use the `with_*` methods to set ranges
    /// and finish with [`CartesianSlownessGrid::build`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sx axis range and spacing [s/m] (builder method).
    pub fn with_sx(mut self, min: f64, max: f64, delta: f64) -> Self {
        (self.sx_min, self.sx_max, self.sx_delta) = (min, max, delta);
        self
    }

    /// Set the sy axis range and spacing [s/m] (builder method).
    pub fn with_sy(mut self, min: f64, max: f64, delta: f64) -> Self {
        (self.sy_min, self.sy_max, self.sy_delta) = (min, max, delta);
        self
    }

    /// Set the sz axis range and spacing [s/m] (builder method).
    pub fn with_sz(mut self, min: f64, max: f64, delta: f64) -> Self {
        (self.sz_min, self.sz_max, self.sz_delta) = (min, max, delta);
        self
    }

    /// Set azimuth and dip [deg] (builder method).
    pub fn with_rotation(mut self, azimuth: f64, dip: f64) -> Self {
        self.azimuth = azimuth;
        self.dip = dip;
        self
    }

    /// Set the snapping policy (builder method).
    pub fn with_snap(mut self, snap: GridSnap) -> Self {
        self.snap = snap;
        self
    }

    /// Finish construction by running [`Grid::update`].
    pub fn build(mut self) -> Result<Self> {
        self.update()?;
        Ok(self)
    }

    /// The 1D axis vectors, if [`Grid::update`] has been called.
    pub fn axes(&self) -> Option<&Axes> {
        self.axes.as_ref()
    }

    fn xyz(&self) -> Result<&Array2<f64>> {
        cached(&self.xyz, || {
            let axes = self.axes.as_ref().ok_or(GatoError::GridNotUpdated(Self::NAME))?;
            let xyz = axes.mesh();
            debug!(grid = Self::NAME, system = "xyz", nodes = xyz.nrows(), "computed nodes");
            Ok(xyz)
        })
    }

    fn ned(&self) -> Result<&Array2<f64>> {
        cached(&self.ned, || Ok(rotate_to_ned(self.xyz()?, self.azimuth, self.dip)))
    }
}

impl Grid for CartesianSlownessGrid {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn shape(&self) -> Vec<usize> {
        self.axes
            .as_ref()
            .map_or(vec![0, 0, 0], |axes| axes.shape().to_vec())
    }

    fn supported_systems(&self) -> &'static [CoordinateSystem] {
        SLOWNESS_SYSTEMS
    }

    fn get_nodes(&self, system: CoordinateSystem) -> Result<&Array2<f64>> {
        match system {
            CoordinateSystem::Xyz => self.xyz(),
            CoordinateSystem::Ned => self.ned(),
            other => Err(GatoError::UnsupportedCoordinateSystem {
                grid: Self::NAME,
                system: other.to_string(),
            }),
        }
    }

    fn update(&mut self) -> Result<()> {
        self.clear_cached();
        self.axes = Some(Axes::generate(
            ["sx", "sy", "sz"],
            (self.sx_min, self.sx_max, self.sx_delta),
            (self.sy_min, self.sy_max, self.sy_delta),
            (self.sz_min, self.sz_max, self.sz_delta),
            self.snap,
        )?);
        Ok(())
    }

    fn clear_cached(&mut self) {
        self.xyz.take();
        self.ned.take();
    }
}
