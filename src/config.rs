// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{Grid, GridSnap};
use crate::delays::{shared, DelayMethod, GenericDelayTable, PlaneWaveDM, SharedGrid, SphericalWaveDM};
use crate::error::{GatoError, Result};
use crate::io;
use crate::location::Location;
use crate::location_grid::{CartesianLocationGrid, UnstructuredLocationGrid};
use crate::slowness_grid::CartesianSlownessGrid;

/// Range and spacing of one grid axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisConfig {
    /// Axis minimum.
    pub min: f64,
    /// Axis maximum.
    pub max: f64,
    /// Node spacing.
    pub delta: f64,
}

impl Default for AxisConfig {
    fn default() -> Self {
        AxisConfig {
            min: 0.0,
            max: 0.0,
            delta: 1.0,
        }
    }
}

/// Parameters of a [`CartesianLocationGrid`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartesianLocationConfig {
    /// Anchor point of the grid.
    pub origin: Location,
    /// Angle of x against north [deg].
    #[serde(default)]
    pub azimuth: f64,
    /// Angle of y against horizontal [deg].
    #[serde(default)]
    pub dip: f64,
    /// X axis [m].
    #[serde(default)]
    pub x: AxisConfig,
    /// Y axis [m].
    #[serde(default)]
    pub y: AxisConfig,
    /// Z axis [m].
    #[serde(default)]
    pub z: AxisConfig,
    /// Snapping policy for all axes.
    #[serde(default)]
    pub snap: GridSnap,
}

/// Parameters of an [`UnstructuredLocationGrid`].
///
/// Exactly one of `coordinates` and `coordinates_file` must be given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnstructuredLocationConfig {
    /// Inline `(lat, lon, north_shift, east_shift, depth)` rows.
    pub coordinates: Option<Vec<[f64; 5]>>,
    /// `.npy` or `.mat` file holding the coordinates. Relative paths are
    /// resolved against the directory of the configuration file.
    pub coordinates_file: Option<PathBuf>,
    /// Anchor point of the grid.
    pub origin: Option<Location>,
    /// Anchor the grid at its geographic center; overrides `origin`.
    pub origin_to_center: bool,
}

/// Parameters of a [`CartesianSlownessGrid`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CartesianSlownessConfig {
    /// Angle of sx against north [deg].
    pub azimuth: f64,
    /// Angle of sy against horizontal [deg].
    pub dip: f64,
    /// Sx axis [s/m].
    pub sx: AxisConfig,
    /// Sy axis [s/m].
    pub sy: AxisConfig,
    /// Sz axis [s/m].
    pub sz: AxisConfig,
    /// Snapping policy for all axes.
    pub snap: GridSnap,
}

/// A grid description, tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GridConfig {
    /// Regular grid anchored at a geographic location.
    CartesianLocation(CartesianLocationConfig),
    /// Arbitrary list of geographic nodes.
    UnstructuredLocation(UnstructuredLocationConfig),
    /// Regular grid in slowness space.
    CartesianSlowness(CartesianSlownessConfig),
}

impl GridConfig {
    /// Construct and update the described grid.
    ///
    /// `base_dir` is used to resolve relative coordinate file paths.
    pub fn build(&self, base_dir: Option<&Path>) -> Result<SharedGrid> {
        let grid: SharedGrid = match self {
            GridConfig::CartesianLocation(c) => shared(
                CartesianLocationGrid::new(c.origin.clone())
                    .with_x(c.x.min, c.x.max, c.x.delta)
                    .with_y(c.y.min, c.y.max, c.y.delta)
                    .with_z(c.z.min, c.z.max, c.z.delta)
                    .with_rotation(c.azimuth, c.dip)
                    .with_snap(c.snap)
                    .build()?,
            ),
            GridConfig::UnstructuredLocation(c) => shared(c.build(base_dir)?),
            GridConfig::CartesianSlowness(c) => shared(
                CartesianSlownessGrid::new()
                    .with_sx(c.sx.min, c.sx.max, c.sx.delta)
                    .with_sy(c.sy.min, c.sy.max, c.sy.delta)
                    .with_sz(c.sz.min, c.sz.max, c.sz.delta)
                    .with_rotation(c.azimuth, c.dip)
                    .with_snap(c.snap)
                    .build()?,
            ),
        };
        {
            let g = grid.borrow();
            debug!(grid = g.name(), shape = ?g.shape(), "built grid from config");
        }
        Ok(grid)
    }
}

impl UnstructuredLocationConfig {
    fn build(&self, base_dir: Option<&Path>) -> Result<UnstructuredLocationGrid> {
        let coordinates = match (&self.coordinates, &self.coordinates_file) {
            (Some(rows), None) => Array2::from_shape_fn((rows.len(), 5), |(i, c)| rows[i][c]),
            (None, Some(file)) => {
                let path = match base_dir {
                    Some(dir) if file.is_relative() => dir.join(file),
                    _ => file.clone(),
                };
                io::load_coordinates(&path)?
            }
            (Some(_), Some(_)) => {
                return Err(GatoError::Config(
                    "give either coordinates or coordinates_file, not both".to_string(),
                ))
            }
            (None, None) => {
                return Err(GatoError::Config(
                    "unstructured_location grid needs coordinates or coordinates_file".to_string(),
                ))
            }
        };
        let mut grid = UnstructuredLocationGrid::new(coordinates)?;
        grid.set_origin(self.origin.clone());
        if self.origin_to_center {
            grid.set_origin_to_center()?;
        }
        Ok(grid)
    }
}

/// Delay method selection, tagged by `type`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MethodConfig {
    /// [`PlaneWaveDM`].
    PlaneWave,
    /// [`SphericalWaveDM`] with a propagation velocity [m/s].
    SphericalWave {
        /// Propagation velocity [m/s].
        velocity: f64,
    },
}

impl MethodConfig {
    /// Construct the described method.
    pub fn build(&self) -> Result<Box<dyn DelayMethod>> {
        Ok(match *self {
            MethodConfig::PlaneWave => Box::new(PlaneWaveDM),
            MethodConfig::SphericalWave { velocity } => Box::new(SphericalWaveDM::new(velocity)?),
        })
    }
}

/// JSON description of a complete delay table.
///
/// ```json
/// {
///   "source_grid": {"type": "cartesian_slowness", "sx": {"min": -4e-4, "max": 4e-4, "delta": 1e-4}},
///   "receiver_grid": {"type": "unstructured_location", "coordinates_file": "stations.npy"},
///   "method": {"type": "plane_wave"},
///   "reference_time": 0.5
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayTableConfig {
    /// Source grid.
    pub source_grid: GridConfig,
    /// Receiver grid.
    pub receiver_grid: GridConfig,
    /// Delay method.
    pub method: MethodConfig,
    /// Time [s] subtracted from all delays.
    #[serde(default)]
    pub reference_time: Option<f64>,
    /// Per-source corrections [s].
    #[serde(default)]
    pub source_delays: Option<Vec<f64>>,
    /// Per-receiver corrections [s].
    #[serde(default)]
    pub receiver_delays: Option<Vec<f64>>,
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl FromStr for DelayTableConfig {
    type Err = GatoError;

    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| GatoError::Config(e.to_string()))
    }
}

impl DelayTableConfig {
    /// Read a configuration file. Relative paths inside it are resolved
    /// against the file's directory.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut config: DelayTableConfig = serde_json::from_str(&text)
            .map_err(|e| GatoError::Config(format!("{}: {}", path.display(), e)))?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Directory used to resolve relative paths, if any.
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Construct the grids, the method and the table with its corrections.
    pub fn build(&self) -> Result<GenericDelayTable> {
        let source = self.source_grid.build(self.base_dir())?;
        let receiver = self.receiver_grid.build(self.base_dir())?;
        let mut table = GenericDelayTable::new(source, receiver, self.method.build()?);
        table.set_reference_time(self.reference_time);
        table.set_source_delays(self.source_delays.clone().map(Array1::from));
        table.set_receiver_delays(self.receiver_delays.clone().map(Array1::from));
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CoordinateSystem;

    const PLANE_WAVE: &str = r#"{
        "source_grid": {"type": "cartesian_slowness", "sx": {"min": 1e-3, "max": 1e-3}},
        "receiver_grid": {
            "type": "cartesian_location",
            "origin": {"lat": 10.0, "lon": 20.0},
            "x": {"min": 0.0, "max": 2000.0, "delta": 1000.0}
        },
        "method": {"type": "plane_wave"},
        "reference_time": 0.5,
        "receiver_delays": [0.0, 0.0, 1.0]
    }"#;

    #[test]
    fn plane_wave_table_from_json() {
        let config: DelayTableConfig = PLANE_WAVE.parse().unwrap();
        let table = config.build().unwrap();
        assert_eq!(table.shape().unwrap(), (1, 3));
        let delays = table.get_delays().unwrap();
        let expected = [-0.5, 0.5, 2.5];
        for (d, e) in delays.iter().zip(expected) {
            assert!((d - e).abs() < 1e-12, "{} != {}", d, e);
        }
    }

    #[test]
    fn spherical_wave_with_inline_coordinates() {
        let json = r#"{
            "source_grid": {
                "type": "unstructured_location",
                "coordinates": [[0.0, 0.0, 0.0, 0.0, 3000.0]]
            },
            "receiver_grid": {
                "type": "unstructured_location",
                "coordinates": [[0.0, 0.0, 0.0, 0.0, 0.0]]
            },
            "method": {"type": "spherical_wave", "velocity": 1500.0}
        }"#;
        let table = json.parse::<DelayTableConfig>().unwrap().build().unwrap();
        let delays = table.get_delays().unwrap();
        assert!((delays[[0, 0]] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn coordinates_file_resolved_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let coords = ndarray::array![[45.0, 7.0, 0.0, 0.0, 0.0], [45.0, 7.0, 100.0, 0.0, 0.0]];
        io::save_npy(&dir.path().join("stations.npy"), &coords).unwrap();
        let json = r#"{
            "source_grid": {"type": "cartesian_slowness"},
            "receiver_grid": {
                "type": "unstructured_location",
                "coordinates_file": "stations.npy",
                "origin_to_center": true
            },
            "method": {"type": "plane_wave"}
        }"#;
        let config_path = dir.path().join("table.json");
        std::fs::write(&config_path, json).unwrap();

        let config = DelayTableConfig::from_path(&config_path).unwrap();
        let grid = config.receiver_grid.build(config.base_dir()).unwrap();
        let grid = grid.borrow();
        assert_eq!(grid.size(), 2);
        let ned = grid.get_nodes(CoordinateSystem::Ned).unwrap();
        assert!((ned[[0, 0]] + 50.0).abs() < 1e-3);
        assert!((ned[[1, 0]] - 50.0).abs() < 1e-3);
    }

    #[test]
    fn unstructured_needs_exactly_one_source() {
        let neither = GridConfig::UnstructuredLocation(UnstructuredLocationConfig::default());
        assert!(matches!(neither.build(None), Err(GatoError::Config(_))));

        let both = GridConfig::UnstructuredLocation(UnstructuredLocationConfig {
            coordinates: Some(vec![[0.0; 5]]),
            coordinates_file: Some(PathBuf::from("stations.npy")),
            ..Default::default()
        });
        assert!(matches!(both.build(None), Err(GatoError::Config(_))));
    }

    #[test]
    fn invalid_velocity_rejected() {
        let method = MethodConfig::SphericalWave { velocity: -1.0 };
        assert!(matches!(method.build(), Err(GatoError::InvalidVelocity(_))));
    }

    #[test]
    fn unknown_grid_type_is_config_error() {
        let json = r#"{
            "source_grid": {"type": "polar"},
            "receiver_grid": {"type": "cartesian_slowness"},
            "method": {"type": "plane_wave"}
        }"#;
        let err = json.parse::<DelayTableConfig>().unwrap_err();
        assert!(matches!(err, GatoError::Config(_)));
    }

    #[test]
    fn snap_mode_parsed() {
        let json = r#"{"type": "cartesian_slowness", "sx": {"min": 0.0, "max": 1e-3, "delta": 3e-4}, "snap": "exact"}"#;
        let config: GridConfig = serde_json::from_str(json).unwrap();
        assert!(matches!(
            config.build(None),
            Err(GatoError::InexactGridSpacing { axis: "sx", .. })
        ));
    }
}
