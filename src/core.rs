// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::cell::OnceCell;
use std::fmt;
use std::str::FromStr;

use ndarray::{array, Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{GatoError, Result};
use crate::orthodrome::D2R;

/// Coordinate system in which grid nodes can be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateSystem {
    /// Unrotated local grid coordinates.
    Xyz,
    /// Rotated north-east-down coordinates relative to the grid origin.
    Ned,
    /// World coordinates as `(latitude, longitude, depth)`.
    LatLonDepth,
    /// Earth-centered, earth-fixed cartesian coordinates.
    Ecef,
}

impl CoordinateSystem {
    /// Name used in configuration files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinateSystem::Xyz => "xyz",
            CoordinateSystem::Ned => "ned",
            CoordinateSystem::LatLonDepth => "latlondepth",
            CoordinateSystem::Ecef => "ecef",
        }
    }
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoordinateSystem {
    type Err = GatoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "xyz" => Ok(CoordinateSystem::Xyz),
            "ned" => Ok(CoordinateSystem::Ned),
            "latlondepth" => Ok(CoordinateSystem::LatLonDepth),
            "ecef" => Ok(CoordinateSystem::Ecef),
            other => Err(GatoError::UnknownCoordinateSystem(other.to_string())),
        }
    }
}

/// Rule for reconciling an axis range that is not an exact multiple of the
/// requested spacing.
///
/// When the range does fit, every mode yields the same evenly spaced axis
/// with both ends on nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridSnap {
    /// Keep both ends; the spacing is stretched or squeezed to the nearest
    /// whole number of intervals.
    #[default]
    Both,
    /// Keep the minimum and the spacing; drop the remainder at the maximum.
    Min,
    /// Keep the maximum and the spacing; drop the remainder at the minimum.
    Max,
    /// Keep the minimum and the spacing; extend the last node beyond the
    /// maximum so the whole range is covered.
    Extend,
    /// Refuse ranges that are not a whole multiple of the spacing.
    Exact,
}

/// Relative tolerance for deciding that a range is a whole multiple of the
/// spacing.
const SNAP_TOLERANCE: f64 = 1e-9;

/// Upper bound on the number of nodes along one axis.
pub const MAX_AXIS_NODES: usize = 100_000_000;

/// Generate the ordered 1D node coordinates of one grid axis.
///
/// `min == max` gives a single-node axis regardless of `delta`.
///
/// # Errors
/// Returns an error if `delta` is not positive and finite, if `max < min`,
/// if the axis would exceed [`MAX_AXIS_NODES`] nodes, or if `snap` is
/// [`GridSnap::Exact`] and the range does not fit.
pub fn grid_coordinates(
    axis: &'static str,
    min: f64,
    max: f64,
    delta: f64,
    snap: GridSnap,
) -> Result<Array1<f64>> {
    if min == max {
        return Ok(array![min]);
    }

    if !delta.is_finite() || delta <= 0.0 {
        return Err(GatoError::InvalidGridSpacing { axis, delta });
    }

    if !(max > min) {
        return Err(GatoError::InvalidAxisRange { axis, min, max });
    }

    let ratio = (max - min) / delta;
    if !ratio.is_finite() || ratio.ceil() + 1.0 > MAX_AXIS_NODES as f64 {
        return Err(GatoError::TooManyNodes {
            axis,
            nodes: ratio.ceil() + 1.0,
        });
    }
    let rounded = ratio.round();
    let fits = (ratio - rounded).abs() <= SNAP_TOLERANCE * ratio.max(1.0);

    if fits {
        let n = rounded.max(1.0) as usize + 1;
        return Ok(Array1::linspace(min, max, n));
    }

    let stepped = |start: f64, n: usize| Array1::from_shape_fn(n, |i| start + i as f64 * delta);

    match snap {
        GridSnap::Both => {
            let n = rounded.max(1.0) as usize + 1;
            Ok(Array1::linspace(min, max, n))
        }
        GridSnap::Min => Ok(stepped(min, ratio.floor() as usize + 1)),
        GridSnap::Max => {
            let n = ratio.floor() as usize + 1;
            Ok(stepped(max - (n - 1) as f64 * delta, n))
        }
        GridSnap::Extend => Ok(stepped(min, ratio.ceil() as usize + 1)),
        GridSnap::Exact => Err(GatoError::InexactGridSpacing {
            axis,
            min,
            max,
            delta,
        }),
    }
}

/// Rotation matrix from Euler angles `(alpha, beta, gamma)` [rad].
///
/// `alpha` rotates around x, `beta` around z and `gamma` around the new z.
/// The transpose maps local grid coordinates into the reference frame.
pub fn euler_to_matrix(alpha: f64, beta: f64, gamma: f64) -> Array2<f64> {
    let (sa, ca) = alpha.sin_cos();
    let (sb, cb) = beta.sin_cos();
    let (sg, cg) = gamma.sin_cos();

    array![
        [cb * cg - ca * sb * sg, sb * cg + ca * cb * sg, sa * sg],
        [-cb * sg - ca * sb * cg, -sb * sg + ca * cb * cg, sa * cg],
        [sa * sb, -sa * cb, ca],
    ]
}

/// Rotate `(size, 3)` local coordinates into north-east-down.
///
/// `azimuth` is the angle of x against north and `dip` the angle of y
/// against the horizontal, both in degrees.
pub fn rotate_to_ned(xyz: &Array2<f64>, azimuth: f64, dip: f64) -> Array2<f64> {
    let rotmat = euler_to_matrix(dip * D2R, azimuth * D2R, 0.0);
    // (R^T xyz^T)^T == xyz R
    xyz.dot(&rotmat)
}

/// The three 1D coordinate vectors of a regular cartesian grid.
///
/// Nodes are ordered from z (slow) to x (fast), so that the 3D index is
/// `[iz, iy, ix]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Axes {
    x: Array1<f64>,
    y: Array1<f64>,
    z: Array1<f64>,
}

impl Axes {
    /// Build the axes of a grid from per-axis `(min, max, delta)` triples.
    pub fn generate(
        names: [&'static str; 3],
        x: (f64, f64, f64),
        y: (f64, f64, f64),
        z: (f64, f64, f64),
        snap: GridSnap,
    ) -> Result<Self> {
        Ok(Axes {
            x: grid_coordinates(names[0], x.0, x.1, x.2, snap)?,
            y: grid_coordinates(names[1], y.0, y.1, y.2, snap)?,
            z: grid_coordinates(names[2], z.0, z.1, z.2, snap)?,
        })
    }

    /// Node coordinates along x.
    pub fn x(&self) -> &Array1<f64> {
        &self.x
    }

    /// Node coordinates along y.
    pub fn y(&self) -> &Array1<f64> {
        &self.y
    }

    /// Node coordinates along z.
    pub fn z(&self) -> &Array1<f64> {
        &self.z
    }

    /// Logical shape `[nz, ny, nx]`.
    pub fn shape(&self) -> [usize; 3] {
        [self.z.len(), self.y.len(), self.x.len()]
    }

    /// Total number of nodes.
    pub fn size(&self) -> usize {
        self.shape().iter().product()
    }

    /// Convert a flat node index to `[iz, iy, ix]`.
    pub fn flat_to_nd(&self, flat: usize) -> [usize; 3] {
        let [_, ny, nx] = self.shape();
        [flat / (ny * nx), (flat / nx) % ny, flat % nx]
    }

    /// Convert `[iz, iy, ix]` to a flat node index.
    pub fn nd_to_flat(&self, idx: [usize; 3]) -> usize {
        let [_, ny, nx] = self.shape();
        (idx[0] * ny + idx[1]) * nx + idx[2]
    }

    /// Dense `(size, 3)` mesh with columns `(x, y, z)`.
    pub fn mesh(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.size(), 3), |(i, c)| {
            let [iz, iy, ix] = self.flat_to_nd(i);
            match c {
                0 => self.x[ix],
                1 => self.y[iy],
                _ => self.z[iz],
            }
        })
    }
}

/// Return the cached array, computing and storing it on first access.
pub(crate) fn cached<F>(cell: &OnceCell<Array2<f64>>, compute: F) -> Result<&Array2<f64>>
where
    F: FnOnce() -> Result<Array2<f64>>,
{
    if let Some(nodes) = cell.get() {
        return Ok(nodes);
    }
    let nodes = compute()?;
    Ok(cell.get_or_init(|| nodes))
}

/// Common interface of all grids.
///
/// Grids hold parameters and lazily derived node coordinate arrays. After
/// any parameter change, [`Grid::update`] must be called before nodes are
/// queried again; stale arrays are not detected.
pub trait Grid {
    /// Name of the grid type, used in error messages and logs.
    fn name(&self) -> &'static str;

    /// Logical shape of the grid (number of nodes per axis, slow to fast).
    fn shape(&self) -> Vec<usize>;

    /// Total number of nodes.
    fn size(&self) -> usize {
        self.shape().iter().product()
    }

    /// Number of axes with more than one node.
    fn effective_dimension(&self) -> usize {
        self.shape().iter().filter(|&&n| n > 1).count()
    }

    /// Coordinate systems this grid type can produce.
    fn supported_systems(&self) -> &'static [CoordinateSystem];

    /// Node coordinates in the requested system as a `(size, 3)` array.
    ///
    /// # Errors
    /// Returns [`GatoError::UnsupportedCoordinateSystem`] if the grid type
    /// does not support `system`.
    fn get_nodes(&self, system: CoordinateSystem) -> Result<&Array2<f64>>;

    /// Same as [`Grid::get_nodes`] with the system given by name.
    fn get_nodes_by_name(&self, system: &str) -> Result<&Array2<f64>> {
        match system.parse::<CoordinateSystem>() {
            Ok(system) => self.get_nodes(system),
            Err(_) => Err(GatoError::UnsupportedCoordinateSystem {
                grid: self.name(),
                system: system.to_string(),
            }),
        }
    }

    /// Regenerate derived state from the parameters and drop all cached
    /// node arrays.
    fn update(&mut self) -> Result<()>;

    /// Drop all cached node arrays.
    fn clear_cached(&mut self);
}
