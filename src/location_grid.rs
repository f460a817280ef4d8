// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::cell::OnceCell;

use ndarray::{Array2, Zip};
use tracing::debug;

use crate::core::{cached, rotate_to_ned, Axes, CoordinateSystem, Grid, GridSnap};
use crate::error::{GatoError, Result};
use crate::location::Location;
use crate::orthodrome;

/// Pairwise 3D distances [m] between the nodes of two grids, computed in
/// ECEF. Returns an `(a.size(), b.size())` matrix.
pub fn distances_3d(grid_a: &dyn Grid, grid_b: &dyn Grid) -> Result<Array2<f64>> {
    let a = grid_a.get_nodes(CoordinateSystem::Ecef)?;
    let b = grid_b.get_nodes(CoordinateSystem::Ecef)?;

    let mut distances = Array2::<f64>::zeros((a.nrows(), b.nrows()));
    Zip::indexed(&mut distances).par_for_each(|(i, j), d| {
        let dx = a[[i, 0]] - b[[j, 0]];
        let dy = a[[i, 1]] - b[[j, 1]];
        let dz = a[[i, 2]] - b[[j, 2]];
        *d = (dx * dx + dy * dy + dz * dz).sqrt();
    });
    Ok(distances)
}

/// Convert `(lat, lon, depth)` rows to ECEF rows.
fn latlondepth_to_ecef(lld: &Array2<f64>) -> Array2<f64> {
    let mut ecef = Array2::<f64>::zeros(lld.raw_dim());
    Zip::from(ecef.rows_mut())
        .and(lld.rows())
        .for_each(|mut out, row| {
            let xyz = orthodrome::geodetic_to_ecef(row[0], row[1], -row[2]);
            out[0] = xyz[0];
            out[1] = xyz[1];
            out[2] = xyz[2];
        });
    ecef
}

const CARTESIAN_LOCATION_SYSTEMS: &[CoordinateSystem] = &[
    CoordinateSystem::Xyz,
    CoordinateSystem::Ned,
    CoordinateSystem::LatLonDepth,
    CoordinateSystem::Ecef,
];

/// Regular cartesian grid anchored at a reference point with optional
/// rotation.
///
/// The unrotated coordinate system is NED (north-east-down). 3D indexing is
/// ordered from z (slow) to x (fast), `[iz, iy, ix]`.
///
/// If any parameter is changed, [`Grid::update`] must be called before
/// nodes are queried again.
#[derive(Debug, Clone)]
pub struct CartesianLocationGrid {
    /// Anchor point of the grid.
    pub origin: Location,
    /// Angle of x against north [deg].
    pub azimuth: f64,
    /// Angle of y against horizontal [deg], rotation around x.
    pub dip: f64,
    /// X axis minimum [m].
    pub x_min: f64,
    /// X axis maximum [m].
    pub x_max: f64,
    /// Y axis minimum [m].
    pub y_min: f64,
    /// Y axis maximum [m].
    pub y_max: f64,
    /// Z axis minimum [m].
    pub z_min: f64,
    /// Z axis maximum [m].
    pub z_max: f64,
    /// X axis spacing [m].
    pub x_delta: f64,
    /// Y axis spacing [m].
    pub y_delta: f64,
    /// Z axis spacing [m].
    pub z_delta: f64,
    /// How ranges that do not fit the spacing are handled.
    pub snap: GridSnap,
    axes: Option<Axes>,
    xyz: OnceCell<Array2<f64>>,
    ned: OnceCell<Array2<f64>>,
    latlondepth: OnceCell<Array2<f64>>,
    ecef: OnceCell<Array2<f64>>,
}

impl CartesianLocationGrid {
    const NAME: &'static str = "CartesianLocationGrid";

    /// Single-node grid at `origin` with unit spacing. Use the `with_*`
    /// methods to set ranges and finish with [`CartesianLocationGrid::build`].
    pub fn new(origin: Location) -> Self {
        CartesianLocationGrid {
            origin,
            azimuth: 0.0,
            dip: 0.0,
            x_min: 0.0,
            x_max: 0.0,
            y_min: 0.0,
            y_max: 0.0,
            z_min: 0.0,
            z_max: 0.0,
            x_delta: 1.0,
            y_delta: 1.0,
            z_delta: 1.0,
            snap: GridSnap::default(),
            axes: None,
            xyz: OnceCell::new(),
            ned: OnceCell::new(),
            latlondepth: OnceCell::new(),
            ecef: OnceCell::new(),
        }
    }

    /// Set the x axis range and spacing [m] (builder method).
    pub fn with_x(mut self, min: f64, max: f64, delta: f64) -> Self {
        (self.x_min, self.x_max, self.x_delta) = (min, max, delta);
        self
    }

    /// Set the y axis range and spacing [m] (builder method).
    pub fn with_y(mut self, min: f64, max: f64, delta: f64) -> Self {
        (self.y_min, self.y_max, self.y_delta) = (min, max, delta);
        self
    }

    /// Set the z axis range and spacing [m] (builder method).
    pub fn with_z(mut self, min: f64, max: f64, delta: f64) -> Self {
        (self.z_min, self.z_max, self.z_delta) = (min, max, delta);
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
    ///
    /// # Errors
    /// Returns an error if an axis has invalid spacing or range.
    pub fn build(mut self) -> Result<Self> {
        self.update()?;
        Ok(self)
    }

    /// The 1D axis vectors, if [`Grid::update`] has been called.
    pub fn axes(&self) -> Option<&Axes> {
        self.axes.as_ref()
    }

    fn require_axes(&self) -> Result<&Axes> {
        self.axes.as_ref().ok_or(GatoError::GridNotUpdated(Self::NAME))
    }

    fn xyz(&self) -> Result<&Array2<f64>> {
        cached(&self.xyz, || {
            let xyz = self.require_axes()?.mesh();
            debug!(grid = Self::NAME, system = "xyz", nodes = xyz.nrows(), "computed nodes");
            Ok(xyz)
        })
    }

    fn ned(&self) -> Result<&Array2<f64>> {
        cached(&self.ned, || {
            // Relative to the reference point of the origin.
            let ned = rotate_to_ned(self.xyz()?, self.azimuth, self.dip);
            debug!(grid = Self::NAME, system = "ned", nodes = ned.nrows(), "computed nodes");
            Ok(ned)
        })
    }

    fn latlondepth(&self) -> Result<&Array2<f64>> {
        cached(&self.latlondepth, || {
            let ned = self.ned()?;
            let mut lld = Array2::<f64>::zeros(ned.raw_dim());
            Zip::from(lld.rows_mut())
                .and(ned.rows())
                .for_each(|mut out, row| {
                    let (lat, lon, depth) = self.ned_to_latlondepth(row[0], row[1], row[2]);
                    out[0] = lat;
                    out[1] = lon;
                    out[2] = depth;
                });
            debug!(grid = Self::NAME, system = "latlondepth", nodes = lld.nrows(), "computed nodes");
            Ok(lld)
        })
    }

    fn ecef(&self) -> Result<&Array2<f64>> {
        cached(&self.ecef, || Ok(latlondepth_to_ecef(self.latlondepth()?)))
    }

    /// Convert NED offsets relative to the origin's reference point back
    /// through this grid's projection to `(lat, lon, depth)`.
    pub fn ned_to_latlondepth(&self, north: f64, east: f64, down: f64) -> (f64, f64, f64) {
        let o = &self.origin;
        let (lat, lon) =
            orthodrome::ne_to_latlon(o.lat(), o.lon(), o.north_shift() + north, o.east_shift() + east);
        (lat, lon, o.depth() + down)
    }

    /// Inverse of [`CartesianLocationGrid::ned_to_latlondepth`].
    pub fn latlondepth_to_ned(&self, lat: f64, lon: f64, depth: f64) -> (f64, f64, f64) {
        let o = &self.origin;
        let (n, e) = orthodrome::latlon_to_ne(o.lat(), o.lon(), lat, lon);
        (n - o.north_shift(), e - o.east_shift(), depth - o.depth())
    }
}

impl Grid for CartesianLocationGrid {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn shape(&self) -> Vec<usize> {
        self.axes
            .as_ref()
            .map_or(vec![0, 0, 0], |axes| axes.shape().to_vec())
    }

    fn supported_systems(&self) -> &'static [CoordinateSystem] {
        CARTESIAN_LOCATION_SYSTEMS
    }

    fn get_nodes(&self, system: CoordinateSystem) -> Result<&Array2<f64>> {
        match system {
            CoordinateSystem::Xyz => self.xyz(),
            CoordinateSystem::Ned => self.ned(),
            CoordinateSystem::LatLonDepth => self.latlondepth(),
            CoordinateSystem::Ecef => self.ecef(),
        }
    }

    fn update(&mut self) -> Result<()> {
        self.clear_cached();
        self.axes = Some(Axes::generate(
            ["x", "y", "z"],
            (self.x_min, self.x_max, self.x_delta),
            (self.y_min, self.y_max, self.y_delta),
            (self.z_min, self.z_max, self.z_delta),
            self.snap,
        )?);
        Ok(())
    }

    fn clear_cached(&mut self) {
        self.xyz.take();
        self.ned.take();
        self.latlondepth.take();
        self.ecef.take();
    }
}

const UNSTRUCTURED_LOCATION_SYSTEMS: &[CoordinateSystem] = &[
    CoordinateSystem::Ned,
    CoordinateSystem::LatLonDepth,
    CoordinateSystem::Ecef,
];

/// Grid of arbitrarily placed nodes.
///
/// Each row of `coordinates` is `(lat, lon, north_shift, east_shift, depth)`,
/// i.e. its own reference point plus an offset. NED coordinates are given
/// relative to `origin`, or to the geographic center of the nodes if no
/// origin is set. Offsets are measured from the origin's effective
/// position, so an origin with a north/east shift is honored; its depth is
/// the reference for the down component.
#[derive(Debug, Clone)]
pub struct UnstructuredLocationGrid {
    /// Anchor point of the grid.
    pub origin: Option<Location>,
    /// `(N, 5)` node coordinates.
    pub coordinates: Array2<f64>,
    latlondepth: OnceCell<Array2<f64>>,
    ecef: OnceCell<Array2<f64>>,
    ned: OnceCell<Array2<f64>>,
}

impl UnstructuredLocationGrid {
    const NAME: &'static str = "UnstructuredLocationGrid";

    /// Create a grid from an `(N, 5)` coordinate array.
    ///
    /// # Errors
    /// Returns [`GatoError::ShapeMismatch`] if the array does not have five
    /// columns.
    pub fn new(coordinates: Array2<f64>) -> Result<Self> {
        check_coordinates(&coordinates)?;
        Ok(UnstructuredLocationGrid {
            origin: None,
            coordinates,
            latlondepth: OnceCell::new(),
            ecef: OnceCell::new(),
            ned: OnceCell::new(),
        })
    }

    /// Create a grid with one node per location.
    pub fn from_locations(locations: &[Location]) -> Self {
        let coordinates =
            Array2::from_shape_fn((locations.len(), 5), |(i, c)| locations[i].coords5()[c]);
        UnstructuredLocationGrid {
            origin: None,
            coordinates,
            latlondepth: OnceCell::new(),
            ecef: OnceCell::new(),
            ned: OnceCell::new(),
        }
    }

    /// Set the anchor point (builder method).
    pub fn with_origin(mut self, origin: Location) -> Self {
        self.set_origin(Some(origin));
        self
    }

    /// Replace the anchor point. Only NED coordinates depend on it.
    pub fn set_origin(&mut self, origin: Option<Location>) {
        self.origin = origin;
        self.ned.take();
    }

    /// Anchor the grid at its geographic center.
    ///
    /// # Errors
    /// Returns [`GatoError::EmptyGrid`] if the grid has no nodes.
    pub fn set_origin_to_center(&mut self) -> Result<()> {
        let center = self.get_center()?;
        self.set_origin(Some(center));
        Ok(())
    }

    /// Geographic midpoint of the nodes at their mean depth.
    ///
    /// # Errors
    /// Returns [`GatoError::EmptyGrid`] if the grid has no nodes.
    pub fn get_center(&self) -> Result<Location> {
        let lld = self.latlondepth()?;
        let lats = lld.column(0).to_vec();
        let lons = lld.column(1).to_vec();
        let (lat, lon) = orthodrome::geographic_midpoint(&lats, &lons).ok_or(GatoError::EmptyGrid)?;
        let depth = lld.column(2).mean().ok_or(GatoError::EmptyGrid)?;
        Ok(Location::new(lat, lon).with_depth(depth))
    }

    /// The explicit origin, or the center if none is set.
    pub fn get_effective_origin(&self) -> Result<Location> {
        match &self.origin {
            Some(origin) => Ok(origin.clone()),
            None => self.get_center(),
        }
    }

    fn latlondepth(&self) -> Result<&Array2<f64>> {
        cached(&self.latlondepth, || {
            let mut lld = Array2::<f64>::zeros((self.coordinates.nrows(), 3));
            Zip::from(lld.rows_mut())
                .and(self.coordinates.rows())
                .for_each(|mut out, c| {
                    let (lat, lon) = orthodrome::ne_to_latlon(c[0], c[1], c[2], c[3]);
                    out[0] = lat;
                    out[1] = lon;
                    out[2] = c[4];
                });
            debug!(grid = Self::NAME, system = "latlondepth", nodes = lld.nrows(), "computed nodes");
            Ok(lld)
        })
    }

    fn ecef(&self) -> Result<&Array2<f64>> {
        cached(&self.ecef, || Ok(latlondepth_to_ecef(self.latlondepth()?)))
    }

    fn ned(&self) -> Result<&Array2<f64>> {
        cached(&self.ned, || {
            let lld = self.latlondepth()?;
            let origin = self.get_effective_origin()?;
            let (olat, olon) = origin.effective_latlon();
            let mut ned = Array2::<f64>::zeros(lld.raw_dim());
            Zip::from(ned.rows_mut())
                .and(lld.rows())
                .for_each(|mut out, row| {
                    let (n, e) = orthodrome::latlon_to_ne(olat, olon, row[0], row[1]);
                    out[0] = n;
                    out[1] = e;
                    out[2] = row[2] - origin.depth();
                });
            debug!(grid = Self::NAME, system = "ned", nodes = ned.nrows(), "computed nodes");
            Ok(ned)
        })
    }
}

fn check_coordinates(coordinates: &Array2<f64>) -> Result<()> {
    if coordinates.ncols() != 5 {
        return Err(GatoError::ShapeMismatch {
            expected: vec![coordinates.nrows(), 5],
            got: coordinates.shape().to_vec(),
        });
    }
    Ok(())
}

impl Grid for UnstructuredLocationGrid {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn shape(&self) -> Vec<usize> {
        vec![self.coordinates.nrows()]
    }

    fn supported_systems(&self) -> &'static [CoordinateSystem] {
        UNSTRUCTURED_LOCATION_SYSTEMS
    }

    fn get_nodes(&self, system: CoordinateSystem) -> Result<&Array2<f64>> {
        match system {
            CoordinateSystem::LatLonDepth => self.latlondepth(),
            CoordinateSystem::Ecef => self.ecef(),
            CoordinateSystem::Ned => self.ned(),
            other => Err(GatoError::UnsupportedCoordinateSystem {
                grid: Self::NAME,
                system: other.to_string(),
            }),
        }
    }

    fn update(&mut self) -> Result<()> {
        self.clear_cached();
        check_coordinates(&self.coordinates)
    }

    fn clear_cached(&mut self) {
        self.latlondepth.take();
        self.ecef.take();
        self.ned.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn small_grid() -> CartesianLocationGrid {
        CartesianLocationGrid::new(Location::new(46.0, 8.0))
            .with_x(-1000.0, 1000.0, 500.0)
            .with_y(0.0, 2000.0, 1000.0)
            .with_z(0.0, 1000.0, 1000.0)
            .build()
            .unwrap()
    }

    #[test]
    fn shape_and_size() {
        let grid = small_grid();
        assert_eq!(grid.shape(), vec![2, 3, 5]);
        assert_eq!(grid.size(), 30);
        assert_eq!(grid.effective_dimension(), 3);
        for system in grid.supported_systems() {
            assert_eq!(grid.get_nodes(*system).unwrap().shape(), &[30, 3]);
        }
    }

    #[test]
    fn latlondepth_nodes_match_point_conversion() {
        let origin = Location::new(-45.0, 170.0).with_shift(-300.0, 800.0).with_depth(25.0);
        let grid = CartesianLocationGrid::new(origin)
            .with_x(-1000.0, 1000.0, 500.0)
            .with_y(0.0, 2000.0, 1000.0)
            .with_rotation(20.0, 5.0)
            .build()
            .unwrap();
        let ned = grid.get_nodes(CoordinateSystem::Ned).unwrap();
        let lld = grid.get_nodes(CoordinateSystem::LatLonDepth).unwrap();
        for (n, l) in ned.rows().into_iter().zip(lld.rows()) {
            let (lat, lon, depth) = grid.ned_to_latlondepth(n[0], n[1], n[2]);
            assert_eq!((lat, lon, depth), (l[0], l[1], l[2]));
        }
    }

    #[test]
    fn effective_dimension_counts_non_flat_axes() {
        let grid = CartesianLocationGrid::new(Location::new(0.0, 0.0))
            .with_x(0.0, 100.0, 10.0)
            .build()
            .unwrap();
        assert_eq!(grid.shape(), vec![1, 1, 11]);
        assert_eq!(grid.effective_dimension(), 1);
    }

    #[test]
    fn not_updated() {
        let grid = CartesianLocationGrid::new(Location::new(0.0, 0.0));
        assert_eq!(grid.size(), 0);
        assert!(matches!(
            grid.get_nodes(CoordinateSystem::Xyz),
            Err(GatoError::GridNotUpdated("CartesianLocationGrid"))
        ));
    }

    #[test]
    fn unknown_system_name() {
        let grid = small_grid();
        let err = grid.get_nodes_by_name("enu").unwrap_err();
        assert_eq!(
            err.to_string(),
            "coordinate system not supported for CartesianLocationGrid: enu"
        );
    }

    #[test]
    fn nodes_are_cached_until_update() {
        let mut grid = small_grid();
        let first = grid.get_nodes(CoordinateSystem::Ned).unwrap() as *const Array2<f64>;
        let second = grid.get_nodes(CoordinateSystem::Ned).unwrap() as *const Array2<f64>;
        assert_eq!(first, second);

        grid.x_max = 2000.0;
        grid.update().unwrap();
        assert_eq!(grid.get_nodes(CoordinateSystem::Ned).unwrap().nrows(), 2 * 3 * 7);
    }

    #[test]
    fn rotation_azimuth_90() {
        let grid = CartesianLocationGrid::new(Location::new(0.0, 0.0))
            .with_x(0.0, 100.0, 100.0)
            .with_rotation(90.0, 0.0)
            .build()
            .unwrap();
        let ned = grid.get_nodes(CoordinateSystem::Ned).unwrap();
        assert!(ned[[1, 0]].abs() < 1e-9);
        assert!((ned[[1, 1]] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn latlondepth_uses_origin_offset_and_depth() {
        let origin = Location::new(0.0, 0.0).with_shift(1000.0, 0.0).with_depth(500.0);
        let grid = CartesianLocationGrid::new(origin)
            .with_z(0.0, 100.0, 100.0)
            .build()
            .unwrap();
        let lld = grid.get_nodes(CoordinateSystem::LatLonDepth).unwrap();
        let expected_lat = 1000.0 / orthodrome::EARTH_RADIUS * orthodrome::R2D;
        assert!((lld[[0, 0]] - expected_lat).abs() < 1e-12);
        assert_eq!(lld[[0, 2]], 500.0);
        assert_eq!(lld[[1, 2]], 600.0);
    }

    #[test]
    fn ecef_depth_is_radial() {
        let grid = CartesianLocationGrid::new(Location::new(0.0, 0.0))
            .with_z(0.0, 1000.0, 1000.0)
            .build()
            .unwrap();
        let ecef = grid.get_nodes(CoordinateSystem::Ecef).unwrap();
        assert!((ecef[[0, 0]] - ecef[[1, 0]] - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn distances_between_grids() {
        let a = CartesianLocationGrid::new(Location::new(10.0, 10.0)).build().unwrap();
        let b = CartesianLocationGrid::new(Location::new(10.0, 10.0))
            .with_z(0.0, 3000.0, 1000.0)
            .build()
            .unwrap();
        let d = distances_3d(&a, &b).unwrap();
        assert_eq!(d.shape(), &[1, 4]);
        for j in 0..4 {
            assert!((d[[0, j]] - 1000.0 * j as f64).abs() < 1e-6);
        }
    }

    #[test]
    fn unstructured_rejects_wrong_columns() {
        let result = UnstructuredLocationGrid::new(Array2::zeros((3, 4)));
        assert!(matches!(result, Err(GatoError::ShapeMismatch { .. })));
    }

    #[test]
    fn unstructured_latlondepth_row_wise() {
        let coords = array![
            [0.0, 0.0, 0.0, 0.0, 10.0],
            [0.0, 0.0, 1000.0, 0.0, 20.0],
            [5.0, 5.0, 0.0, 0.0, 30.0],
        ];
        let grid = UnstructuredLocationGrid::new(coords).unwrap();
        assert_eq!(grid.shape(), vec![3]);
        let lld = grid.get_nodes(CoordinateSystem::LatLonDepth).unwrap();
        assert_eq!(lld.row(0).to_vec(), vec![0.0, 0.0, 10.0]);
        assert!(lld[[1, 0]] > 0.0);
        assert_eq!(lld.row(2).to_vec(), vec![5.0, 5.0, 30.0]);
        assert!(matches!(
            grid.get_nodes(CoordinateSystem::Xyz),
            Err(GatoError::UnsupportedCoordinateSystem { .. })
        ));
    }

    #[test]
    fn unstructured_ned_relative_to_origin() {
        let locations = vec![
            Location::new(0.0, 0.0).with_shift(1000.0, 0.0).with_depth(100.0),
            Location::new(0.0, 0.0).with_shift(0.0, -2000.0).with_depth(300.0),
        ];
        let grid = UnstructuredLocationGrid::from_locations(&locations)
            .with_origin(Location::new(0.0, 0.0).with_depth(50.0));
        let ned = grid.get_nodes(CoordinateSystem::Ned).unwrap();
        assert!((ned[[0, 0]] - 1000.0).abs() < 1e-6);
        assert!(ned[[0, 1]].abs() < 1e-6);
        assert!((ned[[1, 1]] + 2000.0).abs() < 1e-6);
        assert_eq!(ned[[0, 2]], 50.0);
        assert_eq!(ned[[1, 2]], 250.0);
    }

    #[test]
    fn unstructured_ned_defaults_to_center() {
        let locations = vec![
            Location::new(-12.0, 130.0).with_depth(0.0),
            Location::new(-12.03, 130.02).with_depth(400.0),
            Location::new(-11.98, 130.05).with_depth(100.0),
            Location::new(-12.0, 130.0).with_shift(2500.0, 1200.0).with_depth(700.0),
        ];
        let mut grid = UnstructuredLocationGrid::from_locations(&locations);
        assert!(grid.origin.is_none());
        let centered = grid.get_nodes(CoordinateSystem::Ned).unwrap().clone();

        let center = grid.get_center().unwrap();
        assert!((center.depth() - 300.0).abs() < 1e-9);
        assert_eq!(grid.get_effective_origin().unwrap(), center);

        grid.set_origin(Some(center));
        let explicit = grid.get_nodes(CoordinateSystem::Ned).unwrap();
        assert_eq!(&centered, explicit);

        let mean = centered.mean_axis(ndarray::Axis(0)).unwrap();
        assert!(mean[0].abs() < 1e-2, "mean north {}", mean[0]);
        assert!(mean[1].abs() < 1e-2, "mean east {}", mean[1]);
        assert!(mean[2].abs() < 1e-9, "mean down {}", mean[2]);
    }

    #[test]
    fn unstructured_ned_uses_shifted_origin() {
        let origin = Location::new(30.0, 30.0).with_shift(500.0, -250.0);
        let node = Location::new(30.0, 30.0).with_shift(500.0, -250.0).with_depth(10.0);
        let grid = UnstructuredLocationGrid::from_locations(&[node]).with_origin(origin);
        let ned = grid.get_nodes(CoordinateSystem::Ned).unwrap();
        assert!(ned[[0, 0]].abs() < 1e-6, "north {}", ned[[0, 0]]);
        assert!(ned[[0, 1]].abs() < 1e-6, "east {}", ned[[0, 1]]);
        assert_eq!(ned[[0, 2]], 10.0);
    }

    #[test]
    fn unstructured_center_of_empty_grid() {
        let grid = UnstructuredLocationGrid::new(Array2::zeros((0, 5))).unwrap();
        assert!(matches!(grid.get_center(), Err(GatoError::EmptyGrid)));
    }

    #[test]
    fn set_origin_only_drops_ned_cache() {
        let locations = vec![Location::new(1.0, 1.0), Location::new(1.01, 1.02)];
        let mut grid = UnstructuredLocationGrid::from_locations(&locations);
        let lld = grid.get_nodes(CoordinateSystem::LatLonDepth).unwrap() as *const Array2<f64>;
        grid.get_nodes(CoordinateSystem::Ned).unwrap();
        grid.set_origin(Some(Location::new(1.0, 1.0)));
        let lld2 = grid.get_nodes(CoordinateSystem::LatLonDepth).unwrap() as *const Array2<f64>;
        assert_eq!(lld, lld2);
        let ned = grid.get_nodes(CoordinateSystem::Ned).unwrap();
        assert!(ned[[0, 0]].abs() < 1e-9 && ned[[0, 1]].abs() < 1e-9);
    }
}
