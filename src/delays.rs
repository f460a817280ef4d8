// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::cell::{OnceCell, RefCell};
use std::rc::Rc;

use ndarray::{Array1, Array2, Axis};
use tracing::debug;

use crate::core::{cached, CoordinateSystem, Grid};
use crate::error::{GatoError, Result};
use crate::location_grid::distances_3d;

/// A grid that can be referenced by several delay tables.
///
/// Mutate the grid through a typed handle, then call [`Grid::update`] on it
/// and [`GenericDelayTable::clear_cached`] on every table that uses it.
pub type SharedGrid = Rc<RefCell<dyn Grid>>;

/// Wrap a grid for sharing between delay tables.
pub fn shared<G: Grid + 'static>(grid: G) -> Rc<RefCell<G>> {
    Rc::new(RefCell::new(grid))
}

/// Numerical procedure computing travel-time delays between every node of
/// a source grid and every node of a receiver grid.
pub trait DelayMethod {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Compute the raw `(source_grid.size(), receiver_grid.size())` delay
    /// matrix [s].
    fn calculate(&self, source_grid: &dyn Grid, receiver_grid: &dyn Grid) -> Result<Array2<f64>>;
}

/// Plane-wave delays: the dot product of each source slowness vector with
/// each receiver position.
///
/// Source nodes are read as slowness vectors [s/m] and receiver nodes as
/// offsets [m], both in the `ned` system.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaneWaveDM;

impl DelayMethod for PlaneWaveDM {
    fn name(&self) -> &'static str {
        "plane_wave"
    }

    fn calculate(&self, source_grid: &dyn Grid, receiver_grid: &dyn Grid) -> Result<Array2<f64>> {
        let slownesses = source_grid.get_nodes(CoordinateSystem::Ned)?;
        let ned = receiver_grid.get_nodes(CoordinateSystem::Ned)?;
        Ok(slownesses.dot(&ned.t()))
    }
}

/// Spherical-wave delays: 3D distance between source and receiver nodes
/// divided by a constant velocity.
#[derive(Debug, Clone, Copy)]
pub struct SphericalWaveDM {
    velocity: f64,
}

impl SphericalWaveDM {
    /// Create the method for a propagation velocity [m/s].
    ///
    /// # Errors
    /// Returns [`GatoError::InvalidVelocity`] unless `velocity` is positive
    /// and finite.
    pub fn new(velocity: f64) -> Result<Self> {
        if !velocity.is_finite() || velocity <= 0.0 {
            return Err(GatoError::InvalidVelocity(velocity));
        }
        Ok(SphericalWaveDM { velocity })
    }

    /// Propagation velocity [m/s].
    pub fn velocity(&self) -> f64 {
        self.velocity
    }
}

impl DelayMethod for SphericalWaveDM {
    fn name(&self) -> &'static str {
        "spherical_wave"
    }

    fn calculate(&self, source_grid: &dyn Grid, receiver_grid: &dyn Grid) -> Result<Array2<f64>> {
        Ok(distances_3d(source_grid, receiver_grid)? / self.velocity)
    }
}

/// Delay table combining a delay method with optional corrections.
///
/// The final matrix is
/// `method(source, receiver) - reference_time + receiver_delays[j] + source_delays[i]`.
/// It is computed on first access and cached; the cache is not aware of
/// changes to the shared grids and must be cleared explicitly.
pub struct GenericDelayTable {
    source_grid: SharedGrid,
    receiver_grid: SharedGrid,
    method: Box<dyn DelayMethod>,
    reference_time: Option<f64>,
    source_delays: Option<Array1<f64>>,
    receiver_delays: Option<Array1<f64>>,
    delays: OnceCell<Array2<f64>>,
}

impl GenericDelayTable {
    /// Create a table without corrections.
    pub fn new(
        source_grid: SharedGrid,
        receiver_grid: SharedGrid,
        method: Box<dyn DelayMethod>,
    ) -> Self {
        GenericDelayTable {
            source_grid,
            receiver_grid,
            method,
            reference_time: None,
            source_delays: None,
            receiver_delays: None,
            delays: OnceCell::new(),
        }
    }

    /// Subtract a reference time [s] from all delays (builder method).
    pub fn with_reference_time(mut self, reference_time: f64) -> Self {
        self.set_reference_time(Some(reference_time));
        self
    }

    /// Add a static correction [s] per source node (builder method).
    pub fn with_source_delays(mut self, source_delays: Array1<f64>) -> Self {
        self.set_source_delays(Some(source_delays));
        self
    }

    /// Add a static correction [s] per receiver node (builder method).
    pub fn with_receiver_delays(mut self, receiver_delays: Array1<f64>) -> Self {
        self.set_receiver_delays(Some(receiver_delays));
        self
    }

    /// The source grid.
    pub fn source_grid(&self) -> &SharedGrid {
        &self.source_grid
    }

    /// The receiver grid.
    pub fn receiver_grid(&self) -> &SharedGrid {
        &self.receiver_grid
    }

    /// The delay method.
    pub fn method(&self) -> &dyn DelayMethod {
        self.method.as_ref()
    }

    /// Reference time [s], if set.
    pub fn reference_time(&self) -> Option<f64> {
        self.reference_time
    }

    /// Per-source corrections [s], if set.
    pub fn source_delays(&self) -> Option<&Array1<f64>> {
        self.source_delays.as_ref()
    }

    /// Per-receiver corrections [s], if set.
    pub fn receiver_delays(&self) -> Option<&Array1<f64>> {
        self.receiver_delays.as_ref()
    }

    /// Replace the delay method and drop the cached matrix.
    pub fn set_method(&mut self, method: Box<dyn DelayMethod>) {
        self.method = method;
        self.clear_cached();
    }

    /// Replace the reference time and drop the cached matrix.
    pub fn set_reference_time(&mut self, reference_time: Option<f64>) {
        self.reference_time = reference_time;
        self.clear_cached();
    }

    /// Replace the per-source corrections and drop the cached matrix.
    pub fn set_source_delays(&mut self, source_delays: Option<Array1<f64>>) {
        self.source_delays = source_delays;
        self.clear_cached();
    }

    /// Replace the per-receiver corrections and drop the cached matrix.
    pub fn set_receiver_delays(&mut self, receiver_delays: Option<Array1<f64>>) {
        self.receiver_delays = receiver_delays;
        self.clear_cached();
    }

    /// Drop the cached delay matrix.
    pub fn clear_cached(&mut self) {
        self.delays.take();
    }

    /// Whether a delay matrix is currently cached.
    pub fn is_cached(&self) -> bool {
        self.delays.get().is_some()
    }

    /// `(n_source, n_receiver)`.
    pub fn shape(&self) -> Result<(usize, usize)> {
        Ok((
            borrow_grid(&self.source_grid)?.size(),
            borrow_grid(&self.receiver_grid)?.size(),
        ))
    }

    /// The corrected `(n_source, n_receiver)` delay matrix [s].
    ///
    /// # Errors
    /// Returns an error if a correction vector does not match its grid, if
    /// a grid cannot provide the nodes the method needs, or if a grid is
    /// currently borrowed mutably.
    pub fn get_delays(&self) -> Result<&Array2<f64>> {
        cached(&self.delays, || self.compute())
    }

    fn compute(&self) -> Result<Array2<f64>> {
        let source = borrow_grid(&self.source_grid)?;
        let receiver = borrow_grid(&self.receiver_grid)?;
        let (ns, nr) = (source.size(), receiver.size());

        check_length("source", ns, self.source_delays.as_ref())?;
        check_length("receiver", nr, self.receiver_delays.as_ref())?;

        let mut delays = self.method.calculate(&*source, &*receiver)?;
        if delays.dim() != (ns, nr) {
            return Err(GatoError::ShapeMismatch {
                expected: vec![ns, nr],
                got: delays.shape().to_vec(),
            });
        }

        if let Some(reference_time) = self.reference_time {
            delays -= reference_time;
        }

        if let Some(receiver_delays) = &self.receiver_delays {
            delays += &receiver_delays.view().insert_axis(Axis(0));
        }

        if let Some(source_delays) = &self.source_delays {
            delays += &source_delays.view().insert_axis(Axis(1));
        }

        debug!(
            method = self.method.name(),
            sources = ns,
            receivers = nr,
            "computed delay table"
        );
        Ok(delays)
    }
}

fn borrow_grid(grid: &SharedGrid) -> Result<std::cell::Ref<'_, dyn Grid>> {
    grid.try_borrow()
        .map_err(|_| GatoError::Other("grid is mutably borrowed".to_string()))
}

fn check_length(which: &'static str, expected: usize, delays: Option<&Array1<f64>>) -> Result<()> {
    match delays {
        Some(d) if d.len() != expected => Err(GatoError::CorrectionLengthMismatch {
            which,
            expected,
            got: d.len(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use ndarray::array;

    use super::*;
    use crate::location::Location;
    use crate::location_grid::{CartesianLocationGrid, UnstructuredLocationGrid};
    use crate::slowness_grid::CartesianSlownessGrid;

    struct CountingMethod<M> {
        inner: M,
        calls: Rc<Cell<usize>>,
    }

    impl<M: DelayMethod> DelayMethod for CountingMethod<M> {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn calculate(&self, s: &dyn Grid, r: &dyn Grid) -> Result<Array2<f64>> {
            self.calls.set(self.calls.get() + 1);
            self.inner.calculate(s, r)
        }
    }

    fn slowness_north() -> SharedGrid {
        shared(
            CartesianSlownessGrid::new()
                .with_sx(1.0, 1.0, 1.0)
                .build()
                .unwrap(),
        )
    }

    fn receivers() -> Rc<RefCell<CartesianLocationGrid>> {
        shared(
            CartesianLocationGrid::new(Location::new(0.0, 0.0))
                .with_x(0.0, 2000.0, 1000.0)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn plane_wave_single_pair() {
        let source = slowness_north();
        let receiver = shared(
            CartesianLocationGrid::new(Location::new(0.0, 0.0))
                .with_x(1000.0, 1000.0, 1.0)
                .build()
                .unwrap(),
        );
        let delays = PlaneWaveDM
            .calculate(&*source.borrow(), &*receiver.borrow())
            .unwrap();
        assert_eq!(delays, array![[1000.0]]);
    }

    #[test]
    fn plane_wave_needs_ned_on_both_grids() {
        let coords = array![[0.0, 0.0, 0.0, 0.0, 0.0]];
        let unstructured = UnstructuredLocationGrid::new(coords).unwrap();
        let source = slowness_north();
        // Unstructured grids have ned, so this works in either role.
        assert!(PlaneWaveDM.calculate(&*source.borrow(), &unstructured).is_ok());
        // Slowness grids have no ecef, so spherical waves fail.
        let sw = SphericalWaveDM::new(1000.0).unwrap();
        assert!(matches!(
            sw.calculate(&*source.borrow(), &unstructured),
            Err(GatoError::UnsupportedCoordinateSystem { .. })
        ));
    }

    #[test]
    fn spherical_wave_vertical_distance() {
        let source = CartesianLocationGrid::new(Location::new(30.0, 40.0).with_depth(2000.0))
            .build()
            .unwrap();
        let receiver = CartesianLocationGrid::new(Location::new(30.0, 40.0)).build().unwrap();
        let delays = SphericalWaveDM::new(1000.0)
            .unwrap()
            .calculate(&source, &receiver)
            .unwrap();
        assert!((delays[[0, 0]] - 2.0).abs() < 1e-9, "delay = {}", delays[[0, 0]]);
    }

    #[test]
    fn invalid_velocity_rejected() {
        for v in [0.0, -300.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                SphericalWaveDM::new(v),
                Err(GatoError::InvalidVelocity(_))
            ));
        }
    }

    #[test]
    fn delays_cached_between_calls() {
        let calls = Rc::new(Cell::new(0));
        let method = CountingMethod {
            inner: PlaneWaveDM,
            calls: Rc::clone(&calls),
        };
        let mut table = GenericDelayTable::new(slowness_north(), receivers(), Box::new(method));

        let first = table.get_delays().unwrap() as *const Array2<f64>;
        let second = table.get_delays().unwrap() as *const Array2<f64>;
        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
        assert!(table.is_cached());

        table.clear_cached();
        assert!(!table.is_cached());
        table.get_delays().unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn corrections_applied() {
        let table = GenericDelayTable::new(slowness_north(), receivers(), Box::new(PlaneWaveDM))
            .with_reference_time(100.0)
            .with_receiver_delays(array![0.5, 1.5, 2.5])
            .with_source_delays(array![10.0]);
        let delays = table.get_delays().unwrap();
        assert_eq!(delays, &array![[-89.5, 911.5, 1912.5]]);
        assert_eq!(table.shape().unwrap(), (1, 3));
    }

    #[test]
    fn correction_length_mismatch() {
        let table = GenericDelayTable::new(slowness_north(), receivers(), Box::new(PlaneWaveDM))
            .with_receiver_delays(array![0.5, 1.5]);
        assert!(matches!(
            table.get_delays(),
            Err(GatoError::CorrectionLengthMismatch {
                which: "receiver",
                expected: 3,
                got: 2
            })
        ));
        assert!(!table.is_cached());
    }

    #[test]
    fn shared_grid_mutation_requires_clear() {
        let receiver = receivers();
        let receiver_dyn: SharedGrid = receiver.clone();
        let mut a = GenericDelayTable::new(slowness_north(), receiver_dyn.clone(), Box::new(PlaneWaveDM));
        let b = GenericDelayTable::new(slowness_north(), receiver_dyn, Box::new(PlaneWaveDM));
        assert_eq!(a.get_delays().unwrap().ncols(), 3);
        assert_eq!(b.get_delays().unwrap().ncols(), 3);

        {
            let mut grid = receiver.borrow_mut();
            grid.x_max = 4000.0;
            grid.update().unwrap();
        }

        // Stale until cleared.
        assert_eq!(a.get_delays().unwrap().ncols(), 3);
        a.clear_cached();
        assert_eq!(a.get_delays().unwrap().ncols(), 5);
    }

    #[test]
    fn setters_clear_cache() {
        let mut table = GenericDelayTable::new(slowness_north(), receivers(), Box::new(PlaneWaveDM));
        table.get_delays().unwrap();
        table.set_reference_time(Some(1.0));
        assert!(!table.is_cached());
        assert_eq!(table.get_delays().unwrap()[[0, 1]], 999.0);
    }

    #[test]
    fn mutably_borrowed_grid_is_an_error() {
        let receiver = receivers();
        let table = GenericDelayTable::new(slowness_north(), receiver.clone(), Box::new(PlaneWaveDM));
        let _guard = receiver.borrow_mut();
        assert!(matches!(table.get_delays(), Err(GatoError::Other(_))));
    }
}
