// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gato::core::CoordinateSystem;
use gato::delays::{shared, GenericDelayTable, PlaneWaveDM, SharedGrid, SphericalWaveDM};
use gato::location::Location;
use gato::location_grid::{CartesianLocationGrid, UnstructuredLocationGrid};
use gato::slowness_grid::CartesianSlownessGrid;

fn source_volume(n: usize) -> SharedGrid {
    let half = (n as f64 - 1.0) * 500.0;
    shared(
        CartesianLocationGrid::new(Location::new(46.0, 8.0).with_depth(5000.0))
            .with_x(-half, half, 1000.0)
            .with_y(-half, half, 1000.0)
            .with_z(0.0, 4000.0, 1000.0)
            .build()
            .unwrap(),
    )
}

fn stations(n: usize) -> SharedGrid {
    let locations: Vec<Location> = (0..n)
        .map(|i| {
            let a = (i as f64 * 137.5).to_radians();
            let r = 200.0 * (i as f64).sqrt();
            Location::new(46.0, 8.0).with_shift(r * a.cos(), r * a.sin())
        })
        .collect();
    shared(UnstructuredLocationGrid::from_locations(&locations))
}

/// Beamforming table: 81x81 slownesses against 200 stations.
fn bench_plane_wave(c: &mut Criterion) {
    let slownesses: SharedGrid = shared(
        CartesianSlownessGrid::new()
            .with_sx(-4e-4, 4e-4, 1e-5)
            .with_sy(-4e-4, 4e-4, 1e-5)
            .build()
            .unwrap(),
    );
    let receivers = stations(200);
    receivers.borrow().get_nodes(CoordinateSystem::Ned).unwrap();
    c.bench_function("plane_wave_6561x200", |b| {
        b.iter_with_setup(
            || GenericDelayTable::new(slownesses.clone(), receivers.clone(), Box::new(PlaneWaveDM)),
            |table| {
                black_box(table.get_delays().unwrap().sum());
            },
        );
    });
}

/// Spherical-wave table on a source volume, using the global rayon pool.
fn bench_spherical_wave(c: &mut Criterion) {
    let sources = source_volume(41);
    let receivers = stations(200);
    sources.borrow().get_nodes(CoordinateSystem::Ecef).unwrap();
    receivers.borrow().get_nodes(CoordinateSystem::Ecef).unwrap();

    let threads = rayon::current_num_threads();
    c.bench_function(&format!("spherical_wave_8405x200_{}threads", threads), |b| {
        b.iter_with_setup(
            || {
                let method = SphericalWaveDM::new(6000.0).unwrap();
                GenericDelayTable::new(sources.clone(), receivers.clone(), Box::new(method))
            },
            |table| {
                black_box(table.get_delays().unwrap().sum());
            },
        );
    });
}

/// Node generation for growing location grids.
fn bench_grid_nodes(c: &mut Criterion) {
    let mut group = c.benchmark_group("location_grid_ecef");
    for &n in &[21, 41, 81] {
        group.bench_function(format!("{}x{}x5", n, n), |b| {
            b.iter_with_setup(
                || source_volume(n),
                |grid| {
                    black_box(grid.borrow().get_nodes(CoordinateSystem::Ecef).unwrap().nrows());
                },
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_plane_wave,
    bench_spherical_wave,
    bench_grid_nodes,
);
criterion_main!(benches);
