// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! Geodesy primitives: great-circle geometry on a spherical earth, local
//! north/east projection, ellipsoidal distance and WGS84 ECEF conversion.
//!
//! All angles are in degrees and all lengths in meters unless noted.

use std::f64::consts::PI;

/// Mean earth radius used for spherical computations [m].
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// Equatorial radius of the WGS84 ellipsoid [m].
pub const EARTH_RADIUS_EQUATOR: f64 = 6_378_137.0;

/// Equatorial radius used by [`distance_accurate50m`] [m].
///
/// Rounded value of the Meeus formulation, kept so that distances agree
/// with other tools built on the same routine.
pub const EARTH_RADIUS_EQUATOR_MEEUS: f64 = 6_378_140.0;

/// Flattening of the WGS84 ellipsoid.
pub const EARTH_OBLATENESS: f64 = 1.0 / 298.257_223_563;

/// Degrees to radians.
pub const D2R: f64 = PI / 180.0;

/// Radians to degrees.
pub const R2D: f64 = 180.0 / PI;

/// Wrap `x` into the half-open interval `[lo, hi)`.
pub fn wrap(x: f64, lo: f64, hi: f64) -> f64 {
    let span = hi - lo;
    x - ((x - lo) / span).floor() * span
}

/// Central angle between two points [rad], haversine form.
fn central_angle_rad(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1 * D2R;
    let phi2 = lat2 * D2R;
    let dphi = phi2 - phi1;
    let dlambda = (lon2 - lon1) * D2R;
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * a.sqrt().atan2((1.0 - a).max(0.0).sqrt())
}

/// Initial azimuth of the great circle from point 1 to point 2 [rad].
fn azimuth_rad(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1 * D2R;
    let phi2 = lat2 * D2R;
    let dlambda = (lon2 - lon1) * D2R;
    (dlambda.sin() * phi2.cos())
        .atan2(phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos())
}

/// Convert geodetic coordinates to earth-centered earth-fixed cartesian
/// coordinates on the WGS84 ellipsoid.
///
/// `alt` is the height above the ellipsoid (negative depth).
pub fn geodetic_to_ecef(lat: f64, lon: f64, alt: f64) -> [f64; 3] {
    let f = EARTH_OBLATENESS;
    let e2 = 2.0 * f - f * f;
    let phi = lat * D2R;
    let lambda = lon * D2R;
    let n = EARTH_RADIUS_EQUATOR / (1.0 - e2 * phi.sin().powi(2)).sqrt();
    [
        (n + alt) * phi.cos() * lambda.cos(),
        (n + alt) * phi.cos() * lambda.sin(),
        (n * (1.0 - e2) + alt) * phi.sin(),
    ]
}

/// Project a north/east offset from a reference point into lat/lon.
///
/// Azimuthal-equidistant on the sphere: the offset length is the
/// great-circle distance and its direction the initial azimuth.
pub fn ne_to_latlon(lat0: f64, lon0: f64, north: f64, east: f64) -> (f64, f64) {
    if north == 0.0 && east == 0.0 {
        return (lat0, lon0);
    }
    let delta = north.hypot(east) / EARTH_RADIUS;
    let theta = east.atan2(north);
    let phi1 = lat0 * D2R;

    let sin_phi2 =
        (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos()).clamp(-1.0, 1.0);
    let phi2 = sin_phi2.asin();
    let dlambda = (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * sin_phi2);

    (phi2 * R2D, wrap(lon0 + dlambda * R2D, -180.0, 180.0))
}

/// Inverse of [`ne_to_latlon`]: north/east offset of `(lat, lon)` relative
/// to the reference point `(lat0, lon0)`.
pub fn latlon_to_ne(lat0: f64, lon0: f64, lat: f64, lon: f64) -> (f64, f64) {
    if lat0 == lat && lon0 == lon {
        return (0.0, 0.0);
    }
    let dist = central_angle_rad(lat0, lon0, lat, lon) * EARTH_RADIUS;
    let theta = azimuth_rad(lat0, lon0, lat, lon);
    (dist * theta.cos(), dist * theta.sin())
}

/// Great-circle angular distance between two points [deg].
pub fn distance_deg(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    central_angle_rad(lat1, lon1, lat2, lon2) * R2D
}

/// Ellipsoidal surface distance [m], accurate to about 50 m.
///
/// Andoyer-Lambert style first-order flattening correction of the
/// spherical distance (Meeus, Astronomical Algorithms, ch. 11).
pub fn distance_accurate50m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let f = (lat1 + lat2) * D2R / 2.0;
    let g = (lat1 - lat2) * D2R / 2.0;
    let l = (lon1 - lon2) * D2R / 2.0;

    let s = g.sin().powi(2) * l.cos().powi(2) + f.cos().powi(2) * l.sin().powi(2);
    let c = g.cos().powi(2) * l.cos().powi(2) + f.sin().powi(2) * l.sin().powi(2);

    if s == 0.0 {
        return 0.0;
    }
    if c == 0.0 {
        return PI * EARTH_RADIUS_EQUATOR_MEEUS;
    }

    let w = (s / c).sqrt().atan();
    let r = (s * c).sqrt() / w;
    let d = 2.0 * w * EARTH_RADIUS_EQUATOR_MEEUS;
    let h1 = (3.0 * r - 1.0) / (2.0 * c);
    let h2 = (3.0 * r + 1.0) / (2.0 * s);

    d * (1.0 + EARTH_OBLATENESS * h1 * f.sin().powi(2) * g.cos().powi(2)
        - EARTH_OBLATENESS * h2 * f.cos().powi(2) * g.sin().powi(2))
}

/// Azimuth and back-azimuth between two points [deg], both in `(-180, 180]`.
///
/// Coincident points give `(0, 180)`.
pub fn azibazi(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> (f64, f64) {
    if lat1 == lat2 && lon1 == lon2 {
        return (0.0, 180.0);
    }
    (
        azimuth_rad(lat1, lon1, lat2, lon2) * R2D,
        azimuth_rad(lat2, lon2, lat1, lon1) * R2D,
    )
}

/// Signed distance of a point from the great circle through `begin` and
/// `end` [deg]. Positive to the right of the path direction.
pub fn crosstrack_distance(
    lat_begin: f64,
    lon_begin: f64,
    lat_end: f64,
    lon_end: f64,
    lat_point: f64,
    lon_point: f64,
) -> f64 {
    let d13 = central_angle_rad(lat_begin, lon_begin, lat_point, lon_point);
    let theta13 = azimuth_rad(lat_begin, lon_begin, lat_point, lon_point);
    let theta12 = azimuth_rad(lat_begin, lon_begin, lat_end, lon_end);
    (d13.sin() * (theta13 - theta12).sin()).clamp(-1.0, 1.0).asin() * R2D
}

/// Distance from `begin`, measured along the great circle through `begin`
/// and `end`, to the foot point of a point [deg].
pub fn alongtrack_distance(
    lat_begin: f64,
    lon_begin: f64,
    lat_end: f64,
    lon_end: f64,
    lat_point: f64,
    lon_point: f64,
) -> f64 {
    let d13 = central_angle_rad(lat_begin, lon_begin, lat_point, lon_point);
    let xt = crosstrack_distance(lat_begin, lon_begin, lat_end, lon_end, lat_point, lon_point) * D2R;
    (d13.cos() / xt.cos()).clamp(-1.0, 1.0).acos() * R2D
}

/// Same as [`alongtrack_distance`] but in meters.
pub fn alongtrack_distance_m(
    lat_begin: f64,
    lon_begin: f64,
    lat_end: f64,
    lon_end: f64,
    lat_point: f64,
    lon_point: f64,
) -> f64 {
    alongtrack_distance(lat_begin, lon_begin, lat_end, lon_end, lat_point, lon_point)
        * D2R
        * EARTH_RADIUS
}

/// Geographic midpoint of a set of points, via the mean of their unit
/// vectors. Returns `None` for an empty set.
pub fn geographic_midpoint(lats: &[f64], lons: &[f64]) -> Option<(f64, f64)> {
    let n = lats.len().min(lons.len());
    if n == 0 {
        return None;
    }

    let (mut x, mut y, mut z) = (0.0, 0.0, 0.0);
    for (&lat, &lon) in lats.iter().zip(lons.iter()) {
        let phi = lat * D2R;
        let lambda = lon * D2R;
        x += phi.cos() * lambda.cos();
        y += phi.cos() * lambda.sin();
        z += phi.sin();
    }
    let nf = n as f64;
    let (x, y, z) = (x / nf, y / nf, z / nf);

    let lon = y.atan2(x);
    let lat = z.atan2(x.hypot(y));
    Some((lat * R2D, lon * R2D))
}
