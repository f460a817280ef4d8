// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::cell::Cell;

use serde::{Deserialize, Serialize};

use crate::orthodrome::{self, D2R, R2D};

/// Geographical location.
///
/// A reference point at the earth's surface (`lat`, `lon`, `elevation`) plus
/// a cartesian offset from it (`north_shift`, `east_shift`, `depth`). The
/// offset corrected position is available through
/// [`Location::effective_latlon`] and is cached until one of the four
/// horizontal fields is changed through its setter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    lat: f64,
    lon: f64,
    north_shift: f64,
    east_shift: f64,
    elevation: f64,
    depth: f64,
    #[serde(skip)]
    latlon: Cell<Option<(f64, f64)>>,
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.lat == other.lat
            && self.lon == other.lon
            && self.north_shift == other.north_shift
            && self.east_shift == other.east_shift
            && self.elevation == other.elevation
            && self.depth == other.depth
    }
}

impl Location {
    /// Location at the given reference point without offset.
    pub fn new(lat: f64, lon: f64) -> Self {
        Location {
            lat,
            lon,
            ..Default::default()
        }
    }

    /// Set the cartesian offset (builder method).
    pub fn with_shift(mut self, north_shift: f64, east_shift: f64) -> Self {
        self.set_north_shift(north_shift);
        self.set_east_shift(east_shift);
        self
    }

    /// Set the depth below surface (builder method).
    pub fn with_depth(mut self, depth: f64) -> Self {
        self.depth = depth;
        self
    }

    /// Set the surface elevation (builder method).
    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = elevation;
        self
    }

    /// Latitude of the reference point [deg].
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude of the reference point [deg].
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Northward offset from the reference point [m].
    pub fn north_shift(&self) -> f64 {
        self.north_shift
    }

    /// Eastward offset from the reference point [m].
    pub fn east_shift(&self) -> f64 {
        self.east_shift
    }

    /// Surface elevation above sea level [m].
    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    /// Depth below surface [m].
    pub fn depth(&self) -> f64 {
        self.depth
    }

    /// Set the reference latitude [deg].
    pub fn set_lat(&mut self, lat: f64) {
        self.lat = lat;
        self.latlon.set(None);
    }

    /// Set the reference longitude [deg].
    pub fn set_lon(&mut self, lon: f64) {
        self.lon = lon;
        self.latlon.set(None);
    }

    /// Set the northward offset [m].
    pub fn set_north_shift(&mut self, north_shift: f64) {
        self.north_shift = north_shift;
        self.latlon.set(None);
    }

    /// Set the eastward offset [m].
    pub fn set_east_shift(&mut self, east_shift: f64) {
        self.east_shift = east_shift;
        self.latlon.set(None);
    }

    /// Set the surface elevation [m].
    pub fn set_elevation(&mut self, elevation: f64) {
        self.elevation = elevation;
    }

    /// Set the depth below surface [m].
    pub fn set_depth(&mut self, depth: f64) {
        self.depth = depth;
    }

    /// Offset-corrected `(lat, lon)` of the location [deg].
    pub fn effective_latlon(&self) -> (f64, f64) {
        if let Some(latlon) = self.latlon.get() {
            return latlon;
        }
        let latlon = if self.north_shift == 0.0 && self.east_shift == 0.0 {
            (self.lat, self.lon)
        } else {
            orthodrome::ne_to_latlon(self.lat, self.lon, self.north_shift, self.east_shift)
        };
        self.latlon.set(Some(latlon));
        latlon
    }

    /// Offset-corrected latitude [deg].
    pub fn effective_lat(&self) -> f64 {
        self.effective_latlon().0
    }

    /// Offset-corrected longitude [deg].
    pub fn effective_lon(&self) -> f64 {
        self.effective_latlon().1
    }

    /// Whether `other` has the same reference point.
    pub fn same_origin(&self, other: &Location) -> bool {
        self.lat == other.lat && self.lon == other.lon
    }

    /// Surface distance to `other` [m].
    ///
    /// Flat-earth distance between the offsets if both share a reference
    /// point, ellipsoidal distance between the effective positions otherwise.
    pub fn distance_to(&self, other: &Location) -> f64 {
        if self.same_origin(other) {
            (self.north_shift - other.north_shift).hypot(self.east_shift - other.east_shift)
        } else {
            let (slat, slon) = self.effective_latlon();
            let (rlat, rlon) = other.effective_latlon();
            orthodrome::distance_accurate50m(slat, slon, rlat, rlon)
        }
    }

    /// 3D distance to `other` [m], including the depth difference.
    ///
    /// Locations with different reference points are compared in ECEF.
    pub fn distance_3d_to(&self, other: &Location) -> f64 {
        if self.same_origin(other) {
            let dn = self.north_shift - other.north_shift;
            let de = self.east_shift - other.east_shift;
            let dd = self.depth - other.depth;
            (dn * dn + de * de + dd * dd).sqrt()
        } else {
            let (slat, slon) = self.effective_latlon();
            let (rlat, rlon) = other.effective_latlon();
            let s = orthodrome::geodetic_to_ecef(slat, slon, -self.depth);
            let r = orthodrome::geodetic_to_ecef(rlat, rlon, -other.depth);
            ((s[0] - r[0]).powi(2) + (s[1] - r[1]).powi(2) + (s[2] - r[2]).powi(2)).sqrt()
        }
    }

    /// Azimuth and back-azimuth to and from `other` [deg].
    pub fn azibazi_to(&self, other: &Location) -> (f64, f64) {
        if self.same_origin(other) {
            let azi = R2D
                * (other.east_shift - self.east_shift).atan2(other.north_shift - self.north_shift);
            (azi, azi + 180.0)
        } else {
            let (slat, slon) = self.effective_latlon();
            let (rlat, rlon) = other.effective_latlon();
            orthodrome::azibazi(slat, slon, rlat, rlon)
        }
    }

    /// North/east offset of `other` relative to this location [m].
    pub fn offset_to(&self, other: &Location) -> (f64, f64) {
        if self.same_origin(other) {
            (
                other.north_shift - self.north_shift,
                other.east_shift - self.east_shift,
            )
        } else {
            let (azi, _) = self.azibazi_to(other);
            let dist = self.distance_to(other);
            (dist * (azi * D2R).cos(), dist * (azi * D2R).sin())
        }
    }

    /// Signed distance to the great circle from `path_begin` to `path_end`
    /// [deg].
    pub fn crosstrack_distance_to(&self, path_begin: &Location, path_end: &Location) -> f64 {
        let (blat, blon) = path_begin.effective_latlon();
        let (elat, elon) = path_end.effective_latlon();
        let (plat, plon) = self.effective_latlon();
        orthodrome::crosstrack_distance(blat, blon, elat, elon, plat, plon)
    }

    /// Distance from `path_begin` along the great circle towards `path_end`
    /// to the foot point of this location, in [deg] or, with `meter`, in [m].
    pub fn alongtrack_distance_to(
        &self,
        path_begin: &Location,
        path_end: &Location,
        meter: bool,
    ) -> f64 {
        let (blat, blon) = path_begin.effective_latlon();
        let (elat, elon) = path_end.effective_latlon();
        let (plat, plon) = self.effective_latlon();
        if meter {
            orthodrome::alongtrack_distance_m(blat, blon, elat, elon, plat, plon)
        } else {
            orthodrome::alongtrack_distance(blat, blon, elat, elon, plat, plon)
        }
    }

    /// Move the reference point to `(lat, lon)` while keeping the effective
    /// position. The offsets are recomputed accordingly.
    pub fn set_origin(&mut self, lat: f64, lon: f64) {
        let (elat, elon) = self.effective_latlon();
        let (north, east) = orthodrome::latlon_to_ne(lat, lon, elat, elon);
        self.lat = lat;
        self.lon = lon;
        self.north_shift = north;
        self.east_shift = east;
        self.latlon.set(Some((elat, elon)));
    }

    /// `[lat, lon, north_shift, east_shift, depth]`.
    pub fn coords5(&self) -> [f64; 5] {
        [
            self.lat,
            self.lon,
            self.north_shift,
            self.east_shift,
            self.depth,
        ]
    }
}

/// Keep locations whose azimuth seen from `center` lies within
/// `azimuth ± azimuth_width` [deg].
///
/// Azimuths may be given in `-180..180` or `0..360`; windows crossing north
/// or south are handled.
pub fn filter_azimuths<'a>(
    locations: &'a [Location],
    center: &Location,
    azimuth: f64,
    azimuth_width: f64,
) -> Vec<&'a Location> {
    locations
        .iter()
        .filter(|loc| {
            let (azi, _) = center.azibazi_to(loc);
            let mut diff = (azi - azimuth).rem_euclid(360.0);
            if diff > 180.0 {
                diff -= 360.0;
            }
            diff.abs() <= azimuth_width
        })
        .collect()
}

/// Keep locations whose surface distance to `reference` is within
/// `[distance_min, distance_max]` [m].
pub fn filter_distance<'a>(
    locations: &'a [Location],
    reference: &Location,
    distance_min: f64,
    distance_max: f64,
) -> Vec<&'a Location> {
    locations
        .iter()
        .filter(|loc| {
            let d = loc.distance_to(reference);
            distance_min <= d && d <= distance_max
        })
        .collect()
}

/// Keep locations within `distance_max` [deg] of the great circle from
/// `path_begin` to `path_end`.
pub fn filter_crosstrack_distance<'a>(
    locations: &'a [Location],
    path_begin: &Location,
    path_end: &Location,
    distance_max: f64,
) -> Vec<&'a Location> {
    locations
        .iter()
        .filter(|loc| loc.crosstrack_distance_to(path_begin, path_end).abs() <= distance_max)
        .collect()
}
