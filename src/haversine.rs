//! Great-circle distance between bins.
//!
//! Bins without GPS are assumed to be a fixed, short hop from anything else,
//! so a missing coordinate never stops a route from being built.

use serde::Deserialize;

use crate::traits::DistanceProvider;

/// Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance assumed when either end has no coordinate.
pub const MISSING_COORDINATE_KM: f64 = 5.0;

/// Haversine-based distance provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HaversineDistance {
    pub earth_radius_km: f64,
    pub missing_coordinate_km: f64,
}

impl Default for HaversineDistance {
    fn default() -> Self {
        Self {
            earth_radius_km: EARTH_RADIUS_KM,
            missing_coordinate_km: MISSING_COORDINATE_KM,
        }
    }
}

impl HaversineDistance {
    pub fn new(earth_radius_km: f64, missing_coordinate_km: f64) -> Self {
        Self {
            earth_radius_km,
            missing_coordinate_km,
        }
    }
}

impl DistanceProvider for HaversineDistance {
    fn distance_km(&self, from: Option<(f64, f64)>, to: Option<(f64, f64)>) -> f64 {
        match (from, to) {
            (Some(from), Some(to)) => haversine_km(from, to, self.earth_radius_km),
            _ => self.missing_coordinate_km,
        }
    }
}

/// Calculate haversine distance between two points in kilometers.
pub fn haversine_km(from: (f64, f64), to: (f64, f64), earth_radius_km: f64) -> f64 {
    let (lat1, lng1) = from;
    let (lat2, lng2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    earth_radius_km * c
}

/// Length of an open path (no return leg), rounded to one decimal.
pub fn path_distance_km<D>(points: &[Option<(f64, f64)>], distance: &D) -> f64
where
    D: DistanceProvider + ?Sized,
{
    let total: f64 = points
        .windows(2)
        .map(|leg| distance.distance_km(leg[0], leg[1]))
        .sum();
    round_to_tenth(total)
}

pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
