//! Bin sites around central New Delhi.
//!
//! Coordinates are approximate public landmarks, close enough together that
//! nearest-neighbor ordering is easy to reason about.

use bin_route_planner::model::{Bin, CollectionEvent};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// A named site with coordinates.
#[derive(Debug, Clone)]
pub struct Site {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Site {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn bin(&self, id: &str, fill_level: f64) -> Bin {
        let mut bin = Bin::new(id, fill_level).with_coordinate(self.lat, self.lng);
        bin.location = self.name.to_string();
        bin
    }
}

// ============================================================================
// Connaught Place cluster (all within ~1.5 km)
// ============================================================================

pub const CONNAUGHT_PLACE: &[Site] = &[
    Site::new("Rajiv Chowk Metro", 28.6328, 77.2197),
    Site::new("Janpath Market", 28.6262, 77.2186),
    Site::new("Barakhamba Road", 28.6297, 77.2262),
    Site::new("Palika Bazaar", 28.6315, 77.2178),
];

// ============================================================================
// South Delhi cluster (~10 km south of Connaught Place)
// ============================================================================

pub const SOUTH_DELHI: &[Site] = &[
    Site::new("Hauz Khas Village", 28.5535, 77.1942),
    Site::new("Green Park Market", 28.5599, 77.2066),
    Site::new("Sarojini Nagar Market", 28.5770, 77.1996),
];

// ============================================================================
// History builders
// ============================================================================

pub fn at_day(day: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap() + Duration::days(day)
}

/// A collection event for `bin` on day `day` of the fixture month.
pub fn collected(bin: &str, before: f64, after: f64, day: i64) -> CollectionEvent {
    CollectionEvent {
        bin_id: bin.to_string(),
        fill_level_before: before,
        fill_level_after: after,
        collected_at: at_day(day),
    }
}
