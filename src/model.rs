//! Bin, history and derived-record types.
//!
//! Field names follow the rows of the hosted datastore so the same types
//! travel over the wire unchanged.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Fill level at or above which a bin is critical.
pub const CRITICAL_FILL_LEVEL: f64 = 90.0;
/// Fill level at or above which a bin needs attention.
pub const WARNING_FILL_LEVEL: f64 = 75.0;
/// Fill level at or above which a bin is considered in normal use.
pub const NORMAL_FILL_LEVEL: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinStatus {
    Critical,
    Warning,
    Normal,
    Low,
}

impl BinStatus {
    pub fn from_fill_level(fill_level: f64) -> Self {
        if fill_level >= CRITICAL_FILL_LEVEL {
            BinStatus::Critical
        } else if fill_level >= WARNING_FILL_LEVEL {
            BinStatus::Warning
        } else if fill_level >= NORMAL_FILL_LEVEL {
            BinStatus::Normal
        } else {
            BinStatus::Low
        }
    }
}

/// A tracked waste receptacle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    /// Storage identity; routes and history refer to this.
    pub id: String,
    /// Sensor/device code printed on the bin.
    pub bin_id: String,
    pub location: String,
    #[serde(default = "default_capacity")]
    pub capacity: f64,
    /// Percent, 0..=100.
    pub fill_level: f64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: BinStatus,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

fn default_capacity() -> f64 {
    100.0
}

impl Bin {
    /// Creates a bin with a status derived from its fill level and no coordinate.
    pub fn new(id: impl Into<String>, fill_level: f64) -> Self {
        let id = id.into();
        Self {
            bin_id: id.clone(),
            location: format!("Bin {}", id),
            id,
            capacity: default_capacity(),
            fill_level,
            latitude: None,
            longitude: None,
            status: BinStatus::from_fill_level(fill_level),
            last_updated: None,
        }
    }

    pub fn with_coordinate(mut self, lat: f64, lng: f64) -> Self {
        self.latitude = Some(lat);
        self.longitude = Some(lng);
        self
    }

    /// `(lat, lng)` when both halves are known.
    pub fn coordinate(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }
}

/// One emptying of a bin. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionEvent {
    /// References [`Bin::id`].
    pub bin_id: String,
    pub fill_level_before: f64,
    pub fill_level_after: f64,
    pub collected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStatus {
    Planned,
    InProgress,
    Completed,
}

/// An ordered group of bins assigned to one collection run.
///
/// `bins` is the visiting order produced by the nearest-neighbor chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteCluster<Id> {
    pub bins: Vec<Id>,
    pub distance_km: f64,
    pub estimated_time_minutes: u32,
    pub status: RouteStatus,
}

impl<Id> RouteCluster<Id> {
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

/// Insert payload for a planned route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRoute {
    pub name: String,
    #[serde(flatten)]
    pub cluster: RouteCluster<String>,
}

/// A route as handed back by the store after insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub id: String,
    #[serde(flatten)]
    pub route: NewRoute,
}

/// When a bin is expected to reach the operational full threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillPrediction {
    /// References [`Bin::id`].
    pub bin_id: String,
    pub predicted_fill_date: NaiveDate,
    pub predicted_fill_level: f64,
    pub confidence_score: f64,
}

impl FillPrediction {
    /// Upsert key: one prediction per bin per predicted date.
    pub fn conflict_key(&self) -> (&str, NaiveDate) {
        (&self.bin_id, self.predicted_fill_date)
    }
}
