//! Seams between the planning core and its collaborators.
//!
//! The core only sees these traits. Storage, transport and the dashboard
//! sit behind them.

use crate::error::PlannerError;
use crate::model::{Bin, CollectionEvent, FillPrediction, NewRoute, RouteRecord};

/// Something the router can place in a cluster.
pub trait CollectionPoint {
    type Id: Clone;

    fn id(&self) -> &Self::Id;

    /// Location coordinates (lat, lng), if known.
    fn coordinate(&self) -> Option<(f64, f64)>;
}

impl CollectionPoint for Bin {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn coordinate(&self) -> Option<(f64, f64)> {
        Bin::coordinate(self)
    }
}

/// Distance in kilometers between two optional coordinates.
///
/// Must be total: a missing coordinate yields a value, never a panic.
pub trait DistanceProvider {
    fn distance_km(&self, from: Option<(f64, f64)>, to: Option<(f64, f64)>) -> f64;
}

/// Read side of the datastore.
pub trait BinDataProvider {
    /// Bins with `fill_level >= threshold`, fullest first.
    fn bins_above_threshold(&self, threshold: f64) -> Result<Vec<Bin>, PlannerError>;

    fn all_bins(&self) -> Result<Vec<Bin>, PlannerError>;

    /// Most recent collection events first, at most `limit` of them.
    fn history(&self, limit: usize) -> Result<Vec<CollectionEvent>, PlannerError>;
}

/// Write side of the datastore.
pub trait PlanStore {
    fn insert_route(&self, route: &NewRoute) -> Result<RouteRecord, PlannerError>;

    /// Replaces any prediction with the same `(bin_id, predicted_fill_date)`.
    fn upsert_prediction(&self, prediction: &FillPrediction) -> Result<(), PlannerError>;
}
