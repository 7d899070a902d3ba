//! In-process datastore.
//!
//! Holds a snapshot of bins and history and records what the planner writes
//! back. Useful for embedding the planner without a hosted database and for
//! exercising the triggers in tests.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use crate::error::PlannerError;
use crate::model::{Bin, CollectionEvent, FillPrediction, NewRoute, RouteRecord};
use crate::traits::{BinDataProvider, PlanStore};

#[derive(Debug, Default)]
struct Inner {
    bins: Vec<Bin>,
    history: Vec<CollectionEvent>,
    routes: Vec<RouteRecord>,
    predictions: Vec<FillPrediction>,
    fail_reads: bool,
    failing_route_names: HashSet<String>,
    failing_prediction_bins: HashSet<String>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new(bins: Vec<Bin>, history: Vec<CollectionEvent>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                bins,
                history,
                ..Inner::default()
            }),
        }
    }

    /// Make every read fail, as if the datastore were unreachable.
    pub fn fail_reads(self) -> Self {
        self.lock().fail_reads = true;
        self
    }

    /// Reject inserts of routes with this name.
    pub fn fail_route_inserts_named(self, name: impl Into<String>) -> Self {
        self.lock().failing_route_names.insert(name.into());
        self
    }

    /// Reject prediction upserts for this bin.
    pub fn fail_prediction_upserts_for(self, bin_id: impl Into<String>) -> Self {
        self.lock().failing_prediction_bins.insert(bin_id.into());
        self
    }

    pub fn routes(&self) -> Vec<RouteRecord> {
        self.lock().routes.clone()
    }

    pub fn predictions(&self) -> Vec<FillPrediction> {
        self.lock().predictions.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock leaves plain data behind; keep going.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read_guard(&self, what: &'static str) -> Result<MutexGuard<'_, Inner>, PlannerError> {
        let inner = self.lock();
        if inner.fail_reads {
            return Err(PlannerError::data_access(what, "datastore unavailable"));
        }
        Ok(inner)
    }
}

impl BinDataProvider for InMemoryStore {
    fn bins_above_threshold(&self, threshold: f64) -> Result<Vec<Bin>, PlannerError> {
        let inner = self.read_guard("bins")?;
        let mut bins: Vec<Bin> = inner
            .bins
            .iter()
            .filter(|bin| bin.fill_level >= threshold)
            .cloned()
            .collect();
        // Stable, so equal levels keep their stored order.
        bins.sort_by(|a, b| b.fill_level.total_cmp(&a.fill_level));
        Ok(bins)
    }

    fn all_bins(&self) -> Result<Vec<Bin>, PlannerError> {
        Ok(self.read_guard("bins")?.bins.clone())
    }

    fn history(&self, limit: usize) -> Result<Vec<CollectionEvent>, PlannerError> {
        let inner = self.read_guard("collection history")?;
        let mut history = inner.history.clone();
        history.sort_by(|a, b| b.collected_at.cmp(&a.collected_at));
        history.truncate(limit);
        Ok(history)
    }
}

impl PlanStore for InMemoryStore {
    fn insert_route(&self, route: &NewRoute) -> Result<RouteRecord, PlannerError> {
        let mut inner = self.lock();
        if inner.failing_route_names.contains(&route.name) {
            return Err(PlannerError::persistence("route", format!("insert of {} rejected", route.name)));
        }

        let record = RouteRecord {
            id: format!("route-{}", inner.routes.len() + 1),
            route: route.clone(),
        };
        inner.routes.push(record.clone());
        Ok(record)
    }

    fn upsert_prediction(&self, prediction: &FillPrediction) -> Result<(), PlannerError> {
        let mut inner = self.lock();
        if inner.failing_prediction_bins.contains(&prediction.bin_id) {
            return Err(PlannerError::persistence(
                "prediction",
                format!("upsert for bin {} rejected", prediction.bin_id),
            ));
        }

        let key = prediction.conflict_key();
        match inner.predictions.iter().position(|existing| existing.conflict_key() == key) {
            Some(index) => inner.predictions[index] = prediction.clone(),
            None => inner.predictions.push(prediction.clone()),
        }
        Ok(())
    }
}
