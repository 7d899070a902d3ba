//! Optimization and forecasting triggers.
//!
//! Each trigger reads a snapshot through a [`BinDataProvider`], runs one of
//! the pure planning passes and writes the results through a [`PlanStore`].
//! A failed read aborts the trigger. A failed write is logged and skipped.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::{validate_threshold, PlannerConfig};
use crate::error::PlannerError;
use crate::forecast::predict_fill_dates;
use crate::model::{FillPrediction, NewRoute, RouteRecord};
use crate::router::optimize_routes;
use crate::traits::{BinDataProvider, PlanStore};

pub const NO_BINS_MESSAGE: &str = "No bins need collection";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OptimizeRoutesRequest {
    /// Overrides the configured collection threshold.
    #[serde(default)]
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OptimizeRoutesResponse {
    Planned {
        message: String,
        routes: Vec<RouteRecord>,
        bins_included: usize,
    },
    NothingToCollect {
        message: String,
        route: Option<RouteRecord>,
    },
}

impl OptimizeRoutesResponse {
    fn nothing_to_collect() -> Self {
        OptimizeRoutesResponse::NothingToCollect {
            message: NO_BINS_MESSAGE.to_string(),
            route: None,
        }
    }

    pub fn routes(&self) -> &[RouteRecord] {
        match self {
            OptimizeRoutesResponse::Planned { routes, .. } => routes,
            OptimizeRoutesResponse::NothingToCollect { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictFillLevelsResponse {
    pub message: String,
    pub predictions: Vec<FillPrediction>,
    /// Predictions the store accepted.
    pub persisted: usize,
}

/// Route names are `Auto-Route <date>-<n>`, numbered from 1.
pub fn route_name(today: NaiveDate, sequence: usize) -> String {
    format!("Auto-Route {}-{}", today.format("%Y-%m-%d"), sequence)
}

pub struct RoutePlanner<P, S> {
    provider: P,
    store: S,
    config: PlannerConfig,
}

impl<P, S> RoutePlanner<P, S>
where
    P: BinDataProvider,
    S: PlanStore,
{
    pub fn new(provider: P, store: S, config: PlannerConfig) -> Result<Self, PlannerError> {
        config.validate()?;
        Ok(Self {
            provider,
            store,
            config,
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Cluster the bins at or above the threshold and store one route per cluster.
    pub fn optimize_routes(
        &self,
        request: &OptimizeRoutesRequest,
        today: NaiveDate,
    ) -> Result<OptimizeRoutesResponse, PlannerError> {
        let threshold = request.threshold.unwrap_or(self.config.collection_threshold);
        validate_threshold(threshold)?;

        let bins = self.provider.bins_above_threshold(threshold)?;
        if bins.is_empty() {
            info!(threshold, "no bins need collection");
            return Ok(OptimizeRoutesResponse::nothing_to_collect());
        }

        let clusters = optimize_routes(&bins, &self.config.router, &self.config.distance)?;

        let mut routes = Vec::with_capacity(clusters.len());
        for (index, cluster) in clusters.into_iter().enumerate() {
            let route = NewRoute {
                name: route_name(today, index + 1),
                cluster,
            };
            match self.store.insert_route(&route) {
                Ok(record) => routes.push(record),
                Err(err) => error!(route = %route.name, error = %err, "failed to store route"),
            }
        }

        info!(routes = routes.len(), bins = bins.len(), "created optimized routes");

        Ok(OptimizeRoutesResponse::Planned {
            message: format!("Created {} optimized collection routes", routes.len()),
            routes,
            bins_included: bins.len(),
        })
    }

    /// Forecast every bin and upsert the predictions.
    pub fn predict_fill_levels(&self, today: NaiveDate) -> Result<PredictFillLevelsResponse, PlannerError> {
        let bins = self.provider.all_bins()?;
        let history = self.provider.history(self.config.history_limit)?;

        if history.len() == self.config.history_limit {
            warn!(limit = self.config.history_limit, "history read hit its limit; older events ignored");
        }

        let predictions = predict_fill_dates(&bins, &history, today, &self.config.forecast);

        let mut persisted = 0;
        for prediction in &predictions {
            match self.store.upsert_prediction(prediction) {
                Ok(()) => persisted += 1,
                Err(err) => error!(bin = %prediction.bin_id, error = %err, "failed to store prediction"),
            }
        }

        info!(predictions = predictions.len(), persisted, "generated predictions");

        Ok(PredictFillLevelsResponse {
            message: format!("Generated predictions for {} bins", predictions.len()),
            predictions,
            persisted,
        })
    }
}

impl<P, S> RoutePlanner<P, S>
where
    P: BinDataProvider + Sync,
    S: PlanStore + Sync,
{
    /// Run both triggers concurrently. They share no output.
    pub fn run_cycle(
        &self,
        request: &OptimizeRoutesRequest,
        today: NaiveDate,
    ) -> (
        Result<OptimizeRoutesResponse, PlannerError>,
        Result<PredictFillLevelsResponse, PlannerError>,
    ) {
        rayon::join(
            || self.optimize_routes(request, today),
            || self.predict_fill_levels(today),
        )
    }
}
