//! Planner configuration.
//!
//! Every tunable has a default; `from_env` overlays `BIN_PLANNER_*`
//! variables on top of them.

use std::env;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::PlannerError;
use crate::forecast::ForecastOptions;
use crate::haversine::HaversineDistance;
use crate::router::RouterOptions;

pub const ENV_PREFIX: &str = "BIN_PLANNER_";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Minimum fill level for a bin to be routed.
    pub collection_threshold: f64,
    /// How many history rows the forecaster reads.
    pub history_limit: usize,
    pub router: RouterOptions,
    pub forecast: ForecastOptions,
    pub distance: HaversineDistance,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            collection_threshold: 75.0,
            history_limit: 1000,
            router: RouterOptions::default(),
            forecast: ForecastOptions::default(),
            distance: HaversineDistance::default(),
        }
    }
}

impl PlannerConfig {
    /// Defaults overridden by any `BIN_PLANNER_*` variables that are set.
    pub fn from_env() -> Result<Self, PlannerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`PlannerConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PlannerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        override_with(&mut config.collection_threshold, "COLLECTION_THRESHOLD", get("COLLECTION_THRESHOLD"))?;
        override_with(&mut config.history_limit, "HISTORY_LIMIT", get("HISTORY_LIMIT"))?;
        override_with(&mut config.router.max_cluster_size, "MAX_CLUSTER_SIZE", get("MAX_CLUSTER_SIZE"))?;
        override_with(&mut config.router.minutes_per_km, "MINUTES_PER_KM", get("MINUTES_PER_KM"))?;
        override_with(
            &mut config.router.service_minutes_per_bin,
            "SERVICE_MINUTES_PER_BIN",
            get("SERVICE_MINUTES_PER_BIN"),
        )?;
        override_with(&mut config.forecast.default_fill_rate, "DEFAULT_FILL_RATE", get("DEFAULT_FILL_RATE"))?;
        override_with(&mut config.forecast.full_threshold, "FULL_THRESHOLD", get("FULL_THRESHOLD"))?;
        override_with(&mut config.distance.earth_radius_km, "EARTH_RADIUS_KM", get("EARTH_RADIUS_KM"))?;
        override_with(
            &mut config.distance.missing_coordinate_km,
            "MISSING_COORDINATE_KM",
            get("MISSING_COORDINATE_KM"),
        )?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PlannerError> {
        validate_threshold(self.collection_threshold)?;
        if !(self.distance.earth_radius_km > 0.0) {
            return Err(PlannerError::validation("earth_radius_km must be positive"));
        }
        if !(self.distance.missing_coordinate_km >= 0.0) {
            return Err(PlannerError::validation("missing_coordinate_km must be non-negative"));
        }
        self.router.validate()?;
        self.forecast.validate()
    }
}

/// A routing threshold is a fill percentage.
pub fn validate_threshold(threshold: f64) -> Result<(), PlannerError> {
    if threshold.is_finite() && (0.0..=100.0).contains(&threshold) {
        Ok(())
    } else {
        Err(PlannerError::validation(format!(
            "threshold must be within 0..=100, got {}",
            threshold
        )))
    }
}

fn override_with<T: FromStr>(slot: &mut T, name: &str, raw: Option<String>) -> Result<(), PlannerError> {
    if let Some(raw) = raw {
        *slot = raw.trim().parse().map_err(|_| {
            PlannerError::validation(format!("{}{} has an invalid value: {:?}", ENV_PREFIX, name, raw))
        })?;
    }
    Ok(())
}
