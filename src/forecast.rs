//! Fill-rate forecaster.
//!
//! Estimates how fast each bin fills from its collection history and
//! projects the day it reaches the operational full threshold.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use rayon::prelude::*;
use serde::Deserialize;

use crate::error::PlannerError;
use crate::model::{Bin, CollectionEvent, FillPrediction};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForecastOptions {
    /// Percent per day assumed when history says nothing usable.
    pub default_fill_rate: f64,
    pub min_fill_rate: f64,
    pub max_fill_rate: f64,
    /// Level treated as "full" for prediction purposes.
    pub full_threshold: f64,
    /// Events needed before history is trusted over the default rate.
    pub min_history_events: usize,
    pub sparse_history_confidence: f64,
    pub base_confidence: f64,
    pub confidence_per_event: f64,
    pub max_confidence: f64,
}

impl Default for ForecastOptions {
    fn default() -> Self {
        Self {
            default_fill_rate: 10.0,
            min_fill_rate: 5.0,
            max_fill_rate: 20.0,
            full_threshold: 90.0,
            min_history_events: 2,
            sparse_history_confidence: 0.5,
            base_confidence: 0.6,
            confidence_per_event: 0.05,
            max_confidence: 0.95,
        }
    }
}

impl ForecastOptions {
    pub fn validate(&self) -> Result<(), PlannerError> {
        if !(self.default_fill_rate > 0.0) {
            return Err(PlannerError::validation("default_fill_rate must be positive"));
        }
        if !(self.min_fill_rate > 0.0) || self.min_fill_rate > self.max_fill_rate {
            return Err(PlannerError::validation(
                "fill rate bounds must satisfy 0 < min_fill_rate <= max_fill_rate",
            ));
        }
        if !(0.0..=100.0).contains(&self.full_threshold) {
            return Err(PlannerError::validation("full_threshold must be within 0..=100"));
        }
        Ok(())
    }
}

/// One prediction per bin, in input order.
///
/// History is grouped by bin once up front; each bin then only sees its own
/// events, in the order they were supplied.
pub fn predict_fill_dates(
    bins: &[Bin],
    history: &[CollectionEvent],
    today: NaiveDate,
    options: &ForecastOptions,
) -> Vec<FillPrediction> {
    let mut by_bin: HashMap<&str, Vec<&CollectionEvent>> = HashMap::new();
    for event in history {
        by_bin.entry(event.bin_id.as_str()).or_default().push(event);
    }

    bins.par_iter()
        .map(|bin| {
            let events = by_bin.get(bin.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            predict_for_bin(bin, events, today, options)
        })
        .collect()
}

fn predict_for_bin(
    bin: &Bin,
    events: &[&CollectionEvent],
    today: NaiveDate,
    options: &ForecastOptions,
) -> FillPrediction {
    let (rate, confidence) = if events.len() < options.min_history_events {
        (options.default_fill_rate, options.sparse_history_confidence)
    } else {
        let rate = fill_rate_from_history(events, options).unwrap_or(options.default_fill_rate);
        (rate, confidence_for(events.len(), options))
    };

    let days = days_to_full(bin.fill_level, rate, options);
    // Out-of-range dates only happen with absurd rates; stay on today.
    let predicted_fill_date = today.checked_add_days(Days::new(days)).unwrap_or(today);

    FillPrediction {
        bin_id: bin.id.clone(),
        predicted_fill_date,
        predicted_fill_level: options.full_threshold,
        confidence_score: confidence,
    }
}

/// Mean fill rate over adjacent event pairs, clamped to the configured bounds.
///
/// For a pair `(a, b)` the sample is `(a.before - b.after) / |a.at - b.at|`
/// in percent per day. Pairs with no elapsed time or no positive drop are
/// skipped. Returns `None` when no pair qualifies.
pub fn fill_rate_from_history(events: &[&CollectionEvent], options: &ForecastOptions) -> Option<f64> {
    let (sum, count) = events
        .windows(2)
        .filter_map(|pair| {
            let (a, b) = (pair[0], pair[1]);
            let days = (a.collected_at - b.collected_at).num_milliseconds().abs() as f64 / MILLIS_PER_DAY;
            let drop = a.fill_level_before - b.fill_level_after;
            (days > 0.0 && drop > 0.0).then(|| drop / days)
        })
        .fold((0.0, 0usize), |(sum, count), sample| (sum + sample, count + 1));

    if count == 0 {
        return None;
    }

    let mean = sum / count as f64;
    Some(mean.clamp(options.min_fill_rate, options.max_fill_rate))
}

/// Whole days until `fill_level` reaches the full threshold.
///
/// Zero when already there, otherwise at least one.
pub fn days_to_full(fill_level: f64, fill_rate_per_day: f64, options: &ForecastOptions) -> u64 {
    let remaining = options.full_threshold - fill_level;
    if remaining <= 0.0 {
        return 0;
    }
    let days = (remaining / fill_rate_per_day).ceil();
    days.max(1.0) as u64
}

/// Heuristic confidence that grows with the number of observed events.
pub fn confidence_for(event_count: usize, options: &ForecastOptions) -> f64 {
    if event_count < options.min_history_events {
        return options.sparse_history_confidence;
    }
    let score = options.base_confidence + options.confidence_per_event * event_count as f64;
    score.min(options.max_confidence)
}
