//! Geo-clustering router.
//!
//! Builds collection clusters by greedy nearest-neighbor chaining: seed a
//! cluster with the first remaining candidate, then keep appending the
//! remaining candidate closest to the last member until the cluster is full.
//! There is no backtracking or tour improvement. Clusters are small, so the
//! O(n²) scan is the whole cost.

use serde::Deserialize;
use tracing::debug;

use crate::error::PlannerError;
use crate::haversine::path_distance_km;
use crate::model::{RouteCluster, RouteStatus};
use crate::traits::{CollectionPoint, DistanceProvider};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RouterOptions {
    /// Upper bound on bins per cluster. Must be at least 1.
    pub max_cluster_size: usize,
    /// Travel minutes per kilometer.
    pub minutes_per_km: f64,
    /// Service minutes spent at each bin.
    pub service_minutes_per_bin: f64,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            max_cluster_size: 5,
            minutes_per_km: 3.0,
            service_minutes_per_bin: 15.0,
        }
    }
}

impl RouterOptions {
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.max_cluster_size < 1 {
            return Err(PlannerError::validation("max_cluster_size must be at least 1"));
        }
        if !(self.minutes_per_km >= 0.0) || !(self.service_minutes_per_bin >= 0.0) {
            return Err(PlannerError::validation(
                "minutes_per_km and service_minutes_per_bin must be non-negative",
            ));
        }
        Ok(())
    }
}

/// Partition `candidates` into ordered clusters.
///
/// Candidates are consumed in the given order, so callers should pass the
/// fullest bins first. All clusters but the last have exactly
/// `max_cluster_size` members.
pub fn optimize_routes<P, D>(
    candidates: &[P],
    options: &RouterOptions,
    distance: &D,
) -> Result<Vec<RouteCluster<P::Id>>, PlannerError>
where
    P: CollectionPoint,
    D: DistanceProvider + ?Sized,
{
    options.validate()?;

    let mut remaining: Vec<&P> = candidates.iter().collect();
    let mut clusters = Vec::with_capacity(candidates.len().div_ceil(options.max_cluster_size));

    while !remaining.is_empty() {
        let seed = remaining.remove(0);
        let mut chain = vec![seed];

        while chain.len() < options.max_cluster_size && !remaining.is_empty() {
            let last = chain[chain.len() - 1].coordinate();
            let nearest = nearest_index(last, &remaining, distance);
            chain.push(remaining.remove(nearest));
        }

        let cluster = build_cluster(&chain, options, distance);
        debug!(
            bins = cluster.bins.len(),
            distance_km = cluster.distance_km,
            minutes = cluster.estimated_time_minutes,
            "closed cluster"
        );
        clusters.push(cluster);
    }

    Ok(clusters)
}

/// Index of the remaining candidate closest to `from`.
///
/// Ties go to the earliest index; only a strictly smaller distance replaces
/// the current best.
fn nearest_index<P, D>(from: Option<(f64, f64)>, remaining: &[&P], distance: &D) -> usize
where
    P: CollectionPoint,
    D: DistanceProvider + ?Sized,
{
    let mut best_index = 0;
    let mut best_distance = f64::INFINITY;

    for (index, candidate) in remaining.iter().enumerate() {
        let d = distance.distance_km(from, candidate.coordinate());
        if d < best_distance {
            best_distance = d;
            best_index = index;
        }
    }

    best_index
}

fn build_cluster<P, D>(chain: &[&P], options: &RouterOptions, distance: &D) -> RouteCluster<P::Id>
where
    P: CollectionPoint,
    D: DistanceProvider + ?Sized,
{
    let points: Vec<_> = chain.iter().map(|point| point.coordinate()).collect();
    let distance_km = path_distance_km(&points, distance);

    RouteCluster {
        bins: chain.iter().map(|point| point.id().clone()).collect(),
        distance_km,
        estimated_time_minutes: estimate_minutes(distance_km, chain.len(), options),
        status: RouteStatus::Planned,
    }
}

/// Linear cost model: travel per kilometer plus service per bin, rounded up.
pub fn estimate_minutes(distance_km: f64, bins: usize, options: &RouterOptions) -> u32 {
    let minutes = distance_km * options.minutes_per_km + bins as f64 * options.service_minutes_per_bin;
    minutes.ceil() as u32
}
