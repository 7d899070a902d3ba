//! Geo-clustering router tests
//!
//! Cluster shape, nearest-neighbor ordering and the cost model.

mod fixtures;

use std::collections::HashSet;

use bin_route_planner::haversine::HaversineDistance;
use bin_route_planner::model::{Bin, RouteStatus};
use bin_route_planner::router::{optimize_routes, RouterOptions};
use bin_route_planner::traits::DistanceProvider;
use bin_route_planner::PlannerError;

use fixtures::{CONNAUGHT_PLACE, SOUTH_DELHI};

// ============================================================================
// Helper Functions
// ============================================================================

fn options(max_cluster_size: usize) -> RouterOptions {
    RouterOptions {
        max_cluster_size,
        ..RouterOptions::default()
    }
}

fn ids(bins: &[String]) -> Vec<&str> {
    bins.iter().map(String::as_str).collect()
}

/// Deterministic bins; every third one has no coordinate.
fn scattered_bins(n: usize) -> Vec<Bin> {
    (0..n)
        .map(|i| {
            let bin = Bin::new(format!("bin-{}", i), 100.0 - i as f64);
            if i % 3 == 2 {
                bin
            } else {
                let lat = 28.5 + ((i * 37) % 17) as f64 * 0.01;
                let lng = 77.1 + ((i * 53) % 19) as f64 * 0.01;
                bin.with_coordinate(lat, lng)
            }
        })
        .collect()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_two_close_bins_and_one_without_gps() {
    let bins = vec![
        Bin::new("A", 95.0).with_coordinate(28.6, 77.2),
        Bin::new("B", 90.0).with_coordinate(28.61, 77.21),
        Bin::new("C", 85.0),
    ];

    let clusters = optimize_routes(&bins, &options(2), &HaversineDistance::default()).unwrap();

    assert_eq!(clusters.len(), 2);
    assert_eq!(ids(&clusters[0].bins), vec!["A", "B"]);
    assert_eq!(clusters[0].distance_km, 1.5);
    // 1.5 km * 3 + 2 bins * 15 = 34.5
    assert_eq!(clusters[0].estimated_time_minutes, 35);

    assert_eq!(ids(&clusters[1].bins), vec!["C"]);
    assert_eq!(clusters[1].distance_km, 0.0);
    assert_eq!(clusters[1].estimated_time_minutes, 15);
}

#[test]
fn test_empty_candidates() {
    let clusters = optimize_routes::<Bin, _>(&[], &options(5), &HaversineDistance::default()).unwrap();
    assert!(clusters.is_empty());
}

#[test]
fn test_neighborhoods_end_up_in_separate_clusters() {
    // Fullest first, alternating between the two neighborhoods
    let bins = vec![
        CONNAUGHT_PLACE[0].bin("cp0", 99.0),
        SOUTH_DELHI[0].bin("sd0", 98.0),
        CONNAUGHT_PLACE[1].bin("cp1", 97.0),
        SOUTH_DELHI[1].bin("sd1", 96.0),
        CONNAUGHT_PLACE[2].bin("cp2", 95.0),
        SOUTH_DELHI[2].bin("sd2", 94.0),
        CONNAUGHT_PLACE[3].bin("cp3", 93.0),
    ];

    let clusters = optimize_routes(&bins, &options(4), &HaversineDistance::default()).unwrap();

    assert_eq!(clusters.len(), 2);
    // Rajiv Chowk -> Palika Bazaar -> Janpath -> Barakhamba
    assert_eq!(ids(&clusters[0].bins), vec!["cp0", "cp3", "cp1", "cp2"]);

    let south: HashSet<&str> = clusters[1].bins.iter().map(String::as_str).collect();
    assert_eq!(south, HashSet::from(["sd0", "sd1", "sd2"]));
    assert_eq!(clusters[1].bins[0], "sd0", "seed is the first remaining candidate");
}

#[test]
fn test_chain_follows_last_member_not_seed() {
    // Points on a line; each hop is closest to the previous one
    let bins = vec![
        Bin::new("p0", 90.0).with_coordinate(28.60, 77.20),
        Bin::new("p3", 89.0).with_coordinate(28.63, 77.20),
        Bin::new("p1", 88.0).with_coordinate(28.61, 77.20),
        Bin::new("p2", 87.0).with_coordinate(28.62, 77.20),
    ];

    let clusters = optimize_routes(&bins, &options(4), &HaversineDistance::default()).unwrap();

    assert_eq!(ids(&clusters[0].bins), vec!["p0", "p1", "p2", "p3"]);
    // Three legs of ~1.11 km, open path
    assert_eq!(clusters[0].distance_km, 3.3);
}

#[test]
fn test_clusters_start_planned() {
    let clusters = optimize_routes(&scattered_bins(7), &options(3), &HaversineDistance::default()).unwrap();
    assert!(clusters.iter().all(|cluster| cluster.status == RouteStatus::Planned));
}

#[test]
fn test_zero_cluster_size_is_a_validation_error() {
    let err = optimize_routes(&scattered_bins(3), &options(0), &HaversineDistance::default()).unwrap_err();
    assert!(matches!(err, PlannerError::Validation(_)));
}

#[test]
fn test_custom_cost_model() {
    let bins = vec![Bin::new("a", 80.0), Bin::new("b", 80.0)];
    let options = RouterOptions {
        max_cluster_size: 2,
        minutes_per_km: 2.0,
        service_minutes_per_bin: 10.0,
    };

    let clusters = optimize_routes(&bins, &options, &HaversineDistance::default()).unwrap();

    // One leg at the missing-coordinate default of 5 km
    assert_eq!(clusters[0].distance_km, 5.0);
    assert_eq!(clusters[0].estimated_time_minutes, 30);
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_cluster_count_and_sizes() {
    let distance = HaversineDistance::default();

    for n in 1..=13 {
        for size in 1..=6 {
            let bins = scattered_bins(n);
            let clusters = optimize_routes(&bins, &options(size), &distance).unwrap();

            assert_eq!(clusters.len(), n.div_ceil(size), "n={} size={}", n, size);
            for cluster in &clusters[..clusters.len() - 1] {
                assert_eq!(cluster.len(), size, "n={} size={}", n, size);
            }
            let last = clusters.last().unwrap();
            assert!(!last.is_empty() && last.len() <= size);

            let members: Vec<&String> = clusters.iter().flat_map(|c| c.bins.iter()).collect();
            let unique: HashSet<&String> = members.iter().copied().collect();
            let input: HashSet<&String> = bins.iter().map(|bin| &bin.id).collect();
            assert_eq!(members.len(), n, "no duplicates");
            assert_eq!(unique, input, "every bin routed exactly once");
        }
    }
}

#[test]
fn test_distance_is_symmetric_for_fixture_sites() {
    let distance = HaversineDistance::default();
    let sites: Vec<_> = CONNAUGHT_PLACE.iter().chain(SOUTH_DELHI).collect();

    for a in &sites {
        for b in &sites {
            let ab = distance.distance_km(Some((a.lat, a.lng)), Some((b.lat, b.lng)));
            let ba = distance.distance_km(Some((b.lat, b.lng)), Some((a.lat, a.lng)));
            assert!((ab - ba).abs() < 1e-6, "{} <-> {}", a.name, b.name);
        }
    }
}

#[test]
fn test_missing_coordinate_is_always_default() {
    let distance = HaversineDistance::default();
    for site in CONNAUGHT_PLACE.iter().chain(SOUTH_DELHI) {
        assert_eq!(distance.distance_km(None, Some((site.lat, site.lng))), 5.0);
        assert_eq!(distance.distance_km(Some((site.lat, site.lng)), None), 5.0);
    }
}
