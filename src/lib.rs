//! bin-route-planner
//!
//! Collection route clustering and fill-date forecasting for monitored
//! waste bins.

pub mod config;
pub mod error;
pub mod forecast;
pub mod haversine;
pub mod logging;
pub mod memory;
pub mod model;
pub mod router;
pub mod service;
pub mod supabase;
pub mod traits;

pub use config::PlannerConfig;
pub use error::{ErrorCategory, ErrorPayload, PlannerError};
pub use model::{Bin, BinStatus, CollectionEvent, FillPrediction, RouteCluster, RouteStatus};
