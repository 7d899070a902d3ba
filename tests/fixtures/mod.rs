//! Test fixtures for bin-route-planner.
//!
//! Provides realistic test data including:
//! - Bin sites around central New Delhi
//! - Builders for bins and collection history

pub mod delhi_sites;

pub use delhi_sites::*;
