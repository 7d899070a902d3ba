//! Hosted datastore adapter over its PostgREST endpoint.

use reqwest::blocking::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::PlannerError;
use crate::model::{Bin, CollectionEvent, FillPrediction, NewRoute, RouteRecord};
use crate::traits::{BinDataProvider, PlanStore};

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    pub bins_table: String,
    pub history_table: String,
    pub routes_table: String,
    pub predictions_table: String,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            api_key: String::new(),
            timeout_secs: 10,
            bins_table: "bins".to_string(),
            history_table: "collection_history".to_string(),
            routes_table: "collection_routes".to_string(),
            predictions_table: "waste_predictions".to_string(),
        }
    }
}

impl SupabaseConfig {
    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }
}

#[derive(Debug, Clone)]
pub struct SupabaseClient {
    config: SupabaseConfig,
    client: reqwest::blocking::Client,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    fn fetch<T: DeserializeOwned>(
        &self,
        what: &'static str,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, PlannerError> {
        let url = self.config.table_url(table);
        debug!(%url, ?query, "fetching rows");

        self.authorized(self.client.get(&url).query(query))
            .send()
            .and_then(Response::error_for_status)
            .and_then(|resp| resp.json::<Vec<T>>())
            .map_err(|err| PlannerError::data_access(what, err))
    }
}

/// PostgREST query for `fill_level >= threshold`, fullest first.
fn threshold_query(threshold: f64) -> Vec<(&'static str, String)> {
    vec![
        ("select", "*".to_string()),
        ("fill_level", format!("gte.{}", threshold)),
        ("order", "fill_level.desc".to_string()),
    ]
}

fn history_query(limit: usize) -> Vec<(&'static str, String)> {
    vec![
        ("select", "*".to_string()),
        ("order", "collected_at.desc".to_string()),
        ("limit", limit.to_string()),
    ]
}

impl BinDataProvider for SupabaseClient {
    fn bins_above_threshold(&self, threshold: f64) -> Result<Vec<Bin>, PlannerError> {
        self.fetch("bins", &self.config.bins_table, &threshold_query(threshold))
    }

    fn all_bins(&self) -> Result<Vec<Bin>, PlannerError> {
        self.fetch("bins", &self.config.bins_table, &[("select", "*".to_string())])
    }

    fn history(&self, limit: usize) -> Result<Vec<CollectionEvent>, PlannerError> {
        self.fetch("collection history", &self.config.history_table, &history_query(limit))
    }
}

impl PlanStore for SupabaseClient {
    fn insert_route(&self, route: &NewRoute) -> Result<RouteRecord, PlannerError> {
        let url = self.config.table_url(&self.config.routes_table);

        let rows = self
            .authorized(self.client.post(url))
            .header("Prefer", "return=representation")
            .json(route)
            .send()
            .and_then(Response::error_for_status)
            .and_then(|resp| resp.json::<Vec<RouteRecord>>())
            .map_err(|err| PlannerError::persistence("route", err))?;

        rows.into_iter()
            .next()
            .ok_or_else(|| PlannerError::persistence("route", "insert returned no row"))
    }

    fn upsert_prediction(&self, prediction: &FillPrediction) -> Result<(), PlannerError> {
        let url = self.config.table_url(&self.config.predictions_table);

        self.authorized(self.client.post(url))
            .query(&[("on_conflict", "bin_id,predicted_fill_date")])
            .header("Prefer", "resolution=merge-duplicates")
            .json(prediction)
            .send()
            .and_then(Response::error_for_status)
            .map(|_| ())
            .map_err(|err| PlannerError::persistence("prediction", err))
    }
}
