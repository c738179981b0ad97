//! Dashboard summary and global search.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ApiError, ValidationError};
use crate::pipeline::ApiClient;
use crate::resources::{Category, Location};

/// Positive/negative rating split shown on the dashboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingSplit {
    #[serde(default)]
    pub positive: f64,
    #[serde(default)]
    pub negative: f64,
}

/// `GET /dashboard` payload. Unknown fields are kept in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub legal_policies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<RatingSplit>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ApiClient {
    /// # Errors
    ///
    /// Transport, status and decode failures.
    pub async fn dashboard(&self) -> Result<DashboardSummary, ApiError> {
        let body = self.get("/dashboard", &[]).await?;
        if body.is_null() {
            return Ok(DashboardSummary::default());
        }
        Ok(serde_json::from_value(body)?)
    }

    /// `GET /search?q=`. Accepts a bare array or one under `results`/`data`.
    ///
    /// # Errors
    ///
    /// Blank queries fail validation without a request; otherwise transport,
    /// status and shape failures.
    pub async fn search(&self, query: &str) -> Result<Vec<Value>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ValidationError::Required("search query").into());
        }
        let body = self.get("/search", &[("q", query.to_owned())]).await?;
        search_results(body)
    }
}

fn search_results(body: Value) -> Result<Vec<Value>, ApiError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        Value::Object(mut map) => match map.remove("results").or_else(|| map.remove("data")) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(ApiError::MissingField("results")),
        },
        _ => Err(ApiError::MissingField("results")),
    }
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
