//! Typed CRUD for the dashboard's list screens.
//!
//! Each record type implements [`Resource`], which names its collection path
//! and its client-side validation. The generic operations on [`ApiClient`]
//! (`list`, `list_all`, `create`, `update`, `delete`) serve every screen.
//!
//! PAGINATION
//! ==========
//! The backend answers list calls either with
//! `{data, pagination: {total, totalPages, currentPage}}` or with a bare
//! array. For bare arrays the totals are estimated from the page size: a
//! short page is the last page, a full page implies at least one more.

use std::fmt;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, ValidationError};
use crate::pipeline::{ApiClient, Payload};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Record identifier; the backend uses both numeric and string ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{n}"),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for RecordId {
    fn from(raw: &str) -> Self {
        raw.parse::<i64>().map_or_else(|_| RecordId::Text(raw.to_owned()), RecordId::Number)
    }
}

/// A record type served from a REST collection.
pub trait Resource: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync {
    /// Collection path relative to the API base, e.g. `/categories`.
    const PATH: &'static str;

    /// Client-side constraints checked before create/update.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() { Err(ValidationError::Required(field)) } else { Ok(()) }
}

// =============================================================================
// RECORDS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sr_no: Option<u32>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub popular: bool,
}

impl Resource for Category {
    const PATH: &'static str = "/categories";

    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.category, "category")?;
        require(&self.product, "product")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sr_no: Option<u32>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub popular: bool,
}

impl Resource for Location {
    const PATH: &'static str = "/locations";

    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.location, "location")?;
        require(&self.region, "region")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sr_no: Option<u32>,
    #[serde(default)]
    pub categories: String,
    #[serde(default)]
    pub shop: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review: bool,
}

impl Resource for Rating {
    const PATH: &'static str = "/ratings";

    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.categories, "categories")?;
        require(&self.shop, "shop")?;
        if !(0.0..=5.0).contains(&self.rating) {
            return Err(ValidationError::RatingOutOfRange);
        }
        Ok(())
    }
}

/// A legal-policy FAQ entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

impl Resource for LegalPolicy {
    const PATH: &'static str = "/legal-policies";

    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.question, "question")?;
        require(&self.answer, "answer")
    }
}

/// A titled report section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl Resource for Report {
    const PATH: &'static str = "/reports";

    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.title, "title")
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: DEFAULT_PAGE_SIZE }
    }
}

impl PageRequest {
    /// Clamp page and limit to at least 1.
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page: page.max(1), limit: limit.max(1) }
    }

    fn query(self) -> [(&'static str, String); 2] {
        [("page", self.page.to_string()), ("limit", self.limit.to_string())]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub total_pages: u32,
    pub current_page: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaginationMeta {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    current_page: Option<u32>,
}

impl<T: DeserializeOwned> Page<T> {
    /// Decode either response shape.
    ///
    /// # Errors
    ///
    /// `MissingField("data")` when the body is neither shape, or
    /// `InvalidJson` when records do not match `T`.
    pub fn from_body(body: Value, request: PageRequest) -> Result<Self, ApiError> {
        match body {
            Value::Array(items) => {
                let items = decode_items::<T>(items)?;
                Ok(Self::estimated(items, request))
            }
            Value::Object(mut map) => {
                let (Some(Value::Array(items)), Some(meta)) = (map.remove("data"), map.remove("pagination")) else {
                    return Err(ApiError::MissingField("data"));
                };
                let meta: PaginationMeta = serde_json::from_value(meta)?;
                Ok(Self {
                    items: decode_items(items)?,
                    total: meta.total,
                    total_pages: meta.total_pages,
                    current_page: meta.current_page.unwrap_or(request.page),
                })
            }
            _ => Err(ApiError::MissingField("data")),
        }
    }

    fn estimated(items: Vec<T>, request: PageRequest) -> Self {
        let len = u64::try_from(items.len()).unwrap_or(u64::MAX);
        let (total, total_pages) = if len < u64::from(request.limit) {
            (u64::from(request.page.saturating_sub(1)) * u64::from(request.limit) + len, request.page)
        } else {
            (u64::from(request.page) * u64::from(request.limit), request.page.saturating_add(1))
        };
        Self { items, total, total_pages, current_page: request.page }
    }
}

fn decode_items<T: DeserializeOwned>(items: Vec<Value>) -> Result<Vec<T>, ApiError> {
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(ApiError::from))
        .collect()
}

/// Bare array, or the array under `data`.
fn unwrap_list(body: Value) -> Result<Vec<Value>, ApiError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(ApiError::MissingField("data")),
        },
        _ => Err(ApiError::MissingField("data")),
    }
}

// =============================================================================
// OPERATIONS
// =============================================================================

impl ApiClient {
    /// `GET {PATH}?page=&limit=`.
    ///
    /// # Errors
    ///
    /// Transport, status and decode failures.
    pub async fn list<T: Resource>(&self, request: PageRequest) -> Result<Page<T>, ApiError> {
        let request = PageRequest::new(request.page, request.limit);
        let body = self.get(T::PATH, &request.query()).await?;
        Page::from_body(body, request)
    }

    /// `GET {PATH}` without pagination parameters.
    ///
    /// # Errors
    ///
    /// Transport, status and decode failures.
    pub async fn list_all<T: Resource>(&self) -> Result<Vec<T>, ApiError> {
        let body = self.get(T::PATH, &[]).await?;
        decode_items(unwrap_list(body)?)
    }

    /// `POST {PATH}` after validation. Returns the server's response body.
    ///
    /// # Errors
    ///
    /// Validation failures (no request sent), transport and status failures.
    pub async fn create<T: Resource>(&self, record: &T) -> Result<Value, ApiError> {
        record.validate()?;
        let body = serde_json::to_value(record)?;
        let created = self.request(Method::POST, T::PATH, &[], Payload::Json(body)).await?;
        tracing::info!(path = T::PATH, "record created");
        Ok(created)
    }

    /// `PUT {PATH}/{id}` after validation.
    ///
    /// # Errors
    ///
    /// Validation failures (no request sent), transport and status failures.
    pub async fn update<T: Resource>(&self, id: &RecordId, record: &T) -> Result<Value, ApiError> {
        record.validate()?;
        let body = serde_json::to_value(record)?;
        let path = format!("{}/{id}", T::PATH);
        let updated = self.request(Method::PUT, &path, &[], Payload::Json(body)).await?;
        tracing::info!(path = %path, "record updated");
        Ok(updated)
    }

    /// `DELETE {PATH}/{id}`.
    ///
    /// # Errors
    ///
    /// Transport and status failures.
    pub async fn delete<T: Resource>(&self, id: &RecordId) -> Result<Value, ApiError> {
        let path = format!("{}/{id}", T::PATH);
        let deleted = self.request(Method::DELETE, &path, &[], Payload::Empty).await?;
        tracing::info!(path = %path, "record deleted");
        Ok(deleted)
    }
}

#[cfg(test)]
#[path = "resources_test.rs"]
mod tests;
