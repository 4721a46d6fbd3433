use crate::error::{Result, StoreError};
use crate::shortcode::ShortCode;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A stored URL record.
///
/// Records handed out by a [`Repository`] are owned copies; mutating one
/// never affects the repository's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    /// The unique, case-sensitive key of the record.
    pub short_code: ShortCode,
    /// Where the short code redirects to.
    pub target_url: String,
    /// Optional free text.
    #[serde(default)]
    pub remark: String,
    /// Set once when the record is created and preserved across updates.
    pub create_time: Timestamp,
}

/// Caller input for creating or updating a record.
///
/// The repository owns `create_time`, so it is not part of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParams {
    pub short_code: ShortCode,
    pub target_url: String,
    pub remark: String,
}

impl UrlParams {
    pub fn new(short_code: ShortCode, target_url: impl Into<String>) -> Self {
        Self {
            short_code,
            target_url: target_url.into(),
            remark: String::new(),
        }
    }

    pub fn with_remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = remark.into();
        self
    }

    /// Stamps the params into a record created at `create_time`.
    pub fn into_record(self, create_time: Timestamp) -> UrlRecord {
        UrlRecord {
            short_code: self.short_code,
            target_url: self.target_url,
            remark: self.remark,
            create_time,
        }
    }
}

/// Validates that the target URL is present and has an http(s) scheme and a host.
pub fn validate_target_url(url: &str) -> Result<()> {
    if url.trim().is_empty() {
        return Err(StoreError::Validation(
            "target url cannot be empty".to_string(),
        ));
    }

    let Some((scheme, rest)) = url.split_once("://") else {
        return Err(StoreError::Validation(format!(
            "target url must have a scheme and host: {}",
            url
        )));
    };

    let scheme = scheme.to_ascii_lowercase();
    if scheme != "http" && scheme != "https" {
        return Err(StoreError::Validation(format!(
            "target url scheme must be http or https: {}",
            scheme
        )));
    }

    if rest.is_empty() {
        return Err(StoreError::Validation(format!(
            "target url must have a host: {}",
            url
        )));
    }

    Ok(())
}

/// Concurrency-safe CRUD over [`UrlRecord`]s.
///
/// Every method blocks the calling thread until it completes, including any
/// durable write a mutation performs.
pub trait Repository: Send + Sync + 'static {
    /// Creates a record, stamping `create_time` with the current time.
    /// Returns `Err(Conflict)` if the short code is already taken.
    fn create_url(&self, params: UrlParams) -> Result<UrlRecord>;

    /// Returns a copy of the record for `code`, or `Err(NotFound)`.
    fn get_url_by_code(&self, code: &str) -> Result<UrlRecord>;

    /// Returns a snapshot of every record.
    ///
    /// The order is unspecified and may change between calls; callers that
    /// need an order must sort the result themselves.
    fn get_all_urls(&self) -> Result<Vec<UrlRecord>>;

    /// Overwrites the target and remark of an existing record, preserving its
    /// `create_time`. Returns `Err(NotFound)` if the short code is unknown.
    fn update_url(&self, params: UrlParams) -> Result<UrlRecord>;

    /// Removes the record for `code`. Returns `Err(NotFound)` if absent.
    fn delete_url(&self, code: &str) -> Result<()>;
}
