use burrow_core::UrlRecord;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Body of `POST /api/shorten` and `POST /admin/urls`.
///
/// A missing or blank `short_code` asks the server to generate one.
#[derive(Debug, Deserialize)]
pub struct CreateUrlRequest {
    pub target_url: String,
    #[serde(default)]
    pub short_code: Option<String>,
    #[serde(default)]
    pub remark: Option<String>,
}

impl CreateUrlRequest {
    pub fn requested_code(&self) -> Option<&str> {
        self.short_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub short_code: String,
    pub target_url: String,
    pub short_url: String,
    pub remark: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUrlRequest {
    pub target_url: String,
    #[serde(default)]
    pub remark: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UrlResponse {
    pub short_code: String,
    pub target_url: String,
    pub remark: String,
    pub create_time: Timestamp,
}

impl From<UrlRecord> for UrlResponse {
    fn from(record: UrlRecord) -> Self {
        Self {
            short_code: record.short_code.to_string(),
            target_url: record.target_url,
            remark: record.remark,
            create_time: record.create_time,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UrlListResponse {
    pub urls: Vec<UrlResponse>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_short_code_means_generate() {
        let request: CreateUrlRequest =
            serde_json::from_str(r#"{"target_url":"https://a.io","short_code":"  "}"#).unwrap();
        assert_eq!(request.requested_code(), None);

        let request: CreateUrlRequest =
            serde_json::from_str(r#"{"target_url":"https://a.io"}"#).unwrap();
        assert_eq!(request.requested_code(), None);
        assert_eq!(request.remark, None);

        let request: CreateUrlRequest =
            serde_json::from_str(r#"{"target_url":"https://a.io","short_code":"docs"}"#).unwrap();
        assert_eq!(request.requested_code(), Some("docs"));
    }
}
