use crate::data::business::{HealthStatus, SearchCriteria, SearchResponse};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use thiserror::Error;

/// Shown when the server gives no `detail` for a failed search
pub const FALLBACK_ERROR_MESSAGE: &str = "Failed to search businesses";

pub const SEARCH_PATH: &str = "/api/businesses/search";
pub const HEALTH_PATH: &str = "/api/businesses/health";

/// Coarse category of a search failure, so callers can branch without
/// matching on message text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchErrorKind {
    Validation,
    Network,
    Server,
    Unknown,
}

#[derive(Debug, Error)]
pub enum SearchError {
    /// Rejected locally before any request was made
    #[error("{0}")]
    Validation(String),

    /// No response was received
    #[error("Failed to search businesses")]
    Network(#[source] reqwest::Error),

    /// The server answered with a non-success status
    #[error("{}", .detail.as_deref().unwrap_or(FALLBACK_ERROR_MESSAGE))]
    Server { status: u16, detail: Option<String> },

    /// Anything else, passed through as is
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl SearchError {
    pub fn kind(&self) -> SearchErrorKind {
        match self {
            SearchError::Validation(_) => SearchErrorKind::Validation,
            SearchError::Network(_) => SearchErrorKind::Network,
            SearchError::Server { .. } => SearchErrorKind::Server,
            SearchError::Unexpected(_) => SearchErrorKind::Unknown,
        }
    }

    /// Human-readable message for display
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Server-provided detail text, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            SearchError::Server { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    fn from_transport(error: reqwest::Error) -> Self {
        if error.is_decode() {
            SearchError::Unexpected(anyhow::Error::new(error))
        } else {
            SearchError::Network(error)
        }
    }
}

/// Pull the `detail` string out of an error body. Blank details count as missing.
fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")?
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_string())
}

/// Client for the business search API
#[derive(Clone)]
pub struct BusinessApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl BusinessApiClient {
    pub fn new(base_url: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(target: "api", "Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Search for businesses matching the criteria.
    ///
    /// The criteria are sent as given; validation is the caller's job.
    pub async fn search_businesses(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<SearchResponse, SearchError> {
        let url = format!("{}{}", self.base_url, SEARCH_PATH);
        tracing::info!(
            target: "api",
            "POST {} ({}, radius {} km, max {})",
            url,
            criteria.describe(),
            criteria.radius_km(),
            criteria.max_results()
        );

        let response = self
            .client
            .post(&url)
            .json(criteria)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(target: "api", "Search request failed: {}", e);
                SearchError::from_transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = extract_detail(&body);
            tracing::warn!(
                target: "api",
                "Search returned {}: {}",
                status,
                detail.as_deref().unwrap_or("<no detail>")
            );
            return Err(SearchError::Server {
                status: status.as_u16(),
                detail,
            });
        }

        let result: SearchResponse = response
            .json()
            .await
            .map_err(SearchError::from_transport)?;
        tracing::info!(
            target: "api",
            "Search '{}' returned {} businesses",
            result.query,
            result.businesses.len()
        );
        Ok(result)
    }

    /// Liveness probe against the health endpoint
    pub async fn health_check(&self) -> Result<HealthStatus, SearchError> {
        let url = format!("{}{}", self.base_url, HEALTH_PATH);
        tracing::debug!(target: "api", "GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(SearchError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Server {
                status: status.as_u16(),
                detail: extract_detail(&body),
            });
        }

        response.json().await.map_err(SearchError::from_transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_detail() {
        assert_eq!(
            extract_detail(r#"{"detail":"industry is required"}"#),
            Some("industry is required".to_string())
        );
        assert_eq!(extract_detail(r#"{"detail":["a","b"]}"#), None);
        assert_eq!(extract_detail(r#"{"message":"nope"}"#), None);
        assert_eq!(extract_detail("<html>Bad Gateway</html>"), None);
        assert_eq!(extract_detail(""), None);
        assert_eq!(extract_detail(r#"{"detail":""}"#), None);
        assert_eq!(extract_detail(r#"{"detail":"   "}"#), None);
    }

    #[test]
    fn test_server_error_message_prefers_detail() {
        let err = SearchError::Server {
            status: 400,
            detail: Some("industry is required".to_string()),
        };
        assert_eq!(err.message(), "industry is required");
        assert_eq!(err.kind(), SearchErrorKind::Server);
        assert_eq!(err.detail(), Some("industry is required"));

        let err = SearchError::Server {
            status: 500,
            detail: None,
        };
        assert_eq!(err.message(), FALLBACK_ERROR_MESSAGE);
    }

    #[test]
    fn test_unexpected_error_is_transparent() {
        let err = SearchError::from(anyhow::anyhow!("body was not JSON"));
        assert_eq!(err.kind(), SearchErrorKind::Unknown);
        assert_eq!(err.message(), "body was not JSON");
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = BusinessApiClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
