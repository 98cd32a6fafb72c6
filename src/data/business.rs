use crate::api_client::SearchError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_RADIUS_KM: u32 = 10;
pub const DEFAULT_MAX_RESULTS: u32 = 20;
pub const MIN_CRITERIA_VALUE: u32 = 1;
pub const MAX_CRITERIA_VALUE: u32 = 100;

/// Message shown when the form is submitted without industry or location
pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in both industry and location";

fn default_radius_km() -> u32 {
    DEFAULT_RADIUS_KM
}

fn default_max_results() -> u32 {
    DEFAULT_MAX_RESULTS
}

/// Clamp a radius or result cap into the range the API accepts
pub fn clamp_criteria_value(value: u32) -> u32 {
    value.clamp(MIN_CRITERIA_VALUE, MAX_CRITERIA_VALUE)
}

/// User-entered search parameters, built fresh for every submission.
///
/// Fields are private so a value can only come from [`SearchCriteria::new`]
/// (trimmed, non-empty strings) or from deserialisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    industry: String,
    location: String,
    #[serde(default = "default_radius_km")]
    radius_km: u32,
    #[serde(default = "default_max_results")]
    max_results: u32,
}

impl SearchCriteria {
    /// Build criteria from raw form input, trimming both strings.
    ///
    /// Returns a validation error when either field is blank.
    pub fn new(industry: &str, location: &str) -> Result<Self, SearchError> {
        let industry = industry.trim();
        let location = location.trim();

        if industry.is_empty() || location.is_empty() {
            return Err(SearchError::Validation(MISSING_FIELDS_MESSAGE.to_string()));
        }

        Ok(Self {
            industry: industry.to_string(),
            location: location.to_string(),
            radius_km: DEFAULT_RADIUS_KM,
            max_results: DEFAULT_MAX_RESULTS,
        })
    }

    pub fn with_radius_km(mut self, radius_km: u32) -> Self {
        self.radius_km = clamp_criteria_value(radius_km);
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = clamp_criteria_value(max_results);
        self
    }

    pub fn industry(&self) -> &str {
        &self.industry
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn radius_km(&self) -> u32 {
        self.radius_km
    }

    pub fn max_results(&self) -> u32 {
        self.max_results
    }

    /// Short human description, used in logs and status messages
    pub fn describe(&self) -> String {
        format!("{} in {}", self.industry, self.location)
    }
}

/// One candidate business returned by the search engine.
///
/// Optional contact fields are `None` when unknown; the client never
/// rewrites what the server sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub reviews_count: Option<u64>,
}

impl Business {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: None,
            email: None,
            address: None,
            website: None,
            rating: None,
            reviews_count: None,
        }
    }

    /// Phone number usable for a call handoff
    pub fn callable_phone(&self) -> Option<&str> {
        non_blank(self.phone.as_deref())
    }

    /// Email address usable for a mail handoff
    pub fn mailable_email(&self) -> Option<&str> {
        non_blank(self.email.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub total_results: u64,
    #[serde(default)]
    pub businesses: Vec<Business>,
}

/// Liveness probe payload from the health endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}
