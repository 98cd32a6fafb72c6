use crate::api_client::{SearchError, SearchErrorKind};
use crate::data::business::{SearchCriteria, SearchResponse};

/// Error kept by the page after a failed search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageError {
    pub kind: SearchErrorKind,
    pub message: String,
}

impl From<&SearchError> for PageError {
    fn from(error: &SearchError) -> Self {
        Self {
            kind: error.kind(),
            message: error.message(),
        }
    }
}

/// Lifecycle of the page. Results and error can never coexist.
#[derive(Debug, Clone, PartialEq)]
pub enum PageState {
    Idle,
    Submitting,
    Results(SearchResponse),
    Error(PageError),
}

/// Permission to run one search, tagged with its request id
#[derive(Debug, Clone)]
pub struct SearchTicket {
    pub request_id: u64,
    pub criteria: SearchCriteria,
}

/// What `complete` did with an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// New results stored; any table built from older results is stale
    Results,
    /// Error stored; previous results dropped
    Failed,
    /// Outcome belonged to a superseded request and was discarded
    Stale,
}

/// Owns the search lifecycle for one page.
///
/// Only one search runs at a time: `begin_search` refuses while a search is
/// submitting. Each search gets an increasing request id and only the
/// latest id may change the state.
#[derive(Debug)]
pub struct PageController {
    state: PageState,
    latest_request: u64,
    last_criteria: Option<SearchCriteria>,
}

impl Default for PageController {
    fn default() -> Self {
        Self::new()
    }
}

impl PageController {
    pub fn new() -> Self {
        Self {
            state: PageState::Idle,
            latest_request: 0,
            last_criteria: None,
        }
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, PageState::Submitting)
    }

    pub fn results(&self) -> Option<&SearchResponse> {
        match &self.state {
            PageState::Results(response) => Some(response),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&PageError> {
        match &self.state {
            PageState::Error(error) => Some(error),
            _ => None,
        }
    }

    /// `total_results` of the results on display
    pub fn results_count(&self) -> Option<u64> {
        self.results().map(|r| r.total_results)
    }

    /// Criteria of the most recently started search
    pub fn last_criteria(&self) -> Option<&SearchCriteria> {
        self.last_criteria.as_ref()
    }

    /// Start a search. Returns `None` while another search is submitting.
    pub fn begin_search(&mut self, criteria: SearchCriteria) -> Option<SearchTicket> {
        if self.is_loading() {
            tracing::debug!(target: "search", "Ignoring submit while a search is running");
            return None;
        }

        self.latest_request += 1;
        self.state = PageState::Submitting;
        self.last_criteria = Some(criteria.clone());

        tracing::info!(
            target: "search",
            "Request #{} started: {}",
            self.latest_request,
            criteria.describe()
        );

        Some(SearchTicket {
            request_id: self.latest_request,
            criteria,
        })
    }

    /// Apply the outcome of a search if it is the latest one issued
    pub fn complete(
        &mut self,
        request_id: u64,
        outcome: Result<SearchResponse, SearchError>,
    ) -> Completion {
        if request_id != self.latest_request {
            tracing::warn!(
                target: "search",
                "Discarding response for request #{} (latest is #{})",
                request_id,
                self.latest_request
            );
            return Completion::Stale;
        }

        match outcome {
            Ok(response) => {
                tracing::info!(
                    target: "search",
                    "Request #{} completed with {} results",
                    request_id,
                    response.businesses.len()
                );
                self.state = PageState::Results(response);
                Completion::Results
            }
            Err(error) => {
                tracing::warn!(
                    target: "search",
                    "Request #{} failed ({:?}): {}",
                    request_id,
                    error.kind(),
                    error
                );
                self.state = PageState::Error(PageError::from(&error));
                Completion::Failed
            }
        }
    }
}
