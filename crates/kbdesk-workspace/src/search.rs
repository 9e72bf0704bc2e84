//! Semantic search view.

use tracing::{debug, instrument};

use kbdesk_core::{
    Insight, MaterialKind, NoticeBus, Result, SearchBackend, SearchRequest, SearchResponse,
    SearchResult, ValidationError,
};

use crate::operation::{
    Operation, OperationStatus, ResubmitPolicy, Settlement, Submission, Ticket,
};
use crate::render::{insight_regions, rank_results, similarity_label, similarity_percent, InsightRegion};

/// Settled search output, already ranked and normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    pub insight: Insight,
}

impl From<SearchResponse> for SearchOutcome {
    fn from(response: SearchResponse) -> Self {
        Self {
            results: rank_results(response.results),
            insight: response.insight.normalized(),
        }
    }
}

/// A hit as shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub kind: MaterialKind,
    pub percent: u8,
    pub label: String,
}

impl<'a> From<&'a SearchResult> for Hit<'a> {
    fn from(result: &'a SearchResult) -> Self {
        Self {
            title: &result.title,
            content: &result.content,
            kind: result.kind,
            percent: similarity_percent(result.similarity),
            label: similarity_label(result.similarity),
        }
    }
}

/// What the results area shows.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchDisplay<'a> {
    /// No search has been run yet.
    NotSearched,
    Searching,
    /// The search succeeded with zero hits.
    NoResults { insight: Vec<InsightRegion<'a>> },
    Results {
        hits: Vec<Hit<'a>>,
        insight: Vec<InsightRegion<'a>>,
    },
    Failed { message: String },
}

pub struct SearchView {
    query: String,
    search: Operation<String, SearchOutcome>,
    notices: NoticeBus,
}

impl SearchView {
    pub fn new(notices: NoticeBus) -> Self {
        Self {
            query: String::new(),
            search: Operation::new("search"),
            notices,
        }
    }

    /// Let a new query replace one still in flight.
    pub fn with_policy(mut self, policy: ResubmitPolicy) -> Self {
        self.search = self.search.with_policy(policy);
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn status(&self) -> OperationStatus {
        self.search.status()
    }

    pub fn can_search(&self) -> bool {
        !self.query.trim().is_empty() && self.search.can_submit()
    }

    pub fn outcome(&self) -> Option<&SearchOutcome> {
        self.search.result()
    }

    /// The query the current results (or pending search) belong to.
    pub fn searched_query(&self) -> Option<&str> {
        self.search.input().map(String::as_str)
    }

    pub fn begin(&mut self) -> Result<Submission<SearchRequest>> {
        let query = self.query.trim();
        if query.is_empty() {
            let err = ValidationError::EmptyQuery;
            self.notices.error(err.to_string());
            return Err(err.into());
        }

        let query = query.to_string();
        let ticket = self.search.begin(query.clone())?;
        Ok(Submission {
            ticket,
            request: SearchRequest { query },
        })
    }

    pub fn settle(&mut self, ticket: Ticket, outcome: Result<SearchResponse>) -> Settlement {
        let settlement = self.search.settle(ticket, outcome.map(SearchOutcome::from));
        match settlement {
            Settlement::Succeeded => {
                if let Some(outcome) = self.search.result() {
                    debug!(result_count = outcome.results.len(), "Search results ranked");
                }
                self.notices.success("Search completed!");
            }
            Settlement::Failed => {
                if let Some(err) = self.search.error() {
                    self.notices.error(format!("Search failed: {}", err));
                }
            }
            Settlement::Stale => {}
        }
        settlement
    }

    #[instrument(skip(self, backend), fields(subsystem = "workspace", component = "search"))]
    pub async fn search<B>(&mut self, backend: &B) -> Result<Settlement>
    where
        B: SearchBackend + ?Sized,
    {
        let submission = self.begin()?;
        let outcome = backend.search(&submission.request).await;
        Ok(self.settle(submission.ticket, outcome))
    }

    pub fn display(&self) -> SearchDisplay<'_> {
        match self.search.status() {
            OperationStatus::Idle => SearchDisplay::NotSearched,
            OperationStatus::Pending => SearchDisplay::Searching,
            OperationStatus::Failed => SearchDisplay::Failed {
                message: self
                    .search
                    .error()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            },
            OperationStatus::Succeeded => match self.search.result() {
                Some(outcome) if !outcome.results.is_empty() => SearchDisplay::Results {
                    hits: outcome.results.iter().map(Hit::from).collect(),
                    insight: insight_regions(&outcome.insight),
                },
                Some(outcome) => SearchDisplay::NoResults {
                    insight: insight_regions(&outcome.insight),
                },
                None => SearchDisplay::NotSearched,
            },
        }
    }

    pub fn reset(&mut self) {
        self.query.clear();
        self.search.reset();
    }
}
