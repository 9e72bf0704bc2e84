//! Text summarization with copy-to-clipboard.

use std::time::{Duration, Instant};

use tracing::{debug, instrument, warn};

use kbdesk_core::defaults;
use kbdesk_core::{
    Clipboard, NoticeBus, Result, SummarizeRequest, SummarizeResponse, SummaryBackend,
    SummaryMode, ValidationError,
};

use crate::operation::{Operation, OperationStatus, Settlement, Submission, Ticket};

pub struct Summarizer {
    text: String,
    mode: SummaryMode,
    /// Latest successful summary. Kept across later failures.
    summary: Option<String>,
    copied_at: Option<Instant>,
    summarize: Operation<SummarizeRequest, SummarizeResponse>,
    notices: NoticeBus,
}

impl Summarizer {
    pub fn new(notices: NoticeBus) -> Self {
        Self {
            text: String::new(),
            mode: SummaryMode::default(),
            summary: None,
            copied_at: None,
            summarize: Operation::new("summarize"),
            notices,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn mode(&self) -> SummaryMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: SummaryMode) {
        self.mode = mode;
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn status(&self) -> OperationStatus {
        self.summarize.status()
    }

    pub fn can_summarize(&self) -> bool {
        !self.text.trim().is_empty() && self.summarize.can_submit()
    }

    pub fn begin(&mut self) -> Result<Submission<SummarizeRequest>> {
        if self.text.trim().is_empty() {
            let err = ValidationError::EmptySummaryText;
            self.notices.error(err.to_string());
            return Err(err.into());
        }

        let request = SummarizeRequest {
            text: self.text.clone(),
            mode: self.mode,
        };
        let ticket = self.summarize.begin(request.clone())?;
        Ok(Submission { ticket, request })
    }

    pub fn settle(&mut self, ticket: Ticket, outcome: Result<SummarizeResponse>) -> Settlement {
        let settlement = self.summarize.settle(ticket, outcome);
        match settlement {
            Settlement::Succeeded => {
                if let Some(response) = self.summarize.result() {
                    self.summary = Some(response.summary.clone());
                    self.copied_at = None;
                }
                self.notices.success("Summary generated!");
            }
            Settlement::Failed => {
                if let Some(err) = self.summarize.error() {
                    self.notices.error(format!("Failed to generate summary: {}", err));
                }
            }
            Settlement::Stale => {}
        }
        settlement
    }

    #[instrument(
        skip(self, backend),
        fields(subsystem = "workspace", component = "summarize", text_len = self.text.len())
    )]
    pub async fn summarize<B>(&mut self, backend: &B) -> Result<Settlement>
    where
        B: SummaryBackend + ?Sized,
    {
        let submission = self.begin()?;
        let outcome = backend.summarize(&submission.request).await;
        Ok(self.settle(submission.ticket, outcome))
    }

    /// Write the current summary to `clipboard`.
    ///
    /// Returns whether anything was copied. Clipboard failures are reported as
    /// a notice; the summarize operation is never touched.
    pub fn copy_summary(&mut self, clipboard: &dyn Clipboard, now: Instant) -> bool {
        let Some(summary) = self.summary.as_deref() else {
            debug!("Nothing to copy");
            return false;
        };

        match clipboard.write_text(summary) {
            Ok(()) => {
                self.copied_at = Some(now);
                self.notices.success("Summary copied to clipboard!");
                true
            }
            Err(err) => {
                warn!(error = %err, "Clipboard write failed");
                self.notices.error(format!("Failed to copy summary: {}", err));
                false
            }
        }
    }

    pub fn reset(&mut self) {
        self.text.clear();
        self.mode = SummaryMode::default();
        self.summary = None;
        self.copied_at = None;
        self.summarize.reset();
    }

    /// Whether the "copied" indicator is still showing at `now`.
    pub fn is_copied(&self, now: Instant) -> bool {
        self.copied_at.is_some_and(|at| {
            now.saturating_duration_since(at) < Duration::from_millis(defaults::COPY_FEEDBACK_MS)
        })
    }
}
