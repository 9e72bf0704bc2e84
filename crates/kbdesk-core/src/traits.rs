//! Service traits for the external knowledge service.
//!
//! Each tool view depends on exactly one of these capabilities. The HTTP
//! client and the mock service implement all of them; tests may implement a
//! single trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// INGESTION
// =============================================================================

#[async_trait]
pub trait IngestionBackend: Send + Sync {
    /// Add a text note to the knowledge base.
    async fn upload_note(&self, note: &NoteUpload) -> Result<NoteUploadResponse>;

    /// Add documents to the knowledge base, preserving selection order.
    async fn upload_documents(&self, files: &[DocumentFile]) -> Result<DocumentUploadResponse>;
}

// =============================================================================
// RETRIEVAL AND GENERATION
// =============================================================================

#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Semantic search across ingested materials.
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;
}

#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Produce the assistant reply to `request.text` given the prior history.
    async fn send_message(&self, request: &ChatRequest) -> Result<ChatResponse>;
}

#[async_trait]
pub trait SummaryBackend: Send + Sync {
    async fn summarize(&self, request: &SummarizeRequest) -> Result<SummarizeResponse>;
}

#[async_trait]
pub trait QuizBackend: Send + Sync {
    async fn generate_quiz(&self, request: &QuizRequest) -> Result<QuizResponse>;
}

// =============================================================================
// SPEECH
// =============================================================================

#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Capture speech and return its transcript.
    async fn transcribe(&self, request: &TranscriptionRequest) -> Result<TranscriptionResponse>;

    /// Read text aloud. Resolves once playback is done.
    async fn speak(&self, request: &SpeakRequest) -> Result<SpeakResponse>;
}

/// The full knowledge service: every tool capability plus a health probe.
#[async_trait]
pub trait KnowledgeService:
    IngestionBackend + SearchBackend + ChatBackend + SummaryBackend + QuizBackend + SpeechBackend
{
    /// Check if the service is reachable.
    async fn health_check(&self) -> Result<bool>;

    /// Short name of the backend, for logs.
    fn backend_name(&self) -> &str;
}

// =============================================================================
// CLIPBOARD
// =============================================================================

/// Host clipboard used by copy actions. Writes are fire-and-forget.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<()>;
}
