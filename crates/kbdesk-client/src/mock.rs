//! Mock knowledge service for deterministic testing and offline runs.
//!
//! Responses default to canned sample data. Latency and failures can be
//! simulated per operation.
//!
//! ## Usage
//!
//! ```ignore
//! use kbdesk_client::mock::MockKnowledgeService;
//!
//! #[tokio::test]
//! async fn test_with_mock_service() {
//!     let service = MockKnowledgeService::new()
//!         .with_chat_reply("Hello from the mock")
//!         .with_latency_ms(10);
//!     // hand `service` to a view driver
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

use kbdesk_core::defaults;
use kbdesk_core::{
    ChatBackend, ChatRequest, ChatResponse, DocumentFile, DocumentUploadResponse, Error, Insight,
    IngestionBackend, KnowledgeService, MaterialKind, NoteUpload, NoteUploadResponse, QuizBackend,
    QuizQuestion, QuizRequest, QuizResponse, Result, SearchBackend, SearchRequest,
    SearchResponse, SearchResult, SpeakRequest, SpeakResponse, SpeechBackend, SummarizeRequest,
    SummarizeResponse, SummaryBackend, TranscriptionRequest, TranscriptionResponse,
};

pub const OP_UPLOAD_NOTE: &str = "upload_note";
pub const OP_UPLOAD_DOCUMENTS: &str = "upload_documents";
pub const OP_SEARCH: &str = "search";
pub const OP_SEND_MESSAGE: &str = "send_message";
pub const OP_SUMMARIZE: &str = "summarize";
pub const OP_GENERATE_QUIZ: &str = "generate_quiz";
pub const OP_TRANSCRIBE: &str = "transcribe";
pub const OP_SPEAK: &str = "speak";

/// Mock knowledge service for testing.
#[derive(Clone)]
pub struct MockKnowledgeService {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    search: SearchResponse,
    chat_reply: String,
    summary: Option<String>,
    quiz: Option<Vec<QuizQuestion>>,
    transcript: String,
    latency_ms: u64,
    operation_latency_ms: HashMap<&'static str, u64>,
    failure_rate: f64,
    failing: HashSet<&'static str>,
}

#[derive(Debug, Clone)]
pub struct MockCall {
    pub operation: &'static str,
    pub input: String,
    pub timestamp: Instant,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            search: sample_search(),
            chat_reply: "This is a sample response. The AI chatbot will be integrated with your knowledge base materials.".to_string(),
            summary: None,
            quiz: None,
            transcript:
                "This is a sample transcription. Azure Speech SDK will be integrated here."
                    .to_string(),
            latency_ms: 0,
            operation_latency_ms: HashMap::new(),
            failure_rate: 0.0,
            failing: HashSet::new(),
        }
    }
}

fn sample_search() -> SearchResponse {
    SearchResponse {
        results: vec![
            SearchResult {
                title: "Sample Note 1".to_string(),
                content: "This is sample content matching your query...".to_string(),
                similarity: 0.92,
                kind: MaterialKind::Note,
            },
            SearchResult {
                title: "Sample PDF Document".to_string(),
                content: "Extracted content from PDF related to your search...".to_string(),
                similarity: 0.85,
                kind: MaterialKind::Pdf,
            },
        ],
        insight: Insight {
            summary: Some(
                "Your query relates to knowledge management and AI-powered search systems."
                    .to_string(),
            ),
            sentiment: Some("Neutral".to_string()),
            topics: Some(vec![
                "AI".to_string(),
                "Search".to_string(),
                "Knowledge Base".to_string(),
            ]),
            answer: Some("Based on the materials, the answer to your query is...".to_string()),
        },
    }
}

fn sample_questions() -> [QuizQuestion; 2] {
    [
        QuizQuestion {
            question: "What is the main concept discussed in the material?".to_string(),
            options: vec![
                "Option A".to_string(),
                "Option B".to_string(),
                "Option C".to_string(),
                "Option D".to_string(),
            ],
            correct_index: 1,
        },
        QuizQuestion {
            question: "Which technique is most effective according to the text?".to_string(),
            options: vec![
                "Technique 1".to_string(),
                "Technique 2".to_string(),
                "Technique 3".to_string(),
                "Technique 4".to_string(),
            ],
            correct_index: 2,
        },
    ]
}

impl MockKnowledgeService {
    /// Create a new mock service with default configuration.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the response returned by every search.
    pub fn with_search_response(mut self, response: SearchResponse) -> Self {
        Arc::make_mut(&mut self.config).search = response;
        self
    }

    pub fn with_chat_reply(mut self, reply: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).chat_reply = reply.into();
        self
    }

    /// Fix the summary text. By default the summary names the requested mode.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).summary = Some(summary.into());
        self
    }

    /// Fix the generated questions. By default the sample questions are
    /// repeated up to the requested count.
    pub fn with_quiz(mut self, questions: Vec<QuizQuestion>) -> Self {
        Arc::make_mut(&mut self.config).quiz = Some(questions);
        self
    }

    pub fn with_transcript(mut self, transcript: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).transcript = transcript.into();
        self
    }

    /// Set simulated latency for all operations.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    /// Set simulated latency for one operation, overriding the global value.
    pub fn with_operation_latency_ms(mut self, operation: &'static str, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config)
            .operation_latency_ms
            .insert(operation, latency_ms);
        self
    }

    /// Use the response delays of the sample workspace.
    pub fn with_sample_latencies(self) -> Self {
        self.with_operation_latency_ms(OP_SEARCH, defaults::MOCK_SEARCH_LATENCY_MS)
            .with_operation_latency_ms(OP_SEND_MESSAGE, defaults::MOCK_CHAT_LATENCY_MS)
            .with_operation_latency_ms(OP_SUMMARIZE, defaults::MOCK_SUMMARIZE_LATENCY_MS)
            .with_operation_latency_ms(OP_GENERATE_QUIZ, defaults::MOCK_QUIZ_LATENCY_MS)
            .with_operation_latency_ms(OP_TRANSCRIBE, defaults::MOCK_TRANSCRIBE_LATENCY_MS)
            .with_operation_latency_ms(OP_SPEAK, defaults::MOCK_SPEAK_LATENCY_MS)
    }

    /// Set failure rate (0.0 - 1.0) for testing error handling.
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        Arc::make_mut(&mut self.config).failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Make every call to `operation` fail.
    pub fn failing(mut self, operation: &'static str) -> Self {
        Arc::make_mut(&mut self.config).failing.insert(operation);
        self
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.calls().clone()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.calls().clear()
    }

    /// Get number of calls made to `operation`.
    pub fn call_count(&self, operation: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    fn calls(&self) -> MutexGuard<'_, Vec<MockCall>> {
        self.call_log
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn log_call(&self, operation: &'static str, input: impl Into<String>) {
        self.calls().push(MockCall {
            operation,
            input: input.into(),
            timestamp: Instant::now(),
        });
    }

    fn should_fail(&self, operation: &'static str) -> bool {
        use rand::Rng;
        if self.config.failing.contains(operation) {
            return true;
        }
        if self.config.failure_rate > 0.0 {
            rand::thread_rng().gen::<f64>() < self.config.failure_rate
        } else {
            false
        }
    }

    async fn simulate_latency(&self, operation: &'static str) {
        let latency_ms = self
            .config
            .operation_latency_ms
            .get(operation)
            .copied()
            .unwrap_or(self.config.latency_ms);
        if latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(latency_ms)).await;
        }
    }

    /// Log, wait, then fail if configured to.
    async fn enter(&self, operation: &'static str, input: impl Into<String>) -> Result<()> {
        self.log_call(operation, input);
        self.simulate_latency(operation).await;

        if self.should_fail(operation) {
            debug!(op = operation, "Simulated failure");
            return Err(Error::Operation(format!(
                "Simulated {} failure for testing",
                operation
            )));
        }
        Ok(())
    }
}

impl Default for MockKnowledgeService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IngestionBackend for MockKnowledgeService {
    async fn upload_note(&self, note: &NoteUpload) -> Result<NoteUploadResponse> {
        self.enter(OP_UPLOAD_NOTE, note.title.as_str()).await?;
        Ok(NoteUploadResponse {
            accepted: true,
            note_id: Some(uuid::Uuid::new_v4().to_string()),
        })
    }

    async fn upload_documents(&self, files: &[DocumentFile]) -> Result<DocumentUploadResponse> {
        let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
        self.enter(OP_UPLOAD_DOCUMENTS, names.join(",")).await?;
        Ok(DocumentUploadResponse {
            accepted: true,
            count: files.len(),
            document_ids: Some(
                files
                    .iter()
                    .map(|_| uuid::Uuid::new_v4().to_string())
                    .collect(),
            ),
        })
    }
}

#[async_trait]
impl SearchBackend for MockKnowledgeService {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.enter(OP_SEARCH, request.query.as_str()).await?;
        Ok(self.config.search.clone())
    }
}

#[async_trait]
impl ChatBackend for MockKnowledgeService {
    async fn send_message(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.enter(OP_SEND_MESSAGE, request.text.as_str()).await?;
        Ok(ChatResponse {
            reply: self.config.chat_reply.clone(),
        })
    }
}

#[async_trait]
impl SummaryBackend for MockKnowledgeService {
    async fn summarize(&self, request: &SummarizeRequest) -> Result<SummarizeResponse> {
        self.enter(OP_SUMMARIZE, request.text.as_str()).await?;
        let summary = self.config.summary.clone().unwrap_or_else(|| {
            format!(
                "This is a {} AI-generated summary of your text. The actual summarization will use BART or T5 models to provide concise and accurate summaries of your materials.",
                request.mode
            )
        });
        Ok(SummarizeResponse { summary })
    }
}

#[async_trait]
impl QuizBackend for MockKnowledgeService {
    async fn generate_quiz(&self, request: &QuizRequest) -> Result<QuizResponse> {
        self.enter(OP_GENERATE_QUIZ, request.material_id.as_str())
            .await?;
        let questions = match &self.config.quiz {
            Some(questions) => questions.clone(),
            None => sample_questions()
                .into_iter()
                .cycle()
                .take(request.count as usize)
                .collect(),
        };
        Ok(QuizResponse { questions })
    }
}

#[async_trait]
impl SpeechBackend for MockKnowledgeService {
    async fn transcribe(&self, request: &TranscriptionRequest) -> Result<TranscriptionResponse> {
        self.enter(OP_TRANSCRIBE, request.language.as_str()).await?;
        Ok(TranscriptionResponse {
            transcript: self.config.transcript.clone(),
        })
    }

    async fn speak(&self, request: &SpeakRequest) -> Result<SpeakResponse> {
        self.enter(OP_SPEAK, request.text.as_str()).await?;
        Ok(SpeakResponse { done: true })
    }
}

#[async_trait]
impl KnowledgeService for MockKnowledgeService {
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}
