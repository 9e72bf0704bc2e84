//! HTTP client for a knowledge service.
//!
//! Every operation is a JSON `POST` except document upload, which sends the
//! selected files as `multipart/form-data`. Non-2xx responses settle as
//! [`Error::Operation`] carrying the status and body.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use kbdesk_core::defaults;
use kbdesk_core::{
    ChatBackend, ChatRequest, ChatResponse, DocumentFile, DocumentUploadResponse, Error,
    IngestionBackend, KnowledgeService, NoteUpload, NoteUploadResponse, QuizBackend, QuizRequest,
    QuizResponse, Result, SearchBackend, SearchRequest, SearchResponse, SpeakRequest,
    SpeakResponse, SpeechBackend, SummarizeRequest, SummarizeResponse, SummaryBackend,
    TranscriptionRequest, TranscriptionResponse,
};

use crate::config::ClientConfig;

const PDF_CONTENT_TYPE: &str = "application/pdf";

pub struct HttpKnowledgeService {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
    timeout: Duration,
    upload_timeout: Duration,
}

impl HttpKnowledgeService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS),
            upload_timeout: Duration::from_secs(defaults::UPLOAD_TIMEOUT_SECS),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.base_url.clone())
            .with_api_key(config.api_key.clone())
            .with_timeouts(config.timeout(), config.upload_timeout()))
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_timeouts(mut self, timeout: Duration, upload_timeout: Duration) -> Self {
        self.timeout = timeout;
        self.upload_timeout = upload_timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn post_json<Req, Resp>(&self, route: &str, body: &Req) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let request = self
            .authorize(self.client.post(self.url(route)))
            .json(body)
            .timeout(self.timeout);
        self.execute(route, request).await
    }

    async fn execute<Resp>(&self, route: &str, request: RequestBuilder) -> Result<Resp>
    where
        Resp: DeserializeOwned,
    {
        let start = std::time::Instant::now();
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        let duration_ms = start.elapsed().as_millis() as u64;

        if !status.is_success() {
            warn!(route, status = status.as_u16(), duration_ms, "Knowledge service returned error");
            return Err(Error::Operation(format!(
                "{} returned {}: {}",
                route, status, body
            )));
        }

        debug!(route, status = status.as_u16(), duration_ms, "Knowledge service responded");
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl IngestionBackend for HttpKnowledgeService {
    #[instrument(skip(self, note), fields(subsystem = "client", op = "upload_note"))]
    async fn upload_note(&self, note: &NoteUpload) -> Result<NoteUploadResponse> {
        self.post_json(defaults::ROUTE_UPLOAD_NOTE, note).await
    }

    #[instrument(skip(self, files), fields(subsystem = "client", op = "upload_documents", file_count = files.len()))]
    async fn upload_documents(&self, files: &[DocumentFile]) -> Result<DocumentUploadResponse> {
        let mut form = Form::new();
        for file in files {
            let content_type = file.content_type.as_deref().unwrap_or(PDF_CONTENT_TYPE);
            let part = Part::bytes(file.data.clone())
                .file_name(file.file_name.clone())
                .mime_str(content_type)
                .map_err(|e| {
                    Error::Request(format!("Failed to create multipart for {}: {}", file.file_name, e))
                })?;
            form = form.part("files", part);
        }

        let route = defaults::ROUTE_UPLOAD_DOCUMENTS;
        let request = self
            .authorize(self.client.post(self.url(route)))
            .multipart(form)
            .timeout(self.upload_timeout);
        self.execute(route, request).await
    }
}

#[async_trait]
impl SearchBackend for HttpKnowledgeService {
    #[instrument(skip(self, request), fields(subsystem = "client", op = "search"))]
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.post_json(defaults::ROUTE_SEARCH, request).await
    }
}

#[async_trait]
impl ChatBackend for HttpKnowledgeService {
    #[instrument(skip(self, request), fields(subsystem = "client", op = "send_message", message_count = request.history.len()))]
    async fn send_message(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.post_json(defaults::ROUTE_CHAT, request).await
    }
}

#[async_trait]
impl SummaryBackend for HttpKnowledgeService {
    #[instrument(skip(self, request), fields(subsystem = "client", op = "summarize", text_len = request.text.len()))]
    async fn summarize(&self, request: &SummarizeRequest) -> Result<SummarizeResponse> {
        self.post_json(defaults::ROUTE_SUMMARIZE, request).await
    }
}

#[async_trait]
impl QuizBackend for HttpKnowledgeService {
    #[instrument(skip(self, request), fields(subsystem = "client", op = "generate_quiz", question_count = request.count))]
    async fn generate_quiz(&self, request: &QuizRequest) -> Result<QuizResponse> {
        self.post_json(defaults::ROUTE_QUIZ, request).await
    }
}

#[async_trait]
impl SpeechBackend for HttpKnowledgeService {
    #[instrument(skip(self, request), fields(subsystem = "client", op = "transcribe", language = %request.language))]
    async fn transcribe(&self, request: &TranscriptionRequest) -> Result<TranscriptionResponse> {
        self.post_json(defaults::ROUTE_TRANSCRIBE, request).await
    }

    #[instrument(skip(self, request), fields(subsystem = "client", op = "speak", language = %request.language))]
    async fn speak(&self, request: &SpeakRequest) -> Result<SpeakResponse> {
        self.post_json(defaults::ROUTE_SPEAK, request).await
    }
}

#[async_trait]
impl KnowledgeService for HttpKnowledgeService {
    async fn health_check(&self) -> Result<bool> {
        match self
            .authorize(self.client.get(self.url(defaults::ROUTE_HEALTH)))
            .timeout(Duration::from_secs(defaults::HEALTH_TIMEOUT_SECS))
            .send()
            .await
        {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(e) => {
                debug!(error = %e, "Health check failed");
                Ok(false)
            }
        }
    }

    fn backend_name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let service = HttpKnowledgeService::new("http://localhost:8000/");
        assert_eq!(service.base_url(), "http://localhost:8000");
        assert_eq!(service.url("/search"), "http://localhost:8000/search");
    }

    #[test]
    fn test_from_config() {
        let config = ClientConfig {
            base_url: "https://kb.example.com".to_string(),
            api_key: Some("key".to_string()),
            timeout_secs: 10,
            upload_timeout_secs: 20,
            ..ClientConfig::default()
        };
        let service = HttpKnowledgeService::from_config(&config).unwrap();

        assert_eq!(service.base_url(), "https://kb.example.com");
        assert_eq!(service.api_key.as_deref(), Some("key"));
        assert_eq!(service.timeout, Duration::from_secs(10));
        assert_eq!(service.upload_timeout, Duration::from_secs(20));
        assert_eq!(service.backend_name(), "http");
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let config = ClientConfig {
            base_url: "ftp://kb".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            HttpKnowledgeService::from_config(&config),
            Err(Error::Config(_))
        ));
    }
}
