//! Integration tests for the HTTP knowledge service client.
//!
//! Each test runs a wiremock server and checks the route, request body, and
//! headers the client sends, along with how it maps the response.

use std::time::Duration;

use kbdesk_client::HttpKnowledgeService;
use kbdesk_core::{
    ChatBackend, ChatMessage, ChatRequest, Difficulty, DocumentFile, Error, IngestionBackend,
    KnowledgeService, Language, MaterialId, MaterialKind, NoteUpload, QuizBackend, QuizRequest,
    SearchBackend, SearchRequest, SpeakRequest, SpeechBackend, SummarizeRequest, SummaryBackend,
    SummaryMode, TranscriptionRequest,
};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service(server: &MockServer) -> HttpKnowledgeService {
    HttpKnowledgeService::new(server.uri())
}

#[tokio::test]
async fn test_upload_note_posts_json() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload/notes-multi"))
        .and(body_json(json!({"title": "a", "content": "b"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"accepted": true, "noteId": "n-42"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = service(&server)
        .upload_note(&NoteUpload {
            title: "a".to_string(),
            content: "b".to_string(),
        })
        .await
        .unwrap();

    assert!(response.accepted);
    assert_eq!(response.note_id.as_deref(), Some("n-42"));
}

#[tokio::test]
async fn test_upload_documents_sends_multipart() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload/pdfs-multi"))
        .and(header_exists("content-type"))
        .and(body_string_contains("filename=\"paper.pdf\""))
        .and(body_string_contains("filename=\"slides.pdf\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accepted": true,
            "count": 2,
            "documentIds": ["d1", "d2"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let files = vec![
        DocumentFile::new("paper.pdf", b"%PDF-1.4 one".to_vec()),
        DocumentFile::new("slides.pdf", b"%PDF-1.4 two".to_vec()),
    ];
    let response = service(&server).upload_documents(&files).await.unwrap();

    assert_eq!(response.count, 2);
    assert_eq!(response.document_ids.unwrap(), vec!["d1", "d2"]);
}

#[tokio::test]
async fn test_search_maps_results_and_insight() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_json(json!({"query": "neural networks"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"title": "Lecture 3", "content": "Backprop...", "similarity": 0.885, "type": "pdf"}
            ],
            "insight": {"summary": "About neural networks", "topics": ["ML"]}
        })))
        .mount(&server)
        .await;

    let response = service(&server)
        .search(&SearchRequest {
            query: "neural networks".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].kind, MaterialKind::Pdf);
    assert_eq!(response.insight.summary.as_deref(), Some("About neural networks"));
    assert!(response.insight.sentiment.is_none());
}

#[tokio::test]
async fn test_chat_sends_history() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({
            "history": [{"role": "assistant", "content": "Hello!"}],
            "text": "hi"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reply": "hey"})))
        .expect(1)
        .mount(&server)
        .await;

    let response = service(&server)
        .send_message(&ChatRequest {
            history: vec![ChatMessage::assistant("Hello!")],
            text: "hi".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(response.reply, "hey");
}

#[tokio::test]
async fn test_summarize_and_quiz_wire_format() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/summarize"))
        .and(body_json(json!({"text": "long text", "mode": "bullet"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"summary": "- point"})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/quiz"))
        .and(body_json(json!({"materialId": "1", "count": 10, "difficulty": "easy"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "questions": [{"question": "Q?", "options": ["A", "B"], "correctIndex": 0}]
        })))
        .mount(&server)
        .await;

    let client = service(&server);
    let summary = client
        .summarize(&SummarizeRequest {
            text: "long text".to_string(),
            mode: SummaryMode::Bullet,
        })
        .await
        .unwrap();
    assert_eq!(summary.summary, "- point");

    let quiz = client
        .generate_quiz(&QuizRequest {
            material_id: MaterialId::new("1"),
            count: 10,
            difficulty: Difficulty::Easy,
        })
        .await
        .unwrap();
    assert_eq!(quiz.questions.len(), 1);
    assert_eq!(quiz.questions[0].correct_index, 0);
}

#[tokio::test]
async fn test_speech_routes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/speech/transcribe"))
        .and(body_json(json!({"language": "fr-FR"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"transcript": "bonjour"})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/speech/speak"))
        .and(body_json(json!({"text": "bonjour", "language": "fr-FR"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"done": true})))
        .mount(&server)
        .await;

    let client = service(&server);
    let language = Language::parse("fr-FR").unwrap();

    let transcript = client
        .transcribe(&TranscriptionRequest {
            language: language.clone(),
        })
        .await
        .unwrap();
    assert_eq!(transcript.transcript, "bonjour");

    let spoken = client
        .speak(&SpeakRequest {
            text: "bonjour".to_string(),
            language,
        })
        .await
        .unwrap();
    assert!(spoken.done);
}

#[tokio::test]
async fn test_bearer_auth_when_api_key_configured() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let response = service(&server)
        .with_api_key(Some("test-key".to_string()))
        .search(&SearchRequest {
            query: "q".to_string(),
        })
        .await
        .unwrap();

    assert!(response.results.is_empty());
    assert!(response.insight.is_empty());
}

#[tokio::test]
async fn test_non_success_status_is_operation_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(503).set_body_string("model loading"))
        .mount(&server)
        .await;

    let err = service(&server)
        .send_message(&ChatRequest {
            history: vec![],
            text: "hi".to_string(),
        })
        .await
        .unwrap_err();

    match err {
        Error::Operation(message) => {
            assert!(message.contains("503"));
            assert!(message.contains("model loading"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_serialization_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/summarize"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = service(&server)
        .summarize(&SummarizeRequest {
            text: "t".to_string(),
            mode: SummaryMode::Brief,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Serialization(_)));
}

#[tokio::test]
async fn test_timeout_is_request_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": []}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let err = service(&server)
        .with_timeouts(Duration::from_millis(50), Duration::from_secs(1))
        .search(&SearchRequest {
            query: "q".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Request(_)));
}

#[tokio::test]
async fn test_health_check() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    assert!(service(&server).health_check().await.unwrap());
}

#[tokio::test]
async fn test_health_check_unreachable_is_false() {
    let client = HttpKnowledgeService::new("http://127.0.0.1:9");
    assert!(!client.health_check().await.unwrap());
}
