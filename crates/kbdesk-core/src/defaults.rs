//! Centralized default constants for kbdesk.
//!
//! Every crate reads its defaults from here instead of defining its own
//! magic numbers. Organized by domain area.

// =============================================================================
// SERVICE
// =============================================================================

/// Default base URL of the knowledge service.
pub const SERVICE_URL: &str = "http://localhost:8000";

/// Timeout for JSON requests (seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Timeout for document uploads (seconds). PDFs can be large.
pub const UPLOAD_TIMEOUT_SECS: u64 = 300;

/// Timeout for the health probe (seconds).
pub const HEALTH_TIMEOUT_SECS: u64 = 5;

// =============================================================================
// ROUTES
// =============================================================================

pub const ROUTE_UPLOAD_NOTE: &str = "/upload/notes-multi";
pub const ROUTE_UPLOAD_DOCUMENTS: &str = "/upload/pdfs-multi";
pub const ROUTE_SEARCH: &str = "/search";
pub const ROUTE_CHAT: &str = "/chat";
pub const ROUTE_SUMMARIZE: &str = "/summarize";
pub const ROUTE_QUIZ: &str = "/quiz";
pub const ROUTE_TRANSCRIBE: &str = "/speech/transcribe";
pub const ROUTE_SPEAK: &str = "/speech/speak";
pub const ROUTE_HEALTH: &str = "/health";

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Backend selection: `http` or `mock`.
pub const ENV_BACKEND: &str = "KBDESK_BACKEND";

/// Knowledge service base URL.
pub const ENV_SERVICE_URL: &str = "KBDESK_SERVICE_URL";

/// Bearer token sent with every request (optional).
pub const ENV_API_KEY: &str = "KBDESK_API_KEY";

/// JSON request timeout override.
pub const ENV_TIMEOUT_SECS: &str = "KBDESK_TIMEOUT_SECS";

/// Document upload timeout override.
pub const ENV_UPLOAD_TIMEOUT_SECS: &str = "KBDESK_UPLOAD_TIMEOUT_SECS";

/// Log output format: `text` or `json`.
pub const ENV_LOG_FORMAT: &str = "KBDESK_LOG_FORMAT";

/// Optional log file path (daily rotation).
pub const ENV_LOG_FILE: &str = "KBDESK_LOG_FILE";

/// Default tracing filter when `RUST_LOG` is unset.
pub const LOG_FILTER: &str = "kbdesk=info";

// =============================================================================
// NOTICES
// =============================================================================

/// Notice bus buffer capacity.
pub const NOTICE_BUS_CAPACITY: usize = 64;

/// How long the "copied" indicator stays lit after a clipboard copy.
pub const COPY_FEEDBACK_MS: u64 = 2000;

// =============================================================================
// CHAT
// =============================================================================

/// Greeting an assistant-led chat session opens with.
pub const CHAT_GREETING: &str =
    "Hello! I'm your AI assistant. Ask me anything about your uploaded materials!";

// =============================================================================
// QUIZ
// =============================================================================

/// Question counts offered by the quiz configuration.
pub const QUIZ_QUESTION_COUNTS: [u32; 4] = [5, 10, 15, 20];

/// Default number of questions.
pub const QUIZ_QUESTION_COUNT: u32 = 5;

/// Minimum options a generated question must carry.
pub const QUIZ_MIN_OPTIONS: usize = 2;

// =============================================================================
// SPEECH
// =============================================================================

/// Default speech language.
pub const SPEECH_LANGUAGE: &str = "en-US";

/// Languages offered by the speech panel, as (tag, display name).
pub const SPEECH_LANGUAGES: [(&str, &str); 5] = [
    ("en-US", "English"),
    ("es-ES", "Spanish"),
    ("fr-FR", "French"),
    ("hi-IN", "Hindi"),
    ("ja-JP", "Japanese"),
];

// =============================================================================
// MOCK SERVICE LATENCY
// =============================================================================

pub const MOCK_SEARCH_LATENCY_MS: u64 = 1500;
pub const MOCK_CHAT_LATENCY_MS: u64 = 1000;
pub const MOCK_SUMMARIZE_LATENCY_MS: u64 = 1500;
pub const MOCK_QUIZ_LATENCY_MS: u64 = 1500;
pub const MOCK_TRANSCRIBE_LATENCY_MS: u64 = 2000;
pub const MOCK_SPEAK_LATENCY_MS: u64 = 3000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_quiz_count_is_offered() {
        assert!(QUIZ_QUESTION_COUNTS.contains(&QUIZ_QUESTION_COUNT));
    }

    #[test]
    fn test_default_language_is_offered() {
        assert!(SPEECH_LANGUAGES
            .iter()
            .any(|(tag, _)| *tag == SPEECH_LANGUAGE));
    }

    #[test]
    fn test_routes_are_absolute() {
        for route in [
            ROUTE_UPLOAD_NOTE,
            ROUTE_UPLOAD_DOCUMENTS,
            ROUTE_SEARCH,
            ROUTE_CHAT,
            ROUTE_SUMMARIZE,
            ROUTE_QUIZ,
            ROUTE_TRANSCRIBE,
            ROUTE_SPEAK,
            ROUTE_HEALTH,
        ] {
            assert!(route.starts_with('/'), "{route} must start with /");
        }
    }
}
