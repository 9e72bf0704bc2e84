//! Error types for kbdesk.
//!
//! Two families matter to the views: [`ValidationError`] is raised locally
//! before anything is sent, and [`Error::Operation`] carries a failure that the
//! knowledge service settled with. Both are recoverable; the user corrects the
//! input or simply submits again.

use thiserror::Error;

/// Result type alias using kbdesk's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for kbdesk operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Input rejected before submission
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A submission was rejected because the surface already has one in flight
    #[error("Operation already in progress: {0}")]
    InFlight(String),

    /// The knowledge service settled the call with a failure
    #[error("Operation failed: {0}")]
    Operation(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error was produced locally, before any request was sent.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

/// Local, pre-submit input rejection.
///
/// The display text is the notice shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in both title and content")]
    IncompleteNote,

    #[error("Please select at least one PDF file")]
    NoFilesSelected,

    #[error("Please enter a search query")]
    EmptyQuery,

    #[error("Please enter a message")]
    EmptyMessage,

    #[error("Please enter text to summarize")]
    EmptySummaryText,

    #[error("Please select a material")]
    NoMaterialSelected,

    #[error("Question count must be greater than zero")]
    InvalidQuestionCount,

    #[error("Please answer all questions ({answered}/{total} answered)")]
    IncompleteQuiz { answered: usize, total: usize },

    #[error("Quiz has already been submitted")]
    QuizAlreadySubmitted,

    #[error("No quiz has been generated")]
    NoQuiz,

    #[error("Question {question} has no option {option}")]
    OptionOutOfRange { question: usize, option: usize },

    #[error("No text to read")]
    EmptySpeechText,

    #[error("Invalid language tag: {0}")]
    InvalidLanguage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_are_user_facing() {
        assert_eq!(
            ValidationError::IncompleteNote.to_string(),
            "Please fill in both title and content"
        );
        assert_eq!(
            ValidationError::EmptyQuery.to_string(),
            "Please enter a search query"
        );
        assert_eq!(
            ValidationError::NoFilesSelected.to_string(),
            "Please select at least one PDF file"
        );
    }

    #[test]
    fn test_validation_error_wraps_transparently() {
        let err: Error = ValidationError::EmptySpeechText.into();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "No text to read");
    }

    #[test]
    fn test_incomplete_quiz_message() {
        let err = ValidationError::IncompleteQuiz {
            answered: 1,
            total: 3,
        };
        assert_eq!(err.to_string(), "Please answer all questions (1/3 answered)");
    }

    #[test]
    fn test_error_display_operation() {
        let err = Error::Operation("service unavailable".to_string());
        assert_eq!(err.to_string(), "Operation failed: service unavailable");
        assert!(!err.is_validation());
    }

    #[test]
    fn test_error_display_in_flight() {
        let err = Error::InFlight("search".to_string());
        assert_eq!(err.to_string(), "Operation already in progress: search");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("access denied"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
