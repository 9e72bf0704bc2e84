//! Speech-to-text and text-to-speech panel.
//!
//! Transcription and speaking share one busy gate: neither can start while
//! the other is pending. The selected language is read when an operation
//! begins, so changing it mid-operation only affects the next one.

use std::fmt;

use tracing::{debug, instrument};

use kbdesk_core::{
    Error, Language, NoticeBus, Result, SpeakRequest, SpeakResponse, SpeechBackend,
    TranscriptionRequest, TranscriptionResponse, ValidationError,
};

use crate::operation::{Operation, OperationStatus, Settlement, Submission, Ticket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechActivity {
    Idle,
    Listening,
    Speaking,
}

impl fmt::Display for SpeechActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Listening => write!(f, "listening"),
            Self::Speaking => write!(f, "speaking"),
        }
    }
}

/// Outcome of pressing the transcription control.
#[derive(Debug, Clone)]
pub enum Toggle {
    Started(Submission<TranscriptionRequest>),
    Stopped,
}

pub struct SpeechPanel {
    language: Language,
    text: String,
    transcription: Operation<TranscriptionRequest, TranscriptionResponse>,
    speech: Operation<SpeakRequest, SpeakResponse>,
    notices: NoticeBus,
}

impl SpeechPanel {
    pub fn new(notices: NoticeBus) -> Self {
        Self {
            language: Language::default(),
            text: String::new(),
            transcription: Operation::new("transcribe"),
            speech: Operation::new("speak"),
            notices,
        }
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn transcription_status(&self) -> OperationStatus {
        self.transcription.status()
    }

    pub fn speech_status(&self) -> OperationStatus {
        self.speech.status()
    }

    pub fn activity(&self) -> SpeechActivity {
        if self.transcription.is_pending() {
            SpeechActivity::Listening
        } else if self.speech.is_pending() {
            SpeechActivity::Speaking
        } else {
            SpeechActivity::Idle
        }
    }

    pub fn is_busy(&self) -> bool {
        self.activity() != SpeechActivity::Idle
    }

    pub fn can_speak(&self) -> bool {
        !self.text.trim().is_empty() && !self.is_busy()
    }

    // -------------------------------------------------------------------------
    // Transcription
    // -------------------------------------------------------------------------

    pub fn begin_transcription(&mut self) -> Result<Submission<TranscriptionRequest>> {
        if self.is_busy() {
            return Err(self.busy_error());
        }

        let request = TranscriptionRequest {
            language: self.language.clone(),
        };
        let ticket = self.transcription.begin(request.clone())?;
        debug!(language = %request.language, "Listening");
        self.notices.info("Speech-to-text started");
        Ok(Submission { ticket, request })
    }

    /// Cancel a pending transcription. Its settlement will be discarded.
    pub fn stop_transcription(&mut self) -> bool {
        if !self.transcription.is_pending() {
            return false;
        }
        self.transcription.reset();
        self.notices.info("Speech-to-text stopped");
        true
    }

    /// Start when idle, stop when listening.
    pub fn toggle_transcription(&mut self) -> Result<Toggle> {
        if self.stop_transcription() {
            return Ok(Toggle::Stopped);
        }
        self.begin_transcription().map(Toggle::Started)
    }

    pub fn settle_transcription(
        &mut self,
        ticket: Ticket,
        outcome: Result<TranscriptionResponse>,
    ) -> Settlement {
        let settlement = self.transcription.settle(ticket, outcome);
        match settlement {
            Settlement::Succeeded => {
                if let Some(response) = self.transcription.result() {
                    self.text = response.transcript.clone();
                }
                self.notices.success("Speech transcribed!");
            }
            Settlement::Failed => {
                if let Some(err) = self.transcription.error() {
                    self.notices.error(format!("Speech-to-text failed: {}", err));
                }
            }
            Settlement::Stale => {}
        }
        settlement
    }

    #[instrument(skip(self, backend), fields(subsystem = "workspace", component = "speech"))]
    pub async fn listen<B>(&mut self, backend: &B) -> Result<Settlement>
    where
        B: SpeechBackend + ?Sized,
    {
        let submission = self.begin_transcription()?;
        let outcome = backend.transcribe(&submission.request).await;
        Ok(self.settle_transcription(submission.ticket, outcome))
    }

    // -------------------------------------------------------------------------
    // Speaking
    // -------------------------------------------------------------------------

    pub fn begin_speak(&mut self) -> Result<Submission<SpeakRequest>> {
        if self.text.trim().is_empty() {
            let err = ValidationError::EmptySpeechText;
            self.notices.error(err.to_string());
            return Err(err.into());
        }
        if self.is_busy() {
            return Err(self.busy_error());
        }

        let request = SpeakRequest {
            text: self.text.clone(),
            language: self.language.clone(),
        };
        let ticket = self.speech.begin(request.clone())?;
        self.notices.info("Text-to-speech started");
        Ok(Submission { ticket, request })
    }

    pub fn settle_speak(&mut self, ticket: Ticket, outcome: Result<SpeakResponse>) -> Settlement {
        let outcome = outcome.and_then(|response| {
            if response.done {
                Ok(response)
            } else {
                Err(Error::Operation("speech did not complete".to_string()))
            }
        });

        let settlement = self.speech.settle(ticket, outcome);
        match settlement {
            Settlement::Succeeded => self.notices.success("Text-to-speech completed"),
            Settlement::Failed => {
                if let Some(err) = self.speech.error() {
                    self.notices.error(format!("Text-to-speech failed: {}", err));
                }
            }
            Settlement::Stale => {}
        }
        settlement
    }

    #[instrument(skip(self, backend), fields(subsystem = "workspace", component = "speech"))]
    pub async fn speak<B>(&mut self, backend: &B) -> Result<Settlement>
    where
        B: SpeechBackend + ?Sized,
    {
        let submission = self.begin_speak()?;
        let outcome = backend.speak(&submission.request).await;
        Ok(self.settle_speak(submission.ticket, outcome))
    }

    /// Cancel whatever is pending and clear the text.
    pub fn reset(&mut self) {
        self.transcription.reset();
        self.speech.reset();
        self.text.clear();
        self.language = Language::default();
    }

    fn busy_error(&self) -> Error {
        Error::InFlight(self.activity().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript(text: &str) -> TranscriptionResponse {
        TranscriptionResponse {
            transcript: text.to_string(),
        }
    }

    fn assert_not_both_busy(panel: &SpeechPanel) {
        assert!(
            !(panel.transcription_status() == OperationStatus::Pending
                && panel.speech_status() == OperationStatus::Pending)
        );
    }

    #[test]
    fn test_toggle_starts_then_stops() {
        let mut panel = SpeechPanel::new(NoticeBus::default());

        let started = panel.toggle_transcription().unwrap();
        let ticket = match started {
            Toggle::Started(submission) => submission.ticket,
            Toggle::Stopped => panic!("expected start"),
        };
        assert_eq!(panel.activity(), SpeechActivity::Listening);

        assert!(matches!(panel.toggle_transcription().unwrap(), Toggle::Stopped));
        assert_eq!(panel.activity(), SpeechActivity::Idle);

        let settlement = panel.settle_transcription(ticket, Ok(transcript("late words")));
        assert_eq!(settlement, Settlement::Stale);
        assert_eq!(panel.text(), "");
    }

    #[test]
    fn test_transcript_replaces_text() {
        let mut panel = SpeechPanel::new(NoticeBus::default());
        panel.set_text("typed");

        let submission = panel.begin_transcription().unwrap();
        panel.settle_transcription(submission.ticket, Ok(transcript("spoken")));

        assert_eq!(panel.text(), "spoken");
        assert_eq!(panel.activity(), SpeechActivity::Idle);
    }

    #[test]
    fn test_cannot_speak_while_listening() {
        let mut panel = SpeechPanel::new(NoticeBus::default());
        panel.set_text("hello");
        panel.begin_transcription().unwrap();

        assert!(!panel.can_speak());
        assert!(matches!(panel.begin_speak(), Err(Error::InFlight(_))));
        assert_not_both_busy(&panel);
    }

    #[test]
    fn test_cannot_listen_while_speaking() {
        let mut panel = SpeechPanel::new(NoticeBus::default());
        panel.set_text("hello");
        panel.begin_speak().unwrap();

        assert_eq!(panel.activity(), SpeechActivity::Speaking);
        assert!(matches!(panel.toggle_transcription(), Err(Error::InFlight(_))));
        assert_not_both_busy(&panel);
    }

    #[test]
    fn test_speak_requires_text() {
        let mut panel = SpeechPanel::new(NoticeBus::default());
        panel.set_text("  ");

        assert!(matches!(
            panel.begin_speak(),
            Err(Error::Validation(ValidationError::EmptySpeechText))
        ));
        assert_eq!(panel.activity(), SpeechActivity::Idle);
    }

    #[test]
    fn test_language_read_at_begin() {
        let mut panel = SpeechPanel::new(NoticeBus::default());
        panel.set_text("hola");
        panel.set_language(Language::parse("es-ES").unwrap());

        let submission = panel.begin_speak().unwrap();
        panel.set_language(Language::parse("ja-JP").unwrap());

        assert_eq!(submission.request.language.as_str(), "es-ES");
        panel.settle_speak(submission.ticket, Ok(SpeakResponse { done: true }));

        panel.set_text("konnichiwa");
        let next = panel.begin_speak().unwrap();
        assert_eq!(next.request.language.as_str(), "ja-JP");
    }

    #[test]
    fn test_speak_not_done_is_failure() {
        let mut panel = SpeechPanel::new(NoticeBus::default());
        panel.set_text("hello");

        let submission = panel.begin_speak().unwrap();
        let settlement = panel.settle_speak(submission.ticket, Ok(SpeakResponse { done: false }));

        assert_eq!(settlement, Settlement::Failed);
        assert_eq!(panel.activity(), SpeechActivity::Idle);
        assert!(panel.can_speak());
    }

    #[test]
    fn test_activity_display() {
        assert_eq!(SpeechActivity::Listening.to_string(), "listening");
    }
}
