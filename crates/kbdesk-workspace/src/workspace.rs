//! The assembled workspace: every tool view wired to one knowledge service
//! and one notice bus.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, instrument};

use kbdesk_core::{KnowledgeService, Notice, NoticeBus, Result};

use crate::chat::ChatSession;
use crate::operation::{ResubmitPolicy, Settlement};
use crate::quiz::QuizView;
use crate::search::SearchView;
use crate::speech::SpeechPanel;
use crate::summarize::Summarizer;
use crate::upload::{DocumentPicker, NoteForm};

/// Workspace construction options.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceOptions {
    /// Open the chat with the assistant greeting.
    pub chat_greeting: bool,
    pub search_policy: ResubmitPolicy,
}

pub struct Workspace {
    service: Arc<dyn KnowledgeService>,
    notices: NoticeBus,
    pub notes: NoteForm,
    pub documents: DocumentPicker,
    pub search: SearchView,
    pub chat: ChatSession,
    pub summarizer: Summarizer,
    pub quiz: QuizView,
    pub speech: SpeechPanel,
}

impl Workspace {
    pub fn new(service: Arc<dyn KnowledgeService>) -> Self {
        Self::with_options(service, WorkspaceOptions::default())
    }

    pub fn with_options(service: Arc<dyn KnowledgeService>, options: WorkspaceOptions) -> Self {
        let notices = NoticeBus::default();
        info!(
            subsystem = "workspace",
            backend = service.backend_name(),
            "Workspace initialized"
        );

        Self {
            notes: NoteForm::new(notices.clone()),
            documents: DocumentPicker::new(notices.clone()),
            search: SearchView::new(notices.clone()).with_policy(options.search_policy),
            chat: if options.chat_greeting {
                ChatSession::with_greeting(notices.clone())
            } else {
                ChatSession::new(notices.clone())
            },
            summarizer: Summarizer::new(notices.clone()),
            quiz: QuizView::new(notices.clone()),
            speech: SpeechPanel::new(notices.clone()),
            service,
            notices,
        }
    }

    pub fn service(&self) -> &Arc<dyn KnowledgeService> {
        &self.service
    }

    pub fn notices(&self) -> &NoticeBus {
        &self.notices
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    #[instrument(skip(self), fields(subsystem = "workspace"))]
    pub async fn health_check(&self) -> Result<bool> {
        self.service.health_check().await
    }

    pub async fn upload_note(&mut self) -> Result<Settlement> {
        self.notes.submit(&*self.service).await
    }

    pub async fn upload_documents(&mut self) -> Result<Settlement> {
        self.documents.submit(&*self.service).await
    }

    pub async fn run_search(&mut self) -> Result<Settlement> {
        self.search.search(&*self.service).await
    }

    pub async fn send_message(&mut self) -> Result<Settlement> {
        self.chat.send(&*self.service).await
    }

    pub async fn summarize(&mut self) -> Result<Settlement> {
        self.summarizer.summarize(&*self.service).await
    }

    pub async fn generate_quiz(&mut self) -> Result<Settlement> {
        self.quiz.generate(&*self.service).await
    }

    pub async fn transcribe(&mut self) -> Result<Settlement> {
        self.speech.listen(&*self.service).await
    }

    pub async fn speak(&mut self) -> Result<Settlement> {
        self.speech.speak(&*self.service).await
    }

    /// Return every view to its initial state. Outstanding tickets become
    /// stale; notice subscribers stay attached.
    pub fn reset(&mut self) {
        self.notes.reset();
        self.documents.reset();
        self.search.reset();
        self.chat.clear();
        self.summarizer.reset();
        self.quiz.reset();
        self.speech.reset();
        info!(subsystem = "workspace", "Workspace reset");
    }
}
