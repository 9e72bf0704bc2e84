//! Conversational chat over the knowledge base.
//!
//! The user's message is appended as soon as the request is accepted into
//! `Pending`; the assistant reply is appended only when the request succeeds.
//! A failed request leaves the user's message in place with no placeholder.

use tracing::{debug, instrument};

use kbdesk_core::defaults;
use kbdesk_core::{
    ChatBackend, ChatMessage, ChatRequest, ChatResponse, NoticeBus, Result, ValidationError,
};

use crate::operation::{Operation, OperationStatus, Settlement, Submission, Ticket};

pub struct ChatSession {
    greeting: Option<&'static str>,
    draft: String,
    messages: Vec<ChatMessage>,
    exchange: Operation<ChatRequest, ChatResponse>,
    notices: NoticeBus,
}

impl ChatSession {
    /// An empty conversation.
    pub fn new(notices: NoticeBus) -> Self {
        Self {
            greeting: None,
            draft: String::new(),
            messages: Vec::new(),
            exchange: Operation::new("send_message"),
            notices,
        }
    }

    /// A conversation opened by the assistant greeting.
    pub fn with_greeting(notices: NoticeBus) -> Self {
        let mut session = Self::new(notices);
        session.greeting = Some(defaults::CHAT_GREETING);
        session.clear();
        session
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn status(&self) -> OperationStatus {
        self.exchange.status()
    }

    pub fn is_waiting(&self) -> bool {
        self.exchange.is_pending()
    }

    pub fn can_send(&self) -> bool {
        !self.draft.trim().is_empty() && self.exchange.can_submit()
    }

    pub fn begin_send(&mut self) -> Result<Submission<ChatRequest>> {
        let text = self.draft.trim();
        if text.is_empty() {
            let err = ValidationError::EmptyMessage;
            self.notices.error(err.to_string());
            return Err(err.into());
        }

        let request = ChatRequest {
            history: self.messages.clone(),
            text: text.to_string(),
        };
        let ticket = self.exchange.begin(request.clone())?;

        self.messages.push(ChatMessage::user(request.text.clone()));
        self.draft.clear();
        debug!(message_count = self.messages.len(), "User message appended");
        Ok(Submission { ticket, request })
    }

    pub fn settle_send(&mut self, ticket: Ticket, outcome: Result<ChatResponse>) -> Settlement {
        let settlement = self.exchange.settle(ticket, outcome);
        match settlement {
            Settlement::Succeeded => {
                if let Some(response) = self.exchange.result() {
                    self.messages
                        .push(ChatMessage::assistant(response.reply.clone()));
                }
            }
            Settlement::Failed => {
                if let Some(err) = self.exchange.error() {
                    self.notices.error(format!("Failed to get response: {}", err));
                }
            }
            Settlement::Stale => {}
        }
        settlement
    }

    #[instrument(skip(self, backend), fields(subsystem = "workspace", component = "chat"))]
    pub async fn send<B>(&mut self, backend: &B) -> Result<Settlement>
    where
        B: ChatBackend + ?Sized,
    {
        let submission = self.begin_send()?;
        let outcome = backend.send_message(&submission.request).await;
        Ok(self.settle_send(submission.ticket, outcome))
    }

    /// Drop the conversation and cancel any pending reply. A greeting, if
    /// the session has one, is shown again.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.messages
            .extend(self.greeting.map(ChatMessage::assistant));
        self.draft.clear();
        self.exchange.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbdesk_core::{ChatRole, Error};

    fn reply(text: &str) -> ChatResponse {
        ChatResponse {
            reply: text.to_string(),
        }
    }

    #[test]
    fn test_user_message_appended_before_settlement() {
        let mut chat = ChatSession::new(NoticeBus::default());
        chat.set_draft("hi");

        let submission = chat.begin_send().unwrap();

        assert!(submission.request.history.is_empty());
        assert_eq!(submission.request.text, "hi");
        assert_eq!(chat.messages(), &[ChatMessage::user("hi")]);
        assert_eq!(chat.draft(), "");
        assert!(chat.is_waiting());
    }

    #[test]
    fn test_success_appends_exactly_one_reply() {
        let mut chat = ChatSession::new(NoticeBus::default());
        chat.set_draft("hi");
        let submission = chat.begin_send().unwrap();

        chat.settle_send(submission.ticket, Ok(reply("hello")));

        assert_eq!(
            chat.messages(),
            &[ChatMessage::user("hi"), ChatMessage::assistant("hello")]
        );
        assert_eq!(chat.status(), OperationStatus::Succeeded);
    }

    #[test]
    fn test_failure_keeps_user_message_without_placeholder() {
        let mut chat = ChatSession::new(NoticeBus::default());
        chat.set_draft("hi");
        let submission = chat.begin_send().unwrap();

        chat.settle_send(submission.ticket, Err(Error::Operation("down".into())));

        assert_eq!(chat.messages(), &[ChatMessage::user("hi")]);
        assert_eq!(chat.status(), OperationStatus::Failed);
    }

    #[test]
    fn test_blank_draft_fails_validation() {
        let mut chat = ChatSession::new(NoticeBus::default());
        chat.set_draft("  ");

        assert!(!chat.can_send());
        assert!(matches!(
            chat.begin_send(),
            Err(Error::Validation(ValidationError::EmptyMessage))
        ));
        assert!(chat.messages().is_empty());
    }

    #[test]
    fn test_send_blocked_while_waiting() {
        let mut chat = ChatSession::new(NoticeBus::default());
        chat.set_draft("first");
        chat.begin_send().unwrap();

        chat.set_draft("second");
        assert!(!chat.can_send());
        assert!(matches!(chat.begin_send(), Err(Error::InFlight(_))));
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.draft(), "second");
    }

    #[test]
    fn test_history_carries_prior_turns() {
        let mut chat = ChatSession::with_greeting(NoticeBus::default());
        assert_eq!(chat.messages()[0].role, ChatRole::Assistant);

        chat.set_draft("one");
        let first = chat.begin_send().unwrap();
        chat.settle_send(first.ticket, Ok(reply("r1")));

        chat.set_draft("two");
        let second = chat.begin_send().unwrap();
        assert_eq!(second.request.history.len(), 3);
        assert_eq!(second.request.history[2], ChatMessage::assistant("r1"));
        assert_eq!(chat.messages().len(), 4);
    }

    #[test]
    fn test_clear_restores_greeting() {
        let mut chat = ChatSession::with_greeting(NoticeBus::default());
        chat.set_draft("hi");
        chat.begin_send().unwrap();

        chat.clear();
        assert_eq!(
            chat.messages(),
            &[ChatMessage::assistant(defaults::CHAT_GREETING)]
        );
    }

    #[test]
    fn test_clear_discards_pending_reply() {
        let mut chat = ChatSession::new(NoticeBus::default());
        chat.set_draft("hi");
        let submission = chat.begin_send().unwrap();

        chat.clear();

        assert_eq!(chat.settle_send(submission.ticket, Ok(reply("late"))), Settlement::Stale);
        assert!(chat.messages().is_empty());
    }
}
