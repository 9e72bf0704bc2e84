//! # kbdesk-workspace
//!
//! The study workspace: one view per tool, each owning its input and an
//! [`Operation`] that tracks the request it sends to the knowledge service.
//!
//! Every view exposes the same split-phase shape:
//!
//! - `begin*` validates input, enters `Pending` and returns a [`Submission`]
//! - `settle*` applies the service's outcome if its [`Ticket`] is current
//! - an async driver that does both around one service call
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use kbdesk_client::{connect, ClientConfig};
//! use kbdesk_workspace::Workspace;
//!
//! let service = connect(&ClientConfig::load()?)?;
//! let mut workspace = Workspace::new(service);
//!
//! workspace.search.set_query("neural networks");
//! workspace.run_search().await?;
//! ```

pub mod chat;
pub mod operation;
pub mod quiz;
pub mod render;
pub mod search;
pub mod speech;
pub mod summarize;
pub mod upload;
pub mod workspace;

pub use chat::ChatSession;
pub use operation::{
    Operation, OperationState, OperationStatus, ResubmitPolicy, Settlement, Submission, Ticket,
};
pub use quiz::{AnswerMap, QuizConfig, QuizSheet, QuizView};
pub use render::{InsightRegion, OptionMark, QuizScore};
pub use search::{Hit, SearchDisplay, SearchOutcome, SearchView};
pub use speech::{SpeechActivity, SpeechPanel, Toggle};
pub use summarize::Summarizer;
pub use upload::{DocumentPicker, NoteForm};
pub use workspace::{Workspace, WorkspaceOptions};
