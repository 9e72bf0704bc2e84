//! # kbdesk-core
//!
//! Core types, traits, and abstractions for the kbdesk workspace.
//!
//! This crate provides the request/response contracts exchanged with the
//! knowledge service, the service traits the tool views depend on, the error
//! taxonomy, and the notice bus used for user-facing feedback.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod notices;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result, ValidationError};
pub use models::*;
pub use notices::{Notice, NoticeBus, NoticeLevel};
pub use traits::*;
