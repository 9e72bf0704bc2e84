//! Structured logging conventions for kbdesk.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Service misconfiguration the user cannot fix from the workspace |
//! | WARN  | Operation settled with failure, notice shown to the user |
//! | INFO  | Operation settled successfully, client construction |
//! | DEBUG | State transitions, rejected submissions, stale settlements |
//! | TRACE | Per-item data (search hits, chat messages) |
//!
//! ## Field Names
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `subsystem` | `"workspace"` or `"client"` |
//! | `component` | view or backend within a subsystem (`"search"`, `"quiz"`, ...) |
//! | `op` | operation name (`"search"`, `"send_message"`, ...) |
//! | `seq` | submission sequence number of a ticket |
//! | `duration_ms` | wall-clock duration of a service call |
//! | `result_count`, `message_count`, `question_count`, `file_count` | sizes |
//! | `text_len` | byte length of submitted text |
//! | `language` | BCP-47 tag |
//! | `success`, `error`, `status` | outcome |
