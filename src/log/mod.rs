//! Durable Log Module
//!
//! Append-only operation log backing the in-memory store. It is the only
//! source used for recovery.
//!
//! ## Responsibilities
//! - Append one record per mutation, durable before the caller is acknowledged
//! - Replay records in append order on startup
//! - Discard a torn trailing record left behind by a crash
//!
//! ## File Format
//! One record per line, tokens separated by a single space:
//! ```text
//! SET user1 alice\n
//! SET counter 7\n
//! DEL user1\n
//! SET empty \n        <- empty value: the value token is simply absent
//! ```
//! A final line without its `\n` was never acknowledged and is dropped
//! during recovery.

mod record;
mod writer;
mod reader;
mod recovery;

pub use record::{tokenize, LogRecord};
pub use writer::LogWriter;
pub use reader::{LogLine, LogReader};
pub use recovery::{LogRecovery, RecoveryResult};
