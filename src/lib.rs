//! # SentinelDB
//!
//! An in-memory key-value store with:
//! - An append-only operation log for durability
//! - Crash recovery by log replay, tolerant of a torn final record
//! - Log compaction (one `SET` record per live key)
//! - Point-in-time snapshot export for backup
//! - A line-oriented TCP protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │             (bounded worker pool, one per client)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  bytes → FrameDecoder → Command
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Engine                                │
//! │        (one RwLock: GET shared, everything else exclusive)   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Durable    │          │   HashMap   │
//!   │  Log        │          │   (Store)   │
//!   └──────┬──────┘          └──────┬──────┘
//!          │ compact                │ save
//!          ▼                        ▼
//!     data.log (rewritten)     snapshot.db
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod log;
pub mod store;
pub mod protocol;
pub mod engine;
pub mod network;
pub mod exporter;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{SentinelError, Result};
pub use config::Config;
pub use engine::Engine;
pub use store::Store;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of SentinelDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
