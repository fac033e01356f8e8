//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread
//! - One worker thread per admitted connection, bounded by `max_connections`
//! - Connections beyond the bound are refused with an error line
//! - Commands routed through Engine

mod server;
mod connection;

pub use server::{Server, ShutdownHandle};
pub use connection::Connection;
