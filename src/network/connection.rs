//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;

use crate::engine::Engine;
use crate::error::{Result, SentinelError};
use crate::protocol::{parse_command, Command, FrameDecoder, Reply};

/// Size of each read from the socket
const READ_CHUNK: usize = 1024;

/// What to do after a frame has been answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Close,
}

/// Handles a single client connection
///
/// Generic over the byte stream so the same loop serves a `TcpStream` or
/// any in-memory duplex in tests.
pub struct Connection<S = TcpStream> {
    stream: S,

    /// Accumulates bytes until whole frames are available
    decoder: FrameDecoder,

    /// Reference to the storage engine
    engine: Arc<Engine>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection<TcpStream> {
    /// Create a new connection handler for an accepted socket
    pub fn new(stream: TcpStream, engine: Arc<Engine>) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        Ok(Self::from_stream(stream, engine, peer_addr))
    }
}

impl<S: Read + Write> Connection<S> {
    pub fn from_stream(stream: S, engine: Arc<Engine>, peer_addr: impl Into<String>) -> Self {
        Self {
            stream,
            decoder: FrameDecoder::new(),
            engine,
            peer_addr: peer_addr.into(),
        }
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Answers every complete frame in order, one reply per frame.
    /// Returns when the client disconnects, sends `EXIT`, or overruns the
    /// frame limit.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        let mut chunk = [0u8; READ_CHUNK];
        loop {
            // Answer everything already buffered before reading again
            loop {
                let frame = match self.decoder.next_frame() {
                    Ok(Some(frame)) => frame,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!("Closing {}: {}", self.peer_addr, e);
                        let _ = self.send(&Reply::error(e.to_string()));
                        return Err(SentinelError::Protocol(e.to_string()));
                    }
                };

                if self.process_frame(&frame)? == Flow::Close {
                    return Ok(());
                }
            }

            let n = match self.stream.read(&mut chunk) {
                Ok(0) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if is_disconnect(e.kind()) => {
                    tracing::debug!("Connection to {} lost: {}", self.peer_addr, e);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e.into());
                }
            };

            self.decoder.extend(&chunk[..n]);
        }
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn process_frame(&mut self, frame: &[u8]) -> Result<Flow> {
        let (reply, flow) = match parse_command(frame) {
            Ok(Command::Exit) => {
                tracing::debug!("Client {} requested exit", self.peer_addr);
                (Reply::Bye, Flow::Close)
            }
            Ok(command) => {
                tracing::trace!("{} -> {:?}", self.peer_addr, command);
                (self.engine.execute(command), Flow::Continue)
            }
            Err(e) => {
                tracing::debug!("Bad request from {}: {}", self.peer_addr, e);
                (Reply::error(e.to_string()), Flow::Continue)
            }
        };

        match self.send(&reply) {
            Ok(()) => Ok(flow),
            Err(SentinelError::Io(ref e)) if is_disconnect(e.kind()) => {
                tracing::debug!(
                    "Client {} disconnected before reply could be sent: {}",
                    self.peer_addr,
                    e
                );
                Ok(Flow::Close)
            }
            Err(e) => {
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                Err(e)
            }
        }
    }

    /// Send a reply to the client
    fn send(&mut self, reply: &Reply) -> Result<()> {
        self.stream.write_all(&reply.encode())?;
        self.stream.flush()?;
        Ok(())
    }
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::UnexpectedEof
    )
}
