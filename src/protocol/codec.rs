//! Protocol codec
//!
//! Framing and parsing for the line protocol.
//!
//! ## Framing
//! ```text
//!   "SET a 1\r\nGET a\n\n\rDEL"
//!    └──────┘  └───┘ └──┘ └──
//!    frame 1   frame 2 sep  partial (stays buffered)
//! ```
//!
//! ## Parsing policy
//! - Verbs are case-sensitive
//! - A missing key is rejected (`WrongArity`); keys are never empty
//! - A missing `SET` value means the empty value
//! - Surplus tokens are rejected (`WrongArity`)

use std::io::{BufRead, Write};

use bytes::{Buf, Bytes, BytesMut};
use thiserror::Error;

use crate::error::{Result, SentinelError};
use crate::log::tokenize;
use super::Command;

/// Maximum bytes buffered without seeing a frame terminator (64 KiB)
pub const MAX_FRAME_SIZE: usize = 64 * 1024;

/// Stray control byte removed from the input stream
const STRAY_BYTE: u8 = 0xFF;

/// Why a frame could not become a command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown command")]
    UnknownCommand(String),

    #[error("wrong number of arguments for '{0}'")]
    WrongArity(&'static str),

    #[error("frame exceeds {0} bytes")]
    FrameTooLarge(usize),
}

// =============================================================================
// Frame Decoder
// =============================================================================

/// Accumulates a byte stream and splits it into CR/LF-delimited frames
#[derive(Debug)]
pub struct FrameDecoder {
    buf: BytesMut,
    max_frame: usize,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::with_max_frame(MAX_FRAME_SIZE)
    }

    pub fn with_max_frame(max_frame: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(1024),
            max_frame,
        }
    }

    /// Append received bytes (0xFF bytes are dropped)
    pub fn extend(&mut self, data: &[u8]) {
        self.buf.reserve(data.len());
        for chunk in data.split(|&b| b == STRAY_BYTE) {
            self.buf.extend_from_slice(chunk);
        }
    }

    /// Take the next complete, non-empty frame
    ///
    /// Returns `Ok(None)` when more input is needed. Errors once the buffer
    /// holds more than `max_frame` bytes with no terminator in sight.
    pub fn next_frame(&mut self) -> std::result::Result<Option<Bytes>, ParseError> {
        self.skip_separators();

        let Some(end) = self.buf.iter().position(|&b| is_separator(b)) else {
            if self.buf.len() > self.max_frame {
                return Err(ParseError::FrameTooLarge(self.max_frame));
            }
            return Ok(None);
        };

        let frame = self.buf.split_to(end).freeze();
        self.skip_separators();
        Ok(Some(frame))
    }

    /// Bytes held waiting for a terminator
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    fn skip_separators(&mut self) {
        let n = self.buf.iter().take_while(|&&b| is_separator(b)).count();
        self.buf.advance(n);
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn is_separator(b: u8) -> bool {
    b == b'\r' || b == b'\n'
}

// =============================================================================
// Command Parsing
// =============================================================================

/// Parse one frame into a command
pub fn parse_command(frame: &[u8]) -> std::result::Result<Command, ParseError> {
    let mut tokens = tokenize(frame);
    let verb = tokens.next().unwrap_or_default();

    let command = match verb {
        b"SET" => {
            let key = required(tokens.next(), "SET")?;
            let value = tokens.next().map(<[u8]>::to_vec).unwrap_or_default();
            Command::Set { key, value }
        }
        b"GET" => Command::Get {
            key: required(tokens.next(), "GET")?,
        },
        b"DEL" => Command::Del {
            key: required(tokens.next(), "DEL")?,
        },
        b"SAVE" => Command::Save,
        b"COMPACT" => Command::Compact,
        b"EXIT" => Command::Exit,
        _ => {
            return Err(ParseError::UnknownCommand(
                String::from_utf8_lossy(verb).into_owned(),
            ))
        }
    };

    if tokens.next().is_some() {
        return Err(ParseError::WrongArity(command.verb()));
    }
    Ok(command)
}

fn required(token: Option<&[u8]>, verb: &'static str) -> std::result::Result<Vec<u8>, ParseError> {
    token.map(<[u8]>::to_vec).ok_or(ParseError::WrongArity(verb))
}

// =============================================================================
// Stream-based I/O helpers (client side)
// =============================================================================

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    writer.write_all(&command.encode())?;
    writer.flush()?;
    Ok(())
}

/// Read one CRLF-terminated reply line, without its terminator
pub fn read_reply<R: BufRead>(reader: &mut R) -> Result<Vec<u8>> {
    let mut line = Vec::new();
    let n = reader.read_until(b'\n', &mut line)?;
    if n == 0 {
        return Err(SentinelError::Network("connection closed by server".to_string()));
    }
    if line.ends_with(b"\r\n") {
        line.truncate(line.len() - 2);
    } else if line.ends_with(b"\n") {
        line.truncate(line.len() - 1);
    } else {
        return Err(SentinelError::Protocol("truncated reply".to_string()));
    }
    Ok(line)
}
