//! Command definitions
//!
//! Represents commands from clients.

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set a key to a value (value may be empty)
    Set { key: Vec<u8>, value: Vec<u8> },

    /// Get a value by key
    Get { key: Vec<u8> },

    /// Delete a key
    Del { key: Vec<u8> },

    /// Export a snapshot
    Save,

    /// Compact the durable log
    Compact,

    /// End the session
    Exit,
}

impl Command {
    /// The wire verb for this command
    pub fn verb(&self) -> &'static str {
        match self {
            Command::Set { .. } => "SET",
            Command::Get { .. } => "GET",
            Command::Del { .. } => "DEL",
            Command::Save => "SAVE",
            Command::Compact => "COMPACT",
            Command::Exit => "EXIT",
        }
    }

    /// Encode as a request line (CRLF-terminated)
    pub fn encode(&self) -> Vec<u8> {
        let mut line = self.verb().as_bytes().to_vec();
        match self {
            Command::Set { key, value } => {
                line.push(b' ');
                line.extend_from_slice(key);
                if !value.is_empty() {
                    line.push(b' ');
                    line.extend_from_slice(value);
                }
            }
            Command::Get { key } | Command::Del { key } => {
                line.push(b' ');
                line.extend_from_slice(key);
            }
            Command::Save | Command::Compact | Command::Exit => {}
        }
        line.extend_from_slice(b"\r\n");
        line
    }
}
