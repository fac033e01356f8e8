//! Reply definitions
//!
//! Represents replies to clients.

/// Absent-key sentinel as it appears on the wire
pub const NIL: &[u8] = b"(nil)";

/// A reply to send to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `+OK`
    Ok,

    /// A stored value, sent verbatim
    Value(Vec<u8>),

    /// `(nil)`: the key is absent
    Nil,

    /// `+Snapshot saved`
    SnapshotSaved,

    /// `+Log compacted`
    Compacted,

    /// `BYE`
    Bye,

    /// `-ERR <msg>`: the request was malformed
    Error(String),

    /// `-IOERR <msg>`: the request was understood but could not be persisted
    IoError(String),
}

impl Reply {
    /// Create an ERROR reply
    pub fn error(message: impl Into<String>) -> Self {
        Reply::Error(message.into())
    }

    /// Render the reply, including its `\r\n` terminator
    pub fn encode(&self) -> Vec<u8> {
        let mut out = match self {
            Reply::Ok => b"+OK".to_vec(),
            Reply::Value(value) => value.clone(),
            Reply::Nil => NIL.to_vec(),
            Reply::SnapshotSaved => b"+Snapshot saved".to_vec(),
            Reply::Compacted => b"+Log compacted".to_vec(),
            Reply::Bye => b"BYE".to_vec(),
            Reply::Error(msg) => format!("-ERR {}", msg).into_bytes(),
            Reply::IoError(msg) => format!("-IOERR {}", msg).into_bytes(),
        };
        out.extend_from_slice(b"\r\n");
        out
    }
}
