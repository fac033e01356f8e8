//! Log record definitions
//!
//! Defines the two operations that can appear in the durable log and their
//! line encoding.

use std::collections::HashMap;

const SET: &[u8] = b"SET";
const DEL: &[u8] = b"DEL";

/// A single operation in the durable log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRecord {
    /// Insert or overwrite a key
    Set { key: Vec<u8>, value: Vec<u8> },

    /// Remove a key (recorded even if the key is absent)
    Del { key: Vec<u8> },
}

impl LogRecord {
    pub fn set(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        LogRecord::Set {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn del(key: impl Into<Vec<u8>>) -> Self {
        LogRecord::Del { key: key.into() }
    }

    /// The key this record touches
    pub fn key(&self) -> &[u8] {
        match self {
            LogRecord::Set { key, .. } | LogRecord::Del { key } => key,
        }
    }

    /// Encode as one newline-terminated line
    ///
    /// Callers must have validated that key and value carry no whitespace,
    /// otherwise the line will not parse back to the same record.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            LogRecord::Set { key, value } => {
                let mut line = Vec::with_capacity(SET.len() + key.len() + value.len() + 3);
                line.extend_from_slice(SET);
                line.push(b' ');
                line.extend_from_slice(key);
                line.push(b' ');
                line.extend_from_slice(value);
                line.push(b'\n');
                line
            }
            LogRecord::Del { key } => {
                let mut line = Vec::with_capacity(DEL.len() + key.len() + 2);
                line.extend_from_slice(DEL);
                line.push(b' ');
                line.extend_from_slice(key);
                line.push(b'\n');
                line
            }
        }
    }

    /// Parse one line (with or without its terminator)
    ///
    /// Returns `None` for anything that is not exactly `SET key [value]` or
    /// `DEL key`.
    pub fn parse(line: &[u8]) -> Option<Self> {
        let mut tokens = tokenize(line);
        let verb = tokens.next()?;
        let key = tokens.next()?.to_vec();

        let record = match verb {
            SET => {
                let value = tokens.next().map(<[u8]>::to_vec).unwrap_or_default();
                LogRecord::Set { key, value }
            }
            DEL => LogRecord::Del { key },
            _ => return None,
        };

        match tokens.next() {
            Some(_) => None,
            None => Some(record),
        }
    }

    /// Apply this record to a map (the replay step)
    pub fn apply(self, map: &mut HashMap<Vec<u8>, Vec<u8>>) {
        match self {
            LogRecord::Set { key, value } => {
                map.insert(key, value);
            }
            LogRecord::Del { key } => {
                map.remove(&key);
            }
        }
    }
}

/// Split a line into non-empty tokens separated by ASCII whitespace
pub fn tokenize(line: &[u8]) -> impl Iterator<Item = &[u8]> {
    line.split(|b| b.is_ascii_whitespace())
        .filter(|token| !token.is_empty())
}
