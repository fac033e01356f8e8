//! Log Reader
//!
//! Handles reading lines from the log file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Result;
use super::LogRecord;

/// One line of the log, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLine {
    /// A complete, well-formed record
    Record(LogRecord),

    /// A complete line that does not parse as a record
    Malformed { offset: u64, line: Vec<u8> },

    /// Trailing bytes with no terminating newline (torn append)
    Incomplete { offset: u64, len: u64 },
}

/// Reads lines from the log file in append order
pub struct LogReader {
    reader: BufReader<File>,

    /// Byte offset of the next unread line
    position: u64,

    buf: Vec<u8>,
}

impl LogReader {
    /// Open a log file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            position: 0,
            buf: Vec::new(),
        })
    }

    /// Read the next non-blank line
    pub fn next_line(&mut self) -> Result<Option<LogLine>> {
        loop {
            self.buf.clear();
            let offset = self.position;
            let n = self.reader.read_until(b'\n', &mut self.buf)?;
            if n == 0 {
                return Ok(None);
            }
            self.position += n as u64;

            if self.buf.last() != Some(&b'\n') {
                return Ok(Some(LogLine::Incomplete {
                    offset,
                    len: n as u64,
                }));
            }

            if self.buf.iter().all(|b| b.is_ascii_whitespace()) {
                continue;
            }

            let line = match LogRecord::parse(&self.buf) {
                Some(record) => LogLine::Record(record),
                None => LogLine::Malformed {
                    offset,
                    line: self.buf[..n - 1].to_vec(),
                },
            };
            return Ok(Some(line));
        }
    }

    /// Byte offset just past the last line returned
    pub fn position(&self) -> u64 {
        self.position
    }
}

impl Iterator for LogReader {
    type Item = Result<LogLine>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}
