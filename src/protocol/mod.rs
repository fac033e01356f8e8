//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (line-oriented text)
//!
//! Requests are lines of whitespace-separated tokens. A frame ends at the
//! first CR or LF; any run of CR/LF after it is a separator. Byte `0xFF` is
//! stripped from the stream before framing.
//!
//! ### Commands
//! | Request             | Reply                          |
//! |---------------------|--------------------------------|
//! | `SET key [value]`   | `+OK`                          |
//! | `GET key`           | `<value>` or `(nil)`           |
//! | `DEL key`           | `+OK`                          |
//! | `SAVE`              | `+Snapshot saved`              |
//! | `COMPACT`           | `+Log compacted`               |
//! | `EXIT`              | `BYE`, then the connection ends |
//!
//! Every reply is terminated with `\r\n`. Malformed requests get
//! `-ERR <reason>`; failures to persist get `-IOERR <reason>`.

mod command;
mod response;
mod codec;

pub use command::Command;
pub use response::Reply;
pub use codec::{
    parse_command, read_reply, write_command, FrameDecoder, ParseError, MAX_FRAME_SIZE,
};
