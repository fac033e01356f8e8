//! Codec Tests
//!
//! Tests for framing, command parsing, and reply rendering.

use std::io::Cursor;

use sentineldb::protocol::{
    parse_command, read_reply, write_command, Command, FrameDecoder, ParseError, Reply,
};

// =============================================================================
// Helper Functions
// =============================================================================

/// Feed `input` in one go and collect every complete frame
fn frames(input: &[u8]) -> Vec<Vec<u8>> {
    let mut decoder = FrameDecoder::new();
    decoder.extend(input);
    let mut out = Vec::new();
    while let Some(frame) = decoder.next_frame().unwrap() {
        out.push(frame.to_vec());
    }
    out
}

// =============================================================================
// Framing Tests
// =============================================================================

#[test]
fn test_frames_split_on_cr_or_lf() {
    assert_eq!(
        frames(b"GET a\r\nGET b\nGET c\rGET d\r\n"),
        vec![b"GET a".to_vec(), b"GET b".to_vec(), b"GET c".to_vec(), b"GET d".to_vec()]
    );
}

#[test]
fn test_separator_runs_produce_no_empty_frames() {
    assert_eq!(
        frames(b"\r\n\r\nSAVE\r\n\n\n\rEXIT\n"),
        vec![b"SAVE".to_vec(), b"EXIT".to_vec()]
    );
}

#[test]
fn test_partial_frame_waits_for_terminator() {
    let mut decoder = FrameDecoder::new();

    decoder.extend(b"SET user1 al");
    assert_eq!(decoder.next_frame().unwrap(), None);
    assert_eq!(decoder.buffered(), 12);

    decoder.extend(b"ice\r\nGET us");
    assert_eq!(decoder.next_frame().unwrap().unwrap(), &b"SET user1 alice"[..]);
    assert_eq!(decoder.next_frame().unwrap(), None);

    decoder.extend(b"er1\r\n");
    assert_eq!(decoder.next_frame().unwrap().unwrap(), &b"GET user1"[..]);
}

#[test]
fn test_byte_at_a_time_delivery() {
    let input = b"SET a 1\r\nDEL a\r\n";
    let mut decoder = FrameDecoder::new();
    let mut out = Vec::new();

    for &b in input.iter() {
        decoder.extend(&[b]);
        while let Some(frame) = decoder.next_frame().unwrap() {
            out.push(frame.to_vec());
        }
    }

    assert_eq!(out, vec![b"SET a 1".to_vec(), b"DEL a".to_vec()]);
}

#[test]
fn test_ff_bytes_are_stripped() {
    assert_eq!(
        frames(b"\xff\xfbSET\xff a 1\r\n\xff"),
        vec![b"\xfbSET a 1".to_vec()]
    );
    assert_eq!(frames(b"GE\xffT k\n"), vec![b"GET k".to_vec()]);
}

#[test]
fn test_oversized_frame_is_rejected() {
    let mut decoder = FrameDecoder::with_max_frame(16);

    decoder.extend(&[b'a'; 17]);

    assert_eq!(decoder.next_frame(), Err(ParseError::FrameTooLarge(16)));
}

#[test]
fn test_long_frame_with_terminator_is_fine() {
    let mut decoder = FrameDecoder::with_max_frame(16);
    let mut input = b"SET k ".to_vec();
    input.extend_from_slice(&[b'v'; 10]);
    input.extend_from_slice(b"\r\n");

    decoder.extend(&input);

    assert_eq!(decoder.next_frame().unwrap().unwrap().len(), 16);
}

// =============================================================================
// Command Parsing Tests
// =============================================================================

#[test]
fn test_parse_each_verb() {
    assert_eq!(
        parse_command(b"SET user1 alice"),
        Ok(Command::Set {
            key: b"user1".to_vec(),
            value: b"alice".to_vec()
        })
    );
    assert_eq!(
        parse_command(b"GET user1"),
        Ok(Command::Get { key: b"user1".to_vec() })
    );
    assert_eq!(
        parse_command(b"DEL user1"),
        Ok(Command::Del { key: b"user1".to_vec() })
    );
    assert_eq!(parse_command(b"SAVE"), Ok(Command::Save));
    assert_eq!(parse_command(b"COMPACT"), Ok(Command::Compact));
    assert_eq!(parse_command(b"EXIT"), Ok(Command::Exit));
}

#[test]
fn test_parse_tolerates_extra_whitespace() {
    assert_eq!(
        parse_command(b"  SET \t k   v  "),
        Ok(Command::Set {
            key: b"k".to_vec(),
            value: b"v".to_vec()
        })
    );
}

#[test]
fn test_set_without_value_means_empty_value() {
    assert_eq!(
        parse_command(b"SET k"),
        Ok(Command::Set {
            key: b"k".to_vec(),
            value: Vec::new()
        })
    );
}

#[test]
fn test_missing_key_is_rejected() {
    assert_eq!(parse_command(b"SET"), Err(ParseError::WrongArity("SET")));
    assert_eq!(parse_command(b"GET"), Err(ParseError::WrongArity("GET")));
    assert_eq!(parse_command(b"DEL"), Err(ParseError::WrongArity("DEL")));
}

#[test]
fn test_surplus_tokens_are_rejected() {
    assert_eq!(
        parse_command(b"SET k hello world"),
        Err(ParseError::WrongArity("SET"))
    );
    assert_eq!(parse_command(b"GET a b"), Err(ParseError::WrongArity("GET")));
    assert_eq!(parse_command(b"SAVE now"), Err(ParseError::WrongArity("SAVE")));
}

#[test]
fn test_unknown_verbs() {
    assert_eq!(
        parse_command(b"FOOBAR"),
        Err(ParseError::UnknownCommand("FOOBAR".to_string()))
    );
    // Verbs are case-sensitive
    assert_eq!(
        parse_command(b"get a"),
        Err(ParseError::UnknownCommand("get".to_string()))
    );
}

#[test]
fn test_parse_error_messages() {
    assert_eq!(
        ParseError::UnknownCommand("X".into()).to_string(),
        "unknown command"
    );
    assert_eq!(
        ParseError::WrongArity("GET").to_string(),
        "wrong number of arguments for 'GET'"
    );
}

// =============================================================================
// Reply Tests
// =============================================================================

#[test]
fn test_reply_wire_forms() {
    assert_eq!(Reply::Ok.encode(), b"+OK\r\n");
    assert_eq!(Reply::Value(b"alice".to_vec()).encode(), b"alice\r\n");
    assert_eq!(Reply::Nil.encode(), b"(nil)\r\n");
    assert_eq!(Reply::SnapshotSaved.encode(), b"+Snapshot saved\r\n");
    assert_eq!(Reply::Compacted.encode(), b"+Log compacted\r\n");
    assert_eq!(Reply::Bye.encode(), b"BYE\r\n");
    assert_eq!(
        Reply::error("unknown command").encode(),
        b"-ERR unknown command\r\n"
    );
    assert_eq!(
        Reply::IoError("log write failed: disk full".into()).encode(),
        b"-IOERR log write failed: disk full\r\n"
    );
}

#[test]
fn test_empty_value_reply_is_bare_terminator() {
    assert_eq!(Reply::Value(Vec::new()).encode(), b"\r\n");
}

// =============================================================================
// Stream Helper Tests
// =============================================================================

#[test]
fn test_write_command_round_trips_through_parser() {
    let commands = vec![
        Command::Set {
            key: b"k".to_vec(),
            value: b"v".to_vec(),
        },
        Command::Set {
            key: b"k".to_vec(),
            value: Vec::new(),
        },
        Command::Del { key: b"k".to_vec() },
        Command::Exit,
    ];

    for command in commands {
        let mut buf = Vec::new();
        write_command(&mut buf, &command).unwrap();
        assert!(buf.ends_with(b"\r\n"));

        let parsed = parse_command(&buf[..buf.len() - 2]).unwrap();
        assert_eq!(parsed, command);
    }
}

#[test]
fn test_read_reply_strips_terminator() {
    let mut cursor = Cursor::new(b"+OK\r\nalice\r\n(nil)\n".to_vec());

    assert_eq!(read_reply(&mut cursor).unwrap(), b"+OK");
    assert_eq!(read_reply(&mut cursor).unwrap(), b"alice");
    assert_eq!(read_reply(&mut cursor).unwrap(), b"(nil)");
    assert!(read_reply(&mut cursor).is_err());
}
