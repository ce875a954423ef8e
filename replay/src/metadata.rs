//! Transcribes the UBJSON metadata trailer into JSON text.
//!
//! The recorder only ever writes five markers in the trailer: `U` length-
//! prefixed keys, `{`/`}` objects, `S` strings (always with a `U` length),
//! and `l` 32-bit integers. That subset is small enough that a hand-rolled
//! state machine beats pulling in a UBJSON dependency, and it lets us
//! track the key path for the handful of fields we lift out along the way
//! (start time, platform, netplay names).

use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::ParseError;
use crate::reader;
use crate::types::{Replay, NUM_PORTS};
use crate::Result;

const MARKER_KEY_LEN: u8 = 0x55; // 'U'
const MARKER_OBJECT_OPEN: u8 = 0x7b; // '{'
const MARKER_OBJECT_CLOSE: u8 = 0x7d; // '}'
const MARKER_STRING: u8 = 0x53; // 'S'
const MARKER_INT32: u8 = 0x6c; // 'l'

lazy_static! {
    // The transcription appends a comma after every member, so members
    // that close an object leave a stray comma behind.
    static ref COMMA_BEFORE_BRACE: Regex = Regex::new(r",(\s*\})").expect("comma cleanup regex compiles");
}

/// Walks the trailer starting at `start`, filling `replay.metadata` with
/// the JSON transcription and lifting out the known fields.
pub(crate) fn parse(buf: &[u8], start: usize, replay: &mut Replay) -> Result<()> {
    let mut out = String::new();
    let mut indent = String::from(" ");
    let mut keypath: Vec<String> = Vec::new();
    let mut pos = start;

    loop {
        // Key position: a length-prefixed key, or the end of an object.
        let key = match reader::read_u8(buf, pos)? {
            MARKER_KEY_LEN => {
                let len = reader::read_u8(buf, pos + 1)? as usize;
                let raw = reader::read_bytes(buf, pos + 2, len)?;
                let key = String::from_utf8_lossy(raw).into_owned();
                pos += 2 + len;

                keypath.push(key.clone());
                // The outermost "metadata" key is the container's, not part
                // of the object we expose.
                if key != "metadata" {
                    out.push_str(&indent);
                    out.push('"');
                    out.push_str(&key);
                    out.push_str("\" : ");
                }
                key
            },

            MARKER_OBJECT_CLOSE => {
                keypath.pop();
                indent.pop();
                pos += 1;

                if indent.is_empty() {
                    out.push('}');
                    break;
                }

                out.push_str(&indent);
                out.push_str("},\n");
                continue;
            },

            _ => return Err(ParseError::BadMetadata(pos)),
        };

        // Value position.
        match reader::read_u8(buf, pos)? {
            MARKER_OBJECT_OPEN => {
                out.push_str("{\n");
                if key != "metadata" {
                    indent.push(' ');
                }
                pos += 1;
            },

            MARKER_STRING => {
                // Strings longer than 255 bytes would carry a different
                // length marker; the recorder never writes one.
                if reader::read_u8(buf, pos + 1)? != MARKER_KEY_LEN {
                    return Err(ParseError::BadMetadata(pos + 1));
                }
                let len = reader::read_u8(buf, pos + 2)? as usize;
                let raw = reader::read_bytes(buf, pos + 3, len)?;
                let val = String::from_utf8_lossy(raw).into_owned();
                pos += 3 + len;

                out.push('"');
                out.push_str(&val);
                out.push_str("\",\n");

                extract(replay, &keypath, &key, &val);
                keypath.pop();
            },

            MARKER_INT32 => {
                let n = reader::read_i32(buf, pos + 1)?;
                pos += 5;

                out.push_str(&n.to_string());
                out.push_str(",\n");
                keypath.pop();
            },

            _ => return Err(ParseError::BadMetadata(pos)),
        }
    }

    replay.metadata = COMMA_BEFORE_BRACE.replace_all(&out, "$1").into_owned();
    Ok(())
}

/// Fields lifted out of the trailer as they stream past.
fn extract(replay: &mut Replay, keypath: &[String], key: &str, val: &str) {
    match key {
        "startAt" => replay.start_time = val.to_string(),
        "playedOn" => replay.played_on = val.to_string(),
        "netplay" => {
            // Netplay names live at players.<port>.names.netplay.
            if let Some(i) = keypath.iter().position(|k| k == "players") {
                if let Some(port) = keypath.get(i + 1).and_then(|k| k.parse::<usize>().ok()) {
                    if port < NUM_PORTS {
                        replay.players[port].tag = val.to_string();
                    }
                }
            }
        },
        _ => {},
    }
}
