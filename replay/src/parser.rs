//! Forward-only decoder for the `.slp` container: header, event payload
//! table, event stream, and the metadata trailer.
//!
//! The raw section is a stream of fixed-size events whose sizes are
//! declared by the first event in the stream. Decoding walks the stream
//! once; every event advances the cursor by its declared size plus the
//! code byte, and the declared raw length must be consumed exactly.

use std::path::Path;

use encoding_rs::SHIFT_JIS;

use crate::errors::ParseError;
use crate::metadata;
use crate::reader;
use crate::types::{PlayerType, Replay, Version, LOAD_FRAME, NUM_PORTS};
use crate::Result;

/// Event codes of the raw stream. Codes outside this set are skipped by
/// their declared size, which is how old parsers survive new recorders.
pub mod event {
    pub const EV_PAYLOADS: u8 = 0x35;
    pub const GAME_START: u8 = 0x36;
    pub const PRE_FRAME: u8 = 0x37;
    pub const POST_FRAME: u8 = 0x38;
    pub const GAME_END: u8 = 0x39;
}

/// The container signature: `{U\x03raw[$U#l`, i.e. a UBJSON object whose
/// first key is `raw` holding a `u8` array with a 32-bit length.
const SLP_MAGIC: [u8; 11] = [0x7b, 0x55, 0x03, 0x72, 0x61, 0x77, 0x5b, 0x24, 0x55, 0x23, 0x6c];

const HEADER_LEN: usize = 15;
const RAW_LENGTH_OFFSET: usize = 11;

/// Size of the opaque game-info block copied out of GAME_START.
const GAME_INFO_BLOCK_LEN: usize = 312;

/// Decodes `.slp` bytes into a [`Replay`].
#[derive(Debug)]
pub struct Parser {
    payload_sizes: [u16; 256],
    pos: usize,
    remaining_raw: usize,
    replay: Replay,
}

impl Parser {
    /// Reads the file at `path` and runs the full decode.
    pub fn load(path: impl AsRef<Path>) -> Result<Replay> {
        let path = path.as_ref();
        tracing::info!(?path, "Loading replay");

        let bytes = std::fs::read(path)?;
        Self::parse(&bytes)
    }

    /// Runs the full decode over an in-memory `.slp` file.
    pub fn parse(bytes: &[u8]) -> Result<Replay> {
        let mut parser = Self {
            payload_sizes: [0; 256],
            pos: 0,
            remaining_raw: 0,
            replay: Replay::default(),
        };

        parser.parse_header(bytes)?;
        parser.parse_event_table(bytes)?;
        parser.parse_events(bytes)?;
        parser.check_frames()?;
        parser.parse_metadata(bytes)?;

        tracing::info!(
            frames = parser.replay.frame_count,
            version = %parser.replay.slippi_version,
            "Replay decoded"
        );

        Ok(parser.replay)
    }

    /// First 15 bytes: the container signature plus the raw-section length.
    fn parse_header(&mut self, buf: &[u8]) -> Result<()> {
        if reader::read_bytes(buf, 0, SLP_MAGIC.len())? != SLP_MAGIC {
            return Err(ParseError::BadMagic);
        }

        let raw_len = reader::read_u32(buf, RAW_LENGTH_OFFSET)? as usize;
        if raw_len == 0 {
            return Err(ParseError::EmptyRaw);
        }

        tracing::debug!(raw_len, "Raw event section");
        self.remaining_raw = raw_len;
        self.pos = HEADER_LEN;
        Ok(())
    }

    /// The EV_PAYLOADS event: a manifest of `{code, size:u16}` triples that
    /// sizes every other event in the stream.
    fn parse_event_table(&mut self, buf: &[u8]) -> Result<()> {
        if reader::read_u8(buf, self.pos)? != event::EV_PAYLOADS {
            return Err(ParseError::BadEventTable(
                "event stream does not begin with the payload manifest".into(),
            ));
        }

        // The size byte counts itself, so the triples span one byte less.
        let size = reader::read_u8(buf, self.pos + 1)? as usize;
        if size == 0 || (size - 1) % 3 != 0 {
            return Err(ParseError::BadEventTable(format!(
                "manifest length {size} is not a whole number of triples"
            )));
        }
        let manifest_len = size - 1;
        if 2 + manifest_len > self.remaining_raw {
            return Err(ParseError::Truncated(self.pos));
        }
        self.payload_sizes[event::EV_PAYLOADS as usize] = size as u16;

        let base = self.pos + 2;
        for i in (0..manifest_len).step_by(3) {
            let code = reader::read_u8(buf, base + i)?;
            if self.payload_sizes[code as usize] > 0 {
                return Err(ParseError::BadEventTable(format!(
                    "payload size for event {code:#04x} declared twice"
                )));
            }
            let payload_size = reader::read_u16(buf, base + i + 1)?;
            self.payload_sizes[code as usize] = payload_size;
            tracing::debug!(code, payload_size, "Declared event payload");
        }

        for code in event::EV_PAYLOADS..=event::GAME_END {
            if self.payload_sizes[code as usize] == 0 {
                return Err(ParseError::BadEventTable(format!(
                    "mandatory event {code:#04x} missing from the payload manifest"
                )));
            }
        }

        self.pos += 2 + manifest_len;
        self.remaining_raw -= 2 + manifest_len;
        Ok(())
    }

    /// Walks the event stream until the declared raw length is used up.
    fn parse_events(&mut self, buf: &[u8]) -> Result<()> {
        while self.remaining_raw > 0 {
            let code = reader::read_u8(buf, self.pos)?;
            let shift = self.payload_sizes[code as usize] as usize + 1;
            if shift > self.remaining_raw {
                return Err(ParseError::Truncated(self.pos));
            }

            // The event slice includes the code byte, so field offsets below
            // match the wire layout docs (frame number at +0x1, and so on).
            let ev = reader::read_bytes(buf, self.pos, shift)?;
            match code {
                event::GAME_START => self.parse_game_start(ev)?,
                event::PRE_FRAME => self.parse_pre_frame(ev)?,
                event::POST_FRAME => self.parse_post_frame(ev)?,
                event::GAME_END => self.parse_game_end(ev)?,
                other => {
                    tracing::warn!(code = other, len = shift - 1, "Skipping unknown event");
                },
            }

            self.pos += shift;
            self.remaining_raw -= shift;
        }

        Ok(())
    }

    fn parse_game_start(&mut self, ev: &[u8]) -> Result<()> {
        if self.replay.slippi_version.major > 0 {
            return Err(ParseError::DuplicateStart);
        }

        let major = reader::read_u8(ev, 0x1)?;
        let minor = reader::read_u8(ev, 0x2)?;
        let revision = reader::read_u8(ev, 0x3)?;
        if major == 0 {
            return Err(ParseError::UnsupportedVersion);
        }
        self.replay.slippi_version = Version { major, minor, revision };
        tracing::debug!(version = %self.replay.slippi_version, "Game start");

        for port in 0..NUM_PORTS {
            let i = 0x65 + 0x24 * port;
            let m = 0x141 + 0x8 * port;
            let k = 0x161 + 0x10 * port;

            let player = &mut self.replay.players[port];
            player.ext_char_id = reader::read_u8(ev, i)?;
            player.player_type =
                PlayerType::try_from(reader::read_u8(ev, i + 0x1)?).unwrap_or(PlayerType::Empty);
            player.start_stocks = reader::read_u8(ev, i + 0x2)?;
            player.color = reader::read_u8(ev, i + 0x3)?;
            player.team_id = reader::read_u8(ev, i + 0x9)?;
            player.dash_back = reader::read_u32(ev, m)?;
            player.shield_drop = reader::read_u32(ev, m + 0x4)?;

            if major >= 2 || minor >= 3 {
                player.tag_css = decode_shift_jis_tag(reader::read_bytes(ev, k, 0x10)?);
            }
        }

        self.replay.teams = reader::read_u8(ev, 0xD)? != 0;
        self.replay.stage = reader::read_u16(ev, 0x13)?;
        self.replay.seed = reader::read_u32(ev, 0x13D)?;

        if major >= 2 || minor >= 5 {
            self.replay.pal = reader::read_u8(ev, 0x1A1)? != 0;
        }
        if major >= 2 {
            self.replay.frozen = reader::read_u8(ev, 0x1A2)? != 0;
        }

        self.replay.game_start_raw = reader::read_bytes(ev, 0x5, GAME_INFO_BLOCK_LEN)?.to_vec();

        self.replay.set_frames(Replay::max_frames());
        Ok(())
    }

    fn parse_pre_frame(&mut self, ev: &[u8]) -> Result<()> {
        let minor = self.replay.slippi_version.minor;
        let (slot, index) = frame_slot(ev)?;

        self.replay.last_frame = reader::read_i32(ev, 0x1)?;
        self.replay.frame_count = index + 1;

        let frame = self.replay.ensure_frame(slot, index);
        frame.frame_num = reader::read_i32(ev, 0x1)?;
        frame.alive = true;
        frame.pre_seen = true;
        frame.seed = reader::read_u32(ev, 0x7)?;
        frame.action_pre = reader::read_u16(ev, 0xB)?;
        frame.pos_x_pre = reader::read_f32(ev, 0xD)?;
        frame.pos_y_pre = reader::read_f32(ev, 0x11)?;
        frame.face_dir_pre = reader::read_f32(ev, 0x15)?;
        frame.joy_x = reader::read_f32(ev, 0x19)?;
        frame.joy_y = reader::read_f32(ev, 0x1D)?;
        frame.c_x = reader::read_f32(ev, 0x21)?;
        frame.c_y = reader::read_f32(ev, 0x25)?;
        frame.trigger = reader::read_f32(ev, 0x29)?;
        frame.buttons = reader::read_u32(ev, 0x31)?;
        frame.phys_l = reader::read_f32(ev, 0x33)?;
        frame.phys_r = reader::read_f32(ev, 0x37)?;

        if minor >= 2 {
            frame.ucf_x = reader::read_u8(ev, 0x3B)?;
            if minor >= 4 {
                frame.percent_pre = reader::read_f32(ev, 0x3C)?;
            }
        }

        Ok(())
    }

    fn parse_post_frame(&mut self, ev: &[u8]) -> Result<()> {
        let major = self.replay.slippi_version.major;
        let (slot, index) = frame_slot(ev)?;

        let frame = self.replay.ensure_frame(slot, index);
        frame.frame_num = reader::read_i32(ev, 0x1)?;
        frame.alive = true;
        frame.post_seen = true;
        frame.char_id = reader::read_u8(ev, 0x7)?;
        frame.action_post = reader::read_u16(ev, 0x8)?;
        frame.pos_x_post = reader::read_f32(ev, 0xA)?;
        frame.pos_y_post = reader::read_f32(ev, 0xE)?;
        frame.face_dir_post = reader::read_f32(ev, 0x12)?;
        frame.percent_post = reader::read_f32(ev, 0x16)?;
        frame.shield = reader::read_f32(ev, 0x1A)?;
        frame.hit_with = reader::read_u8(ev, 0x1E)?;
        frame.combo = reader::read_u8(ev, 0x1F)?;
        frame.hurt_by = reader::read_u8(ev, 0x20)?;
        frame.stocks = reader::read_u8(ev, 0x21)?;
        frame.action_fc = reader::read_f32(ev, 0x22)?;

        if major >= 2 {
            frame.flags_1 = reader::read_u8(ev, 0x26)?;
            frame.flags_2 = reader::read_u8(ev, 0x27)?;
            frame.flags_3 = reader::read_u8(ev, 0x28)?;
            frame.flags_4 = reader::read_u8(ev, 0x29)?;
            frame.flags_5 = reader::read_u8(ev, 0x2A)?;
            frame.hitstun = reader::read_u32(ev, 0x2B)?;
            frame.airborne = reader::read_u8(ev, 0x2F)? != 0;
            frame.ground_id = reader::read_u16(ev, 0x30)?;
            frame.jumps = reader::read_u8(ev, 0x32)?;
            frame.l_cancel = reader::read_u8(ev, 0x33)?;
        }

        Ok(())
    }

    fn parse_game_end(&mut self, ev: &[u8]) -> Result<()> {
        self.replay.end_type = reader::read_u8(ev, 0x1)?;
        if self.replay.slippi_version.major >= 2 {
            self.replay.lras = reader::read_i8(ev, 0x2)?;
        }

        tracing::debug!(end_type = self.replay.end_type, "Game end");
        Ok(())
    }

    /// Every frame that saw one half of its pre/post pair must have seen
    /// the other; anything else means the stream dropped events.
    fn check_frames(&self) -> Result<()> {
        for (slot, player) in self.replay.players.iter().enumerate() {
            for (index, frame) in player.frames.iter().take(self.replay.frame_count).enumerate() {
                if frame.pre_seen != frame.post_seen {
                    return Err(ParseError::IncompleteFrame {
                        slot,
                        index,
                        missing: if frame.pre_seen { "post" } else { "pre" },
                    });
                }
            }
        }

        Ok(())
    }

    /// The metadata trailer sits directly after the raw section. Replays
    /// cut off mid-write have no trailer; that is not an error.
    fn parse_metadata(&mut self, buf: &[u8]) -> Result<()> {
        if self.pos >= buf.len() {
            tracing::warn!("Replay has no metadata trailer");
            return Ok(());
        }

        metadata::parse(buf, self.pos, &mut self.replay)
    }
}

/// Frame events address one of eight slots: the port, or the port's
/// follower (an offset of 4) for paired characters.
fn frame_slot(ev: &[u8]) -> Result<(usize, usize)> {
    let frame_num = reader::read_i32(ev, 0x1)?;
    let port = reader::read_u8(ev, 0x5)?;
    let follower = reader::read_u8(ev, 0x6)? != 0;

    if port as usize >= NUM_PORTS {
        return Err(ParseError::BadPort(port));
    }
    if frame_num < LOAD_FRAME {
        return Err(ParseError::BadFrameIndex(frame_num));
    }

    let slot = port as usize + if follower { NUM_PORTS } else { 0 };
    Ok((slot, (frame_num - LOAD_FRAME) as usize))
}

/// Nametags are 16 bytes of NUL-padded Shift-JIS.
fn decode_shift_jis_tag(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    let (decoded, _, had_errors) = SHIFT_JIS.decode(&raw[..end]);
    if had_errors {
        tracing::warn!(?raw, "Nametag contains invalid Shift-JIS");
    }

    decoded.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_slot_offsets_followers_by_four() {
        let mut ev = [0u8; 7];
        ev[1..5].copy_from_slice(&(-123i32).to_be_bytes());
        ev[5] = 1;
        ev[6] = 0;
        assert_eq!(frame_slot(&ev).unwrap(), (1, 0));

        ev[6] = 1;
        assert_eq!(frame_slot(&ev).unwrap(), (5, 0));
    }

    #[test]
    fn frame_slot_rejects_bad_ports_and_early_frames() {
        let mut ev = [0u8; 7];
        ev[1..5].copy_from_slice(&0i32.to_be_bytes());
        ev[5] = 4;
        assert!(matches!(frame_slot(&ev), Err(ParseError::BadPort(4))));

        ev[5] = 0;
        ev[1..5].copy_from_slice(&(-124i32).to_be_bytes());
        assert!(matches!(frame_slot(&ev), Err(ParseError::BadFrameIndex(-124))));
    }

    #[test]
    fn shift_jis_tags_decode_and_trim_padding() {
        let mut raw = [0u8; 16];
        raw[..4].copy_from_slice(b"FIZZ");
        assert_eq!(decode_shift_jis_tag(&raw), "FIZZ");

        // Katakana "aa" in Shift-JIS.
        let kana = [0x83, 0x41, 0x83, 0x41, 0, 0, 0, 0];
        assert_eq!(decode_shift_jis_tag(&kana), "アア");
    }
}
