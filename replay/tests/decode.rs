//! End-to-end decoder tests over synthesized `.slp` byte streams.

mod common;

use common::*;
use slippi_replay::{ParseError, Parser, PlayerType, LOAD_FRAME};

fn one_frame_1v1(version: (u8, u8, u8)) -> SlpBuilder {
    let mut b = SlpBuilder::new();
    b.game_start(version)
        .player(0, 0, 2, 4)
        .player(1, 0, 20, 4)
        .stage(31)
        .seed(0xDEADBEEF);
    for port in 0..2 {
        b.pre_frame(LOAD_FRAME, port, false);
        b.post_frame(LOAD_FRAME, port, false).u8_at(0x21, 4);
    }
    b
}

#[test]
fn decodes_a_minimal_replay() {
    let mut b = one_frame_1v1((3, 9, 0));
    b.game_end(2, -1);
    let replay = Parser::parse(&b.build()).unwrap();

    assert_eq!(replay.slippi_version.to_string(), "3.9.0");
    assert_eq!(replay.stage, 31);
    assert_eq!(replay.seed, 0xDEADBEEF);
    assert_eq!(replay.frame_count, 1);
    assert_eq!(replay.last_frame, LOAD_FRAME);
    assert_eq!(replay.end_type, 2);
    assert_eq!(replay.players[0].player_type, PlayerType::Human);
    assert_eq!(replay.players[0].ext_char_id, 2);
    assert_eq!(replay.players[2].player_type, PlayerType::Empty);
    assert_eq!(replay.players[0].frames[0].stocks, 4);
    assert!(replay.players[0].frames[0].alive);
}

#[test]
fn empty_raw_section_is_rejected() {
    // A container header declaring zero raw bytes.
    let mut bytes = vec![0x7b, 0x55, 0x03, 0x72, 0x61, 0x77, 0x5b, 0x24, 0x55, 0x23, 0x6c];
    bytes.extend_from_slice(&0u32.to_be_bytes());

    assert!(matches!(Parser::parse(&bytes), Err(ParseError::EmptyRaw)));
}

#[test]
fn bad_magic_is_rejected() {
    let mut bytes = one_frame_1v1((3, 9, 0)).build();
    bytes[0] = b'X';

    assert!(matches!(Parser::parse(&bytes), Err(ParseError::BadMagic)));
}

#[test]
fn redeclared_manifest_entry_is_rejected() {
    let mut b = SlpBuilder::with_manifest(vec![
        (GAME_START, GAME_START_PAYLOAD),
        (PRE_FRAME, PRE_FRAME_PAYLOAD),
        (PRE_FRAME, PRE_FRAME_PAYLOAD),
        (POST_FRAME, POST_FRAME_PAYLOAD),
        (GAME_END, GAME_END_PAYLOAD),
    ]);
    b.game_start((3, 9, 0));

    assert!(matches!(Parser::parse(&b.build()), Err(ParseError::BadEventTable(_))));
}

#[test]
fn missing_mandatory_event_is_rejected() {
    let mut b = SlpBuilder::with_manifest(vec![
        (GAME_START, GAME_START_PAYLOAD),
        (PRE_FRAME, PRE_FRAME_PAYLOAD),
        (POST_FRAME, POST_FRAME_PAYLOAD),
    ]);
    b.game_start((3, 9, 0));

    assert!(matches!(Parser::parse(&b.build()), Err(ParseError::BadEventTable(_))));
}

#[test]
fn version_zero_is_unsupported() {
    let b = one_frame_1v1((0, 1, 0));
    assert!(matches!(Parser::parse(&b.build()), Err(ParseError::UnsupportedVersion)));
}

#[test]
fn duplicate_game_start_is_rejected() {
    let mut b = SlpBuilder::new();
    b.game_start((3, 9, 0));
    b.game_start((3, 9, 0));

    assert!(matches!(Parser::parse(&b.build()), Err(ParseError::DuplicateStart)));
}

#[test]
fn truncated_event_is_rejected() {
    let mut b = one_frame_1v1((3, 9, 0));
    // One stray PRE_FRAME code byte with no payload behind it.
    b.raw_event(&[PRE_FRAME]);

    assert!(matches!(Parser::parse(&b.build()), Err(ParseError::Truncated(_))));
}

#[test]
fn unknown_declared_events_are_skipped() {
    let mut b = SlpBuilder::with_manifest(vec![
        (GAME_START, GAME_START_PAYLOAD),
        (PRE_FRAME, PRE_FRAME_PAYLOAD),
        (POST_FRAME, POST_FRAME_PAYLOAD),
        (GAME_END, GAME_END_PAYLOAD),
        (0x3C, 4),
    ]);
    b.game_start((3, 9, 0)).player(0, 0, 2, 4);
    b.raw_event(&[0x3C, 0xAA, 0xBB, 0xCC, 0xDD]);
    b.pre_frame(LOAD_FRAME, 0, false);
    b.post_frame(LOAD_FRAME, 0, false);

    let replay = Parser::parse(&b.build()).unwrap();
    assert_eq!(replay.frame_count, 1);
}

#[test]
fn missing_post_frame_is_an_incomplete_pair() {
    let mut b = SlpBuilder::new();
    b.game_start((3, 9, 0)).player(0, 0, 2, 4);
    b.pre_frame(LOAD_FRAME, 0, false);

    assert!(matches!(
        Parser::parse(&b.build()),
        Err(ParseError::IncompleteFrame {
            slot: 0,
            index: 0,
            missing: "post",
        })
    ));
}

#[test]
fn follower_events_land_in_the_offset_slot() {
    let mut b = SlpBuilder::new();
    b.game_start((3, 9, 0)).player(0, 0, 14, 4);
    b.pre_frame(LOAD_FRAME, 0, false);
    b.post_frame(LOAD_FRAME, 0, false);
    b.pre_frame(LOAD_FRAME, 0, true);
    b.post_frame(LOAD_FRAME, 0, true).u8_at(0x21, 4);

    let replay = Parser::parse(&b.build()).unwrap();
    assert!(replay.players[4].frames[0].alive);
    assert_eq!(replay.players[4].frames[0].stocks, 4);
}

#[test]
fn frame_fields_decode_at_their_offsets() {
    let mut b = SlpBuilder::new();
    b.game_start((3, 9, 0)).player(0, 0, 2, 4);
    b.pre_frame(-100, 0, false)
        .u32_at(0x7, 0x12345678) // rng seed
        .u16_at(0xB, 0x0E) // action
        .f32_at(0xD, 12.5) // x
        .f32_at(0x11, -3.25) // y
        .f32_at(0x15, -1.0) // facing
        .f32_at(0x19, 0.5) // joy x
        .u8_at(0x3B, 42); // ucf x
    b.post_frame(-100, 0, false)
        .u8_at(0x7, 2) // internal character
        .u16_at(0x8, 0x0E)
        .f32_at(0x16, 42.5) // percent
        .u8_at(0x1E, 17) // last attack landed
        .u8_at(0x21, 3) // stocks
        .u8_at(0x29, 0x02) // flags 4
        .u8_at(0x2F, 1) // airborne
        .u8_at(0x33, 1); // l-cancel

    let replay = Parser::parse(&b.build()).unwrap();
    assert_eq!(replay.frame_count, (-100 - LOAD_FRAME + 1) as usize);

    let frame = &replay.players[0].frames[(-100 - LOAD_FRAME) as usize];
    assert_eq!(frame.frame_num, -100);
    assert_eq!(frame.seed, 0x12345678);
    assert_eq!(frame.action_pre, 0x0E);
    assert_eq!(frame.pos_x_pre, 12.5);
    assert_eq!(frame.pos_y_pre, -3.25);
    assert_eq!(frame.face_dir_pre, -1.0);
    assert_eq!(frame.joy_x, 0.5);
    assert_eq!(frame.ucf_x, 42);
    assert_eq!(frame.char_id, 2);
    assert_eq!(frame.percent_post, 42.5);
    assert_eq!(frame.hit_with, 17);
    assert_eq!(frame.stocks, 3);
    assert_eq!(frame.flags_4, 0x02);
    assert!(frame.airborne);
    assert_eq!(frame.l_cancel, 1);

    // Intermediate frames were never seen and stay dead.
    assert!(!replay.players[0].frames[0].alive);
}

#[test]
fn version_gates_leave_old_replays_at_defaults() {
    let mut b = SlpBuilder::new();
    b.game_start((1, 0, 0))
        .player(0, 0, 2, 4)
        .pal(true)
        .frozen(true)
        .css_tag(0, b"TAG");
    b.pre_frame(LOAD_FRAME, 0, false).u8_at(0x3B, 42);
    b.post_frame(LOAD_FRAME, 0, false).u8_at(0x29, 0xFF).u8_at(0x33, 1);
    b.game_end(2, 3);

    let replay = Parser::parse(&b.build()).unwrap();

    // 1.0 predates nametags, PAL, frozen stadium, UCF sticks, post-frame
    // flags, and the LRAS byte.
    assert_eq!(replay.players[0].tag_css, "");
    assert!(!replay.pal);
    assert!(!replay.frozen);
    assert_eq!(replay.players[0].frames[0].ucf_x, 0);
    assert_eq!(replay.players[0].frames[0].flags_4, 0);
    assert_eq!(replay.players[0].frames[0].l_cancel, 0);
    assert_eq!(replay.lras, -1);
}

#[test]
fn newer_versions_read_the_gated_fields() {
    let mut b = SlpBuilder::new();
    b.game_start((2, 0, 0))
        .player(0, 0, 2, 4)
        .ucf(0, 1, 2)
        .pal(true)
        .frozen(true)
        .css_tag(0, b"FIZZ");
    b.pre_frame(LOAD_FRAME, 0, false);
    b.post_frame(LOAD_FRAME, 0, false).u8_at(0x29, 0x02);
    b.game_end(7, 1);

    let replay = Parser::parse(&b.build()).unwrap();

    assert_eq!(replay.players[0].tag_css, "FIZZ");
    assert_eq!(replay.players[0].dash_back, 1);
    assert_eq!(replay.players[0].shield_drop, 2);
    assert!(replay.pal);
    assert!(replay.frozen);
    assert_eq!(replay.players[0].frames[0].flags_4, 0x02);
    assert_eq!(replay.lras, 1);
}

#[test]
fn game_start_raw_block_round_trips() {
    let mut b = one_frame_1v1((3, 9, 0));
    b.game_end(2, -1);
    let bytes = b.build();
    let replay = Parser::parse(&bytes).unwrap();

    // The opaque block is the 312 bytes after the version word, which sit
    // 5 bytes into the GAME_START event. The event itself starts right
    // after the 15-byte header and the 13-byte payload manifest.
    let event_start = 15 + 2 + 3 * 4;
    let block = &bytes[event_start + 0x5..event_start + 0x5 + 312];
    assert_eq!(replay.game_start_raw, block);
}

#[test]
fn metadata_trailer_is_transcribed_and_lifted() {
    let mut trailer = Vec::new();
    let key = |out: &mut Vec<u8>, k: &str| {
        out.push(0x55);
        out.push(k.len() as u8);
        out.extend_from_slice(k.as_bytes());
    };
    let string = |out: &mut Vec<u8>, v: &str| {
        out.push(0x53);
        out.push(0x55);
        out.push(v.len() as u8);
        out.extend_from_slice(v.as_bytes());
    };

    key(&mut trailer, "metadata");
    trailer.push(0x7b);
    key(&mut trailer, "startAt");
    string(&mut trailer, "2023-01-15T04:03:02Z");
    key(&mut trailer, "players");
    trailer.push(0x7b);
    key(&mut trailer, "0");
    trailer.push(0x7b);
    key(&mut trailer, "names");
    trailer.push(0x7b);
    key(&mut trailer, "netplay");
    string(&mut trailer, "Mango");
    trailer.push(0x7d);
    trailer.push(0x7d);
    trailer.push(0x7d);
    key(&mut trailer, "playedOn");
    string(&mut trailer, "dolphin");
    trailer.push(0x7d);

    let mut b = one_frame_1v1((3, 9, 0));
    b.game_end(2, -1).metadata(&trailer);
    let replay = Parser::parse(&b.build()).unwrap();

    assert_eq!(replay.start_time, "2023-01-15T04:03:02Z");
    assert_eq!(replay.played_on, "dolphin");
    assert_eq!(replay.players[0].tag, "Mango");

    let value: serde_json::Value = serde_json::from_str(&replay.metadata).unwrap();
    assert_eq!(value["players"]["0"]["names"]["netplay"], "Mango");
}

#[test]
fn replay_without_a_trailer_still_decodes() {
    let mut b = one_frame_1v1((3, 9, 0));
    b.game_end(2, -1);
    let replay = Parser::parse(&b.build()).unwrap();

    assert_eq!(replay.metadata, "");
}

#[test]
fn frame_count_tracks_the_last_frame_seen() {
    let mut b = SlpBuilder::new();
    b.game_start((3, 9, 0)).player(0, 0, 2, 4);
    for frame in [LOAD_FRAME, LOAD_FRAME + 1, LOAD_FRAME + 2] {
        b.pre_frame(frame, 0, false);
        b.post_frame(frame, 0, false);
    }
    let replay = Parser::parse(&b.build()).unwrap();

    assert_eq!(replay.frame_count, 3);
    assert_eq!(replay.last_frame, LOAD_FRAME + 2);
    assert_eq!(replay.frame_count, (replay.last_frame - LOAD_FRAME + 1) as usize);
}
