//! The decoded replay model: plain storage the decoder writes into and the
//! analyzer reads from. No decoding logic lives here beyond arena sizing.

use std::fmt;

use num_enum::TryFromPrimitive;

/// Internal frame number at which the replay stream begins (game load).
pub const LOAD_FRAME: i32 = -123;

/// Offset from the load frame to internal frame 0, when the match timer
/// starts and players control their characters.
pub const PLAYABLE_FRAME: usize = 123;

/// Match timer, fixed at 8 minutes by the recorder for now.
pub const TIMER_MINS: usize = 8;

/// Physical controller ports.
pub const NUM_PORTS: usize = 4;

/// Frame-data slots: 4 ports plus 4 follower slots (e.g. Nana), addressed
/// as `port + 4 * follower`.
pub const NUM_SLOTS: usize = 8;

/// Slippi recorder version, read from the GAME_START event. Several fields
/// in the stream only exist past certain versions; the decoder gates on
/// these exactly the way the recorder does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub revision: u8,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.revision)
    }
}

/// Player slot type from the game-info block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum PlayerType {
    Human = 0,
    Cpu = 1,
    Demo = 2,
    #[default]
    Empty = 3,
}

/// One player's state for one frame, merged from the PRE_FRAME and
/// POST_FRAME events. Fields gated behind recorder versions the replay
/// predates are left at their zero defaults.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    pub frame_num: i32,
    pub alive: bool,
    pub seed: u32,

    // Pre-frame: inputs and position going into the engine tick.
    pub action_pre: u16,
    pub pos_x_pre: f32,
    pub pos_y_pre: f32,
    pub face_dir_pre: f32,
    pub joy_x: f32,
    pub joy_y: f32,
    pub c_x: f32,
    pub c_y: f32,
    pub trigger: f32,
    pub buttons: u32,
    pub phys_l: f32,
    pub phys_r: f32,
    pub ucf_x: u8,
    pub percent_pre: f32,

    // Post-frame: engine state after the tick resolved.
    pub char_id: u8,
    pub action_post: u16,
    pub pos_x_post: f32,
    pub pos_y_post: f32,
    pub face_dir_post: f32,
    pub percent_post: f32,
    pub shield: f32,
    pub hit_with: u8,
    pub combo: u8,
    pub hurt_by: u8,
    pub stocks: u8,
    pub action_fc: f32,
    pub flags_1: u8,
    pub flags_2: u8,
    pub flags_3: u8,
    pub flags_4: u8,
    pub flags_5: u8,
    pub hitstun: u32,
    pub airborne: bool,
    pub ground_id: u16,
    pub jumps: u8,
    pub l_cancel: u8,

    // Decoder bookkeeping: which halves of this frame arrived. An alive
    // frame missing either half fails the post-decode check.
    pub pre_seen: bool,
    pub post_seen: bool,
}

/// One of the eight frame-data slots and its identity fields from the
/// game-info block (followers share their leader's identity fields, which
/// stay at defaults in slots 4..8).
#[derive(Clone, Debug, Default)]
pub struct Player {
    pub ext_char_id: u8,
    pub player_type: PlayerType,
    pub start_stocks: u8,
    pub color: u8,
    pub team_id: u8,
    pub dash_back: u32,
    pub shield_drop: u32,
    /// In-game nametag, decoded from Shift-JIS.
    pub tag_css: String,
    /// Netplay display name from the metadata trailer.
    pub tag: String,
    /// Dense frame arena indexed by `frame_num - LOAD_FRAME`.
    pub frames: Vec<Frame>,
}

/// A fully decoded replay.
#[derive(Clone, Debug)]
pub struct Replay {
    pub slippi_version: Version,
    pub parser_version: String,
    pub stage: u16,
    pub seed: u32,
    pub teams: bool,
    pub pal: bool,
    pub frozen: bool,
    pub end_type: u8,
    /// Port of a player who ended the game with L+R+A+Start, or -1.
    pub lras: i8,
    pub start_time: String,
    pub played_on: String,
    /// Metadata trailer transcribed to JSON text.
    pub metadata: String,
    /// Opaque copy of the game-info block from GAME_START; callers that
    /// export replays encode this themselves.
    pub game_start_raw: Vec<u8>,
    /// Number of decoded frame slots: `last_frame - LOAD_FRAME + 1`.
    pub frame_count: usize,
    /// Highest internal frame number seen in the stream.
    pub last_frame: i32,
    pub players: [Player; NUM_SLOTS],
}

impl Default for Replay {
    fn default() -> Self {
        Self {
            slippi_version: Version::default(),
            parser_version: crate::PARSER_VERSION.to_string(),
            stage: 0,
            seed: 0,
            teams: false,
            pal: false,
            frozen: false,
            end_type: 0,
            lras: -1,
            start_time: String::new(),
            played_on: String::new(),
            metadata: String::new(),
            game_start_raw: Vec::new(),
            frame_count: 0,
            last_frame: LOAD_FRAME,
            players: std::array::from_fn(|_| Player::default()),
        }
    }
}

impl Replay {
    /// Upper bound on the frame arena, derived from the fixed timer plus
    /// the pre-playable loading frames.
    pub fn max_frames() -> usize {
        PLAYABLE_FRAME + TIMER_MINS * 60 * 60 + 1
    }

    /// Pre-sizes the frame arenas of every occupied port. Follower slots
    /// are grown lazily since most games never populate them.
    pub fn set_frames(&mut self, n: usize) {
        for port in 0..NUM_PORTS {
            if self.players[port].player_type != PlayerType::Empty {
                self.players[port].frames.resize(n, Frame::default());
            }
        }
    }

    /// Returns the frame slot for `(slot, index)`, growing the arena if the
    /// game ran past the timer estimate (sudden death) or the slot was not
    /// pre-sized (followers).
    pub fn ensure_frame(&mut self, slot: usize, index: usize) -> &mut Frame {
        let frames = &mut self.players[slot].frames;
        if index >= frames.len() {
            frames.resize(index + 1, Frame::default());
        }
        &mut frames[index]
    }
}

/// Renders a frame-arena index as the in-game countdown timer string
/// (`0M:SS:CC`), assuming the fixed 8 minute timer. Display-only.
pub fn frame_as_timer(index: usize) -> String {
    let elapsed = index.saturating_sub(PLAYABLE_FRAME);
    let mins = elapsed / 3600;
    let secs = (elapsed / 60) - mins * 60;
    let frames = elapsed - 60 * secs - 3600 * mins;

    // Convert from elapsed to remaining.
    let mut lmins = TIMER_MINS.saturating_sub(mins);
    if secs > 0 || frames > 0 {
        lmins = lmins.saturating_sub(1);
    }
    let mut lsecs = 60 - secs;
    if frames > 0 {
        lsecs -= 1;
    }
    let lframes = if frames > 0 { 60 - frames } else { 0 };

    format!("0{}:{:02}:{:02}", lmins, lsecs % 60, (100 * lframes) / 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_arena_grows_on_demand() {
        let mut replay = Replay::default();
        replay.players[0].player_type = PlayerType::Human;
        replay.set_frames(10);

        assert_eq!(replay.players[0].frames.len(), 10);
        assert_eq!(replay.players[1].frames.len(), 0);

        replay.ensure_frame(0, 42).alive = true;
        assert_eq!(replay.players[0].frames.len(), 43);
        assert!(replay.players[0].frames[42].alive);

        // Follower slot was never pre-sized; ensure_frame handles it.
        replay.ensure_frame(4, 3).alive = true;
        assert_eq!(replay.players[4].frames.len(), 4);
    }

    #[test]
    fn timer_rendering_counts_down_from_eight_minutes() {
        assert_eq!(frame_as_timer(0), "08:00:00");
        assert_eq!(frame_as_timer(PLAYABLE_FRAME), "08:00:00");
        // One frame in: 7:59 and 59/60ths of a second remain.
        assert_eq!(frame_as_timer(PLAYABLE_FRAME + 1), "07:59:98");
        // One minute in.
        assert_eq!(frame_as_timer(PLAYABLE_FRAME + 3600), "07:00:00");
    }

    #[test]
    fn version_displays_as_triple() {
        let version = Version {
            major: 3,
            minor: 9,
            revision: 1,
        };
        assert_eq!(version.to_string(), "3.9.1");
    }
}
