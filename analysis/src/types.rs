//! Output records of a match analysis. Everything here is an owned value
//! copy; nothing borrows from the replay it was derived from.

use std::collections::BTreeMap;

use serde::Serialize;

/// The moment-to-moment character of play over a window of frames, from
/// one player's perspective.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Dynamic {
    Neutral,
    Poking,
    Positioning,
    Footsies,
    Trading,
    Pressuring,
    Punishing,
    Sharking,
    Recovering,
    Escaping,
    Grounding,
    Teching,
    Edgeguarding,
    Offensive,
    Defensive,
}

/// A run of consecutive frames sharing one dynamic. `start` and `end` are
/// inclusive frame-arena indices; consecutive segments abut exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct InteractionSegment {
    pub start: usize,
    pub end: usize,
    pub dynamic: Dynamic,
}

/// How a punish stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PunishEnd {
    /// The defender lost a stock.
    Kill,
    /// The defender got back to neutral.
    Reset,
    /// The defender's own hits took over before the window closed.
    Counter,
    /// The replay ended mid-punish.
    Timeout,
    /// The defender escaped with a dodge, airdodge, or ledge grab.
    Escape,
}

/// A maximal run of hits on one defender.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Punish {
    pub start: usize,
    pub end: usize,
    pub start_percent: f32,
    pub end_percent: f32,
    pub hits: u32,
    /// Distinct move ids, in order of first use within the punish.
    pub move_ids: Vec<u8>,
    pub ended_by: PunishEnd,
}

impl Punish {
    pub fn damage(&self) -> f32 {
        self.end_percent - self.start_percent
    }
}

/// Damage attribution for one attack id.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MoveStats {
    pub move_id: u8,
    pub hits: u32,
    pub damage: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LCancelStats {
    pub successful: u32,
    pub failed: u32,
}

impl LCancelStats {
    /// Success rate over all attempts, or `None` when nothing was attempted.
    pub fn ratio(&self) -> Option<f32> {
        let total = self.successful + self.failed;
        (total > 0).then(|| self.successful as f32 / total as f32)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TechStats {
    pub in_place: u32,
    pub forward: u32,
    pub backward: u32,
    pub missed: u32,
    pub wall: u32,
    pub ceiling: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DodgeStats {
    pub forward: u32,
    pub backward: u32,
    pub spot: u32,
}

/// Per-player results.
#[derive(Clone, Debug, Serialize)]
pub struct PlayerSummary {
    pub port: usize,
    pub ext_char_id: u8,
    pub character: String,
    pub tag: String,
    pub tag_css: String,
    pub start_stocks: u8,
    pub end_stocks: u8,

    pub airtime_frames: u32,
    pub l_cancels: LCancelStats,
    pub techs: TechStats,
    pub ledge_grabs: u32,
    pub dodges: DodgeStats,
    pub dashdances: u32,
    pub airdodges: u32,
    pub wavelands: u32,

    pub interactions: Vec<InteractionSegment>,
    /// Frames spent in each dynamic, summed over the segments.
    pub dynamic_frames: BTreeMap<Dynamic, u32>,
    pub moves: Vec<MoveStats>,
    pub punishes: Vec<Punish>,
    /// How this player's punishes ended, tallied by reason.
    pub punish_ends: BTreeMap<PunishEnd, u32>,
    pub damage_dealt: f32,
}

/// Game-level results.
#[derive(Clone, Debug, Serialize)]
pub struct GameSummary {
    pub slippi_version: String,
    pub parser_version: String,
    pub analyzer_version: String,
    pub stage_id: u16,
    pub stage_name: String,
    pub start_time: String,
    pub played_on: String,
    pub pal: bool,
    pub first_frame: i32,
    pub last_frame: i32,
    pub frame_count: usize,
    pub end_type: u8,
    pub lras: i8,
    /// In-game timer reading when the replay ends.
    pub timer_at_end: String,
    /// Port of the player holding more stocks at the end, if decisive.
    pub winner_port: Option<usize>,
}

/// The full analysis of one 1v1 match.
#[derive(Clone, Debug, Serialize)]
pub struct Analysis {
    pub game: GameSummary,
    pub players: Vec<PlayerSummary>,
}
