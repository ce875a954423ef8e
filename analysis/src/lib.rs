//! Gameplay analysis over decoded Slippi replays.
//!
//! Takes a [`slippi_replay::Replay`] and derives a behavioral summary of
//! the match: technique counters, an interaction timeline classifying
//! every playable frame into a gameplay dynamic, and punish records
//! attributing damage to the moves that dealt it. Only singles between
//! two human players is supported.
//!
//! ```no_run
//! use slippi_replay::Parser;
//! use slippi_analysis::Analyzer;
//!
//! fn report(path: &str) -> Result<(), Box<dyn std::error::Error>> {
//!     let replay = Parser::load(path)?;
//!     let analysis = Analyzer::analyze(&replay)?;
//!     for player in &analysis.players {
//!         println!("{}: {} punishes", player.character, player.punishes.len());
//!     }
//!     Ok(())
//! }
//! ```

use std::collections::BTreeMap;

use slippi_replay::melee::{character_name, Stage};
use slippi_replay::{frame_as_timer, PlayerType, Replay, NUM_PORTS};

mod counters;
mod dynamics;

mod errors;
pub use errors::AnalyzeError;

mod predicates;
mod punishes;

mod types;
pub use types::{
    Analysis, Dynamic, DodgeStats, GameSummary, InteractionSegment, LCancelStats, MoveStats, PlayerSummary, Punish,
    PunishEnd, TechStats,
};

pub(crate) type Result<T> = std::result::Result<T, AnalyzeError>;

/// Version stamp recorded on every analysis.
pub const ANALYZER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Frame-arena index of internal frame 0, when players gain control.
pub const FIRST_FRAME: usize = slippi_replay::PLAYABLE_FRAME;

/// Most frames a defender may spend out of hitstun before follow-up hits
/// count as a new punish (and continued aggression as sharking).
pub const SHARK_THRES: u32 = 15;

/// Frames since either player entered hitstun for an exchange to still
/// read as a poke.
pub const POKE_THRES: u32 = 30;

/// Distance cutoff between the footsies and positioning dynamics.
pub const FOOTSIE_THRES: f32 = 10.0;

/// Replays shorter than the pre-playable lead-in get classified from
/// frame 0 so short captures still produce a timeline.
pub(crate) fn first_classified_frame(frame_count: usize) -> usize {
    if frame_count > FIRST_FRAME {
        FIRST_FRAME
    } else {
        0
    }
}

/// Runs the fixed sub-analysis sequence over a decoded replay.
#[derive(Debug)]
pub struct Analyzer;

impl Analyzer {
    /// Produces the full [`Analysis`] for a 1v1 replay. The replay is
    /// never modified; everything in the result is an owned copy.
    pub fn analyze(replay: &Replay) -> Result<Analysis> {
        if replay.slippi_version.major == 0 {
            return Err(AnalyzeError::NoGameStart);
        }
        let ports = human_ports(replay)?;
        tracing::debug!(?ports, frames = replay.frame_count, "Analyzing replay");

        let first = first_classified_frame(replay.frame_count);
        let segments = dynamics::segment(replay, ports);
        let attribution = punishes::analyze(replay, ports);

        let mut players = Vec::with_capacity(2);
        for (side, (interactions, (moves, player_punishes))) in
            segments.into_iter().zip(attribution.into_iter()).enumerate()
        {
            let port = ports[side];
            let player = &replay.players[port];
            let counts = counters::compute(player, first, replay.frame_count);

            // Aggregate segment durations and punish outcomes.
            let mut dynamic_frames: BTreeMap<Dynamic, u32> = BTreeMap::new();
            for segment in &interactions {
                *dynamic_frames.entry(segment.dynamic).or_insert(0) += (segment.end - segment.start + 1) as u32;
            }
            let mut punish_ends: BTreeMap<PunishEnd, u32> = BTreeMap::new();
            for punish in &player_punishes {
                *punish_ends.entry(punish.ended_by).or_insert(0) += 1;
            }
            let damage_dealt = moves.iter().map(|m| m.damage).sum();

            players.push(PlayerSummary {
                port,
                ext_char_id: player.ext_char_id,
                character: character_name(player.ext_char_id),
                tag: player.tag.clone(),
                tag_css: player.tag_css.clone(),
                start_stocks: player.start_stocks,
                end_stocks: end_stocks(replay, port),
                airtime_frames: counts.airtime_frames,
                l_cancels: counts.l_cancels,
                techs: counts.techs,
                ledge_grabs: counts.ledge_grabs,
                dodges: counts.dodges,
                dashdances: counts.dashdances,
                airdodges: counts.airdodges,
                wavelands: counts.wavelands,
                interactions,
                dynamic_frames,
                moves,
                punishes: player_punishes,
                punish_ends,
                damage_dealt,
            });
        }

        Ok(Analysis {
            game: game_summary(replay, &players),
            players,
        })
    }
}

/// Singles means exactly two occupied human ports.
fn human_ports(replay: &Replay) -> Result<[usize; 2]> {
    let ports: Vec<usize> = (0..NUM_PORTS)
        .filter(|&p| replay.players[p].player_type == PlayerType::Human)
        .collect();

    match ports[..] {
        [a, b] => Ok([a, b]),
        _ => {
            tracing::warn!(humans = ports.len(), "Replay is not a 1v1");
            Err(AnalyzeError::Not1v1(ports.len()))
        },
    }
}

fn end_stocks(replay: &Replay, port: usize) -> u8 {
    replay.players[port]
        .frames
        .get(replay.frame_count.wrapping_sub(1))
        .filter(|f| f.alive)
        .map(|f| f.stocks)
        .unwrap_or(0)
}

fn game_summary(replay: &Replay, players: &[PlayerSummary]) -> GameSummary {
    let stage_name = Stage::try_from(replay.stage)
        .map(|s| s.to_string())
        .unwrap_or_else(|_| format!("Unknown ({})", replay.stage));

    let winner_port = match players {
        [a, b] if a.end_stocks > b.end_stocks => Some(a.port),
        [a, b] if b.end_stocks > a.end_stocks => Some(b.port),
        _ => None,
    };

    GameSummary {
        slippi_version: replay.slippi_version.to_string(),
        parser_version: replay.parser_version.clone(),
        analyzer_version: ANALYZER_VERSION.to_string(),
        stage_id: replay.stage,
        stage_name,
        start_time: replay.start_time.clone(),
        played_on: replay.played_on.clone(),
        pal: replay.pal,
        first_frame: slippi_replay::LOAD_FRAME,
        last_frame: replay.last_frame,
        frame_count: replay.frame_count,
        end_type: replay.end_type,
        lras: replay.lras,
        timer_at_end: frame_as_timer(replay.frame_count.saturating_sub(1)),
        winner_port,
    }
}
