//! Per-player technique counters.
//!
//! Everything here counts on the rising edge: a counter bumps on the first
//! frame of a matching state and stays quiet while the state persists, so
//! a 30-frame ledge hang is one ledge grab, not thirty.

use slippi_replay::melee::action;
use slippi_replay::Player;

use crate::types::{DodgeStats, LCancelStats, TechStats};

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Counters {
    pub airtime_frames: u32,
    pub l_cancels: LCancelStats,
    pub techs: TechStats,
    pub ledge_grabs: u32,
    pub dodges: DodgeStats,
    pub dashdances: u32,
    pub airdodges: u32,
    pub wavelands: u32,
}

pub(crate) fn compute(player: &Player, first: usize, frame_count: usize) -> Counters {
    let mut c = Counters::default();

    for f in first..frame_count {
        let Some(frame) = player.frames.get(f).filter(|fr| fr.alive) else {
            continue;
        };
        let prev = f
            .checked_sub(1)
            .and_then(|p| player.frames.get(p))
            .filter(|fr| fr.alive)
            .map(|fr| fr.action_pre);
        let prev2 = f
            .checked_sub(2)
            .and_then(|p| player.frames.get(p))
            .filter(|fr| fr.alive)
            .map(|fr| fr.action_pre);

        if frame.airborne {
            c.airtime_frames += 1;
        }

        // The engine raises the l_cancel field only on the landing frame.
        match frame.l_cancel {
            1 => c.l_cancels.successful += 1,
            2 => c.l_cancels.failed += 1,
            _ => {},
        }

        // One tech situation spans knockdown, lying, and getup states; the
        // entry state decides how it gets scored.
        if action::in_tech_state(frame.action_pre) && !prev.is_some_and(action::in_tech_state) {
            match frame.action_pre {
                action::PASSIVE => c.techs.in_place += 1,
                action::PASSIVE_STAND_F => c.techs.forward += 1,
                action::PASSIVE_STAND_B => c.techs.backward += 1,
                action::PASSIVE_WALL | action::PASSIVE_WALL_JUMP => c.techs.wall += 1,
                action::PASSIVE_CEIL => c.techs.ceiling += 1,
                _ => c.techs.missed += 1,
            }
        }

        if action::is_on_ledge(frame.action_pre) && !prev.is_some_and(action::is_on_ledge) {
            c.ledge_grabs += 1;
        }

        if action::is_dodging(frame.action_pre) && !prev.is_some_and(action::is_dodging) {
            match frame.action_pre {
                action::ESCAPE_F => c.dodges.forward += 1,
                action::ESCAPE_B => c.dodges.backward += 1,
                _ => c.dodges.spot += 1,
            }
        }

        // A pivot reads dash-turn-dash over the last three frames.
        if frame.action_pre == action::DASH && prev == Some(action::TURN) && prev2 == Some(action::DASH) {
            c.dashdances += 1;
        }

        // Landing out of special-fall: a waveland if it came straight out
        // of an airdodge or an aerial jump/fall state, otherwise just an
        // airdodge recovery touching down.
        if frame.action_pre == action::LANDING_FALL_SPECIAL && prev != Some(action::LANDING_FALL_SPECIAL) {
            match prev {
                Some(a) if a == action::ESCAPE_AIR || action::in_aerial_jump_or_fall(a) => c.wavelands += 1,
                _ => c.airdodges += 1,
            }
        }
    }

    c
}
