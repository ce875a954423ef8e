//! Hit detection, damage attribution, and punish coalescing.
//!
//! A hit is detected two ways: the attacker's last-attack-landed register
//! changing to a new nonzero id (which covers zero-damage connects), or
//! the defender's percent strictly rising while they were in hitstun or
//! being held. The move responsible is whatever the register says on that
//! frame. Hits coalesce into a punish for as long as the defender never
//! strings together more hitstun-free frames than the follow-up window
//! allows.

use std::collections::BTreeMap;

use slippi_replay::melee::action;
use slippi_replay::Replay;

use crate::predicates as pred;
use crate::types::{MoveStats, Punish, PunishEnd};
use crate::{first_classified_frame, SHARK_THRES};

/// An in-flight punish.
#[derive(Debug)]
struct OpenPunish {
    start: usize,
    start_percent: f32,
    start_stocks: u8,
    end: usize,
    end_percent: f32,
    hits: u32,
    move_ids: Vec<u8>,
}

impl OpenPunish {
    fn new(start: usize, start_percent: f32, start_stocks: u8) -> Self {
        Self {
            start,
            start_percent,
            start_stocks,
            end: start,
            end_percent: start_percent,
            hits: 0,
            move_ids: Vec::new(),
        }
    }

    fn register_hit(&mut self, f: usize, percent: f32, move_id: u8) {
        self.end = f;
        self.end_percent = percent;
        self.hits += 1;
        if !self.move_ids.contains(&move_id) {
            self.move_ids.push(move_id);
        }
    }

    fn finish(self, ended_by: PunishEnd) -> Punish {
        Punish {
            start: self.start,
            end: self.end,
            start_percent: self.start_percent,
            end_percent: self.end_percent,
            hits: self.hits,
            move_ids: self.move_ids,
            ended_by,
        }
    }
}

/// Runs attribution for both directions; index 0 holds `ports[0]`'s moves
/// and punishes (i.e. hits they dealt).
pub(crate) fn analyze(replay: &Replay, ports: [usize; 2]) -> [(Vec<MoveStats>, Vec<Punish>); 2] {
    [
        analyze_side(replay, ports[0], ports[1]),
        analyze_side(replay, ports[1], ports[0]),
    ]
}

fn analyze_side(replay: &Replay, attacker_port: usize, defender_port: usize) -> (Vec<MoveStats>, Vec<Punish>) {
    let first = first_classified_frame(replay.frame_count);
    let attacker = &replay.players[attacker_port];
    let defender = &replay.players[defender_port];

    let mut moves: BTreeMap<u8, (u32, f32)> = BTreeMap::new();
    let mut punishes: Vec<Punish> = Vec::new();
    let mut open: Option<OpenPunish> = None;
    let mut out_streak = 0usize;
    let mut escape_seen = false;
    let mut prev_percent: Option<f32> = None;
    let mut prev_hit_with: Option<u8> = None;

    for f in first..replay.frame_count {
        let df = defender.frames.get(f).filter(|fr| fr.alive);
        let af = attacker.frames.get(f).filter(|fr| fr.alive);
        let (Some(df), Some(af)) = (df, af) else {
            prev_percent = None;
            prev_hit_with = None;
            continue;
        };

        // A death or a counterhit closes the punish before anything else
        // this frame is considered.
        let close = match open.as_ref() {
            Some(p) if pred::is_dead(df) || df.stocks < p.start_stocks => Some(PunishEnd::Kill),
            Some(_) if pred::in_hitstun(af) => Some(PunishEnd::Counter),
            _ => None,
        };
        if let Some(reason) = close {
            if let Some(p) = open.take() {
                punishes.push(p.finish(reason));
            }
            out_streak = 0;
            escape_seen = false;
        }

        let in_hitstun = pred::in_hitstun(df);
        let held = action::is_thrown(df.action_pre) || action::is_grabbed(df.action_pre);
        let took_damage = prev_percent.is_some_and(|p| df.percent_post > p);
        // The last-attack-landed register is sticky, so only a change to a
        // new nonzero id marks a fresh connect.
        let landed_move = af.hit_with != 0 && prev_hit_with.is_some_and(|p| p != af.hit_with);

        if landed_move || (took_damage && (in_hitstun || held)) {
            let baseline = if took_damage {
                prev_percent.unwrap_or(df.percent_post)
            } else {
                df.percent_post
            };
            let delta = df.percent_post - baseline;
            let move_id = af.hit_with;

            let entry = moves.entry(move_id).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += delta;

            open.get_or_insert_with(|| OpenPunish::new(f, baseline, df.stocks))
                .register_hit(f, df.percent_post, move_id);
            out_streak = 0;
            escape_seen = false;
        } else if open.is_some() {
            if in_hitstun {
                out_streak = 0;
            } else {
                out_streak += 1;
                if action::is_dodging(df.action_pre)
                    || action::is_airdodging(df.action_pre)
                    || action::is_on_ledge(df.action_pre)
                {
                    escape_seen = true;
                }
                if out_streak > SHARK_THRES as usize {
                    let reason = if escape_seen { PunishEnd::Escape } else { PunishEnd::Reset };
                    if let Some(p) = open.take() {
                        punishes.push(p.finish(reason));
                    }
                    out_streak = 0;
                    escape_seen = false;
                }
            }
        }

        prev_percent = Some(df.percent_post);
        prev_hit_with = Some(af.hit_with);
    }

    if let Some(p) = open.take() {
        punishes.push(p.finish(PunishEnd::Timeout));
    }

    let moves = moves
        .into_iter()
        .map(|(move_id, (hits, damage))| MoveStats { move_id, hits, damage })
        .collect();

    (moves, punishes)
}
