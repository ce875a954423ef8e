//! Per-frame interaction classification.
//!
//! Each playable frame gets one [`Dynamic`] per player, decided by an
//! ordered rule cascade over both players' states. Specific situations
//! (off-stage, hitstun windows, techs, shields) are tested before the
//! generic spacing dynamics so that footsies/positioning only ever label
//! frames nothing else claimed. Adjacent frames with the same tag merge
//! into one segment.

use slippi_replay::melee::{action, ledge_for};
use slippi_replay::{Frame, Replay};

use crate::predicates as pred;
use crate::types::{Dynamic, InteractionSegment};
use crate::{first_classified_frame, FOOTSIE_THRES, POKE_THRES, SHARK_THRES};

/// Hitstun history for one player: when the current episode began and the
/// last frame spent in hitstun, which together drive the punish and poke
/// windows.
#[derive(Clone, Copy, Debug, Default)]
struct HitstunTracker {
    episode_start: Option<usize>,
    last_in_hitstun: Option<usize>,
}

impl HitstunTracker {
    fn update(&mut self, f: usize, in_hitstun: bool) {
        if in_hitstun {
            match self.last_in_hitstun {
                Some(prev) if prev + 1 == f => {},
                _ => self.episode_start = Some(f),
            }
            self.last_in_hitstun = Some(f);
        }
    }

    fn frames_since(&self, f: usize) -> Option<usize> {
        self.last_in_hitstun.map(|last| f - last)
    }

    /// Still inside the follow-up window: in hitstun now, or out of it for
    /// no more than the sharking threshold.
    fn in_window(&self, f: usize) -> bool {
        self.frames_since(f).is_some_and(|gap| gap <= SHARK_THRES as usize)
    }

    fn in_poke_window(&self, f: usize) -> bool {
        self.frames_since(f).is_some_and(|gap| gap <= POKE_THRES as usize)
    }
}

/// Classifies every playable frame for both players and returns the
/// run-length-merged segments, index 0 for `ports[0]`.
pub(crate) fn segment(replay: &Replay, ports: [usize; 2]) -> [Vec<InteractionSegment>; 2] {
    let first = first_classified_frame(replay.frame_count);
    let ledge_x = ledge_for(replay.stage);

    let mut trackers = [HitstunTracker::default(); 2];
    let mut tags: [Vec<Dynamic>; 2] = [Vec::new(), Vec::new()];

    for f in first..replay.frame_count {
        let frames: [Option<&Frame>; 2] = [
            replay.players[ports[0]].frames.get(f).filter(|fr| fr.alive),
            replay.players[ports[1]].frames.get(f).filter(|fr| fr.alive),
        ];

        for side in 0..2 {
            if let Some(fr) = frames[side] {
                trackers[side].update(f, pred::in_hitstun(fr));
            }
        }

        for side in 0..2 {
            let tag = match (frames[side], frames[1 - side]) {
                (Some(sf), Some(of)) => classify(f, sf, of, &trackers[side], &trackers[1 - side], ledge_x),
                // A player with no data this frame contributes nothing to
                // read; call the window positioning.
                _ => Dynamic::Positioning,
            };
            tags[side].push(tag);
        }
    }

    [run_length(&tags[0], first), run_length(&tags[1], first)]
}

/// The rule cascade for one player (`sf`) against the other (`of`).
/// First match wins.
fn classify(
    f: usize,
    sf: &Frame,
    of: &Frame,
    s_track: &HitstunTracker,
    o_track: &HitstunTracker,
    ledge_x: f32,
) -> Dynamic {
    let s_recovering = sf.airborne && pred::off_stage(sf, ledge_x) && !pred::in_hitlag(sf);
    let o_recovering = of.airborne && pred::off_stage(of, ledge_x) && !pred::in_hitlag(of);

    if s_recovering {
        return Dynamic::Recovering;
    }
    if o_recovering && pred::is_attacking(sf) {
        return Dynamic::Edgeguarding;
    }

    if pred::in_hitstun(sf) && pred::in_hitstun(of) {
        // update() already ran for both this frame, so the episode starts
        // are always present here.
        let s_start = s_track.episode_start.unwrap_or(f);
        let o_start = o_track.episode_start.unwrap_or(f);
        if s_start.abs_diff(o_start) <= 1 {
            return Dynamic::Trading;
        }
    }

    let s_window = s_track.in_window(f);
    let o_window = o_track.in_window(f);
    if o_window && !s_window {
        return Dynamic::Punishing;
    }

    if action::in_missed_tech_state(sf.action_pre) {
        return Dynamic::Grounding;
    }
    if action::in_tech_state(sf.action_pre) {
        return Dynamic::Teching;
    }

    if pred::is_evading(sf) || s_window {
        return Dynamic::Escaping;
    }

    if pred::is_attacking(sf) && of.airborne && !o_window && o_track.last_in_hitstun.is_some() {
        return Dynamic::Sharking;
    }

    if pred::is_shielding(of) || pred::in_shieldstun(of) {
        return Dynamic::Pressuring;
    }
    if pred::is_shielding(sf) || pred::in_shieldstun(sf) {
        return Dynamic::Defensive;
    }

    if pred::is_attacking(sf) {
        return Dynamic::Offensive;
    }

    if s_track.in_poke_window(f) || o_track.in_poke_window(f) {
        return Dynamic::Poking;
    }

    if !sf.airborne && !of.airborne {
        return if pred::player_distance(sf, of) < FOOTSIE_THRES {
            Dynamic::Footsies
        } else {
            Dynamic::Positioning
        };
    }

    Dynamic::Neutral
}

/// Merges a per-frame tag sequence into inclusive `{start, end}` segments.
fn run_length(tags: &[Dynamic], offset: usize) -> Vec<InteractionSegment> {
    let mut segments: Vec<InteractionSegment> = Vec::new();

    for (i, &dynamic) in tags.iter().enumerate() {
        let frame = offset + i;
        match segments.last_mut() {
            Some(open) if open.dynamic == dynamic && open.end + 1 == frame => {
                open.end = frame;
            },
            _ => segments.push(InteractionSegment {
                start: frame,
                end: frame,
                dynamic,
            }),
        }
    }

    segments
}
