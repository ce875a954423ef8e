//! Action-state ids and the range predicates gameplay analysis keys on.
//!
//! These are the engine's own animation/state ids as they appear in the
//! frame events. The inclusive range bounds below are load-bearing:
//! nudging one silently reclassifies entire interactions, so they are kept
//! as named constants rather than folded into the predicates.

pub const DEAD_DOWN: u16 = 0x000;
pub const DEAD_LEFT: u16 = 0x001;
pub const DEAD_RIGHT: u16 = 0x002;
/// Everything below this id is a death state.
pub const SLEEP: u16 = 0x00B;
pub const WAIT: u16 = 0x00E;
pub const TURN: u16 = 0x012;
pub const DASH: u16 = 0x014;
/// Jumpsquat; start of the aerial jump/fall band.
pub const KNEE_BEND: u16 = 0x018;
pub const FALL_AERIAL_B: u16 = 0x022;
/// Tumble.
pub const DAMAGE_FALL: u16 = 0x026;
/// Landing out of an airdodge or special-fall.
pub const LANDING_FALL_SPECIAL: u16 = 0x02B;
pub const ATTACK_11: u16 = 0x02C;
pub const ATTACK_AIR_LW: u16 = 0x045;
pub const DAMAGE_HI_1: u16 = 0x04B;
pub const DAMAGE_FLY_ROLL: u16 = 0x05B;
pub const GUARD_ON: u16 = 0x0B2;
/// Shieldstun.
pub const GUARD_SET_OFF: u16 = 0x0B5;
pub const GUARD_REFLECT: u16 = 0x0B6;
pub const DOWN_BOUND_U: u16 = 0x0B7;
pub const DOWN_SPOT_D: u16 = 0x0C6;
/// Tech in place.
pub const PASSIVE: u16 = 0x0C7;
pub const PASSIVE_STAND_F: u16 = 0x0C8;
pub const PASSIVE_STAND_B: u16 = 0x0C9;
pub const PASSIVE_WALL: u16 = 0x0CA;
pub const PASSIVE_WALL_JUMP: u16 = 0x0CB;
pub const PASSIVE_CEIL: u16 = 0x0CC;
pub const CAPTURE_PULLED_HI: u16 = 0x0DF;
pub const CAPTURE_FOOT: u16 = 0x0E8;
pub const ESCAPE_F: u16 = 0x0E9;
pub const ESCAPE_B: u16 = 0x0EA;
/// Spotdodge.
pub const ESCAPE: u16 = 0x0EB;
/// Airdodge.
pub const ESCAPE_AIR: u16 = 0x0EC;
pub const THROWN_F: u16 = 0x0EF;
pub const THROWN_LW_WOMEN: u16 = 0x0F3;
pub const CLIFF_WAIT: u16 = 0x0FD;

pub fn is_dead(action: u16) -> bool {
    action < SLEEP
}

pub fn in_damaged_state(action: u16) -> bool {
    (DAMAGE_HI_1..=DAMAGE_FLY_ROLL).contains(&action)
}

pub fn in_tumble(action: u16) -> bool {
    action == DAMAGE_FALL
}

/// Standing ground attacks through aerials.
pub fn is_attack(action: u16) -> bool {
    (ATTACK_11..=ATTACK_AIR_LW).contains(&action)
}

pub fn is_guarding(action: u16) -> bool {
    (GUARD_ON..=GUARD_REFLECT).contains(&action)
}

pub fn in_shieldstun(action: u16) -> bool {
    action == GUARD_SET_OFF
}

/// Knockdown states where no tech came out: bounces, lying, getups, rolls.
pub fn in_missed_tech_state(action: u16) -> bool {
    (DOWN_BOUND_U..=DOWN_SPOT_D).contains(&action)
}

/// Any tech-situation state, including walltechs, walljumps, and ceiling
/// techs.
pub fn in_tech_state(action: u16) -> bool {
    (DOWN_BOUND_U..=PASSIVE_CEIL).contains(&action)
}

pub fn is_grabbed(action: u16) -> bool {
    (CAPTURE_PULLED_HI..=CAPTURE_FOOT).contains(&action)
}

pub fn is_thrown(action: u16) -> bool {
    (THROWN_F..=THROWN_LW_WOMEN).contains(&action)
}

/// Ground dodges: forward roll, back roll, spotdodge.
pub fn is_dodging(action: u16) -> bool {
    (ESCAPE_F..=ESCAPE).contains(&action)
}

pub fn is_airdodging(action: u16) -> bool {
    action == ESCAPE_AIR
}

pub fn is_on_ledge(action: u16) -> bool {
    action == CLIFF_WAIT
}

/// Jumpsquat through the aerial fall variants, the band a waveland comes
/// out of.
pub fn in_aerial_jump_or_fall(action: u16) -> bool {
    (KNEE_BEND..=FALL_AERIAL_B).contains(&action)
}
