//! Melee domain tables shared by the decoder and the analyzer: action-state
//! ids, stages, and external character ids.

pub mod action;

mod character;
pub use character::{character_name, Character};

mod stage;
pub use stage::{ledge_for, Stage};
