//! Decoder for Slippi (`.slp`) replay files.
//!
//! A `.slp` file is a UBJSON container wrapping a "raw" byte array of
//! fixed-size game events plus a metadata object written by the recorder.
//! The event sizes are declared in-band by the first event in the stream,
//! which is what lets old parsers skip over events added by newer versions
//! of the recorder.
//!
//! The main entry point is [`Parser`]:
//!
//! ```no_run
//! use slippi_replay::Parser;
//!
//! fn inspect(path: &str) -> Result<(), slippi_replay::ParseError> {
//!     let replay = Parser::load(path)?;
//!     println!("Stage {} over {} frames", replay.stage, replay.frame_count);
//!     Ok(())
//! }
//! ```

mod errors;
pub use errors::ParseError;

pub mod melee;

mod metadata;

mod parser;
pub use parser::Parser;

mod reader;

mod types;
pub use types::{
    frame_as_timer, Frame, Player, PlayerType, Replay, Version, LOAD_FRAME, NUM_PORTS, NUM_SLOTS, PLAYABLE_FRAME,
    TIMER_MINS,
};

pub(crate) type Result<T> = std::result::Result<T, ParseError>;

/// Version stamp recorded on every decoded replay.
pub const PARSER_VERSION: &str = env!("CARGO_PKG_VERSION");
