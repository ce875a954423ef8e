use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read replay file: {0}")]
    Io(#[from] std::io::Error),

    #[error("File does not begin with the Slippi container signature")]
    BadMagic,

    #[error("Container declares a 0-byte raw event section")]
    EmptyRaw,

    #[error("Bad event payload table: {0}")]
    BadEventTable(String),

    #[error("Unexpected end of data at byte {0}")]
    Truncated(usize),

    #[error("Duplicate GAME_START event; replay may be corrupt")]
    DuplicateStart,

    #[error("Replays from Slippi 0.x.x are not supported")]
    UnsupportedVersion,

    #[error("Frame event for port {0} outside the valid port range")]
    BadPort(u8),

    #[error("Frame event for frame {0} precedes the load frame")]
    BadFrameIndex(i32),

    #[error("Frame index {index} for slot {slot} is missing its {missing} event")]
    IncompleteFrame {
        slot: usize,
        index: usize,
        missing: &'static str,
    },

    #[error("Malformed metadata trailer at byte {0}")]
    BadMetadata(usize),
}
