use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("Replay has no GAME_START data to analyze")]
    NoGameStart,

    #[error("Analysis requires exactly two human players, found {0}")]
    Not1v1(usize),
}
