use checkers_core::{BoardError, Move, Position};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unknown scoring mode `{0}`, expected `Plain` or `NumberAndPotential`")]
    UnknownScoringMode(String),
    #[error("search depth {depth} is outside 1..={max}")]
    DepthOutOfRange { depth: u8, max: u8 },
    #[error("turn limit must be at least one turn")]
    ZeroTurnLimit,
    #[error("king multiplier must be a positive number, got {0}")]
    InvalidKingMultiplier(f64),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error("bot produced an illegal move {0}")]
    IllegalBotMove(Move),
    #[error("bot turn stops mid capture chain at {0}")]
    UnfinishedCapture(Position),
    #[error("bot result from epoch {produced} is stale, game is at epoch {current}")]
    StaleBotTurn { produced: u64, current: u64 },
    #[error("it is not a bot's turn")]
    NotBotTurn,
}
