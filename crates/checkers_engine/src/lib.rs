pub mod ai;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod game;
pub mod search;

pub use ai::{BotJob, BotTurn, CheckersAI};
pub use config::{GameConfig, PlayerConfig, Randomness};
pub use error::{ConfigError, GameError};
pub use evaluation::{calc_score, Evaluator, ScoringMode};
pub use game::{Control, Game, GameResult, InputEvent, Phase};
pub use search::{best_turn_sequence, SearchStats, Searcher, MAX_SEARCH_DEPTH};
