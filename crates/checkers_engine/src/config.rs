use std::time::Duration;

use checkers_core::Color;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::evaluation::{Evaluator, ScoringMode};
use crate::search::MAX_SEARCH_DEPTH;
use crate::ConfigError;

const DEFAULT_BOT_DEPTH: u8 = 4;
const DEFAULT_MAX_TURNS: u32 = 120;
const DEFAULT_BOT_DELAY: Duration = Duration::from_millis(300);

/// Who plays one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerConfig {
    pub bot: bool,
    /// Search depth in turns; ignored for humans.
    pub depth: u8,
}

impl PlayerConfig {
    pub fn human() -> Self {
        Self {
            bot: false,
            depth: DEFAULT_BOT_DEPTH,
        }
    }

    pub fn bot(depth: u8) -> Self {
        Self { bot: true, depth }
    }
}

/// Where bots get the randomness used to break ties between equal turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Randomness {
    /// Fixed move order; the same position always yields the same turn.
    Disabled,
    /// Reproducible shuffling from a fixed seed.
    Seeded(u64),
    #[default]
    Entropy,
}

impl Randomness {
    /// Source of per-turn seeds, `None` when shuffling is disabled.
    pub fn seed_source(self) -> Option<StdRng> {
        match self {
            Randomness::Disabled => None,
            Randomness::Seeded(seed) => Some(StdRng::seed_from_u64(seed)),
            Randomness::Entropy => Some(StdRng::from_entropy()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub white: PlayerConfig,
    pub black: PlayerConfig,
    pub scoring: ScoringMode,
    pub randomness: Randomness,
    /// The game is a draw once this many turns have been played.
    pub max_turns: u32,
    /// Pause between the displayed steps of a bot's capture chain.
    pub bot_delay: Duration,
    /// Overrides the scoring mode's king weight.
    pub king_multiplier: Option<f64>,
}

impl GameConfig {
    pub fn player(&self, side: Color) -> PlayerConfig {
        match side {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    pub fn evaluator(&self) -> Evaluator {
        let evaluator = Evaluator::new(self.scoring);
        match self.king_multiplier {
            Some(multiplier) => evaluator.with_king_multiplier(multiplier),
            None => evaluator,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for player in [self.white, self.black] {
            if player.bot && !(1..=MAX_SEARCH_DEPTH).contains(&player.depth) {
                return Err(ConfigError::DepthOutOfRange {
                    depth: player.depth,
                    max: MAX_SEARCH_DEPTH,
                });
            }
        }
        if self.max_turns == 0 {
            return Err(ConfigError::ZeroTurnLimit);
        }
        if let Some(multiplier) = self.king_multiplier {
            if !multiplier.is_finite() || multiplier <= 0.0 {
                return Err(ConfigError::InvalidKingMultiplier(multiplier));
            }
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            white: PlayerConfig::human(),
            black: PlayerConfig::bot(DEFAULT_BOT_DEPTH),
            scoring: ScoringMode::default(),
            randomness: Randomness::default(),
            max_turns: DEFAULT_MAX_TURNS,
            bot_delay: DEFAULT_BOT_DELAY,
            king_multiplier: None,
        }
    }
}
