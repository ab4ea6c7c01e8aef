use checkers_core::{Color, Grid, Move};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::evaluation::Evaluator;
use crate::search::{Searcher, MAX_SEARCH_DEPTH};

const MIN_DEPTH: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckersAI {
    depth: u8,
    evaluator: Evaluator,
}

impl CheckersAI {
    pub fn new(depth: u8) -> Self {
        CheckersAI {
            depth: depth.clamp(MIN_DEPTH, MAX_SEARCH_DEPTH),
            evaluator: Evaluator::default(),
        }
    }

    pub fn with_evaluator(mut self, evaluator: Evaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Picks a full turn for `side`. With a seed, equally good turns are chosen
    /// between at random; without one the choice is deterministic.
    pub fn get_turn(&self, grid: &Grid, side: Color, seed: Option<u64>) -> Vec<Move> {
        let mut searcher = Searcher::new(self.evaluator);
        if let Some(seed) = seed {
            searcher = searcher.with_rng(StdRng::seed_from_u64(seed));
        }

        let turn = searcher.best_turn_sequence(grid, side, self.depth);
        let stats = searcher.stats();
        match turn.first() {
            Some(first) => log::info!(
                "{:?} bot plays {} ({} step(s), score {:.3}, {} nodes)",
                side,
                first,
                turn.len(),
                stats.score,
                stats.nodes
            ),
            None => log::info!("{:?} bot has no legal moves", side),
        }
        turn
    }
}

/// Everything a bot needs to pick a turn away from the game state.
#[derive(Debug, Clone)]
pub struct BotJob {
    pub grid: Grid,
    pub side: Color,
    pub ai: CheckersAI,
    pub seed: Option<u64>,
    /// Turn the job was issued for; results for older turns are discarded.
    pub epoch: u64,
}

/// A bot's chosen turn, tagged with the turn it was computed for.
#[derive(Debug, Clone, PartialEq)]
pub struct BotTurn {
    pub epoch: u64,
    pub moves: Vec<Move>,
}

impl BotJob {
    pub fn run(&self) -> BotTurn {
        BotTurn {
            epoch: self.epoch,
            moves: self.ai.get_turn(&self.grid, self.side, self.seed),
        }
    }
}
