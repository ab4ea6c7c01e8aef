use std::fmt;
use std::str::FromStr;

use checkers_core::{Color, Grid, Position, Rank};

use crate::ConfigError;

// Material weights, measured in men
const MAN_VALUE: f64 = 1.0;
const KING_MULTIPLIER: f64 = 4.0; // Plain scoring
const POTENTIAL_KING_MULTIPLIER: f64 = 5.0; // NumberAndPotential scoring
const POTENTIAL_PER_ROW: f64 = 0.05; // Bonus per row a man has advanced

/// Search value of a position won by the side to move.
pub const WIN: f64 = f64::INFINITY;
/// Search value of a position lost by the side to move.
pub const LOSS: f64 = f64::NEG_INFINITY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoringMode {
    /// Material only.
    #[default]
    Plain,
    /// Material plus a small bonus for how far each man has advanced.
    NumberAndPotential,
}

impl ScoringMode {
    pub fn default_king_multiplier(self) -> f64 {
        match self {
            ScoringMode::Plain => KING_MULTIPLIER,
            ScoringMode::NumberAndPotential => POTENTIAL_KING_MULTIPLIER,
        }
    }
}

impl FromStr for ScoringMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Plain" => Ok(ScoringMode::Plain),
            "NumberAndPotential" => Ok(ScoringMode::NumberAndPotential),
            other => Err(ConfigError::UnknownScoringMode(other.to_string())),
        }
    }
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringMode::Plain => f.write_str("Plain"),
            ScoringMode::NumberAndPotential => f.write_str("NumberAndPotential"),
        }
    }
}

/// Static evaluation of a grid from one side's point of view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluator {
    mode: ScoringMode,
    king_multiplier: f64,
}

impl Evaluator {
    pub fn new(mode: ScoringMode) -> Self {
        Self {
            mode,
            king_multiplier: mode.default_king_multiplier(),
        }
    }

    pub fn with_king_multiplier(mut self, king_multiplier: f64) -> Self {
        self.king_multiplier = king_multiplier;
        self
    }

    pub fn mode(&self) -> ScoringMode {
        self.mode
    }

    pub fn king_multiplier(&self) -> f64 {
        self.king_multiplier
    }

    /// Opponent material divided by `side`'s material. Lower is better for `side`:
    /// `0.0` when the opponent has nothing left, `+inf` when `side` has nothing left.
    pub fn calc_score(&self, grid: &Grid, side: Color) -> f64 {
        let own = self.material(grid, side);
        let opponent = self.material(grid, side.opponent());

        if own == 0.0 {
            return f64::INFINITY;
        }
        if opponent == 0.0 {
            return 0.0;
        }
        opponent / own
    }

    /// `-ln(calc_score)`, computed so that swapping sides negates it exactly.
    /// Higher is better for `side`; ranges over `LOSS..=WIN`.
    pub fn utility(&self, grid: &Grid, side: Color) -> f64 {
        let own = self.material(grid, side);
        if own == 0.0 {
            return LOSS;
        }
        own.ln() - self.material(grid, side.opponent()).ln()
    }

    // Counts stay integral until the end so mirrored positions sum identically
    // whatever order the cells are scanned in.
    fn material(&self, grid: &Grid, color: Color) -> f64 {
        let mut men = 0u32;
        let mut kings = 0u32;
        let mut rows = 0u32;
        for (at, piece) in grid.pieces().filter(|(_, piece)| piece.color == color) {
            match piece.rank {
                Rank::King => kings += 1,
                Rank::Man => {
                    men += 1;
                    rows += rows_advanced(at, color);
                }
            }
        }

        let potential = match self.mode {
            ScoringMode::Plain => 0.0,
            ScoringMode::NumberAndPotential => POTENTIAL_PER_ROW * f64::from(rows),
        };
        MAN_VALUE * f64::from(men) + potential + self.king_multiplier * f64::from(kings)
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(ScoringMode::default())
    }
}

fn rows_advanced(at: Position, color: Color) -> u32 {
    match color {
        Color::White => u32::from(7 - at.row()),
        Color::Black => u32::from(at.row()),
    }
}

/// Scores `grid` for `side` with the default weights of `mode`.
pub fn calc_score(grid: &Grid, side: Color, mode: ScoringMode) -> f64 {
    Evaluator::new(mode).calc_score(grid, side)
}
