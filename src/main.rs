use std::time::Duration;

use bevy::prelude::*;
use checkers_engine::{ConfigError, Game, GameConfig, PlayerConfig, Randomness, ScoringMode};
use checkers_ui::{CheckersUiPlugin, HeadlessPlugin};
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Player {
    Human,
    Bot,
}

/// Checkers with flying kings, against a minimax bot or a second player.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Who plays White. White moves first.
    #[arg(long, value_enum, default_value_t = Player::Human)]
    white: Player,

    /// Who plays Black.
    #[arg(long, value_enum, default_value_t = Player::Bot)]
    black: Player,

    /// Lookahead of the White bot, in turns.
    #[arg(long, default_value_t = 4)]
    white_depth: u8,

    /// Lookahead of the Black bot, in turns.
    #[arg(long, default_value_t = 4)]
    black_depth: u8,

    /// Position scoring: `Plain` or `NumberAndPotential`.
    #[arg(long, default_value = "Plain")]
    scoring: ScoringMode,

    /// Seed for the bots' tie-breaking shuffle.
    #[arg(long, conflicts_with = "no_random")]
    seed: Option<u64>,

    /// Always pick the first of equally good turns.
    #[arg(long, default_value_t = false)]
    no_random: bool,

    /// Turns played before the game is declared a draw.
    #[arg(long, default_value_t = 120)]
    max_turns: u32,

    /// Pause between the steps of a bot's turn, in milliseconds.
    #[arg(long, default_value_t = 300)]
    bot_delay_ms: u64,

    /// Weight of a king in men; defaults to the scoring mode's own weight.
    #[arg(long)]
    king_multiplier: Option<f64>,

    /// Play bot against bot without a window and log the result.
    #[arg(long, default_value_t = false)]
    headless: bool,
}

impl Args {
    fn player(kind: Player, depth: u8) -> PlayerConfig {
        match kind {
            Player::Human => PlayerConfig::human(),
            Player::Bot => PlayerConfig::bot(depth),
        }
    }

    fn config(&self) -> GameConfig {
        let randomness = match (self.no_random, self.seed) {
            (true, _) => Randomness::Disabled,
            (false, Some(seed)) => Randomness::Seeded(seed),
            (false, None) => Randomness::Entropy,
        };

        GameConfig {
            white: Self::player(self.white, self.white_depth),
            black: Self::player(self.black, self.black_depth),
            scoring: self.scoring,
            randomness,
            max_turns: self.max_turns,
            bot_delay: Duration::from_millis(self.bot_delay_ms),
            king_multiplier: self.king_multiplier,
        }
    }
}

fn main() -> Result<(), ConfigError> {
    let args = Args::parse();
    if args.headless && (args.white == Player::Human || args.black == Player::Human) {
        Args::command()
            .error(
                ErrorKind::ArgumentConflict,
                "--headless needs `--white bot` and `--black bot`",
            )
            .exit();
    }

    let game = Game::new(args.config())?;

    let mut app = App::new();
    if args.headless {
        app.add_plugins(HeadlessPlugin { game });
    } else {
        app.add_plugins(CheckersUiPlugin { game });
    }
    app.run();
    Ok(())
}
