use std::fmt;

use checkers_core::{legal_moves, piece_moves, Board, Color, Grid, Move, MoveList, Position};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::Rng;

use crate::ai::{BotJob, BotTurn, CheckersAI};
use crate::config::GameConfig;
use crate::{ConfigError, GameError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Draw,
    WhiteWins,
    BlackWins,
}

impl GameResult {
    fn won_by(side: Color) -> Self {
        match side {
            Color::White => GameResult::WhiteWins,
            Color::Black => GameResult::BlackWins,
        }
    }

    pub fn winner(self) -> Option<Color> {
        match self {
            GameResult::Draw => None,
            GameResult::WhiteWins => Some(Color::White),
            GameResult::BlackWins => Some(Color::Black),
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Draw => f.write_str("Draw"),
            GameResult::WhiteWins => f.write_str("White wins"),
            GameResult::BlackWins => f.write_str("Black wins"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Quit,
    Replay,
    Rollback,
}

/// One discrete event from the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    CellSelected(Position),
    Control(Control),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingHumanInput,
    /// A bot owns the turn; fetch a [`BotJob`] and hand its result back.
    ApplyingBotMove,
    GameOver(GameResult),
    Quit,
}

/// Drives one game: owns the live board, alternates sides, validates human
/// steps, applies bot turns and detects the end of the game.
#[derive(Debug, Clone)]
pub struct Game {
    config: GameConfig,
    board: Board,
    turn: u32,
    phase: Phase,
    // Moves the side to move may play next; narrowed to the moving piece's
    // captures while a capture chain is in progress.
    legal: MoveList,
    selected: Option<Position>,
    chain: Option<Position>,
    beat_series: usize,
    seeds: Option<StdRng>,
    // Bumped on every turn change so results computed for an older turn are refused
    epoch: u64,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_board(config, Board::new(), 0)
    }

    /// Starts from a custom layout with `side` to move.
    pub fn from_grid(config: GameConfig, grid: Grid, side: Color) -> Result<Self, ConfigError> {
        let turn = match side {
            Color::White => 0,
            Color::Black => 1,
        };
        Self::with_board(config, Board::from_grid(grid), turn)
    }

    fn with_board(config: GameConfig, board: Board, turn: u32) -> Result<Self, ConfigError> {
        config.validate()?;
        let seeds = config.randomness.seed_source();
        let mut game = Game {
            config,
            board,
            turn,
            phase: Phase::AwaitingHumanInput,
            legal: MoveList::default(),
            selected: None,
            chain: None,
            beat_series: 0,
            seeds,
            epoch: 0,
        };
        game.begin_turn();
        Ok(game)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn grid(&self) -> Grid {
        self.board.snapshot()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn turn_number(&self) -> u32 {
        self.turn
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn side_to_move(&self) -> Color {
        if self.turn % 2 == 0 {
            Color::White
        } else {
            Color::Black
        }
    }

    pub fn legal_moves(&self) -> &MoveList {
        &self.legal
    }

    pub fn selected(&self) -> Option<Position> {
        self.selected
    }

    pub fn in_capture_chain(&self) -> bool {
        self.chain.is_some()
    }

    /// The piece the human is moving: the chaining piece, else the selection.
    pub fn active_cell(&self) -> Option<Position> {
        self.chain.or(self.selected)
    }

    /// Destinations of the active piece, or every movable piece when none is active.
    pub fn highlighted_cells(&self) -> Vec<Position> {
        if self.phase != Phase::AwaitingHumanInput {
            return Vec::new();
        }
        match self.active_cell() {
            Some(from) => self.legal.destinations_from(from),
            None => self.legal.sources(),
        }
    }

    pub fn result(&self) -> Option<GameResult> {
        match self.phase {
            Phase::GameOver(result) => Some(result),
            _ => None,
        }
    }

    pub fn is_bot_turn(&self) -> bool {
        self.phase == Phase::ApplyingBotMove
    }

    /// Starts a fresh game from the standard layout.
    pub fn replay(&mut self) {
        self.board.reset_to_start();
        self.turn = 0;
        self.seeds = self.config.randomness.seed_source();
        info!("new game");
        self.begin_turn();
    }

    pub fn handle_input(&mut self, event: InputEvent) -> Result<(), GameError> {
        match event {
            InputEvent::Control(Control::Quit) => {
                self.epoch += 1;
                self.phase = Phase::Quit;
                info!("game quit");
            }
            InputEvent::Control(Control::Replay) => self.replay(),
            InputEvent::Control(Control::Rollback) => self.rollback(),
            InputEvent::CellSelected(cell) => {
                if self.phase == Phase::AwaitingHumanInput {
                    self.select_cell(cell)?;
                }
            }
        }
        Ok(())
    }

    /// Snapshot of everything the bot to move needs to choose its turn.
    pub fn bot_job(&mut self) -> Result<BotJob, GameError> {
        if self.phase != Phase::ApplyingBotMove {
            return Err(GameError::NotBotTurn);
        }
        let side = self.side_to_move();
        let ai = CheckersAI::new(self.config.player(side).depth)
            .with_evaluator(self.config.evaluator());
        let seed = self.seeds.as_mut().map(|rng| rng.gen());

        Ok(BotJob {
            grid: self.board.snapshot(),
            side,
            ai,
            seed,
            epoch: self.epoch,
        })
    }

    /// Applies every step of a bot's turn, or none of them.
    pub fn apply_bot_turn(&mut self, turn: BotTurn) -> Result<(), GameError> {
        if turn.epoch != self.epoch {
            warn!(
                "discarding bot result from epoch {} (now {})",
                turn.epoch, self.epoch
            );
            return Err(GameError::StaleBotTurn {
                produced: turn.epoch,
                current: self.epoch,
            });
        }
        if self.phase != Phase::ApplyingBotMove {
            return Err(GameError::NotBotTurn);
        }

        let side = self.side_to_move();
        if turn.moves.is_empty() {
            self.finish(GameResult::won_by(side.opponent()));
            return Ok(());
        }

        let checkpoint = self.board.clone();
        if let Err(err) = self.play_sequence(&turn.moves) {
            warn!("{:?} bot turn rejected: {}", side, err);
            self.board = checkpoint;
            return Err(err);
        }

        info!(
            "turn {}: {:?} played {}",
            self.turn,
            side,
            format_line(&turn.moves)
        );
        self.end_turn();
        Ok(())
    }

    /// Searches and applies the current bot turn on this thread.
    pub fn play_bot_turn(&mut self) -> Result<(), GameError> {
        let job = self.bot_job()?;
        let turn = job.run();
        self.apply_bot_turn(turn)
    }

    /// Plays bot turns until a human must move or the game ends.
    pub fn run_bots(&mut self) -> Result<Phase, GameError> {
        while self.phase == Phase::ApplyingBotMove {
            self.play_bot_turn()?;
        }
        Ok(self.phase)
    }

    fn play_sequence(&mut self, moves: &[Move]) -> Result<(), GameError> {
        let mut allowed = self.legal.clone();
        let mut beat_series = 0;

        for mv in moves {
            let Some(&step) = allowed.find(mv.from, mv.to) else {
                return Err(GameError::IllegalBotMove(*mv));
            };
            let series = if step.is_capture() {
                beat_series += 1;
                beat_series
            } else {
                0
            };
            self.board.apply(&step, series)?;

            allowed = if step.is_capture() {
                continuation_captures(&self.board.snapshot(), step.to)
            } else {
                MoveList::default()
            };
        }

        match moves.last() {
            Some(last) if !allowed.is_empty() => Err(GameError::UnfinishedCapture(last.to)),
            _ => Ok(()),
        }
    }

    fn select_cell(&mut self, cell: Position) -> Result<(), GameError> {
        if let Some(from) = self.active_cell() {
            if let Some(&mv) = self.legal.find(from, cell) {
                return self.apply_human(mv);
            }
        }

        if self.chain.is_some() {
            debug!("{cell} is not a continuation capture");
        } else if self.legal.sources().contains(&cell) {
            self.selected = Some(cell);
        } else {
            self.selected = None;
        }
        Ok(())
    }

    fn apply_human(&mut self, mv: Move) -> Result<(), GameError> {
        let series = if mv.is_capture() {
            self.beat_series += 1;
            self.beat_series
        } else {
            0
        };
        self.board.apply(&mv, series)?;
        info!("turn {}: {:?} played {}", self.turn, self.side_to_move(), mv);

        if mv.is_capture() {
            let next = continuation_captures(&self.board.snapshot(), mv.to);
            if !next.is_empty() {
                self.chain = Some(mv.to);
                self.selected = Some(mv.to);
                self.legal = next;
                return Ok(());
            }
        }

        self.end_turn();
        Ok(())
    }

    fn rollback(&mut self) {
        if self.phase != Phase::AwaitingHumanInput || self.board.history_len() <= 1 {
            debug!("nothing to roll back");
            return;
        }

        if self.chain.is_some() {
            self.board.rollback();
            info!("undid partial capture chain of {:?}", self.side_to_move());
        } else {
            self.board.rollback();
            self.turn = self.turn.saturating_sub(1);
            // Undo the bot's reply too so the human retries their own move
            if self.config.player(self.side_to_move()).bot && self.board.history_len() > 1 {
                self.board.rollback();
                self.turn = self.turn.saturating_sub(1);
            }
            info!("rolled back to turn {}", self.turn);
        }
        self.begin_turn();
    }

    fn end_turn(&mut self) {
        self.turn += 1;
        self.begin_turn();
    }

    fn begin_turn(&mut self) {
        self.epoch += 1;
        self.selected = None;
        self.chain = None;
        self.beat_series = 0;

        if self.turn >= self.config.max_turns {
            self.legal = MoveList::default();
            self.finish(GameResult::Draw);
            return;
        }

        let side = self.side_to_move();
        self.legal = legal_moves(&self.board.snapshot(), side);
        if self.legal.is_empty() {
            self.finish(GameResult::won_by(side.opponent()));
            return;
        }

        self.phase = if self.config.player(side).bot {
            Phase::ApplyingBotMove
        } else {
            Phase::AwaitingHumanInput
        };
    }

    fn finish(&mut self, result: GameResult) {
        info!("game over after {} turns: {}", self.turn, result);
        self.phase = Phase::GameOver(result);
    }
}

// Captures the piece on `at` must continue with, empty when its chain is over
fn continuation_captures(grid: &Grid, at: Position) -> MoveList {
    let moves = piece_moves(grid, at);
    if moves.has_captures() {
        moves
    } else {
        MoveList::default()
    }
}

fn format_line(moves: &[Move]) -> String {
    moves
        .iter()
        .map(Move::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PlayerConfig, Randomness};
    use checkers_core::Piece;

    fn pos(row: u8, col: u8) -> Position {
        Position::new(row, col).unwrap()
    }

    fn humans() -> GameConfig {
        GameConfig {
            white: PlayerConfig::human(),
            black: PlayerConfig::human(),
            randomness: Randomness::Disabled,
            ..GameConfig::default()
        }
    }

    #[test]
    fn side_to_move_follows_turn_parity() {
        let mut game = Game::new(humans()).unwrap();
        assert_eq!(game.side_to_move(), Color::White);
        game.turn = 3;
        assert_eq!(game.side_to_move(), Color::Black);
    }

    #[test]
    fn turn_change_bumps_epoch() {
        let mut game = Game::new(humans()).unwrap();
        let before = game.epoch();
        game.handle_input(InputEvent::CellSelected(pos(5, 0))).unwrap();
        game.handle_input(InputEvent::CellSelected(pos(4, 1))).unwrap();
        assert_eq!(game.turn_number(), 1);
        assert!(game.epoch() > before);
    }

    #[test]
    fn continuation_is_empty_once_the_chain_ends() {
        let grid = Grid::from_pieces([
            (pos(4, 3), Piece::man(Color::White)),
            (pos(0, 7), Piece::man(Color::Black)),
        ]);
        assert!(continuation_captures(&grid, pos(4, 3)).is_empty());
    }

    #[test]
    fn unfinished_bot_chain_is_rejected_and_board_restored() {
        let config = GameConfig {
            white: PlayerConfig::bot(1),
            randomness: Randomness::Disabled,
            ..humans()
        };
        let grid = Grid::from_pieces([
            (pos(6, 1), Piece::man(Color::White)),
            (pos(5, 2), Piece::man(Color::Black)),
            (pos(3, 4), Piece::man(Color::Black)),
        ]);
        let mut game = Game::from_grid(config, grid, Color::White).unwrap();
        let epoch = game.epoch();

        let half = vec![Move::capture(pos(6, 1), pos(4, 3), pos(5, 2))];
        let err = game
            .apply_bot_turn(BotTurn { epoch, moves: half })
            .unwrap_err();
        assert_eq!(err, GameError::UnfinishedCapture(pos(4, 3)));
        assert_eq!(game.grid(), grid);
        assert_eq!(game.board().history_len(), 1);
        assert_eq!(game.phase(), Phase::ApplyingBotMove);
    }

    #[test]
    fn result_names_the_winner() {
        assert_eq!(GameResult::WhiteWins.winner(), Some(Color::White));
        assert_eq!(GameResult::Draw.winner(), None);
        assert_eq!(GameResult::BlackWins.to_string(), "Black wins");
    }
}
