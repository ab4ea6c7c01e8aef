use std::fmt;

use log::debug;

use crate::piece::Cell;
use crate::{BoardError, Color, Move, MoveRejection, Piece, Position, Rank};

/// Immutable-by-value copy of the 8x8 board.
///
/// `Grid` is `Copy`, so search and move generation work on their own
/// snapshots and never touch the live [`Board`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Grid {
    cells: [[Cell; 8]; 8],
}

impl Grid {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Standard layout: three ranks of men per side on the dark cells.
    pub fn starting() -> Self {
        let mut grid = Self::empty();
        for pos in Position::all().filter(|pos| pos.is_dark()) {
            if pos.row < 3 {
                grid.set(pos, Some(Piece::man(Color::Black)));
            } else if pos.row > 4 {
                grid.set(pos, Some(Piece::man(Color::White)));
            }
        }
        grid
    }

    /// A grid holding exactly `pieces`, later entries overwriting earlier ones.
    pub fn from_pieces(pieces: impl IntoIterator<Item = (Position, Piece)>) -> Self {
        let mut grid = Self::empty();
        for (pos, piece) in pieces {
            grid.set(pos, Some(piece));
        }
        grid
    }

    pub fn get(&self, pos: Position) -> Option<Piece> {
        self.cell(pos).piece()
    }

    pub fn set(&mut self, pos: Position, piece: Option<Piece>) {
        self.cells[pos.row as usize][pos.col as usize] = Cell::from(piece);
    }

    pub(crate) fn cell(&self, pos: Position) -> Cell {
        self.cells[pos.row as usize][pos.col as usize]
    }

    pub fn is_empty_at(&self, pos: Position) -> bool {
        self.cell(pos).is_empty()
    }

    /// Occupied cells in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        Position::all().filter_map(|pos| self.get(pos).map(|piece| (pos, piece)))
    }

    pub fn count(&self, color: Color, rank: Rank) -> usize {
        self.pieces()
            .filter(|(_, piece)| piece.color == color && piece.rank == rank)
            .count()
    }

    /// Plays `mv` without any validation: removes the captured piece,
    /// crowns a man landing on its promotion row, then moves it.
    pub fn play(&mut self, mv: &Move) {
        if let Some(captured) = mv.captured {
            self.set(captured, None);
        }

        let mut cell = self.cell(mv.from);
        if let Some(color) = cell.color() {
            if mv.to.row == color.promotion_row() {
                cell = cell.promoted();
            }
        }

        self.cells[mv.to.row as usize][mv.to.col as usize] = cell;
        self.set(mv.from, None);
    }

    /// Copy of this grid with `mv` played.
    pub fn after(&self, mv: &Move) -> Grid {
        let mut next = *self;
        next.play(mv);
        next
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..8u8 {
            for col in 0..8u8 {
                let symbol = match self.cells[row as usize][col as usize] {
                    Cell::Empty => '.',
                    Cell::WhiteMan => 'w',
                    Cell::BlackMan => 'b',
                    Cell::WhiteKing => 'W',
                    Cell::BlackKing => 'B',
                };
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A past grid together with the beat series that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry {
    grid: Grid,
    beat_series: usize,
}

impl HistoryEntry {
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn beat_series(&self) -> usize {
        self.beat_series
    }
}

/// The live game board: current grid plus one history entry per applied move.
#[derive(Debug, Clone)]
pub struct Board {
    grid: Grid,
    history: Vec<HistoryEntry>,
}

impl Board {
    pub fn new() -> Self {
        Self::from_grid(Grid::starting())
    }

    /// Starts a board from an arbitrary layout; that layout becomes history entry zero.
    pub fn from_grid(grid: Grid) -> Self {
        let mut board = Self {
            grid,
            history: Vec::new(),
        };
        board.record(0);
        board
    }

    pub fn reset_to_start(&mut self) {
        self.grid = Grid::starting();
        self.history.clear();
        self.record(0);
    }

    pub fn get(&self, pos: Position) -> Option<Piece> {
        self.grid.get(pos)
    }

    pub fn snapshot(&self) -> Grid {
        self.grid
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Applies one atomic move. Rejected moves leave the board untouched.
    pub fn apply(&mut self, mv: &Move, beat_series: usize) -> Result<(), BoardError> {
        let reject = |reason| BoardError::InvalidMove {
            from: mv.from,
            to: mv.to,
            reason,
        };

        if !self.grid.is_empty_at(mv.to) {
            debug!("rejected {mv}: destination occupied");
            return Err(reject(MoveRejection::DestinationOccupied));
        }
        if self.grid.is_empty_at(mv.from) {
            debug!("rejected {mv}: source empty");
            return Err(reject(MoveRejection::SourceEmpty));
        }

        self.grid.play(mv);
        self.record(beat_series);
        Ok(())
    }

    /// Crowns the man at `at` outside of a move.
    pub fn promote(&mut self, at: Position) -> Result<(), BoardError> {
        let cell = self.grid.cell(at);
        if cell.is_empty() || cell.is_king() {
            return Err(BoardError::InvalidPromotion { at });
        }
        self.grid.cells[at.row as usize][at.col as usize] = cell.promoted();
        Ok(())
    }

    /// Undoes the most recent turn and returns how many entries were dropped.
    ///
    /// A turn spans `max(1, beat series of the last entry)` entries; the
    /// initial entry is never removed.
    pub fn rollback(&mut self) -> usize {
        let beat_series = self
            .history
            .last()
            .map_or(1, |entry| entry.beat_series.max(1));

        let mut popped = 0;
        while popped < beat_series && self.history.len() > 1 {
            self.history.pop();
            popped += 1;
        }

        if let Some(entry) = self.history.last() {
            self.grid = entry.grid;
        }
        debug!("rolled back {popped} history entries");
        popped
    }

    fn record(&mut self, beat_series: usize) {
        self.history.push(HistoryEntry {
            grid: self.grid,
            beat_series,
        });
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: u8, col: u8) -> Position {
        Position::new(row, col).unwrap()
    }

    #[test]
    fn starting_layout_has_twelve_men_each_on_dark_cells() {
        let grid = Grid::starting();
        assert_eq!(grid.count(Color::White, Rank::Man), 12);
        assert_eq!(grid.count(Color::Black, Rank::Man), 12);
        assert!(grid.pieces().all(|(pos, _)| pos.is_dark()));
        assert_eq!(grid.get(pos(0, 1)), Some(Piece::man(Color::Black)));
        assert_eq!(grid.get(pos(7, 0)), Some(Piece::man(Color::White)));
        assert_eq!(grid.get(pos(3, 0)), None);
    }

    #[test]
    fn new_board_records_history_entry_zero() {
        let board = Board::new();
        assert_eq!(board.history_len(), 1);
        assert_eq!(board.history()[0].grid(), &Grid::starting());
        assert_eq!(board.history()[0].beat_series(), 0);
    }

    #[test]
    fn apply_moves_piece_and_records_history() {
        let mut board = Board::new();
        let mv = Move::new(pos(5, 0), pos(4, 1));
        board.apply(&mv, 0).unwrap();

        assert_eq!(board.get(pos(5, 0)), None);
        assert_eq!(board.get(pos(4, 1)), Some(Piece::man(Color::White)));
        assert_eq!(board.history_len(), 2);
        assert_eq!(board.history()[1].grid(), &board.snapshot());
    }

    #[test]
    fn apply_rejects_occupied_destination_without_mutating() {
        let mut board = Board::new();
        let before = board.snapshot();
        let err = board.apply(&Move::new(pos(6, 1), pos(5, 0)), 0).unwrap_err();

        assert_eq!(
            err,
            BoardError::InvalidMove {
                from: pos(6, 1),
                to: pos(5, 0),
                reason: MoveRejection::DestinationOccupied,
            }
        );
        assert_eq!(board.snapshot(), before);
        assert_eq!(board.history_len(), 1);
    }

    #[test]
    fn apply_rejects_empty_source() {
        let mut board = Board::new();
        let err = board.apply(&Move::new(pos(4, 1), pos(3, 2)), 0).unwrap_err();
        assert!(matches!(
            err,
            BoardError::InvalidMove {
                reason: MoveRejection::SourceEmpty,
                ..
            }
        ));
        assert_eq!(board.history_len(), 1);
    }

    #[test]
    fn capture_removes_the_jumped_piece() {
        let mut grid = Grid::empty();
        grid.set(pos(5, 2), Some(Piece::man(Color::White)));
        grid.set(pos(4, 3), Some(Piece::man(Color::Black)));
        let mut board = Board::from_grid(grid);

        board
            .apply(&Move::capture(pos(5, 2), pos(3, 4), pos(4, 3)), 1)
            .unwrap();
        assert_eq!(board.get(pos(4, 3)), None);
        assert_eq!(board.get(pos(3, 4)), Some(Piece::man(Color::White)));
        assert_eq!(board.history()[1].beat_series(), 1);
    }

    #[test]
    fn man_is_crowned_in_the_same_apply_that_lands_it() {
        let mut grid = Grid::empty();
        grid.set(pos(1, 2), Some(Piece::man(Color::White)));
        grid.set(pos(6, 3), Some(Piece::man(Color::Black)));
        let mut board = Board::from_grid(grid);

        board.apply(&Move::new(pos(1, 2), pos(0, 1)), 0).unwrap();
        assert_eq!(board.get(pos(0, 1)), Some(Piece::king(Color::White)));

        board.apply(&Move::new(pos(6, 3), pos(7, 4)), 0).unwrap();
        assert_eq!(board.get(pos(7, 4)), Some(Piece::king(Color::Black)));
    }

    #[test]
    fn promote_rejects_empty_cells_and_kings() {
        let mut grid = Grid::empty();
        grid.set(pos(3, 2), Some(Piece::man(Color::Black)));
        grid.set(pos(3, 4), Some(Piece::king(Color::White)));
        let mut board = Board::from_grid(grid);

        board.promote(pos(3, 2)).unwrap();
        assert_eq!(board.get(pos(3, 2)), Some(Piece::king(Color::Black)));

        assert_eq!(
            board.promote(pos(3, 2)),
            Err(BoardError::InvalidPromotion { at: pos(3, 2) })
        );
        assert_eq!(
            board.promote(pos(3, 4)),
            Err(BoardError::InvalidPromotion { at: pos(3, 4) })
        );
        assert_eq!(
            board.promote(pos(4, 4)),
            Err(BoardError::InvalidPromotion { at: pos(4, 4) })
        );
    }

    #[test]
    fn rollback_undoes_a_whole_capture_series() {
        let mut grid = Grid::empty();
        grid.set(pos(6, 1), Some(Piece::man(Color::White)));
        grid.set(pos(5, 2), Some(Piece::man(Color::Black)));
        grid.set(pos(3, 4), Some(Piece::man(Color::Black)));
        grid.set(pos(1, 4), Some(Piece::man(Color::Black)));
        grid.set(pos(0, 1), Some(Piece::man(Color::Black)));
        let mut board = Board::from_grid(grid);

        board.apply(&Move::new(pos(0, 1), pos(1, 0)), 0).unwrap();
        let before_series = board.snapshot();

        board
            .apply(&Move::capture(pos(6, 1), pos(4, 3), pos(5, 2)), 1)
            .unwrap();
        board
            .apply(&Move::capture(pos(4, 3), pos(2, 5), pos(3, 4)), 2)
            .unwrap();
        board
            .apply(&Move::capture(pos(2, 5), pos(0, 3), pos(1, 4)), 3)
            .unwrap();
        assert_eq!(board.history_len(), 5);
        assert_eq!(board.get(pos(0, 3)), Some(Piece::king(Color::White)));

        assert_eq!(board.rollback(), 3);
        assert_eq!(board.history_len(), 2);
        assert_eq!(board.snapshot(), before_series);

        assert_eq!(board.rollback(), 1);
        assert_eq!(board.snapshot(), grid);
    }

    #[test]
    fn rollback_never_discards_the_initial_entry() {
        let mut board = Board::new();
        assert_eq!(board.rollback(), 0);
        assert_eq!(board.history_len(), 1);

        let mut grid = Grid::empty();
        grid.set(pos(6, 1), Some(Piece::man(Color::White)));
        grid.set(pos(5, 2), Some(Piece::man(Color::Black)));
        grid.set(pos(3, 4), Some(Piece::man(Color::Black)));
        let mut board = Board::from_grid(grid);
        board
            .apply(&Move::capture(pos(6, 1), pos(4, 3), pos(5, 2)), 1)
            .unwrap();
        board
            .apply(&Move::capture(pos(4, 3), pos(2, 5), pos(3, 4)), 5)
            .unwrap();

        assert_eq!(board.rollback(), 2);
        assert_eq!(board.history_len(), 1);
        assert_eq!(board.snapshot(), grid);
    }

    #[test]
    fn reset_clears_history() {
        let mut board = Board::new();
        board.apply(&Move::new(pos(5, 0), pos(4, 1)), 0).unwrap();
        board.reset_to_start();
        assert_eq!(board.history_len(), 1);
        assert_eq!(board.snapshot(), Grid::starting());
    }

    #[test]
    fn from_pieces_places_exactly_the_given_pieces() {
        let grid = Grid::from_pieces([
            (pos(7, 0), Piece::king(Color::White)),
            (pos(0, 1), Piece::man(Color::Black)),
        ]);
        assert_eq!(grid.pieces().count(), 2);
        assert_eq!(grid.count(Color::White, Rank::King), 1);
        assert_eq!(grid.get(pos(0, 1)), Some(Piece::man(Color::Black)));
    }

    #[test]
    fn display_draws_one_line_per_row() {
        let text = Grid::starting().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], ".b.b.b.b");
        assert_eq!(lines[7], "w.w.w.w.");
    }
}
