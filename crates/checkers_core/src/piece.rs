#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row step a man of this colour advances by.
    pub fn forward(self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// Row on which a man of this colour is crowned.
    pub fn promotion_row(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rank {
    Man,
    King,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub rank: Rank,
    pub color: Color,
}

impl Piece {
    pub fn new(rank: Rank, color: Color) -> Self {
        Self { rank, color }
    }

    pub fn man(color: Color) -> Self {
        Self::new(Rank::Man, color)
    }

    pub fn king(color: Color) -> Self {
        Self::new(Rank::King, color)
    }

    pub fn is_king(&self) -> bool {
        self.rank == Rank::King
    }
}

/// Compact cell encoding used inside the grid.
///
/// Odd codes are white, even non-zero codes are black, codes above 2 are
/// kings. Crowning a man adds 2 to its code.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) enum Cell {
    #[default]
    Empty = 0,
    WhiteMan = 1,
    BlackMan = 2,
    WhiteKing = 3,
    BlackKing = 4,
}

impl Cell {
    fn code(self) -> u8 {
        self as u8
    }

    pub(crate) fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    pub(crate) fn color(self) -> Option<Color> {
        match self.code() {
            0 => None,
            code if code % 2 == 1 => Some(Color::White),
            _ => Some(Color::Black),
        }
    }

    pub(crate) fn is_king(self) -> bool {
        self.code() > 2
    }

    pub(crate) fn piece(self) -> Option<Piece> {
        let color = self.color()?;
        let rank = if self.is_king() { Rank::King } else { Rank::Man };
        Some(Piece::new(rank, color))
    }

    pub(crate) fn promoted(self) -> Cell {
        match self {
            Cell::WhiteMan => Cell::WhiteKing,
            Cell::BlackMan => Cell::BlackKing,
            other => other,
        }
    }
}

impl From<Option<Piece>> for Cell {
    fn from(piece: Option<Piece>) -> Self {
        match piece {
            None => Cell::Empty,
            Some(Piece { rank: Rank::Man, color: Color::White }) => Cell::WhiteMan,
            Some(Piece { rank: Rank::Man, color: Color::Black }) => Cell::BlackMan,
            Some(Piece { rank: Rank::King, color: Color::White }) => Cell::WhiteKing,
            Some(Piece { rank: Rank::King, color: Color::Black }) => Cell::BlackKing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parity_encodes_color_and_magnitude_encodes_rank() {
        assert_eq!(Cell::WhiteMan.color(), Some(Color::White));
        assert_eq!(Cell::WhiteKing.color(), Some(Color::White));
        assert_eq!(Cell::BlackMan.color(), Some(Color::Black));
        assert_eq!(Cell::BlackKing.color(), Some(Color::Black));
        assert_eq!(Cell::Empty.color(), None);

        assert!(!Cell::WhiteMan.is_king());
        assert!(!Cell::BlackMan.is_king());
        assert!(Cell::WhiteKing.is_king());
        assert!(Cell::BlackKing.is_king());
    }

    #[test]
    fn cell_and_piece_convert_both_ways() {
        for piece in [
            Piece::man(Color::White),
            Piece::man(Color::Black),
            Piece::king(Color::White),
            Piece::king(Color::Black),
        ] {
            assert_eq!(Cell::from(Some(piece)).piece(), Some(piece));
        }
        assert_eq!(Cell::from(None), Cell::Empty);
        assert_eq!(Cell::Empty.piece(), None);
    }

    #[test]
    fn promotion_only_affects_men() {
        assert_eq!(Cell::WhiteMan.promoted(), Cell::WhiteKing);
        assert_eq!(Cell::BlackMan.promoted(), Cell::BlackKing);
        assert_eq!(Cell::WhiteKing.promoted(), Cell::WhiteKing);
        assert_eq!(Cell::Empty.promoted(), Cell::Empty);
    }

    #[test]
    fn colors_advance_towards_their_promotion_row() {
        assert_eq!(Color::White.forward(), -1);
        assert_eq!(Color::White.promotion_row(), 0);
        assert_eq!(Color::Black.forward(), 1);
        assert_eq!(Color::Black.promotion_row(), 7);
        assert_eq!(Color::White.opponent(), Color::Black);
    }
}
