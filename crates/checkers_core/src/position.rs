use std::fmt;

/// A cell on the 8x8 board. Row 0 is the top edge (Black's home side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub(crate) row: u8, // 0-7
    pub(crate) col: u8, // 0-7
}

impl Position {
    pub fn new(row: u8, col: u8) -> Option<Self> {
        if row < 8 && col < 8 {
            Some(Self { row, col })
        } else {
            None
        }
    }

    pub fn row(self) -> u8 {
        self.row
    }

    pub fn col(self) -> u8 {
        self.col
    }

    pub(crate) fn from_index(index: usize) -> Self {
        Self {
            row: (index / 8) as u8,
            col: (index % 8) as u8,
        }
    }

    pub(crate) fn index(self) -> usize {
        self.row as usize * 8 + self.col as usize
    }

    /// Every cell in row-major order.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..64).map(Self::from_index)
    }

    pub fn offset(self, d_row: i8, d_col: i8) -> Option<Self> {
        let row = self.row as i8 + d_row;
        let col = self.col as i8 + d_col;
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// Playable cells are the dark ones.
    pub fn is_dark(self) -> bool {
        (self.row + self.col) % 2 == 1
    }

    /// Parses `a1`..`h8`; files map to columns, rank 8 is row 0.
    pub fn from_notation(notation: &str) -> Option<Self> {
        let mut chars = notation.chars();
        let (file, rank) = (chars.next()?, chars.next()?);
        if chars.next().is_some() {
            return None;
        }

        if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return None;
        }

        Some(Self {
            row: b'8' - rank as u8,
            col: file as u8 - b'a',
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.col) as char, 8 - self.row)
    }
}
