//! Legal move generation with the mandatory-capture rule.

use crate::rays::{ray, DIRECTIONS};
use crate::{Color, Grid, Move, Piece, Position};

/// Moves available for one query, plus whether they are captures.
///
/// When `has_captures` is set every move in the list is a capture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoveList {
    moves: Vec<Move>,
    has_captures: bool,
}

impl MoveList {
    pub fn has_captures(&self) -> bool {
        self.has_captures
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.moves.iter()
    }

    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }

    /// Mutable view for reordering (e.g. shuffling); the contents stay legal.
    pub fn as_mut_slice(&mut self) -> &mut [Move] {
        &mut self.moves
    }

    /// The legal move with these endpoints, if any.
    pub fn find(&self, from: Position, to: Position) -> Option<&Move> {
        self.moves.iter().find(|mv| mv.from == from && mv.to == to)
    }

    pub fn contains(&self, mv: &Move) -> bool {
        self.moves.contains(mv)
    }

    /// Distinct source cells in generation order.
    pub fn sources(&self) -> Vec<Position> {
        let mut sources: Vec<Position> = Vec::new();
        for mv in &self.moves {
            if !sources.contains(&mv.from) {
                sources.push(mv.from);
            }
        }
        sources
    }

    pub fn destinations_from(&self, from: Position) -> Vec<Position> {
        self.moves
            .iter()
            .filter(|mv| mv.from == from)
            .map(|mv| mv.to)
            .collect()
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}

/// All legal moves for `side`. If any piece can capture, only captures are returned.
pub fn legal_moves(grid: &Grid, side: Color) -> MoveList {
    let mut list = MoveList::default();
    let mut piece_captures = Vec::new();

    for (at, piece) in grid.pieces().filter(|(_, piece)| piece.color == side) {
        piece_captures.clear();
        captures_from(grid, at, piece, &mut piece_captures);

        if !piece_captures.is_empty() {
            if !list.has_captures {
                list.has_captures = true;
                list.moves.clear();
            }
            list.moves.extend_from_slice(&piece_captures);
        } else if !list.has_captures {
            quiet_moves_from(grid, at, piece, &mut list.moves);
        }
    }

    list
}

/// Legal moves of the single piece on `at`: its captures if it has any,
/// otherwise its plain moves. Empty cells yield nothing.
pub fn piece_moves(grid: &Grid, at: Position) -> MoveList {
    let mut list = MoveList::default();
    let Some(piece) = grid.get(at) else {
        return list;
    };

    captures_from(grid, at, piece, &mut list.moves);
    if list.moves.is_empty() {
        quiet_moves_from(grid, at, piece, &mut list.moves);
    } else {
        list.has_captures = true;
    }
    list
}

fn captures_from(grid: &Grid, at: Position, piece: Piece, out: &mut Vec<Move>) {
    for direction in 0..DIRECTIONS.len() {
        let ray = ray(at, direction);
        if piece.is_king() {
            // Flying capture: exactly one enemy on the ray, then any empty cell
            // up to the next obstruction.
            let mut jumped = None;
            for &cell in ray {
                match grid.get(cell) {
                    Some(other) if other.color == piece.color => break,
                    Some(_) if jumped.is_some() => break,
                    Some(_) => jumped = Some(cell),
                    None => {
                        if let Some(jumped) = jumped {
                            out.push(Move::capture(at, cell, jumped));
                        }
                    }
                }
            }
        } else if let [over, landing, ..] = ray {
            // Men capture in every direction, backwards included.
            let is_enemy = grid
                .get(*over)
                .is_some_and(|other| other.color != piece.color);
            if is_enemy && grid.is_empty_at(*landing) {
                out.push(Move::capture(at, *landing, *over));
            }
        }
    }
}

fn quiet_moves_from(grid: &Grid, at: Position, piece: Piece, out: &mut Vec<Move>) {
    for (direction, &(d_row, _)) in DIRECTIONS.iter().enumerate() {
        let ray = ray(at, direction);
        if piece.is_king() {
            for &cell in ray.iter().take_while(|cell| grid.is_empty_at(**cell)) {
                out.push(Move::new(at, cell));
            }
        } else if d_row == piece.color.forward() {
            if let Some(&step) = ray.first() {
                if grid.is_empty_at(step) {
                    out.push(Move::new(at, step));
                }
            }
        }
    }
}
