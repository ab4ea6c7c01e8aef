//! Precomputed diagonal rays for every cell.

use once_cell::sync::Lazy;

use crate::Position;

/// Diagonal steps as (row, col) deltas.
pub(crate) const DIRECTIONS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

// For each cell and direction, the cells walked from nearest to farthest.
static RAYS: Lazy<Vec<[Vec<Position>; 4]>> = Lazy::new(|| {
    Position::all()
        .map(|from| {
            DIRECTIONS.map(|(d_row, d_col)| {
                let mut ray = Vec::with_capacity(7);
                let mut current = from;
                while let Some(next) = current.offset(d_row, d_col) {
                    ray.push(next);
                    current = next;
                }
                ray
            })
        })
        .collect()
});

pub(crate) fn ray(from: Position, direction: usize) -> &'static [Position] {
    &RAYS[from.index()][direction]
}
