use thiserror::Error;

use crate::Position;

/// Why a move was refused by [`crate::Board::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveRejection {
    #[error("begin position is empty")]
    SourceEmpty,
    #[error("final position is not empty")]
    DestinationOccupied,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("can't move {from}-{to}: {reason}")]
    InvalidMove {
        from: Position,
        to: Position,
        reason: MoveRejection,
    },
    #[error("can't promote the piece at {at}")]
    InvalidPromotion { at: Position },
}
