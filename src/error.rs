use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Board image value does not fit in 25 bits")]
    InvalidBoardImage,
    #[error("Each deck needs at least one full row of puzzles")]
    InsufficientPuzzles,
    #[error("No tetrominoes of that shape left in the reserve")]
    NoTetrominosLeft,
    #[error("Reserve already holds the initial supply of that shape")]
    ReserveOverflow,
}

pub type Result<T> = core::result::Result<T, GameError>;
