use thiserror::Error;

use crate::TermInt;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    /// The grid cannot hold the initial three-segment snake.
    #[error("grid {width}x{height} is too small, need at least 4 columns and 1 row")]
    GridTooSmall { width: TermInt, height: TermInt },
    #[error("terminal is {available:?} but the game needs at least {needed:?}")]
    TerminalTooSmall {
        needed: (TermInt, TermInt),
        available: (TermInt, TermInt),
    },
}
