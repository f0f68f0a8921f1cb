//! Reservation error kinds.
//!
//! Every variant surfaces synchronously at the violated precondition.
//! Nothing in this crate retries; retry policy belongs to the robot.

use thiserror::Error;

use wh_core::{InputId, Position};
use wh_sched::SchedError;

#[derive(Debug, Error)]
pub enum CellError {
    /// `reserve()` on a cell built with `reservable = false`.
    #[error("{0} does not accept reservations")]
    NotFree(String),

    /// `reserve()` on an occupied fail-fast cell.
    #[error("{0} is already reserved")]
    Reserved(String),

    /// `unreserve()` on a fail-fast cell with a token that is not the
    /// outstanding one.
    #[error("{0} got unknown request")]
    UnknownRequest(String),

    /// `get_input()` on a cell without an input link.
    #[error("{0} is not an input cell")]
    NotInput(String),

    /// Construction supplied an input link but no provider to resolve it.
    #[error("configuration error: {0} given without a mail input provider")]
    MissingMailProvider(InputId),

    /// The provider has no queue for this input.
    #[error("configuration error: no mail input registered for {0}")]
    UnknownInput(InputId),

    #[error("{cell} is already placed at {existing}")]
    PositionAlreadySet { cell: String, existing: Position },

    #[error("two cells placed at {0}")]
    DuplicatePosition(Position),

    #[error("cell layout parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Sched(#[from] SchedError),
}

pub type CellResult<T> = Result<T, CellError>;
