//! The `Reserve` capability shared by both policies.

use wh_core::{ChargeId, InputId, OutputId, Position};

use crate::{CellBase, CellResult, Token, Unreserved};

/// Exclusive-occupancy protocol for one cell.
///
/// Preconditions are checked before any state changes, so a call that
/// returns `Err` leaves the cell exactly as it was.
pub trait Reserve {
    /// What `get_input` hands back.
    type Input;

    /// Claim the cell.  See [`Cell`][crate::Cell] and
    /// [`QueuedCell`][crate::QueuedCell] for what happens when it is occupied.
    fn reserve(&mut self) -> CellResult<Token>;

    /// Give back a token obtained from this cell's `reserve()`.
    fn unreserve(&mut self, token: &Token) -> CellResult<Unreserved>;

    /// Start one retrieval from the cell's mail input.
    fn get_input(&self) -> CellResult<Self::Input>;

    fn base(&self) -> &CellBase<Self::Input>;

    fn reservable(&self) -> bool {
        self.base().reservable()
    }

    fn input_id(&self) -> Option<InputId> {
        self.base().input_id()
    }

    fn output_id(&self) -> Option<OutputId> {
        self.base().output_id()
    }

    fn charge_id(&self) -> Option<ChargeId> {
        self.base().charge_id()
    }

    fn position(&self) -> Option<Position> {
        self.base().position()
    }
}
