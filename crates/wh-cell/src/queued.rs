//! `QueuedCell` — the blocking, FIFO-queued policy.
//!
//! Occupancy lives entirely in a capacity-1 scheduler resource: there is no
//! flag on the cell.  `reserve()` submits a claim; if the resource is free
//! the claim is granted in the same step, otherwise the caller yields on the
//! returned token and is resumed when every earlier claim has been served.

use std::fmt;

use tracing::{debug, warn};

use wh_core::ResourceId;
use wh_sched::{ResourceView, Scheduler};

use crate::{CellBase, CellError, CellResult, MailInput, MailInputProvider, Reserve, Token, Unreserved};

/// A scarce cell that robots wait their turn for.
pub struct QueuedCell<S, G = MailInput> {
    sched:    S,
    base:     CellBase<G>,
    resource: ResourceId,
}

impl<S: Scheduler, G> QueuedCell<S, G> {
    pub fn new(
        sched:    S,
        spec:     &crate::CellSpec,
        provider: Option<&dyn MailInputProvider<G>>,
    ) -> CellResult<Self> {
        let base = CellBase::new(spec, provider)?;
        let resource = sched.create_resource(1);
        Ok(Self { sched, base, resource })
    }

    /// The scheduler resource backing this cell.
    pub fn resource(&self) -> ResourceId {
        self.resource
    }
}

impl<S: Scheduler + ResourceView, G> QueuedCell<S, G> {
    /// Whether a claim currently holds the cell.
    pub fn is_occupied(&self) -> bool {
        self.sched.holders(self.resource) > 0
    }

    /// Claims queued behind the holder.
    pub fn waiting(&self) -> usize {
        self.sched.waiting(self.resource)
    }
}

impl<S: Scheduler, G> Reserve for QueuedCell<S, G> {
    type Input = G;

    /// Fails with `NotFree` on a non-reservable cell before anything is
    /// queued.  Otherwise never fails: the token may be pending.
    fn reserve(&mut self) -> CellResult<Token> {
        if !self.base.reservable() {
            return Err(CellError::NotFree(self.to_string()));
        }
        let claim = self.sched.request(self.resource);
        debug!(cell = %self, claim = %claim.id, "claim submitted");
        Ok(Token::Claim(claim))
    }

    /// A claim issued by this cell is cancelled if still pending, then
    /// released, in that order.
    ///
    /// Any other token is tolerated and reported as `Ignored`.
    fn unreserve(&mut self, token: &Token) -> CellResult<Unreserved> {
        let claim = match token {
            Token::Claim(c) if c.resource == self.resource => c,
            _ => {
                warn!(cell = %self, ?token, "unreserve with unrecognized token ignored");
                return Ok(Unreserved::Ignored);
            }
        };

        let withdrawn = self.sched.cancel(claim);
        let released = self.sched.release(self.resource, claim);
        if withdrawn {
            debug!(cell = %self, claim = %claim.id, "pending claim withdrawn");
            Ok(Unreserved::Withdrawn)
        } else if released {
            debug!(cell = %self, claim = %claim.id, "released");
            Ok(Unreserved::Released)
        } else {
            warn!(cell = %self, claim = %claim.id, "unreserve with spent claim ignored");
            Ok(Unreserved::Ignored)
        }
    }

    fn get_input(&self) -> CellResult<G> {
        self.base.get_input()
    }

    fn base(&self) -> &CellBase<G> {
        &self.base
    }
}

impl<S, G> fmt::Display for QueuedCell<S, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.base, f)
    }
}
