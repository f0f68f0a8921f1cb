//! `Cell` — the fail-fast policy.
//!
//! ```text
//!            reserve() → token
//!   Free ───────────────────────▶ Reserved
//!    ▲                               │
//!    └───────── unreserve(token) ────┘
//! ```
//!
//! The precondition checks and the flip happen inside one call with no
//! yield in between, so no other process can interleave: the cooperative
//! scheduler only switches processes at yields.

use std::fmt;

use tracing::debug;

use wh_sched::{Completion, Scheduler};

use crate::{CellBase, CellError, CellResult, MailInput, MailInputProvider, Reserve, Token, Unreserved};

/// A cell where a robot learns at once whether it may enter.
pub struct Cell<S, G = MailInput> {
    sched:       S,
    base:        CellBase<G>,
    /// The single outstanding token.  `Some` ⇔ occupied.
    outstanding: Option<Completion>,
}

impl<S: Scheduler, G> Cell<S, G> {
    pub fn new(
        sched:    S,
        spec:     &crate::CellSpec,
        provider: Option<&dyn MailInputProvider<G>>,
    ) -> CellResult<Self> {
        Ok(Self {
            sched,
            base: CellBase::new(spec, provider)?,
            outstanding: None,
        })
    }

    /// Whether a reservation is currently outstanding.
    pub fn is_reserved(&self) -> bool {
        self.outstanding.is_some()
    }

    pub fn outstanding(&self) -> Option<Completion> {
        self.outstanding
    }
}

impl<S: Scheduler, G> Reserve for Cell<S, G> {
    type Input = G;

    /// Fails with `NotFree` on a non-reservable cell, then with `Reserved`
    /// if a token is outstanding.  Otherwise issues a fresh zero-duration
    /// completion as the token.
    fn reserve(&mut self) -> CellResult<Token> {
        if !self.base.reservable() {
            return Err(CellError::NotFree(self.to_string()));
        }
        if self.outstanding.is_some() {
            return Err(CellError::Reserved(self.to_string()));
        }
        let token = self.sched.completion();
        self.outstanding = Some(token);
        debug!(cell = %self, event = %token.id, "reserved");
        Ok(Token::Completion(token))
    }

    /// Only the outstanding token is accepted; anything else, including a
    /// token from an earlier reservation, fails with `UnknownRequest`.
    fn unreserve(&mut self, token: &Token) -> CellResult<Unreserved> {
        match (token, self.outstanding) {
            (Token::Completion(given), Some(held)) if *given == held => {
                self.outstanding = None;
                debug!(cell = %self, event = %held.id, "unreserved");
                Ok(Unreserved::Released)
            }
            _ => Err(CellError::UnknownRequest(self.to_string())),
        }
    }

    fn get_input(&self) -> CellResult<G> {
        self.base.get_input()
    }

    fn base(&self) -> &CellBase<G> {
        &self.base
    }
}

impl<S, G> fmt::Display for Cell<S, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.base, f)
    }
}
