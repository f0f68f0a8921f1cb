//! `AnyCell` — a cell whose policy was picked from its spec.

use std::fmt;

use wh_sched::{ResourceView, Scheduler};

use crate::{
    Cell, CellBase, CellPolicy, CellResult, CellSpec, MailInput, MailInputProvider, QueuedCell,
    Reserve, Token, Unreserved,
};

pub enum AnyCell<S, G = MailInput> {
    FailFast(Cell<S, G>),
    Queued(QueuedCell<S, G>),
}

impl<S: Scheduler, G> AnyCell<S, G> {
    /// Build the policy type named by `spec.policy`.
    pub fn build(
        sched:    S,
        spec:     &CellSpec,
        provider: Option<&dyn MailInputProvider<G>>,
    ) -> CellResult<Self> {
        Ok(match spec.policy {
            CellPolicy::FailFast => AnyCell::FailFast(Cell::new(sched, spec, provider)?),
            CellPolicy::Queued => AnyCell::Queued(QueuedCell::new(sched, spec, provider)?),
        })
    }

    pub fn policy(&self) -> CellPolicy {
        match self {
            AnyCell::FailFast(_) => CellPolicy::FailFast,
            AnyCell::Queued(_) => CellPolicy::Queued,
        }
    }
}

impl<S: Scheduler + ResourceView, G> AnyCell<S, G> {
    pub fn is_occupied(&self) -> bool {
        match self {
            AnyCell::FailFast(c) => c.is_reserved(),
            AnyCell::Queued(c) => c.is_occupied(),
        }
    }
}

impl<S: Scheduler, G> Reserve for AnyCell<S, G> {
    type Input = G;

    fn reserve(&mut self) -> CellResult<Token> {
        match self {
            AnyCell::FailFast(c) => c.reserve(),
            AnyCell::Queued(c) => c.reserve(),
        }
    }

    fn unreserve(&mut self, token: &Token) -> CellResult<Unreserved> {
        match self {
            AnyCell::FailFast(c) => c.unreserve(token),
            AnyCell::Queued(c) => c.unreserve(token),
        }
    }

    fn get_input(&self) -> CellResult<G> {
        self.base().get_input()
    }

    fn base(&self) -> &CellBase<G> {
        match self {
            AnyCell::FailFast(c) => c.base(),
            AnyCell::Queued(c) => c.base(),
        }
    }
}

impl<S, G> fmt::Display for AnyCell<S, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnyCell::FailFast(c) => fmt::Display::fmt(c, f),
            AnyCell::Queued(c) => fmt::Display::fmt(c, f),
        }
    }
}
