//! Reservation tokens and unreserve outcomes.

use wh_sched::{Claim, Completion, Yield};

/// Opaque proof of a successful `reserve()`.
///
/// Both policies hand out the same token type so cells of either policy can
/// sit behind one `dyn Reserve`.  A token only ever matches the cell and the
/// reservation that issued it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Token {
    /// Issued by a fail-fast [`Cell`][crate::Cell].
    Completion(Completion),
    /// Issued by a [`QueuedCell`][crate::QueuedCell]; may still be pending.
    Claim(Claim),
}

impl Token {
    /// What the holding process yields to wait for the reservation to take
    /// effect.  A fail-fast token is a zero-duration completion and resumes
    /// within the same tick.
    pub fn wait(self) -> Yield {
        match self {
            Token::Completion(c) => Yield::Event(c),
            Token::Claim(c)      => Yield::Claim(c),
        }
    }

    pub fn claim(&self) -> Option<&Claim> {
        match self {
            Token::Claim(c) => Some(c),
            Token::Completion(_) => None,
        }
    }
}

/// What a successful `unreserve()` did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Unreserved {
    /// The occupant left; the next queued claim, if any, was admitted.
    Released,
    /// A queued claim that had not been granted yet was withdrawn.
    Withdrawn,
    /// A queued cell did not recognize the token; nothing changed.
    Ignored,
}
