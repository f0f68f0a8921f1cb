use thiserror::Error;

use wh_core::{ClaimId, EventId, ProcessId, StoreId};

#[derive(Debug, Error)]
pub enum SchedError {
    /// A process yielded on a claim that was already cancelled or released;
    /// it would never be resumed.
    #[error("process yielded on stale claim {0}")]
    StaleClaim(ClaimId),

    /// A process yielded on a mail get that was never issued or already taken.
    #[error("process yielded on unknown mail get {0}")]
    UnknownMailGet(EventId),

    #[error("wake for unregistered process {0}")]
    UnknownProcess(ProcessId),

    #[error("store {0} not found")]
    StoreNotFound(StoreId),
}

pub type SchedResult<T> = Result<T, SchedError>;
