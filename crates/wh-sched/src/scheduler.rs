//! The scheduler contract consumed by cells.
//!
//! Cells see the engine only through [`Scheduler`]: five primitives, all
//! taking `&self` because the scheduler is a shared handle that every cell
//! in a layout holds a clone of.  [`ResourceView`] adds read-only queries for
//! diagnostics and tests; cells never need it to enforce exclusivity.

use wh_core::{ClaimId, EventId, MailId, OutputId, ResourceId, StoreId, Tick};

/// A completion event.  Zero-duration completions trigger at the tick they
/// were created; a process that yields one resumes within the same tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Completion {
    pub id: EventId,
    pub at: Tick,
}

/// A submitted claim on a capacity-limited resource.
///
/// Claims are identified by a never-reused `ClaimId`, so two claims compare
/// equal only if they are the same submission.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Claim {
    pub id:       ClaimId,
    pub resource: ResourceId,
}

/// State of a live [`Claim`].  Once cancelled or released a claim is
/// dropped by the scheduler and has no state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClaimState {
    /// Waiting in the resource's FIFO queue.
    Pending,
    /// Holding one unit of the resource's capacity.
    Granted,
}

/// One piece of mail waiting in an input store.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Mail {
    pub id:     MailId,
    /// The output chute this mail must be delivered to.
    pub output: OutputId,
}

/// A pending or fulfilled retrieval from a mail store.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MailGet {
    pub id:    EventId,
    pub store: StoreId,
}

/// The five scheduler primitives the reservation core depends on.
pub trait Scheduler {
    /// Create a zero-duration completion event at the current tick.
    fn completion(&self) -> Completion;

    /// Create a resource admitting at most `capacity` concurrent holders.
    fn create_resource(&self, capacity: u32) -> ResourceId;

    /// Submit a claim on `resource`.  Granted immediately (same step, no
    /// suspension) if capacity is free, otherwise queued behind every earlier
    /// submission.
    fn request(&self, resource: ResourceId) -> Claim;

    /// Withdraw `claim` if it is still pending.  Returns `true` if it was.
    /// Cancelling a granted, released or already-cancelled claim is a no-op.
    fn cancel(&self, claim: &Claim) -> bool;

    /// Release `claim`'s hold on `resource` and admit the next waiters in
    /// FIFO order.  Returns `true` if `claim` was a holder; releasing a
    /// non-holder changes nothing.
    fn release(&self, resource: ResourceId, claim: &Claim) -> bool;
}

/// Read-only resource queries.
pub trait ResourceView {
    /// State of `claim`, or `None` once it was cancelled or released (or if
    /// the scheduler never issued it).
    fn claim_state(&self, claim: &Claim) -> Option<ClaimState>;

    /// Number of claims currently holding `resource`.
    fn holders(&self, resource: ResourceId) -> usize;

    /// Number of claims queued on `resource`.
    fn waiting(&self, resource: ResourceId) -> usize;
}
