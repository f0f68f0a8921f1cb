//! `SimHandle` — the shared, cloneable handle to the engine.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use wh_core::{ProcessId, ResourceId, StoreId, Tick};

use crate::engine::Engine;
use crate::{Claim, ClaimState, Completion, Mail, MailGet, ResourceView, SchedResult, Scheduler, Yield};

/// Cheap-to-clone handle onto a single simulation's engine.
///
/// Every cell, mail provider and process in a run holds a clone.  The handle
/// is `!Send`: one simulation lives on one thread.
#[derive(Clone, Default)]
pub struct SimHandle {
    engine: Rc<RefCell<Engine>>,
}

impl SimHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Tick {
        self.engine.borrow().now
    }

    // ── Mail stores ───────────────────────────────────────────────────────

    /// Create a bounded FIFO mail store.
    pub fn create_store(&self, capacity: usize) -> StoreId {
        self.engine.borrow_mut().create_store(capacity)
    }

    /// Offer `mail` to `store`.  Hands it straight to the oldest pending get
    /// if there is one; otherwise buffers it, or gives it back if the store
    /// is full.
    pub fn put(&self, store: StoreId, mail: Mail) -> SchedResult<Result<(), Mail>> {
        self.engine.borrow_mut().put(store, mail)
    }

    /// Start a retrieval from `store`.  Fulfilled immediately if mail is
    /// buffered; otherwise the returned get waits for the next put.
    pub fn get(&self, store: StoreId) -> SchedResult<MailGet> {
        self.engine.borrow_mut().get(store)
    }

    /// Collect the mail of a fulfilled get.  `None` while still pending.
    pub fn take(&self, get: &MailGet) -> Option<Mail> {
        self.engine.borrow_mut().take(get)
    }

    /// Mail buffered in `store` and not yet handed to a get.
    pub fn queued_mail(&self, store: StoreId) -> usize {
        self.engine.borrow().queued_mail(store)
    }

    /// Claims still pending or granted across every resource.
    pub fn live_claims(&self) -> usize {
        self.engine.borrow().live_claims()
    }

    // ── Runner plumbing ───────────────────────────────────────────────────

    pub(crate) fn schedule(&self, tick: Tick, pid: ProcessId) {
        self.engine.borrow_mut().wake.push(tick, pid);
    }

    pub(crate) fn next_wake_tick(&self) -> Option<Tick> {
        self.engine.borrow().wake.next_tick()
    }

    /// Pop the next wake and advance `now` to it.
    pub(crate) fn pop_wake(&self) -> Option<(Tick, ProcessId)> {
        let mut engine = self.engine.borrow_mut();
        let (tick, pid) = engine.wake.pop_next()?;
        engine.now = tick;
        Some((tick, pid))
    }

    pub(crate) fn set_active(&self, pid: Option<ProcessId>) {
        self.engine.borrow_mut().active = pid;
    }

    pub(crate) fn park(&self, pid: ProcessId, yielded: Yield) -> SchedResult<()> {
        self.engine.borrow_mut().park(pid, yielded)
    }

    pub(crate) fn pending_wakes(&self) -> usize {
        self.engine.borrow().wake.len()
    }
}

impl Scheduler for SimHandle {
    fn completion(&self) -> Completion {
        self.engine.borrow_mut().completion()
    }

    fn create_resource(&self, capacity: u32) -> ResourceId {
        self.engine.borrow_mut().create_resource(capacity)
    }

    fn request(&self, resource: ResourceId) -> Claim {
        self.engine.borrow_mut().request(resource)
    }

    fn cancel(&self, claim: &Claim) -> bool {
        self.engine.borrow_mut().cancel(claim)
    }

    fn release(&self, resource: ResourceId, claim: &Claim) -> bool {
        self.engine.borrow_mut().release(resource, claim)
    }
}

impl ResourceView for SimHandle {
    fn claim_state(&self, claim: &Claim) -> Option<ClaimState> {
        self.engine.borrow().claim_state(claim)
    }

    fn holders(&self, resource: ResourceId) -> usize {
        self.engine.borrow().holders(resource)
    }

    fn waiting(&self, resource: ResourceId) -> usize {
        self.engine.borrow().waiting(resource)
    }
}

impl fmt::Debug for SimHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimHandle").field("now", &self.now()).finish()
    }
}
