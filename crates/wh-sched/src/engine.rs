//! Engine state behind [`SimHandle`][crate::SimHandle].
//!
//! Everything here runs inside a single `RefCell` borrow, so each public
//! operation is atomic with respect to every process.

use std::collections::VecDeque;

use tracing::{trace, warn};

use wh_core::{ClaimId, EventId, ProcessId, ResourceId, StoreId, Tick};

use crate::{Claim, ClaimState, Completion, Mail, MailGet, SchedError, SchedResult, WakeQueue, Yield};

#[cfg(feature = "fx-hash")]
type Map<K, V> = rustc_hash::FxHashMap<K, V>;
#[cfg(not(feature = "fx-hash"))]
type Map<K, V> = std::collections::HashMap<K, V>;

// ── Slots ─────────────────────────────────────────────────────────────────────

struct ResourceSlot {
    capacity: u32,
    holders:  Vec<ClaimId>,
    queue:    VecDeque<ClaimId>,
}

/// A claim that is still pending or granted.  Finished claims are removed.
struct ClaimSlot {
    /// Process that was active when the claim was submitted.
    owner:    Option<ProcessId>,
    state:    ClaimState,
    /// Owner is suspended on this claim and must be woken on grant.
    parked:   bool,
}

struct StoreSlot {
    capacity: usize,
    items:    VecDeque<Mail>,
    getters:  VecDeque<EventId>,
}

struct GetSlot {
    owner:  Option<ProcessId>,
    item:   Option<Mail>,
    parked: bool,
}

// ── Engine ────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct Engine {
    pub(crate) now:    Tick,
    pub(crate) active: Option<ProcessId>,
    pub(crate) wake:   WakeQueue,

    next_event: u64,
    next_claim: u64,

    resources: Vec<ResourceSlot>,
    claims:    Map<ClaimId, ClaimSlot>,
    stores:    Vec<StoreSlot>,
    gets:      Map<EventId, GetSlot>,
}

impl Engine {
    fn next_event_id(&mut self) -> EventId {
        let id = EventId(self.next_event);
        self.next_event += 1;
        id
    }

    // ── Completions ───────────────────────────────────────────────────────

    pub(crate) fn completion(&mut self) -> Completion {
        let id = self.next_event_id();
        Completion { id, at: self.now }
    }

    // ── Resources ─────────────────────────────────────────────────────────

    pub(crate) fn create_resource(&mut self, capacity: u32) -> ResourceId {
        let id = ResourceId(self.resources.len() as u32);
        self.resources.push(ResourceSlot {
            capacity,
            holders: Vec::with_capacity(capacity as usize),
            queue:   VecDeque::new(),
        });
        id
    }

    pub(crate) fn request(&mut self, resource: ResourceId) -> Claim {
        let id = ClaimId(self.next_claim);
        self.next_claim += 1;
        let claim = Claim { id, resource };

        let state = match self.resources.get_mut(resource.index()) {
            None => {
                warn!(%resource, "claim submitted for unknown resource");
                return claim;
            }
            Some(slot) if (slot.holders.len() as u32) < slot.capacity => {
                slot.holders.push(id);
                trace!(claim = %id, %resource, now = %self.now, "claim granted on submit");
                ClaimState::Granted
            }
            Some(slot) => {
                slot.queue.push_back(id);
                trace!(claim = %id, %resource, queued = slot.queue.len(), "claim queued");
                ClaimState::Pending
            }
        };
        self.claims.insert(id, ClaimSlot {
            owner: self.active,
            state,
            parked: false,
        });
        claim
    }

    /// Withdraw a pending claim.  A withdrawn claim is forgotten and can
    /// never be granted.
    pub(crate) fn cancel(&mut self, claim: &Claim) -> bool {
        match self.claims.get(&claim.id) {
            Some(slot) if slot.state == ClaimState::Pending => {}
            _ => return false,
        }
        self.claims.remove(&claim.id);
        if let Some(resource) = self.resources.get_mut(claim.resource.index()) {
            resource.queue.retain(|&c| c != claim.id);
        }
        trace!(claim = %claim.id, "pending claim cancelled");
        true
    }

    /// Free a holder's unit of capacity, forget the claim, and admit waiters.
    pub(crate) fn release(&mut self, resource: ResourceId, claim: &Claim) -> bool {
        let Some(slot) = self.resources.get_mut(resource.index()) else {
            return false;
        };
        let Some(pos) = slot.holders.iter().position(|&c| c == claim.id) else {
            return false;
        };
        slot.holders.swap_remove(pos);
        self.claims.remove(&claim.id);
        trace!(claim = %claim.id, %resource, "claim released");
        self.admit(resource);
        true
    }

    /// Grant queued claims in submission order while capacity remains.
    fn admit(&mut self, resource: ResourceId) {
        let Some(slot) = self.resources.get_mut(resource.index()) else {
            return;
        };
        while (slot.holders.len() as u32) < slot.capacity {
            let Some(next) = slot.queue.pop_front() else {
                break;
            };
            slot.holders.push(next);
            let Some(claim) = self.claims.get_mut(&next) else {
                continue;
            };
            claim.state = ClaimState::Granted;
            trace!(claim = %next, %resource, now = %self.now, "queued claim granted");
            if claim.parked {
                claim.parked = false;
                if let Some(owner) = claim.owner {
                    self.wake.push(self.now, owner);
                }
            }
        }
    }

    pub(crate) fn claim_state(&self, claim: &Claim) -> Option<ClaimState> {
        self.claims.get(&claim.id).map(|c| c.state)
    }

    pub(crate) fn live_claims(&self) -> usize {
        self.claims.len()
    }

    pub(crate) fn holders(&self, resource: ResourceId) -> usize {
        self.resources.get(resource.index()).map_or(0, |r| r.holders.len())
    }

    pub(crate) fn waiting(&self, resource: ResourceId) -> usize {
        self.resources.get(resource.index()).map_or(0, |r| r.queue.len())
    }

    // ── Mail stores ───────────────────────────────────────────────────────

    pub(crate) fn create_store(&mut self, capacity: usize) -> StoreId {
        let id = StoreId(self.stores.len() as u32);
        self.stores.push(StoreSlot {
            capacity,
            items:   VecDeque::new(),
            getters: VecDeque::new(),
        });
        id
    }

    pub(crate) fn put(&mut self, store: StoreId, mail: Mail) -> SchedResult<Result<(), Mail>> {
        let slot = self
            .stores
            .get_mut(store.index())
            .ok_or(SchedError::StoreNotFound(store))?;

        // Oldest pending get is served first; the item never enters the buffer.
        while let Some(get_id) = slot.getters.pop_front() {
            let Some(get) = self.gets.get_mut(&get_id) else {
                continue;
            };
            get.item = Some(mail);
            if get.parked {
                get.parked = false;
                if let Some(owner) = get.owner {
                    self.wake.push(self.now, owner);
                }
            }
            return Ok(Ok(()));
        }

        if slot.items.len() >= slot.capacity {
            return Ok(Err(mail));
        }
        slot.items.push_back(mail);
        Ok(Ok(()))
    }

    pub(crate) fn get(&mut self, store: StoreId) -> SchedResult<MailGet> {
        let id = self.next_event_id();
        let slot = self
            .stores
            .get_mut(store.index())
            .ok_or(SchedError::StoreNotFound(store))?;
        let item = slot.items.pop_front();
        if item.is_none() {
            slot.getters.push_back(id);
        }
        self.gets.insert(id, GetSlot { owner: self.active, item, parked: false });
        Ok(MailGet { id, store })
    }

    pub(crate) fn take(&mut self, get: &MailGet) -> Option<Mail> {
        let item = self.gets.get_mut(&get.id)?.item.take()?;
        self.gets.remove(&get.id);
        Some(item)
    }

    pub(crate) fn queued_mail(&self, store: StoreId) -> usize {
        self.stores.get(store.index()).map_or(0, |s| s.items.len())
    }

    // ── Parking ───────────────────────────────────────────────────────────

    /// Suspend `pid` on what it yielded.
    pub(crate) fn park(&mut self, pid: ProcessId, yielded: Yield) -> SchedResult<()> {
        let now = self.now;
        match yielded {
            Yield::Sleep(n) => self.wake.push(now + n, pid),
            Yield::Event(c) => self.wake.push(c.at.max(now), pid),
            Yield::Claim(claim) => {
                let slot = self
                    .claims
                    .get_mut(&claim.id)
                    .ok_or(SchedError::StaleClaim(claim.id))?;
                match slot.state {
                    ClaimState::Granted => self.wake.push(now, pid),
                    ClaimState::Pending => {
                        slot.owner = Some(pid);
                        slot.parked = true;
                    }
                }
            }
            Yield::Mail(get) => {
                let slot = self
                    .gets
                    .get_mut(&get.id)
                    .ok_or(SchedError::UnknownMailGet(get.id))?;
                if slot.item.is_some() {
                    self.wake.push(now, pid);
                } else {
                    slot.owner = Some(pid);
                    slot.parked = true;
                }
            }
            Yield::Done => {}
        }
        Ok(())
    }
}
