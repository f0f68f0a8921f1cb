//! Mail-input provider contract.
//!
//! A cell with an input link does not own its queue.  At construction it asks
//! a provider for a getter keyed by its `InputId` and keeps only that getter;
//! each `get_input()` call invokes it to start one retrieval.

use std::collections::HashMap;

use wh_core::{InputId, StoreId};
use wh_sched::{MailGet, SchedResult, SimHandle};

use crate::{CellError, CellResult};

/// Zero-argument callable that starts one retrieval from a mail queue.
pub type MailGetter<G> = Box<dyn Fn() -> G>;

/// The retrieval produced by [`StoreInputs`] getters.
pub type MailInput = SchedResult<MailGet>;

/// Factory mapping an input identifier to its getter.
///
/// Any `Fn(InputId) -> CellResult<MailGetter<G>>` closure is a provider.
pub trait MailInputProvider<G> {
    fn getter(&self, input: InputId) -> CellResult<MailGetter<G>>;
}

impl<G, F> MailInputProvider<G> for F
where
    F: Fn(InputId) -> CellResult<MailGetter<G>>,
{
    fn getter(&self, input: InputId) -> CellResult<MailGetter<G>> {
        self(input)
    }
}

/// Provider backed by scheduler mail stores, one store per input.
#[derive(Debug)]
pub struct StoreInputs {
    handle: SimHandle,
    stores: HashMap<InputId, StoreId>,
}

impl StoreInputs {
    pub fn new(handle: SimHandle) -> Self {
        Self { handle, stores: HashMap::new() }
    }

    /// Create a store of `capacity` for `input` and return it.  Registering
    /// the same input twice replaces the earlier store.
    pub fn register(&mut self, input: InputId, capacity: usize) -> StoreId {
        let store = self.handle.create_store(capacity);
        self.stores.insert(input, store);
        store
    }

    pub fn store(&self, input: InputId) -> Option<StoreId> {
        self.stores.get(&input).copied()
    }
}

impl MailInputProvider<MailInput> for StoreInputs {
    fn getter(&self, input: InputId) -> CellResult<MailGetter<MailInput>> {
        let store = self.store(input).ok_or(CellError::UnknownInput(input))?;
        let handle = self.handle.clone();
        Ok(Box::new(move || handle.get(store)))
    }
}
