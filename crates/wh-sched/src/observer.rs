//! Simulation observer trait for progress reporting and data collection.

use wh_core::{ProcessId, Tick};

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] as the event loop
/// advances.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
pub trait SimObserver {
    /// Called after each process resumption.
    fn on_step(&mut self, _tick: Tick, _pid: ProcessId) {}

    /// Called once virtual time is about to move past `tick`.
    ///
    /// `resumed` is the number of process resumptions that ran at `tick`.
    fn on_tick_end(&mut self, _tick: Tick, _resumed: usize) {}

    /// Called once after the loop stops.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
