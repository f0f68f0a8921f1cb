//! `WakeQueue` — sparse per-tick process activation queue.
//!
//! Processes that yield register the tick at which they need attention next.
//! The runner pops one wake at a time, earliest tick first and FIFO within a
//! tick, so a wake pushed for the *current* tick while that tick is being
//! processed still runs this tick, behind everything already queued.

use std::collections::{BTreeMap, VecDeque};

use wh_core::{ProcessId, Tick};

/// A priority-queue mapping simulation ticks → processes to resume at that tick.
#[derive(Default)]
pub struct WakeQueue {
    inner: BTreeMap<Tick, VecDeque<ProcessId>>,
    /// Cached total entry count for O(1) `len()`.
    total: usize,
}

impl WakeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `process` to resume at `tick`.
    pub fn push(&mut self, tick: Tick, process: ProcessId) {
        self.inner.entry(tick).or_default().push_back(process);
        self.total += 1;
    }

    /// Remove and return the earliest queued wake.
    pub fn pop_next(&mut self) -> Option<(Tick, ProcessId)> {
        let mut entry = self.inner.first_entry()?;
        let tick = *entry.key();
        let process = entry.get_mut().pop_front();
        if entry.get().is_empty() {
            entry.remove();
        }
        let process = process?;
        self.total -= 1;
        Some((tick, process))
    }

    /// The earliest tick with at least one queued process, or `None` if empty.
    pub fn next_tick(&self) -> Option<Tick> {
        self.inner.keys().next().copied()
    }

    /// Total number of (tick, process) entries across all future ticks.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
