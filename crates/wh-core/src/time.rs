//! Simulation time model.
//!
//! Virtual time is a monotonically increasing integer `Tick`.  The scheduler
//! never maps ticks to wall-clock time; a tick is whatever unit the layout
//! uses for one robot move.  Integer time keeps event ordering exact, so two
//! events "at the same instant" really are at the same instant.

use std::fmt;

use crate::{WhError, WhResult};

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Typically built by the application crate (or deserialized with the
/// `serde` feature) and passed to the scheduler's `Sim` runner.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Total ticks to simulate.  The run stops before executing any wake at
    /// or after `end_tick()`.
    pub total_ticks: u64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Emit a progress log line every N ticks.  0 disables progress logs.
    pub log_interval_ticks: u64,
}

impl SimConfig {
    /// The tick at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Reject configurations that would run nothing.
    pub fn validate(&self) -> WhResult<()> {
        if self.total_ticks == 0 {
            return Err(WhError::Config("total_ticks must be positive".into()));
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            total_ticks:        1_000,
            seed:               0,
            log_interval_ticks: 0,
        }
    }
}
