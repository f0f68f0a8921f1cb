//! Seeded random streams for a run.
//!
//! Robots draw dwell and back-off times from their own `ProcessRng`, keyed
//! by `ProcessId`.  When robots contend for a cell the order they resume in
//! changes, but each robot's draws stay the same because no stream is
//! shared.  Process-free sources such as mail arrivals use a `SimRng` child.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::ProcessId;

/// Spreads consecutive process IDs across the seed space.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── ProcessRng ────────────────────────────────────────────────────────────────

/// The random stream owned by one process.
pub struct ProcessRng(SmallRng);

impl ProcessRng {
    /// The stream for `process` in a run seeded with `run_seed`.
    pub fn new(run_seed: u64, process: ProcessId) -> Self {
        let seed = run_seed ^ (process.0 as u64).wrapping_mul(MIXING_CONSTANT);
        ProcessRng(SmallRng::seed_from_u64(seed))
    }

    /// A value drawn uniformly from `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Run-level stream for sources that are not processes.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// An independent stream for the source numbered `offset`.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng(SmallRng::seed_from_u64(child_seed))
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }
}
