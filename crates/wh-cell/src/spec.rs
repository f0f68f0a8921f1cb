//! Construction-time cell description.

use wh_core::{ChargeId, InputId, OutputId};

/// Which concurrency policy a cell enforces.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CellPolicy {
    /// Occupied → `reserve()` fails immediately.
    #[default]
    FailFast,
    /// Occupied → `reserve()` queues the caller in FIFO order.
    Queued,
}

/// Everything fixed about a cell for its whole lifetime.
///
/// `reservable` is structural: a cell built with `false` rejects every
/// reservation forever.  It is unrelated to whether the cell is currently
/// occupied, which is runtime state owned by the policy type.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellSpec {
    pub reservable: bool,
    pub input:      Option<InputId>,
    pub output:     Option<OutputId>,
    pub charge:     Option<ChargeId>,
    pub policy:     CellPolicy,
}

impl Default for CellSpec {
    fn default() -> Self {
        Self {
            reservable: true,
            input:      None,
            output:     None,
            charge:     None,
            policy:     CellPolicy::FailFast,
        }
    }
}

impl CellSpec {
    /// A plain traversable cell with the given policy.
    pub fn open(policy: CellPolicy) -> Self {
        Self { policy, ..Self::default() }
    }

    /// A cell that never accepts reservations (wall, decommissioned slot).
    pub fn blocked() -> Self {
        Self { reservable: false, ..Self::default() }
    }

    pub fn with_input(mut self, input: InputId) -> Self {
        self.input = Some(input);
        self
    }

    pub fn with_output(mut self, output: OutputId) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_charge(mut self, charge: ChargeId) -> Self {
        self.charge = Some(charge);
        self
    }
}
