//! `wh-core` — foundational types for the `rust_wh` warehouse simulation.
//!
//! Every other `wh-*` crate depends on this one.  It has no `wh-*`
//! dependencies and only `rand` and `thiserror` externally, plus optional
//! `serde`.
//!
//! # What lives here
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`ids`]         | `CellId`, `InputId`, `ProcessId`, `ClaimId`, `StoreId`, …  |
//! | [`position`]    | `Position` grid coordinate                                 |
//! | [`time`]        | `Tick`, `SimConfig`                                        |
//! | [`rng`]         | `ProcessRng` (per-process), `SimRng` (global)              |
//! | [`error`]       | `WhError`, `WhResult`                                      |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod error;
pub mod ids;
pub mod position;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{WhError, WhResult};
pub use ids::{
    CellId, ChargeId, ClaimId, EventId, InputId, MailId, OutputId, ProcessId, ResourceId,
    StoreId,
};
pub use position::Position;
pub use rng::{ProcessRng, SimRng};
pub use time::{SimConfig, Tick};
