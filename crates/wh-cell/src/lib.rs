//! `wh-cell` — the cell reservation protocol.
//!
//! A cell admits at most one occupant at a time.  Before entering a cell a
//! robot calls [`Reserve::reserve`], receives a [`Token`], and later hands the
//! token back through [`Reserve::unreserve`] to vacate.  Two policies exist,
//! chosen per cell at construction through [`CellPolicy`]:
//!
//! | Policy     | Type           | Occupied cell on `reserve()`                  |
//! |------------|----------------|-----------------------------------------------|
//! | `FailFast` | [`Cell`]       | fails with `CellError::Reserved`              |
//! | `Queued`   | [`QueuedCell`] | returns a pending claim; caller yields on it  |
//!
//! Neither type knows about the other.  [`AnyCell`] is the tagged union a
//! layout stores when it mixes policies.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`reserve`]   | `Reserve` trait                                           |
//! | [`cell`]      | `Cell` (fail-fast)                                        |
//! | [`queued`]    | `QueuedCell` (FIFO-queued)                                |
//! | [`any`]       | `AnyCell`                                                 |
//! | [`base`]      | `CellBase` — structural flags, links, position, mail input |
//! | [`spec`]      | `CellSpec`, `CellPolicy`                                  |
//! | [`token`]     | `Token`, `Unreserved`                                     |
//! | [`mail`]      | `MailInputProvider`, `StoreInputs`                        |
//! | [`layout`]    | `CellGrid` — cells indexed by position                    |
//! | [`loader`]    | `load_cell_specs_csv`, `load_cell_specs_reader`           |
//! | [`error`]     | `CellError`, `CellResult<T>`                              |

pub mod any;
pub mod base;
pub mod cell;
pub mod error;
pub mod layout;
pub mod loader;
pub mod mail;
pub mod queued;
pub mod reserve;
pub mod spec;
pub mod token;

#[cfg(test)]
mod tests;

pub use any::AnyCell;
pub use base::CellBase;
pub use cell::Cell;
pub use error::{CellError, CellResult};
pub use layout::CellGrid;
pub use loader::{PlacedSpec, load_cell_specs_csv, load_cell_specs_reader};
pub use mail::{MailGetter, MailInput, MailInputProvider, StoreInputs};
pub use queued::QueuedCell;
pub use reserve::Reserve;
pub use spec::{CellPolicy, CellSpec};
pub use token::{Token, Unreserved};
