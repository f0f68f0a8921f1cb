//! Workspace-wide error type.
//!
//! Sub-crates define their own error enums (`SchedError`, `CellError`).
//! `WhError` covers the value types defined here.

use thiserror::Error;

/// The top-level error type for `wh-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum WhError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for all `wh-*` crates.
pub type WhResult<T> = Result<T, WhError>;
