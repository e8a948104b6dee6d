//! Shared error types.

use thiserror::Error;

/// Two tables that must share an axis have no keys in common.
///
/// Raised by the PnL engine (weight vs. price symbols) and the neutralizer
/// (signal vs. factor dates). An empty *input* is not an overlap failure;
/// empty inputs propagate as empty results so callers can treat them as
/// trivial success.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no common {axis} between {left} and {right}")]
pub struct NoOverlapError {
    pub left: &'static str,
    pub right: &'static str,
    pub axis: &'static str,
}
