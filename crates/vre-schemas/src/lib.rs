//! vre-schemas
//!
//! Typed, immutable records shared by every VRE crate.
//!
//! Architectural decisions:
//! - One tagged variant per log domain (no positional row tuples)
//! - Records are append-only facts; nothing in the engine mutates them
//! - `Variance::NotApplicable` is distinct from a measured zero
//! - A single tri-state status rule (`ThresholdBand::classify`) used by all engines
//! - Malformed upstream data is rejected here (`validate_records`), never inside the engine

mod records;
mod reference;
mod types;
mod validate;

pub use records::*;
pub use reference::*;
pub use types::*;
pub use validate::{validate_records, ValidationError};
