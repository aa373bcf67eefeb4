//! vre-ghost
//!
//! Ghost money: reconciliation variances converted to currency.
//!
//! Architectural decisions:
//! - Currency is carried in integer micros (1e-6 of the farm currency)
//! - Every component is floored at zero; favourable variances never offset losses
//! - Cumulative total is a fold from the first day of the pass window
//! - Unmodelled categories are present as zero with `complete = false`
//!
//! Deterministic, pure logic. No IO.

mod engine;
mod types;

pub use engine::aggregate_ghost_money;
pub use types::*;
