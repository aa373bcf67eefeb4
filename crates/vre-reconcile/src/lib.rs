//! vre-reconcile
//!
//! Five independent reconciliation chains (egg, cash, feed, mortality,
//! inventory) plus the cycle-count scheduler.
//!
//! Architectural decisions:
//! - Each chain is an explicit fold over the window's days in date order
//! - Opening balance on day t is the closing balance of day t-1; day one opens from an input
//! - No shared mutable state between chains, so they can run on separate threads
//! - A missing observation is `Variance::NotApplicable`, never zero
//! - Division by zero yields 0
//! - One tri-state rule (`ThresholdBand::classify`) with per-domain bands from config
//!
//! Deterministic, pure logic. No IO.

mod cash;
mod cycle_count;
mod egg;
mod feed;
mod inventory;
mod mortality;
mod types;

pub use cash::reconcile_cash;
pub use cycle_count::schedule_cycle_counts;
pub use egg::reconcile_eggs;
pub use feed::reconcile_feed;
pub use inventory::reconcile_inventory;
pub use mortality::reconcile_mortality;
pub use types::*;
