//! vre-engine
//!
//! One verification pass over a window: targets, five reconciliation chains,
//! cycle-count schedule, fraud catalog, ghost money.
//!
//! Pipeline: VALIDATE -> TARGETS -> (EGG | CASH | FEED | MORTALITY | INVENTORY | CYCLE COUNT | FRAUD) -> GHOST MONEY
//!
//! - Batch and side-effect free; same inputs + config => byte-identical output digest
//! - Targets are resolved once per (cohort, date) before the chains fan out
//! - Chains and the fraud catalog run on scoped threads over shared read-only inputs
//! - Every pass re-folds from the window's first day, so cumulative totals never double count
//! - Prior fraud flags are carried forward; human status survives re-runs

mod engine;
mod types;

pub use engine::VrePass;
pub use types::{PassInputs, PassOutput};
