//! vre-fraud
//!
//! Declarative fraud-rule catalog over raw logs.
//!
//! Architectural decisions:
//! - Rules are data: a static table of id, label, category, severity, detection type,
//!   source domains and a detector fn; one generic loop evaluates them all
//! - Reads raw logs, reference data and targets; never the reconciliation output
//! - Flag ids are UUIDv5 over (rule id, subject) so re-runs yield identical ids
//! - Flags never auto-resolve; `carry_forward` keeps human status across passes

mod catalog;
mod engine;
mod types;

pub use catalog::{catalog, rule};
pub use engine::{carry_forward, evaluate, flag_id};
pub use types::*;
