//! vre-targets
//!
//! Age- and phase-adjusted performance targets per cohort per day.
//!
//! Architectural decisions:
//! - Curves are validated once at construction (`BreederCurve::new`) and are immutable after
//! - Linear interpolation between bracketing weeks, clamped at both ends (no extrapolation)
//! - Precedence: cohort-specific override > breed-wide override > curve > configured default
//! - Every resolved value records where it came from (`TargetSource`)
//! - Stateless: snapshots are recomputed each pass, never cached across passes

mod curve;
mod overrides;
mod resolver;
mod types;

pub use curve::{BreederCurve, CurveColumn, CurveError, CurveTable};
pub use overrides::OverrideResolver;
pub use resolver::{TargetBook, TargetResolver};
pub use types::*;
