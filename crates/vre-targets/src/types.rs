use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use vre_schemas::{FloorBand, Phase, Status, ThresholdBand};

/// Where a resolved target value came from, highest precedence first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSource {
    CohortOverride,
    BreedOverride,
    Curve,
    Default,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMetric {
    pub value: f64,
    pub source: TargetSource,
    /// Winning override id when `source` is an override.
    pub override_id: Option<u32>,
    /// Acceptable band attached to an override (informational).
    pub min_band: Option<f64>,
    pub max_band: Option<f64>,
}

impl ResolvedMetric {
    pub fn from_curve(value: f64) -> Self {
        Self {
            value,
            source: TargetSource::Curve,
            override_id: None,
            min_band: None,
            max_band: None,
        }
    }

    pub fn from_default(value: f64) -> Self {
        Self {
            source: TargetSource::Default,
            ..Self::from_curve(value)
        }
    }
}

/// Targets for one cohort on one date.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetSnapshot {
    pub cohort_id: String,
    pub date: NaiveDate,
    pub age_weeks_exact: f64,
    pub age_weeks: u32,
    pub phase: Phase,

    pub lay_rate: ResolvedMetric,
    pub lay_thresholds: FloorBand,
    pub fcr: ResolvedMetric,
    pub fcr_thresholds: ThresholdBand,
    pub feed_intake_g: ResolvedMetric,
    pub egg_weight_g: ResolvedMetric,
    pub large_fraction: ResolvedMetric,
    /// Mortality band in percent per month, as stored on the curve.
    pub mortality_pct_monthly: ResolvedMetric,
    pub mortality_monthly_fraction: f64,
    pub mortality_daily_rate: f64,
}

impl TargetSnapshot {
    /// Actual lay rate against this day's floors.
    pub fn classify_lay(&self, actual_lay_rate: f64) -> Status {
        self.lay_thresholds.classify(actual_lay_rate)
    }

    /// Actual FCR against this day's ceilings.
    pub fn classify_fcr(&self, actual_fcr: f64) -> Status {
        self.fcr_thresholds.classify(actual_fcr)
    }

    /// Expected feed (kg) for a flock of `birds` on this day.
    pub fn expected_feed_kg(&self, birds: u32) -> f64 {
        f64::from(birds) * self.feed_intake_g.value / 1000.0
    }
}
