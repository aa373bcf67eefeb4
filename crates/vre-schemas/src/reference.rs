use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{MortalityRecord, Phase};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CohortStatus {
    Active,
    Closed,
}

/// A flock placed on a known date. Its bird count is derived from mortality
/// records and never edited directly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cohort {
    pub cohort_id: String,
    pub breed: String,
    pub arrival_date: NaiveDate,
    /// Age of the birds (weeks) on the arrival date. Point-of-lay pullets arrive at ~18.
    #[serde(default)]
    pub arrival_age_weeks: u32,
    pub initial_count: u32,
    pub status: CohortStatus,
    #[serde(default)]
    pub housing_units: Vec<String>,
}

impl Cohort {
    pub fn is_active(&self) -> bool {
        self.status == CohortStatus::Active
    }

    pub fn has_arrived(&self, date: NaiveDate) -> bool {
        date >= self.arrival_date
    }

    pub fn houses(&self, housing_id: &str) -> bool {
        self.housing_units.iter().any(|h| h == housing_id)
    }

    /// Fractional age in weeks; clamps to arrival age before arrival.
    pub fn age_weeks_exact(&self, date: NaiveDate) -> f64 {
        let days = (date - self.arrival_date).num_days().max(0);
        f64::from(self.arrival_age_weeks) + days as f64 / 7.0
    }

    /// Whole completed weeks, used for phases and override ranges.
    pub fn age_weeks(&self, date: NaiveDate) -> u32 {
        let days = (date - self.arrival_date).num_days().max(0);
        let whole = u32::try_from(days / 7).unwrap_or(u32::MAX);
        self.arrival_age_weeks.saturating_add(whole)
    }

    pub fn phase_on(&self, date: NaiveDate) -> Phase {
        Phase::from_week(self.age_weeks(date))
    }

    /// Live birds at the start of `date`: initial count minus deaths recorded
    /// in this cohort's housing units strictly before `date`. Zero before arrival.
    pub fn birds_on(&self, date: NaiveDate, mortality: &[MortalityRecord]) -> u32 {
        if !self.has_arrived(date) {
            return 0;
        }
        let dead: u64 = mortality
            .iter()
            .filter(|m| m.date >= self.arrival_date && m.date < date && self.houses(&m.housing_id))
            .map(|m| u64::from(m.death_count))
            .sum();
        let left = u64::from(self.initial_count).saturating_sub(dead);
        u32::try_from(left).unwrap_or(u32::MAX)
    }

    /// Deaths recorded on `date` in this cohort's housing units.
    pub fn deaths_on(&self, date: NaiveDate, mortality: &[MortalityRecord]) -> u64 {
        mortality
            .iter()
            .filter(|m| m.date == date && self.houses(&m.housing_id))
            .map(|m| u64::from(m.death_count))
            .sum()
    }
}

/// One row of a breed's reference performance curve.
///
/// Every numeric column is optional; young weeks have no FCR, for instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BreederCurvePoint {
    pub breed: String,
    pub week: f64,
    #[serde(default)]
    pub lay_rate: Option<f64>,
    #[serde(default)]
    pub egg_weight_g: Option<f64>,
    #[serde(default)]
    pub large_fraction: Option<f64>,
    #[serde(default)]
    pub feed_intake_g: Option<f64>,
    #[serde(default)]
    pub fcr: Option<f64>,
    /// Expected mortality band, percent per month (0.30 means 0.30 %).
    #[serde(default)]
    pub mortality_pct_monthly: Option<f64>,
    pub phase: Phase,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetMetric {
    LayRate,
    EggWeight,
    FeedIntake,
    Fcr,
    Mortality,
    LargeFraction,
}

impl TargetMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetMetric::LayRate => "lay_rate",
            TargetMetric::EggWeight => "egg_weight",
            TargetMetric::FeedIntake => "feed_intake",
            TargetMetric::Fcr => "fcr",
            TargetMetric::Mortality => "mortality",
            TargetMetric::LargeFraction => "large_fraction",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverrideScope {
    CohortSpecific { cohort_id: String },
    BreedWide { breed: String },
}

/// Manager-set replacement for a curve value over a week range (inclusive).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverrideRule {
    pub override_id: u32,
    pub scope: OverrideScope,
    pub metric: TargetMetric,
    pub start_week: u32,
    pub end_week: u32,
    pub value: f64,
    #[serde(default)]
    pub min_band: Option<f64>,
    #[serde(default)]
    pub max_band: Option<f64>,
    pub reason: String,
    pub set_by: String,
    pub set_date: NaiveDate,
}

impl OverrideRule {
    pub fn covers_week(&self, week: u32) -> bool {
        self.start_week <= week && week <= self.end_week
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskClass {
    A,
    B,
    C,
}

/// Stock item reference row (feed, drugs, packaging, spares).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: String,
    pub name: String,
    pub risk_class: RiskClass,
    pub unit_cost: f64,
}

/// Customer reference row. Only the credit terms matter to verification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub credit_allowed: bool,
    /// Farm currency. Ignored unless `credit_allowed`.
    #[serde(default)]
    pub credit_limit: f64,
}

impl Customer {
    /// Largest unpaid balance tolerated; zero for cash-only customers.
    pub fn effective_credit_limit(&self) -> f64 {
        if self.credit_allowed {
            self.credit_limit
        } else {
            0.0
        }
    }
}
