use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use vre_config::{canonicalize_json, sha256_hex};
use vre_fraud::FraudFlag;
use vre_ghost::GhostMoneyRecord;
use vre_reconcile::{
    CashReconRecord, CycleCountDue, EggReconRecord, FeedReconRecord, InventoryReconRecord, MortalityReconRecord,
    ReconWindow,
};
use vre_schemas::{BreederCurvePoint, Cohort, Customer, DailyLogRecord, Item, OverrideRule};
use vre_targets::TargetSnapshot;

/// Everything one pass reads. Reference tables are owned by the caller and never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PassInputs {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub cohorts: Vec<Cohort>,
    pub curve: Vec<BreederCurvePoint>,
    #[serde(default)]
    pub overrides: Vec<OverrideRule>,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub customers: Vec<Customer>,
    /// Records may extend to here; later ones are future-dated. `None` accepts any date.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
    #[serde(default)]
    pub records: Vec<DailyLogRecord>,
    /// Egg stock (in eggs) at the start of `window_start`.
    #[serde(default)]
    pub opening_eggs: i64,
    #[serde(default)]
    pub prior_flags: Vec<FraudFlag>,
}

impl PassInputs {
    pub fn window(&self) -> ReconWindow {
        ReconWindow::new(self.window_start, self.window_end)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PassOutput {
    pub window: ReconWindow,
    pub targets: Vec<TargetSnapshot>,
    pub eggs: Vec<EggReconRecord>,
    pub cash: Vec<CashReconRecord>,
    pub feed: Vec<FeedReconRecord>,
    pub mortality: Vec<MortalityReconRecord>,
    pub inventory: Vec<InventoryReconRecord>,
    pub cycle_counts: Vec<CycleCountDue>,
    pub ghost_money: Vec<GhostMoneyRecord>,
    pub fraud_flags: Vec<FraudFlag>,
}

impl PassOutput {
    /// Canonical JSON (sorted keys, compact).
    pub fn canonical_json(&self) -> Result<String> {
        let v = serde_json::to_value(self).context("serialize pass output failed")?;
        canonicalize_json(&v)
    }

    /// SHA-256 of the canonical JSON; equal digests mean byte-identical outputs.
    pub fn digest(&self) -> Result<String> {
        Ok(sha256_hex(self.canonical_json()?.as_bytes()))
    }
}
