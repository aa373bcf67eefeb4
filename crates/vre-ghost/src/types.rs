use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use vre_reconcile::{CashReconRecord, EggReconRecord, FeedReconRecord, InventoryReconRecord, MortalityReconRecord, ReconWindow};
use vre_schemas::{Item, ProductionRecord, Status};

/// Micros scale (1e-6) for currency amounts.
pub const MICROS_SCALE: i64 = 1_000_000;

/// Currency amount -> micros. Negative and non-finite amounts become 0.
pub fn to_micros(amount: f64) -> i64 {
    if !amount.is_finite() || amount <= 0.0 {
        return 0;
    }
    let m = (amount * MICROS_SCALE as f64).round();
    if m >= i64::MAX as f64 {
        i64::MAX
    } else {
        m as i64
    }
}

pub fn micros_to_currency(micros: i64) -> f64 {
    micros as f64 / MICROS_SCALE as f64
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostCategory {
    FeedShrinkage,
    MortalityOverTarget,
    EggVarianceLoss,
    CrackedDamaged,
    CashDiscrepancy,
    InventoryShrinkage,
    PriceArbitrageMissed,
    InventoryCarrying,
}

impl GhostCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            GhostCategory::FeedShrinkage => "feed_shrinkage",
            GhostCategory::MortalityOverTarget => "mortality_over_target",
            GhostCategory::EggVarianceLoss => "egg_variance_loss",
            GhostCategory::CrackedDamaged => "cracked_damaged",
            GhostCategory::CashDiscrepancy => "cash_discrepancy",
            GhostCategory::InventoryShrinkage => "inventory_shrinkage",
            GhostCategory::PriceArbitrageMissed => "price_arbitrage_missed",
            GhostCategory::InventoryCarrying => "inventory_carrying",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GhostComponent {
    pub category: GhostCategory,
    pub amount_micros: i64,
    /// false for categories not modelled yet (amount is a zero placeholder).
    pub complete: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GhostMoneyRecord {
    pub date: NaiveDate,
    pub components: Vec<GhostComponent>,
    pub daily_total_micros: i64,
    pub cumulative_total_micros: i64,
    pub daily_status: Status,
    pub cumulative_status: Status,
    /// Worse of daily and cumulative.
    pub overall_status: Status,
}

impl GhostMoneyRecord {
    pub fn component(&self, category: GhostCategory) -> Option<&GhostComponent> {
        self.components.iter().find(|c| c.category == category)
    }

    pub fn daily_total(&self) -> f64 {
        micros_to_currency(self.daily_total_micros)
    }

    pub fn cumulative_total(&self) -> f64 {
        micros_to_currency(self.cumulative_total_micros)
    }
}

/// Everything the aggregator reads: the five reconciliation streams plus the
/// raw production log (cracked grades) and the item table (unit costs).
#[derive(Clone, Copy, Debug)]
pub struct GhostInputs<'a> {
    pub window: ReconWindow,
    pub eggs: &'a [EggReconRecord],
    pub cash: &'a [CashReconRecord],
    pub feed: &'a [FeedReconRecord],
    pub mortality: &'a [MortalityReconRecord],
    pub inventory: &'a [InventoryReconRecord],
    pub production: &'a [ProductionRecord],
    pub items: &'a [Item],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn micros_floor_and_round() {
        assert_eq!(to_micros(1.5), 1_500_000);
        assert_eq!(to_micros(-3.0), 0);
        assert_eq!(to_micros(f64::NAN), 0);
        assert_eq!(to_micros(0.0000004), 0);
        assert_eq!(micros_to_currency(2_250_000), 2.25);
    }
}
