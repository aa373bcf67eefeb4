use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use vre_schemas::{days_inclusive, CountTrigger, RiskClass, Status, Variance};

/// Inclusive pass window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReconWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Chronological days in the window (empty when end < start).
    pub fn days(&self) -> Vec<NaiveDate> {
        days_inclusive(self.start, self.end)
    }

    pub fn contains(&self, d: NaiveDate) -> bool {
        self.start <= d && d <= self.end
    }
}

/// `num / den`, or 0 when `den` is zero or the result is not finite.
pub fn safe_div(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        return 0.0;
    }
    let r = num / den;
    if r.is_finite() {
        r
    } else {
        0.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EggReconRecord {
    pub date: NaiveDate,
    pub opening_eggs: i64,
    pub produced_eggs: u64,
    pub sold_eggs: u64,
    pub cracked_eggs: u64,
    /// Explained removals (positive) or additions (negative).
    pub adjustments: i64,
    pub expected_closing_eggs: i64,
    pub closing_eggs: i64,
    pub physical_eggs: Option<u64>,
    /// physical - expected, in eggs. NotApplicable on days without a count.
    pub variance_eggs: Variance,
    pub variance_crates: Variance,
    pub status: Status,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CashReconRecord {
    pub date: NaiveDate,
    pub revenue: f64,
    pub received_momo: f64,
    pub received_bank: f64,
    pub received_cash: f64,
    pub total_received: f64,
    /// revenue - total_received
    pub variance: f64,
    pub paid_count: u32,
    pub paid_with_evidence: u32,
    /// paid_with_evidence / paid_count; 0 when nothing was paid.
    pub evidence_completeness: f64,
    /// Unpaid + part-paid line totals on the ledger up to and including this day.
    pub outstanding_receivables: f64,
    /// Cash received today and not deposited by the end of the day.
    pub cash_pending_deposit: f64,
    pub status: Status,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedReconRecord {
    pub date: NaiveDate,
    pub issued_kg: f64,
    pub returned_kg: f64,
    pub consumed_kg: f64,
    pub expected_kg: f64,
    pub birds: u64,
    /// consumed - expected
    pub variance_kg: f64,
    pub variance_bags: f64,
    pub status: Status,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MortalityReconRecord {
    pub cohort_id: String,
    pub date: NaiveDate,
    pub opening_flock: u32,
    pub deaths: u32,
    /// Culled birds; already included in `deaths`.
    pub culls: u32,
    pub live_sales: u32,
    /// Live-bird sales are not logged yet; `live_sales` is a zero placeholder.
    pub live_sales_complete: bool,
    pub expected_closing: u32,
    pub mortality_rate: f64,
    pub target_daily_rate: f64,
    /// mortality_rate - target_daily_rate
    pub variance: f64,
    pub zero_death_streak: u32,
    pub improbable_zero_mortality: bool,
    pub status: Status,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventoryReconRecord {
    pub date: NaiveDate,
    pub item_id: String,
    pub trigger: CountTrigger,
    pub expected_qty: f64,
    pub counted_qty: f64,
    /// counted - expected
    pub variance: f64,
    /// variance / expected; 0 when expected is 0.
    pub variance_pct: f64,
    pub status: Status,
    pub reason_code: Option<String>,
    /// Status is not Green and no reason code was given.
    pub reason_missing: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CycleCountDue {
    pub item_id: String,
    pub risk_class: RiskClass,
    pub last_counted: Option<NaiveDate>,
    pub days_since: Option<i64>,
    pub last_status: Option<Status>,
    /// Base frequency for the risk class, shortened after a non-Green count.
    pub frequency_days: f64,
    pub due: bool,
    pub priority: f64,
}
