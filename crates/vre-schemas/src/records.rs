use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::LogDomain;

/// Daily egg collection for one housing unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecord {
    pub date: NaiveDate,
    pub housing_id: String,
    pub crates_collected: u32,
    pub singles_collected: u32,
    pub grade_large: u32,
    pub grade_medium: u32,
    pub grade_small: u32,
    pub grade_cracked: u32,
}

impl ProductionRecord {
    pub fn total_eggs(&self, crate_size: u32) -> u64 {
        u64::from(self.crates_collected) * u64::from(crate_size) + u64::from(self.singles_collected)
    }

    pub fn graded_eggs(&self) -> u64 {
        u64::from(self.grade_large)
            + u64::from(self.grade_medium)
            + u64::from(self.grade_small)
            + u64::from(self.grade_cracked)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SaleProduct {
    EggCrates,
    EggSingles,
    ManureBags,
    ManureBulk,
    CulledBirds,
}

impl SaleProduct {
    pub fn is_eggs(&self) -> bool {
        matches!(self, SaleProduct::EggCrates | SaleProduct::EggSingles)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    MoMo,
    BankTransfer,
    Cash,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    Paid,
    PartPaid,
    Unpaid,
}

/// One sales line.
///
/// `quantity` is crates for egg products and units (bags, tons, birds) otherwise;
/// `singles` only applies to egg products. `unit_price` is per crate / per unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub timestamp: NaiveDateTime,
    pub invoice_id: String,
    pub customer_id: String,
    pub product: SaleProduct,
    pub quantity: u32,
    #[serde(default)]
    pub singles: u32,
    pub unit_price: f64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub evidence_ref: Option<String>,
    #[serde(default)]
    pub momo_verified: Option<bool>,
    #[serde(default)]
    pub dispatch_authorized_by: Option<String>,
    pub sold_by: String,
    #[serde(default)]
    pub cash_deposited_at: Option<NaiveDateTime>,
}

impl SaleRecord {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Eggs leaving stock on this line (0 for non-egg products).
    pub fn total_eggs(&self, crate_size: u32) -> u64 {
        if !self.product.is_eggs() {
            return 0;
        }
        u64::from(self.quantity) * u64::from(crate_size) + u64::from(self.singles)
    }

    /// Line total in farm currency. Singles are priced pro rata of a crate.
    pub fn line_total(&self, crate_size: u32) -> f64 {
        let units = if self.product.is_eggs() && crate_size > 0 {
            f64::from(self.quantity) + f64::from(self.singles) / f64::from(crate_size)
        } else {
            f64::from(self.quantity)
        };
        units * self.unit_price
    }

    /// True when a non-blank evidence reference is attached.
    pub fn has_evidence(&self) -> bool {
        self.evidence_ref
            .as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    /// Unpaid and part-paid lines stay on the customer's account in full.
    pub fn is_receivable(&self) -> bool {
        matches!(self.payment_status, PaymentStatus::PartPaid | PaymentStatus::Unpaid)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ApprovalStatus {
    NotRequired,
    Pending,
    Approved,
    Rejected,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcurementRecord {
    pub timestamp: NaiveDateTime,
    pub vendor_id: String,
    pub category: String,
    pub item: String,
    pub quantity: f64,
    pub unit_cost: f64,
    pub receipt_id: String,
    pub requested_by: String,
    pub approval_status: ApprovalStatus,
    #[serde(default)]
    pub approved_by: Option<String>,
    #[serde(default)]
    pub price_benchmark: Option<f64>,
}

impl ProcurementRecord {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn total_cost(&self) -> f64 {
        self.quantity * self.unit_cost
    }
}

/// Feed issued to one cohort in one feeding round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedRecord {
    pub date: NaiveDate,
    pub cohort_id: String,
    pub qty_issued_kg: f64,
    #[serde(default)]
    pub qty_returned_kg: f64,
}

impl FeedRecord {
    pub fn net_consumed_kg(&self) -> f64 {
        self.qty_issued_kg - self.qty_returned_kg
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    Culled,
    Disease,
    Injury,
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MortalityRecord {
    pub date: NaiveDate,
    pub housing_id: String,
    pub death_count: u32,
    pub cause: DeathCause,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CountTrigger {
    Scheduled,
    Random,
    Handover,
    Investigation,
    MonthlyIndependent,
}

/// One cycle-count line for one stock item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventoryCountRecord {
    pub date: NaiveDate,
    pub trigger: CountTrigger,
    pub item_id: String,
    pub expected_qty: f64,
    pub counted_qty: f64,
    #[serde(default)]
    pub reason_code: Option<String>,
}

/// End-of-day egg store entry: the physical count (only on count days) and
/// any explained adjustments (gifts, staff ration, spoilage write-off).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EggStockRecord {
    pub date: NaiveDate,
    #[serde(default)]
    pub physical_eggs: Option<u64>,
    #[serde(default)]
    pub other_adjustments: i64,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MedicationRecord {
    pub date: NaiveDate,
    pub cohort_id: String,
    pub product: String,
    pub withdrawal_days: u32,
}

impl MedicationRecord {
    /// Last day (inclusive) on which eggs from the treated cohort must not be sold.
    /// `None` when the product carries no withdrawal period.
    pub fn withdrawal_last_day(&self) -> Option<NaiveDate> {
        if self.withdrawal_days == 0 {
            return None;
        }
        self.date.checked_add_days(Days::new(u64::from(self.withdrawal_days)))
    }
}

/// Tagged log record as received from the input boundary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "domain", rename_all = "snake_case")]
pub enum DailyLogRecord {
    Production(ProductionRecord),
    Sale(SaleRecord),
    Procurement(ProcurementRecord),
    Feed(FeedRecord),
    Mortality(MortalityRecord),
    InventoryCount(InventoryCountRecord),
    EggStock(EggStockRecord),
    Medication(MedicationRecord),
}

impl DailyLogRecord {
    pub fn domain(&self) -> LogDomain {
        match self {
            DailyLogRecord::Production(_) => LogDomain::Production,
            DailyLogRecord::Sale(_) => LogDomain::Sales,
            DailyLogRecord::Procurement(_) => LogDomain::Procurement,
            DailyLogRecord::Feed(_) => LogDomain::Feed,
            DailyLogRecord::Mortality(_) => LogDomain::Mortality,
            DailyLogRecord::InventoryCount(_) => LogDomain::InventoryCount,
            DailyLogRecord::EggStock(_) => LogDomain::EggStock,
            DailyLogRecord::Medication(_) => LogDomain::Medication,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            DailyLogRecord::Production(r) => r.date,
            DailyLogRecord::Sale(r) => r.date(),
            DailyLogRecord::Procurement(r) => r.date(),
            DailyLogRecord::Feed(r) => r.date,
            DailyLogRecord::Mortality(r) => r.date,
            DailyLogRecord::InventoryCount(r) => r.date,
            DailyLogRecord::EggStock(r) => r.date,
            DailyLogRecord::Medication(r) => r.date,
        }
    }
}

/// Per-domain record streams, each in chronological order.
///
/// Sorting is stable, so records sharing a date keep their arrival order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LogStreams {
    pub production: Vec<ProductionRecord>,
    pub sales: Vec<SaleRecord>,
    pub procurement: Vec<ProcurementRecord>,
    pub feed: Vec<FeedRecord>,
    pub mortality: Vec<MortalityRecord>,
    pub inventory_counts: Vec<InventoryCountRecord>,
    pub egg_stock: Vec<EggStockRecord>,
    pub medication: Vec<MedicationRecord>,
}

impl LogStreams {
    pub fn from_records(records: impl IntoIterator<Item = DailyLogRecord>) -> Self {
        let mut s = LogStreams::default();
        for r in records {
            match r {
                DailyLogRecord::Production(x) => s.production.push(x),
                DailyLogRecord::Sale(x) => s.sales.push(x),
                DailyLogRecord::Procurement(x) => s.procurement.push(x),
                DailyLogRecord::Feed(x) => s.feed.push(x),
                DailyLogRecord::Mortality(x) => s.mortality.push(x),
                DailyLogRecord::InventoryCount(x) => s.inventory_counts.push(x),
                DailyLogRecord::EggStock(x) => s.egg_stock.push(x),
                DailyLogRecord::Medication(x) => s.medication.push(x),
            }
        }

        s.production.sort_by_key(|r| r.date);
        s.sales.sort_by_key(|r| r.timestamp);
        s.procurement.sort_by_key(|r| r.timestamp);
        s.feed.sort_by_key(|r| r.date);
        s.mortality.sort_by_key(|r| r.date);
        s.inventory_counts.sort_by_key(|r| r.date);
        s.egg_stock.sort_by_key(|r| r.date);
        s.medication.sort_by_key(|r| r.date);
        s
    }

    pub fn len(&self) -> usize {
        self.production.len()
            + self.sales.len()
            + self.procurement.len()
            + self.feed.len()
            + self.mortality.len()
            + self.inventory_counts.len()
            + self.egg_stock.len()
            + self.medication.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Group borrowed records by calendar date (deterministic BTreeMap ordering).
pub fn index_by_date<T>(items: &[T], date_of: impl Fn(&T) -> NaiveDate) -> BTreeMap<NaiveDate, Vec<&T>> {
    let mut out: BTreeMap<NaiveDate, Vec<&T>> = BTreeMap::new();
    for it in items {
        out.entry(date_of(it)).or_default().push(it);
    }
    out
}

/// Inclusive chronological date range `[start, end]`. Empty when `end < start`.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}
