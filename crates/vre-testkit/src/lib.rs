//! vre-testkit
//!
//! Shared fixtures for scenario tests: the Lohmann Brown reference curve,
//! the base config, and terse builders for cohorts and log records.
//! Fixture constructors panic on impossible literals (bad calendar dates);
//! loaders return `anyhow::Result`.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use vre_config::{load_layered_yaml_from_strings, LoadedConfig, VreConfig};
use vre_schemas::*;

mod curve;

pub use curve::{lohmann_brown_curve, LOHMANN_BROWN};

pub const BASE_CONFIG_YAML: &str = include_str!("../../../config/vre_base.yaml");

pub fn base_loaded_config() -> Result<LoadedConfig> {
    load_layered_yaml_from_strings(&[BASE_CONFIG_YAML])
}

pub fn base_config() -> Result<VreConfig> {
    base_loaded_config()?.typed()
}

/// Base config with one YAML overlay applied on top.
pub fn config_with(overlay: &str) -> Result<VreConfig> {
    load_layered_yaml_from_strings(&[BASE_CONFIG_YAML, overlay])?.typed()
}

pub fn load_records_json(path: &str) -> Result<Vec<DailyLogRecord>> {
    let s = fs::read_to_string(path).with_context(|| format!("read records: {path}"))?;
    serde_json::from_str(&s).context("parse records json")
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("fixture date must be a real calendar date")
}

pub fn at(date: NaiveDate, h: u32, min: u32) -> NaiveDateTime {
    date.and_hms_opt(h, min, 0).expect("fixture time must be valid")
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

pub fn cohort(id: &str, arrival: NaiveDate, arrival_age_weeks: u32, birds: u32, houses: &[&str]) -> Cohort {
    Cohort {
        cohort_id: id.to_string(),
        breed: LOHMANN_BROWN.to_string(),
        arrival_date: arrival,
        arrival_age_weeks,
        initial_count: birds,
        status: CohortStatus::Active,
        housing_units: houses.iter().map(|h| h.to_string()).collect(),
    }
}

pub fn items() -> Vec<Item> {
    let item = |id: &str, name: &str, class: RiskClass, cost: f64| Item {
        item_id: id.to_string(),
        name: name.to_string(),
        risk_class: class,
        unit_cost: cost,
    };
    vec![
        item("ING001", "Maize (yellow corn)", RiskClass::A, 5.5),
        item("ING002", "Soya bean meal", RiskClass::A, 12.0),
        item("ING003", "Wheat bran", RiskClass::B, 3.8),
        item("ING008", "Salt", RiskClass::C, 1.5),
        item("MED003", "Oxytetracycline powder", RiskClass::B, 60.0),
    ]
}

/// Cohort-specific lay override (weeks 45..=60) and breed-wide feed-intake override (weeks 25..=80).
pub fn sample_overrides(cohort_id: &str) -> Vec<OverrideRule> {
    vec![
        OverrideRule {
            override_id: 1,
            scope: OverrideScope::CohortSpecific {
                cohort_id: cohort_id.to_string(),
            },
            metric: TargetMetric::LayRate,
            start_week: 45,
            end_week: 60,
            value: 0.88,
            min_band: Some(0.85),
            max_band: Some(0.92),
            reason: "Heat stress season adjustment".to_string(),
            set_by: "farm-manager".to_string(),
            set_date: day(2025, 1, 1),
        },
        OverrideRule {
            override_id: 2,
            scope: OverrideScope::BreedWide {
                breed: LOHMANN_BROWN.to_string(),
            },
            metric: TargetMetric::FeedIntake,
            start_week: 25,
            end_week: 80,
            value: 120.0,
            min_band: None,
            max_band: None,
            reason: "Open-house climate uplift".to_string(),
            set_by: "nutritionist".to_string(),
            set_date: day(2025, 1, 1),
        },
    ]
}

// ---------------------------------------------------------------------------
// Log record builders
// ---------------------------------------------------------------------------

/// All collected eggs graded large except `cracked`.
pub fn production(date: NaiveDate, housing: &str, crates: u32, singles: u32, cracked: u32) -> DailyLogRecord {
    let total = crates * 30 + singles;
    DailyLogRecord::Production(ProductionRecord {
        date,
        housing_id: housing.to_string(),
        crates_collected: crates,
        singles_collected: singles,
        grade_large: total.saturating_sub(cracked),
        grade_medium: 0,
        grade_small: 0,
        grade_cracked: cracked,
    })
}

/// A fully documented, paid egg-crate sale.
pub fn sale_record(ts: NaiveDateTime, invoice: &str, crates: u32, unit_price: f64, method: PaymentMethod) -> SaleRecord {
    SaleRecord {
        timestamp: ts,
        invoice_id: invoice.to_string(),
        customer_id: "C001".to_string(),
        product: SaleProduct::EggCrates,
        quantity: crates,
        singles: 0,
        unit_price,
        payment_method: method,
        payment_status: PaymentStatus::Paid,
        evidence_ref: Some(format!("EV-{invoice}")),
        momo_verified: (method == PaymentMethod::MoMo).then_some(true),
        dispatch_authorized_by: Some("stores-controller".to_string()),
        sold_by: "sales-1".to_string(),
        cash_deposited_at: (method == PaymentMethod::Cash).then_some(ts),
    }
}

pub fn sale(ts: NaiveDateTime, invoice: &str, crates: u32, unit_price: f64, method: PaymentMethod) -> DailyLogRecord {
    DailyLogRecord::Sale(sale_record(ts, invoice, crates, unit_price, method))
}

/// Approved procurement at a benchmark-matching price.
pub fn procurement_record(ts: NaiveDateTime, receipt: &str, item: &str, qty: f64, unit_cost: f64) -> ProcurementRecord {
    ProcurementRecord {
        timestamp: ts,
        vendor_id: "V001".to_string(),
        category: "Feed ingredients".to_string(),
        item: item.to_string(),
        quantity: qty,
        unit_cost,
        receipt_id: receipt.to_string(),
        requested_by: "stores-keeper".to_string(),
        approval_status: ApprovalStatus::Approved,
        approved_by: Some("farm-manager".to_string()),
        price_benchmark: Some(unit_cost),
    }
}

pub fn procurement(ts: NaiveDateTime, receipt: &str, item: &str, qty: f64, unit_cost: f64) -> DailyLogRecord {
    DailyLogRecord::Procurement(procurement_record(ts, receipt, item, qty, unit_cost))
}

pub fn feed(date: NaiveDate, cohort_id: &str, issued_kg: f64, returned_kg: f64) -> DailyLogRecord {
    DailyLogRecord::Feed(FeedRecord {
        date,
        cohort_id: cohort_id.to_string(),
        qty_issued_kg: issued_kg,
        qty_returned_kg: returned_kg,
    })
}

pub fn deaths(date: NaiveDate, housing: &str, n: u32, cause: DeathCause) -> DailyLogRecord {
    DailyLogRecord::Mortality(MortalityRecord {
        date,
        housing_id: housing.to_string(),
        death_count: n,
        cause,
    })
}

pub fn count(date: NaiveDate, item: &str, expected: f64, counted: f64, reason: Option<&str>) -> DailyLogRecord {
    DailyLogRecord::InventoryCount(InventoryCountRecord {
        date,
        trigger: CountTrigger::Scheduled,
        item_id: item.to_string(),
        expected_qty: expected,
        counted_qty: counted,
        reason_code: reason.map(str::to_string),
    })
}

pub fn egg_stock(date: NaiveDate, physical: Option<u64>, adjustments: i64) -> DailyLogRecord {
    DailyLogRecord::EggStock(EggStockRecord {
        date,
        physical_eggs: physical,
        other_adjustments: adjustments,
        explanation: (adjustments != 0).then(|| "staff ration".to_string()),
    })
}

pub fn medication(date: NaiveDate, cohort_id: &str, product: &str, withdrawal_days: u32) -> DailyLogRecord {
    DailyLogRecord::Medication(MedicationRecord {
        date,
        cohort_id: cohort_id.to_string(),
        product: product.to_string(),
        withdrawal_days,
    })
}
