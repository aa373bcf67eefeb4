use chrono::NaiveDate;
use vre_ghost::*;
use vre_reconcile::*;
use vre_schemas::*;
use vre_testkit::{base_config, day, items, production};

fn feed(date: NaiveDate, variance_kg: f64) -> FeedReconRecord {
    FeedReconRecord {
        date,
        issued_kg: 0.0,
        returned_kg: 0.0,
        consumed_kg: 0.0,
        expected_kg: 0.0,
        birds: 0,
        variance_kg,
        variance_bags: variance_kg / 50.0,
        status: Status::Green,
    }
}

fn flock(date: NaiveDate, opening: u32, variance: f64) -> MortalityReconRecord {
    MortalityReconRecord {
        cohort_id: "FL2024A".into(),
        date,
        opening_flock: opening,
        deaths: 0,
        culls: 0,
        live_sales: 0,
        live_sales_complete: false,
        expected_closing: opening,
        mortality_rate: 0.0,
        target_daily_rate: 0.0,
        variance,
        zero_death_streak: 0,
        improbable_zero_mortality: false,
        status: Status::Green,
    }
}

fn egg(date: NaiveDate, variance_crates: Variance) -> EggReconRecord {
    EggReconRecord {
        date,
        opening_eggs: 0,
        produced_eggs: 0,
        sold_eggs: 0,
        cracked_eggs: 0,
        adjustments: 0,
        expected_closing_eggs: 0,
        closing_eggs: 0,
        physical_eggs: None,
        variance_eggs: variance_crates.map(|v| v * 30.0),
        variance_crates,
        status: Status::Green,
    }
}

fn cash(date: NaiveDate, variance: f64) -> CashReconRecord {
    CashReconRecord {
        date,
        revenue: variance.max(0.0),
        received_momo: 0.0,
        received_bank: 0.0,
        received_cash: 0.0,
        total_received: 0.0,
        variance,
        paid_count: 0,
        paid_with_evidence: 0,
        evidence_completeness: 0.0,
        outstanding_receivables: 0.0,
        cash_pending_deposit: 0.0,
        status: Status::Green,
    }
}

fn counted(date: NaiveDate, item: &str, variance: f64) -> InventoryReconRecord {
    InventoryReconRecord {
        date,
        item_id: item.into(),
        trigger: CountTrigger::Scheduled,
        expected_qty: 100.0,
        counted_qty: 100.0 + variance,
        variance,
        variance_pct: variance / 100.0,
        status: Status::Green,
        reason_code: None,
        reason_missing: false,
    }
}

#[test]
fn scenario_favourable_variances_never_offset_losses() {
    let cfg = base_config().unwrap();
    let d = day(2025, 3, 1);
    let eggs = [egg(d, Variance::Measured(3.0))];
    let cash_r = [cash(d, -10.0)];
    let feed_r = [feed(d, -50.0)];
    let flocks = [flock(d, 2000, -0.0001)];
    let inv = [counted(d, "ING001", 5.0)];
    let items = items();

    let out = aggregate_ghost_money(
        &cfg,
        &GhostInputs {
            window: ReconWindow::new(d, d),
            eggs: &eggs,
            cash: &cash_r,
            feed: &feed_r,
            mortality: &flocks,
            inventory: &inv,
            production: &[],
            items: &items,
        },
    );

    assert_eq!(out.len(), 1);
    assert!(out[0].components.iter().all(|c| c.amount_micros == 0));
    assert_eq!(out[0].daily_total_micros, 0);
    assert_eq!(out[0].overall_status, Status::Green);
}

#[test]
fn scenario_loss_components_and_cumulative_monotonicity() {
    let cfg = base_config().unwrap();
    let start = day(2025, 3, 1);
    let end = day(2025, 3, 7);
    let days: Vec<NaiveDate> = start.iter_days().take(7).collect();

    // losses on days 1..=5, nothing on days 6 and 7
    let lossy = &days[..5];
    let eggs: Vec<_> = lossy.iter().map(|d| egg(*d, Variance::Measured(-2.0))).collect();
    let cash_r: Vec<_> = lossy.iter().map(|d| cash(*d, 50.0)).collect();
    let feed_r: Vec<_> = lossy.iter().map(|d| feed(*d, 20.0)).collect();
    let flocks: Vec<_> = lossy.iter().map(|d| flock(*d, 2000, 0.001)).collect();
    let mut inv: Vec<_> = lossy.iter().map(|d| counted(*d, "ING001", -10.0)).collect();
    inv.extend(lossy.iter().map(|d| counted(*d, "SPARE-UNKNOWN", -2.0)));
    let prod: Vec<ProductionRecord> = LogStreams::from_records(lossy.iter().map(|d| production(*d, "H01-A", 100, 0, 100)))
        .production;
    let items = items();

    let out = aggregate_ghost_money(
        &cfg,
        &GhostInputs {
            window: ReconWindow::new(start, end),
            eggs: &eggs,
            cash: &cash_r,
            feed: &feed_r,
            mortality: &flocks,
            inventory: &inv,
            production: &prod,
            items: &items,
        },
    );
    assert_eq!(out.len(), 7);

    let first = &out[0];
    let amount = |c: GhostCategory| first.component(c).unwrap().amount_micros;
    assert_eq!(amount(GhostCategory::FeedShrinkage), 130_000_000);
    assert_eq!(amount(GhostCategory::MortalityOverTarget), 110_000_000);
    assert_eq!(amount(GhostCategory::EggVarianceLoss), 90_000_000);
    assert_eq!(amount(GhostCategory::CrackedDamaged), 37_500_000);
    assert_eq!(amount(GhostCategory::CashDiscrepancy), 50_000_000);
    // 10 x 5.5 for the known item, 2 x default 10.0 for the unknown one
    assert_eq!(amount(GhostCategory::InventoryShrinkage), 75_000_000);
    assert_eq!(first.daily_total_micros, 492_500_000);
    assert_eq!(first.daily_status, Status::Yellow);
    assert_eq!(first.cumulative_status, Status::Green);
    assert_eq!(first.overall_status, Status::Yellow);

    // placeholders are present and labelled incomplete
    for cat in [GhostCategory::PriceArbitrageMissed, GhostCategory::InventoryCarrying] {
        let c = first.component(cat).unwrap();
        assert_eq!(c.amount_micros, 0);
        assert!(!c.complete);
    }

    for w in out.windows(2) {
        assert!(w[1].cumulative_total_micros >= w[0].cumulative_total_micros);
        assert_eq!(w[1].cumulative_total_micros, w[0].cumulative_total_micros + w[1].daily_total_micros);
    }

    // 5 x 492.5 = 2462.5 crosses the cumulative yellow line on day 5 and stays there
    assert_eq!(out[4].cumulative_total_micros, 2_462_500_000);
    assert_eq!(out[4].cumulative_status, Status::Yellow);
    assert_eq!(out[6].daily_total_micros, 0);
    assert_eq!(out[6].daily_status, Status::Green);
    assert_eq!(out[6].overall_status, Status::Yellow);
}
