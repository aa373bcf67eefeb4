use vre_reconcile::*;
use vre_schemas::*;
use vre_testkit::{at, base_config, day, egg_stock, production, sale_record};

#[test]
fn scenario_egg_worked_example_count_day_variance() {
    let cfg = base_config().unwrap();
    let d1 = day(2025, 3, 1);
    let d2 = day(2025, 3, 2);

    let records = vec![
        production(d1, "H01-A", 50, 0, 50),
        DailyLogRecord::Sale(sale_record(at(d1, 10, 0), "INV-1", 40, 45.0, PaymentMethod::MoMo)),
        egg_stock(d1, Some(1245), 0),
        production(d2, "H01-A", 48, 10, 20),
    ];
    let streams = LogStreams::from_records(records);
    let out = reconcile_eggs(&cfg, &ReconWindow::new(d1, d2), 1000, &streams);

    assert_eq!(out.len(), 2);
    let r = &out[0];
    assert_eq!(r.opening_eggs, 1000);
    assert_eq!(r.produced_eggs, 1500);
    assert_eq!(r.sold_eggs, 1200);
    assert_eq!(r.cracked_eggs, 50);
    assert_eq!(r.expected_closing_eggs, 1250);
    assert_eq!(r.closing_eggs, 1250);
    assert_eq!(r.variance_eggs, Variance::Measured(-5.0));
    assert!((r.variance_crates.value().unwrap() + 5.0 / 30.0).abs() < 1e-12);
    assert_eq!(r.status, Status::Green);

    // no physical count on day two: variance is not applicable, not zero
    let r2 = &out[1];
    assert_eq!(r2.variance_eggs, Variance::NotApplicable);
    assert_eq!(r2.variance_crates, Variance::NotApplicable);
    assert_eq!(r2.opening_eggs, 1250);
    assert_eq!(r2.expected_closing_eggs, 1250 + 1450 - 20);
}

#[test]
fn scenario_egg_balance_chain_invariant_and_adjustments() {
    let cfg = base_config().unwrap();
    let start = day(2025, 3, 1);
    let end = day(2025, 3, 10);

    let mut records = Vec::new();
    for (i, d) in start.iter_days().take(10).enumerate() {
        records.push(production(d, "H01-A", 70, i as u32, 5));
        records.push(DailyLogRecord::Sale(sale_record(
            at(d, 12, 0),
            &format!("INV-{i}"),
            65,
            45.0,
            PaymentMethod::Cash,
        )));
    }
    // explained staff ration of 30 eggs and a count showing 3 crates short
    records.push(egg_stock(day(2025, 3, 4), None, 30));
    records.push(egg_stock(day(2025, 3, 6), Some(0), 0));

    let streams = LogStreams::from_records(records);
    let out = reconcile_eggs(&cfg, &ReconWindow::new(start, end), 500, &streams);

    assert_eq!(out.len(), 10);
    assert_eq!(out[0].opening_eggs, 500);
    for w in out.windows(2) {
        assert_eq!(w[1].opening_eggs, w[0].closing_eggs);
    }
    assert_eq!(out[3].adjustments, 30);

    let count_day = &out[5];
    let expected = count_day.expected_closing_eggs as f64;
    assert_eq!(count_day.variance_eggs, Variance::Measured(-expected));
    assert_eq!(count_day.status, Status::Red);
    // the count does not reset the carried balance
    assert_eq!(out[6].opening_eggs, count_day.expected_closing_eggs);
}

#[test]
fn scenario_cash_revenue_vs_payments() {
    let cfg = base_config().unwrap();
    let d1 = day(2025, 3, 1);
    let d2 = day(2025, 3, 2);

    let momo = sale_record(at(d1, 9, 0), "INV-1", 10, 45.0, PaymentMethod::MoMo);
    let mut cash = sale_record(at(d1, 11, 0), "INV-2", 5, 45.0, PaymentMethod::Cash);
    cash.cash_deposited_at = None;
    let mut credit = sale_record(at(d1, 15, 0), "INV-3", 2, 45.0, PaymentMethod::BankTransfer);
    credit.payment_status = PaymentStatus::Unpaid;
    credit.evidence_ref = None;

    let streams = LogStreams::from_records(vec![
        DailyLogRecord::Sale(momo),
        DailyLogRecord::Sale(cash),
        DailyLogRecord::Sale(credit),
    ]);
    let out = reconcile_cash(&cfg, &ReconWindow::new(d1, d2), &streams);

    let r = &out[0];
    assert!((r.revenue - 765.0).abs() < 1e-9);
    assert!((r.received_momo - 450.0).abs() < 1e-9);
    assert!((r.received_cash - 225.0).abs() < 1e-9);
    assert_eq!(r.received_bank, 0.0);
    assert!((r.variance - 90.0).abs() < 1e-9);
    assert_eq!(r.status, Status::Yellow);
    assert_eq!(r.paid_count, 2);
    assert_eq!(r.evidence_completeness, 1.0);
    assert!((r.cash_pending_deposit - 225.0).abs() < 1e-9);
    assert!((r.outstanding_receivables - 90.0).abs() < 1e-9);

    // quiet day: no paid transactions means completeness 0, receivables carry
    let r2 = &out[1];
    assert_eq!(r2.revenue, 0.0);
    assert_eq!(r2.evidence_completeness, 0.0);
    assert!((r2.outstanding_receivables - 90.0).abs() < 1e-9);
    assert_eq!(r2.status, Status::Green);
}

#[test]
fn scenario_receivables_open_at_the_pre_window_ledger_balance() {
    let cfg = base_config().unwrap();
    let before = day(2025, 2, 20);
    let d1 = day(2025, 3, 1);
    let d2 = day(2025, 3, 2);

    let mut old_credit = sale_record(at(before, 10, 0), "INV-0", 4, 45.0, PaymentMethod::BankTransfer);
    old_credit.payment_status = PaymentStatus::PartPaid;
    let old_paid = sale_record(at(before, 11, 0), "INV-00", 9, 45.0, PaymentMethod::MoMo);
    let mut credit = sale_record(at(d2, 15, 0), "INV-3", 2, 45.0, PaymentMethod::BankTransfer);
    credit.payment_status = PaymentStatus::Unpaid;

    let streams = LogStreams::from_records(vec![
        DailyLogRecord::Sale(old_credit),
        DailyLogRecord::Sale(old_paid),
        DailyLogRecord::Sale(credit),
    ]);
    let out = reconcile_cash(&cfg, &ReconWindow::new(d1, d2), &streams);
    assert_eq!(out.len(), 2);
    assert!((out[0].outstanding_receivables - 180.0).abs() < 1e-9);
    assert_eq!(out[0].revenue, 0.0);
    assert!((out[1].outstanding_receivables - 270.0).abs() < 1e-9);

    // a later window start sees the same ledger
    let late = reconcile_cash(&cfg, &ReconWindow::new(d2, d2), &streams);
    assert!((late[0].outstanding_receivables - 270.0).abs() < 1e-9);
}
