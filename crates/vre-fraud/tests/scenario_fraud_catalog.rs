use chrono::NaiveDate;
use vre_config::VreConfig;
use vre_fraud::*;
use vre_reconcile::ReconWindow;
use vre_schemas::*;
use vre_targets::{CurveTable, OverrideResolver, TargetBook, TargetResolver};
use vre_testkit::{
    at, base_config, cohort, count, day, deaths, feed, lohmann_brown_curve, medication, procurement_record, production,
    sale_record,
};

struct Fixture {
    cfg: VreConfig,
    cohorts: Vec<Cohort>,
    targets: TargetBook,
    streams: LogStreams,
    window: ReconWindow,
    customers: Vec<Customer>,
}

impl Fixture {
    fn new(cohorts: Vec<Cohort>, records: Vec<DailyLogRecord>, start: NaiveDate, end: NaiveDate) -> Self {
        let cfg = base_config().unwrap();
        let curves = CurveTable::from_points(lohmann_brown_curve()).unwrap();
        let overrides = OverrideResolver::default();
        let resolver = TargetResolver::new(&cfg.targets, &curves, &overrides);
        let targets = TargetBook::build(&resolver, &cohorts, start, end);
        Self {
            cfg,
            cohorts,
            targets,
            streams: LogStreams::from_records(records),
            window: ReconWindow::new(start, end),
            customers: vec![],
        }
    }

    fn flags(&self) -> Vec<FraudFlag> {
        evaluate(&RuleContext {
            cfg: &self.cfg,
            window: self.window,
            streams: &self.streams,
            cohorts: &self.cohorts,
            targets: &self.targets,
            opening_eggs: 10_000,
            customers: &self.customers,
        })
    }
}

fn of_rule<'a>(flags: &'a [FraudFlag], rule_id: &str) -> Vec<&'a FraudFlag> {
    flags.iter().filter(|f| f.rule_id == rule_id).collect()
}

#[test]
fn scenario_duplicate_invoice_flagged_regardless_of_amount_or_date() {
    let d1 = day(2025, 3, 1);
    let d5 = day(2025, 3, 5);
    let records = vec![
        DailyLogRecord::Sale(sale_record(at(d1, 9, 0), "INV-7", 10, 45.0, PaymentMethod::BankTransfer)),
        DailyLogRecord::Sale(sale_record(at(d5, 15, 30), "INV-7", 2, 44.0, PaymentMethod::BankTransfer)),
        DailyLogRecord::Sale(sale_record(at(d5, 16, 0), "INV-8", 2, 45.0, PaymentMethod::BankTransfer)),
        DailyLogRecord::Procurement(procurement_record(at(d1, 8, 0), "RCP-1", "Maize", 10.0, 5.5)),
        DailyLogRecord::Procurement(procurement_record(at(d5, 8, 0), "RCP-1", "Soya", 1.0, 12.0)),
    ];
    let fx = Fixture::new(vec![], records, d1, d5);
    let flags = fx.flags();

    let dup = of_rule(&flags, "F1");
    assert_eq!(dup.len(), 2);
    assert_eq!(dup[0].subject, "invoice:INV-7");
    assert_eq!(dup[0].date_detected, d5);
    assert_eq!(dup[0].severity, Severity::Red);
    assert_eq!(dup[0].status, FlagStatus::Open);
    assert_eq!(dup[0].flag_id, flag_id("F1", "invoice:INV-7"));
    assert_eq!(dup[1].subject, "receipt:RCP-1");
    assert_eq!(dup[1].sources, vec![LogDomain::Sales, LogDomain::Procurement]);
}

#[test]
fn scenario_sales_and_cash_controls() {
    let d1 = day(2025, 3, 1);
    let d2 = day(2025, 3, 2);

    let mut no_evidence = sale_record(at(d1, 9, 0), "INV-1", 5, 45.0, PaymentMethod::BankTransfer);
    no_evidence.evidence_ref = Some("  ".into());
    let mut unverified = sale_record(at(d1, 10, 0), "INV-2", 5, 45.0, PaymentMethod::MoMo);
    unverified.momo_verified = None;
    let overpriced = sale_record(at(d1, 11, 0), "INV-3", 5, 60.0, PaymentMethod::BankTransfer);
    let within_tolerance = sale_record(at(d1, 11, 30), "INV-4", 5, 50.0, PaymentMethod::BankTransfer);
    let mut undispatched = sale_record(at(d1, 12, 0), "INV-5", 5, 45.0, PaymentMethod::BankTransfer);
    undispatched.dispatch_authorized_by = None;
    let mut undeposited = sale_record(at(d1, 13, 0), "INV-6", 5, 45.0, PaymentMethod::Cash);
    undeposited.cash_deposited_at = None;
    let mut late = sale_record(at(d1, 14, 0), "INV-7", 5, 45.0, PaymentMethod::Cash);
    late.cash_deposited_at = Some(at(d2, 15, 0));

    let records: Vec<DailyLogRecord> = [no_evidence, unverified, overpriced, within_tolerance, undispatched, undeposited, late]
        .into_iter()
        .map(DailyLogRecord::Sale)
        .collect();

    let subjects = |flags: &[FraudFlag], rule: &str| -> Vec<String> {
        of_rule(flags, rule).iter().map(|f| f.subject.clone()).collect()
    };

    // one-day window: the undeposited sale's 24h deadline has not passed yet
    let fx = Fixture::new(vec![], records.clone(), d1, d1);
    let flags = fx.flags();
    assert_eq!(subjects(&flags, "F2"), vec!["invoice:INV-1"]);
    assert_eq!(subjects(&flags, "F3"), vec!["invoice:INV-3"]);
    assert_eq!(subjects(&flags, "F8"), vec!["invoice:INV-7"]);
    assert_eq!(subjects(&flags, "F9"), vec!["invoice:INV-2"]);
    assert_eq!(subjects(&flags, "F13"), vec!["invoice:INV-5"]);

    let fx = Fixture::new(vec![], records, d1, d2);
    let flags = fx.flags();
    assert_eq!(subjects(&flags, "F8"), vec!["invoice:INV-6", "invoice:INV-7"]);
}

#[test]
fn scenario_procurement_controls() {
    let d1 = day(2025, 3, 1);

    let mut pricey = procurement_record(at(d1, 8, 0), "RCP-1", "Soya", 10.0, 12.0);
    pricey.price_benchmark = Some(10.0);
    let mut unapproved = procurement_record(at(d1, 9, 0), "RCP-2", "Maize", 200.0, 5.5);
    unapproved.approval_status = ApprovalStatus::Pending;
    unapproved.approved_by = None;
    let mut self_approved = procurement_record(at(d1, 10, 0), "RCP-3", "Premix", 1.0, 60.0);
    self_approved.approved_by = Some(" Stores-Keeper ".into());
    let small_pending = {
        let mut p = procurement_record(at(d1, 11, 0), "RCP-4", "Salt", 10.0, 1.5);
        p.approval_status = ApprovalStatus::Pending;
        p
    };

    let records = [pricey, unapproved, self_approved, small_pending]
        .into_iter()
        .map(DailyLogRecord::Procurement)
        .collect();
    let fx = Fixture::new(vec![], records, d1, d1);
    let flags = fx.flags();

    let subjects = |rule: &str| -> Vec<String> { of_rule(&flags, rule).iter().map(|f| f.subject.clone()).collect() };
    assert_eq!(subjects("F4"), vec!["receipt:RCP-1"]);
    assert_eq!(subjects("F7"), vec!["receipt:RCP-2"]);
    assert_eq!(subjects("F15"), vec!["receipt:RCP-3"]);
}

#[test]
fn scenario_sold_exceeds_available_and_breakage() {
    let start = day(2025, 3, 1);
    let d4 = day(2025, 3, 4);
    let mut records = Vec::new();
    for d in start.iter_days().take(3) {
        records.push(production(d, "H01-A", 100, 0, 30));
    }
    records.push(production(d4, "H01-A", 100, 0, 90));

    let fx = Fixture::new(vec![], records.clone(), start, d4);
    let breakage = of_rule(&fx.flags(), "F6").into_iter().cloned().collect::<Vec<_>>();
    assert_eq!(breakage.len(), 1);
    assert_eq!(breakage[0].date_detected, d4);
    assert_eq!(breakage[0].subject, "breakage:2025-03-04");

    // 10_000 opening + 3000 produced on day one, 13_020 sold
    records.push(DailyLogRecord::Sale(sale_record(at(start, 17, 0), "INV-1", 434, 45.0, PaymentMethod::BankTransfer)));
    let fx = Fixture::new(vec![], records, start, d4);
    let flags = fx.flags();
    let oversold = of_rule(&flags, "F5");
    assert_eq!(oversold.len(), 1);
    assert_eq!(oversold[0].date_detected, start);
}

#[test]
fn scenario_flock_feed_and_inventory_heuristics() {
    let arrival = day(2025, 1, 1);
    let start = day(2025, 3, 1);
    let end = day(2025, 3, 10);
    let cohorts = vec![
        cohort("FL2024A", arrival, 22, 2000, &["H01-A"]),
        cohort("FL2024B", arrival, 22, 2500, &["H02-A"]),
    ];

    let mut records = Vec::new();
    // FL2024A: one death a day, then a spike of five on 8 March
    for d in start.iter_days().take(7) {
        records.push(deaths(d, "H01-A", 1, DeathCause::Disease));
    }
    records.push(deaths(day(2025, 3, 8), "H01-A", 5, DeathCause::Unknown));
    // FL2024B reports no deaths at all; both flocks (4500 birds) eat about 530 kg a day
    records.push(feed(start, "FL2024A", 700.0, 0.0));
    for (i, d) in start.iter_days().step_by(2).take(4).enumerate() {
        let counted = if i == 2 { 99.0 } else { 101.0 };
        records.push(count(d, "ING001", 100.0, counted, None));
    }
    for d in start.iter_days().take(3) {
        records.push(count(d, "ING002", 50.0, 51.0, None));
    }

    let fx = Fixture::new(cohorts, records, start, end);
    let flags = fx.flags();

    let spikes = of_rule(&flags, "F10");
    assert_eq!(spikes.len(), 1);
    assert_eq!(spikes[0].subject, "FL2024A:2025-03-08");

    let shrink = of_rule(&flags, "F11");
    assert_eq!(shrink.len(), 1);
    assert_eq!(shrink[0].date_detected, start);

    // ING001 streak is broken by the third count; ING002 reaches three
    let positive = of_rule(&flags, "F16");
    assert_eq!(positive.len(), 1);
    assert_eq!(positive[0].subject, "item:ING002");
    assert_eq!(positive[0].date_detected, day(2025, 3, 3));

    let zero = of_rule(&flags, "F18");
    assert_eq!(zero.len(), 1);
    assert_eq!(zero[0].subject, "cohort:FL2024B");
    assert_eq!(zero[0].date_detected, day(2025, 3, 7));
}

#[test]
fn scenario_credit_overrun_on_running_unpaid_balance() {
    let before = day(2025, 2, 25);
    let d1 = day(2025, 3, 1);
    let d2 = day(2025, 3, 2);
    let end = day(2025, 3, 3);
    let on_account = |ts, invoice: &str, customer: &str, crates, status| {
        let mut s = sale_record(ts, invoice, crates, 45.0, PaymentMethod::BankTransfer);
        s.customer_id = customer.to_string();
        s.payment_status = status;
        DailyLogRecord::Sale(s)
    };
    let records = vec![
        // C002: 1350 carried in, +1350 on 1 March stays inside 3000, +450 on 2 March tips it over
        on_account(at(before, 9, 0), "INV-1", "C002", 30, PaymentStatus::Unpaid),
        on_account(at(d1, 9, 0), "INV-2", "C002", 30, PaymentStatus::PartPaid),
        on_account(at(d2, 9, 0), "INV-3", "C002", 10, PaymentStatus::Unpaid),
        on_account(at(end, 9, 0), "INV-4", "C002", 1, PaymentStatus::Unpaid),
        // paid lines never count
        on_account(at(d1, 10, 0), "INV-5", "C009", 500, PaymentStatus::Paid),
        // walk-in has no credit at all
        on_account(at(d2, 10, 0), "INV-6", "C014", 1, PaymentStatus::Unpaid),
        // not in the customer table
        on_account(at(d2, 11, 0), "INV-7", "C999", 1000, PaymentStatus::Unpaid),
    ];
    let mut fx = Fixture::new(vec![], records, d1, end);
    let customer = |id: &str, allowed: bool, limit: f64| Customer {
        customer_id: id.to_string(),
        name: String::new(),
        credit_allowed: allowed,
        credit_limit: limit,
    };
    fx.customers = vec![
        customer("C002", true, 3000.0),
        customer("C009", true, 10_000.0),
        customer("C014", false, 0.0),
    ];

    let flags = fx.flags();
    let overruns = of_rule(&flags, "F14");
    assert_eq!(overruns.len(), 2);
    assert_eq!(overruns[0].subject, "customer:C002");
    assert_eq!(overruns[0].date_detected, d2);
    assert_eq!(overruns[0].severity, Severity::Yellow);
    assert_eq!(overruns[1].subject, "customer:C014");
    assert!(overruns[0].evidence.contains("INV-3"));
}

#[test]
fn scenario_withdrawal_period_violation() {
    let d1 = day(2025, 3, 1);
    let end = day(2025, 3, 10);
    let records = vec![
        medication(d1, "FL2024A", "Tylosin", 5),
        medication(d1, "FL2024A", "Vitamins", 0),
        DailyLogRecord::Sale(sale_record(at(day(2025, 3, 3), 9, 0), "INV-1", 5, 45.0, PaymentMethod::BankTransfer)),
        DailyLogRecord::Sale(sale_record(at(day(2025, 3, 8), 9, 0), "INV-2", 5, 45.0, PaymentMethod::BankTransfer)),
    ];
    let fx = Fixture::new(vec![], records, d1, end);
    let flags = fx.flags();
    let hits = of_rule(&flags, "F17");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].subject, "FL2024A:INV-1");
}

#[test]
fn scenario_carry_forward_keeps_human_status() {
    let d1 = day(2025, 3, 1);
    let d2 = day(2025, 3, 2);
    let records = vec![
        DailyLogRecord::Sale(sale_record(at(d1, 9, 0), "INV-7", 10, 45.0, PaymentMethod::BankTransfer)),
        DailyLogRecord::Sale(sale_record(at(d2, 9, 0), "INV-7", 2, 45.0, PaymentMethod::BankTransfer)),
    ];
    let fx = Fixture::new(vec![], records, d1, d2);
    let fresh = fx.flags();
    assert_eq!(fresh, fx.flags());
    assert_eq!(fresh.len(), 1);

    let mut prior = fresh.clone();
    prior[0].status = FlagStatus::FalsePositive;
    prior[0].resolution = Some(Resolution {
        by: "auditor".into(),
        on: d2,
        notes: "re-issued invoice".into(),
    });
    let mut stale = prior[0].clone();
    stale.rule_id = "F2".into();
    stale.subject = "invoice:INV-1".into();
    stale.flag_id = flag_id("F2", "invoice:INV-1");
    stale.status = FlagStatus::Investigating;
    stale.resolution = None;
    prior.push(stale.clone());

    let merged = carry_forward(fresh, &prior);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].status, FlagStatus::FalsePositive);
    assert_eq!(merged[0].resolution.as_ref().map(|r| r.by.as_str()), Some("auditor"));
    // not re-detected, still carried
    assert_eq!(merged[1], stale);
}
