use std::collections::BTreeMap;

use chrono::{Days, Duration, NaiveDate, NaiveTime};
use vre_reconcile::{reconcile_eggs, reconcile_feed, reconcile_mortality};
use vre_schemas::{ApprovalStatus, Customer, LogDomain, PaymentMethod, ProcurementRecord, SaleRecord};

use crate::{DetectionType as D, FraudCategory as C, FraudRule, Finding, RuleContext, Severity as S};

const SALES: &[LogDomain] = &[LogDomain::Sales];
const PROCUREMENT: &[LogDomain] = &[LogDomain::Procurement];
const SALES_PROCUREMENT: &[LogDomain] = &[LogDomain::Sales, LogDomain::Procurement];
const EGG_FLOW: &[LogDomain] = &[LogDomain::Production, LogDomain::Sales, LogDomain::EggStock];
const PRODUCTION: &[LogDomain] = &[LogDomain::Production];
const MORTALITY: &[LogDomain] = &[LogDomain::Mortality];
const FEED_FLOCK: &[LogDomain] = &[LogDomain::Feed, LogDomain::Mortality];
const COUNTS: &[LogDomain] = &[LogDomain::InventoryCount];
const SALES_MEDICATION: &[LogDomain] = &[LogDomain::Sales, LogDomain::Medication];

static CATALOG: &[FraudRule] = &[
    FraudRule {
        id: "F1",
        label: "Duplicate invoice or receipt",
        category: C::Sales,
        severity: S::Red,
        detection: D::ExactMatch,
        sources: SALES_PROCUREMENT,
        description: "The same invoice id or receipt id appears on more than one record.",
        detect: duplicate_ids,
    },
    FraudRule {
        id: "F2",
        label: "Paid without evidence",
        category: C::Cash,
        severity: S::Red,
        detection: D::ExactMatch,
        sources: SALES,
        description: "Sale marked Paid with no evidence reference attached.",
        detect: paid_without_evidence,
    },
    FraudRule {
        id: "F3",
        label: "Sales price deviation",
        category: C::Sales,
        severity: S::Yellow,
        detection: D::StaticThreshold,
        sources: SALES,
        description: "Unit price deviates from the reference price by more than the tolerance.",
        detect: sales_price_deviation,
    },
    FraudRule {
        id: "F4",
        label: "Procurement above benchmark",
        category: C::Procurement,
        severity: S::Yellow,
        detection: D::StaticThreshold,
        sources: PROCUREMENT,
        description: "Unit cost exceeds the price benchmark by more than the tolerance.",
        detect: procurement_above_benchmark,
    },
    FraudRule {
        id: "F5",
        label: "Sold exceeds available",
        category: C::Production,
        severity: S::Red,
        detection: D::CrossTable,
        sources: EGG_FLOW,
        description: "Eggs sold on a day exceed opening stock plus that day's production.",
        detect: sold_exceeds_available,
    },
    FraudRule {
        id: "F6",
        label: "Unusual breakage",
        category: C::Production,
        severity: S::Yellow,
        detection: D::Heuristic,
        sources: PRODUCTION,
        description: "Cracked fraction exceeds a multiple of its trailing average.",
        detect: unusual_breakage,
    },
    FraudRule {
        id: "F7",
        label: "Unapproved procurement above limit",
        category: C::Procurement,
        severity: S::Red,
        detection: D::StaticThreshold,
        sources: PROCUREMENT,
        description: "Purchase total above the approval limit without an Approved status.",
        detect: unapproved_above_limit,
    },
    FraudRule {
        id: "F8",
        label: "Cash not deposited",
        category: C::Cash,
        severity: S::Yellow,
        detection: D::StaticThreshold,
        sources: SALES,
        description: "Cash sale not deposited within the deposit window.",
        detect: cash_not_deposited,
    },
    FraudRule {
        id: "F9",
        label: "Unverified MoMo",
        category: C::Cash,
        severity: S::Red,
        detection: D::ExactMatch,
        sources: SALES,
        description: "Mobile-money sale marked Paid without a verified transaction.",
        detect: unverified_momo,
    },
    FraudRule {
        id: "F10",
        label: "Mortality spike",
        category: C::Flock,
        severity: S::Yellow,
        detection: D::Heuristic,
        sources: MORTALITY,
        description: "Daily deaths in a cohort exceed a multiple of the trailing average.",
        detect: mortality_spike,
    },
    FraudRule {
        id: "F11",
        label: "Feed shrinkage",
        category: C::Feed,
        severity: S::Yellow,
        detection: D::CrossTable,
        sources: FEED_FLOCK,
        description: "Feed consumed exceeds the expected quantity by more than the tolerance.",
        detect: feed_shrinkage,
    },
    FraudRule {
        id: "F13",
        label: "Unauthorised dispatch",
        category: C::Sales,
        severity: S::Red,
        detection: D::ExactMatch,
        sources: SALES,
        description: "Goods left the farm with no dispatch authorisation recorded.",
        detect: unauthorised_dispatch,
    },
    FraudRule {
        id: "F14",
        label: "Credit overrun",
        category: C::Sales,
        severity: S::Yellow,
        detection: D::CrossTable,
        sources: SALES,
        description: "A customer's unpaid balance exceeds their credit limit.",
        detect: credit_overrun,
    },
    FraudRule {
        id: "F15",
        label: "Requester is approver",
        category: C::Procurement,
        severity: S::Red,
        detection: D::ExactMatch,
        sources: PROCUREMENT,
        description: "The person who requested a purchase also approved it.",
        detect: requester_is_approver,
    },
    FraudRule {
        id: "F16",
        label: "Persistent positive inventory variance",
        category: C::Inventory,
        severity: S::Yellow,
        detection: D::Heuristic,
        sources: COUNTS,
        description: "An item counted above book on consecutive counts.",
        detect: persistent_positive_variance,
    },
    FraudRule {
        id: "F17",
        label: "Withdrawal-period violation",
        category: C::Compliance,
        severity: S::Red,
        detection: D::CrossTable,
        sources: SALES_MEDICATION,
        description: "Eggs sold while a medicated cohort is inside its withdrawal period.",
        detect: withdrawal_violation,
    },
    FraudRule {
        id: "F18",
        label: "Improbable zero mortality",
        category: C::Flock,
        severity: S::Yellow,
        detection: D::Heuristic,
        sources: MORTALITY,
        description: "A large flock reports no deaths for an improbably long streak.",
        detect: improbable_zero_mortality,
    },
];

/// The full rule table, in evaluation order.
pub fn catalog() -> &'static [FraudRule] {
    CATALOG
}

pub fn rule(id: &str) -> Option<&'static FraudRule> {
    CATALOG.iter().find(|r| r.id == id)
}

// ---------------------------------------------------------------------------
// Detectors
// ---------------------------------------------------------------------------

fn sales_in_window<'a>(ctx: &RuleContext<'a>) -> impl Iterator<Item = &'a SaleRecord> + 'a {
    let window = ctx.window;
    ctx.streams.sales.iter().filter(move |s| window.contains(s.date()))
}

fn procurement_in_window<'a>(ctx: &RuleContext<'a>) -> impl Iterator<Item = &'a ProcurementRecord> + 'a {
    let window = ctx.window;
    ctx.streams.procurement.iter().filter(move |p| window.contains(p.date()))
}

fn blank(s: Option<&str>) -> bool {
    s.map(|v| v.trim().is_empty()).unwrap_or(true)
}

fn duplicate_ids(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let mut out = Vec::new();

    let mut invoices: BTreeMap<&str, Vec<&SaleRecord>> = BTreeMap::new();
    for s in &ctx.streams.sales {
        invoices.entry(s.invoice_id.as_str()).or_default().push(s);
    }
    for (id, lines) in invoices {
        if lines.len() < 2 || !lines.iter().any(|s| ctx.window.contains(s.date())) {
            continue;
        }
        let dates: Vec<String> = lines.iter().map(|s| s.date().to_string()).collect();
        out.push(Finding::new(
            format!("invoice:{id}"),
            lines[1].date(),
            format!("invoice {id} on {} sales lines ({})", lines.len(), dates.join(", ")),
        ));
    }

    let mut receipts: BTreeMap<&str, Vec<&ProcurementRecord>> = BTreeMap::new();
    for p in &ctx.streams.procurement {
        receipts.entry(p.receipt_id.as_str()).or_default().push(p);
    }
    for (id, lines) in receipts {
        if lines.len() < 2 || !lines.iter().any(|p| ctx.window.contains(p.date())) {
            continue;
        }
        let dates: Vec<String> = lines.iter().map(|p| p.date().to_string()).collect();
        out.push(Finding::new(
            format!("receipt:{id}"),
            lines[1].date(),
            format!("receipt {id} on {} purchases ({})", lines.len(), dates.join(", ")),
        ));
    }

    out
}

fn paid_without_evidence(ctx: &RuleContext<'_>) -> Vec<Finding> {
    sales_in_window(ctx)
        .filter(|s| s.is_paid() && !s.has_evidence())
        .map(|s| {
            Finding::new(
                format!("invoice:{}", s.invoice_id),
                s.date(),
                format!("invoice {} paid by {:?} with no evidence reference", s.invoice_id, s.payment_method),
            )
        })
        .collect()
}

fn sales_price_deviation(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let fr = &ctx.cfg.fraud;
    sales_in_window(ctx)
        .filter_map(|s| {
            let reference = fr.reference_prices.get(s.product);
            if reference <= 0.0 {
                return None;
            }
            let deviation = (s.unit_price - reference).abs() / reference;
            (deviation > fr.price_deviation_tolerance).then(|| {
                Finding::new(
                    format!("invoice:{}", s.invoice_id),
                    s.date(),
                    format!(
                        "{:?} at {:.2} vs reference {:.2} ({:+.1}%)",
                        s.product,
                        s.unit_price,
                        reference,
                        (s.unit_price - reference) / reference * 100.0
                    ),
                )
            })
        })
        .collect()
}

fn procurement_above_benchmark(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let tolerance = ctx.cfg.fraud.price_deviation_tolerance;
    procurement_in_window(ctx)
        .filter_map(|p| {
            let benchmark = p.price_benchmark.filter(|b| *b > 0.0)?;
            (p.unit_cost > benchmark * (1.0 + tolerance)).then(|| {
                Finding::new(
                    format!("receipt:{}", p.receipt_id),
                    p.date(),
                    format!(
                        "{} from {} at {:.2} vs benchmark {:.2}",
                        p.item, p.vendor_id, p.unit_cost, benchmark
                    ),
                )
            })
        })
        .collect()
}

fn sold_exceeds_available(ctx: &RuleContext<'_>) -> Vec<Finding> {
    reconcile_eggs(ctx.cfg, &ctx.window, ctx.opening_eggs, ctx.streams)
        .into_iter()
        .filter_map(|r| {
            let available = r.opening_eggs.saturating_add(i64::try_from(r.produced_eggs).unwrap_or(i64::MAX));
            let sold = i64::try_from(r.sold_eggs).unwrap_or(i64::MAX);
            (sold > available).then(|| {
                Finding::new(
                    format!("eggs:{}", r.date),
                    r.date,
                    format!(
                        "sold {} eggs with {} available (opening {} + produced {})",
                        r.sold_eggs, available, r.opening_eggs, r.produced_eggs
                    ),
                )
            })
        })
        .collect()
}

fn unusual_breakage(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let cfg = &ctx.cfg.fraud.breakage;
    let crate_size = ctx.cfg.farm.crate_size;

    // (cracked, total) per day across all houses
    let mut daily: BTreeMap<NaiveDate, (u64, u64)> = BTreeMap::new();
    for p in &ctx.streams.production {
        let e = daily.entry(p.date).or_default();
        e.0 += u64::from(p.grade_cracked);
        e.1 += p.total_eggs(crate_size);
    }
    let fraction = |(cracked, total): (u64, u64)| cracked as f64 / total as f64;

    let mut out = Vec::new();
    for (&date, &today) in daily.range(ctx.window.start..=ctx.window.end) {
        if today.1 == 0 {
            continue;
        }
        let from = date
            .checked_sub_days(Days::new(u64::from(cfg.lookback_days)))
            .unwrap_or(NaiveDate::MIN);
        let prior: Vec<f64> = daily
            .range(from..date)
            .filter(|(_, v)| v.1 > 0)
            .map(|(_, v)| fraction(*v))
            .collect();
        if prior.is_empty() {
            continue;
        }
        let baseline = prior.iter().sum::<f64>() / prior.len() as f64;
        let current = fraction(today);
        if baseline > 0.0 && current > cfg.multiplier * baseline {
            out.push(Finding::new(
                format!("breakage:{date}"),
                date,
                format!(
                    "cracked {:.2}% vs trailing {}-day average {:.2}%",
                    current * 100.0,
                    cfg.lookback_days,
                    baseline * 100.0
                ),
            ));
        }
    }
    out
}

fn unapproved_above_limit(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let limit = ctx.cfg.fraud.procurement_approval_limit;
    procurement_in_window(ctx)
        .filter(|p| p.total_cost() > limit && p.approval_status != ApprovalStatus::Approved)
        .map(|p| {
            Finding::new(
                format!("receipt:{}", p.receipt_id),
                p.date(),
                format!(
                    "total {:.2} above limit {:.2} with status {:?}",
                    p.total_cost(),
                    limit,
                    p.approval_status
                ),
            )
        })
        .collect()
}

fn cash_not_deposited(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let hours = i64::from(ctx.cfg.fraud.cash_deposit_window_hours);
    // undeposited sales are judged as of midnight after the window's last day
    let as_of = ctx
        .window
        .end
        .checked_add_days(Days::new(1))
        .unwrap_or(ctx.window.end)
        .and_time(NaiveTime::MIN);

    sales_in_window(ctx)
        .filter(|s| s.payment_method == PaymentMethod::Cash && s.is_paid())
        .filter_map(|s| {
            let deadline = s.timestamp + Duration::hours(hours);
            let evidence = match s.cash_deposited_at {
                Some(t) if t > deadline => format!("deposited {t}, deadline {deadline}"),
                Some(_) => return None,
                None if as_of > deadline => format!("not deposited, deadline {deadline}"),
                None => return None,
            };
            Some(Finding::new(format!("invoice:{}", s.invoice_id), s.date(), evidence))
        })
        .collect()
}

fn unverified_momo(ctx: &RuleContext<'_>) -> Vec<Finding> {
    sales_in_window(ctx)
        .filter(|s| s.payment_method == PaymentMethod::MoMo && s.is_paid() && s.momo_verified != Some(true))
        .map(|s| {
            Finding::new(
                format!("invoice:{}", s.invoice_id),
                s.date(),
                format!("MoMo payment on {} verified={:?}", s.invoice_id, s.momo_verified),
            )
        })
        .collect()
}

fn mortality_spike(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let cfg = &ctx.cfg.fraud.mortality_spike;
    let lookback = u64::from(cfg.lookback_days);
    let mut out = Vec::new();

    let mut cohorts: Vec<_> = ctx.cohorts.iter().filter(|c| c.is_active()).collect();
    cohorts.sort_by(|a, b| a.cohort_id.cmp(&b.cohort_id));

    for cohort in cohorts {
        let mut deaths: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        // a reused house carries the previous flock's deaths; they are not this cohort's baseline
        let own = ctx
            .streams
            .mortality
            .iter()
            .filter(|m| m.date >= cohort.arrival_date && cohort.houses(&m.housing_id));
        for m in own {
            *deaths.entry(m.date).or_default() += u64::from(m.death_count);
        }

        for date in ctx.window.days() {
            if !cohort.has_arrived(date) {
                continue;
            }
            let today = deaths.get(&date).copied().unwrap_or(0);
            if today < u64::from(cfg.min_deaths) {
                continue;
            }
            let from = date.checked_sub_days(Days::new(lookback)).unwrap_or(NaiveDate::MIN);
            let prior: u64 = deaths.range(from..date).map(|(_, n)| *n).sum();
            let baseline = prior as f64 / lookback as f64;
            if today as f64 > cfg.multiplier * baseline {
                out.push(Finding::new(
                    format!("{}:{date}", cohort.cohort_id),
                    date,
                    format!(
                        "{} deaths vs trailing {}-day average {:.2}",
                        today, cfg.lookback_days, baseline
                    ),
                ));
            }
        }
    }
    out
}

fn feed_shrinkage(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let tolerance = ctx.cfg.fraud.feed_shrinkage_tolerance;
    reconcile_feed(ctx.cfg, &ctx.window, ctx.cohorts, ctx.targets, ctx.streams)
        .into_iter()
        .filter(|r| r.expected_kg > 0.0 && r.consumed_kg > r.expected_kg * (1.0 + tolerance))
        .map(|r| {
            Finding::new(
                format!("feed:{}", r.date),
                r.date,
                format!(
                    "consumed {:.1} kg vs expected {:.1} kg for {} birds",
                    r.consumed_kg, r.expected_kg, r.birds
                ),
            )
        })
        .collect()
}

fn unauthorised_dispatch(ctx: &RuleContext<'_>) -> Vec<Finding> {
    sales_in_window(ctx)
        .filter(|s| blank(s.dispatch_authorized_by.as_deref()))
        .map(|s| {
            Finding::new(
                format!("invoice:{}", s.invoice_id),
                s.date(),
                format!("{:?} x{} sold by {} without dispatch authorisation", s.product, s.quantity, s.sold_by),
            )
        })
        .collect()
}

fn credit_overrun(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let crate_size = ctx.cfg.farm.crate_size;
    let customers: BTreeMap<&str, &Customer> = ctx.customers.iter().map(|c| (c.customer_id.as_str(), c)).collect();
    let mut balances: BTreeMap<&str, f64> = BTreeMap::new();
    let mut out = Vec::new();

    // balances build from the whole ledger up to the window end
    for s in ctx.streams.sales.iter().filter(|s| s.date() <= ctx.window.end && s.is_receivable()) {
        let Some(customer) = customers.get(s.customer_id.as_str()) else {
            continue;
        };
        let balance = balances.entry(s.customer_id.as_str()).or_default();
        *balance += s.line_total(crate_size);
        let limit = customer.effective_credit_limit();
        if *balance > limit && ctx.window.contains(s.date()) {
            out.push(Finding::new(
                format!("customer:{}", customer.customer_id),
                s.date(),
                format!(
                    "unpaid balance {:.2} over credit limit {:.2} after invoice {}",
                    balance, limit, s.invoice_id
                ),
            ));
        }
    }
    out
}

fn requester_is_approver(ctx: &RuleContext<'_>) -> Vec<Finding> {
    procurement_in_window(ctx)
        .filter(|p| {
            let requester = p.requested_by.trim();
            !requester.is_empty()
                && p.approved_by
                    .as_deref()
                    .map(|a| a.trim().eq_ignore_ascii_case(requester))
                    .unwrap_or(false)
        })
        .map(|p| {
            Finding::new(
                format!("receipt:{}", p.receipt_id),
                p.date(),
                format!("{} requested and approved {:.2}", p.requested_by, p.total_cost()),
            )
        })
        .collect()
}

fn persistent_positive_variance(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let needed = ctx.cfg.fraud.positive_inventory_streak;
    let mut streaks: BTreeMap<&str, u32> = BTreeMap::new();
    let mut out = Vec::new();

    // stream is date-sorted; counts after the window cannot feed a flag
    for c in ctx.streams.inventory_counts.iter().filter(|c| c.date <= ctx.window.end) {
        let streak = streaks.entry(c.item_id.as_str()).or_default();
        if c.counted_qty > c.expected_qty {
            *streak += 1;
        } else {
            *streak = 0;
        }
        if *streak >= needed && ctx.window.contains(c.date) {
            out.push(Finding::new(
                format!("item:{}", c.item_id),
                c.date,
                format!(
                    "{} consecutive counts above book, latest {} vs {}",
                    streak, c.counted_qty, c.expected_qty
                ),
            ));
        }
    }
    out
}

fn withdrawal_violation(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let mut out = Vec::new();
    for med in &ctx.streams.medication {
        let Some(last) = med.withdrawal_last_day() else {
            continue;
        };
        for s in sales_in_window(ctx).filter(|s| s.product.is_eggs()) {
            let d = s.date();
            if d >= med.date && d <= last {
                out.push(Finding::new(
                    format!("{}:{}", med.cohort_id, s.invoice_id),
                    d,
                    format!(
                        "eggs sold on {} while {} treated with {} (withdrawal until {})",
                        d, med.cohort_id, med.product, last
                    ),
                ));
            }
        }
    }
    out
}

fn improbable_zero_mortality(ctx: &RuleContext<'_>) -> Vec<Finding> {
    reconcile_mortality(ctx.cfg, &ctx.window, ctx.cohorts, ctx.targets, ctx.streams)
        .into_iter()
        .filter(|r| r.improbable_zero_mortality)
        .map(|r| {
            Finding::new(
                format!("cohort:{}", r.cohort_id),
                r.date,
                format!(
                    "{} days without deaths on a flock of {}",
                    r.zero_death_streak, r.opening_flock
                ),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_are_unique() {
        let ids: Vec<&str> = catalog().iter().map(|r| r.id).collect();
        let unique: std::collections::BTreeSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
        assert_eq!(ids.len(), 17);
        assert!(!ids.contains(&"F12"));
        assert!(ids.contains(&"F14"));
        assert_eq!(rule("F1").map(|r| r.detection), Some(D::ExactMatch));
        assert!(rule("F99").is_none());
    }

    #[test]
    fn severities_follow_the_rule_table() {
        let red = ["F1", "F2", "F5", "F7", "F9", "F13", "F15", "F17"];
        let yellow = ["F3", "F4", "F6", "F8", "F10", "F11", "F14", "F16", "F18"];
        for id in red {
            assert_eq!(rule(id).map(|r| r.severity), Some(S::Red), "{id}");
        }
        for id in yellow {
            assert_eq!(rule(id).map(|r| r.severity), Some(S::Yellow), "{id}");
        }
        assert_eq!(red.len() + yellow.len(), catalog().len());
    }

    #[test]
    fn every_rule_names_its_sources() {
        for r in catalog() {
            assert!(!r.sources.is_empty(), "{} has no source domains", r.id);
            assert!(!r.description.is_empty());
        }
    }

    #[test]
    fn blank_treats_none_and_whitespace_alike() {
        assert!(blank(None));
        assert!(blank(Some("  ")));
        assert!(!blank(Some("KOFI")));
    }
}
