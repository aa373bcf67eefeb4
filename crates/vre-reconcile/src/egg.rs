use tracing::{debug, warn};
use vre_config::VreConfig;
use vre_schemas::{index_by_date, LogStreams, Status, Variance};

use crate::{EggReconRecord, ReconWindow};

/// Egg stock chain.
///
/// expected_closing = opening + produced - sold - cracked - adjustments.
/// Closing carries the expected balance; a physical count only produces a
/// variance (physical - expected) on the day it is taken.
pub fn reconcile_eggs(
    cfg: &VreConfig,
    window: &ReconWindow,
    opening_eggs: i64,
    streams: &LogStreams,
) -> Vec<EggReconRecord> {
    let crate_size = cfg.farm.crate_size;
    let band = cfg.reconcile.egg_crates;

    let production = index_by_date(&streams.production, |r| r.date);
    let sales = index_by_date(&streams.sales, |r| r.date());
    let stock = index_by_date(&streams.egg_stock, |r| r.date);

    let out: Vec<EggReconRecord> = window
        .days()
        .into_iter()
        .scan(opening_eggs, |balance, date| {
            let opening = *balance;

            let prod = production.get(&date).map(Vec::as_slice).unwrap_or_default();
            let produced: u64 = prod.iter().map(|r| r.total_eggs(crate_size)).sum();
            let cracked: u64 = prod.iter().map(|r| u64::from(r.grade_cracked)).sum();
            let sold: u64 = sales
                .get(&date)
                .map(Vec::as_slice)
                .unwrap_or_default()
                .iter()
                .map(|s| s.total_eggs(crate_size))
                .sum();

            let stock_today = stock.get(&date).map(Vec::as_slice).unwrap_or_default();
            let adjustments: i64 = stock_today.iter().map(|r| r.other_adjustments).sum();
            // Last physical count of the day wins.
            let physical = stock_today.iter().rev().find_map(|r| r.physical_eggs);

            let expected = opening + to_i64(produced) - to_i64(sold) - to_i64(cracked) - adjustments;

            let variance_eggs = Variance::from_option(physical.map(|p| to_i64(p) as f64 - expected as f64));
            let variance_crates = variance_eggs.map(|v| v / f64::from(crate_size));
            let status = variance_crates
                .value()
                .map(|v| band.classify(v.abs()))
                .unwrap_or(Status::Green);

            if status == Status::Red {
                warn!(%date, ?variance_crates, "egg stock variance at red");
            }

            *balance = expected;
            Some(EggReconRecord {
                date,
                opening_eggs: opening,
                produced_eggs: produced,
                sold_eggs: sold,
                cracked_eggs: cracked,
                adjustments,
                expected_closing_eggs: expected,
                closing_eggs: expected,
                physical_eggs: physical,
                variance_eggs,
                variance_crates,
                status,
            })
        })
        .collect();

    debug!(days = out.len(), "egg chain reconciled");
    out
}

fn to_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}
