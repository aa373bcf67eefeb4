use chrono::NaiveDate;
use std::collections::BTreeMap;
use vre_config::VreConfig;
use vre_schemas::{InventoryCountRecord, Item, Status};

use crate::{safe_div, CycleCountDue};

/// Cycle-count plan as of `as_of`, highest priority first.
///
/// - frequency: base days for the item's risk class, multiplied by
///   `variance_multiplier` when the last count was not Green
/// - due: never counted, or days since last count >= frequency
/// - priority: risk weight x (days since / frequency); risk weight x
///   `never_counted_ratio` for items never counted
///
/// Counts dated after `as_of` are ignored. Ties sort by item id.
pub fn schedule_cycle_counts(
    cfg: &VreConfig,
    items: &[Item],
    counts: &[InventoryCountRecord],
    as_of: NaiveDate,
) -> Vec<CycleCountDue> {
    let cc = &cfg.cycle_count;
    let band = cfg.reconcile.inventory_pct;

    // Latest count per item; later records on the same date win.
    let mut last: BTreeMap<&str, &InventoryCountRecord> = BTreeMap::new();
    for c in counts.iter().filter(|c| c.date <= as_of) {
        match last.get(c.item_id.as_str()) {
            Some(prev) if prev.date > c.date => {}
            _ => {
                last.insert(c.item_id.as_str(), c);
            }
        }
    }

    let mut plan: Vec<CycleCountDue> = items
        .iter()
        .map(|item| {
            let base = f64::from(cc.frequency_days.get(item.risk_class));
            let weight = cc.risk_weight.get(item.risk_class);

            match last.get(item.item_id.as_str()) {
                None => CycleCountDue {
                    item_id: item.item_id.clone(),
                    risk_class: item.risk_class,
                    last_counted: None,
                    days_since: None,
                    last_status: None,
                    frequency_days: base,
                    due: true,
                    priority: weight * cc.never_counted_ratio,
                },
                Some(c) => {
                    let pct = safe_div(c.counted_qty - c.expected_qty, c.expected_qty);
                    let last_status = band.classify(pct.abs());
                    let frequency = if last_status == Status::Green {
                        base
                    } else {
                        base * cc.variance_multiplier
                    };
                    let days = (as_of - c.date).num_days();
                    CycleCountDue {
                        item_id: item.item_id.clone(),
                        risk_class: item.risk_class,
                        last_counted: Some(c.date),
                        days_since: Some(days),
                        last_status: Some(last_status),
                        frequency_days: frequency,
                        due: days as f64 >= frequency,
                        priority: weight * safe_div(days as f64, frequency),
                    }
                }
            }
        })
        .collect();

    plan.sort_by(|a, b| {
        b.priority
            .total_cmp(&a.priority)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
    plan
}
