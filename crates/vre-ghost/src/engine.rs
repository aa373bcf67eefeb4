use std::collections::BTreeMap;
use tracing::{debug, warn};
use vre_config::VreConfig;
use vre_schemas::{index_by_date, Status};

use crate::{micros_to_currency, to_micros, GhostCategory, GhostComponent, GhostInputs, GhostMoneyRecord};

/// Daily ghost money with a running cumulative total.
///
/// Component formulas (currency, floored at zero):
/// - feed shrinkage: excess feed kg x feed cost per kg
/// - mortality over target: excess rate x opening flock x bird replacement cost, summed over cohorts
/// - egg variance loss: missing crates on count days x crate price
/// - cracked/damaged: cracked eggs above the baseline fraction x crate price / crate size
/// - cash discrepancy: revenue not received
/// - inventory shrinkage: missing units x item unit cost (configured default for unknown items)
/// - price arbitrage missed, inventory carrying: 0, incomplete
pub fn aggregate_ghost_money(cfg: &VreConfig, inp: &GhostInputs<'_>) -> Vec<GhostMoneyRecord> {
    let g = &cfg.ghost_money;
    let crate_size = f64::from(cfg.farm.crate_size);

    let eggs = index_by_date(inp.eggs, |r| r.date);
    let cash = index_by_date(inp.cash, |r| r.date);
    let feed = index_by_date(inp.feed, |r| r.date);
    let mortality = index_by_date(inp.mortality, |r| r.date);
    let inventory = index_by_date(inp.inventory, |r| r.date);
    let production = index_by_date(inp.production, |r| r.date);
    let unit_cost: BTreeMap<&str, f64> = inp.items.iter().map(|i| (i.item_id.as_str(), i.unit_cost)).collect();

    let out: Vec<GhostMoneyRecord> = inp
        .window
        .days()
        .into_iter()
        .scan(0i64, |cumulative, date| {
            let feed_loss: f64 = feed
                .get(&date)
                .map(|rs| rs.iter().map(|r| r.variance_kg.max(0.0) * g.feed_cost_per_kg).sum())
                .unwrap_or(0.0);

            let mortality_loss: f64 = mortality
                .get(&date)
                .map(|rs| {
                    rs.iter()
                        .map(|r| r.variance.max(0.0) * f64::from(r.opening_flock) * g.bird_replacement_cost)
                        .sum()
                })
                .unwrap_or(0.0);

            let egg_loss: f64 = eggs
                .get(&date)
                .map(|rs| {
                    rs.iter()
                        .filter_map(|r| r.variance_crates.value())
                        .map(|v| (-v).max(0.0) * g.crate_price)
                        .sum()
                })
                .unwrap_or(0.0);

            let cracked_loss: f64 = production
                .get(&date)
                .map(|rs| {
                    let total: f64 = rs.iter().map(|r| r.total_eggs(cfg.farm.crate_size) as f64).sum();
                    let cracked: f64 = rs.iter().map(|r| f64::from(r.grade_cracked)).sum();
                    let excess = (cracked - g.cracked_baseline_fraction * total).max(0.0);
                    excess * g.crate_price / crate_size
                })
                .unwrap_or(0.0);

            let cash_loss: f64 = cash
                .get(&date)
                .map(|rs| rs.iter().map(|r| r.variance.max(0.0)).sum())
                .unwrap_or(0.0);

            let inventory_loss: f64 = inventory
                .get(&date)
                .map(|rs| {
                    rs.iter()
                        .map(|r| {
                            let cost = unit_cost.get(r.item_id.as_str()).copied().unwrap_or_else(|| {
                                warn!(item_id = %r.item_id, "unknown item; using default unit cost");
                                g.default_item_unit_cost
                            });
                            (-r.variance).max(0.0) * cost
                        })
                        .sum()
                })
                .unwrap_or(0.0);

            let components = vec![
                modelled(GhostCategory::FeedShrinkage, feed_loss),
                modelled(GhostCategory::MortalityOverTarget, mortality_loss),
                modelled(GhostCategory::EggVarianceLoss, egg_loss),
                modelled(GhostCategory::CrackedDamaged, cracked_loss),
                modelled(GhostCategory::CashDiscrepancy, cash_loss),
                modelled(GhostCategory::InventoryShrinkage, inventory_loss),
                placeholder(GhostCategory::PriceArbitrageMissed),
                placeholder(GhostCategory::InventoryCarrying),
            ];

            let daily: i64 = components
                .iter()
                .fold(0i64, |acc, c| acc.saturating_add(c.amount_micros));
            *cumulative = cumulative.saturating_add(daily);

            let daily_status = g.daily.classify(micros_to_currency(daily));
            let cumulative_status = g.cumulative.classify(micros_to_currency(*cumulative));
            let overall_status = daily_status.max(cumulative_status);
            if overall_status == Status::Red {
                warn!(
                    %date,
                    daily = micros_to_currency(daily),
                    cumulative = micros_to_currency(*cumulative),
                    "ghost money at red"
                );
            }

            Some(GhostMoneyRecord {
                date,
                components,
                daily_total_micros: daily,
                cumulative_total_micros: *cumulative,
                daily_status,
                cumulative_status,
                overall_status,
            })
        })
        .collect();

    debug!(days = out.len(), "ghost money aggregated");
    out
}

fn modelled(category: GhostCategory, amount: f64) -> GhostComponent {
    GhostComponent {
        category,
        amount_micros: to_micros(amount),
        complete: true,
    }
}

fn placeholder(category: GhostCategory) -> GhostComponent {
    GhostComponent {
        category,
        amount_micros: 0,
        complete: false,
    }
}
