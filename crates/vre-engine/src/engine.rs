use std::thread;

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use tracing::{debug, info, warn};
use vre_config::VreConfig;
use vre_fraud::{carry_forward, evaluate, RuleContext};
use vre_ghost::{aggregate_ghost_money, GhostInputs};
use vre_reconcile::{
    reconcile_cash, reconcile_eggs, reconcile_feed, reconcile_inventory, reconcile_mortality, schedule_cycle_counts,
};
use vre_schemas::{validate_records, DailyLogRecord, LogStreams};
use vre_targets::{CurveTable, OverrideResolver, TargetBook, TargetResolver};

use crate::{PassInputs, PassOutput};

/// Verification pass bound to one validated configuration.
#[derive(Clone, Debug)]
pub struct VrePass {
    cfg: VreConfig,
}

impl VrePass {
    pub fn new(cfg: VreConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &VreConfig {
        &self.cfg
    }

    pub fn run(&self, inp: &PassInputs) -> Result<PassOutput> {
        let cfg = &self.cfg;
        let window = inp.window();
        if window.end < window.start {
            bail!("VRE_WINDOW_INVALID start={} end={}", window.start, window.end);
        }
        if let Some(as_of) = inp.as_of.filter(|d| *d < window.end) {
            bail!("VRE_WINDOW_INVALID as_of={} before end={}", as_of, window.end);
        }

        // ------------------------------------------------------------------
        // 1) Validate + partition
        // ------------------------------------------------------------------
        for c in &inp.customers {
            if c.customer_id.trim().is_empty() || !c.credit_limit.is_finite() || c.credit_limit < 0.0 {
                bail!(
                    "VRE_INPUT_INVALID customer={:?} credit_limit={}",
                    c.customer_id,
                    c.credit_limit
                );
            }
        }
        let as_of = inp.as_of.unwrap_or(NaiveDate::MAX);
        if let Err(errs) = validate_records(&inp.records, &inp.cohorts, as_of, cfg.farm.crate_size) {
            for e in &errs {
                warn!(error = %e, "input record rejected");
            }
            let first = errs.first().map(ToString::to_string).unwrap_or_default();
            bail!("VRE_INPUT_INVALID rejected={} first={}", errs.len(), first);
        }
        let in_scope: Vec<DailyLogRecord> = inp
            .records
            .iter()
            .filter(|r| r.date() <= window.end)
            .cloned()
            .collect();
        let dropped = inp.records.len() - in_scope.len();
        if dropped > 0 {
            debug!(dropped, end = %window.end, "records after the window end left out of this pass");
        }
        let streams = LogStreams::from_records(in_scope);
        debug!(records = streams.len(), "log streams partitioned");

        // ------------------------------------------------------------------
        // 2) Targets, once per (cohort, date)
        // ------------------------------------------------------------------
        let curves = CurveTable::from_points(inp.curve.clone()).context("VRE_CURVE_INVALID")?;
        let overrides = OverrideResolver::new(inp.overrides.clone());
        let resolver = TargetResolver::new(&cfg.targets, &curves, &overrides);
        let book = TargetBook::build(&resolver, &inp.cohorts, window.start, window.end);
        debug!(snapshots = book.len(), "targets resolved");

        // ------------------------------------------------------------------
        // 3) Independent chains + fraud catalog
        // ------------------------------------------------------------------
        let streams = &streams;
        let book = &book;
        let cohorts = inp.cohorts.as_slice();
        let items = inp.items.as_slice();

        let (eggs, cash, feed, mortality, inventory, cycle_counts, fresh_flags) = thread::scope(|s| {
            let eggs = s.spawn(|| reconcile_eggs(cfg, &window, inp.opening_eggs, streams));
            let cash = s.spawn(|| reconcile_cash(cfg, &window, streams));
            let feed = s.spawn(|| reconcile_feed(cfg, &window, cohorts, book, streams));
            let mortality = s.spawn(|| reconcile_mortality(cfg, &window, cohorts, book, streams));
            let inventory = s.spawn(|| reconcile_inventory(cfg, &window, streams));
            let cycle_counts = s.spawn(|| schedule_cycle_counts(cfg, items, &streams.inventory_counts, window.end));
            let fraud = s.spawn(|| {
                evaluate(&RuleContext {
                    cfg,
                    window,
                    streams,
                    cohorts,
                    targets: book,
                    opening_eggs: inp.opening_eggs,
                    customers: &inp.customers,
                })
            });

            Ok::<_, anyhow::Error>((
                joined(eggs.join(), "egg")?,
                joined(cash.join(), "cash")?,
                joined(feed.join(), "feed")?,
                joined(mortality.join(), "mortality")?,
                joined(inventory.join(), "inventory")?,
                joined(cycle_counts.join(), "cycle_count")?,
                joined(fraud.join(), "fraud")?,
            ))
        })?;

        // ------------------------------------------------------------------
        // 4) Ghost money over the chain outputs
        // ------------------------------------------------------------------
        let ghost_money = aggregate_ghost_money(
            cfg,
            &GhostInputs {
                window,
                eggs: &eggs,
                cash: &cash,
                feed: &feed,
                mortality: &mortality,
                inventory: &inventory,
                production: &streams.production,
                items,
            },
        );

        let fraud_flags = carry_forward(fresh_flags, &inp.prior_flags);

        info!(
            start = %window.start,
            end = %window.end,
            cohorts = cohorts.len(),
            records = streams.len(),
            flags = fraud_flags.len(),
            "verification pass complete"
        );

        Ok(PassOutput {
            window,
            targets: book.snapshots().cloned().collect(),
            eggs,
            cash,
            feed,
            mortality,
            inventory,
            cycle_counts,
            ghost_money,
            fraud_flags,
        })
    }
}

fn joined<T>(r: thread::Result<T>, chain: &str) -> Result<T> {
    r.map_err(|_| anyhow!("VRE_CHAIN_PANICKED chain={chain}"))
}
