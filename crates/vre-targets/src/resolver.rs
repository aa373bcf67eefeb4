use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, warn};
use vre_config::TargetConfig;
use vre_schemas::{days_inclusive, Cohort, OverrideScope, Phase, TargetMetric};

use crate::{BreederCurve, CurveColumn, CurveTable, OverrideResolver, ResolvedMetric, TargetSnapshot, TargetSource};

/// Days per month used to turn the monthly mortality band into a daily rate.
const DAYS_PER_MONTH: f64 = 30.0;

/// Combines curves, overrides and configured thresholds into per-day targets.
#[derive(Clone, Copy, Debug)]
pub struct TargetResolver<'a> {
    cfg: &'a TargetConfig,
    curves: &'a CurveTable,
    overrides: &'a OverrideResolver,
}

impl<'a> TargetResolver<'a> {
    pub fn new(cfg: &'a TargetConfig, curves: &'a CurveTable, overrides: &'a OverrideResolver) -> Self {
        Self { cfg, curves, overrides }
    }

    pub fn resolve(&self, cohort: &Cohort, date: NaiveDate) -> TargetSnapshot {
        let age_exact = cohort.age_weeks_exact(date);
        let week = cohort.age_weeks(date);
        let phase = Phase::from_week(week);

        let curve = self.curves.get(&cohort.breed);
        if curve.is_none() {
            warn!(
                cohort_id = %cohort.cohort_id,
                breed = %cohort.breed,
                %date,
                "no breeder curve for breed; falling back to configured defaults"
            );
        }

        let metric = |m: TargetMetric| self.metric(cohort, curve, m, age_exact, week);

        let lay_rate = metric(TargetMetric::LayRate);
        let fcr = metric(TargetMetric::Fcr);
        let feed_intake_g = metric(TargetMetric::FeedIntake);
        let egg_weight_g = metric(TargetMetric::EggWeight);
        let large_fraction = metric(TargetMetric::LargeFraction);
        let mortality_pct_monthly = metric(TargetMetric::Mortality);

        let lay_thresholds = self.cfg.lay.floors_for(phase, lay_rate.value);
        let fcr_thresholds = self.cfg.fcr.ceilings_for(phase, fcr.value);
        let mortality_monthly_fraction = mortality_pct_monthly.value / 100.0;

        TargetSnapshot {
            cohort_id: cohort.cohort_id.clone(),
            date,
            age_weeks_exact: age_exact,
            age_weeks: week,
            phase,
            lay_rate,
            lay_thresholds,
            fcr,
            fcr_thresholds,
            feed_intake_g,
            egg_weight_g,
            large_fraction,
            mortality_pct_monthly,
            mortality_monthly_fraction,
            mortality_daily_rate: mortality_monthly_fraction / DAYS_PER_MONTH,
        }
    }

    /// One snapshot per date in `[start, end]`, chronological.
    pub fn resolve_range(&self, cohort: &Cohort, start: NaiveDate, end: NaiveDate) -> Vec<TargetSnapshot> {
        days_inclusive(start, end)
            .into_iter()
            .map(|d| self.resolve(cohort, d))
            .collect()
    }

    fn metric(
        &self,
        cohort: &Cohort,
        curve: Option<&BreederCurve>,
        metric: TargetMetric,
        age_exact: f64,
        week: u32,
    ) -> ResolvedMetric {
        if let Some(rule) = self.overrides.resolve(&cohort.cohort_id, &cohort.breed, metric, week) {
            let source = match rule.scope {
                OverrideScope::CohortSpecific { .. } => TargetSource::CohortOverride,
                OverrideScope::BreedWide { .. } => TargetSource::BreedOverride,
            };
            return ResolvedMetric {
                value: rule.value,
                source,
                override_id: Some(rule.override_id),
                min_band: rule.min_band,
                max_band: rule.max_band,
            };
        }

        if let Some(v) = curve.and_then(|c| c.interpolate(CurveColumn::from(metric), age_exact)) {
            return ResolvedMetric::from_curve(v);
        }

        if curve.is_some() {
            // Expected for sparse columns (no FCR before week 20).
            debug!(
                cohort_id = %cohort.cohort_id,
                metric = metric.as_str(),
                week,
                "curve column undefined at this age; using configured default"
            );
        }
        ResolvedMetric::from_default(self.default_for(metric))
    }

    fn default_for(&self, metric: TargetMetric) -> f64 {
        let d = &self.cfg.defaults;
        match metric {
            TargetMetric::LayRate => d.lay_rate,
            TargetMetric::EggWeight => d.egg_weight_g,
            TargetMetric::FeedIntake => d.feed_intake_g,
            TargetMetric::Fcr => d.fcr,
            TargetMetric::Mortality => d.mortality_pct_monthly,
            TargetMetric::LargeFraction => d.large_fraction,
        }
    }
}

/// Precomputed snapshots for every active cohort over a pass window.
///
/// Built once before the reconciliation chains fan out; read-only after.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TargetBook {
    by_cohort: BTreeMap<String, BTreeMap<NaiveDate, TargetSnapshot>>,
}

impl TargetBook {
    /// Snapshots for active cohorts from `max(start, arrival)` to `end`.
    pub fn build(resolver: &TargetResolver<'_>, cohorts: &[Cohort], start: NaiveDate, end: NaiveDate) -> Self {
        let mut by_cohort = BTreeMap::new();
        for c in cohorts.iter().filter(|c| c.is_active()) {
            let from = start.max(c.arrival_date);
            let days: BTreeMap<NaiveDate, TargetSnapshot> = resolver
                .resolve_range(c, from, end)
                .into_iter()
                .map(|s| (s.date, s))
                .collect();
            by_cohort.insert(c.cohort_id.clone(), days);
        }
        Self { by_cohort }
    }

    pub fn get(&self, cohort_id: &str, date: NaiveDate) -> Option<&TargetSnapshot> {
        self.by_cohort.get(cohort_id).and_then(|days| days.get(&date))
    }

    /// All snapshots, ordered by cohort id then date.
    pub fn snapshots(&self) -> impl Iterator<Item = &TargetSnapshot> {
        self.by_cohort.values().flat_map(|days| days.values())
    }

    pub fn len(&self) -> usize {
        self.by_cohort.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
