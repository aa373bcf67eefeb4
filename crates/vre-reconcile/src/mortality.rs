use tracing::{debug, warn};
use vre_config::VreConfig;
use vre_schemas::{days_inclusive, Cohort, DeathCause, LogStreams, MortalityRecord, Status};
use vre_targets::TargetBook;

use crate::{safe_div, MortalityReconRecord, ReconWindow};

/// Running state carried from one day to the next within a cohort chain.
#[derive(Clone, Copy, Debug)]
struct FlockAcc {
    flock: u32,
    zero_streak: u32,
}

/// One flock-balance chain per active cohort, ordered by cohort id then date.
///
/// Opening flock on the first day is the cohort's live count at the start of
/// that day; afterwards it is the previous day's expected closing. Culls are a
/// subset of deaths and are reported, not subtracted twice.
pub fn reconcile_mortality(
    cfg: &VreConfig,
    window: &ReconWindow,
    cohorts: &[Cohort],
    targets: &TargetBook,
    streams: &LogStreams,
) -> Vec<MortalityReconRecord> {
    let mut active: Vec<&Cohort> = cohorts.iter().filter(|c| c.is_active()).collect();
    active.sort_by(|a, b| a.cohort_id.cmp(&b.cohort_id));

    let out: Vec<MortalityReconRecord> = active
        .into_iter()
        .flat_map(|c| cohort_chain(cfg, window, c, targets, &streams.mortality))
        .collect();

    debug!(records = out.len(), "mortality chains reconciled");
    out
}

fn cohort_chain(
    cfg: &VreConfig,
    window: &ReconWindow,
    cohort: &Cohort,
    targets: &TargetBook,
    mortality: &[MortalityRecord],
) -> Vec<MortalityReconRecord> {
    let band = cfg.reconcile.mortality_rate;
    let zm = &cfg.reconcile.zero_mortality;

    let first = window.start.max(cohort.arrival_date);
    let own: Vec<&MortalityRecord> = mortality
        .iter()
        .filter(|m| m.date >= cohort.arrival_date && cohort.houses(&m.housing_id))
        .collect();

    let init = FlockAcc {
        flock: cohort.birds_on(first, mortality),
        zero_streak: 0,
    };

    days_inclusive(first, window.end)
        .into_iter()
        .scan(init, |acc, date| {
            let opening = acc.flock;
            let today = own.iter().filter(|m| m.date == date);
            let deaths: u32 = today.clone().map(|m| m.death_count).sum();
            let culls: u32 = today
                .filter(|m| m.cause == DeathCause::Culled)
                .map(|m| m.death_count)
                .sum();
            let live_sales = 0u32;
            let expected_closing = opening.saturating_sub(deaths).saturating_sub(live_sales);

            let rate = safe_div(f64::from(deaths), f64::from(opening));
            let target_daily_rate = match targets.get(&cohort.cohort_id, date) {
                Some(t) => t.mortality_daily_rate,
                None => {
                    warn!(cohort_id = %cohort.cohort_id, %date, "no target snapshot; mortality target taken as 0");
                    0.0
                }
            };
            let variance = rate - target_daily_rate;

            acc.zero_streak = if deaths == 0 { acc.zero_streak + 1 } else { 0 };
            let improbable = acc.zero_streak >= zm.streak_days && opening >= zm.min_flock;

            let status = if improbable {
                Status::Red
            } else {
                band.classify(variance.max(0.0))
            };
            if status == Status::Red {
                warn!(
                    cohort_id = %cohort.cohort_id,
                    %date,
                    rate,
                    zero_streak = acc.zero_streak,
                    improbable,
                    "mortality at red"
                );
            }

            acc.flock = expected_closing;
            Some(MortalityReconRecord {
                cohort_id: cohort.cohort_id.clone(),
                date,
                opening_flock: opening,
                deaths,
                culls,
                live_sales,
                live_sales_complete: false,
                expected_closing,
                mortality_rate: rate,
                target_daily_rate,
                variance,
                zero_death_streak: acc.zero_streak,
                improbable_zero_mortality: improbable,
                status,
            })
        })
        .collect()
}
