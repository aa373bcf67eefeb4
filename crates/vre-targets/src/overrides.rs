use vre_schemas::{OverrideRule, OverrideScope, TargetMetric};

/// Read-only lookup over manager-set overrides.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverrideResolver {
    rules: Vec<OverrideRule>,
}

impl OverrideResolver {
    pub fn new(rules: Vec<OverrideRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[OverrideRule] {
        &self.rules
    }

    /// Winning rule for (cohort, breed, metric, whole week), if any.
    ///
    /// A cohort-specific rule for this cohort beats any breed-wide rule for this
    /// breed. Within a scope the latest `set_date` wins, then the highest id.
    pub fn resolve(&self, cohort_id: &str, breed: &str, metric: TargetMetric, week: u32) -> Option<&OverrideRule> {
        let applies = |r: &&OverrideRule| r.metric == metric && r.covers_week(week);
        let newest = |r: &&OverrideRule| (r.set_date, r.override_id);

        let cohort_rule = self
            .rules
            .iter()
            .filter(applies)
            .filter(|r| matches!(&r.scope, OverrideScope::CohortSpecific { cohort_id: c } if c == cohort_id))
            .max_by_key(newest);
        if cohort_rule.is_some() {
            return cohort_rule;
        }

        self.rules
            .iter()
            .filter(applies)
            .filter(|r| matches!(&r.scope, OverrideScope::BreedWide { breed: b } if b == breed))
            .max_by_key(newest)
    }
}
