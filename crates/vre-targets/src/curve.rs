use std::collections::BTreeMap;
use thiserror::Error;
use vre_schemas::{BreederCurvePoint, TargetMetric};

#[derive(Clone, Debug, PartialEq, Error)]
pub enum CurveError {
    #[error("breeder curve for '{breed}' has no points")]
    Empty { breed: String },
    #[error("breeder curve for '{breed}' has a non-finite week ({week})")]
    NonFiniteWeek { breed: String, week: f64 },
    #[error("breeder curve for '{breed}' lists week {week} more than once")]
    DuplicateWeek { breed: String, week: f64 },
    #[error("point for breed '{found}' passed to curve for '{expected}'")]
    MixedBreed { expected: String, found: String },
}

/// Numeric curve column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CurveColumn {
    LayRate,
    EggWeight,
    LargeFraction,
    FeedIntake,
    Fcr,
    MortalityPctMonthly,
}

impl CurveColumn {
    pub fn read(&self, p: &BreederCurvePoint) -> Option<f64> {
        match self {
            CurveColumn::LayRate => p.lay_rate,
            CurveColumn::EggWeight => p.egg_weight_g,
            CurveColumn::LargeFraction => p.large_fraction,
            CurveColumn::FeedIntake => p.feed_intake_g,
            CurveColumn::Fcr => p.fcr,
            CurveColumn::MortalityPctMonthly => p.mortality_pct_monthly,
        }
    }
}

impl From<TargetMetric> for CurveColumn {
    fn from(m: TargetMetric) -> Self {
        match m {
            TargetMetric::LayRate => CurveColumn::LayRate,
            TargetMetric::EggWeight => CurveColumn::EggWeight,
            TargetMetric::FeedIntake => CurveColumn::FeedIntake,
            TargetMetric::Fcr => CurveColumn::Fcr,
            TargetMetric::Mortality => CurveColumn::MortalityPctMonthly,
            TargetMetric::LargeFraction => CurveColumn::LargeFraction,
        }
    }
}

/// One breed's reference curve, sorted by week, non-empty, no duplicate weeks.
#[derive(Clone, Debug, PartialEq)]
pub struct BreederCurve {
    breed: String,
    points: Vec<BreederCurvePoint>,
}

impl BreederCurve {
    pub fn new(breed: impl Into<String>, mut points: Vec<BreederCurvePoint>) -> Result<Self, CurveError> {
        let breed = breed.into();
        if points.is_empty() {
            return Err(CurveError::Empty { breed });
        }
        for p in &points {
            if !p.week.is_finite() {
                return Err(CurveError::NonFiniteWeek { breed, week: p.week });
            }
            if p.breed != breed {
                return Err(CurveError::MixedBreed {
                    expected: breed,
                    found: p.breed.clone(),
                });
            }
        }
        points.sort_by(|a, b| a.week.total_cmp(&b.week));
        if let Some(w) = points.windows(2).find(|w| w[0].week == w[1].week) {
            return Err(CurveError::DuplicateWeek { breed, week: w[0].week });
        }
        Ok(Self { breed, points })
    }

    pub fn breed(&self) -> &str {
        &self.breed
    }

    pub fn points(&self) -> &[BreederCurvePoint] {
        &self.points
    }

    /// Value of `column` at `week`.
    ///
    /// - at or below the first week: the first point's value
    /// - at or above the last week: the last point's value
    /// - between two points: linear when both are defined, the defined one when
    ///   only one is, `None` when neither is
    pub fn interpolate(&self, column: CurveColumn, week: f64) -> Option<f64> {
        let first = &self.points[0];
        let last = &self.points[self.points.len() - 1];

        if week.is_nan() || week <= first.week {
            return column.read(first);
        }
        if week >= last.week {
            return column.read(last);
        }

        // first.week < week < last.week, so 1 <= idx < len
        let idx = self.points.partition_point(|p| p.week <= week);
        let lo = &self.points[idx - 1];
        let hi = &self.points[idx];
        if lo.week == week {
            return column.read(lo);
        }

        match (column.read(lo), column.read(hi)) {
            (Some(a), Some(b)) => {
                let t = (week - lo.week) / (hi.week - lo.week);
                Some(a + (b - a) * t)
            }
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        }
    }
}

/// Breed name -> curve.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CurveTable {
    curves: BTreeMap<String, BreederCurve>,
}

impl CurveTable {
    /// Group mixed-breed points into per-breed curves.
    pub fn from_points(points: Vec<BreederCurvePoint>) -> Result<Self, CurveError> {
        let mut grouped: BTreeMap<String, Vec<BreederCurvePoint>> = BTreeMap::new();
        for p in points {
            grouped.entry(p.breed.clone()).or_default().push(p);
        }
        let mut curves = BTreeMap::new();
        for (breed, pts) in grouped {
            let curve = BreederCurve::new(breed.clone(), pts)?;
            curves.insert(breed, curve);
        }
        Ok(Self { curves })
    }

    pub fn insert(&mut self, curve: BreederCurve) {
        self.curves.insert(curve.breed.clone(), curve);
    }

    pub fn get(&self, breed: &str) -> Option<&BreederCurve> {
        self.curves.get(breed)
    }

    pub fn breeds(&self) -> impl Iterator<Item = &str> {
        self.curves.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vre_schemas::Phase;

    fn pt(week: f64, lay: Option<f64>, fcr: Option<f64>) -> BreederCurvePoint {
        BreederCurvePoint {
            breed: "X".into(),
            week,
            lay_rate: lay,
            egg_weight_g: None,
            large_fraction: None,
            feed_intake_g: None,
            fcr,
            mortality_pct_monthly: None,
            phase: Phase::from_week(week as u32),
        }
    }

    #[test]
    fn construction_rejects_bad_tables() {
        assert!(matches!(BreederCurve::new("X", vec![]), Err(CurveError::Empty { .. })));
        assert!(matches!(
            BreederCurve::new("X", vec![pt(20.0, None, None), pt(20.0, None, None)]),
            Err(CurveError::DuplicateWeek { .. })
        ));
        assert!(matches!(
            BreederCurve::new("X", vec![pt(f64::INFINITY, None, None)]),
            Err(CurveError::NonFiniteWeek { .. })
        ));
        assert!(matches!(
            BreederCurve::new("Y", vec![pt(20.0, None, None)]),
            Err(CurveError::MixedBreed { .. })
        ));
    }

    #[test]
    fn unsorted_input_is_sorted() {
        let c = BreederCurve::new("X", vec![pt(22.0, Some(0.8), None), pt(20.0, Some(0.5), None)]).unwrap();
        assert_eq!(c.points()[0].week, 20.0);
        assert!((c.interpolate(CurveColumn::LayRate, 21.0).unwrap() - 0.65).abs() < 1e-12);
    }

    #[test]
    fn one_sided_bracket_returns_defined_side() {
        let c = BreederCurve::new("X", vec![pt(19.0, Some(0.2), None), pt(20.0, Some(0.5), Some(4.0))]).unwrap();
        assert_eq!(c.interpolate(CurveColumn::Fcr, 19.5), Some(4.0));
        assert_eq!(c.interpolate(CurveColumn::Fcr, 19.0), None);
        assert_eq!(c.interpolate(CurveColumn::EggWeight, 19.5), None);
    }
}
