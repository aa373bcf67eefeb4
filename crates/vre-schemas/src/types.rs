use serde::{Deserialize, Serialize};

/// Tri-state exception status. Ordering is severity: `Green < Yellow < Red`,
/// so `max()` over a set of statuses yields the worst one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    Green,
    Yellow,
    Red,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Green => "Green",
            Status::Yellow => "Yellow",
            Status::Red => "Red",
        }
    }
}

/// Yellow/red thresholds for one measured magnitude.
///
/// Invariant (enforced by config validation): `0 <= yellow <= red`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBand {
    pub yellow: f64,
    pub red: f64,
}

impl ThresholdBand {
    pub const fn new(yellow: f64, red: f64) -> Self {
        Self { yellow, red }
    }

    /// Shared status rule:
    /// - magnitude below yellow => Green
    /// - yellow <= magnitude < red => Yellow
    /// - magnitude at or above red => Red
    ///
    /// Callers pass the magnitude they care about (absolute value, excess over
    /// target, ...). A NaN magnitude is treated as Red (fail-closed).
    pub fn classify(&self, magnitude: f64) -> Status {
        if magnitude.is_nan() || magnitude >= self.red {
            Status::Red
        } else if magnitude >= self.yellow {
            Status::Yellow
        } else {
            Status::Green
        }
    }
}

/// Lower-is-worse thresholds (e.g. lay rate). Invariant: `red <= yellow`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloorBand {
    pub yellow: f64,
    pub red: f64,
}

impl FloorBand {
    pub const fn new(yellow: f64, red: f64) -> Self {
        Self { yellow, red }
    }

    /// value >= yellow => Green; red <= value < yellow => Yellow; below red (or NaN) => Red.
    pub fn classify(&self, value: f64) -> Status {
        if value.is_nan() || value < self.red {
            Status::Red
        } else if value < self.yellow {
            Status::Yellow
        } else {
            Status::Green
        }
    }
}

/// A measured gap between expected and observed values.
///
/// `NotApplicable` means "nothing was observed today" (e.g. no physical count);
/// it is never the same thing as a zero variance.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Variance {
    NotApplicable,
    Measured(f64),
}

impl Variance {
    pub fn from_option(v: Option<f64>) -> Self {
        match v {
            Some(x) => Variance::Measured(x),
            None => Variance::NotApplicable,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Variance::Measured(v) => Some(*v),
            Variance::NotApplicable => None,
        }
    }

    pub fn is_applicable(&self) -> bool {
        matches!(self, Variance::Measured(_))
    }

    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Variance::Measured(v) => Variance::Measured(f(v)),
            Variance::NotApplicable => Variance::NotApplicable,
        }
    }
}

/// Age-derived lifecycle stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "Ramp-up")]
    RampUp,
    #[serde(rename = "Peak")]
    Peak,
    #[serde(rename = "Post-peak")]
    PostPeak,
    #[serde(rename = "Late-lay")]
    LateLay,
}

impl Phase {
    /// Fixed week boundaries: <=24 ramp-up, 25..=45 peak, 46..=60 post-peak, >60 late-lay.
    pub fn from_week(week: u32) -> Self {
        match week {
            0..=24 => Phase::RampUp,
            25..=45 => Phase::Peak,
            46..=60 => Phase::PostPeak,
            _ => Phase::LateLay,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::RampUp => "Ramp-up",
            Phase::Peak => "Peak",
            Phase::PostPeak => "Post-peak",
            Phase::LateLay => "Late-lay",
        }
    }
}

/// Log domain a record (or a fraud rule) belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogDomain {
    Production,
    Sales,
    Procurement,
    Feed,
    Mortality,
    InventoryCount,
    EggStock,
    Medication,
}

impl LogDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogDomain::Production => "production",
            LogDomain::Sales => "sales",
            LogDomain::Procurement => "procurement",
            LogDomain::Feed => "feed",
            LogDomain::Mortality => "mortality",
            LogDomain::InventoryCount => "inventory_count",
            LogDomain::EggStock => "egg_stock",
            LogDomain::Medication => "medication",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_is_half_open_on_both_thresholds() {
        let band = ThresholdBand::new(0.5, 2.0);
        assert_eq!(band.classify(0.0), Status::Green);
        assert_eq!(band.classify(0.49), Status::Green);
        assert_eq!(band.classify(0.5), Status::Yellow);
        assert_eq!(band.classify(1.99), Status::Yellow);
        assert_eq!(band.classify(2.0), Status::Red);
        assert_eq!(band.classify(f64::NAN), Status::Red);
    }

    #[test]
    fn floor_band_is_lower_is_worse() {
        let band = FloorBand::new(0.88, 0.85);
        assert_eq!(band.classify(0.90), Status::Green);
        assert_eq!(band.classify(0.88), Status::Green);
        assert_eq!(band.classify(0.87), Status::Yellow);
        assert_eq!(band.classify(0.85), Status::Yellow);
        assert_eq!(band.classify(0.84), Status::Red);
    }

    #[test]
    fn phase_boundaries() {
        assert_eq!(Phase::from_week(18), Phase::RampUp);
        assert_eq!(Phase::from_week(24), Phase::RampUp);
        assert_eq!(Phase::from_week(25), Phase::Peak);
        assert_eq!(Phase::from_week(45), Phase::Peak);
        assert_eq!(Phase::from_week(46), Phase::PostPeak);
        assert_eq!(Phase::from_week(60), Phase::PostPeak);
        assert_eq!(Phase::from_week(61), Phase::LateLay);
    }

    #[test]
    fn status_max_is_worst() {
        let worst = [Status::Green, Status::Red, Status::Yellow]
            .into_iter()
            .max()
            .unwrap();
        assert_eq!(worst, Status::Red);
    }

    #[test]
    fn not_applicable_is_not_zero() {
        assert_ne!(Variance::NotApplicable, Variance::Measured(0.0));
        assert_eq!(Variance::NotApplicable.value(), None);
        assert_eq!(Variance::Measured(-5.0).map(|v| v / 30.0).value(), Some(-5.0 / 30.0));
    }
}
