use vre_schemas::{BreederCurvePoint, Phase};

pub const LOHMANN_BROWN: &str = "Lohmann Brown Classic";

type Row = (f64, f64, f64, f64, f64, Option<f64>, f64);

// (week, lay, egg_weight_g, large, feed_intake_g, fcr kg/dozen, mortality % per month)
// Lohmann Brown Classic under open-house conditions.
const ROWS: &[Row] = &[
    (18.0, 0.05, 48.0, 0.00, 95.0, None, 0.50),
    (19.0, 0.20, 50.0, 0.05, 100.0, None, 0.45),
    (20.0, 0.50, 52.0, 0.10, 105.0, Some(4.00), 0.40),
    (21.0, 0.70, 54.0, 0.20, 108.0, Some(3.20), 0.35),
    (22.0, 0.82, 55.0, 0.30, 110.0, Some(2.60), 0.35),
    (23.0, 0.88, 56.0, 0.40, 112.0, Some(2.30), 0.30),
    (24.0, 0.91, 57.0, 0.45, 114.0, Some(2.10), 0.30),
    (25.0, 0.92, 58.0, 0.55, 115.0, Some(2.00), 0.30),
    (26.0, 0.93, 58.0, 0.58, 115.0, Some(1.95), 0.30),
    (27.0, 0.94, 59.0, 0.60, 116.0, Some(1.90), 0.30),
    (28.0, 0.94, 59.0, 0.62, 116.0, Some(1.88), 0.30),
    (29.0, 0.94, 60.0, 0.64, 117.0, Some(1.85), 0.30),
    (30.0, 0.95, 60.0, 0.65, 117.0, Some(1.83), 0.30),
    (31.0, 0.95, 60.0, 0.66, 117.0, Some(1.82), 0.30),
    (32.0, 0.95, 61.0, 0.67, 117.0, Some(1.82), 0.30),
    (33.0, 0.94, 61.0, 0.68, 118.0, Some(1.83), 0.30),
    (34.0, 0.94, 61.0, 0.69, 118.0, Some(1.84), 0.30),
    (35.0, 0.94, 62.0, 0.70, 118.0, Some(1.80), 0.30),
    (36.0, 0.93, 62.0, 0.70, 118.0, Some(1.82), 0.30),
    (37.0, 0.93, 62.0, 0.70, 118.0, Some(1.83), 0.30),
    (38.0, 0.92, 62.0, 0.69, 118.0, Some(1.85), 0.30),
    (39.0, 0.92, 62.0, 0.69, 118.0, Some(1.86), 0.30),
    (40.0, 0.91, 63.0, 0.68, 118.0, Some(1.88), 0.30),
    (41.0, 0.91, 63.0, 0.68, 118.0, Some(1.90), 0.30),
    (42.0, 0.90, 63.0, 0.67, 118.0, Some(1.92), 0.30),
    (43.0, 0.90, 63.0, 0.67, 118.0, Some(1.93), 0.30),
    (44.0, 0.89, 63.0, 0.66, 118.0, Some(1.95), 0.30),
    (45.0, 0.90, 63.0, 0.68, 118.0, Some(1.90), 0.30),
    (46.0, 0.89, 63.0, 0.67, 118.0, Some(1.95), 0.35),
    (47.0, 0.88, 63.0, 0.66, 118.0, Some(1.98), 0.35),
    (48.0, 0.87, 64.0, 0.66, 118.0, Some(2.00), 0.35),
    (49.0, 0.87, 64.0, 0.65, 118.0, Some(2.02), 0.35),
    (50.0, 0.86, 64.0, 0.65, 119.0, Some(2.05), 0.35),
    (51.0, 0.85, 64.0, 0.64, 119.0, Some(2.08), 0.35),
    (52.0, 0.85, 64.0, 0.64, 119.0, Some(2.10), 0.35),
    (53.0, 0.84, 64.0, 0.63, 119.0, Some(2.12), 0.40),
    (54.0, 0.84, 64.0, 0.63, 119.0, Some(2.15), 0.40),
    (55.0, 0.85, 64.0, 0.65, 118.0, Some(2.20), 0.40),
    (56.0, 0.83, 64.0, 0.62, 119.0, Some(2.18), 0.40),
    (57.0, 0.82, 64.0, 0.62, 119.0, Some(2.20), 0.40),
    (58.0, 0.81, 64.0, 0.61, 120.0, Some(2.22), 0.40),
    (59.0, 0.80, 64.0, 0.60, 120.0, Some(2.25), 0.40),
    (60.0, 0.79, 64.0, 0.60, 120.0, Some(2.28), 0.40),
    (61.0, 0.78, 64.0, 0.60, 120.0, Some(2.50), 0.50),
    (62.0, 0.77, 64.0, 0.59, 120.0, Some(2.52), 0.50),
    (63.0, 0.76, 64.0, 0.58, 121.0, Some(2.55), 0.50),
    (64.0, 0.75, 64.0, 0.57, 121.0, Some(2.58), 0.50),
    (65.0, 0.78, 64.0, 0.60, 120.0, Some(2.50), 0.50),
    (66.0, 0.73, 63.0, 0.56, 121.0, Some(2.62), 0.55),
    (67.0, 0.72, 63.0, 0.55, 121.0, Some(2.65), 0.55),
    (68.0, 0.71, 63.0, 0.54, 122.0, Some(2.68), 0.55),
    (69.0, 0.70, 63.0, 0.55, 122.0, Some(2.70), 0.55),
    (70.0, 0.70, 63.0, 0.55, 122.0, Some(2.80), 0.60),
    (75.0, 0.65, 63.0, 0.50, 123.0, Some(2.90), 0.65),
    (80.0, 0.60, 62.0, 0.45, 124.0, Some(3.10), 0.70),
];

/// Reference curve points, weeks 18..=80.
pub fn lohmann_brown_curve() -> Vec<BreederCurvePoint> {
    ROWS.iter()
        .map(|&(week, lay, weight, large, intake, fcr, mort)| BreederCurvePoint {
            breed: LOHMANN_BROWN.to_string(),
            week,
            lay_rate: Some(lay),
            egg_weight_g: Some(weight),
            large_fraction: Some(large),
            feed_intake_g: Some(intake),
            fcr,
            mortality_pct_monthly: Some(mort),
            phase: Phase::from_week(week as u32),
        })
        .collect()
}
