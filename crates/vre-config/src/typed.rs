use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vre_schemas::{FloorBand, Phase, RiskClass, SaleProduct, ThresholdBand};

use crate::CONSUMED_POINTERS;

/// Typed view of the effective config. Built once at startup, then passed by
/// reference into every engine constructor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VreConfig {
    pub farm: FarmConfig,
    pub targets: TargetConfig,
    pub reconcile: ReconcileConfig,
    pub cycle_count: CycleCountConfig,
    pub ghost_money: GhostMoneyConfig,
    pub fraud: FraudConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FarmConfig {
    pub currency: String,
    pub crate_size: u32,
    pub bag_size_kg: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub defaults: TargetDefaults,
    pub lay: LayThresholdConfig,
    pub fcr: FcrThresholdConfig,
}

/// Fallbacks for unknown breeds or undefined curve columns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetDefaults {
    pub lay_rate: f64,
    pub egg_weight_g: f64,
    pub large_fraction: f64,
    pub feed_intake_g: f64,
    pub fcr: f64,
    pub mortality_pct_monthly: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayThresholdConfig {
    pub peak_absolute: FloorBand,
    pub ramp_up_offset: ThresholdBand,
    pub post_peak_offset: ThresholdBand,
    pub late_lay_offset: ThresholdBand,
}

impl LayThresholdConfig {
    /// Lay floors for a phase given the effective target.
    /// Peak ignores the target and uses absolute floors.
    pub fn floors_for(&self, phase: Phase, target: f64) -> FloorBand {
        let off = match phase {
            Phase::Peak => return self.peak_absolute,
            Phase::RampUp => self.ramp_up_offset,
            Phase::PostPeak => self.post_peak_offset,
            Phase::LateLay => self.late_lay_offset,
        };
        FloorBand::new(target - off.yellow, target - off.red)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FcrThresholdConfig {
    pub peak_absolute: ThresholdBand,
    pub offset: ThresholdBand,
}

impl FcrThresholdConfig {
    pub fn ceilings_for(&self, phase: Phase, target: f64) -> ThresholdBand {
        match phase {
            Phase::Peak => self.peak_absolute,
            _ => ThresholdBand::new(target + self.offset.yellow, target + self.offset.red),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    pub egg_crates: ThresholdBand,
    pub cash: ThresholdBand,
    pub feed_bags: ThresholdBand,
    pub mortality_rate: ThresholdBand,
    pub inventory_pct: ThresholdBand,
    pub zero_mortality: ZeroMortalityConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZeroMortalityConfig {
    pub streak_days: u32,
    /// Smallest opening flock (inclusive) a zero-death streak is judged on.
    pub min_flock: u32,
}

/// One value per inventory risk class.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerRiskClass<T> {
    #[serde(rename = "A")]
    pub a: T,
    #[serde(rename = "B")]
    pub b: T,
    #[serde(rename = "C")]
    pub c: T,
}

impl<T: Copy> PerRiskClass<T> {
    pub fn get(&self, class: RiskClass) -> T {
        match class {
            RiskClass::A => self.a,
            RiskClass::B => self.b,
            RiskClass::C => self.c,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CycleCountConfig {
    pub frequency_days: PerRiskClass<u32>,
    pub risk_weight: PerRiskClass<f64>,
    pub variance_multiplier: f64,
    pub never_counted_ratio: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GhostMoneyConfig {
    pub feed_cost_per_kg: f64,
    pub bird_replacement_cost: f64,
    pub crate_price: f64,
    pub cracked_baseline_fraction: f64,
    pub default_item_unit_cost: f64,
    pub daily: ThresholdBand,
    pub cumulative: ThresholdBand,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferencePrices {
    pub egg_crates: f64,
    pub egg_singles: f64,
    pub manure_bags: f64,
    pub manure_bulk: f64,
    pub culled_birds: f64,
}

impl ReferencePrices {
    pub fn get(&self, product: SaleProduct) -> f64 {
        match product {
            SaleProduct::EggCrates => self.egg_crates,
            SaleProduct::EggSingles => self.egg_singles,
            SaleProduct::ManureBags => self.manure_bags,
            SaleProduct::ManureBulk => self.manure_bulk,
            SaleProduct::CulledBirds => self.culled_birds,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BreakageConfig {
    pub multiplier: f64,
    pub lookback_days: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MortalitySpikeConfig {
    pub multiplier: f64,
    pub lookback_days: u32,
    pub min_deaths: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FraudConfig {
    pub reference_prices: ReferencePrices,
    pub price_deviation_tolerance: f64,
    pub procurement_approval_limit: f64,
    pub cash_deposit_window_hours: u32,
    pub breakage: BreakageConfig,
    pub mortality_spike: MortalitySpikeConfig,
    pub feed_shrinkage_tolerance: f64,
    pub positive_inventory_streak: u32,
}

impl VreConfig {
    /// Build from canonical config JSON (produced by `load_layered_yaml*`).
    ///
    /// Every pointer in `CONSUMED_POINTERS` is required. Fails with:
    /// - CONFIG_MISSING_THRESHOLD when a key is absent or null
    /// - CONFIG_INVALID_THRESHOLD when a value has the wrong type, is negative
    ///   or non-finite, or a yellow/red pair is inverted
    pub fn from_config_json(cfg: &Value) -> Result<Self> {
        for ptr in CONSUMED_POINTERS {
            match cfg.pointer(ptr) {
                None | Some(Value::Null) => bail!("CONFIG_MISSING_THRESHOLD key={}", ptr),
                Some(_) => {}
            }
        }

        let typed: VreConfig = serde_json::from_value(cfg.clone())
            .context("CONFIG_INVALID_THRESHOLD: config does not match the expected shape")?;
        typed.validate()?;
        Ok(typed)
    }

    fn validate(&self) -> Result<()> {
        let f = &self.farm;
        if f.crate_size == 0 {
            bail!("CONFIG_INVALID_THRESHOLD key=/farm/crate_size must be > 0");
        }
        positive("/farm/bag_size_kg", f.bag_size_kg)?;

        let d = &self.targets.defaults;
        non_negative("/targets/defaults/lay_rate", d.lay_rate)?;
        non_negative("/targets/defaults/egg_weight_g", d.egg_weight_g)?;
        non_negative("/targets/defaults/large_fraction", d.large_fraction)?;
        non_negative("/targets/defaults/feed_intake_g", d.feed_intake_g)?;
        non_negative("/targets/defaults/fcr", d.fcr)?;
        non_negative("/targets/defaults/mortality_pct_monthly", d.mortality_pct_monthly)?;

        let lay = &self.targets.lay;
        floor("/targets/lay/peak_absolute", &lay.peak_absolute)?;
        ceiling("/targets/lay/ramp_up_offset", &lay.ramp_up_offset)?;
        ceiling("/targets/lay/post_peak_offset", &lay.post_peak_offset)?;
        ceiling("/targets/lay/late_lay_offset", &lay.late_lay_offset)?;
        ceiling("/targets/fcr/peak_absolute", &self.targets.fcr.peak_absolute)?;
        ceiling("/targets/fcr/offset", &self.targets.fcr.offset)?;

        let r = &self.reconcile;
        ceiling("/reconcile/egg_crates", &r.egg_crates)?;
        ceiling("/reconcile/cash", &r.cash)?;
        ceiling("/reconcile/feed_bags", &r.feed_bags)?;
        ceiling("/reconcile/mortality_rate", &r.mortality_rate)?;
        ceiling("/reconcile/inventory_pct", &r.inventory_pct)?;
        if r.zero_mortality.streak_days == 0 {
            bail!("CONFIG_INVALID_THRESHOLD key=/reconcile/zero_mortality/streak_days must be > 0");
        }

        let cc = &self.cycle_count;
        for (class, days) in [("A", cc.frequency_days.a), ("B", cc.frequency_days.b), ("C", cc.frequency_days.c)] {
            if days == 0 {
                bail!("CONFIG_INVALID_THRESHOLD key=/cycle_count/frequency_days/{} must be > 0", class);
            }
        }
        non_negative("/cycle_count/risk_weight/A", cc.risk_weight.a)?;
        non_negative("/cycle_count/risk_weight/B", cc.risk_weight.b)?;
        non_negative("/cycle_count/risk_weight/C", cc.risk_weight.c)?;
        positive("/cycle_count/variance_multiplier", cc.variance_multiplier)?;
        non_negative("/cycle_count/never_counted_ratio", cc.never_counted_ratio)?;

        let g = &self.ghost_money;
        non_negative("/ghost_money/feed_cost_per_kg", g.feed_cost_per_kg)?;
        non_negative("/ghost_money/bird_replacement_cost", g.bird_replacement_cost)?;
        non_negative("/ghost_money/crate_price", g.crate_price)?;
        non_negative("/ghost_money/cracked_baseline_fraction", g.cracked_baseline_fraction)?;
        non_negative("/ghost_money/default_item_unit_cost", g.default_item_unit_cost)?;
        ceiling("/ghost_money/daily", &g.daily)?;
        ceiling("/ghost_money/cumulative", &g.cumulative)?;

        let fr = &self.fraud;
        let p = &fr.reference_prices;
        non_negative("/fraud/reference_prices/egg_crates", p.egg_crates)?;
        non_negative("/fraud/reference_prices/egg_singles", p.egg_singles)?;
        non_negative("/fraud/reference_prices/manure_bags", p.manure_bags)?;
        non_negative("/fraud/reference_prices/manure_bulk", p.manure_bulk)?;
        non_negative("/fraud/reference_prices/culled_birds", p.culled_birds)?;
        non_negative("/fraud/price_deviation_tolerance", fr.price_deviation_tolerance)?;
        non_negative("/fraud/procurement_approval_limit", fr.procurement_approval_limit)?;
        positive("/fraud/breakage/multiplier", fr.breakage.multiplier)?;
        positive("/fraud/mortality_spike/multiplier", fr.mortality_spike.multiplier)?;
        non_negative("/fraud/feed_shrinkage_tolerance", fr.feed_shrinkage_tolerance)?;
        if fr.breakage.lookback_days == 0 || fr.mortality_spike.lookback_days == 0 {
            bail!("CONFIG_INVALID_THRESHOLD key=/fraud lookback_days must be > 0");
        }
        if fr.positive_inventory_streak == 0 {
            bail!("CONFIG_INVALID_THRESHOLD key=/fraud/positive_inventory_streak must be > 0");
        }
        Ok(())
    }
}

fn non_negative(key: &str, v: f64) -> Result<()> {
    if !v.is_finite() || v < 0.0 {
        bail!("CONFIG_INVALID_THRESHOLD key={} value={} (must be finite and >= 0)", key, v);
    }
    Ok(())
}

fn positive(key: &str, v: f64) -> Result<()> {
    if !v.is_finite() || v <= 0.0 {
        bail!("CONFIG_INVALID_THRESHOLD key={} value={} (must be finite and > 0)", key, v);
    }
    Ok(())
}

/// Higher-is-worse pair: yellow must not exceed red.
fn ceiling(key: &str, b: &ThresholdBand) -> Result<()> {
    non_negative(&format!("{key}/yellow"), b.yellow)?;
    non_negative(&format!("{key}/red"), b.red)?;
    if b.yellow > b.red {
        bail!(
            "CONFIG_INVALID_THRESHOLD key={} inverted band yellow={} > red={}",
            key,
            b.yellow,
            b.red
        );
    }
    Ok(())
}

/// Lower-is-worse pair: red must not exceed yellow.
fn floor(key: &str, b: &FloorBand) -> Result<()> {
    non_negative(&format!("{key}/yellow"), b.yellow)?;
    non_negative(&format!("{key}/red"), b.red)?;
    if b.red > b.yellow {
        bail!(
            "CONFIG_INVALID_THRESHOLD key={} inverted floor red={} > yellow={}",
            key,
            b.red,
            b.yellow
        );
    }
    Ok(())
}
