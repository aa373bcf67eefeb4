//! vre-config
//!
//! Layered YAML configuration for the VRE.
//!
//! Responsibilities:
//! - Merge YAML layers in order (later layers override earlier ones)
//! - Canonical JSON + SHA-256 config hash, so a pass can be tied to the exact config it ran with
//! - Reject secret-looking literals (MoMo / bank API tokens belong in env vars)
//! - Unused-key report against the registry of pointers `VreConfig` actually reads
//! - Typed, validated threshold object (`VreConfig`) injected into every component

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;

mod typed;

pub use typed::*;

/// Leaf strings starting with any of these abort the load (CONFIG_SECRET_DETECTED).
/// Gateway and webhook credentials are read from the environment instead.
const SECRET_PREFIXES: &[&str] = &[
    "-----BEGIN",
    "AKIA",
    "ghp_",
    "sk-",
    "sk_live",
    "sk_test",
    "xoxb-",
    "xoxp-",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    /// Registry pointers the analysis ran against, normalized and sorted.
    pub consumed_prefixes: Vec<String>,
    /// Leaves no registry pointer covers.
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// Every JSON pointer `VreConfig::from_config_json` reads.
///
/// Doubles as the required-key list: a pointer missing here at load time is
/// CONFIG_MISSING_THRESHOLD. Keep in sync with `typed.rs`.
pub const CONSUMED_POINTERS: &[&str] = &[
    "/farm/currency",
    "/farm/crate_size",
    "/farm/bag_size_kg",
    // targets
    "/targets/defaults/lay_rate",
    "/targets/defaults/egg_weight_g",
    "/targets/defaults/large_fraction",
    "/targets/defaults/feed_intake_g",
    "/targets/defaults/fcr",
    "/targets/defaults/mortality_pct_monthly",
    "/targets/lay/peak_absolute/yellow",
    "/targets/lay/peak_absolute/red",
    "/targets/lay/ramp_up_offset/yellow",
    "/targets/lay/ramp_up_offset/red",
    "/targets/lay/post_peak_offset/yellow",
    "/targets/lay/post_peak_offset/red",
    "/targets/lay/late_lay_offset/yellow",
    "/targets/lay/late_lay_offset/red",
    "/targets/fcr/peak_absolute/yellow",
    "/targets/fcr/peak_absolute/red",
    "/targets/fcr/offset/yellow",
    "/targets/fcr/offset/red",
    // reconcile
    "/reconcile/egg_crates/yellow",
    "/reconcile/egg_crates/red",
    "/reconcile/cash/yellow",
    "/reconcile/cash/red",
    "/reconcile/feed_bags/yellow",
    "/reconcile/feed_bags/red",
    "/reconcile/mortality_rate/yellow",
    "/reconcile/mortality_rate/red",
    "/reconcile/inventory_pct/yellow",
    "/reconcile/inventory_pct/red",
    "/reconcile/zero_mortality/streak_days",
    "/reconcile/zero_mortality/min_flock",
    // cycle counts
    "/cycle_count/frequency_days/A",
    "/cycle_count/frequency_days/B",
    "/cycle_count/frequency_days/C",
    "/cycle_count/risk_weight/A",
    "/cycle_count/risk_weight/B",
    "/cycle_count/risk_weight/C",
    "/cycle_count/variance_multiplier",
    "/cycle_count/never_counted_ratio",
    // ghost money
    "/ghost_money/feed_cost_per_kg",
    "/ghost_money/bird_replacement_cost",
    "/ghost_money/crate_price",
    "/ghost_money/cracked_baseline_fraction",
    "/ghost_money/default_item_unit_cost",
    "/ghost_money/daily/yellow",
    "/ghost_money/daily/red",
    "/ghost_money/cumulative/yellow",
    "/ghost_money/cumulative/red",
    // fraud
    "/fraud/reference_prices/egg_crates",
    "/fraud/reference_prices/egg_singles",
    "/fraud/reference_prices/manure_bags",
    "/fraud/reference_prices/manure_bulk",
    "/fraud/reference_prices/culled_birds",
    "/fraud/price_deviation_tolerance",
    "/fraud/procurement_approval_limit",
    "/fraud/cash_deposit_window_hours",
    "/fraud/breakage/multiplier",
    "/fraud/breakage/lookback_days",
    "/fraud/mortality_spike/multiplier",
    "/fraud/mortality_spike/lookback_days",
    "/fraud/mortality_spike/min_deaths",
    "/fraud/feed_shrinkage_tolerance",
    "/fraud/positive_inventory_streak",
];

/// Compare every leaf of `config_json` against [`CONSUMED_POINTERS`].
///
/// `Warn` always hands the report back; `Fail` turns a dirty report into CONFIG_UNUSED_KEYS.
pub fn report_unused_keys(config_json: &Value, policy: UnusedKeyPolicy) -> Result<UnusedKeyReport> {
    let consumed_prefixes: Vec<String> = CONSUMED_POINTERS
        .iter()
        .map(|p| normalize_pointer(p))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let unused_leaf_pointers: Vec<String> = leaf_pointers(config_json)
        .into_iter()
        .map(|(ptr, _)| ptr)
        .filter(|leaf| !consumed_prefixes.iter().any(|c| covers(c, leaf)))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let report = UnusedKeyReport {
        consumed_prefixes,
        unused_leaf_pointers,
    };
    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        let shown: Vec<&String> = report.unused_leaf_pointers.iter().take(12).collect();
        bail!(
            "CONFIG_UNUSED_KEYS: {} config leaf key(s) are never read; drop them or register them. first: {:?}",
            report.unused_leaf_pointers.len(),
            shown
        );
    }
    Ok(report)
}

/// "farm/crate_size/" -> "/farm/crate_size"; blank -> "/".
fn normalize_pointer(p: &str) -> String {
    let body = p.trim().trim_matches('/');
    if body.is_empty() {
        "/".to_string()
    } else {
        format!("/{body}")
    }
}

/// `prefix` covers `leaf` on whole tokens only: "/a/b" covers "/a/b/c", never "/a/bc".
fn covers(prefix: &str, leaf: &str) -> bool {
    match leaf.strip_prefix(prefix) {
        _ if prefix == "/" => true,
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Every scalar (including null) in `root`, keyed by its RFC 6901 pointer.
fn leaf_pointers(root: &Value) -> Vec<(String, &Value)> {
    let mut leaves = Vec::new();
    let mut stack: Vec<(String, &Value)> = vec![(String::new(), root)];
    while let Some((ptr, node)) = stack.pop() {
        match node {
            Value::Object(map) => {
                for (key, child) in map {
                    let token = key.replace('~', "~0").replace('/', "~1");
                    stack.push((format!("{ptr}/{token}"), child));
                }
            }
            Value::Array(items) => {
                for (idx, child) in items.iter().enumerate() {
                    stack.push((format!("{ptr}/{idx}"), child));
                }
            }
            scalar if ptr.is_empty() => leaves.push(("/".to_string(), scalar)),
            scalar => leaves.push((ptr, scalar)),
        }
    }
    leaves
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

impl LoadedConfig {
    /// Build the typed threshold object. Fails fast on any missing or invalid threshold.
    pub fn typed(&self) -> Result<VreConfig> {
        VreConfig::from_config_json(&self.config_json)
    }
}

/// Read each file in order and merge; the last file wins on conflicting leaves.
pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let docs = paths
        .iter()
        .map(|p| fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}")))
        .collect::<Result<Vec<String>>>()?;
    let refs: Vec<&str> = docs.iter().map(String::as_str).collect();
    load_layered_yaml_from_strings(&refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = Value::Object(Default::default());
    for (idx, raw) in yaml_docs.iter().enumerate() {
        let layer: serde_yaml::Value =
            serde_yaml::from_str(raw).with_context(|| format!("invalid yaml in layer {idx}"))?;
        let layer = serde_json::to_value(layer).context("yaml->json conversion failed")?;
        merge_layer(&mut merged, layer);
    }

    reject_secret_literals(&merged)?;

    let canonical_json = canonicalize_json(&merged)?;
    Ok(LoadedConfig {
        config_hash: sha256_hex(canonical_json.as_bytes()),
        canonical_json,
        config_json: merged,
    })
}

/// Objects merge key by key; anything else in `layer` replaces `base` outright.
fn merge_layer(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Object(dst), Value::Object(src)) => {
            for (key, val) in src {
                merge_layer(dst.entry(key).or_insert(Value::Null), val);
            }
        }
        (slot, other) => *slot = other,
    }
}

/// serde_json's default `Map` is BTreeMap-backed, so object keys serialize
/// sorted and source key order never reaches the hash.
pub fn canonicalize_json(v: &Value) -> Result<String> {
    serde_json::to_string(v).context("canonical json serialize failed")
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn reject_secret_literals(root: &Value) -> Result<()> {
    let hit = leaf_pointers(root)
        .into_iter()
        .filter_map(|(ptr, v)| v.as_str().map(|s| (ptr, s.trim())))
        .filter(|(_, s)| s.len() >= 8)
        .find(|(_, s)| SECRET_PREFIXES.iter().any(|p| s.starts_with(p)));
    match hit {
        Some((ptr, _)) => bail!("CONFIG_SECRET_DETECTED leaf={} value=REDACTED", ptr),
        None => Ok(()),
    }
}
