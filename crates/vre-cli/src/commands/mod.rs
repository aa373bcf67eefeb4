//! Command handler modules for vre-cli.
//!
//! Shared config loading lives here; command-specific logic lives in the submodules.

pub mod catalog;
pub mod run;

use anyhow::Result;
use vre_config::{load_layered_yaml, report_unused_keys, LoadedConfig, UnusedKeyPolicy, VreConfig};

/// Load layered YAML, report unused keys, and fail fast on any bad threshold.
pub fn load_config(paths: &[String], strict_keys: bool) -> Result<(LoadedConfig, VreConfig)> {
    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    let loaded = load_layered_yaml(&path_refs)?;

    let policy = if strict_keys {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let report = report_unused_keys(&loaded.config_json, policy)?;
    if !report.is_clean() {
        eprintln!("WARN: CONFIG_UNUSED_KEYS unused_leaf_keys={}", report.unused_leaf_pointers.len());
        for p in report.unused_leaf_pointers.iter().take(50) {
            eprintln!("  unused={}", p);
        }
    }

    let typed = loaded.typed()?;
    Ok((loaded, typed))
}

pub fn config_hash(paths: Vec<String>, strict_keys: bool) -> Result<()> {
    let (loaded, _) = load_config(&paths, strict_keys)?;
    println!("config_hash={}", loaded.config_hash);
    println!("{}", loaded.canonical_json);
    Ok(())
}
