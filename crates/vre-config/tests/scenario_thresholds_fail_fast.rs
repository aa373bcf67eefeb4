use vre_config::{load_layered_yaml_from_strings, report_unused_keys, UnusedKeyPolicy, VreConfig};
use vre_schemas::{Phase, RiskClass, Status};

const BASE_YAML: &str = include_str!("../../../config/vre_base.yaml");

fn err_of(overlay: &str) -> String {
    let loaded = load_layered_yaml_from_strings(&[BASE_YAML, overlay]).unwrap();
    format!("{:#}", VreConfig::from_config_json(&loaded.config_json).unwrap_err())
}

#[test]
fn base_config_loads_with_documented_values() {
    let loaded = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let cfg = loaded.typed().unwrap();

    assert_eq!(cfg.farm.crate_size, 30);
    assert_eq!(cfg.farm.bag_size_kg, 50.0);
    assert_eq!(cfg.targets.defaults.feed_intake_g, 118.0);
    assert_eq!(cfg.cycle_count.frequency_days.get(RiskClass::B), 14);
    assert_eq!(cfg.ghost_money.crate_price, 45.0);

    // Peak lay floors ignore the target; other phases subtract offsets.
    let peak = cfg.targets.lay.floors_for(Phase::Peak, 0.92);
    assert_eq!((peak.yellow, peak.red), (0.88, 0.85));
    let ramp = cfg.targets.lay.floors_for(Phase::RampUp, 0.91);
    assert!((ramp.yellow - 0.84).abs() < 1e-12);
    assert!((ramp.red - 0.81).abs() < 1e-12);
    assert_eq!(cfg.targets.fcr.ceilings_for(Phase::Peak, 1.9).red, 2.5);
    assert_eq!(cfg.reconcile.egg_crates.classify(0.5), Status::Yellow);
}

#[test]
fn base_config_has_no_unused_keys() {
    let loaded = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail).unwrap();
    assert!(report.is_clean());
}

#[test]
fn unused_keys_warn_or_fail() {
    let loaded = load_layered_yaml_from_strings(&[BASE_YAML, "legacy:\n  grid_colour: red\n"]).unwrap();

    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn).unwrap();
    assert_eq!(report.unused_leaf_pointers, vec!["/legacy/grid_colour".to_string()]);

    let err = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail).unwrap_err();
    assert!(err.to_string().contains("CONFIG_UNUSED_KEYS"));
}

#[test]
fn missing_threshold_is_fatal() {
    let loaded = load_layered_yaml_from_strings(&["farm:\n  currency: GHS\n"]).unwrap();
    let err = VreConfig::from_config_json(&loaded.config_json).unwrap_err();
    assert!(err.to_string().contains("CONFIG_MISSING_THRESHOLD"));

    let msg = err_of("reconcile:\n  feed_bags: { yellow: 0.5, red: null }\n");
    assert!(msg.contains("CONFIG_MISSING_THRESHOLD key=/reconcile/feed_bags/red"), "{msg}");
}

#[test]
fn inverted_band_is_fatal() {
    let msg = err_of("reconcile:\n  egg_crates: { yellow: 3.0, red: 2.0 }\n");
    assert!(msg.contains("CONFIG_INVALID_THRESHOLD key=/reconcile/egg_crates"), "{msg}");

    // Lay floors invert the other way: red above yellow is wrong.
    let msg = err_of("targets:\n  lay:\n    peak_absolute: { yellow: 0.85, red: 0.88 }\n");
    assert!(msg.contains("CONFIG_INVALID_THRESHOLD key=/targets/lay/peak_absolute"), "{msg}");
}

#[test]
fn negative_or_mistyped_value_is_fatal() {
    let msg = err_of("ghost_money:\n  crate_price: -45.0\n");
    assert!(msg.contains("CONFIG_INVALID_THRESHOLD key=/ghost_money/crate_price"), "{msg}");

    let msg = err_of("farm:\n  crate_size: \"thirty\"\n");
    assert!(msg.contains("CONFIG_INVALID_THRESHOLD"), "{msg}");
}
