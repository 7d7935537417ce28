//! Config hash stability.
//!
//! GREEN when:
//! - the same layers hash identically on every call
//! - reordering keys inside a layer does not move the hash
//! - an overlay that changes a value produces a different hash
//! - overlay values win over base values in the typed view

use dpr_config::load_layered_yaml_from_strings;

const BASE_YAML: &str = r#"
timezone: "Asia/Baku"
rules:
  primary_field_id: 1
  max_liquid_ton: 500
flowmeter:
  metered_platforms: [2, 3, 4, 7, 8, 13]
  four_reading_platforms: [8, 13]
"#;

const BASE_YAML_REORDERED: &str = r#"
flowmeter:
  four_reading_platforms: [8, 13]
  metered_platforms: [2, 3, 4, 7, 8, 13]
rules:
  max_liquid_ton: 500
  primary_field_id: 1
timezone: "Asia/Baku"
"#;

const OVERLAY_YAML: &str = r#"
rules:
  max_liquid_ton: 650
"#;

#[test]
fn same_input_produces_identical_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
    assert_eq!(a.canonical_json, b.canonical_json);
}

#[test]
fn key_order_does_not_change_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML_REORDERED]).unwrap();
    assert_eq!(
        a.config_hash, b.config_hash,
        "canonicalization must sort object keys"
    );
}

#[test]
fn overlay_changes_hash_and_wins() {
    let base = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let layered = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_ne!(base.config_hash, layered.config_hash);

    let cfg = layered.engine().unwrap();
    assert_eq!(cfg.rules.max_liquid_ton, 650.0);
    // untouched base keys survive the merge
    assert_eq!(cfg.rules.primary_field_id, 1);
    assert!(cfg.flowmeter.needs_four_readings("13"));
}

#[test]
fn hash_is_hex_sha256() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    assert_eq!(a.config_hash.len(), 64);
    assert!(a.config_hash.chars().all(|c| c.is_ascii_hexdigit()));
}
