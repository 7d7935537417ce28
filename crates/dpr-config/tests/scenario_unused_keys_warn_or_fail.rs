//! Unused-key guard: a misspelled section must be reported, and `Fail`
//! must turn the report into an error.

use dpr_config::{load_layered_yaml_from_strings, report_unused_keys, UnusedKeyPolicy};

const CLEAN: &str = r#"
rules:
  stale_test_days: 20
sheet:
  multi_field_marker: "LTS"
"#;

const TYPO: &str = r#"
rulez:
  stale_test_days: 20
"#;

#[test]
fn clean_config_reports_nothing() {
    let loaded = load_layered_yaml_from_strings(&[CLEAN]).unwrap();
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail).unwrap();
    assert!(report.is_clean());
}

#[test]
fn empty_config_is_clean() {
    let loaded = load_layered_yaml_from_strings(&[]).unwrap();
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail).unwrap();
    assert!(report.is_clean());
}

#[test]
fn typo_is_reported_under_warn() {
    let loaded = load_layered_yaml_from_strings(&[TYPO]).unwrap();
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn).unwrap();
    assert_eq!(report.unused_leaf_pointers, vec!["/rulez/stale_test_days".to_string()]);
}

#[test]
fn typo_fails_under_fail() {
    let loaded = load_layered_yaml_from_strings(&[TYPO]).unwrap();
    let err = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail).unwrap_err();
    assert!(err.to_string().contains("CONFIG_UNUSED_KEYS"));
}
