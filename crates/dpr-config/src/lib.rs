//! dpr-config
//!
//! Layered YAML configuration for the daily production report (DPR) engine.
//!
//! Layers are merged in order (base -> site -> overrides), secret-looking
//! literals are refused, and the merged document is hashed so every ingest run
//! can be attributed to an exact configuration. [`EngineConfig`] is the typed
//! view the engine actually reads; every key has a default so an empty layer
//! set yields the production settings.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;

/// Env var holding the Postgres connection string. Never stored in YAML.
pub const ENV_DB_URL: &str = "DPR_DATABASE_URL";

/// Known secret-like prefixes / patterns. If any leaf string value in the
/// effective config starts with one of these, loading aborts with
/// CONFIG_SECRET_DETECTED.
const SECRET_PREFIXES: &[&str] = &[
    "sk-",
    "sk_live",
    "sk_test",
    "AKIA",
    "-----BEGIN",
    "ghp_",
    "gho_",
    "glpat-",
    "xoxb-",
    "xoxp-",
    "postgres://",
    "postgresql://",
];

// ---------------------------------------------------------------------------
// Layered loading + hashing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

impl LoadedConfig {
    /// Typed engine settings for this document.
    pub fn engine(&self) -> Result<EngineConfig> {
        EngineConfig::from_json(&self.config_json)
    }
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    // Earlier docs are base, later docs override.
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        if raw.trim().is_empty() {
            continue;
        }
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    enforce_no_secret_literals(&merged)?;

    let canonical_json = canonicalize_json(&merged)?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

/// Serialize with object keys sorted so key order in the YAML never moves the hash.
fn canonicalize_json(v: &Value) -> Result<String> {
    let sorted = sort_keys(v);
    serde_json::to_string(&sorted).context("canonical json serialize failed")
}

fn sort_keys(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let ordered: BTreeMap<&String, Value> =
                map.iter().map(|(k, vv)| (k, sort_keys(vv))).collect();
            let mut out = serde_json::Map::new();
            for (k, vv) in ordered {
                out.insert(k.clone(), vv);
            }
            Value::Object(out)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn enforce_no_secret_literals(v: &Value) -> Result<()> {
    let mut leaves = Vec::new();
    collect_leaf_pointers(v, "", &mut leaves);

    for ptr in leaves {
        if let Some(s) = v.pointer(&ptr).and_then(|val| val.as_str()) {
            if looks_like_secret(s) {
                bail!("CONFIG_SECRET_DETECTED leaf={} value=REDACTED", ptr);
            }
        }
    }
    Ok(())
}

fn looks_like_secret(s: &str) -> bool {
    let t = s.trim();
    if t.len() < 8 {
        return false;
    }
    SECRET_PREFIXES.iter().any(|p| t.starts_with(p))
}

// ---------------------------------------------------------------------------
// Unused-key guard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    /// Minimal set of unused leaf pointers (sorted)
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// JSON-pointer prefixes read by [`EngineConfig`]. A leaf not under one of
/// these is a typo or a stale key.
pub const CONSUMED_POINTERS: &[&str] = &[
    "/timezone",
    "/sheet_name",
    "/missing_data_sentinels",
    "/well_stock_sub_category_id",
    "/rules",
    "/flowmeter",
    "/sheet",
];

/// Produce an unused-key report. `Fail` turns a dirty report into an error.
pub fn report_unused_keys(config_json: &Value, policy: UnusedKeyPolicy) -> Result<UnusedKeyReport> {
    let consumed: BTreeSet<String> = CONSUMED_POINTERS.iter().map(|p| normalize_pointer(p)).collect();

    let mut leaves: Vec<String> = Vec::new();
    collect_leaf_pointers(config_json, "", &mut leaves);

    let mut unused: Vec<String> = leaves
        .into_iter()
        .filter(|lp| !consumed.iter().any(|cp| is_prefix_pointer(cp, lp)))
        // An empty document is a single "/" leaf holding `{}`.
        .filter(|lp| lp != "/")
        .collect();
    unused.sort();
    unused.dedup();

    let report = UnusedKeyReport {
        unused_leaf_pointers: unused,
    };

    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        bail!(
            "CONFIG_UNUSED_KEYS: {} unused config leaf key(s) detected. First few: {}",
            report.unused_leaf_pointers.len(),
            preview_list(&report.unused_leaf_pointers, 12)
        );
    }

    Ok(report)
}

fn normalize_pointer(p: &str) -> String {
    let mut s = p.trim().to_string();
    if s.is_empty() {
        return "/".to_string();
    }
    if !s.starts_with('/') {
        s.insert(0, '/');
    }
    while s.ends_with('/') && s.len() > 1 {
        s.pop();
    }
    s
}

/// "/a/b" consumes "/a/b/c" but NOT "/a/bc".
fn is_prefix_pointer(prefix: &str, leaf: &str) -> bool {
    if prefix == "/" || leaf == prefix {
        return true;
    }
    leaf.starts_with(prefix)
        && leaf
            .get(prefix.len()..prefix.len() + 1)
            .map(|c| c == "/")
            .unwrap_or(false)
}

fn collect_leaf_pointers(v: &Value, prefix: &str, out: &mut Vec<String>) {
    match v {
        Value::Object(map) if !map.is_empty() => {
            for (k, vv) in map.iter() {
                let next = format!("{}/{}", prefix, escape_pointer_token(k));
                collect_leaf_pointers(vv, &next, out);
            }
        }
        Value::Array(arr) if !arr.is_empty() => {
            for (i, vv) in arr.iter().enumerate() {
                let next = format!("{}/{}", prefix, i);
                collect_leaf_pointers(vv, &next, out);
            }
        }
        _ => {
            let p = if prefix.is_empty() {
                "/".to_string()
            } else {
                prefix.to_string()
            };
            out.push(p);
        }
    }
}

fn escape_pointer_token(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}

fn preview_list(items: &[String], n: usize) -> String {
    let take = items.iter().take(n).cloned().collect::<Vec<_>>();
    format!("{:?}", take)
}

// ---------------------------------------------------------------------------
// Typed engine settings
// ---------------------------------------------------------------------------

/// Everything the extractor, rule set and driver read from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// IANA zone in which spreadsheet dates are interpreted.
    pub timezone: String,
    /// Sheet the report lives on inside the workbook.
    pub sheet_name: String,
    /// Cell values meaning "no data" for operating parameters.
    pub missing_data_sentinels: Vec<String>,
    /// Constant written into every well-stock snapshot.
    pub well_stock_sub_category_id: i64,
    pub rules: RuleConfig,
    pub flowmeter: FlowmeterConfig,
    pub sheet: SheetConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timezone: "Asia/Baku".to_string(),
            sheet_name: "Hesabat forması".to_string(),
            missing_data_sentinels: vec!["y".to_string(), "Y".to_string()],
            well_stock_sub_category_id: 1,
            rules: RuleConfig::default(),
            flowmeter: FlowmeterConfig::default(),
            sheet: SheetConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(v: &Value) -> Result<Self> {
        let cfg: EngineConfig =
            serde_json::from_value(v.clone()).context("engine config does not match schema")?;
        cfg.tz()?;
        if cfg.rules.max_liquid_ton < 0.0 {
            bail!("rules.max_liquid_ton must be >= 0");
        }
        Ok(cfg)
    }

    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        self.timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|e| anyhow::anyhow!("invalid timezone '{}': {e}", self.timezone))
    }
}

/// Thresholds and identifiers used by the business rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Field whose flowing wells must name a flowmeter.
    pub primary_field_id: i64,
    /// Stock categories counted as producing/injecting.
    pub producing_stock_category_ids: Vec<i64>,
    /// Production sub-category meaning "flowing".
    pub flowing_sub_category_id: i64,
    pub max_liquid_ton: f64,
    /// Age in days after which a flowing well's test/lab results are stale.
    pub stale_test_days: i64,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            primary_field_id: 1,
            producing_stock_category_ids: vec![1, 2],
            flowing_sub_category_id: 1,
            max_liquid_ton: 500.0,
            stale_test_days: 15,
        }
    }
}

/// Which platforms carry platform-level flow meters, by platform name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowmeterConfig {
    #[serde(deserialize_with = "names")]
    pub metered_platforms: Vec<String>,
    /// Platforms that must report all four readings.
    #[serde(deserialize_with = "names")]
    pub four_reading_platforms: Vec<String>,
    /// Platforms metered on two lines (reading2/reading4); an unchanged
    /// reading versus yesterday raises an advisory.
    #[serde(deserialize_with = "names")]
    pub dual_line_platforms: Vec<String>,
}

impl Default for FlowmeterConfig {
    fn default() -> Self {
        let v = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            metered_platforms: v(&["2", "3", "4", "7", "8", "13"]),
            four_reading_platforms: v(&["8", "13"]),
            dual_line_platforms: v(&["2", "3", "4", "7"]),
        }
    }
}

impl FlowmeterConfig {
    pub fn is_metered(&self, platform: &str) -> bool {
        contains_name(&self.metered_platforms, platform)
    }

    pub fn needs_four_readings(&self, platform: &str) -> bool {
        contains_name(&self.four_reading_platforms, platform)
    }

    pub fn is_dual_line(&self, platform: &str) -> bool {
        contains_name(&self.dual_line_platforms, platform)
    }
}

fn contains_name(list: &[String], name: &str) -> bool {
    let name = name.trim();
    list.iter().any(|p| p.trim() == name)
}

/// Header conventions that select how field/platform context is located.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Region label whose sheets cover exactly one platform.
    pub single_platform_region: String,
    /// Field-cell marker for sheets spanning several fields.
    pub multi_field_marker: String,
    pub multi_field: MultiFieldConfig,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            single_platform_region: "28 May".to_string(),
            multi_field_marker: "LTS".to_string(),
            multi_field: MultiFieldConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiFieldConfig {
    /// Platform code -> field name.
    pub field_by_code: BTreeMap<String, String>,
    /// Field for codes not listed above.
    pub default_field: String,
}

impl Default for MultiFieldConfig {
    fn default() -> Self {
        let mut field_by_code = BTreeMap::new();
        field_by_code.insert("3".to_string(), "Palçıq Pilpiləsi".to_string());
        Self {
            field_by_code,
            default_field: "Neft Daşları".to_string(),
        }
    }
}

impl MultiFieldConfig {
    pub fn field_for_code(&self, code: &str) -> &str {
        self.field_by_code
            .get(code.trim())
            .map(String::as_str)
            .unwrap_or(self.default_field.as_str())
    }
}

/// Platform names show up in YAML as bare numbers (`[2, 3, 8]`) as often as strings.
fn names<'de, D>(d: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Name {
        Int(i64),
        Float(f64),
        Text(String),
    }

    let raw: Vec<Name> = Vec::deserialize(d)?;
    Ok(raw
        .into_iter()
        .map(|n| match n {
            Name::Int(i) => i.to_string(),
            Name::Float(f) => f.to_string(),
            Name::Text(s) => s.trim().to_string(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_layers_yield_defaults() {
        let loaded = load_layered_yaml_from_strings(&[]).unwrap();
        let cfg = loaded.engine().unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.tz().unwrap(), chrono_tz::Asia::Baku);
    }

    #[test]
    fn numeric_platform_names_are_accepted() {
        let loaded = load_layered_yaml_from_strings(&[
            "flowmeter:\n  metered_platforms: [2, \"7\", 13]\n",
        ])
        .unwrap();
        let cfg = loaded.engine().unwrap();
        assert!(cfg.flowmeter.is_metered("13"));
        assert!(cfg.flowmeter.is_metered(" 7 "));
        assert!(!cfg.flowmeter.is_metered("8"));
        // untouched sections keep defaults
        assert!(cfg.flowmeter.needs_four_readings("8"));
    }

    #[test]
    fn invalid_timezone_rejected() {
        let loaded = load_layered_yaml_from_strings(&["timezone: Mars/Olympus\n"]).unwrap();
        assert!(loaded.engine().is_err());
    }

    #[test]
    fn multi_field_mapping_falls_back_to_default() {
        let cfg = MultiFieldConfig::default();
        assert_eq!(cfg.field_for_code("3"), "Palçıq Pilpiləsi");
        assert_eq!(cfg.field_for_code("11"), "Neft Daşları");
    }

    #[test]
    fn connection_string_literal_is_refused() {
        let err = load_layered_yaml_from_strings(&["db: \"postgres://u:p@h/db\"\n"]).unwrap_err();
        assert!(err.to_string().contains("CONFIG_SECRET_DETECTED"));
    }

    #[test]
    fn pointer_prefix_boundaries() {
        assert!(is_prefix_pointer("/rules", "/rules/max_liquid_ton"));
        assert!(!is_prefix_pointer("/rules", "/rulesx"));
        assert!(is_prefix_pointer("/", "/anything"));
    }
}
