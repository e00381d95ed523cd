//! Scenario: the config hash identifies the effective configuration.
//!
//! # Invariants under test
//!
//! 1. The same layers hash identically on every load.
//! 2. Key order in the source YAML does not change the hash or canonical JSON.
//! 3. Different values give different hashes.
//! 4. Later layers override earlier ones; untouched siblings survive.
//! 5. `load_layered_yaml` over files equals loading the same strings.

use rk_config::{load_layered_yaml, load_layered_yaml_from_strings};

const BASE_YAML: &str = r#"
pricing:
  default_margin_percent: 10
  margin_epsilon: 0.01
comparator:
  source_timeout_ms: 5000
drift:
  concurrency: 4
  seed: 42
"#;

const BASE_YAML_REORDERED: &str = r#"
drift:
  seed: 42
  concurrency: 4
comparator:
  source_timeout_ms: 5000
pricing:
  margin_epsilon: 0.01
  default_margin_percent: 10
"#;

const OVERLAY_YAML: &str = r#"
drift:
  concurrency: 8
"#;

#[test]
fn same_input_produces_identical_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
    assert_eq!(a.canonical_json, b.canonical_json);
}

#[test]
fn reordered_keys_produce_same_hash() {
    let original = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let reordered = load_layered_yaml_from_strings(&[BASE_YAML_REORDERED]).unwrap();
    assert_eq!(original.config_hash, reordered.config_hash);
    assert_eq!(original.canonical_json, reordered.canonical_json);
    assert!(original.canonical_json.starts_with(r#"{"comparator":"#));
}

#[test]
fn different_values_produce_different_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML, "drift: {seed: 43}"]).unwrap();
    assert_ne!(a.config_hash, b.config_hash);
}

#[test]
fn overlay_overrides_and_keeps_siblings() {
    let merged = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    let json = &merged.config_json;
    assert_eq!(json.pointer("/drift/concurrency").and_then(|v| v.as_u64()), Some(8));
    assert_eq!(json.pointer("/drift/seed").and_then(|v| v.as_u64()), Some(42));
}

#[test]
fn hash_is_64_hex_chars() {
    let loaded = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    assert_eq!(loaded.config_hash.len(), 64);
    assert!(loaded.config_hash.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn empty_layers_are_stable() {
    let a = load_layered_yaml_from_strings(&["{}"]).unwrap();
    let b = load_layered_yaml_from_strings(&[""]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
    assert_eq!(a.canonical_json, "{}");
}

#[test]
fn files_load_like_strings() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base.yaml");
    let overlay = dir.path().join("overlay.yaml");
    std::fs::write(&base, BASE_YAML).unwrap();
    std::fs::write(&overlay, OVERLAY_YAML).unwrap();

    let from_files = load_layered_yaml(&[base.to_str().unwrap(), overlay.to_str().unwrap()]).unwrap();
    let from_strings = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_eq!(from_files.config_hash, from_strings.config_hash);

    let missing = dir.path().join("nope.yaml");
    let err = load_layered_yaml(&[missing.to_str().unwrap()]).unwrap_err();
    assert!(format!("{err:#}").contains("failed to read yaml path"));
}
