//! rk-config
//!
//! Layered YAML configuration for the rate engine.
//!
//! Layers are merged in order (later layers override earlier ones), checked
//! for literal secrets, canonicalized to sorted-key JSON and hashed. The hash
//! identifies the effective configuration in logs and drift reports.

mod engine;

pub use engine::{ComparatorConfig, DriftConfig, EngineConfig, PricingConfig};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Literal credential shapes. Config names env vars for credentials
/// (`api_key_env: BRT_API_KEY`); a value with one of these prefixes aborts
/// the load with CONFIG_SECRET_DETECTED.
const SECRET_PREFIXES: &[&str] = &["sk-", "sk_live", "sk_test", "AKIA", "ghp_", "glpat-", "xoxb-", "-----BEGIN"];

/// JSON-pointer prefixes that `EngineConfig` reads. Anything outside them is
/// reported by [`report_unused_keys`].
pub const CONSUMED_POINTERS: &[&str] = &[
    "/pricing/default_margin_percent",
    "/pricing/margin_epsilon",
    "/comparator/source_timeout_ms",
    "/drift/sample_size",
    "/drift/concurrency",
    "/drift/quote_timeout_ms",
    "/drift/match_threshold_pct",
    "/drift/warning_threshold_pct",
    "/drift/seed",
];

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

/// Read each path as one YAML layer, in merge order.
pub fn load_layered_yaml<P: AsRef<Path>>(paths: &[P]) -> Result<LoadedConfig> {
    let docs = paths
        .iter()
        .map(|p| {
            let p = p.as_ref();
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {}", p.display()))
        })
        .collect::<Result<Vec<String>>>()?;
    let doc_refs: Vec<&str> = docs.iter().map(String::as_str).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = Value::Object(Map::new());
    for (i, raw) in yaml_docs.iter().enumerate() {
        let layer: serde_yaml::Value =
            serde_yaml::from_str(raw).with_context(|| format!("invalid yaml in layer {i}"))?;
        // An empty document is an empty layer.
        if layer.is_null() {
            continue;
        }
        let layer = serde_json::to_value(layer).with_context(|| format!("layer {i} is not representable as json"))?;
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

/// Objects merge key by key; any other overlay value replaces the base.
fn merge_layer(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (k, v) in overlay {
                match base.get_mut(&k) {
                    Some(slot) => merge_layer(slot, v),
                    None => {
                        base.insert(k, v);
                    }
                }
            }
        }
        (slot, v) => *slot = v,
    }
}

/// Compact JSON with object keys sorted at every depth, so source key order
/// never changes the hash.
fn canonicalize_json(v: &Value) -> Result<String> {
    serde_json::to_string(&sorted(v)).context("canonical json serialize failed")
}

fn sorted(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::new();
            for k in keys {
                out.insert(k.clone(), sorted(&map[k]));
            }
            Value::Object(out)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sorted).collect()),
        other => other.clone(),
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn reject_secret_literals(v: &Value) -> Result<()> {
    for (ptr, leaf) in leaves(v) {
        if leaf.as_str().is_some_and(looks_like_secret) {
            bail!("CONFIG_SECRET_DETECTED leaf={ptr} value=REDACTED");
        }
    }
    Ok(())
}

fn looks_like_secret(s: &str) -> bool {
    let t = s.trim();
    t.len() >= 8 && SECRET_PREFIXES.iter().any(|p| t.starts_with(p))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    /// Sorted, unique leaf pointers not read by the engine.
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// Leaf keys the engine never reads, usually typos such as
/// `drift.concurency`. With `Fail` any such key is an error.
pub fn report_unused_keys(config_json: &Value, policy: UnusedKeyPolicy) -> Result<UnusedKeyReport> {
    let unused: BTreeSet<String> = leaves(config_json)
        .into_iter()
        .map(|(ptr, _)| ptr)
        .filter(|ptr| !CONSUMED_POINTERS.iter().any(|c| is_prefix_pointer(c, ptr)))
        .collect();

    let report = UnusedKeyReport {
        unused_leaf_pointers: unused.into_iter().collect(),
    };
    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        bail!(
            "CONFIG_UNUSED_KEYS: {} unused config leaf key(s): {:?}",
            report.unused_leaf_pointers.len(),
            report.unused_leaf_pointers.iter().take(12).collect::<Vec<_>>()
        );
    }
    Ok(report)
}

/// "/a/b" is a prefix of "/a/b" and "/a/b/c" but not of "/a/bc".
fn is_prefix_pointer(prefix: &str, leaf: &str) -> bool {
    match leaf.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Every scalar under `v` with its JSON pointer (RFC 6901 escaping).
/// Empty objects and arrays have no leaves.
fn leaves(v: &Value) -> Vec<(String, &Value)> {
    fn walk<'a>(v: &'a Value, ptr: String, out: &mut Vec<(String, &'a Value)>) {
        match v {
            Value::Object(map) => {
                for (k, child) in map {
                    walk(child, format!("{ptr}/{}", k.replace('~', "~0").replace('/', "~1")), out);
                }
            }
            Value::Array(items) => {
                for (i, child) in items.iter().enumerate() {
                    walk(child, format!("{ptr}/{i}"), out);
                }
            }
            scalar => out.push((if ptr.is_empty() { "/".to_string() } else { ptr }, scalar)),
        }
    }
    let mut out = Vec::new();
    walk(v, String::new(), &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_respects_segment_boundaries() {
        assert!(is_prefix_pointer("/drift", "/drift/seed"));
        assert!(is_prefix_pointer("/drift/seed", "/drift/seed"));
        assert!(!is_prefix_pointer("/drift/seed", "/drift/seeds"));
    }

    #[test]
    fn later_layers_override_scalars_and_keep_siblings() {
        let mut merged = serde_json::json!({"drift": {"seed": 1, "concurrency": 4}});
        merge_layer(&mut merged, serde_json::json!({"drift": {"seed": 7}}));
        assert_eq!(merged, serde_json::json!({"drift": {"seed": 7, "concurrency": 4}}));

        merge_layer(&mut merged, serde_json::json!({"drift": 3}));
        assert_eq!(merged, serde_json::json!({"drift": 3}));
    }

    #[test]
    fn leaf_pointers_escape_tokens() {
        let v = serde_json::json!({"a/b": {"c~d": 1}, "xs": [true, {}], "e": {}});
        let mut ptrs: Vec<String> = leaves(&v).into_iter().map(|(p, _)| p).collect();
        ptrs.sort();
        assert_eq!(ptrs, vec!["/a~1b/c~0d", "/xs/0"]);
    }

    #[test]
    fn short_strings_are_never_secrets() {
        assert!(!looks_like_secret("sk-1"));
        assert!(looks_like_secret("  sk-live-abcdef"));
    }
}
