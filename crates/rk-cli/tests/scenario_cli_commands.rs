//! Scenario: the ratekit binary end to end, on files in a temp dir.
//!
//! # Invariants under test
//!
//! 1. `config-hash` prints the hash then the canonical JSON.
//! 2. `validate-list` exits non-zero and names each issue on a broken list.
//! 3. `quote` prints the comparison JSON for a reseller tenant.
//! 4. `drift` prints the report; it fails only when a sample is `Error`.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

const LISTS: &str = r#"
- id: master
  name: BRT supplier
  list_type: {kind: supplier}
  courier_id: brt
  status: active
  entries:
    - {key: {zone: IT-ITALIA}, weight_from: 0, weight_to: 5, base_price: 4.40}
    - {key: {zone: IT-ITALIA}, weight_from: 5, weight_to: 10, base_price: 6.20}
- id: platform
  list_type: {kind: custom, master_list_id: master}
  status: active
  default_margin_percent: 10
  entries:
    - {key: {zone: IT-ITALIA}, weight_from: 0, weight_to: 10, base_price: 4.40}
- id: reseller
  list_type: {kind: custom, master_list_id: master}
  status: active
  entries:
    - {key: {zone: IT-ITALIA}, weight_from: 0, weight_to: 5, base_price: 8.00}
"#;

const BROKEN_LIST: &str = r#"
id: broken
list_type: {kind: supplier}
vat_rate: 140
entries:
  - {key: {zone: IT-ITALIA}, weight_from: 0, weight_to: 5, base_price: 4.40}
  - {key: {zone: IT-ITALIA}, weight_from: 3, weight_to: 8, base_price: 5.00}
"#;

fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
    let p = dir.join(name);
    std::fs::write(&p, body).unwrap();
    p
}

fn ratekit() -> Command {
    let mut cmd = Command::cargo_bin("ratekit").unwrap();
    cmd.env("RUST_LOG", "warn");
    cmd
}

#[test]
fn config_hash_prints_hash_and_canonical_json() {
    let dir = tempfile::tempdir().unwrap();
    let base = write(dir.path(), "base.yaml", "drift:\n  seed: 3\npricing:\n  margin_epsilon: 0.01\n");

    ratekit()
        .args(["config-hash", base.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^config_hash=[0-9a-f]{64}\n").unwrap())
        .stdout(predicate::str::contains(r#"{"drift":{"seed":3},"pricing":{"margin_epsilon":0.01}}"#));
}

#[test]
fn validate_list_reports_issues_and_fails() {
    let dir = tempfile::tempdir().unwrap();
    let good = write(dir.path(), "lists.yaml", LISTS);
    let broken = write(dir.path(), "broken.yaml", BROKEN_LIST);

    ratekit()
        .args(["validate-list", "--file", good.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("list=master ok=true"));

    ratekit()
        .args(["validate-list", "--file", broken.to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("list=broken ok=false issues=2"))
        .stderr(predicate::str::contains("LIST_INVALID"));
}

#[test]
fn quote_prints_comparison_for_reseller() {
    let dir = tempfile::tempdir().unwrap();
    let lists = write(dir.path(), "lists.yaml", LISTS);
    let tenant = write(
        dir.path(),
        "tenant.json",
        r#"{"kind":"reseller","own_list":"reseller","platform_list":"platform"}"#,
    );
    let light = write(dir.path(), "light.json", r#"{"destination":{"zone":"IT-ITALIA"},"weight_kg":2}"#);
    let heavy = write(dir.path(), "heavy.json", r#"{"destination":{"zone":"IT-ITALIA"},"weight_kg":7}"#);

    let run = |request: &Path| {
        let out = ratekit()
            .args(["quote", "--lists", lists.to_str().unwrap()])
            .args(["--tenant", tenant.to_str().unwrap()])
            .args(["--request", request.to_str().unwrap()])
            .output()
            .unwrap();
        assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
        serde_json::from_slice::<serde_json::Value>(&out.stdout).unwrap()
    };

    let json = run(&light);
    assert_eq!(json["outcome"], "compared");
    assert_eq!(json["api_source"], "reseller");
    assert_eq!(json["selected"]["final_price"], 8.0);

    // Reseller list stops at 5 kg; the platform price is used.
    let json = run(&heavy);
    assert_eq!(json["api_source"], "master");
    assert_eq!(json["selected"]["final_price"], 6.82);
}

#[test]
fn drift_fails_only_on_error_samples() {
    let dir = tempfile::tempdir().unwrap();
    let lists = write(dir.path(), "lists.yaml", LISTS);
    let close = write(
        dir.path(),
        "close.csv",
        "key_kind,key,service_type,weight_kg,amount,vat_mode\n\
         zone,IT-ITALIA,standard,5,4.41,excluded\n\
         zone,IT-ITALIA,standard,10,6.20,excluded\n",
    );
    let far = write(
        dir.path(),
        "far.csv",
        "key_kind,key,service_type,weight_kg,amount,vat_mode\n\
         zone,IT-ITALIA,standard,5,5.50,excluded\n\
         zone,IT-ITALIA,standard,10,6.20,excluded\n",
    );

    ratekit()
        .args(["drift", "--lists", lists.to_str().unwrap(), "--list-id", "master"])
        .args(["--live", close.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""matched": 2"#));

    ratekit()
        .args(["drift", "--lists", lists.to_str().unwrap(), "--list-id", "master"])
        .args(["--live", far.to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains(r#""error": 1"#))
        .stderr(predicate::str::contains("DRIFT_ERRORS"));
}
