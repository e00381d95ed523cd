//! Scenario: the production binary is built from engine and ingest crates only.
//!
//! # Invariants under test
//!
//! 1. `rk-testkit` (fault-injecting repository, scripted carrier) is not a
//!    normal dependency of the `ratekit` binary.
//! 2. File-backed collaborators come from `rk-ingest`.

fn section<'a>(manifest: &'a str, header: &str) -> Vec<&'a str> {
    manifest
        .lines()
        .skip_while(|l| l.trim() != header)
        .skip(1)
        .take_while(|l| !l.trim_start().starts_with('['))
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect()
}

#[test]
fn testkit_is_not_linked_into_the_binary() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");
    let manifest = std::fs::read_to_string(path).unwrap();
    let deps = section(&manifest, "[dependencies]");

    assert!(!deps.is_empty());
    assert!(deps.iter().all(|l| !l.starts_with("rk-testkit")), "{deps:?}");
    assert!(deps.iter().any(|l| l.starts_with("rk-ingest")), "{deps:?}");
}
