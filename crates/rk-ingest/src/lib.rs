//! rk-ingest
//!
//! File-backed collaborators for the engine: list documents (YAML or
//! JSON), a read-only repository over loaded lists, and a carrier client
//! that replays live quotes recorded to CSV.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use rk_tables::PriceList;
use serde::de::DeserializeOwned;

mod recorded;
mod repository;

pub use recorded::RecordedCarrier;
pub use repository::FileRepository;

/// Read a YAML or JSON document, chosen by extension (`.json` is JSON,
/// anything else YAML).
pub fn load_document<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let is_json = path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&raw).with_context(|| format!("parse json {}", path.display()))
    } else {
        serde_yaml::from_str(&raw).with_context(|| format!("parse yaml {}", path.display()))
    }
}

/// A file holding either one list or a sequence of lists.
pub fn load_price_lists(path: impl AsRef<Path>) -> Result<Vec<PriceList>> {
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<PriceList>),
        One(Box<PriceList>),
    }

    let lists = match load_document::<OneOrMany>(path.as_ref())? {
        OneOrMany::Many(v) => v,
        OneOrMany::One(l) => vec![*l],
    };
    let mut seen = BTreeSet::new();
    for l in &lists {
        if !seen.insert(l.id.clone()) {
            bail!("{}: list {} appears twice", path.as_ref().display(), l.id);
        }
    }
    Ok(lists)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_single_list_and_sequences() {
        let dir = tempfile::tempdir().unwrap();
        let one = dir.path().join("one.json");
        fs::write(
            &one,
            r#"{"id":"L1","list_type":{"kind":"supplier"},"entries":[
                {"key":{"zone":"IT-ITALIA"},"weight_from":0,"weight_to":5,"base_price":4.4}]}"#,
        )
        .unwrap();
        let lists = load_price_lists(&one).unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].entries[0].base_price, rk_money::Micros::from_cents(440));

        let many = dir.path().join("many.yaml");
        fs::write(
            &many,
            "- id: a\n  list_type: {kind: supplier}\n- id: a\n  list_type: {kind: supplier}\n",
        )
        .unwrap();
        let err = load_price_lists(&many).unwrap_err().to_string();
        assert!(err.contains("appears twice"), "{err}");
    }

    #[test]
    fn unreadable_file_names_the_path() {
        let err = load_price_lists("/nonexistent/lists.yaml").unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/lists.yaml"));
    }
}
