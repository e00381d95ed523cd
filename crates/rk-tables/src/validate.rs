//! Static checks over a whole price list.
//!
//! The matcher refuses ambiguous lookups at quote time; `validate_list`
//! finds the same problems (and a few more) before a list is published.

use std::collections::BTreeMap;
use std::fmt;

use rk_money::{Grams, Micros, Percent};

use crate::model::{PriceList, PriceListEntry, RateKey, ServiceType};

#[derive(Clone, Debug, PartialEq)]
pub enum ListIssue {
    InvalidVatRate { rate: f64 },
    CustomListIsOwnMaster,
    NegativeAccessory { field: &'static str },
    NegativePrice { entry: usize, field: &'static str, value: Micros },
    NegativePercent { entry: usize, field: &'static str, value: Percent },
    InvertedBracket { entry: usize, weight_from: Grams, weight_to: Grams },
    /// Same key, service and range.
    DuplicateBracket { first: usize, second: usize },
    /// Ranges intersect beyond a shared endpoint without one containing the other.
    OverlappingBrackets { first: usize, second: usize },
}

impl ListIssue {
    /// List-level issues first, then by entry index, then by kind.
    fn sort_key(&self) -> (Option<usize>, u8, usize) {
        match self {
            ListIssue::InvalidVatRate { .. } => (None, 0, 0),
            ListIssue::CustomListIsOwnMaster => (None, 1, 0),
            ListIssue::NegativeAccessory { .. } => (None, 2, 0),
            ListIssue::NegativePrice { entry, .. } => (Some(*entry), 3, 0),
            ListIssue::NegativePercent { entry, .. } => (Some(*entry), 4, 0),
            ListIssue::InvertedBracket { entry, .. } => (Some(*entry), 5, 0),
            ListIssue::DuplicateBracket { first, second } => (Some(*first), 6, *second),
            ListIssue::OverlappingBrackets { first, second } => (Some(*first), 7, *second),
        }
    }
}

impl fmt::Display for ListIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListIssue::InvalidVatRate { rate } => write!(f, "vat_rate {rate} outside [0, 100]"),
            ListIssue::CustomListIsOwnMaster => write!(f, "custom list names itself as master"),
            ListIssue::NegativeAccessory { field } => write!(f, "accessories.{field} is negative"),
            ListIssue::NegativePrice { entry, field, value } => {
                write!(f, "entry {entry}: {field} {value} is negative")
            }
            ListIssue::NegativePercent { entry, field, value } => {
                write!(f, "entry {entry}: {field} {value} is negative")
            }
            ListIssue::InvertedBracket {
                entry,
                weight_from,
                weight_to,
            } => write!(f, "entry {entry}: weight_from {weight_from} > weight_to {weight_to}"),
            ListIssue::DuplicateBracket { first, second } => {
                write!(f, "entries {first} and {second} are the same bracket")
            }
            ListIssue::OverlappingBrackets { first, second } => {
                write!(f, "entries {first} and {second} overlap")
            }
        }
    }
}

pub fn validate_list(list: &PriceList) -> Result<(), Vec<ListIssue>> {
    let mut issues = Vec::new();

    if list.vat().is_err() {
        issues.push(ListIssue::InvalidVatRate { rate: list.vat_rate });
    }
    if list.master_list_id() == Some(&list.id) {
        issues.push(ListIssue::CustomListIsOwnMaster);
    }
    if list.accessories.cash_on_delivery_fee.is_some_and(Micros::is_negative) {
        issues.push(ListIssue::NegativeAccessory {
            field: "cash_on_delivery_fee",
        });
    }
    if list.accessories.insurance_rate_percent.is_some_and(Percent::is_negative) {
        issues.push(ListIssue::NegativeAccessory {
            field: "insurance_rate_percent",
        });
    }

    for (i, e) in list.entries.iter().enumerate() {
        check_entry(i, e, &mut issues);
    }
    check_brackets(&list.entries, &mut issues);

    if issues.is_empty() {
        return Ok(());
    }
    issues.sort_by_key(ListIssue::sort_key);
    Err(issues)
}

fn check_entry(i: usize, e: &PriceListEntry, issues: &mut Vec<ListIssue>) {
    for (field, value) in [
        ("base_price", e.base_price),
        ("island_surcharge", e.island_surcharge),
        ("restricted_zone_surcharge", e.restricted_zone_surcharge),
    ] {
        if value.is_negative() {
            issues.push(ListIssue::NegativePrice { entry: i, field, value });
        }
    }
    if e.fuel_surcharge_percent.is_negative() {
        issues.push(ListIssue::NegativePercent {
            entry: i,
            field: "fuel_surcharge_percent",
            value: e.fuel_surcharge_percent,
        });
    }
    if e.weight_from > e.weight_to {
        issues.push(ListIssue::InvertedBracket {
            entry: i,
            weight_from: e.weight_from,
            weight_to: e.weight_to,
        });
    }
}

/// Nested brackets are fine (the narrower one wins); partial overlaps and
/// exact duplicates are not.
fn check_brackets(entries: &[PriceListEntry], issues: &mut Vec<ListIssue>) {
    let mut groups: BTreeMap<(RateKey, ServiceType), Vec<usize>> = BTreeMap::new();
    for (i, e) in entries.iter().enumerate() {
        if e.weight_from <= e.weight_to {
            groups.entry((e.key.canonical(), e.service_type)).or_default().push(i);
        }
    }

    for idx in groups.values() {
        for (n, &a) in idx.iter().enumerate() {
            for &b in &idx[n + 1..] {
                let (x, y) = (&entries[a], &entries[b]);
                if x.weight_from == y.weight_from && x.weight_to == y.weight_to {
                    issues.push(ListIssue::DuplicateBracket { first: a, second: b });
                    continue;
                }
                let intersect = x.weight_from < y.weight_to && y.weight_from < x.weight_to;
                let nested = (x.weight_from <= y.weight_from && y.weight_to <= x.weight_to)
                    || (y.weight_from <= x.weight_from && x.weight_to <= y.weight_to);
                if intersect && !nested {
                    issues.push(ListIssue::OverlappingBrackets { first: a, second: b });
                }
            }
        }
    }
}
