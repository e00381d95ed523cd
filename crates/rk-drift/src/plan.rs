use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rk_money::Grams;
use rk_tables::{find_entry, PriceList, PriceListEntry, RateKey, ServiceType};
use serde::{Deserialize, Serialize};

use crate::client::Probe;

/// The probes a drift run checks, in the order they are reported.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftPlan {
    probes: Vec<Probe>,
}

impl DriftPlan {
    pub fn new(probes: Vec<Probe>) -> Self {
        Self { probes }
    }

    /// Up to `n` distinct probes drawn from the list's own brackets. Same
    /// list, `n` and `seed` give the same plan.
    ///
    /// Each bracket is probed at a weight the matcher resolves back to that
    /// bracket: its upper weight when possible, else a weight inside it.
    /// Brackets no weight resolves to (ambiguous or fully shadowed) are
    /// probed at their upper weight so the run reports them.
    pub fn sampled(list: &PriceList, n: usize, seed: u64) -> Self {
        let candidates: Vec<Probe> = list
            .entries
            .iter()
            .filter(|e| e.weight_from <= e.weight_to)
            .map(|e| Probe {
                key: e.key.canonical(),
                service_type: e.service_type,
                weight: owning_weight(&list.entries, e),
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let amount = n.min(candidates.len());
        let mut rng = StdRng::seed_from_u64(seed);
        let mut picked = rand::seq::index::sample(&mut rng, candidates.len(), amount).into_vec();
        picked.sort_unstable();
        Self {
            probes: picked.into_iter().map(|i| candidates[i].clone()).collect(),
        }
    }

    /// Every key × weight combination for one service type.
    pub fn grid(keys: &[RateKey], weights: &[Grams], service_type: ServiceType) -> Self {
        let probes = keys
            .iter()
            .flat_map(|k| {
                weights.iter().map(move |w| Probe {
                    key: k.clone(),
                    service_type,
                    weight: *w,
                })
            })
            .collect();
        Self { probes }
    }

    pub fn probes(&self) -> &[Probe] {
        &self.probes
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }
}

/// A weight at which `find_entry` picks `entry` itself.
fn owning_weight(entries: &[PriceListEntry], entry: &PriceListEntry) -> Grams {
    let (from, to) = (entry.weight_from.raw(), entry.weight_to.raw());
    let tries = [to, from + (to - from) / 2, from, (from + 1).min(to), (to - 1).max(from)];
    let key = entry.key.canonical();
    tries
        .into_iter()
        .map(Grams::new)
        .find(|w| {
            find_entry(entries, &key, entry.service_type, *w).is_ok_and(|found| std::ptr::eq(found, entry))
        })
        .unwrap_or(entry.weight_to)
}
