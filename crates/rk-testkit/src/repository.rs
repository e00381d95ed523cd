//! In-memory list store with per-list fault injection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use rk_quote::{PriceListRepository, RepositoryError};
use rk_tables::{ListId, PriceList};

#[derive(Clone, Debug)]
enum Fault {
    Unavailable(String),
    Delay(Duration),
}

/// Lists keyed by id. Faults are checked before the lookup, so a faulted
/// id fails even when the list exists.
#[derive(Default)]
pub struct InMemoryRepository {
    lists: Mutex<HashMap<ListId, PriceList>>,
    faults: Mutex<HashMap<ListId, Fault>>,
    fetches: AtomicUsize,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lists(lists: impl IntoIterator<Item = PriceList>) -> Self {
        let repo = Self::new();
        for l in lists {
            repo.insert(l);
        }
        repo
    }

    /// Insert or replace. Later fetches see the new version.
    pub fn insert(&self, list: PriceList) {
        lock(&self.lists).insert(list.id.clone(), list);
    }

    pub fn remove(&self, id: &ListId) -> Option<PriceList> {
        lock(&self.lists).remove(id)
    }

    /// Every fetch of `id` fails with `Unavailable`.
    pub fn fail(&self, id: &ListId, reason: &str) {
        lock(&self.faults).insert(id.clone(), Fault::Unavailable(reason.to_string()));
    }

    /// Every fetch of `id` waits `delay` first (tokio time, so paused clocks apply).
    pub fn delay(&self, id: &ListId, delay: Duration) {
        lock(&self.faults).insert(id.clone(), Fault::Delay(delay));
    }

    pub fn clear_faults(&self) {
        lock(&self.faults).clear();
    }

    /// Fetches served so far, faulted ones included.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PriceListRepository for InMemoryRepository {
    async fn fetch(&self, id: &ListId) -> Result<PriceList, RepositoryError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let fault = lock(&self.faults).get(id).cloned();
        match fault {
            Some(Fault::Unavailable(reason)) => {
                return Err(RepositoryError::Unavailable {
                    list_id: id.clone(),
                    reason,
                })
            }
            Some(Fault::Delay(d)) => tokio::time::sleep(d).await,
            None => {}
        }
        lock(&self.lists)
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound { list_id: id.clone() })
    }
}

/// A poisoned lock only means another test thread panicked; the map is
/// still usable.
fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}
