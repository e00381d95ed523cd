use rk_tables::{ListId, PriceList};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("price list {list_id} not found")]
    NotFound { list_id: ListId },
    #[error("price list store unavailable while fetching {list_id}: {reason}")]
    Unavailable { list_id: ListId, reason: String },
}

/// Source of price lists.
///
/// Every calculation fetches its lists (and the master they point at)
/// through this trait; the engine keeps no copy between calls.
#[async_trait::async_trait]
pub trait PriceListRepository: Send + Sync {
    async fn fetch(&self, id: &ListId) -> Result<PriceList, RepositoryError>;
}
