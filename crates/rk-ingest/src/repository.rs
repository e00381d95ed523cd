use std::collections::HashMap;

use rk_quote::{PriceListRepository, RepositoryError};
use rk_tables::{ListId, PriceList};

/// Lists loaded once from documents; read-only afterwards.
#[derive(Debug, Default)]
pub struct FileRepository {
    lists: HashMap<ListId, PriceList>,
}

impl FileRepository {
    pub fn new(lists: impl IntoIterator<Item = PriceList>) -> Self {
        Self {
            lists: lists.into_iter().map(|l| (l.id.clone(), l)).collect(),
        }
    }

    pub fn get(&self, id: &ListId) -> Option<&PriceList> {
        self.lists.get(id)
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

#[async_trait::async_trait]
impl PriceListRepository for FileRepository {
    async fn fetch(&self, id: &ListId) -> Result<PriceList, RepositoryError> {
        self.lists
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound { list_id: id.clone() })
    }
}
