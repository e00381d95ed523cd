use rk_tables::ListId;
use serde::{Deserialize, Serialize};

/// Which lists a tenant quotes from when no list id is given.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TenantProfile {
    /// Compared against the platform list; `own_list` may not exist yet.
    Reseller {
        #[serde(default)]
        own_list: Option<ListId>,
        platform_list: ListId,
    },
    Standard { assigned_list: ListId },
}
