//! rk-quote
//!
//! Quote entry point: fetches lists through a [`PriceListRepository`],
//! resolves margins, and runs the Quote Comparator for reseller tenants.
//!
//! No retries happen here. The first terminal failure of a source is what
//! the caller sees (or what the comparator falls back from).

mod comparator;
mod engine;
mod error;
mod repository;
mod tenant;

pub use comparator::{select, ApiSource, ComparisonResult};
pub use engine::{EngineSettings, QuoteEngine, QuoteOutcome, DEFAULT_SOURCE_TIMEOUT};
pub use error::{ConfigurationError, QuoteError};
pub use repository::{PriceListRepository, RepositoryError};
pub use tenant::TenantProfile;
