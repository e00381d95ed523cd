//! rk-testkit
//!
//! Test doubles shared by scenario tests: an in-memory list repository
//! with fault injection, a scripted carrier client, and canonical
//! fixtures. File-backed collaborators come from `rk-ingest` and are
//! re-exported so scenarios can mix both.

mod carrier;
pub mod fixtures;
mod repository;

pub use carrier::{Scripted, ScriptedCarrier};
pub use repository::InMemoryRepository;
pub use rk_ingest::{load_document, load_price_lists, RecordedCarrier};
