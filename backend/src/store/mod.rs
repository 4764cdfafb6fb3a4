//! Persistence of the current-state document and the history log.
//!
//! Both stores perform whole-object read-modify-write against a
//! [`BlobStore`](crate::storage::BlobStore) and provide no locking of their own.

mod entity_store;
mod history_log;
pub mod seed;

pub use entity_store::*;
pub use history_log::*;
