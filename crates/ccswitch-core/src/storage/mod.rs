//! Storage layer (JSON profile document)

mod document;
mod error;
pub mod migrate;
mod store;

pub use document::{StoreDocument, STORE_VERSION};
pub use error::{StoreError, StoreResult};
pub use migrate::{migrate_legacy, Migration};
pub use store::ProfileStore;
