// Adapters layer: concrete implementations for external systems (catalog http, storage).

pub mod catalog;
pub mod storage;

pub use catalog::{CatalogClientSettings, HttpCatalogClient};
pub use storage::LocalStorage;
