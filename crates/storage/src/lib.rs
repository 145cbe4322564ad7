#![forbid(unsafe_code)]

pub mod catalog;
pub mod repository;
pub mod sqlite;

pub use catalog::{AssetCatalog, CatalogError, CatalogProvider, StaticCatalog};
pub use repository::{InMemoryRepository, SettingsRepository, Storage, StorageError};
