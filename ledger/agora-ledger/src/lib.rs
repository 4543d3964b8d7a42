pub mod catalog;
pub mod config;
pub mod error;
pub mod pg;
pub mod service;
pub mod store;
pub mod verify;

pub use crate::catalog::{ItemCatalog, MemoryCatalog};
pub use crate::config::LedgerConfig;
pub use crate::error::{CatalogError, LedgerError, Result, StoreError};
pub use crate::pg::PgStore;
pub use crate::service::PurchaseLedger;
pub use crate::store::{InsertOutcome, MemoryStore, PurchaseStore};
pub use crate::verify::{verify_on_chain, ExpectedTransfer};
