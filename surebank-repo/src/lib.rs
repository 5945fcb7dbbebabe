//! # SureBank Repository
//!
//! Concrete adapters for the ledger's ports.
//! This crate provides the SQLite store implementing `LedgerStore` and the
//! SMS notifiers implementing `Notifier`.

pub mod sms;
pub mod sqlite;

mod types;


pub use sms::{HttpSmsNotifier, LogNotifier};
pub use sqlite::{SqliteStore, SqliteUnitOfWork};

/// Build and initialize a store from a database URL.
///
/// This function:
/// 1. Connects to the database
/// 2. Runs migrations to create tables
/// 3. Returns a ready-to-use `SqliteStore`
///
/// # Examples
///
/// ```ignore
/// let store = build_store("sqlite://surebank.db?mode=rwc").await?;
/// let store = build_store("sqlite::memory:").await?;
/// ```
pub async fn build_store(database_url: &str) -> anyhow::Result<SqliteStore> {
    SqliteStore::new(database_url).await
}
