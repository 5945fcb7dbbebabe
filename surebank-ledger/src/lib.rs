//! # SureBank Ledger
//!
//! Application service layer for the account ledger.
//!
//! ## Architecture
//!
//! - `service` - LedgerService: account registry, deposits, withdrawals
//! - `cycle` - DS contribution cycles and the fee they trigger
//! - `reversal` - archiving transactions and correcting balances
//! - `summary` - per-day income / expenditure / bank deposit rollup
//! - `identifier` - account and receipt number generation
//! - `locks` - per-account write serialization
//!
//! The service is generic over `S: LedgerStore`, allowing different store
//! implementations to be injected.

pub mod config;
pub mod cycle;
pub mod identifier;
pub mod locks;
pub mod reversal;
pub mod service;
pub mod summary;


pub use config::LedgerConfig;
pub use cycle::ContributionCycleManager;
pub use identifier::{IdentifierGenerator, Reservation};
pub use locks::AccountLocks;
pub use service::LedgerService;
pub use summary::SummaryAggregator;
