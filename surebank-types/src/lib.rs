//! # SureBank Types
//!
//! Domain types and port traits for the account ledger and DS
//! contribution-cycle engine. This crate has no IO dependencies - only
//! data structures, business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (Money, Account, Transaction, Commission)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Request types and their validation
//! - `error/` - Domain, repository and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    Account, AccountId, AccountType, AccountingCalendar, Actor, Commission, CommissionId,
    DailySummary, Money, PaymentMethod, Role, SummaryDelta, Transaction, TransactionId,
    TransactionType, format_minor_units,
};
pub use dto::*;
pub use error::{AppError, DomainError, FieldError, RepoError, ValidationErrors};
pub use ports::{
    AccountStore, Clock, CommissionStore, LedgerStore, Notifier, NotifyError, SmsTemplate,
    SummaryStore, SystemClock, TransactionStore, UnitOfWork,
};
