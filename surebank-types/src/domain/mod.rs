//! Domain models for the ledger.

pub mod account;
pub mod actor;
pub mod calendar;
pub mod commission;
pub mod money;
pub mod summary;
pub mod transaction;

pub use account::{Account, AccountId, AccountType};
pub use actor::{Actor, Role};
pub use calendar::AccountingCalendar;
pub use commission::{Commission, CommissionId};
pub use money::{Money, format_minor_units};
pub use summary::{DailySummary, SummaryDelta};
pub use transaction::{PaymentMethod, Transaction, TransactionId, TransactionType};
