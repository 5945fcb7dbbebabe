//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod clock;
mod notify;
mod store;

pub use clock::{Clock, SystemClock};
pub use notify::{Notifier, NotifyError, SmsTemplate};
pub use store::{
    AccountStore, CommissionStore, LedgerStore, SummaryStore, TransactionStore, UnitOfWork,
};
