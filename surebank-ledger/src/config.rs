//! Ledger tuning knobs.

use std::time::Duration;

use surebank_types::AccountingCalendar;

/// Prefix of every receipt number.
pub const RECEIPT_PREFIX: &str = "TX";

/// Random digits after the receipt prefix.
pub const RECEIPT_DIGITS: u32 = 6;

/// Random digits after the account type prefix.
pub const ACCOUNT_NUMBER_DIGITS: u32 = 5;

/// Narration of the withdrawal taken when a DS cycle starts.
pub const CYCLE_FEE_NARRATION: &str = "cycle fee deduction";

/// Configuration for [`crate::LedgerService`].
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Defines accounting days for effective dates and summaries.
    pub calendar: AccountingCalendar,
    /// Accounting days after the last commission before a new DS cycle starts.
    pub cycle_length_days: i64,
    /// Most DS contribution days one deposit may pay for.
    pub max_prepay_days: i64,
    /// Candidates tried before identifier generation gives up.
    pub identifier_attempts: u32,
    /// Longest a customer notification may hold up a finished operation.
    pub notify_timeout: Duration,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            calendar: AccountingCalendar::utc(),
            cycle_length_days: 31,
            max_prepay_days: 50,
            identifier_attempts: 20,
            notify_timeout: Duration::from_secs(5),
        }
    }
}
