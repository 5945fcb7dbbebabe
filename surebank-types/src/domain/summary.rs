//! Per-day financial rollup.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Running totals for one accounting day.
///
/// Rows only ever grow by [`SummaryDelta`]s; adding the same delta twice
/// counts it twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    pub day: NaiveDate,
    pub income: i64,
    pub expenditure: i64,
    pub bank_deposit: i64,
}

impl DailySummary {
    pub fn empty(day: NaiveDate) -> Self {
        Self {
            day,
            income: 0,
            expenditure: 0,
            bank_deposit: 0,
        }
    }
}

/// Increment for the three summary columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryDelta {
    pub income: i64,
    pub expenditure: i64,
    pub bank_deposit: i64,
}

impl SummaryDelta {
    pub fn new(income: i64, expenditure: i64, bank_deposit: i64) -> Self {
        Self {
            income,
            expenditure,
            bank_deposit,
        }
    }

    pub fn income(amount: i64) -> Self {
        Self::new(amount, 0, 0)
    }

    pub fn expenditure(amount: i64) -> Self {
        Self::new(0, amount, 0)
    }

    pub fn bank_deposit(amount: i64) -> Self {
        Self::new(0, 0, amount)
    }
}
