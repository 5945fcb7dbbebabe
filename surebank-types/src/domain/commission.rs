//! Commission withheld at the start of each DS contribution cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::AccountId;
use super::money::Money;

/// Unique identifier for a Commission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommissionId(Uuid);

impl CommissionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for CommissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CommissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fee record created when a DS account enters a new cycle. Immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commission {
    pub id: CommissionId,
    pub account_id: AccountId,
    pub customer_id: Uuid,
    pub amount: Money,
    /// Wall-clock time the fee was taken.
    pub date: DateTime<Utc>,
    /// Accounting date of the contribution that opened the cycle.
    pub effective_date: DateTime<Utc>,
}
