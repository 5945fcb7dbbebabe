//! Account domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::Money;
use crate::error::DomainError;

/// Unique identifier for an Account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Creates a new random AccountId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an AccountId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AccountId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Savings products offered to customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    /// Simple balance: plain deposits and withdrawals.
    #[serde(rename = "SB")]
    SimpleBalance,
    /// Daily savings: fixed per-day contributions with a fee every cycle.
    #[serde(rename = "DS")]
    DailySavings,
    /// Ajo: rotating savings.
    #[serde(rename = "AJ")]
    Ajo,
}

impl AccountType {
    /// Two-letter code, also used as the account number prefix.
    pub fn code(&self) -> &'static str {
        match self {
            AccountType::SimpleBalance => "SB",
            AccountType::DailySavings => "DS",
            AccountType::Ajo => "AJ",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for AccountType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SB" => Ok(AccountType::SimpleBalance),
            "DS" => Ok(AccountType::DailySavings),
            "AJ" => Ok(AccountType::Ajo),
            other => Err(DomainError::UnknownAccountType(other.to_string())),
        }
    }
}

/// A customer account holding a balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Human-facing account number, e.g. `DS48213`.
    pub number: String,
    pub account_type: AccountType,
    /// Current balance in minor units. Negative only after a reversal.
    pub balance: i64,
    /// Fixed per-contribution amount (DS accounts).
    pub target: Money,
    pub target_info: String,
    pub customer_id: Uuid,
    pub customer_name: String,
    /// Contact number used for transaction notifications.
    pub phone_number: String,
    /// Teller who owns the account.
    pub sales_rep_id: String,
    pub branch_id: String,
    pub last_payment_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl Account {
    pub fn is_daily_savings(&self) -> bool {
        self.account_type == AccountType::DailySavings
    }

    /// Number of DS contribution days `amount` pays for.
    ///
    /// # Errors
    /// - `MissingTarget` if the account has no target configured
    /// - `NotMultipleOfTarget` if `amount` does not split into whole days
    pub fn contribution_days(&self, amount: Money) -> Result<i64, DomainError> {
        let target = self.target.amount();
        if target <= 0 {
            return Err(DomainError::MissingTarget(self.number.clone()));
        }
        if amount.amount() % target != 0 {
            return Err(DomainError::NotMultipleOfTarget {
                amount: amount.amount(),
                target,
            });
        }
        Ok(amount.amount() / target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(account_type: AccountType, balance: i64, target: i64) -> Account {
        let now = Utc::now();
        Account {
            id: AccountId::new(),
            number: format!("{}00001", account_type.code()),
            account_type,
            balance,
            target: Money::new(target).unwrap(),
            target_info: String::new(),
            customer_id: Uuid::new_v4(),
            customer_name: "Ada".into(),
            phone_number: "08030000000".into(),
            sales_rep_id: "rep-1".into(),
            branch_id: "branch-1".into(),
            last_payment_date: None,
            created_at: now,
            updated_at: now,
            archived_at: None,
        }
    }

    #[test]
    fn test_account_type_codes() {
        assert_eq!("ds".parse::<AccountType>().unwrap(), AccountType::DailySavings);
        assert_eq!(AccountType::Ajo.to_string(), "AJ");
        assert!(matches!(
            "XX".parse::<AccountType>(),
            Err(DomainError::UnknownAccountType(_))
        ));
    }

    #[test]
    fn test_contribution_days() {
        let acc = account(AccountType::DailySavings, 0, 100);
        assert_eq!(acc.contribution_days(Money::new(300).unwrap()).unwrap(), 3);
    }

    #[test]
    fn test_contribution_days_rejects_partial_day() {
        let acc = account(AccountType::DailySavings, 0, 100);
        let result = acc.contribution_days(Money::new(350).unwrap());
        assert!(matches!(
            result,
            Err(DomainError::NotMultipleOfTarget {
                amount: 350,
                target: 100
            })
        ));
    }

    #[test]
    fn test_contribution_days_without_target() {
        let acc = account(AccountType::DailySavings, 0, 0);
        let result = acc.contribution_days(Money::new(100).unwrap());
        assert!(matches!(result, Err(DomainError::MissingTarget(_))));
    }
}
