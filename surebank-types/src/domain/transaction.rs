//! Transaction domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::AccountId;
use super::money::Money;

/// Unique identifier for a Transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Creates a new random TransactionId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a TransactionId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TransactionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// The direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Money paid into the account
    Deposit,
    /// Money taken out of the account
    Withdrawal,
}

impl TransactionType {
    /// Applies the direction to an amount: deposits are positive,
    /// withdrawals negative.
    pub fn signed(&self, amount: Money) -> i64 {
        match self {
            TransactionType::Deposit => amount.amount(),
            TransactionType::Withdrawal => -amount.amount(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdrawal => "withdrawal",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the customer paid or was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankDeposit,
    Transfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::BankDeposit => "bank_deposit",
            PaymentMethod::Transfer => "transfer",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "bank_deposit" | "bank-deposit" => Ok(PaymentMethod::BankDeposit),
            "transfer" => Ok(PaymentMethod::Transfer),
            other => Err(format!("Unknown payment method: {}", other)),
        }
    }
}

/// A posted ledger entry.
///
/// Transactions are never deleted. The only mutations after insertion are
/// the archive flag and the opening-balance correction applied when an
/// earlier transaction on the same account is archived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub account_id: AccountId,
    /// Posting order within the account, starting at 1.
    pub sequence: i64,
    pub transaction_type: TransactionType,
    pub amount: Money,
    /// Account balance immediately before this transaction.
    pub opening_balance: i64,
    pub narration: String,
    /// `None` for system-generated entries such as cycle fees.
    pub payment_method: Option<PaymentMethod>,
    pub sales_rep_id: String,
    pub receipt_no: String,
    /// Accounting date the transaction is attributed to.
    pub effective_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Signed effect on the account balance.
    pub fn signed_amount(&self) -> i64 {
        self.transaction_type.signed(self.amount)
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    /// Balance delta that undoes this transaction.
    pub fn reversal_delta(&self) -> i64 {
        -self.signed_amount()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(transaction_type: TransactionType, amount: i64, opening: i64) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: TransactionId::new(),
            account_id: AccountId::new(),
            sequence: 1,
            transaction_type,
            amount: Money::new(amount).unwrap(),
            opening_balance: opening,
            narration: String::new(),
            payment_method: Some(PaymentMethod::Cash),
            sales_rep_id: "rep-1".into(),
            receipt_no: "TX000001".into(),
            effective_date: now,
            created_at: now,
            updated_at: now,
            archived_at: None,
        }
    }

    #[test]
    fn test_deposit_signed_amount() {
        let t = tx(TransactionType::Deposit, 500, 1000);
        assert_eq!(t.signed_amount(), 500);
        assert_eq!(t.reversal_delta(), -500);
    }

    #[test]
    fn test_withdrawal_signed_amount() {
        let t = tx(TransactionType::Withdrawal, 300, 1000);
        assert_eq!(t.signed_amount(), -300);
        assert_eq!(t.reversal_delta(), 300);
    }

    #[test]
    fn test_payment_method_parsing() {
        assert_eq!("Transfer".parse::<PaymentMethod>(), Ok(PaymentMethod::Transfer));
        assert_eq!(
            "bank-deposit".parse::<PaymentMethod>(),
            Ok(PaymentMethod::BankDeposit)
        );
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }
}
