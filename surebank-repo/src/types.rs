//! Database row types and their conversion into domain types.
//!
//! SQLite stores ids as text, timestamps as RFC 3339 text and days as
//! `YYYY-MM-DD`, so every row carries strings that are parsed on the way out.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use surebank_types::{
    Account, AccountId, AccountType, Commission, CommissionId, DailySummary, Money,
    PaymentMethod, RepoError, Transaction, TransactionId, TransactionType,
};

// ─────────────────────────────────────────────────────────────────────────────
// Database row structs (derive FromRow for automatic mapping)
// ─────────────────────────────────────────────────────────────────────────────

/// Account row from database.
#[derive(FromRow)]
pub struct DbAccount {
    pub id: String,
    pub number: String,
    pub account_type: String,
    pub balance: i64,
    pub target: i64,
    pub target_info: String,
    pub customer_id: String,
    pub customer_name: String,
    pub phone_number: String,
    pub sales_rep_id: String,
    pub branch_id: String,
    pub last_payment_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub archived_at: Option<String>,
}

/// Transaction row from database.
#[derive(FromRow)]
pub struct DbTransaction {
    pub id: String,
    pub account_id: String,
    pub sequence: i64,
    pub transaction_type: String,
    pub amount: i64,
    pub opening_balance: i64,
    pub narration: String,
    pub payment_method: Option<String>,
    pub sales_rep_id: String,
    pub receipt_no: String,
    pub effective_date: String,
    pub created_at: String,
    pub updated_at: String,
    pub archived_at: Option<String>,
}

/// Commission row from database.
#[derive(FromRow)]
pub struct DbCommission {
    pub id: String,
    pub account_id: String,
    pub customer_id: String,
    pub amount: i64,
    pub date: String,
    pub effective_date: String,
}

/// Daily summary row from database.
#[derive(FromRow)]
pub struct DbDailySummary {
    pub day: String,
    pub income: i64,
    pub expenditure: i64,
    pub bank_deposit: i64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Formatting and parsing helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Fixed-width UTC timestamp, so text ordering matches time ordering.
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn format_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepoError::Database(format!("Invalid timestamp {}: {}", s, e)))
}

fn parse_optional_timestamp(s: Option<String>) -> Result<Option<DateTime<Utc>>, RepoError> {
    s.as_deref().map(parse_timestamp).transpose()
}

pub fn parse_day(s: &str) -> Result<NaiveDate, RepoError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| RepoError::Database(format!("Invalid day {}: {}", s, e)))
}

fn parse_uuid(s: &str) -> Result<Uuid, RepoError> {
    Uuid::parse_str(s).map_err(|e| RepoError::Database(e.to_string()))
}

pub fn parse_transaction_type(s: &str) -> Result<TransactionType, RepoError> {
    match s {
        "deposit" => Ok(TransactionType::Deposit),
        "withdrawal" => Ok(TransactionType::Withdrawal),
        _ => Err(RepoError::Database(format!(
            "Unknown transaction type: {}",
            s
        ))),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Domain conversion
// ─────────────────────────────────────────────────────────────────────────────

impl DbAccount {
    /// Convert database row to domain Account.
    pub fn into_domain(self) -> Result<Account, RepoError> {
        let account_type: AccountType = self.account_type.parse().map_err(RepoError::Domain)?;

        Ok(Account {
            id: AccountId::from_uuid(parse_uuid(&self.id)?),
            number: self.number,
            account_type,
            balance: self.balance,
            target: Money::new(self.target).map_err(RepoError::Domain)?,
            target_info: self.target_info,
            customer_id: parse_uuid(&self.customer_id)?,
            customer_name: self.customer_name,
            phone_number: self.phone_number,
            sales_rep_id: self.sales_rep_id,
            branch_id: self.branch_id,
            last_payment_date: parse_optional_timestamp(self.last_payment_date)?,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            archived_at: parse_optional_timestamp(self.archived_at)?,
        })
    }
}

impl DbTransaction {
    /// Convert database row to domain Transaction.
    pub fn into_domain(self) -> Result<Transaction, RepoError> {
        let payment_method = self
            .payment_method
            .map(|s| s.parse::<PaymentMethod>())
            .transpose()
            .map_err(RepoError::Database)?;

        Ok(Transaction {
            id: TransactionId::from_uuid(parse_uuid(&self.id)?),
            account_id: AccountId::from_uuid(parse_uuid(&self.account_id)?),
            sequence: self.sequence,
            transaction_type: parse_transaction_type(&self.transaction_type)?,
            amount: Money::new(self.amount).map_err(RepoError::Domain)?,
            opening_balance: self.opening_balance,
            narration: self.narration,
            payment_method,
            sales_rep_id: self.sales_rep_id,
            receipt_no: self.receipt_no,
            effective_date: parse_timestamp(&self.effective_date)?,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            archived_at: parse_optional_timestamp(self.archived_at)?,
        })
    }
}

impl DbCommission {
    /// Convert database row to domain Commission.
    pub fn into_domain(self) -> Result<Commission, RepoError> {
        Ok(Commission {
            id: CommissionId::from_uuid(parse_uuid(&self.id)?),
            account_id: AccountId::from_uuid(parse_uuid(&self.account_id)?),
            customer_id: parse_uuid(&self.customer_id)?,
            amount: Money::new(self.amount).map_err(RepoError::Domain)?,
            date: parse_timestamp(&self.date)?,
            effective_date: parse_timestamp(&self.effective_date)?,
        })
    }
}

impl DbDailySummary {
    /// Convert database row to domain DailySummary.
    pub fn into_domain(self) -> Result<DailySummary, RepoError> {
        Ok(DailySummary {
            day: parse_day(&self.day)?,
            income: self.income,
            expenditure: self.expenditure,
            bank_deposit: self.bank_deposit,
        })
    }
}
