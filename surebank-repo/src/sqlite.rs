//! SQLite store adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};
use std::str::FromStr;
use std::time::Duration;

use surebank_types::{
    Account, AccountId, AccountStore, Commission, CommissionStore, DailySummary, LedgerStore,
    RepoError, SummaryDelta, SummaryStore, Transaction, TransactionId, TransactionStore,
    TransactionType, UnitOfWork,
};

use crate::types::{
    DbAccount, DbCommission, DbDailySummary, DbTransaction, format_day, format_timestamp,
};

const MIGRATION: &str = include_str!("../migrations/0001_create_ledger_tables.sql");

const ACCOUNT_COLUMNS: &str = "id, number, account_type, balance, target, target_info, \
     customer_id, customer_name, phone_number, sales_rep_id, branch_id, last_payment_date, \
     created_at, updated_at, archived_at";

const TRANSACTION_COLUMNS: &str = "id, account_id, sequence, transaction_type, amount, \
     opening_balance, narration, payment_method, sales_rep_id, receipt_no, effective_date, \
     created_at, updated_at, archived_at";

const COMMISSION_COLUMNS: &str = "id, account_id, customer_id, amount, date, effective_date";

fn db_err(e: sqlx::Error) -> RepoError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepoError::Conflict(db.message().to_string())
        }
        _ => RepoError::Database(e.to_string()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Store
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite store implementation.
///
/// The pool holds a single connection. SQLite admits one writer at a time,
/// and a unit of work that reads before it writes would otherwise fail with
/// `SQLITE_BUSY` when another connection upgrades to a write lock first.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Creates a new SQLite store with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            // Remove query parameters
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.create_schema().await?;
        Ok(store)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the ledger tables if they do not exist yet.
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        sqlx::raw_sql(MIGRATION)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for SqliteStore {
    type Uow = SqliteUnitOfWork;

    async fn begin(&self) -> Result<SqliteUnitOfWork, RepoError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;
        Ok(SqliteUnitOfWork { tx })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Unit of work
// ─────────────────────────────────────────────────────────────────────────────

/// One sqlx transaction. Dropping it without [`UnitOfWork::commit`] rolls back.
pub struct SqliteUnitOfWork {
    tx: sqlx::Transaction<'static, Sqlite>,
}

#[async_trait]
impl UnitOfWork for SqliteUnitOfWork {
    async fn commit(self) -> Result<(), RepoError> {
        self.tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))
    }
}

#[async_trait]
impl AccountStore for SqliteUnitOfWork {
    async fn account_by_number(&mut self, number: &str) -> Result<Option<Account>, RepoError> {
        let row: Option<DbAccount> = sqlx::query_as(&format!(
            "SELECT {} FROM accounts WHERE number = ?",
            ACCOUNT_COLUMNS
        ))
        .bind(number)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_err)?;

        row.map(DbAccount::into_domain).transpose()
    }

    async fn account_by_id(&mut self, id: AccountId) -> Result<Option<Account>, RepoError> {
        let row: Option<DbAccount> = sqlx::query_as(&format!(
            "SELECT {} FROM accounts WHERE id = ?",
            ACCOUNT_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_err)?;

        row.map(DbAccount::into_domain).transpose()
    }

    async fn account_number_exists(&mut self, number: &str) -> Result<bool, RepoError> {
        let found: Option<i64> =
            sqlx::query_scalar(r#"SELECT 1 FROM accounts WHERE number = ? LIMIT 1"#)
                .bind(number)
                .fetch_optional(&mut *self.tx)
                .await
                .map_err(db_err)?;
        Ok(found.is_some())
    }

    async fn insert_account(&mut self, account: &Account) -> Result<(), RepoError> {
        sqlx::query(
            r#"INSERT INTO accounts (id, number, account_type, balance, target, target_info,
                   customer_id, customer_name, phone_number, sales_rep_id, branch_id,
                   last_payment_date, created_at, updated_at, archived_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(account.id.to_string())
        .bind(&account.number)
        .bind(account.account_type.code())
        .bind(account.balance)
        .bind(account.target.amount())
        .bind(&account.target_info)
        .bind(account.customer_id.to_string())
        .bind(&account.customer_name)
        .bind(&account.phone_number)
        .bind(&account.sales_rep_id)
        .bind(&account.branch_id)
        .bind(account.last_payment_date.map(format_timestamp))
        .bind(format_timestamp(account.created_at))
        .bind(format_timestamp(account.updated_at))
        .bind(account.archived_at.map(format_timestamp))
        .execute(&mut *self.tx)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn update_balance(
        &mut self,
        id: AccountId,
        delta: i64,
        last_payment_date: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    ) -> Result<i64, RepoError> {
        let balance: Option<i64> = sqlx::query_scalar(
            r#"UPDATE accounts
               SET balance = balance + ?,
                   last_payment_date = COALESCE(?, last_payment_date),
                   updated_at = ?
               WHERE id = ?
               RETURNING balance"#,
        )
        .bind(delta)
        .bind(last_payment_date.map(format_timestamp))
        .bind(format_timestamp(at))
        .bind(id.to_string())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_err)?;

        balance.ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl TransactionStore for SqliteUnitOfWork {
    async fn insert_transaction(&mut self, tx: &Transaction) -> Result<(), RepoError> {
        sqlx::query(
            r#"INSERT INTO transactions (id, account_id, sequence, transaction_type, amount,
                   opening_balance, narration, payment_method, sales_rep_id, receipt_no,
                   effective_date, created_at, updated_at, archived_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(tx.id.to_string())
        .bind(tx.account_id.to_string())
        .bind(tx.sequence)
        .bind(tx.transaction_type.as_str())
        .bind(tx.amount.amount())
        .bind(tx.opening_balance)
        .bind(&tx.narration)
        .bind(tx.payment_method.map(|m| m.as_str()))
        .bind(&tx.sales_rep_id)
        .bind(&tx.receipt_no)
        .bind(format_timestamp(tx.effective_date))
        .bind(format_timestamp(tx.created_at))
        .bind(format_timestamp(tx.updated_at))
        .bind(tx.archived_at.map(format_timestamp))
        .execute(&mut *self.tx)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn transaction_by_id(
        &mut self,
        id: TransactionId,
    ) -> Result<Option<Transaction>, RepoError> {
        let row: Option<DbTransaction> = sqlx::query_as(&format!(
            "SELECT {} FROM transactions WHERE id = ?",
            TRANSACTION_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_err)?;

        row.map(DbTransaction::into_domain).transpose()
    }

    async fn last_transaction(
        &mut self,
        account_id: AccountId,
        transaction_type: TransactionType,
    ) -> Result<Option<Transaction>, RepoError> {
        let row: Option<DbTransaction> = sqlx::query_as(&format!(
            "SELECT {} FROM transactions
             WHERE account_id = ? AND transaction_type = ? AND archived_at IS NULL
             ORDER BY sequence DESC
             LIMIT 1",
            TRANSACTION_COLUMNS
        ))
        .bind(account_id.to_string())
        .bind(transaction_type.as_str())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_err)?;

        row.map(DbTransaction::into_domain).transpose()
    }

    async fn next_sequence(&mut self, account_id: AccountId) -> Result<i64, RepoError> {
        let next: i64 = sqlx::query_scalar(
            r#"SELECT COALESCE(MAX(sequence), 0) + 1 FROM transactions WHERE account_id = ?"#,
        )
        .bind(account_id.to_string())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_err)?;
        Ok(next)
    }

    async fn receipt_exists(&mut self, receipt_no: &str) -> Result<bool, RepoError> {
        let found: Option<i64> =
            sqlx::query_scalar(r#"SELECT 1 FROM transactions WHERE receipt_no = ? LIMIT 1"#)
                .bind(receipt_no)
                .fetch_optional(&mut *self.tx)
                .await
                .map_err(db_err)?;
        Ok(found.is_some())
    }

    async fn archive_transaction(
        &mut self,
        id: TransactionId,
        at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let stamp = format_timestamp(at);
        let result = sqlx::query(
            r#"UPDATE transactions SET archived_at = ?, updated_at = ? WHERE id = ?"#,
        )
        .bind(&stamp)
        .bind(&stamp)
        .bind(id.to_string())
        .execute(&mut *self.tx)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn shift_opening_balances(
        &mut self,
        account_id: AccountId,
        after_sequence: i64,
        delta: i64,
    ) -> Result<u64, RepoError> {
        let result = sqlx::query(
            r#"UPDATE transactions
               SET opening_balance = opening_balance + ?
               WHERE account_id = ? AND sequence > ? AND archived_at IS NULL"#,
        )
        .bind(delta)
        .bind(account_id.to_string())
        .bind(after_sequence)
        .execute(&mut *self.tx)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected())
    }

    async fn transactions_for_account(
        &mut self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>, RepoError> {
        let rows: Vec<DbTransaction> = sqlx::query_as(&format!(
            "SELECT {} FROM transactions WHERE account_id = ? ORDER BY sequence ASC",
            TRANSACTION_COLUMNS
        ))
        .bind(account_id.to_string())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(DbTransaction::into_domain).collect()
    }
}

#[async_trait]
impl CommissionStore for SqliteUnitOfWork {
    async fn insert_commission(&mut self, commission: &Commission) -> Result<(), RepoError> {
        sqlx::query(
            r#"INSERT INTO commissions (id, account_id, customer_id, amount, date, effective_date)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(commission.id.to_string())
        .bind(commission.account_id.to_string())
        .bind(commission.customer_id.to_string())
        .bind(commission.amount.amount())
        .bind(format_timestamp(commission.date))
        .bind(format_timestamp(commission.effective_date))
        .execute(&mut *self.tx)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn latest_commission(
        &mut self,
        account_id: AccountId,
    ) -> Result<Option<Commission>, RepoError> {
        let row: Option<DbCommission> = sqlx::query_as(&format!(
            "SELECT {} FROM commissions
             WHERE account_id = ?
             ORDER BY effective_date DESC, date DESC
             LIMIT 1",
            COMMISSION_COLUMNS
        ))
        .bind(account_id.to_string())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_err)?;

        row.map(DbCommission::into_domain).transpose()
    }

    async fn commissions_for_account(
        &mut self,
        account_id: AccountId,
    ) -> Result<Vec<Commission>, RepoError> {
        let rows: Vec<DbCommission> = sqlx::query_as(&format!(
            "SELECT {} FROM commissions WHERE account_id = ? ORDER BY effective_date ASC, date ASC",
            COMMISSION_COLUMNS
        ))
        .bind(account_id.to_string())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(DbCommission::into_domain).collect()
    }
}

#[async_trait]
impl SummaryStore for SqliteUnitOfWork {
    async fn add_to_daily_summary(
        &mut self,
        day: NaiveDate,
        delta: SummaryDelta,
    ) -> Result<DailySummary, RepoError> {
        let row: DbDailySummary = sqlx::query_as(
            r#"INSERT INTO daily_summaries (day, income, expenditure, bank_deposit)
               VALUES (?, ?, ?, ?)
               ON CONFLICT (day) DO UPDATE SET
                   income = income + excluded.income,
                   expenditure = expenditure + excluded.expenditure,
                   bank_deposit = bank_deposit + excluded.bank_deposit
               RETURNING day, income, expenditure, bank_deposit"#,
        )
        .bind(format_day(day))
        .bind(delta.income)
        .bind(delta.expenditure)
        .bind(delta.bank_deposit)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_err)?;

        row.into_domain()
    }

    async fn daily_summary(&mut self, day: NaiveDate) -> Result<Option<DailySummary>, RepoError> {
        let row: Option<DbDailySummary> = sqlx::query_as(
            r#"SELECT day, income, expenditure, bank_deposit FROM daily_summaries WHERE day = ?"#,
        )
        .bind(format_day(day))
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_err)?;

        row.map(DbDailySummary::into_domain).transpose()
    }
}
