//! Store ports.
//!
//! This is the primary port in our hexagonal architecture. All ledger
//! reads and writes happen inside a [`UnitOfWork`]; nothing is visible to
//! other units of work until [`UnitOfWork::commit`] succeeds, and dropping a
//! unit of work without committing discards every write made through it.

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{
    Account, AccountId, Commission, DailySummary, SummaryDelta, Transaction, TransactionId,
    TransactionType,
};
use crate::error::RepoError;

#[async_trait::async_trait]
pub trait AccountStore: Send {
    async fn account_by_number(&mut self, number: &str) -> Result<Option<Account>, RepoError>;

    async fn account_by_id(&mut self, id: AccountId) -> Result<Option<Account>, RepoError>;

    async fn account_number_exists(&mut self, number: &str) -> Result<bool, RepoError>;

    async fn insert_account(&mut self, account: &Account) -> Result<(), RepoError>;

    /// Atomically adds `delta` to the balance and returns the new balance.
    ///
    /// `last_payment_date` is only written when `Some`.
    /// Fails with `RepoError::NotFound` for an unknown account.
    async fn update_balance(
        &mut self,
        id: AccountId,
        delta: i64,
        last_payment_date: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    ) -> Result<i64, RepoError>;
}

#[async_trait::async_trait]
pub trait TransactionStore: Send {
    async fn insert_transaction(&mut self, tx: &Transaction) -> Result<(), RepoError>;

    async fn transaction_by_id(
        &mut self,
        id: TransactionId,
    ) -> Result<Option<Transaction>, RepoError>;

    /// Most recently posted non-archived transaction of the given type.
    async fn last_transaction(
        &mut self,
        account_id: AccountId,
        transaction_type: TransactionType,
    ) -> Result<Option<Transaction>, RepoError>;

    /// Sequence number the next posting on this account must use.
    async fn next_sequence(&mut self, account_id: AccountId) -> Result<i64, RepoError>;

    async fn receipt_exists(&mut self, receipt_no: &str) -> Result<bool, RepoError>;

    /// Sets `archived_at`. Fails with `RepoError::NotFound` for an unknown id.
    async fn archive_transaction(
        &mut self,
        id: TransactionId,
        at: DateTime<Utc>,
    ) -> Result<(), RepoError>;

    /// Adds `delta` to the opening balance of every non-archived transaction
    /// on the account posted after `after_sequence`. Returns the rows touched.
    async fn shift_opening_balances(
        &mut self,
        account_id: AccountId,
        after_sequence: i64,
        delta: i64,
    ) -> Result<u64, RepoError>;

    /// All transactions on the account in posting order, archived included.
    async fn transactions_for_account(
        &mut self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>, RepoError>;
}

#[async_trait::async_trait]
pub trait CommissionStore: Send {
    async fn insert_commission(&mut self, commission: &Commission) -> Result<(), RepoError>;

    /// Commission with the latest effective date for the account.
    async fn latest_commission(
        &mut self,
        account_id: AccountId,
    ) -> Result<Option<Commission>, RepoError>;

    async fn commissions_for_account(
        &mut self,
        account_id: AccountId,
    ) -> Result<Vec<Commission>, RepoError>;
}

#[async_trait::async_trait]
pub trait SummaryStore: Send {
    /// Adds the delta to the row for `day`, creating it if absent.
    async fn add_to_daily_summary(
        &mut self,
        day: NaiveDate,
        delta: SummaryDelta,
    ) -> Result<DailySummary, RepoError>;

    async fn daily_summary(&mut self, day: NaiveDate) -> Result<Option<DailySummary>, RepoError>;
}

/// One atomic batch of ledger reads and writes.
#[async_trait::async_trait]
pub trait UnitOfWork:
    AccountStore + TransactionStore + CommissionStore + SummaryStore + Send + Sized
{
    /// Makes every write durable and visible.
    async fn commit(self) -> Result<(), RepoError>;
}

/// Factory for units of work.
#[async_trait::async_trait]
pub trait LedgerStore: Send + Sync + 'static {
    type Uow: UnitOfWork + 'static;

    async fn begin(&self) -> Result<Self::Uow, RepoError>;
}
