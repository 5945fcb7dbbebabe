//! Daily financial summary.
//!
//! Every posting feeds the income column of its accounting day inside the
//! same unit of work, so summaries commit or roll back with the postings.
//! Bank deposits and expenditures are recorded separately by accounting staff.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::instrument;

use surebank_types::{
    AccountingCalendar, Actor, AppError, DailySummary, LedgerStore, RepoError, SummaryDelta,
    SummaryStore, UnitOfWork,
};

use crate::service::{LedgerService, authorize, positive_amount};

pub struct SummaryAggregator {
    calendar: AccountingCalendar,
}

impl SummaryAggregator {
    pub fn new(calendar: AccountingCalendar) -> Self {
        Self { calendar }
    }

    /// Adds `delta` to the summary of the accounting day containing `date`.
    pub async fn apply<U: SummaryStore>(
        &self,
        uow: &mut U,
        date: DateTime<Utc>,
        delta: SummaryDelta,
    ) -> Result<DailySummary, RepoError> {
        uow.add_to_daily_summary(self.calendar.day_of(date), delta)
            .await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Summary operations
// ─────────────────────────────────────────────────────────────────────────────

impl<S: LedgerStore> LedgerService<S> {
    /// Increments the summary row for `date`'s accounting day, creating it if
    /// needed. Additive: calling twice counts twice.
    #[instrument(skip(self))]
    pub async fn save_daily_summary(
        &self,
        income: i64,
        expenditure: i64,
        bank_deposit: i64,
        date: DateTime<Utc>,
    ) -> Result<DailySummary, AppError> {
        let delta = SummaryDelta::new(income, expenditure, bank_deposit);
        self.commit_summary(date, delta)
            .await
            .map_err(|e| e.context("save_daily_summary"))
    }

    /// Records cash lodged at the bank today.
    #[instrument(skip(self, actor))]
    pub async fn record_bank_deposit(
        &self,
        actor: &Actor,
        amount: i64,
    ) -> Result<DailySummary, AppError> {
        authorize(actor)?;
        let amount = positive_amount(amount)?;
        self.commit_summary(self.now(), SummaryDelta::bank_deposit(amount.amount()))
            .await
            .map_err(|e| e.context("record_bank_deposit"))
    }

    /// Records money spent today.
    #[instrument(skip(self, actor))]
    pub async fn record_expenditure(
        &self,
        actor: &Actor,
        amount: i64,
    ) -> Result<DailySummary, AppError> {
        authorize(actor)?;
        let amount = positive_amount(amount)?;
        self.commit_summary(self.now(), SummaryDelta::expenditure(amount.amount()))
            .await
            .map_err(|e| e.context("record_expenditure"))
    }

    /// Summary for one accounting day; all zeros if nothing was recorded.
    pub async fn daily_summary(&self, day: NaiveDate) -> Result<DailySummary, AppError> {
        let mut uow = self.store().begin().await?;
        let summary = uow.daily_summary(day).await?;
        Ok(summary.unwrap_or_else(|| DailySummary::empty(day)))
    }

    async fn commit_summary(
        &self,
        date: DateTime<Utc>,
        delta: SummaryDelta,
    ) -> Result<DailySummary, AppError> {
        let mut uow = self.store().begin().await?;
        let summary = self.summaries().apply(&mut uow, date, delta).await?;
        uow.commit().await?;
        Ok(summary)
    }
}
