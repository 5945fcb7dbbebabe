//! DS contribution cycles.
//!
//! A daily-savings account pays one target's worth of fee at the start of
//! every cycle. The fee is recorded as a commission whose effective date marks
//! the cycle start; a new cycle begins once the contribution being posted is
//! at least `cycle_length_days` accounting days past the latest commission.

use chrono::{DateTime, Utc};

use surebank_types::{AccountId, AccountingCalendar, CommissionStore, RepoError};

pub struct ContributionCycleManager {
    calendar: AccountingCalendar,
    cycle_length_days: i64,
}

impl ContributionCycleManager {
    pub fn new(calendar: AccountingCalendar, cycle_length_days: i64) -> Self {
        Self {
            calendar,
            cycle_length_days,
        }
    }

    /// Whether a contribution effective on `effective_date` opens a new cycle.
    pub async fn starting_new_cycle<U: CommissionStore>(
        &self,
        uow: &mut U,
        account_id: AccountId,
        effective_date: DateTime<Utc>,
    ) -> Result<bool, RepoError> {
        let latest = uow.latest_commission(account_id).await?;
        Ok(self.opens_cycle(latest.map(|c| c.effective_date), effective_date))
    }

    /// Same decision, given the latest commission's effective date.
    pub fn opens_cycle(
        &self,
        last_cycle_start: Option<DateTime<Utc>>,
        effective_date: DateTime<Utc>,
    ) -> bool {
        match last_cycle_start {
            None => true,
            Some(start) => {
                self.calendar.days_between(start, effective_date) >= self.cycle_length_days
            }
        }
    }
}
