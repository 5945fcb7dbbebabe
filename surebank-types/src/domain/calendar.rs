//! Accounting-day arithmetic.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, Offset, TimeDelta, Utc};

/// Maps instants onto accounting days.
///
/// An accounting day runs from local midnight to local midnight in a fixed
/// UTC offset. Effective dates, cycle lengths and daily summaries are all
/// measured in these days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountingCalendar {
    offset: FixedOffset,
}

impl AccountingCalendar {
    /// Calendar whose days start at midnight UTC.
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// Calendar with days starting at local midnight `minutes` east of UTC.
    ///
    /// Returns `None` if the offset is out of range (more than a day).
    pub fn with_offset_minutes(minutes: i32) -> Option<Self> {
        let offset = FixedOffset::east_opt(minutes.checked_mul(60)?)?;
        Some(Self { offset })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// The accounting day containing `instant`.
    pub fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Midnight (as a UTC instant) of the given accounting day.
    pub fn midnight(&self, day: NaiveDate) -> DateTime<Utc> {
        let local = day.and_time(NaiveTime::MIN);
        (local - TimeDelta::seconds(self.offset.local_minus_utc().into())).and_utc()
    }

    /// Start of the accounting day containing `instant`.
    pub fn start_of_day(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        self.midnight(self.day_of(instant))
    }

    /// Start of the accounting day `days` days after the one containing `instant`.
    pub fn add_days(&self, instant: DateTime<Utc>, days: u64) -> DateTime<Utc> {
        let day = self
            .day_of(instant)
            .checked_add_days(Days::new(days))
            .unwrap_or(NaiveDate::MAX);
        self.midnight(day)
    }

    /// Whole accounting days from the day of `from` to the day of `to`.
    ///
    /// Negative when `to` falls on an earlier day.
    pub fn days_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
        (self.day_of(to) - self.day_of(from)).num_days()
    }
}

impl Default for AccountingCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_start_of_day_utc() {
        let cal = AccountingCalendar::utc();
        assert_eq!(
            cal.start_of_day(at("2024-03-10T17:45:12Z")),
            at("2024-03-10T00:00:00Z")
        );
    }

    #[test]
    fn test_start_of_day_with_offset() {
        // UTC+1: 23:30Z on the 10th is already the 11th locally.
        let cal = AccountingCalendar::with_offset_minutes(60).unwrap();
        let instant = at("2024-03-10T23:30:00Z");
        assert_eq!(cal.day_of(instant), NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
        assert_eq!(cal.start_of_day(instant), at("2024-03-10T23:00:00Z"));
    }

    #[test]
    fn test_add_days_crosses_month() {
        let cal = AccountingCalendar::utc();
        assert_eq!(
            cal.add_days(at("2024-02-28T09:00:00Z"), 2),
            at("2024-03-01T00:00:00Z")
        );
    }

    #[test]
    fn test_days_between_ignores_time_of_day() {
        let cal = AccountingCalendar::utc();
        let from = at("2024-01-01T23:59:00Z");
        let to = at("2024-02-01T00:01:00Z");
        assert_eq!(cal.days_between(from, to), 31);
        assert_eq!(cal.days_between(to, from), -31);
    }

    #[test]
    fn test_offset_out_of_range() {
        assert!(AccountingCalendar::with_offset_minutes(24 * 60).is_none());
    }
}
