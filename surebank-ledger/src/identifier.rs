//! Account and receipt number generation.
//!
//! Candidates are random. A candidate is first reserved in-process, then
//! checked against the store, so two concurrent generators never hand out
//! the same value even before either unit of work commits. The store's
//! unique constraints remain the final backstop.

use dashmap::DashSet;
use rand::Rng;
use tracing::debug;

use surebank_types::{AccountStore, AccountType, AppError, TransactionStore};

use crate::config::{ACCOUNT_NUMBER_DIGITS, RECEIPT_DIGITS, RECEIPT_PREFIX};

/// An identifier held for the caller until dropped.
///
/// Keep it alive until the unit of work that writes the identifier has
/// committed or rolled back.
#[derive(Debug)]
pub struct Reservation<'a> {
    in_flight: &'a DashSet<String>,
    value: String,
}

impl Reservation<'_> {
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        self.in_flight.remove(&self.value);
    }
}

/// Bounded retry-until-unique generator.
pub struct IdentifierGenerator {
    in_flight: DashSet<String>,
    attempts: u32,
}

impl IdentifierGenerator {
    pub fn new(attempts: u32) -> Self {
        Self {
            in_flight: DashSet::new(),
            attempts: attempts.max(1),
        }
    }

    /// Type prefix followed by five random digits, e.g. `DS04821`.
    pub async fn account_number<U>(
        &self,
        uow: &mut U,
        account_type: AccountType,
    ) -> Result<Reservation<'_>, AppError>
    where
        U: AccountStore,
    {
        for attempt in 1..=self.attempts {
            let Some(reservation) =
                self.reserve(random_code(account_type.code(), ACCOUNT_NUMBER_DIGITS))
            else {
                debug!(attempt, "account number already in flight");
                continue;
            };
            if uow.account_number_exists(reservation.value()).await? {
                debug!(attempt, number = reservation.value(), "account number collision");
                continue;
            }
            return Ok(reservation);
        }
        Err(self.exhausted("account number"))
    }

    /// `TX` followed by six random digits, e.g. `TX104233`.
    pub async fn receipt_number<U>(&self, uow: &mut U) -> Result<Reservation<'_>, AppError>
    where
        U: TransactionStore,
    {
        for attempt in 1..=self.attempts {
            let Some(reservation) = self.reserve(random_code(RECEIPT_PREFIX, RECEIPT_DIGITS))
            else {
                debug!(attempt, "receipt number already in flight");
                continue;
            };
            if uow.receipt_exists(reservation.value()).await? {
                debug!(attempt, receipt = reservation.value(), "receipt number collision");
                continue;
            }
            return Ok(reservation);
        }
        Err(self.exhausted("receipt number"))
    }

    /// Number of identifiers currently reserved.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    fn reserve(&self, candidate: String) -> Option<Reservation<'_>> {
        if !self.in_flight.insert(candidate.clone()) {
            return None;
        }
        Some(Reservation {
            in_flight: &self.in_flight,
            value: candidate,
        })
    }

    fn exhausted(&self, what: &str) -> AppError {
        AppError::Infrastructure(format!(
            "could not generate a unique {} after {} attempts",
            what, self.attempts
        ))
    }
}

fn random_code(prefix: &str, digits: u32) -> String {
    let n = rand::rng().random_range(0..10u32.pow(digits));
    format!("{}{:0width$}", prefix, n, width = digits as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_code_shape() {
        for _ in 0..100 {
            let code = random_code("TX", 6);
            assert_eq!(code.len(), 8);
            assert!(code.starts_with("TX"));
            assert!(code[2..].chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_reservation_released_on_drop() {
        let generator = IdentifierGenerator::new(3);

        let reservation = generator.reserve("TX000001".into()).unwrap();
        assert_eq!(generator.in_flight(), 1);
        assert!(generator.reserve("TX000001".into()).is_none());

        drop(reservation);
        assert_eq!(generator.in_flight(), 0);
        assert!(generator.reserve("TX000001".into()).is_some());
    }
}
