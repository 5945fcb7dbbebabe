//! Error types for the ledger.

use serde::Serialize;

use crate::domain::TransactionId;

/// Domain-level errors (business rule violations).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("Amount cannot be negative")]
    NegativeAmount,

    #[error("Amount {amount} must be a multiple of target {target}")]
    NotMultipleOfTarget { amount: i64, target: i64 },

    #[error("Please pay for a maximum of {max_days} days at a time, requested {days}")]
    PrepayLimitExceeded { days: i64, max_days: i64 },

    #[error("Insufficient fund: available {available}, requested {requested}")]
    InsufficientFunds { available: i64, requested: i64 },

    #[error("Transaction {0} has already been archived")]
    AlreadyArchived(TransactionId),

    #[error("Account {0} has no contribution target")]
    MissingTarget(String),

    #[error("Unknown account type: {0}")]
    UnknownAccountType(String),
}

/// One failed field check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All field checks that failed for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Records `message` against `field` when `failed` is true.
    pub fn check(&mut self, failed: bool, field: &'static str, message: &str) {
        if failed {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// `Ok(())` when no check failed.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Application-level errors returned to callers of the ledger.
///
/// Each variant maps onto a client-facing status via [`AppError::status_code`].
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    BusinessRule(DomainError),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl AppError {
    /// HTTP-style status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Validation(_) => 400,
            AppError::Forbidden(_) => 403,
            AppError::NotFound(_) => 404,
            AppError::BusinessRule(_) => 400,
            AppError::Infrastructure(_) => 500,
        }
    }

    /// Prefixes infrastructure errors with the operation that hit them.
    /// Caller-facing errors pass through untouched.
    pub fn context(self, operation: &str) -> Self {
        match self {
            AppError::Infrastructure(msg) => {
                AppError::Infrastructure(format!("{}: {}", operation, msg))
            }
            other => other,
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::BusinessRule(err)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::Validation(err)
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => AppError::BusinessRule(e),
            RepoError::NotFound => AppError::NotFound("Resource not found".into()),
            RepoError::Database(e) => AppError::Infrastructure(e),
            RepoError::Transaction(e) => AppError::Infrastructure(e),
            RepoError::Conflict(e) => AppError::Infrastructure(format!("conflict: {}", e)),
        }
    }
}
