//! Data Transfer Objects (DTOs) for ledger requests, with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{AccountType, PaymentMethod, TransactionId};
use crate::error::ValidationErrors;

/// Explicit request validation.
///
/// Every failing field is reported, not just the first one.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

// ─────────────────────────────────────────────────────────────────────────────
// Account DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to open a new customer account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAccountRequest {
    pub account_type: AccountType,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub phone_number: String,
    /// Per-day contribution in minor units. Required for DS accounts.
    #[serde(default)]
    pub target: i64,
    #[serde(default)]
    pub target_info: String,
    #[serde(default)]
    pub branch_id: String,
}

impl Validate for OpenAccountRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(blank(&self.customer_name), "customer_name", "is required");
        errors.check(blank(&self.phone_number), "phone_number", "is required");
        errors.check(self.target < 0, "target", "cannot be negative");
        errors.check(
            self.account_type == AccountType::DailySavings && self.target == 0,
            "target",
            "is required for daily savings accounts",
        );
        errors.into_result()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transaction DTOs
// ─────────────────────────────────────────────────────────────────────────────

fn default_payment_method() -> PaymentMethod {
    PaymentMethod::Cash
}

/// Request to pay money into an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositRequest {
    pub account_number: String,
    /// Amount in minor units
    pub amount: i64,
    #[serde(default)]
    pub narration: String,
    #[serde(default = "default_payment_method")]
    pub payment_method: PaymentMethod,
}

impl Validate for DepositRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(blank(&self.account_number), "account_number", "is required");
        errors.check(self.amount <= 0, "amount", "must be greater than zero");
        errors.into_result()
    }
}

/// Request to pay money out of an account to the customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawRequest {
    pub account_number: String,
    /// Amount in minor units
    pub amount: i64,
    pub payment_method: PaymentMethod,
    /// Receiving bank, for transfers
    #[serde(default)]
    pub bank: String,
    #[serde(default)]
    pub bank_account_number: String,
    #[serde(default)]
    pub narration: String,
}

impl WithdrawRequest {
    /// Narration recorded on the ledger.
    ///
    /// Always starts with the payment method; transfers also carry the
    /// receiving bank details for audit.
    pub fn audit_narration(&self) -> String {
        let mut parts = vec![self.payment_method.to_string()];
        if !blank(&self.narration) {
            parts.push(self.narration.trim().to_string());
        }
        if self.payment_method == PaymentMethod::Transfer {
            if !blank(&self.bank) {
                parts.push(self.bank.trim().to_string());
            }
            if !blank(&self.bank_account_number) {
                parts.push(self.bank_account_number.trim().to_string());
            }
        }
        parts.join(" - ")
    }
}

impl Validate for WithdrawRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(blank(&self.account_number), "account_number", "is required");
        errors.check(self.amount <= 0, "amount", "must be greater than zero");
        errors.into_result()
    }
}

/// Request to deduct money from an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeductionRequest {
    pub account_number: String,
    /// Amount in minor units
    pub amount: i64,
    #[serde(default)]
    pub narration: String,
}

impl Validate for DeductionRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(blank(&self.account_number), "account_number", "is required");
        errors.check(self.amount <= 0, "amount", "must be greater than zero");
        errors.into_result()
    }
}

impl From<WithdrawRequest> for DeductionRequest {
    fn from(req: WithdrawRequest) -> Self {
        Self {
            narration: req.audit_narration(),
            account_number: req.account_number,
            amount: req.amount,
        }
    }
}

/// Request to archive (soft-delete) a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveRequest {
    pub transaction_id: TransactionId,
}
