//! Customer notification port.
//!
//! Implementations deliver SMS confirmations. The ledger treats every call
//! as best effort: a failure is logged and never undoes a committed posting.

use crate::domain::Actor;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Notification rejected: {0}")]
    Rejected(String),

    #[error("Notification transport failed: {0}")]
    Transport(String),
}

/// Message templates understood by the SMS gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsTemplate {
    PaymentReceived,
    DsReceived,
    PaymentWithdrawn,
}

impl SmsTemplate {
    pub fn name(&self) -> &'static str {
        match self {
            SmsTemplate::PaymentReceived => "sms/payment_received",
            SmsTemplate::DsReceived => "sms/ds_received",
            SmsTemplate::PaymentWithdrawn => "sms/payment_withdrawn",
        }
    }
}

impl std::fmt::Display for SmsTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// Sends a templated message; `data` fills the template.
    async fn send(
        &self,
        actor: &Actor,
        phone_number: &str,
        template: SmsTemplate,
        data: serde_json::Value,
    ) -> Result<(), NotifyError>;

    /// Sends a raw message.
    async fn send_str(
        &self,
        actor: &Actor,
        phone_number: &str,
        message: &str,
    ) -> Result<(), NotifyError>;
}
