//! Configuration loading from environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

use surebank_ledger::LedgerConfig;
use surebank_types::AccountingCalendar;

/// Application configuration.
pub struct Config {
    pub database_url: String,
    pub ledger: LedgerConfig,
    /// SMS gateway endpoint. Without one, notifications are only logged.
    pub sms_gateway_url: Option<String>,
    pub sms_sender_id: String,
    pub log_json: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let defaults = LedgerConfig::default();
        let offset: i32 = parse_or(&lookup, "SUREBANK_UTC_OFFSET_MINUTES", 0)?;
        let calendar = AccountingCalendar::with_offset_minutes(offset).ok_or_else(|| {
            anyhow::anyhow!("SUREBANK_UTC_OFFSET_MINUTES out of range: {}", offset)
        })?;
        let ledger = LedgerConfig {
            calendar,
            cycle_length_days: parse_or(&lookup, "SUREBANK_CYCLE_DAYS", defaults.cycle_length_days)?,
            max_prepay_days: parse_or(
                &lookup,
                "SUREBANK_MAX_PREPAY_DAYS",
                defaults.max_prepay_days,
            )?,
            identifier_attempts: parse_or(
                &lookup,
                "SUREBANK_IDENTIFIER_ATTEMPTS",
                defaults.identifier_attempts,
            )?,
            notify_timeout: Duration::from_millis(parse_or(
                &lookup,
                "SUREBANK_NOTIFY_TIMEOUT_MS",
                defaults.notify_timeout.as_millis() as u64,
            )?),
        };
        if ledger.cycle_length_days <= 0 || ledger.max_prepay_days <= 0 {
            anyhow::bail!("SUREBANK_CYCLE_DAYS and SUREBANK_MAX_PREPAY_DAYS must be positive");
        }
        if ledger.identifier_attempts == 0 {
            anyhow::bail!("SUREBANK_IDENTIFIER_ATTEMPTS must be at least 1");
        }

        let sms_gateway_url = lookup("SMS_GATEWAY_URL").filter(|url| !url.trim().is_empty());
        let sms_sender_id = lookup("SMS_SENDER_ID").unwrap_or_else(|| "SureBank".to_string());
        let log_json = matches!(
            lookup("SUREBANK_LOG_JSON").as_deref(),
            Some("1") | Some("true")
        );

        Ok(Self {
            database_url,
            ledger,
            sms_gateway_url,
            sms_sender_id,
            log_json,
        })
    }
}

fn parse_or<T>(lookup: impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "sqlite::memory:")]).unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.ledger.cycle_length_days, 31);
        assert_eq!(config.ledger.max_prepay_days, 50);
        assert_eq!(config.ledger.identifier_attempts, 20);
        assert_eq!(config.ledger.notify_timeout, Duration::from_secs(5));
        assert_eq!(config.ledger.calendar, AccountingCalendar::utc());
        assert_eq!(config.sms_gateway_url, None);
        assert_eq!(config.sms_sender_id, "SureBank");
        assert!(!config.log_json);
    }

    #[test]
    fn test_database_url_is_required() {
        let err = load(&[]).err().unwrap();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_URL", "sqlite://surebank.db"),
            ("SUREBANK_UTC_OFFSET_MINUTES", "60"),
            ("SUREBANK_CYCLE_DAYS", "30"),
            ("SUREBANK_MAX_PREPAY_DAYS", "62"),
            ("SUREBANK_NOTIFY_TIMEOUT_MS", "1500"),
            ("SMS_GATEWAY_URL", "http://sms.local/send"),
            ("SMS_SENDER_ID", "SB-Yaba"),
            ("SUREBANK_LOG_JSON", "1"),
        ])
        .unwrap();

        assert_eq!(config.ledger.calendar.offset().local_minus_utc(), 3600);
        assert_eq!(config.ledger.cycle_length_days, 30);
        assert_eq!(config.ledger.max_prepay_days, 62);
        assert_eq!(config.ledger.notify_timeout, Duration::from_millis(1500));
        assert_eq!(
            config.sms_gateway_url.as_deref(),
            Some("http://sms.local/send")
        );
        assert_eq!(config.sms_sender_id, "SB-Yaba");
        assert!(config.log_json);
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let err = load(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("SUREBANK_CYCLE_DAYS", "monthly"),
        ])
        .err()
        .unwrap();
        assert!(err.to_string().contains("SUREBANK_CYCLE_DAYS"));

        assert!(load(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("SUREBANK_IDENTIFIER_ATTEMPTS", "0"),
        ])
        .is_err());
    }
}
