//! SMS notifier adapters.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, instrument, warn};

use surebank_types::{Actor, Notifier, NotifyError, SmsTemplate};

/// Body posted to the SMS gateway.
#[derive(Debug, Serialize)]
struct SmsPayload<'a> {
    sender: &'a str,
    to: &'a str,
    requested_by: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    template: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

/// Upper bound on one gateway request, connect included.
pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers messages by POSTing JSON to an HTTP SMS gateway.
///
/// Any non-2xx response is reported as [`NotifyError::Rejected`]. A gateway
/// that does not answer within the request timeout is a
/// [`NotifyError::Transport`] failure.
pub struct HttpSmsNotifier {
    client: reqwest::Client,
    gateway_url: String,
    sender_id: String,
}

impl HttpSmsNotifier {
    pub fn new(gateway_url: String, sender_id: String) -> Result<Self, NotifyError> {
        Self::with_timeout(gateway_url, sender_id, DEFAULT_GATEWAY_TIMEOUT)
    }

    pub fn with_timeout(
        gateway_url: String,
        sender_id: String,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            gateway_url,
            sender_id,
        })
    }

    async fn post(&self, payload: &SmsPayload<'_>) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(&self.gateway_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            warn!("SMS gateway answered HTTP {}", resp.status());
            Err(NotifyError::Rejected(format!("HTTP {}", resp.status())))
        }
    }
}

#[async_trait]
impl Notifier for HttpSmsNotifier {
    #[instrument(skip(self, actor, data))]
    async fn send(
        &self,
        actor: &Actor,
        phone_number: &str,
        template: SmsTemplate,
        data: serde_json::Value,
    ) -> Result<(), NotifyError> {
        self.post(&SmsPayload {
            sender: &self.sender_id,
            to: phone_number,
            requested_by: &actor.subject,
            template: Some(template.name()),
            data: Some(&data),
            message: None,
        })
        .await
    }

    #[instrument(skip(self, actor, message))]
    async fn send_str(
        &self,
        actor: &Actor,
        phone_number: &str,
        message: &str,
    ) -> Result<(), NotifyError> {
        self.post(&SmsPayload {
            sender: &self.sender_id,
            to: phone_number,
            requested_by: &actor.subject,
            template: None,
            data: None,
            message: Some(message),
        })
        .await
    }
}

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(
        &self,
        actor: &Actor,
        phone_number: &str,
        template: SmsTemplate,
        data: serde_json::Value,
    ) -> Result<(), NotifyError> {
        info!(
            actor = %actor.subject,
            to = %phone_number,
            template = %template,
            data = %data,
            "sms notification"
        );
        Ok(())
    }

    async fn send_str(
        &self,
        actor: &Actor,
        phone_number: &str,
        message: &str,
    ) -> Result<(), NotifyError> {
        info!(actor = %actor.subject, to = %phone_number, body = %message, "sms notification");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answers a single HTTP request with `status` and returns the request text.
    async fn one_shot_gateway(status: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let mut request = Vec::new();
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|l| {
                            l.to_ascii_lowercase()
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                status
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });
        (format!("http://{}/sms", addr), handle)
    }

    #[tokio::test]
    async fn test_http_notifier_posts_template() {
        let (url, gateway) = one_shot_gateway("200 OK").await;
        let notifier = HttpSmsNotifier::new(url, "SureBank".into()).unwrap();
        let actor = Actor::new("rep-1", vec![]);

        notifier
            .send(
                &actor,
                "08030000000",
                SmsTemplate::DsReceived,
                serde_json::json!({ "amount": "3.00" }),
            )
            .await
            .unwrap();

        let request = gateway.await.unwrap();
        assert!(request.starts_with("POST /sms"));
        assert!(request.contains("\"template\":\"sms/ds_received\""));
        assert!(request.contains("\"to\":\"08030000000\""));
        assert!(request.contains("\"sender\":\"SureBank\""));
    }

    #[tokio::test]
    async fn test_http_notifier_rejects_non_success() {
        let (url, gateway) = one_shot_gateway("503 Service Unavailable").await;
        let notifier = HttpSmsNotifier::new(url, "SureBank".into()).unwrap();
        let actor = Actor::new("rep-1", vec![]);

        let result = notifier.send_str(&actor, "08030000000", "hello").await;

        assert!(matches!(result, Err(NotifyError::Rejected(_))));
        gateway.await.unwrap();
    }

    #[tokio::test]
    async fn test_http_notifier_transport_failure() {
        // Nothing listens on this port once the listener is dropped.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let notifier = HttpSmsNotifier::new(format!("http://{}/sms", addr), "SureBank".into()).unwrap();
        let result = notifier
            .send_str(&Actor::new("rep-1", vec![]), "08030000000", "hello")
            .await;

        assert!(matches!(result, Err(NotifyError::Transport(_))));
    }

    #[tokio::test]
    async fn test_http_notifier_gives_up_on_silent_gateway() {
        // Accepts the connection and reads the request but never answers.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let gateway = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            while socket.read(&mut buf).await.unwrap_or(0) > 0 {}
        });

        let notifier = HttpSmsNotifier::with_timeout(
            format!("http://{}/sms", addr),
            "SureBank".into(),
            Duration::from_millis(200),
        )
        .unwrap();
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            notifier.send_str(&Actor::new("rep-1", vec![]), "08030000000", "hello"),
        )
        .await
        .expect("request should time out on its own");

        assert!(matches!(result, Err(NotifyError::Transport(_))));
        gateway.abort();
    }
}
