//! Email delivery.
//!
//! `HttpEmailChannel` posts to an HTTP email gateway (SendGrid-shaped:
//! bearer key, JSON body). When no gateway credentials are configured the
//! caller should fall back to `MockEmailChannel`, which records sends and
//! always succeeds -- the demo/keyless path.

use std::sync::Mutex;
use std::time::Duration;

use reqwest::Client;
use serde_json::json;

use crate::error::ChannelError;
use crate::storage::EmailConfig;
use crate::template::RenderedMessage;

use super::EmailChannel;

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Email channel backed by an HTTP gateway.
pub struct HttpEmailChannel {
    gateway_url: String,
    api_key: String,
    from_address: String,
    client: Client,
    rt: tokio::runtime::Runtime,
}

impl HttpEmailChannel {
    /// Build from config. Returns `None` when the gateway URL or API key
    /// is absent, so callers can fall back to the mock channel.
    pub fn from_config(config: &EmailConfig) -> Option<Result<Self, ChannelError>> {
        if config.gateway_url.is_empty() || config.api_key.is_empty() {
            return None;
        }
        Some(Self::new(
            &config.gateway_url,
            &config.api_key,
            &config.from_address,
        ))
    }

    pub fn new(gateway_url: &str, api_key: &str, from_address: &str) -> Result<Self, ChannelError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ChannelError::Send(format!("runtime: {e}")))?;
        let client = Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(|e| ChannelError::Send(e.to_string()))?;
        Ok(Self {
            gateway_url: gateway_url.to_string(),
            api_key: api_key.to_string(),
            from_address: from_address.to_string(),
            client,
            rt,
        })
    }
}

impl EmailChannel for HttpEmailChannel {
    fn send(&self, address: &str, message: &RenderedMessage) -> Result<(), ChannelError> {
        let body = json!({
            "to": address,
            "from": self.from_address,
            "subject": message.subject,
            "html": message.html_body,
            "text": message.text_body,
        });

        let resp = self
            .rt
            .block_on(async {
                self.client
                    .post(&self.gateway_url)
                    .header("Authorization", format!("Bearer {}", self.api_key))
                    .json(&body)
                    .send()
                    .await
            })
            .map_err(|e| ChannelError::Send(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ChannelError::Http {
                status: resp.status().as_u16(),
            });
        }
        Ok(())
    }
}

/// Record of one mock email send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub address: String,
    pub subject: String,
}

/// Always-succeeding email channel that records what it would have sent.
/// Used when no gateway is configured, and by tests. Addresses listed in
/// `fail_for` fail instead, to exercise the dispatcher's isolation.
#[derive(Default)]
pub struct MockEmailChannel {
    sent: Mutex<Vec<SentEmail>>,
    fail_for: Vec<String>,
}

impl MockEmailChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock that fails for the given addresses.
    pub fn failing_for(addresses: &[&str]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_for: addresses.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

impl EmailChannel for MockEmailChannel {
    fn send(&self, address: &str, message: &RenderedMessage) -> Result<(), ChannelError> {
        if self.fail_for.iter().any(|a| a == address) {
            return Err(ChannelError::Send(format!(
                "mock failure for {address}"
            )));
        }
        self.sent.lock().unwrap().push(SentEmail {
            address: address.to_string(),
            subject: message.subject.clone(),
        });
        Ok(())
    }
}
