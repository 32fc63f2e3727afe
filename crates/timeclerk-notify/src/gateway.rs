//! SMS gateway client (Twilio-compatible REST dialect)

use async_trait::async_trait;
use reqwest::Client;
use timeclerk_config::NotifyConfig;
use timeclerk_util::{Result, TimeclerkError};
use tracing::debug;

use crate::Notifier;

/// Notifier backed by the SMS gateway's HTTP API
pub struct SmsGateway {
    http: Client,
    api_url: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl SmsGateway {
    pub fn new(config: &NotifyConfig, auth_token: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| TimeclerkError::config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            account_sid: config.account_sid.clone(),
            auth_token: auth_token.into(),
            from_number: config.from_number.clone(),
        })
    }
}

#[async_trait]
impl Notifier for SmsGateway {
    async fn send(&self, to_e164: &str, body: &str) -> Result<()> {
        let url = format!(
            "{}/Accounts/{}/Messages.json",
            self.api_url, self.account_sid
        );

        let form = [
            ("To", to_e164),
            ("From", self.from_number.as_str()),
            ("Body", body),
        ];

        debug!(to = %to_e164, "Sending SMS");

        let resp = self
            .http
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|e| TimeclerkError::notify(format!("SMS request: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(TimeclerkError::notify(format!(
                "SMS gateway returned {}: {}",
                status, text
            )));
        }

        Ok(())
    }
}
