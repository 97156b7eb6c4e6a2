use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::json;
use tracing::info;

use crate::application::interfaces::notifications::OtpSender;

/// Posts reset codes to a mail relay that turns them into emails.
pub struct WebhookOtpSender {
    webhook_url: Url,
    client: Client,
}

impl WebhookOtpSender {
    pub fn new(webhook_url: Url) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(5)).build()?;

        Ok(Self {
            webhook_url,
            client,
        })
    }
}

#[async_trait]
impl OtpSender for WebhookOtpSender {
    async fn send_reset_otp(&self, email: &str, otp: &str, valid_minutes: i64) -> Result<()> {
        let text = format!(
            "You requested a password reset. Use this code to reset your password: {otp}. \
             It is valid for {valid_minutes} minutes."
        );

        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(&json!({
                "to": email,
                "subject": "Password Reset Request",
                "text": text,
            }))
            .send()
            .await
            .map_err(sanitize_reqwest_error)?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "otp webhook returned non-success status: {}",
                response.status()
            ));
        }

        info!(%email, "notifications: reset code delivered");
        Ok(())
    }
}

fn sanitize_reqwest_error(error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!("otp webhook request timed out");
    }
    if error.is_connect() {
        return anyhow!("otp webhook connection failed");
    }
    anyhow!("otp webhook request failed")
}
