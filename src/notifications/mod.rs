pub mod log_sender;
pub mod webhook;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;

use crate::{
    application::interfaces::notifications::OtpSender,
    config::config_model::Notifications as NotificationsConfig,
};
use log_sender::LogOtpSender;
use webhook::WebhookOtpSender;

/// Reset-code delivery selected at startup from configuration.
pub enum ConfiguredOtpSender {
    Webhook(WebhookOtpSender),
    Log(LogOtpSender),
}

impl ConfiguredOtpSender {
    pub fn from_config(config: &NotificationsConfig) -> Result<Self> {
        let Some(raw) = config.otp_webhook_url.as_deref() else {
            return Ok(Self::Log(LogOtpSender));
        };

        let url = Url::parse(raw).context("OTP_WEBHOOK_URL is invalid")?;
        Ok(Self::Webhook(WebhookOtpSender::new(url)?))
    }

    pub fn provider_name(&self) -> &'static str {
        match self {
            Self::Webhook(_) => "webhook",
            Self::Log(_) => "log",
        }
    }
}

#[async_trait]
impl OtpSender for ConfiguredOtpSender {
    async fn send_reset_otp(&self, email: &str, otp: &str, valid_minutes: i64) -> Result<()> {
        match self {
            Self::Webhook(sender) => sender.send_reset_otp(email, otp, valid_minutes).await,
            Self::Log(sender) => sender.send_reset_otp(email, otp, valid_minutes).await,
        }
    }
}
