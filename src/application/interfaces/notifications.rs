use anyhow::Result;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OtpSender: Send + Sync {
    async fn send_reset_otp(&self, email: &str, otp: &str, valid_minutes: i64) -> Result<()>;
}
