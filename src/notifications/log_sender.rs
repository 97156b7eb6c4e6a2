use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::application::interfaces::notifications::OtpSender;

/// Local development stand-in: nothing is delivered, the code only reaches debug logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOtpSender;

#[async_trait]
impl OtpSender for LogOtpSender {
    async fn send_reset_otp(&self, email: &str, otp: &str, valid_minutes: i64) -> Result<()> {
        warn!(%email, "notifications: no OTP delivery configured, reset code not sent");
        debug!(%email, %otp, valid_minutes, "notifications: reset code");
        Ok(())
    }
}
