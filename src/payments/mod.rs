pub mod placeholder;
pub mod razorpay_client;
pub mod signature;

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::config_model::PaymentGateway as PaymentGatewayConfig;
use placeholder::PlaceholderGateway;
use razorpay_client::RazorpayClient;

/// Order descriptor returned to the client alongside the subscription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentOrder {
    pub id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub receipt: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub amount_minor: i64,
    pub currency: String,
    pub receipt: String,
    pub notes: HashMap<String, String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, request: OrderRequest) -> Result<PaymentOrder>;
}

/// Gateway selected at startup from configuration.
pub enum ConfiguredGateway {
    Razorpay(RazorpayClient),
    Placeholder(PlaceholderGateway),
}

impl ConfiguredGateway {
    pub fn from_config(config: &PaymentGatewayConfig) -> Result<Self> {
        if !config.enabled {
            return Ok(Self::Placeholder(PlaceholderGateway));
        }

        let key_id = config
            .key_id
            .clone()
            .context("RAZORPAY_KEY_ID is required when the payment gateway is enabled")?;

        Ok(Self::Razorpay(RazorpayClient::new(
            key_id,
            config.secret.clone(),
        )))
    }
}

#[async_trait]
impl PaymentGateway for ConfiguredGateway {
    async fn create_order(&self, request: OrderRequest) -> Result<PaymentOrder> {
        match self {
            Self::Razorpay(client) => client.create_order(request).await,
            Self::Placeholder(placeholder) => placeholder.create_order(request).await,
        }
    }
}
