use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::{OrderRequest, PaymentGateway, PaymentOrder};

/// Stands in for the gateway when integration is disabled: every order succeeds with a
/// random id and nothing leaves the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderGateway;

#[async_trait]
impl PaymentGateway for PlaceholderGateway {
    async fn create_order(&self, request: OrderRequest) -> Result<PaymentOrder> {
        let order = PaymentOrder {
            id: Uuid::new_v4().to_string(),
            amount_minor: request.amount_minor,
            currency: request.currency,
            receipt: Some(request.receipt),
            status: "created".to_string(),
        };
        debug!(order_id = %order.id, "payments: placeholder order issued");
        Ok(order)
    }
}
