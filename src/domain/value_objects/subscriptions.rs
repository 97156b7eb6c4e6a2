use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{domain::entities::subscriptions::SubscriptionEntity, payments::PaymentOrder};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateSubscriptionModel {
    pub user_id: Uuid,
    pub plan_id: Uuid,
    /// Amount charged in the currency's minor unit (paise for INR), sent to the gateway as-is.
    pub payment_amount_minor: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpgradeSubscriptionModel {
    pub plan_id: Uuid,
    /// Minor currency unit, like the purchase amount.
    pub payment_amount_minor: i64,
}

/// Checkout callback fields; the gateway's own field names are accepted as aliases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidateSignatureModel {
    #[serde(alias = "razorpay_order_id")]
    pub order_id: String,
    #[serde(alias = "razorpay_payment_id")]
    pub payment_id: String,
    #[serde(alias = "razorpay_signature")]
    pub signature: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListSubscriptionsFilter {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionDto {
    pub subscription_id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub plan_name: String,
    pub payment_amount_minor: i64,
    pub payment_gateway_id: Option<String>,
    pub payment_on: DateTime<Utc>,
    pub is_active: bool,
    pub total_credits: i32,
    pub current_credits: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SubscriptionEntity> for SubscriptionDto {
    fn from(value: SubscriptionEntity) -> Self {
        Self {
            subscription_id: value.id,
            user_id: value.user_id,
            plan_id: value.plan_id,
            plan_name: value.plan_name,
            payment_amount_minor: value.payment_amount_minor,
            payment_gateway_id: value.payment_gateway_id,
            payment_on: value.payment_on,
            is_active: value.is_active,
            total_credits: value.total_credits,
            current_credits: value.current_credits,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubscriptionOrderDto {
    pub subscription: SubscriptionDto,
    pub order: PaymentOrder,
}

/// Result of the guarded insert performed by a purchase.
#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseOutcome {
    Created(SubscriptionEntity),
    /// The user already holds an active subscription; nothing was written.
    AlreadySubscribed,
}

/// Result of the in-place plan replacement performed by an upgrade.
#[derive(Debug, Clone, PartialEq)]
pub enum UpgradeOutcome {
    Upgraded(SubscriptionEntity),
    NotFound,
    /// Reactivating the row would give the user a second active subscription.
    AlreadySubscribed,
}

/// Result of the conditional credit decrement.
#[derive(Debug, Clone, PartialEq)]
pub enum DecrementOutcome {
    Decremented(SubscriptionEntity),
    NotFound,
    /// Balance was already zero; nothing was written.
    NoCreditsRemaining,
}
