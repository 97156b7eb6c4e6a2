use std::{collections::HashMap, sync::Arc};

use axum::http::StatusCode;
use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    domain::{
        entities::{
            plans::PlanEntity,
            subscriptions::{
                InsertSubscriptionEntity, SubscriptionEntity, UpgradeSubscriptionEntity,
            },
        },
        repositories::{plans::PlanRepository, subscriptions::SubscriptionRepository},
        value_objects::{
            iam::Requester,
            subscriptions::{
                CreateSubscriptionModel, DecrementOutcome, ListSubscriptionsFilter,
                PurchaseOutcome, SubscriptionDto, SubscriptionOrderDto, UpgradeOutcome,
                UpgradeSubscriptionModel, ValidateSignatureModel,
            },
        },
    },
    payments::{OrderRequest, PaymentGateway, PaymentOrder, signature::verify_order_signature},
};

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("plan not found")]
    PlanNotFound,
    #[error("subscription not found")]
    SubscriptionNotFound,
    #[error("user already has an active plan and cannot purchase another")]
    AlreadySubscribed,
    #[error("no credits left to reduce")]
    NoCreditsRemaining,
    #[error("payment gateway order creation failed")]
    Gateway(#[source] anyhow::Error),
    #[error("{0}")]
    Validation(String),
    #[error("Transaction is not valid")]
    InvalidSignature,
    #[error("access denied")]
    Forbidden,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SubscriptionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SubscriptionError::PlanNotFound | SubscriptionError::SubscriptionNotFound => {
                StatusCode::NOT_FOUND
            }
            SubscriptionError::AlreadySubscribed => StatusCode::CONFLICT,
            SubscriptionError::NoCreditsRemaining => StatusCode::UNPROCESSABLE_ENTITY,
            SubscriptionError::Gateway(_) => StatusCode::BAD_GATEWAY,
            SubscriptionError::Validation(_) | SubscriptionError::InvalidSignature => {
                StatusCode::BAD_REQUEST
            }
            SubscriptionError::Forbidden => StatusCode::FORBIDDEN,
            SubscriptionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SubscriptionError::PlanNotFound | SubscriptionError::SubscriptionNotFound => {
                "not_found"
            }
            SubscriptionError::AlreadySubscribed => "conflict",
            SubscriptionError::NoCreditsRemaining => "exhausted_resource",
            SubscriptionError::Gateway(_) => "upstream_failure",
            SubscriptionError::Validation(_) | SubscriptionError::InvalidSignature => {
                "validation_failure"
            }
            SubscriptionError::Forbidden => "forbidden",
            SubscriptionError::Internal(_) => "internal",
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, SubscriptionError>;

/// The subscription ledger: purchase, upgrade and credit consumption for ball-count plans.
pub struct SubscriptionUseCase<P, S, G>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    plan_repo: Arc<P>,
    subscription_repo: Arc<S>,
    payment_gateway: Arc<G>,
    currency: String,
    gateway_secret: String,
}

impl<P, S, G> SubscriptionUseCase<P, S, G>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    pub fn new(
        plan_repo: Arc<P>,
        subscription_repo: Arc<S>,
        payment_gateway: Arc<G>,
        currency: String,
        gateway_secret: String,
    ) -> Self {
        Self {
            plan_repo,
            subscription_repo,
            payment_gateway,
            currency,
            gateway_secret,
        }
    }

    pub async fn purchase(
        &self,
        requester: &Requester,
        model: CreateSubscriptionModel,
    ) -> UseCaseResult<SubscriptionOrderDto> {
        let user_id = model.user_id;
        let plan_id = model.plan_id;
        info!(
            %user_id,
            %plan_id,
            payment_amount_minor = model.payment_amount_minor,
            is_active = model.is_active,
            "subscriptions: purchase requested"
        );

        if !requester.can_act_for(user_id) {
            warn!(
                %user_id,
                requester_id = %requester.user_id,
                "subscriptions: purchase for another user denied"
            );
            return Err(SubscriptionError::Forbidden);
        }
        Self::validate_amount(model.payment_amount_minor)?;

        let plan = self.load_plan(plan_id).await?;

        let existing = self
            .subscription_repo
            .find_active_by_user(user_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    db_error = ?err,
                    "subscriptions: failed to load active subscription"
                );
                SubscriptionError::Internal(err)
            })?;
        if let Some(existing) = existing {
            warn!(
                %user_id,
                subscription_id = %existing.id,
                "subscriptions: user already has an active subscription"
            );
            return Err(SubscriptionError::AlreadySubscribed);
        }

        let order = self
            .create_order(user_id, &plan, model.payment_amount_minor)
            .await?;

        let now = Utc::now();
        let insert_subscription_entity = InsertSubscriptionEntity {
            id: Uuid::new_v4(),
            user_id,
            plan_id: plan.id,
            plan_name: plan.name.clone(),
            payment_amount_minor: model.payment_amount_minor,
            payment_gateway_id: Some(order.id.clone()),
            payment_on: now,
            is_active: model.is_active,
            total_credits: plan.credit_allowance,
            current_credits: plan.credit_allowance,
            created_at: now,
            updated_at: now,
        };

        let outcome = self
            .subscription_repo
            .create_if_no_active(insert_subscription_entity)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %plan_id,
                    order_id = %order.id,
                    db_error = ?err,
                    "subscriptions: failed to insert subscription"
                );
                SubscriptionError::Internal(err)
            })?;

        match outcome {
            PurchaseOutcome::Created(subscription) => {
                info!(
                    %user_id,
                    %plan_id,
                    subscription_id = %subscription.id,
                    order_id = %order.id,
                    credits = subscription.total_credits,
                    "subscriptions: subscription created"
                );
                Ok(SubscriptionOrderDto {
                    subscription: subscription.into(),
                    order,
                })
            }
            PurchaseOutcome::AlreadySubscribed => {
                warn!(
                    %user_id,
                    order_id = %order.id,
                    "subscriptions: concurrent purchase won the race, order left unused"
                );
                Err(SubscriptionError::AlreadySubscribed)
            }
        }
    }

    /// Replaces the plan on an existing row and resets its balance to the new allowance.
    /// The old balance is discarded, not carried over.
    pub async fn upgrade(
        &self,
        requester: &Requester,
        subscription_id: Uuid,
        model: UpgradeSubscriptionModel,
    ) -> UseCaseResult<SubscriptionOrderDto> {
        let plan_id = model.plan_id;
        info!(
            %subscription_id,
            %plan_id,
            payment_amount_minor = model.payment_amount_minor,
            "subscriptions: upgrade requested"
        );

        Self::validate_amount(model.payment_amount_minor)?;

        let current = self
            .load_owned_subscription(requester, subscription_id)
            .await?;
        let plan = self.load_plan(plan_id).await?;

        let order = self
            .create_order(current.user_id, &plan, model.payment_amount_minor)
            .await?;

        let upgrade_subscription_entity = UpgradeSubscriptionEntity {
            plan_id: plan.id,
            plan_name: plan.name.clone(),
            payment_amount_minor: model.payment_amount_minor,
            payment_gateway_id: Some(order.id.clone()),
            payment_on: Utc::now(),
            is_active: true,
            total_credits: plan.credit_allowance,
            current_credits: plan.credit_allowance,
            updated_at: Utc::now(),
        };

        let outcome = self
            .subscription_repo
            .apply_upgrade(subscription_id, upgrade_subscription_entity)
            .await
            .map_err(|err| {
                error!(
                    %subscription_id,
                    %plan_id,
                    order_id = %order.id,
                    db_error = ?err,
                    "subscriptions: failed to apply upgrade"
                );
                SubscriptionError::Internal(err)
            })?;

        match outcome {
            UpgradeOutcome::Upgraded(subscription) => {
                info!(
                    %subscription_id,
                    %plan_id,
                    previous_plan_id = %current.plan_id,
                    discarded_credits = current.current_credits,
                    credits = subscription.current_credits,
                    order_id = %order.id,
                    "subscriptions: subscription upgraded"
                );
                Ok(SubscriptionOrderDto {
                    subscription: subscription.into(),
                    order,
                })
            }
            UpgradeOutcome::NotFound => {
                warn!(%subscription_id, "subscriptions: subscription removed during upgrade");
                Err(SubscriptionError::SubscriptionNotFound)
            }
            UpgradeOutcome::AlreadySubscribed => {
                warn!(
                    %subscription_id,
                    user_id = %current.user_id,
                    "subscriptions: upgrade would reactivate a second subscription"
                );
                Err(SubscriptionError::AlreadySubscribed)
            }
        }
    }

    pub async fn decrement_credit(
        &self,
        requester: &Requester,
        subscription_id: Uuid,
    ) -> UseCaseResult<SubscriptionDto> {
        info!(%subscription_id, "subscriptions: credit decrement requested");

        self.load_owned_subscription(requester, subscription_id)
            .await?;

        let outcome = self
            .subscription_repo
            .decrement_credit(subscription_id)
            .await
            .map_err(|err| {
                error!(
                    %subscription_id,
                    db_error = ?err,
                    "subscriptions: failed to decrement credit"
                );
                SubscriptionError::Internal(err)
            })?;

        match outcome {
            DecrementOutcome::Decremented(subscription) => {
                if subscription.current_credits == 0 {
                    info!(
                        %subscription_id,
                        user_id = %subscription.user_id,
                        "subscriptions: credits exhausted, subscription deactivated"
                    );
                } else {
                    info!(
                        %subscription_id,
                        remaining = subscription.current_credits,
                        "subscriptions: credit consumed"
                    );
                }
                Ok(subscription.into())
            }
            DecrementOutcome::NotFound => Err(SubscriptionError::SubscriptionNotFound),
            DecrementOutcome::NoCreditsRemaining => {
                warn!(%subscription_id, "subscriptions: no credits remaining");
                Err(SubscriptionError::NoCreditsRemaining)
            }
        }
    }

    pub async fn get_subscription(
        &self,
        requester: &Requester,
        subscription_id: Uuid,
    ) -> UseCaseResult<SubscriptionDto> {
        let subscription = self
            .load_owned_subscription(requester, subscription_id)
            .await?;
        Ok(subscription.into())
    }

    /// Admins see every subscription; users see their own.
    pub async fn list_subscriptions(
        &self,
        requester: &Requester,
    ) -> UseCaseResult<Vec<SubscriptionDto>> {
        let filter = ListSubscriptionsFilter {
            user_id: (!requester.is_admin()).then_some(requester.user_id),
        };

        let subscriptions = self
            .subscription_repo
            .list_subscriptions(filter)
            .await
            .map_err(|err| {
                error!(
                    requester_id = %requester.user_id,
                    db_error = ?err,
                    "subscriptions: failed to list subscriptions"
                );
                SubscriptionError::Internal(err)
            })?;

        info!(
            requester_id = %requester.user_id,
            count = subscriptions.len(),
            "subscriptions: subscriptions listed"
        );
        Ok(subscriptions.into_iter().map(SubscriptionDto::from).collect())
    }

    pub async fn delete_subscription(
        &self,
        requester: &Requester,
        subscription_id: Uuid,
    ) -> UseCaseResult<()> {
        if !requester.is_admin() {
            warn!(
                %subscription_id,
                requester_id = %requester.user_id,
                "subscriptions: delete denied for non-admin"
            );
            return Err(SubscriptionError::Forbidden);
        }

        let deleted = self
            .subscription_repo
            .delete_subscription(subscription_id)
            .await
            .map_err(|err| {
                error!(
                    %subscription_id,
                    db_error = ?err,
                    "subscriptions: failed to delete subscription"
                );
                SubscriptionError::Internal(err)
            })?;

        if !deleted {
            return Err(SubscriptionError::SubscriptionNotFound);
        }

        info!(%subscription_id, "subscriptions: subscription deleted");
        Ok(())
    }

    pub fn validate_gateway_signature(&self, model: &ValidateSignatureModel) -> UseCaseResult<()> {
        let valid = verify_order_signature(
            &self.gateway_secret,
            &model.order_id,
            &model.payment_id,
            &model.signature,
        );

        if !valid {
            warn!(
                order_id = %model.order_id,
                payment_id = %model.payment_id,
                "subscriptions: gateway signature mismatch"
            );
            return Err(SubscriptionError::InvalidSignature);
        }

        info!(
            order_id = %model.order_id,
            payment_id = %model.payment_id,
            "subscriptions: gateway signature verified"
        );
        Ok(())
    }

    async fn load_plan(&self, plan_id: Uuid) -> UseCaseResult<PlanEntity> {
        self.plan_repo
            .find_by_id(plan_id)
            .await
            .map_err(|err| {
                error!(%plan_id, db_error = ?err, "subscriptions: failed to load plan");
                SubscriptionError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(%plan_id, "subscriptions: plan not found");
                SubscriptionError::PlanNotFound
            })
    }

    async fn load_owned_subscription(
        &self,
        requester: &Requester,
        subscription_id: Uuid,
    ) -> UseCaseResult<SubscriptionEntity> {
        let subscription = self
            .subscription_repo
            .find_by_id(subscription_id)
            .await
            .map_err(|err| {
                error!(
                    %subscription_id,
                    db_error = ?err,
                    "subscriptions: failed to load subscription"
                );
                SubscriptionError::Internal(err)
            })?
            .ok_or(SubscriptionError::SubscriptionNotFound)?;

        if !requester.can_act_for(subscription.user_id) {
            warn!(
                %subscription_id,
                requester_id = %requester.user_id,
                "subscriptions: access to another user's subscription denied"
            );
            return Err(SubscriptionError::Forbidden);
        }

        Ok(subscription)
    }

    async fn create_order(
        &self,
        user_id: Uuid,
        plan: &PlanEntity,
        amount_minor: i64,
    ) -> UseCaseResult<PaymentOrder> {
        // Gateway receipts are capped at 40 characters.
        let request = OrderRequest {
            amount_minor,
            currency: self.currency.clone(),
            receipt: format!("rcpt_{}", user_id.simple()),
            notes: HashMap::from([
                ("plan_id".to_string(), plan.id.to_string()),
                ("user_id".to_string(), user_id.to_string()),
            ]),
        };

        self.payment_gateway
            .create_order(request)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    plan_id = %plan.id,
                    amount_minor,
                    error = ?err,
                    "subscriptions: payment order creation failed"
                );
                SubscriptionError::Gateway(err)
            })
    }

    fn validate_amount(payment_amount_minor: i64) -> UseCaseResult<()> {
        if payment_amount_minor <= 0 {
            return Err(SubscriptionError::Validation(
                "payment_amount_minor must be a positive number".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
