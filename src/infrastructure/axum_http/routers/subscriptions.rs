use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    application::usercases::subscriptions::SubscriptionUseCase,
    config::config_model::PaymentGateway as PaymentGatewayConfig,
    domain::{
        repositories::{plans::PlanRepository, subscriptions::SubscriptionRepository},
        value_objects::subscriptions::{
            CreateSubscriptionModel, UpgradeSubscriptionModel, ValidateSignatureModel,
        },
    },
    infrastructure::{
        axum_http::{
            auth::AuthUser,
            error_responses::{rejection_response, success_response},
        },
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{plans::PlanPostgres, subscriptions::SubscriptionPostgres},
        },
    },
    payments::{ConfiguredGateway, PaymentGateway},
};

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    payment_gateway: Arc<ConfiguredGateway>,
    gateway_config: &PaymentGatewayConfig,
) -> Router {
    let plan_repository = PlanPostgres::new(Arc::clone(&db_pool));
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let subscription_usecase = SubscriptionUseCase::new(
        Arc::new(plan_repository),
        Arc::new(subscription_repository),
        payment_gateway,
        gateway_config.currency.clone(),
        gateway_config.secret.clone(),
    );

    Router::new()
        .route("/", post(purchase).get(list_subscriptions))
        .route("/validate", post(validate_signature))
        .route("/upgrade/:subscription_id", put(upgrade))
        .route("/reduce-balls/:subscription_id", post(decrement_credit))
        .route(
            "/:subscription_id",
            get(get_subscription).delete(delete_subscription),
        )
        .with_state(Arc::new(subscription_usecase))
}

fn path_rejection(rejection: PathRejection) -> Response {
    rejection_response(rejection.status(), rejection.body_text())
}

fn json_rejection(rejection: JsonRejection) -> Response {
    rejection_response(rejection.status(), rejection.body_text())
}

pub async fn purchase<P, S, G>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<P, S, G>>>,
    auth: AuthUser,
    payload: Result<Json<CreateSubscriptionModel>, JsonRejection>,
) -> Response
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    let Json(create_subscription_model) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return json_rejection(rejection),
    };

    match subscription_usecase
        .purchase(&auth.requester(), create_subscription_model)
        .await
    {
        Ok(created) => success_response(
            StatusCode::CREATED,
            "Subscription purchased successfully",
            created,
        ),
        Err(err) => err.into_response(),
    }
}

pub async fn upgrade<P, S, G>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<P, S, G>>>,
    auth: AuthUser,
    subscription_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpgradeSubscriptionModel>, JsonRejection>,
) -> Response
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    let Path(subscription_id) = match subscription_id {
        Ok(path) => path,
        Err(rejection) => return path_rejection(rejection),
    };
    let Json(upgrade_subscription_model) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return json_rejection(rejection),
    };

    match subscription_usecase
        .upgrade(
            &auth.requester(),
            subscription_id,
            upgrade_subscription_model,
        )
        .await
    {
        Ok(upgraded) => success_response(
            StatusCode::OK,
            "Subscription upgraded successfully",
            upgraded,
        ),
        Err(err) => err.into_response(),
    }
}

pub async fn decrement_credit<P, S, G>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<P, S, G>>>,
    auth: AuthUser,
    subscription_id: Result<Path<Uuid>, PathRejection>,
) -> Response
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    let Path(subscription_id) = match subscription_id {
        Ok(path) => path,
        Err(rejection) => return path_rejection(rejection),
    };

    match subscription_usecase
        .decrement_credit(&auth.requester(), subscription_id)
        .await
    {
        Ok(subscription) => {
            success_response(StatusCode::OK, "Ball count reduced", subscription)
        }
        Err(err) => err.into_response(),
    }
}

pub async fn get_subscription<P, S, G>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<P, S, G>>>,
    auth: AuthUser,
    subscription_id: Result<Path<Uuid>, PathRejection>,
) -> Response
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    let Path(subscription_id) = match subscription_id {
        Ok(path) => path,
        Err(rejection) => return path_rejection(rejection),
    };

    match subscription_usecase
        .get_subscription(&auth.requester(), subscription_id)
        .await
    {
        Ok(subscription) => success_response(StatusCode::OK, "Subscription found", subscription),
        Err(err) => err.into_response(),
    }
}

pub async fn list_subscriptions<P, S, G>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<P, S, G>>>,
    auth: AuthUser,
) -> Response
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    match subscription_usecase
        .list_subscriptions(&auth.requester())
        .await
    {
        Ok(subscriptions) => {
            success_response(StatusCode::OK, "Subscriptions fetched", subscriptions)
        }
        Err(err) => err.into_response(),
    }
}

pub async fn delete_subscription<P, S, G>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<P, S, G>>>,
    auth: AuthUser,
    subscription_id: Result<Path<Uuid>, PathRejection>,
) -> Response
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    let Path(subscription_id) = match subscription_id {
        Ok(path) => path,
        Err(rejection) => return path_rejection(rejection),
    };

    match subscription_usecase
        .delete_subscription(&auth.requester(), subscription_id)
        .await
    {
        Ok(()) => success_response(StatusCode::OK, "Subscription deleted", subscription_id),
        Err(err) => err.into_response(),
    }
}

/// Public: called by the checkout page after the customer pays.
pub async fn validate_signature<P, S, G>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<P, S, G>>>,
    payload: Result<Json<ValidateSignatureModel>, JsonRejection>,
) -> Response
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    let Json(validate_signature_model) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return json_rejection(rejection),
    };

    match subscription_usecase.validate_gateway_signature(&validate_signature_model) {
        Ok(()) => success_response(
            StatusCode::OK,
            "Payment signature is valid",
            serde_json::json!({ "valid": true }),
        ),
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::Value;

    use super::*;
    use crate::{
        domain::repositories::{
            plans::MockPlanRepository, subscriptions::MockSubscriptionRepository,
        },
        payments::{placeholder::PlaceholderGateway, signature::order_signature},
    };

    const SECRET: &str = "secret";

    type TestUseCase =
        SubscriptionUseCase<MockPlanRepository, MockSubscriptionRepository, PlaceholderGateway>;

    fn usecase() -> Arc<TestUseCase> {
        Arc::new(SubscriptionUseCase::new(
            Arc::new(MockPlanRepository::new()),
            Arc::new(MockSubscriptionRepository::new()),
            Arc::new(PlaceholderGateway),
            "INR".to_string(),
            SECRET.to_string(),
        ))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validate_signature_accepts_a_matching_signature() {
        let signature = order_signature(SECRET, "o", "p").unwrap();
        let payload = ValidateSignatureModel {
            order_id: "o".to_string(),
            payment_id: "p".to_string(),
            signature,
        };

        let response = validate_signature(State(usecase()), Ok(Json(payload))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["valid"], true);
    }

    #[tokio::test]
    async fn validate_signature_rejects_a_forged_signature() {
        let payload = ValidateSignatureModel {
            order_id: "o".to_string(),
            payment_id: "p".to_string(),
            signature: "deadbeef".to_string(),
        };

        let response = validate_signature(State(usecase()), Ok(Json(payload))).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["kind"], "validation_failure");
        assert_eq!(body["message"], "Transaction is not valid");
    }
}
