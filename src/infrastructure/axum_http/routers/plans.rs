use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use uuid::Uuid;

use crate::{
    application::usercases::plans::PlanUseCase,
    domain::{
        repositories::plans::PlanRepository,
        value_objects::plans::{InsertPlanModel, UpdatePlanModel},
    },
    infrastructure::{
        axum_http::{
            auth::AuthUser,
            error_responses::{rejection_response, success_response},
        },
        postgres::{postgres_connection::PgPoolSquad, repositories::plans::PlanPostgres},
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let plan_repository = PlanPostgres::new(Arc::clone(&db_pool));
    let plan_usecase = PlanUseCase::new(Arc::new(plan_repository));

    Router::new()
        .route("/", get(list_plans).post(create_plan))
        .route(
            "/:plan_id",
            get(get_plan).put(update_plan).delete(delete_plan),
        )
        .with_state(Arc::new(plan_usecase))
}

pub async fn create_plan<T>(
    State(plan_usecase): State<Arc<PlanUseCase<T>>>,
    auth: AuthUser,
    payload: Result<Json<InsertPlanModel>, JsonRejection>,
) -> Response
where
    T: PlanRepository + Send + Sync + 'static,
{
    let Json(insert_plan_model) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };

    match plan_usecase
        .create_plan(&auth.requester(), insert_plan_model)
        .await
    {
        Ok(plan) => success_response(StatusCode::CREATED, "Plan created", plan),
        Err(err) => err.into_response(),
    }
}

pub async fn list_plans<T>(
    State(plan_usecase): State<Arc<PlanUseCase<T>>>,
    _auth: AuthUser,
) -> Response
where
    T: PlanRepository + Send + Sync + 'static,
{
    match plan_usecase.list_plans().await {
        Ok(plans) => success_response(StatusCode::OK, "Plans fetched", plans),
        Err(err) => err.into_response(),
    }
}

pub async fn get_plan<T>(
    State(plan_usecase): State<Arc<PlanUseCase<T>>>,
    plan_id: Result<Path<Uuid>, PathRejection>,
) -> Response
where
    T: PlanRepository + Send + Sync + 'static,
{
    let Path(plan_id) = match plan_id {
        Ok(path) => path,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };

    match plan_usecase.get_plan(plan_id).await {
        Ok(plan) => success_response(StatusCode::OK, "Plan found", plan),
        Err(err) => err.into_response(),
    }
}

pub async fn update_plan<T>(
    State(plan_usecase): State<Arc<PlanUseCase<T>>>,
    auth: AuthUser,
    plan_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdatePlanModel>, JsonRejection>,
) -> Response
where
    T: PlanRepository + Send + Sync + 'static,
{
    let Path(plan_id) = match plan_id {
        Ok(path) => path,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    let Json(update_plan_model) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };

    match plan_usecase
        .update_plan(&auth.requester(), plan_id, update_plan_model)
        .await
    {
        Ok(plan) => success_response(StatusCode::OK, "Plan updated", plan),
        Err(err) => err.into_response(),
    }
}

pub async fn delete_plan<T>(
    State(plan_usecase): State<Arc<PlanUseCase<T>>>,
    auth: AuthUser,
    plan_id: Result<Path<Uuid>, PathRejection>,
) -> Response
where
    T: PlanRepository + Send + Sync + 'static,
{
    let Path(plan_id) = match plan_id {
        Ok(path) => path,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };

    match plan_usecase.delete_plan(&auth.requester(), plan_id).await {
        Ok(()) => success_response(StatusCode::OK, "Plan deleted", plan_id),
        Err(err) => err.into_response(),
    }
}
