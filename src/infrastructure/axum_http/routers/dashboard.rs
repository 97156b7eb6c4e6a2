use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::{
    application::usercases::dashboard::DashboardUseCase,
    domain::repositories::dashboard::DashboardRepository,
    infrastructure::{
        axum_http::{auth::AuthUser, error_responses::success_response},
        postgres::{
            postgres_connection::PgPoolSquad, repositories::dashboard::DashboardPostgres,
        },
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let dashboard_repository = DashboardPostgres::new(Arc::clone(&db_pool));
    let dashboard_usecase = DashboardUseCase::new(Arc::new(dashboard_repository));

    Router::new()
        .route("/", get(summary))
        .with_state(Arc::new(dashboard_usecase))
}

pub async fn summary<T>(
    State(dashboard_usecase): State<Arc<DashboardUseCase<T>>>,
    auth: AuthUser,
) -> Response
where
    T: DashboardRepository + Send + Sync + 'static,
{
    match dashboard_usecase.summary(&auth.requester()).await {
        Ok(summary) => success_response(StatusCode::OK, "Dashboard summary", summary),
        Err(err) => err.into_response(),
    }
}
