use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use uuid::Uuid;

use crate::{
    application::usercases::users::UserUseCase,
    domain::repositories::users::UserRepository,
    infrastructure::{
        axum_http::{
            auth::AuthUser,
            error_responses::{rejection_response, success_response},
        },
        postgres::{postgres_connection::PgPoolSquad, repositories::users::UserPostgres},
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let user_usecase = UserUseCase::new(Arc::new(user_repository));

    Router::new()
        .route("/", get(list_users))
        .route("/:user_id", get(get_user).delete(delete_user))
        .with_state(Arc::new(user_usecase))
}

pub async fn list_users<U>(
    State(user_usecase): State<Arc<UserUseCase<U>>>,
    auth: AuthUser,
) -> Response
where
    U: UserRepository + Send + Sync + 'static,
{
    match user_usecase.list_users(&auth.requester()).await {
        Ok(users) => success_response(StatusCode::OK, "Users fetched", users),
        Err(err) => err.into_response(),
    }
}

pub async fn get_user<U>(
    State(user_usecase): State<Arc<UserUseCase<U>>>,
    auth: AuthUser,
    user_id: Result<Path<Uuid>, PathRejection>,
) -> Response
where
    U: UserRepository + Send + Sync + 'static,
{
    let Path(user_id) = match user_id {
        Ok(path) => path,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };

    match user_usecase.get_user(&auth.requester(), user_id).await {
        Ok(user) => success_response(StatusCode::OK, "User found", user),
        Err(err) => err.into_response(),
    }
}

pub async fn delete_user<U>(
    State(user_usecase): State<Arc<UserUseCase<U>>>,
    auth: AuthUser,
    user_id: Result<Path<Uuid>, PathRejection>,
) -> Response
where
    U: UserRepository + Send + Sync + 'static,
{
    let Path(user_id) = match user_id {
        Ok(path) => path,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };

    match user_usecase.delete_user(&auth.requester(), user_id).await {
        Ok(()) => success_response(StatusCode::OK, "User deleted successfully", user_id),
        Err(err) => err.into_response(),
    }
}
