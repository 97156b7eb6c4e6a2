use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};

use crate::{
    application::{
        interfaces::{
            notifications::OtpSender,
            security::{PasswordHasher, TokenSigner},
        },
        usercases::accounts::AccountUseCase,
    },
    domain::{
        repositories::users::UserRepository,
        value_objects::users::{
            ForgotPasswordModel, LoginModel, RegisterUserModel, ResetPasswordModel,
        },
    },
    infrastructure::{
        axum_http::{
            auth::AuthUser,
            error_responses::{rejection_response, success_response},
        },
        postgres::{postgres_connection::PgPoolSquad, repositories::users::UserPostgres},
        security::{argon2_hasher::Argon2Hasher, jwt_tokens::JwtTokenSigner},
    },
    notifications::ConfiguredOtpSender,
};

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    token_signer: Arc<JwtTokenSigner>,
    otp_sender: Arc<ConfiguredOtpSender>,
) -> Router {
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let account_usecase = AccountUseCase::new(
        Arc::new(user_repository),
        Arc::new(Argon2Hasher::new()),
        token_signer,
        otp_sender,
    );

    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .with_state(Arc::new(account_usecase))
}

fn json_rejection(rejection: JsonRejection) -> Response {
    rejection_response(rejection.status(), rejection.body_text())
}

pub async fn signup<U, H, T, O>(
    State(account_usecase): State<Arc<AccountUseCase<U, H, T, O>>>,
    payload: Result<Json<RegisterUserModel>, JsonRejection>,
) -> Response
where
    U: UserRepository + Send + Sync + 'static,
    H: PasswordHasher + 'static,
    T: TokenSigner + 'static,
    O: OtpSender + 'static,
{
    let Json(register_user_model) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return json_rejection(rejection),
    };

    match account_usecase.signup(register_user_model).await {
        Ok(user) => success_response(StatusCode::CREATED, "User created successfully", user),
        Err(err) => err.into_response(),
    }
}

pub async fn login<U, H, T, O>(
    State(account_usecase): State<Arc<AccountUseCase<U, H, T, O>>>,
    payload: Result<Json<LoginModel>, JsonRejection>,
) -> Response
where
    U: UserRepository + Send + Sync + 'static,
    H: PasswordHasher + 'static,
    T: TokenSigner + 'static,
    O: OtpSender + 'static,
{
    let Json(login_model) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return json_rejection(rejection),
    };

    match account_usecase.login(login_model).await {
        Ok(login) => success_response(StatusCode::OK, "Login successful", login),
        Err(err) => err.into_response(),
    }
}

pub async fn logout<U, H, T, O>(
    State(account_usecase): State<Arc<AccountUseCase<U, H, T, O>>>,
    auth: AuthUser,
) -> Response
where
    U: UserRepository + Send + Sync + 'static,
    H: PasswordHasher + 'static,
    T: TokenSigner + 'static,
    O: OtpSender + 'static,
{
    match account_usecase.logout(&auth.requester()).await {
        Ok(()) => success_response(StatusCode::OK, "Logout successful", auth.user_id),
        Err(err) => err.into_response(),
    }
}

pub async fn forgot_password<U, H, T, O>(
    State(account_usecase): State<Arc<AccountUseCase<U, H, T, O>>>,
    payload: Result<Json<ForgotPasswordModel>, JsonRejection>,
) -> Response
where
    U: UserRepository + Send + Sync + 'static,
    H: PasswordHasher + 'static,
    T: TokenSigner + 'static,
    O: OtpSender + 'static,
{
    let Json(forgot_password_model) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return json_rejection(rejection),
    };

    match account_usecase.forgot_password(forgot_password_model).await {
        Ok(()) => success_response(StatusCode::OK, "OTP sent to your email", ()),
        Err(err) => err.into_response(),
    }
}

pub async fn reset_password<U, H, T, O>(
    State(account_usecase): State<Arc<AccountUseCase<U, H, T, O>>>,
    payload: Result<Json<ResetPasswordModel>, JsonRejection>,
) -> Response
where
    U: UserRepository + Send + Sync + 'static,
    H: PasswordHasher + 'static,
    T: TokenSigner + 'static,
    O: OtpSender + 'static,
{
    let Json(reset_password_model) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return json_rejection(rejection),
    };

    match account_usecase.reset_password(reset_password_model).await {
        Ok(()) => success_response(StatusCode::OK, "Password reset successfully", ()),
        Err(err) => err.into_response(),
    }
}
