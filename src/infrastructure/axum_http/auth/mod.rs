use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::{error, warn};
use uuid::Uuid;

use crate::{
    application::interfaces::security::TokenSigner,
    domain::{
        repositories::users::UserRepository,
        value_objects::{enums::roles::Role, iam::Requester},
    },
    infrastructure::axum_http::error_responses::error_response,
};

/// Verifies bearer tokens against the signing key and the user's current session.
/// Installed once as a request extension by the server.
#[derive(Clone)]
pub struct AccessGuard {
    tokens: Arc<dyn TokenSigner>,
    sessions: Arc<dyn UserRepository + Send + Sync>,
}

impl AccessGuard {
    pub fn new(
        tokens: Arc<dyn TokenSigner>,
        sessions: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self { tokens, sessions }
    }

    pub async fn authenticate(&self, token: &str) -> Result<AuthUser, AuthError> {
        let claims = self
            .tokens
            .verify(token)
            .map_err(|err| AuthError::Unauthorized(err.to_string()))?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::Unauthorized("Invalid user ID in token".to_string()))?;
        let session_id = Uuid::parse_str(&claims.sid)
            .map_err(|_| AuthError::Unauthorized("Invalid session in token".to_string()))?;

        let user = self
            .sessions
            .find_by_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "auth: failed to load session owner");
                AuthError::Unavailable
            })?
            .ok_or_else(|| AuthError::Unauthorized("User no longer exists".to_string()))?;

        if !user.holds_session(session_id, Utc::now()) {
            return Err(AuthError::Unauthorized(
                "Token mismatch. Please log in again".to_string(),
            ));
        }

        let role = Role::from_str(&user.role)
            .ok_or_else(|| AuthError::Unauthorized("Invalid role".to_string()))?;

        Ok(AuthUser {
            user_id,
            role,
            session_id,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
    pub session_id: Uuid,
}

impl AuthUser {
    pub fn requester(&self) -> Requester {
        Requester::new(self.user_id, self.role)
    }
}

#[derive(Debug, PartialEq)]
pub enum AuthError {
    Unauthorized(String),
    /// The guard is missing or the session store failed.
    Unavailable,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::Unauthorized(message) => {
                error_response(StatusCode::UNAUTHORIZED, "unauthorized", message)
            }
            AuthError::Unavailable => error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "Internal server error".to_string(),
            ),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| AuthError::Unauthorized("Missing Authorization header".to_string()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AuthError::Unauthorized("Invalid Authorization header".to_string()))?;

        let token = auth_str.strip_prefix("Bearer ").ok_or_else(|| {
            AuthError::Unauthorized("Invalid Authorization header format".to_string())
        })?;

        let guard = parts.extensions.get::<AccessGuard>().cloned().ok_or_else(|| {
            error!("auth: access guard extension is not installed");
            AuthError::Unavailable
        })?;

        guard.authenticate(token).await.inspect_err(|err| {
            if let AuthError::Unauthorized(reason) = err {
                warn!(%reason, "auth: access token rejected");
            }
        })
    }
}
