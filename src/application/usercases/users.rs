use std::sync::Arc;

use axum::http::StatusCode;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    repositories::users::UserRepository,
    value_objects::{iam::Requester, users::UserDto},
};

#[derive(Debug, Error)]
pub enum UserError {
    #[error("user not found")]
    NotFound,
    #[error("access denied")]
    Forbidden,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl UserError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UserError::NotFound => StatusCode::NOT_FOUND,
            UserError::Forbidden => StatusCode::FORBIDDEN,
            UserError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            UserError::NotFound => "not_found",
            UserError::Forbidden => "forbidden",
            UserError::Internal(_) => "internal",
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, UserError>;

pub struct UserUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
}

impl<U> UserUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    /// Users may read their own profile; admins any profile.
    pub async fn get_user(&self, requester: &Requester, user_id: Uuid) -> UseCaseResult<UserDto> {
        if !requester.can_act_for(user_id) {
            warn!(
                %user_id,
                requester_id = %requester.user_id,
                "users: access to another user's profile denied"
            );
            return Err(UserError::Forbidden);
        }

        self.user_repo
            .find_by_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "users: failed to load user");
                UserError::Internal(err)
            })?
            .map(UserDto::from)
            .ok_or(UserError::NotFound)
    }

    pub async fn list_users(&self, requester: &Requester) -> UseCaseResult<Vec<UserDto>> {
        Self::ensure_admin(requester)?;

        let users = self.user_repo.list_users().await.map_err(|err| {
            error!(db_error = ?err, "users: failed to list users");
            UserError::Internal(err)
        })?;

        Ok(users.into_iter().map(UserDto::from).collect())
    }

    /// Subscriptions of a deleted user stay in the ledger for revenue history.
    pub async fn delete_user(&self, requester: &Requester, user_id: Uuid) -> UseCaseResult<()> {
        Self::ensure_admin(requester)?;

        let deleted = self.user_repo.delete_user(user_id).await.map_err(|err| {
            error!(%user_id, db_error = ?err, "users: failed to delete user");
            UserError::Internal(err)
        })?;

        if !deleted {
            return Err(UserError::NotFound);
        }

        info!(%user_id, requester_id = %requester.user_id, "users: user deleted");
        Ok(())
    }

    fn ensure_admin(requester: &Requester) -> UseCaseResult<()> {
        if !requester.is_admin() {
            warn!(requester_id = %requester.user_id, "users: admin role required");
            return Err(UserError::Forbidden);
        }
        Ok(())
    }
}
