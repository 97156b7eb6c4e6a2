use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::users::{
        PasswordChangeEntity, RegisterUserEntity, ResetOtpChangeEntity, SessionChangeEntity,
        UserEntity,
    },
    value_objects::users::{RegisterOutcome, SessionOutcome},
};

#[async_trait]
#[automock]
pub trait UserRepository {
    /// Inserts the account unless the email is already registered.
    async fn register(&self, register_user_entity: RegisterUserEntity) -> Result<RegisterOutcome>;

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>>;

    async fn find_by_email(&self, email: String) -> Result<Option<UserEntity>>;

    async fn list_users(&self) -> Result<Vec<UserEntity>>;

    /// Claims the login session. The live-session check and the write are one atomic unit.
    async fn start_session(
        &self,
        user_id: Uuid,
        session: SessionChangeEntity,
        replace_existing: bool,
    ) -> Result<SessionOutcome>;

    async fn end_session(&self, user_id: Uuid) -> Result<bool>;

    async fn store_reset_otp(
        &self,
        user_id: Uuid,
        reset_otp_change_entity: ResetOtpChangeEntity,
    ) -> Result<bool>;

    async fn change_password(
        &self,
        user_id: Uuid,
        password_change_entity: PasswordChangeEntity,
    ) -> Result<bool>;

    async fn delete_user(&self, user_id: Uuid) -> Result<bool>;
}
