use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{
    prelude::*,
    result::{DatabaseErrorKind, Error as DieselError},
};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::{
        entities::users::{
            PasswordChangeEntity, RegisterUserEntity, ResetOtpChangeEntity, SessionChangeEntity,
            UserEntity,
        },
        repositories::users::UserRepository,
        value_objects::users::{RegisterOutcome, SessionOutcome},
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::users},
};

pub struct UserPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl UserPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UserRepository for UserPostgres {
    async fn register(&self, register_user_entity: RegisterUserEntity) -> Result<RegisterOutcome> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<RegisterOutcome> {
            let mut conn = db_pool.get()?;

            let result = diesel::insert_into(users::table)
                .values(&register_user_entity)
                .returning(UserEntity::as_returning())
                .get_result::<UserEntity>(&mut conn);

            match result {
                Ok(user) => Ok(RegisterOutcome::Created(user)),
                // users_email_key
                Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                    Ok(RegisterOutcome::EmailTaken)
                }
                Err(err) => Err(err.into()),
            }
        })
        .await??)
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<UserEntity>> {
            let mut conn = db_pool.get()?;

            let user = users::table
                .find(user_id)
                .select(UserEntity::as_select())
                .first::<UserEntity>(&mut conn)
                .optional()?;

            Ok(user)
        })
        .await??)
    }

    async fn find_by_email(&self, email: String) -> Result<Option<UserEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<UserEntity>> {
            let mut conn = db_pool.get()?;

            let user = users::table
                .filter(users::email.eq(email))
                .select(UserEntity::as_select())
                .first::<UserEntity>(&mut conn)
                .optional()?;

            Ok(user)
        })
        .await??)
    }

    async fn list_users(&self) -> Result<Vec<UserEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<UserEntity>> {
            let mut conn = db_pool.get()?;

            let users = users::table
                .select(UserEntity::as_select())
                .order(users::created_at.asc())
                .load::<UserEntity>(&mut conn)?;

            Ok(users)
        })
        .await??)
    }

    async fn start_session(
        &self,
        user_id: Uuid,
        session: SessionChangeEntity,
        replace_existing: bool,
    ) -> Result<SessionOutcome> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<SessionOutcome> {
            let mut conn = db_pool.get()?;

            let outcome = conn.transaction::<SessionOutcome, DieselError, _>(|conn| {
                let current = users::table
                    .find(user_id)
                    .select(UserEntity::as_select())
                    .for_update()
                    .first::<UserEntity>(conn)
                    .optional()?;

                let Some(current) = current else {
                    return Ok(SessionOutcome::NotFound);
                };

                if !replace_existing && current.has_live_session(Utc::now()) {
                    return Ok(SessionOutcome::AlreadyActive);
                }

                let user = diesel::update(users::table.find(user_id))
                    .set(&session)
                    .returning(UserEntity::as_returning())
                    .get_result::<UserEntity>(conn)?;

                Ok(SessionOutcome::Started(user))
            })?;

            Ok(outcome)
        })
        .await??)
    }

    async fn end_session(&self, user_id: Uuid) -> Result<bool> {
        let db_pool = Arc::clone(&self.db_pool);
        let cleared = SessionChangeEntity {
            session_id: None,
            session_expires_at: None,
            updated_at: Utc::now(),
        };

        Ok(task::spawn_blocking(move || -> Result<bool> {
            let mut conn = db_pool.get()?;

            let updated = diesel::update(users::table.find(user_id))
                .set(&cleared)
                .execute(&mut conn)?;

            Ok(updated > 0)
        })
        .await??)
    }

    async fn store_reset_otp(
        &self,
        user_id: Uuid,
        reset_otp_change_entity: ResetOtpChangeEntity,
    ) -> Result<bool> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<bool> {
            let mut conn = db_pool.get()?;

            let updated = diesel::update(users::table.find(user_id))
                .set(&reset_otp_change_entity)
                .execute(&mut conn)?;

            Ok(updated > 0)
        })
        .await??)
    }

    async fn change_password(
        &self,
        user_id: Uuid,
        password_change_entity: PasswordChangeEntity,
    ) -> Result<bool> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<bool> {
            let mut conn = db_pool.get()?;

            let updated = diesel::update(users::table.find(user_id))
                .set(&password_change_entity)
                .execute(&mut conn)?;

            Ok(updated > 0)
        })
        .await??)
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<bool> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<bool> {
            let mut conn = db_pool.get()?;

            let deleted = diesel::delete(users::table.find(user_id)).execute(&mut conn)?;

            Ok(deleted > 0)
        })
        .await??)
    }
}
