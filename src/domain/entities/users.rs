use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::users;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = users)]
pub struct UserEntity {
    pub id: Uuid,
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
    pub age: i32,
    pub role: String,
    pub session_id: Option<Uuid>,
    pub session_expires_at: Option<DateTime<Utc>>,
    pub reset_otp_hash: Option<String>,
    pub reset_otp_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserEntity {
    /// A session blocks new logins until it is cleared or its token expires.
    pub fn has_live_session(&self, now: DateTime<Utc>) -> bool {
        self.session_id.is_some() && self.session_expires_at.is_some_and(|at| at > now)
    }

    pub fn holds_session(&self, session_id: Uuid, now: DateTime<Utc>) -> bool {
        self.session_id == Some(session_id) && self.has_live_session(now)
    }
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = users)]
pub struct RegisterUserEntity {
    pub id: Uuid,
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
    pub age: i32,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Starts (`Some`) or ends (`None`) the single login session.
#[derive(Debug, Clone, PartialEq, AsChangeset)]
#[diesel(table_name = users, treat_none_as_null = true)]
pub struct SessionChangeEntity {
    pub session_id: Option<Uuid>,
    pub session_expires_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, AsChangeset)]
#[diesel(table_name = users, treat_none_as_null = true)]
pub struct ResetOtpChangeEntity {
    pub reset_otp_hash: Option<String>,
    pub reset_otp_expires_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// New password; consumes the reset code and ends any session.
#[derive(Debug, Clone, PartialEq, AsChangeset)]
#[diesel(table_name = users, treat_none_as_null = true)]
pub struct PasswordChangeEntity {
    pub password_hash: String,
    pub reset_otp_hash: Option<String>,
    pub reset_otp_expires_at: Option<DateTime<Utc>>,
    pub session_id: Option<Uuid>,
    pub session_expires_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}
