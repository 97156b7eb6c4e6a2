use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::users::{RegisterUserEntity, UserEntity},
    value_objects::enums::roles::Role,
};

const PASSWORD_SPECIALS: &str = "@$!%*?&";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegisterUserModel {
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub age: i32,
}

impl RegisterUserModel {
    pub fn validate(&self) -> Result<(), String> {
        let name_len = self.user_name.trim().chars().count();
        if !(3..=50).contains(&name_len) {
            return Err("user_name must be between 3 and 50 characters".to_string());
        }
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        if !(1..=120).contains(&self.age) {
            return Err("age must be between 1 and 120".to_string());
        }
        Ok(())
    }

    /// Every signup is a plain user; admins are promoted in the database.
    pub fn to_entity(&self, password_hash: String) -> RegisterUserEntity {
        let now = Utc::now();
        RegisterUserEntity {
            id: Uuid::new_v4(),
            user_name: self.user_name.trim().to_string(),
            email: normalize_email(&self.email),
            password_hash,
            age: self.age,
            role: Role::User.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginModel {
    pub email: String,
    pub password: String,
    /// Ends a session held elsewhere instead of refusing the login.
    #[serde(default)]
    pub logout_from_other_device: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForgotPasswordModel {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResetPasswordModel {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserDto {
    pub user_id: Uuid,
    pub user_name: String,
    pub email: String,
    pub age: i32,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntity> for UserDto {
    fn from(value: UserEntity) -> Self {
        Self {
            user_id: value.id,
            user_name: value.user_name,
            email: value.email,
            age: value.age,
            role: value.role,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginDto {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserDto,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegisterOutcome {
    Created(UserEntity),
    EmailTaken,
}

/// Result of claiming the single login session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Started(UserEntity),
    /// Another live session exists and replacement was not requested.
    AlreadyActive,
    NotFound,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

pub fn validate_email(email: &str) -> Result<(), String> {
    let email = email.trim();
    let invalid = || Err("email must be a valid email address".to_string());

    let Some((local, domain)) = email.split_once('@') else {
        return invalid();
    };
    if local.is_empty()
        || domain.is_empty()
        || domain.contains('@')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || domain.contains("..")
        || email.chars().any(char::is_whitespace)
    {
        return invalid();
    }
    Ok(())
}

/// 8 to 20 characters from letters, digits and `@$!%*?&`, with at least one of each class.
pub fn validate_password(password: &str) -> Result<(), String> {
    let len = password.chars().count();
    if !(8..=20).contains(&len) {
        return Err("password must be between 8 and 20 characters".to_string());
    }
    if password
        .chars()
        .any(|c| !c.is_ascii_alphanumeric() && !PASSWORD_SPECIALS.contains(c))
    {
        return Err(format!(
            "password may only contain letters, digits and {PASSWORD_SPECIALS}"
        ));
    }

    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIALS.contains(c));
    if !(has_lower && has_upper && has_digit && has_special) {
        return Err(format!(
            "password must contain an uppercase letter, a lowercase letter, a number and one of {PASSWORD_SPECIALS}"
        ));
    }
    Ok(())
}
