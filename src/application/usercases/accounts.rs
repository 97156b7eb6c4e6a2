use std::sync::Arc;

use anyhow::anyhow;
use axum::http::StatusCode;
use chrono::{Duration, Utc};
use rand::Rng;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    application::interfaces::{
        notifications::OtpSender,
        security::{PasswordHasher, TokenSigner},
    },
    domain::{
        entities::users::{
            PasswordChangeEntity, ResetOtpChangeEntity, SessionChangeEntity, UserEntity,
        },
        repositories::users::UserRepository,
        value_objects::{
            enums::roles::Role,
            iam::Requester,
            users::{
                ForgotPasswordModel, LoginDto, LoginModel, RegisterOutcome, RegisterUserModel,
                ResetPasswordModel, SessionOutcome, UserDto, normalize_email, validate_password,
            },
        },
    },
};

pub const OTP_VALID_MINUTES: i64 = 10;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Email already in use")]
    EmailTaken,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error(
        "User is already logged in on another device. Log out there or retry with logout_from_other_device"
    )]
    AlreadyLoggedIn,
    #[error("user not found")]
    UserNotFound,
    #[error("OTP has expired. Please request a new one")]
    OtpExpired,
    #[error("Invalid OTP")]
    InvalidOtp,
    #[error("{0}")]
    Validation(String),
    #[error("failed to deliver the reset code")]
    Delivery(#[source] anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AccountError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AccountError::EmailTaken | AccountError::AlreadyLoggedIn => StatusCode::CONFLICT,
            AccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AccountError::UserNotFound => StatusCode::NOT_FOUND,
            AccountError::OtpExpired
            | AccountError::InvalidOtp
            | AccountError::Validation(_) => StatusCode::BAD_REQUEST,
            AccountError::Delivery(_) => StatusCode::BAD_GATEWAY,
            AccountError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AccountError::EmailTaken | AccountError::AlreadyLoggedIn => "conflict",
            AccountError::InvalidCredentials => "unauthorized",
            AccountError::UserNotFound => "not_found",
            AccountError::OtpExpired
            | AccountError::InvalidOtp
            | AccountError::Validation(_) => "validation_failure",
            AccountError::Delivery(_) => "upstream_failure",
            AccountError::Internal(_) => "internal",
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, AccountError>;

/// Registration, single-session login and OTP password reset.
pub struct AccountUseCase<U, H, T, O>
where
    U: UserRepository + Send + Sync + 'static,
    H: PasswordHasher + 'static,
    T: TokenSigner + 'static,
    O: OtpSender + 'static,
{
    user_repo: Arc<U>,
    password_hasher: Arc<H>,
    token_signer: Arc<T>,
    otp_sender: Arc<O>,
}

impl<U, H, T, O> AccountUseCase<U, H, T, O>
where
    U: UserRepository + Send + Sync + 'static,
    H: PasswordHasher + 'static,
    T: TokenSigner + 'static,
    O: OtpSender + 'static,
{
    pub fn new(
        user_repo: Arc<U>,
        password_hasher: Arc<H>,
        token_signer: Arc<T>,
        otp_sender: Arc<O>,
    ) -> Self {
        Self {
            user_repo,
            password_hasher,
            token_signer,
            otp_sender,
        }
    }

    pub async fn signup(&self, model: RegisterUserModel) -> UseCaseResult<UserDto> {
        model.validate().map_err(AccountError::Validation)?;

        let password_hash = self.password_hasher.hash(&model.password).map_err(|err| {
            error!(error = ?err, "accounts: password hashing failed");
            AccountError::Internal(err)
        })?;
        let register_user_entity = model.to_entity(password_hash);
        let email = register_user_entity.email.clone();

        let outcome = self
            .user_repo
            .register(register_user_entity)
            .await
            .map_err(|err| {
                error!(%email, db_error = ?err, "accounts: failed to register user");
                AccountError::Internal(err)
            })?;

        match outcome {
            RegisterOutcome::Created(user) => {
                info!(user_id = %user.id, %email, "accounts: user registered");
                Ok(user.into())
            }
            RegisterOutcome::EmailTaken => {
                warn!(%email, "accounts: email already registered");
                Err(AccountError::EmailTaken)
            }
        }
    }

    /// Issues a token bound to a fresh session. A live session elsewhere blocks the login
    /// unless the caller asks to replace it.
    pub async fn login(&self, model: LoginModel) -> UseCaseResult<LoginDto> {
        let email = normalize_email(&model.email);

        let user = self
            .load_by_email(&email)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        if !self.verify_secret(&model.password, &user.password_hash)? {
            warn!(user_id = %user.id, "accounts: login with wrong password");
            return Err(AccountError::InvalidCredentials);
        }

        let role = Role::from_str(&user.role)
            .ok_or_else(|| AccountError::Internal(anyhow!("unknown role {:?}", user.role)))?;
        let session_id = Uuid::new_v4();
        let issued = self
            .token_signer
            .issue(user.id, role, session_id)
            .map_err(|err| {
                error!(user_id = %user.id, error = ?err, "accounts: token signing failed");
                AccountError::Internal(err)
            })?;

        let session = SessionChangeEntity {
            session_id: Some(session_id),
            session_expires_at: Some(issued.expires_at),
            updated_at: Utc::now(),
        };
        let outcome = self
            .user_repo
            .start_session(user.id, session, model.logout_from_other_device)
            .await
            .map_err(|err| {
                error!(user_id = %user.id, db_error = ?err, "accounts: failed to start session");
                AccountError::Internal(err)
            })?;

        match outcome {
            SessionOutcome::Started(user) => {
                info!(
                    user_id = %user.id,
                    %session_id,
                    replaced = model.logout_from_other_device,
                    "accounts: user logged in"
                );
                Ok(LoginDto {
                    token: issued.token,
                    expires_at: issued.expires_at,
                    user: user.into(),
                })
            }
            SessionOutcome::AlreadyActive => {
                warn!(user_id = %user.id, "accounts: login refused, session active elsewhere");
                Err(AccountError::AlreadyLoggedIn)
            }
            SessionOutcome::NotFound => Err(AccountError::InvalidCredentials),
        }
    }

    pub async fn logout(&self, requester: &Requester) -> UseCaseResult<()> {
        let user_id = requester.user_id;

        let ended = self.user_repo.end_session(user_id).await.map_err(|err| {
            error!(%user_id, db_error = ?err, "accounts: failed to end session");
            AccountError::Internal(err)
        })?;

        if !ended {
            return Err(AccountError::UserNotFound);
        }

        info!(%user_id, "accounts: user logged out");
        Ok(())
    }

    pub async fn forgot_password(&self, model: ForgotPasswordModel) -> UseCaseResult<()> {
        let email = normalize_email(&model.email);

        let user = self.load_by_email(&email).await?.ok_or_else(|| {
            warn!(%email, "accounts: reset requested for unknown email");
            AccountError::UserNotFound
        })?;

        let otp = generate_otp();
        let otp_hash = self.password_hasher.hash(&otp).map_err(|err| {
            error!(error = ?err, "accounts: reset code hashing failed");
            AccountError::Internal(err)
        })?;

        let now = Utc::now();
        let reset_otp_change_entity = ResetOtpChangeEntity {
            reset_otp_hash: Some(otp_hash),
            reset_otp_expires_at: Some(now + Duration::minutes(OTP_VALID_MINUTES)),
            updated_at: now,
        };
        let stored = self
            .user_repo
            .store_reset_otp(user.id, reset_otp_change_entity)
            .await
            .map_err(|err| {
                error!(user_id = %user.id, db_error = ?err, "accounts: failed to store reset code");
                AccountError::Internal(err)
            })?;
        if !stored {
            return Err(AccountError::UserNotFound);
        }

        self.otp_sender
            .send_reset_otp(&user.email, &otp, OTP_VALID_MINUTES)
            .await
            .map_err(|err| {
                error!(user_id = %user.id, error = ?err, "accounts: reset code delivery failed");
                AccountError::Delivery(err)
            })?;

        info!(user_id = %user.id, "accounts: reset code issued");
        Ok(())
    }

    /// Consumes the reset code, stores the new password and ends any session.
    pub async fn reset_password(&self, model: ResetPasswordModel) -> UseCaseResult<()> {
        validate_password(&model.new_password).map_err(AccountError::Validation)?;
        let email = normalize_email(&model.email);

        let user = self
            .load_by_email(&email)
            .await?
            .ok_or(AccountError::UserNotFound)?;

        let (Some(otp_hash), Some(expires_at)) =
            (user.reset_otp_hash.as_deref(), user.reset_otp_expires_at)
        else {
            warn!(user_id = %user.id, "accounts: reset attempted without a pending code");
            return Err(AccountError::InvalidOtp);
        };

        if expires_at <= Utc::now() {
            warn!(user_id = %user.id, "accounts: reset code expired");
            return Err(AccountError::OtpExpired);
        }
        if !self.verify_secret(model.otp.trim(), otp_hash)? {
            warn!(user_id = %user.id, "accounts: reset code mismatch");
            return Err(AccountError::InvalidOtp);
        }

        let password_hash = self
            .password_hasher
            .hash(&model.new_password)
            .map_err(|err| {
                error!(error = ?err, "accounts: password hashing failed");
                AccountError::Internal(err)
            })?;

        let password_change_entity = PasswordChangeEntity {
            password_hash,
            reset_otp_hash: None,
            reset_otp_expires_at: None,
            session_id: None,
            session_expires_at: None,
            updated_at: Utc::now(),
        };
        let changed = self
            .user_repo
            .change_password(user.id, password_change_entity)
            .await
            .map_err(|err| {
                error!(user_id = %user.id, db_error = ?err, "accounts: failed to change password");
                AccountError::Internal(err)
            })?;
        if !changed {
            return Err(AccountError::UserNotFound);
        }

        info!(user_id = %user.id, "accounts: password reset");
        Ok(())
    }

    async fn load_by_email(&self, email: &str) -> UseCaseResult<Option<UserEntity>> {
        self.user_repo
            .find_by_email(email.to_string())
            .await
            .map_err(|err| {
                error!(%email, db_error = ?err, "accounts: failed to load user");
                AccountError::Internal(err)
            })
    }

    fn verify_secret(&self, secret: &str, hash: &str) -> UseCaseResult<bool> {
        self.password_hasher.verify(secret, hash).map_err(|err| {
            error!(error = ?err, "accounts: hash verification failed");
            AccountError::Internal(err)
        })
    }
}

/// Six decimal digits, never starting with zero.
fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}
