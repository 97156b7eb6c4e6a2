use anyhow::Result;
use uuid::Uuid;

use crate::domain::value_objects::{
    enums::roles::Role,
    iam::{AccessClaims, IssuedToken},
};

/// One-way hashing for passwords and reset codes.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, secret: &str) -> Result<String>;
    fn verify(&self, secret: &str, hash: &str) -> Result<bool>;
}

#[cfg_attr(test, mockall::automock)]
pub trait TokenSigner: Send + Sync {
    fn issue(&self, user_id: Uuid, role: Role, session_id: Uuid) -> Result<IssuedToken>;
    /// Checks signature and expiry.
    fn verify(&self, token: &str) -> Result<AccessClaims>;
}
