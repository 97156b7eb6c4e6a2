use anyhow::{Result, anyhow};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::{
    application::interfaces::security::TokenSigner,
    config::config_model::Auth,
    domain::value_objects::{
        enums::roles::Role,
        iam::{AccessClaims, IssuedToken},
    },
};

/// HS256 access tokens signed with the configured secret.
pub struct JwtTokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl JwtTokenSigner {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn from_config(auth: &Auth) -> Self {
        Self::new(&auth.jwt_secret, Duration::hours(auth.token_ttl_hours))
    }
}

impl TokenSigner for JwtTokenSigner {
    fn issue(&self, user_id: Uuid, role: Role, session_id: Uuid) -> Result<IssuedToken> {
        let expires_at = Utc::now() + self.ttl;
        let claims = AccessClaims {
            sub: user_id.to_string(),
            role: role.to_string(),
            sid: session_id.to_string(),
            exp: usize::try_from(expires_at.timestamp())?,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        Ok(IssuedToken { token, expires_at })
    }

    fn verify(&self, token: &str) -> Result<AccessClaims> {
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| anyhow!("JWT validation failed: {}", e))?;

        Ok(token_data.claims)
    }
}
