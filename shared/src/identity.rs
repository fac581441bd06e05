use async_trait::async_trait;
use thiserror::Error;

use crate::types::{AuthTokens, Identity, UserAttributes};

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("user already exists")]
    AlreadyExists,
    /// Unknown user or wrong password; callers must not tell the two apart.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("identity provider failure: {0}")]
    Other(String),
}

/// User registration, password sign-in and token verification.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_user(
        &self,
        username: &str,
        password: &str,
        attributes: &UserAttributes,
    ) -> Result<(), IdentityError>;

    async fn authenticate(&self, username: &str, password: &str)
        -> Result<AuthTokens, IdentityError>;

    /// Check an access token's signature, expiry and revocation with the provider.
    async fn verify_token(&self, token: &str) -> Result<Identity, IdentityError>;
}
