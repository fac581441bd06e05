use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::{
    operation::{
        get_user::GetUserError, initiate_auth::InitiateAuthError, sign_up::SignUpError,
    },
    types::{AttributeType, AuthFlowType},
    Client as CognitoClient,
};
use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use lambda_http::http::HeaderMap;
use sha2::Sha256;

use crate::identity::{IdentityError, IdentityProvider};
use crate::types::{AuthTokens, Identity, UserAttributes};

type HmacSha256 = Hmac<Sha256>;

/// Compute the SECRET_HASH Cognito expects when the app client has a secret
fn compute_secret_hash(username: &str, client_id: &str, client_secret: &str) -> String {
    let message = format!("{}{}", username, client_id);
    let mut mac = HmacSha256::new_from_slice(client_secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

/// Short, non-reversible reference to a username for log lines.
fn user_ref(username: &str) -> String {
    use sha2::Digest;

    Sha256::digest(username.as_bytes())[..8]
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get("Authorization")?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Cognito user pool backed [`IdentityProvider`].
pub struct CognitoIdentityProvider {
    client: CognitoClient,
    user_pool_id: String,
    client_id: String,
    client_secret: Option<String>,
}

impl CognitoIdentityProvider {
    pub fn new(
        client: CognitoClient,
        user_pool_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: Option<String>,
    ) -> Self {
        Self {
            client,
            user_pool_id: user_pool_id.into(),
            client_id: client_id.into(),
            client_secret,
        }
    }

    fn secret_hash(&self, username: &str) -> Option<String> {
        self.client_secret
            .as_deref()
            .map(|secret| compute_secret_hash(username, &self.client_id, secret))
    }
}

fn attribute(name: &str, value: &str) -> Result<AttributeType, IdentityError> {
    AttributeType::builder()
        .name(name)
        .value(value)
        .build()
        .map_err(|e| IdentityError::Other(e.to_string()))
}

#[async_trait]
impl IdentityProvider for CognitoIdentityProvider {
    async fn create_user(
        &self,
        username: &str,
        password: &str,
        attributes: &UserAttributes,
    ) -> Result<(), IdentityError> {
        let result = self
            .client
            .sign_up()
            .client_id(&self.client_id)
            .username(username)
            .password(password)
            .set_secret_hash(self.secret_hash(username))
            .user_attributes(attribute("given_name", &attributes.given_name)?)
            .user_attributes(attribute("family_name", &attributes.family_name)?)
            .user_attributes(attribute("email", &attributes.email)?)
            .send()
            .await;

        if let Err(e) = result {
            tracing::error!("Cognito signup error: {:?}", e);
            return Err(match e.as_service_error() {
                Some(SignUpError::UsernameExistsException(_)) => IdentityError::AlreadyExists,
                _ => IdentityError::Other(e.to_string()),
            });
        }

        // Confirm straight away so the account can sign in without an email round-trip
        if let Err(e) = self
            .client
            .admin_confirm_sign_up()
            .user_pool_id(&self.user_pool_id)
            .username(username)
            .send()
            .await
        {
            // Signup still succeeds; the account stays UNCONFIRMED until an operator acts
            tracing::error!(
                user = %user_ref(username),
                user_pool_id = %self.user_pool_id,
                "Failed to auto-confirm user: {:?}",
                e
            );
        } else {
            tracing::info!(user = %user_ref(username), "User registered and confirmed");
        }

        Ok(())
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthTokens, IdentityError> {
        let mut request = self
            .client
            .initiate_auth()
            .auth_flow(AuthFlowType::UserPasswordAuth)
            .client_id(&self.client_id)
            .auth_parameters("USERNAME", username)
            .auth_parameters("PASSWORD", password);
        if let Some(secret_hash) = self.secret_hash(username) {
            request = request.auth_parameters("SECRET_HASH", secret_hash);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Cognito authentication error: {:?}", e);
                return Err(match e.as_service_error() {
                    Some(InitiateAuthError::NotAuthorizedException(_))
                    | Some(InitiateAuthError::UserNotFoundException(_)) => {
                        IdentityError::InvalidCredentials
                    }
                    _ => IdentityError::Other(e.to_string()),
                });
            }
        };

        let result = response.authentication_result().ok_or_else(|| {
            IdentityError::Other(format!(
                "no authentication result returned (challenge: {:?})",
                response.challenge_name()
            ))
        })?;

        let access_token = result
            .access_token()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| IdentityError::Other("no access token returned".to_string()))?;

        Ok(AuthTokens {
            access_token: access_token.to_string(),
            id_token: result.id_token().map(str::to_string),
            refresh_token: result.refresh_token().map(str::to_string),
        })
    }

    async fn verify_token(&self, token: &str) -> Result<Identity, IdentityError> {
        match self.client.get_user().access_token(token).send().await {
            Ok(user) => Ok(Identity {
                username: user.username().to_string(),
            }),
            Err(e) => match e.as_service_error() {
                Some(GetUserError::NotAuthorizedException(_))
                | Some(GetUserError::UserNotFoundException(_)) => {
                    tracing::warn!("Access token rejected by Cognito");
                    Err(IdentityError::InvalidToken)
                }
                _ => {
                    tracing::error!("Cognito token verification error: {:?}", e);
                    Err(IdentityError::Other(e.to_string()))
                }
            },
        }
    }
}
