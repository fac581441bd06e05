use lambda_http::{Body, Response};
use serde_json::{json, Map, Value};

use crate::error::ApiError;
use crate::identity::{IdentityError, IdentityProvider};
use crate::response::ok;
use crate::types::{SigninRequest, SigninResponse, SignupRequest, UserAttributes};
use crate::validation::{
    is_valid_email, missing_fields, parse_body, require_fields, string_field, PasswordPolicy,
};

const SIGNUP_FIELDS: [&str; 4] = ["firstName", "lastName", "email", "password"];

/// Passwords are taken verbatim; surrounding whitespace is significant.
fn password_field(body: &Map<String, Value>) -> Result<String, ApiError> {
    match body.get("password") {
        Some(Value::String(password)) => Ok(password.clone()),
        _ => Err(ApiError::validation("Invalid password: expected a string")),
    }
}

fn parse_signup(body: &[u8], policy: &PasswordPolicy) -> Result<SignupRequest, ApiError> {
    let body = parse_body(body)?;
    require_fields(&body, &SIGNUP_FIELDS)?;

    let request = SignupRequest {
        first_name: string_field(&body, "firstName")?,
        last_name: string_field(&body, "lastName")?,
        email: string_field(&body, "email")?,
        password: password_field(&body)?,
    };

    if !is_valid_email(&request.email) {
        return Err(ApiError::validation("Invalid email format"));
    }
    if !policy.check(&request.password) {
        return Err(ApiError::Validation(policy.describe()));
    }
    Ok(request)
}

/// Register a new user with the identity provider
pub async fn signup(
    identity: &dyn IdentityProvider,
    policy: &PasswordPolicy,
    body: &[u8],
) -> Result<Response<Body>, ApiError> {
    tracing::info!("Signup request received");
    let request = parse_signup(body, policy)?;

    let attributes = UserAttributes {
        given_name: request.first_name,
        family_name: request.last_name,
        email: request.email.clone(),
    };

    match identity
        .create_user(&request.email, &request.password, &attributes)
        .await
    {
        Ok(()) => ok(&json!({ "message": "User registered successfully" })),
        Err(IdentityError::AlreadyExists) => Err(ApiError::validation(
            "User with this email already exists",
        )),
        Err(e) => Err(ApiError::collaborator(
            "Something went wrong during signup. Please try again later.",
            e,
        )),
    }
}

fn parse_signin(body: &[u8]) -> Result<SigninRequest, ApiError> {
    let body = parse_body(body)?;
    if !missing_fields(&body, &["email", "password"]).is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }
    Ok(SigninRequest {
        email: string_field(&body, "email")?,
        password: password_field(&body)?,
    })
}

/// Exchange email and password for tokens
pub async fn signin(
    identity: &dyn IdentityProvider,
    body: &[u8],
) -> Result<Response<Body>, ApiError> {
    tracing::info!("Signin request received");
    let request = parse_signin(body)?;

    match identity.authenticate(&request.email, &request.password).await {
        Ok(tokens) => ok(&SigninResponse::from(tokens)),
        Err(IdentityError::InvalidCredentials) => {
            Err(ApiError::validation("Invalid username or password"))
        }
        Err(e) => Err(ApiError::collaborator(
            "Signin failed. Please try again later.",
            e,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{body_json, FakeIdentityProvider};
    use std::sync::atomic::Ordering;

    fn signup_body(password: &str) -> Vec<u8> {
        json!({
            "firstName": "Ana",
            "lastName": "Lopez",
            "email": "ana@example.com",
            "password": password
        })
        .to_string()
        .into_bytes()
    }

    #[tokio::test]
    async fn test_signup_maps_profile_attributes() {
        let identity = FakeIdentityProvider::default();
        let response = signup(&identity, &PasswordPolicy::default(), &signup_body("abcdefgh123$"))
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(
            body_json(&response),
            json!({ "message": "User registered successfully" })
        );

        let created = identity.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(
            created[0],
            (
                "ana@example.com".to_string(),
                UserAttributes {
                    given_name: "Ana".into(),
                    family_name: "Lopez".into(),
                    email: "ana@example.com".into(),
                }
            )
        );
    }

    #[tokio::test]
    async fn test_signup_rejects_each_missing_field_without_calling_provider() {
        for field in SIGNUP_FIELDS {
            let mut body: Map<String, Value> = serde_json::from_slice(&signup_body("abcdefgh123$")).unwrap();
            body.remove(field);
            let identity = FakeIdentityProvider::default();

            let err = signup(
                &identity,
                &PasswordPolicy::default(),
                Value::Object(body).to_string().as_bytes(),
            )
            .await
            .unwrap_err();

            assert_eq!(err.to_string(), format!("Missing required fields: {}", field));
            assert_eq!(identity.calls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_signup_rejects_weak_password_and_bad_email() {
        let identity = FakeIdentityProvider::default();
        let policy = PasswordPolicy::default();

        let err = signup(&identity, &policy, &signup_body("short1$")).await.unwrap_err();
        assert_eq!(err.to_string(), policy.describe());

        let bad_email = json!({
            "firstName": "Ana", "lastName": "Lopez", "email": "ana.example.com", "password": "abcdefgh123$"
        });
        let err = signup(&identity, &policy, bad_email.to_string().as_bytes())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid email format");
        assert_eq!(identity.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_signup_duplicate_and_provider_failure() {
        let identity = FakeIdentityProvider::default();
        let policy = PasswordPolicy::default();
        signup(&identity, &policy, &signup_body("abcdefgh123$")).await.unwrap();

        let err = signup(&identity, &policy, &signup_body("abcdefgh123$")).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref m) if m == "User with this email already exists"));

        identity.fail.store(true, Ordering::SeqCst);
        let err = signup(&identity, &policy, &signup_body("abcdefgh123$")).await.unwrap_err();
        assert_eq!(err.status(), 500);
    }

    #[tokio::test]
    async fn test_signin_issues_access_token() {
        let identity = FakeIdentityProvider::default();
        signup(&identity, &PasswordPolicy::default(), &signup_body("abcdefgh123$"))
            .await
            .unwrap();

        let body = json!({ "email": "ana@example.com", "password": "abcdefgh123$" }).to_string();
        let response = signin(&identity, body.as_bytes()).await.unwrap();
        assert_eq!(response.status(), 200);

        let json = body_json(&response);
        assert!(!json["accessToken"].as_str().unwrap().is_empty());
        assert_eq!(json["refreshToken"], "refresh-token");
    }

    #[tokio::test]
    async fn test_signin_wrong_password_is_400() {
        let identity = FakeIdentityProvider::default();
        signup(&identity, &PasswordPolicy::default(), &signup_body("abcdefgh123$"))
            .await
            .unwrap();

        for body in [
            json!({ "email": "ana@example.com", "password": "wrong-password1$" }),
            json!({ "email": "nobody@example.com", "password": "abcdefgh123$" }),
        ] {
            let err = signin(&identity, body.to_string().as_bytes()).await.unwrap_err();
            assert_eq!(err.status(), 400);
            assert_eq!(err.to_string(), "Invalid username or password");
        }
    }

    #[tokio::test]
    async fn test_signin_requires_both_fields() {
        let identity = FakeIdentityProvider::default();
        let err = signin(&identity, br#"{"email":"ana@example.com"}"#).await.unwrap_err();
        assert_eq!(err.to_string(), "Email and password are required");
        assert_eq!(identity.calls.load(Ordering::SeqCst), 0);
    }
}
