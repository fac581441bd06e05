use serde::{Deserialize, Serialize};
use serde_json::Number;

// ========== USER ==========
#[derive(Debug, Clone, PartialEq)]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Profile attributes forwarded to the identity provider on signup.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAttributes {
    pub given_name: String,
    pub family_name: String,
    pub email: String,
}

/// Tokens issued by the identity provider on successful authentication.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthTokens {
    pub access_token: String,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninResponse {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl From<AuthTokens> for SigninResponse {
    fn from(tokens: AuthTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            id_token: tokens.id_token,
            refresh_token: tokens.refresh_token,
        }
    }
}

/// Who a verified bearer token belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub username: String,
}

// ========== TABLE ==========
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: i64,
    pub number: i64,
    pub places: i64,
    pub is_vip: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_order: Option<Number>,
}

// ========== RESERVATION ==========
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: String,
    pub table_number: i64,
    pub client_name: String,
    pub phone_number: String,
    pub date: String, // YYYY-MM-DD
    pub slot_time_start: String, // HH:MM
    pub slot_time_end: String,
}
