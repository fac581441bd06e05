use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Number, Value};

use crate::error::ApiError;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex should be valid")
});

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const SLOT_TIME_FORMAT: &str = "%H:%M";

/// Strength rules applied to signup passwords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_letter: bool,
    pub require_digit: bool,
    pub require_mixed_case: bool,
    pub require_symbol: bool,
    /// Characters that satisfy `require_symbol`.
    pub symbols: String,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 12,
            require_letter: true,
            require_digit: true,
            require_mixed_case: false,
            require_symbol: true,
            symbols: "$%^*-_".to_string(),
        }
    }
}

impl PasswordPolicy {
    pub fn check(&self, password: &str) -> bool {
        let chars = || password.chars();

        chars().count() >= self.min_length
            && (!self.require_letter || chars().any(|c| c.is_ascii_alphabetic()))
            && (!self.require_digit || chars().any(|c| c.is_ascii_digit()))
            && (!self.require_mixed_case
                || (chars().any(|c| c.is_ascii_lowercase()) && chars().any(|c| c.is_ascii_uppercase())))
            && (!self.require_symbol || chars().any(|c| self.symbols.contains(c)))
    }

    /// Human-readable statement of the policy, returned when a password fails it.
    pub fn describe(&self) -> String {
        let mut rules = Vec::new();
        if self.require_letter {
            rules.push("a letter".to_string());
        }
        if self.require_mixed_case {
            rules.push("both upper and lower case letters".to_string());
        }
        if self.require_digit {
            rules.push("a digit".to_string());
        }
        if self.require_symbol {
            rules.push(format!("one of {}", self.symbols));
        }

        let mut message = format!("Password must be at least {} characters", self.min_length);
        if !rules.is_empty() {
            message.push_str(" and include ");
            message.push_str(&rules.join(", "));
        }
        message
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Parse a request body into a JSON object. No body at all counts as `{}`.
pub fn parse_body(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::validation("Invalid request body: expected a JSON object")),
        Err(e) => Err(ApiError::validation(format!("Invalid request body: {}", e))),
    }
}

/// Names of the `fields` that are absent, `null` or an empty string.
pub fn missing_fields<'a>(body: &Map<String, Value>, fields: &[&'a str]) -> Vec<&'a str> {
    fields
        .iter()
        .copied()
        .filter(|field| match body.get(*field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        })
        .collect()
}

pub fn require_fields(body: &Map<String, Value>, fields: &[&str]) -> Result<(), ApiError> {
    let missing = missing_fields(body, fields);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}

pub fn string_field(body: &Map<String, Value>, name: &str) -> Result<String, ApiError> {
    match body.get(name) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(ApiError::validation(format!("Invalid {}: expected a non-empty string", name))),
    }
}

pub fn integer_field(body: &Map<String, Value>, name: &str) -> Result<i64, ApiError> {
    body.get(name)
        .and_then(Value::as_i64)
        .ok_or_else(|| ApiError::validation(format!("Invalid {}: expected an integer", name)))
}

pub fn bool_field(body: &Map<String, Value>, name: &str) -> Result<bool, ApiError> {
    body.get(name)
        .and_then(Value::as_bool)
        .ok_or_else(|| ApiError::validation(format!("Invalid {}: expected true or false", name)))
}

/// `None` when the field is absent or `null`. The number keeps its JSON form,
/// so `100` stays an integer and `12.5` stays a float.
pub fn optional_number_field(
    body: &Map<String, Value>,
    name: &str,
) -> Result<Option<Number>, ApiError> {
    match body.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => Ok(Some(number.clone())),
        Some(_) => Err(ApiError::validation(format!(
            "Invalid {}: expected a number",
            name
        ))),
    }
}

pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| ApiError::validation(format!("Invalid {}: expected YYYY-MM-DD", field)))
}

pub fn parse_slot_time(field: &str, value: &str) -> Result<NaiveTime, ApiError> {
    NaiveTime::parse_from_str(value, SLOT_TIME_FORMAT)
        .map_err(|_| ApiError::validation(format!("Invalid {}: expected HH:MM", field)))
}
