//! In-memory collaborators for exercising the dispatcher without AWS.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lambda_http::{Body, Request, Response};
use serde_json::Value;

use crate::config::Config;
use crate::identity::{IdentityError, IdentityProvider};
use crate::store::{Item, ItemStore, StoreError, KEY_ATTRIBUTE};
use crate::types::{AuthTokens, Identity, UserAttributes};
use crate::validation::PasswordPolicy;
use crate::AppState;

#[derive(Default)]
pub struct MemoryItemStore {
    collections: Mutex<HashMap<String, HashMap<String, Item>>>,
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
}

impl MemoryItemStore {
    fn begin(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            Err(StoreError::Request("ProvisionedThroughputExceededException".into()))
        } else {
            Ok(())
        }
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .map_or(0, HashMap::len)
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn put(&self, collection: &str, item: Item) -> Result<(), StoreError> {
        self.begin()?;
        let key = item
            .get(KEY_ATTRIBUTE)
            .ok_or_else(|| StoreError::Request("missing key attribute".into()))?
            .to_string();
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .insert(key, item);
        Ok(())
    }

    async fn get(&self, collection: &str, key: &Value) -> Result<Option<Item>, StoreError> {
        self.begin()?;
        Ok(self
            .collections
            .lock()
            .unwrap()
            .get(collection)
            .and_then(|items| items.get(&key.to_string()))
            .cloned())
    }

    async fn scan_all(&self, collection: &str) -> Result<Vec<Item>, StoreError> {
        self.begin()?;
        Ok(self
            .collections
            .lock()
            .unwrap()
            .get(collection)
            .map(|items| items.values().cloned().collect())
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeIdentityProvider {
    passwords: Mutex<HashMap<String, String>>,
    tokens: Mutex<HashMap<String, String>>,
    pub created: Mutex<Vec<(String, UserAttributes)>>,
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
}

impl FakeIdentityProvider {
    fn begin(&self) -> Result<(), IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            Err(IdentityError::Other("TooManyRequestsException".into()))
        } else {
            Ok(())
        }
    }

    /// Register a token as valid without going through sign-in.
    pub fn grant(&self, token: &str, username: &str) {
        self.tokens
            .lock()
            .unwrap()
            .insert(token.to_string(), username.to_string());
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn create_user(
        &self,
        username: &str,
        password: &str,
        attributes: &UserAttributes,
    ) -> Result<(), IdentityError> {
        self.begin()?;
        let mut passwords = self.passwords.lock().unwrap();
        if passwords.contains_key(username) {
            return Err(IdentityError::AlreadyExists);
        }
        passwords.insert(username.to_string(), password.to_string());
        self.created
            .lock()
            .unwrap()
            .push((username.to_string(), attributes.clone()));
        Ok(())
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthTokens, IdentityError> {
        self.begin()?;
        match self.passwords.lock().unwrap().get(username) {
            Some(stored) if stored == password => {
                let access_token = format!("access-{}", uuid::Uuid::new_v4());
                self.grant(&access_token, username);
                Ok(AuthTokens {
                    access_token,
                    id_token: Some("id-token".into()),
                    refresh_token: Some("refresh-token".into()),
                })
            }
            _ => Err(IdentityError::InvalidCredentials),
        }
    }

    async fn verify_token(&self, token: &str) -> Result<Identity, IdentityError> {
        self.begin()?;
        self.tokens
            .lock()
            .unwrap()
            .get(token)
            .map(|username| Identity {
                username: username.clone(),
            })
            .ok_or(IdentityError::InvalidToken)
    }
}

pub struct Harness {
    pub state: Arc<AppState>,
    pub identity: Arc<FakeIdentityProvider>,
    pub store: Arc<MemoryItemStore>,
}

pub const VALID_TOKEN: &str = "valid-token";

pub fn test_config() -> Config {
    Config {
        tables_table: "Tables".into(),
        reservations_table: "Reservations".into(),
        user_pool_id: "us-east-1_test".into(),
        client_id: "client".into(),
        client_secret: None,
        password_policy: PasswordPolicy::default(),
    }
}

pub fn harness() -> Harness {
    let identity = Arc::new(FakeIdentityProvider::default());
    identity.grant(VALID_TOKEN, "staff@example.com");
    let store = Arc::new(MemoryItemStore::default());
    let state = AppState::new(test_config(), identity.clone(), store.clone());
    Harness {
        state,
        identity,
        store,
    }
}

pub fn request(method: &str, path: &str, body: Option<Value>) -> Request {
    let body = body.map_or(Body::Empty, |b| Body::from(b.to_string()));
    lambda_http::http::Request::builder()
        .method(method)
        .uri(path)
        .header("Content-Type", "application/json")
        .body(body)
        .unwrap()
}

pub fn authed(method: &str, path: &str, body: Option<Value>) -> Request {
    let mut request = request(method, path, body);
    request.headers_mut().insert(
        "Authorization",
        format!("Bearer {}", VALID_TOKEN).parse().unwrap(),
    );
    request
}

pub fn body_json(response: &Response<Body>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}
