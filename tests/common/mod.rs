#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use classbot::components::google_calendar::oauth::Authorizer;
use classbot::components::google_calendar::{StoredToken, TokenStorage};
use classbot::error::{auth_config_error, BotResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Mock implementation of token storage that counts every access
#[derive(Debug, Clone, Default)]
pub struct MockTokenStorage {
    token: Arc<Mutex<Option<StoredToken>>>,
    loads: Arc<AtomicUsize>,
    saves: Arc<AtomicUsize>,
}

impl MockTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: StoredToken) -> Self {
        let storage = Self::default();
        *storage.token.lock().unwrap() = Some(token);
        storage
    }

    pub fn current(&self) -> Option<StoredToken> {
        self.token.lock().unwrap().clone()
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenStorage for MockTokenStorage {
    async fn load(&self) -> BotResult<Option<StoredToken>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.current())
    }

    async fn save(&self, token: &StoredToken) -> BotResult<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.token.lock().unwrap() = Some(token.clone());
        Ok(())
    }
}

/// Authorizer that hands out a fixed token, or fails when it has none
#[derive(Debug, Default)]
pub struct MockAuthorizer {
    token: Option<StoredToken>,
    calls: AtomicUsize,
}

impl MockAuthorizer {
    pub fn returning(token: StoredToken) -> Self {
        Self {
            token: Some(token),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Authorizer for MockAuthorizer {
    async fn authorize(&self) -> BotResult<StoredToken> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.token
            .clone()
            .ok_or_else(|| auth_config_error("browser not available"))
    }
}

/// Token that stays valid for the duration of a test
pub fn valid_token(access_token: &str) -> StoredToken {
    StoredToken {
        access_token: access_token.to_string(),
        refresh_token: Some("refresh-abc".to_string()),
        expiry: Some(Utc::now() + Duration::hours(1)),
        client_id: Some("client-id".to_string()),
        client_secret: Some("client-secret".to_string()),
        ..Default::default()
    }
}

/// Token that expired a while ago and points its refreshes at `token_uri`
pub fn expired_token(token_uri: &str) -> StoredToken {
    StoredToken {
        access_token: "ya29.stale".to_string(),
        refresh_token: Some("refresh-abc".to_string()),
        expiry: Some(Utc::now() - Duration::minutes(5)),
        token_uri: Some(token_uri.to_string()),
        client_id: Some("client-id".to_string()),
        client_secret: Some("client-secret".to_string()),
        ..Default::default()
    }
}
