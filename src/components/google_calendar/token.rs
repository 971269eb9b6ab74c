use super::oauth::{post_token_request, Authorizer, ClientSecret, DEFAULT_TOKEN_URI};
use crate::error::{auth_config_error, config_error, token_refresh_error, BotResult, Error};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Tokens this close to expiry are refreshed early
const EXPIRY_SKEW_SECS: i64 = 60;

/// Persisted Google OAuth credentials
///
/// Field names follow the `token.json` written by Google's client libraries so a
/// token produced elsewhere can be provisioned as-is. Unknown fields survive a
/// load/save round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    #[serde(alias = "token")]
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, alias = "expires_at", skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StoredToken {
    /// Whether the access token can be used at `now`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if self.access_token.is_empty() {
            return false;
        }
        match self.expiry {
            Some(expiry) => expiry - Duration::seconds(EXPIRY_SKEW_SECS) > now,
            None => true,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }
}

/// Where the credential lives between requests
#[async_trait]
pub trait TokenStorage: Send + Sync {
    async fn load(&self) -> BotResult<Option<StoredToken>>;
    async fn save(&self, token: &StoredToken) -> BotResult<()>;
}

/// Token kept as JSON in a single file
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Recreate the token file from a base64 payload when it is missing
    ///
    /// Returns whether the file was written.
    pub fn bootstrap_from_base64(&self, encoded: Option<&str>) -> BotResult<bool> {
        if self.path.exists() {
            match std::fs::read_to_string(&self.path) {
                Ok(content) if serde_json::from_str::<StoredToken>(&content).is_ok() => {
                    debug!("Token file {} already present", self.path.display());
                    return Ok(false);
                }
                Ok(_) => warn!("Token file {} is corrupt", self.path.display()),
                Err(e) => warn!("Token file {} is unreadable: {}", self.path.display(), e),
            }
        }

        let Some(encoded) = encoded else {
            warn!(
                "No token at {} and TOKEN_JSON_BASE64 is not set; calendar requests will fail until one is provisioned",
                self.path.display()
            );
            return Ok(false);
        };

        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD
            .decode(compact)
            .map_err(|e| config_error(&format!("TOKEN_JSON_BASE64 is not valid base64: {}", e)))?;

        // Refuse to write something that would fail on first use
        serde_json::from_slice::<StoredToken>(&bytes)
            .map_err(|e| config_error(&format!("TOKEN_JSON_BASE64 is not a token: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        write_private(&self.path, &bytes)?;
        info!("Token file {} rebuilt from TOKEN_JSON_BASE64", self.path.display());
        Ok(true)
    }
}

#[async_trait]
impl TokenStorage for FileTokenStorage {
    async fn load(&self) -> BotResult<Option<StoredToken>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        // A damaged file counts as no token so reauthorization stays possible
        match serde_json::from_str(&content) {
            Ok(token) => Ok(Some(token)),
            Err(e) => {
                warn!("Ignoring corrupt token file {}: {}", self.path.display(), e);
                Ok(None)
            }
        }
    }

    async fn save(&self, token: &StoredToken) -> BotResult<()> {
        let json = serde_json::to_vec_pretty(token)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_private(&path, &json))
            .await
            .map_err(|e| Error::Other(format!("Token writer task failed: {}", e)))??;
        debug!("Token persisted to {}", self.path.display());
        Ok(())
    }
}

/// Replace `path` with `bytes` through a sibling temp file readable by the owner only
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(&tmp)?;
    // A leftover temp file keeps its old mode, so set it explicitly
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);

    std::fs::rename(&tmp, path)
}

/// Hands out a live Google session, refreshing or authorizing when needed
pub struct CredentialStore {
    storage: Arc<dyn TokenStorage>,
    client: Client,
    client_secret: Option<ClientSecret>,
    authorizer: Option<Arc<dyn Authorizer>>,
    refresh_lock: Mutex<()>,
}

impl CredentialStore {
    pub fn new(storage: Arc<dyn TokenStorage>, client: Client) -> Self {
        Self {
            storage,
            client,
            client_secret: None,
            authorizer: None,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Application client used when the stored token does not carry its own
    pub fn with_client_secret(mut self, secret: ClientSecret) -> Self {
        self.client_secret = Some(secret);
        self
    }

    /// Allow obtaining a new token interactively when nothing usable is stored
    pub fn with_authorizer(mut self, authorizer: Arc<dyn Authorizer>) -> Self {
        self.authorizer = Some(authorizer);
        self
    }

    /// Return a valid token, refreshing or authorizing as needed
    pub async fn acquire_session(&self) -> BotResult<StoredToken> {
        // Held for the whole load-refresh-save cycle so concurrent callers see one refresh
        let _guard = self.refresh_lock.lock().await;

        if let Some(token) = self.storage.load().await? {
            if token.is_valid() {
                debug!("Using stored Google token");
                return Ok(token);
            }

            if token.can_refresh() {
                info!("Stored Google token expired, refreshing");
                let refreshed = self.refresh(&token).await?;
                self.storage.save(&refreshed).await?;
                return Ok(refreshed);
            }

            warn!("Stored Google token expired and has no refresh token");
        }

        match &self.authorizer {
            Some(authorizer) => {
                info!("Starting interactive Google authorization");
                let token = authorizer.authorize().await?;
                self.storage.save(&token).await?;
                Ok(token)
            }
            None => Err(auth_config_error(
                "No usable Google token is stored and interactive authorization is disabled",
            )),
        }
    }

    async fn refresh(&self, token: &StoredToken) -> BotResult<StoredToken> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .ok_or_else(|| token_refresh_error("No refresh token in token data"))?;

        let client_id = token
            .client_id
            .clone()
            .or_else(|| self.client_secret.as_ref().map(|s| s.client_id.clone()))
            .ok_or_else(|| auth_config_error("No client_id available to refresh the token"))?;
        let client_secret = token
            .client_secret
            .clone()
            .or_else(|| self.client_secret.as_ref().map(|s| s.client_secret.clone()))
            .ok_or_else(|| auth_config_error("No client_secret available to refresh the token"))?;
        let token_uri = token
            .token_uri
            .clone()
            .or_else(|| self.client_secret.as_ref().map(|s| s.token_uri.clone()))
            .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string());

        let response = post_token_request(
            &self.client,
            &token_uri,
            &[
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ],
        )
        .await?;

        let expires_in = response.expires_in.unwrap_or(3600);
        let mut refreshed = token.clone();
        refreshed.access_token = response.access_token;
        refreshed.expiry = Some(Utc::now() + Duration::seconds(expires_in));
        if let Some(new_refresh) = response.refresh_token {
            refreshed.refresh_token = Some(new_refresh);
        }
        refreshed.token_uri = Some(token_uri);
        refreshed.client_id = Some(client_id);
        refreshed.client_secret = Some(client_secret);
        Ok(refreshed)
    }
}
