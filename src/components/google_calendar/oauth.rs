use super::token::StoredToken;
use crate::error::{auth_config_error, token_refresh_error, BotResult};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration as StdDuration, Instant};
use tracing::info;
use url::Url;

/// Read-only calendar scope requested by the bot
pub const CALENDAR_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

pub const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// How long the consent page may stay open before authorization is abandoned
pub const AUTHORIZATION_TIMEOUT_SECS: u64 = 300;

/// OAuth client registration, the `installed` or `web` section of client_secret.json
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

impl ClientSecret {
    /// Parse the JSON downloaded from the Google Cloud console
    pub fn from_json(json: &str) -> BotResult<Self> {
        let file: ClientSecretFile = serde_json::from_str(json)
            .map_err(|e| auth_config_error(&format!("Invalid GOOGLE_CREDENTIALS JSON: {}", e)))?;
        file.installed
            .or(file.web)
            .ok_or_else(|| auth_config_error("GOOGLE_CREDENTIALS has neither 'installed' nor 'web' client"))
    }
}

/// Successful answer from the token endpoint
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenResponse {
    /// Turn the response into a token that can be stored
    pub fn into_token(self, token_uri: &str, secret: Option<&ClientSecret>) -> StoredToken {
        let expires_in = self.expires_in.unwrap_or(3600);
        StoredToken {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expiry: Some(Utc::now() + Duration::seconds(expires_in)),
            token_uri: Some(token_uri.to_string()),
            client_id: secret.map(|s| s.client_id.clone()),
            client_secret: secret.map(|s| s.client_secret.clone()),
            scopes: self
                .scope
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or_else(|| vec![CALENDAR_READONLY_SCOPE.to_string()]),
            ..Default::default()
        }
    }
}

/// POST a form to the token endpoint and decode the answer
pub async fn post_token_request(
    client: &Client,
    token_uri: &str,
    params: &[(&str, &str)],
) -> BotResult<TokenResponse> {
    let response = client
        .post(token_uri)
        .form(params)
        .send()
        .await
        .map_err(|e| token_refresh_error(&format!("Token endpoint unreachable: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error response".to_string());
        return Err(token_refresh_error(&format!(
            "HTTP {} - {}",
            status, error_body
        )));
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| token_refresh_error(&format!("Failed to parse token response: {}", e)))
}

/// Something able to obtain a brand new token when none is stored
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self) -> BotResult<StoredToken>;
}

/// Installed-app flow: open the consent page and catch the redirect on a loopback port
pub struct BrowserAuthorizer {
    secret: ClientSecret,
    client: Client,
    port: u16,
    timeout: StdDuration,
}

impl BrowserAuthorizer {
    pub fn new(secret: ClientSecret, client: Client, port: u16) -> Self {
        Self {
            secret,
            client,
            port,
            timeout: StdDuration::from_secs(AUTHORIZATION_TIMEOUT_SECS),
        }
    }

    /// Give up when the consent page is not completed within `timeout`
    pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Consent page URL for the given redirect and CSRF state
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> BotResult<Url> {
        let mut url = Url::parse(&self.secret.auth_uri)
            .map_err(|e| auth_config_error(&format!("Invalid auth_uri: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.secret.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("scope", CALENDAR_READONLY_SCOPE)
            .append_pair("state", state);
        Ok(url)
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> BotResult<StoredToken> {
        let response = post_token_request(
            &self.client,
            &self.secret.token_uri,
            &[
                ("client_id", self.secret.client_id.as_str()),
                ("client_secret", self.secret.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ],
        )
        .await?;
        Ok(response.into_token(&self.secret.token_uri, Some(&self.secret)))
    }
}

#[async_trait]
impl Authorizer for BrowserAuthorizer {
    async fn authorize(&self) -> BotResult<StoredToken> {
        let server = tiny_http::Server::http(("127.0.0.1", self.port))
            .map_err(|e| auth_config_error(&format!("Cannot listen for the OAuth redirect: {}", e)))?;
        let port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .ok_or_else(|| auth_config_error("OAuth redirect listener has no TCP address"))?;

        let redirect_uri = format!("http://127.0.0.1:{}/", port);
        let state = uuid::Uuid::new_v4().to_string();
        let auth_url = self.authorization_url(&redirect_uri, &state)?;

        info!("Opening browser for Google Calendar authorization");
        if webbrowser::open(auth_url.as_str()).is_err() {
            info!("Could not open a browser, visit this URL to authorize: {}", auth_url);
        }

        // tiny_http blocks, keep it off the runtime threads
        let deadline = Instant::now() + self.timeout;
        let code = tokio::task::spawn_blocking(move || wait_for_code(&server, &state, deadline))
            .await
            .map_err(|e| auth_config_error(&format!("Authorization listener failed: {}", e)))??;

        tokio::time::timeout(self.timeout, self.exchange_code(&code, &redirect_uri))
            .await
            .map_err(|_| auth_config_error("Timed out exchanging the authorization code"))?
    }
}

/// Serve the loopback listener until the redirect arrives or `deadline` passes
fn wait_for_code(
    server: &tiny_http::Server,
    expected_state: &str,
    deadline: Instant,
) -> BotResult<String> {
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(auth_config_error(
                "Timed out waiting for the Google authorization redirect",
            ));
        }

        let request = match server.recv_timeout(remaining) {
            Ok(Some(request)) => request,
            Ok(None) => continue,
            Err(e) => {
                return Err(auth_config_error(&format!(
                    "Failed to receive OAuth redirect: {}",
                    e
                )))
            }
        };

        // Browsers also ask for /favicon.ico and similar
        if !request.url().contains('?') {
            let _ = request.respond(tiny_http::Response::empty(404));
            continue;
        }

        let result = extract_code(request.url(), expected_state);
        let body = match &result {
            Ok(_) => "Authorization successful! You can close this window.",
            Err(_) => "Authorization failed. Check the bot logs.",
        };
        let _ = request.respond(tiny_http::Response::from_string(body));
        return result;
    }
}

/// Pull the authorization code out of the redirect path, checking the state
pub fn extract_code(request_url: &str, expected_state: &str) -> BotResult<String> {
    let url = Url::parse("http://localhost")
        .and_then(|base| base.join(request_url))
        .map_err(|e| auth_config_error(&format!("Malformed OAuth redirect: {}", e)))?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(auth_config_error(&format!("Authorization denied: {}", error)));
    }
    if state.as_deref() != Some(expected_state) {
        return Err(auth_config_error("OAuth state mismatch"));
    }
    code.ok_or_else(|| auth_config_error("No authorization code found in callback"))
}
