pub mod client;
pub mod format;
pub mod models;
pub mod oauth;
pub mod summary;
pub mod time;
pub mod token;

pub use client::CalendarClient;
pub use models::CalendarEvent;
pub use summary::{DaySummary, SummaryBuilder};
pub use token::{CredentialStore, FileTokenStorage, StoredToken, TokenStorage};

use crate::config::Config;
use crate::error::BotResult;
use oauth::{BrowserAuthorizer, ClientSecret};
use std::sync::Arc;
use tracing::{info, warn};

/// Wire the credential store, calendar client and formatter from configuration
pub fn build_summary_builder(config: &Config) -> BotResult<SummaryBuilder> {
    let http = client::http_client(config.request_timeout())?;
    let storage = Arc::new(FileTokenStorage::new(&config.token_path));

    let mut credentials = CredentialStore::new(storage, http.clone());

    match config.google_credentials.as_deref() {
        Some(json) => {
            let secret = ClientSecret::from_json(json)?;
            if config.interactive_auth {
                info!("Interactive Google authorization enabled");
                let authorizer =
                    BrowserAuthorizer::new(secret.clone(), http.clone(), config.auth_redirect_port);
                credentials = credentials.with_authorizer(Arc::new(authorizer));
            }
            credentials = credentials.with_client_secret(secret);
        }
        None if config.interactive_auth => {
            warn!("INTERACTIVE_AUTH is set but GOOGLE_CREDENTIALS is missing; only a stored token can be used");
        }
        None => {}
    }

    let calendar = CalendarClient::from_config(config, http)?;
    Ok(SummaryBuilder::new(
        Arc::new(credentials),
        calendar,
        config.tz()?,
    ))
}
