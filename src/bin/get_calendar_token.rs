use base64::{engine::general_purpose::STANDARD, Engine as _};
use classbot::components::google_calendar::client::http_client;
use classbot::components::google_calendar::oauth::{Authorizer, BrowserAuthorizer, ClientSecret};
use classbot::components::google_calendar::{FileTokenStorage, TokenStorage};
use classbot::config::Config;
use classbot::error::{auth_config_error, BotResult};

/// Run the browser authorization once and write the token file.
///
/// The printed base64 value is what headless deployments put in TOKEN_JSON_BASE64.
#[tokio::main]
async fn main() -> BotResult<()> {
    // Load configuration
    let config = Config::load()?;

    let secret_json = config
        .google_credentials
        .as_deref()
        .ok_or_else(|| auth_config_error("GOOGLE_CREDENTIALS must be set to authorize"))?;
    let secret = ClientSecret::from_json(secret_json)?;

    let http = http_client(config.request_timeout())?;
    let authorizer = BrowserAuthorizer::new(secret, http, config.auth_redirect_port);

    println!("Opening browser for Google Calendar authorization...");
    let token = authorizer.authorize().await?;

    let storage = FileTokenStorage::new(&config.token_path);
    storage.save(&token).await?;
    println!("Token saved to {}", storage.path().display());

    let json = serde_json::to_string(&token)?;
    println!();
    println!("TOKEN_JSON_BASE64={}", STANDARD.encode(json));

    Ok(())
}
