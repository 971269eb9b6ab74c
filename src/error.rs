use miette::{Diagnostic, Result};
use rust_i18n::t;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Discord API error: {0}")]
    #[diagnostic(code(classbot::discord_api))]
    DiscordApi(#[from] serenity::Error),

    #[error("Environment error: {0}")]
    #[diagnostic(
        code(classbot::environment),
        help("Set the variable in the process environment or in a .env file")
    )]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(classbot::config))]
    Config(String),

    #[error("Google authorization is not configured: {0}")]
    #[diagnostic(
        code(classbot::auth_configuration),
        help("Provision TOKEN_JSON_BASE64 or run get_calendar_token on a machine with a browser")
    )]
    AuthConfiguration(String),

    #[error("Token refresh failed: {0}")]
    #[diagnostic(code(classbot::token_refresh))]
    TokenRefresh(String),

    #[error("Google Calendar query failed: {0}")]
    #[diagnostic(code(classbot::calendar_query))]
    CalendarQuery(String),

    #[error(transparent)]
    #[diagnostic(code(classbot::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(classbot::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(classbot::other))]
    Other(String),
}

impl Error {
    /// Short apologetic line shown to the user when a request fails
    pub fn user_message(&self) -> String {
        match self {
            Error::CalendarQuery(_) => t!("error_fetch_schedule").to_string(),
            _ => t!("error_generic").to_string(),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type BotResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create authorization configuration errors
pub fn auth_config_error(message: &str) -> Error {
    Error::AuthConfiguration(message.to_string())
}

/// Helper to create token refresh errors
pub fn token_refresh_error(message: &str) -> Error {
    Error::TokenRefresh(message.to_string())
}

/// Helper to create Google Calendar query errors
pub fn calendar_query_error(message: &str) -> Error {
    Error::CalendarQuery(message.to_string())
}
