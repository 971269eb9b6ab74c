use crate::error::{config_error, env_error, BotResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default activity text for the bot
pub const DEFAULT_ACTIVITY: &str = "Checking the timetable";

/// Default location of the persisted Google token
pub const DEFAULT_TOKEN_PATH: &str = "token.json";

/// Default location of the optional settings file
pub const DEFAULT_CONFIG_FILE: &str = "config/classbot.toml";

/// Google Calendar v3 REST base URL
pub const DEFAULT_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3/";

/// Default timeout for calls to Google, in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Main configuration structure for the bot
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord bot token
    pub discord_token: String,
    /// Google OAuth client secret JSON, as downloaded from the cloud console
    pub google_credentials: Option<String>,
    /// Base64 encoded token.json used to provision headless deployments
    pub token_json_base64: Option<String>,
    /// Where the Google token is persisted
    pub token_path: PathBuf,
    /// Calendar to read, usually "primary"
    pub google_calendar_id: String,
    /// Google Calendar API base URL
    pub calendar_api_base: String,
    /// Timezone used to render event times
    pub timezone: String,
    /// Locale of user facing messages
    pub bot_locale: String,
    /// Bot activity status text
    pub activity: String,
    /// Whether a browser based authorization may be started when no token exists
    pub interactive_auth: bool,
    /// Loopback port for the authorization redirect, 0 picks a free port
    pub auth_redirect_port: u16,
    /// Timeout applied to every Google request
    pub request_timeout_secs: u64,
    /// Register commands in this guild only instead of globally
    pub guild_id: Option<u64>,
}

/// Non-secret settings that may be overridden from a TOML file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    pub timezone: Option<String>,
    pub bot_locale: Option<String>,
    pub activity: Option<String>,
    pub calendar_id: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub interactive_auth: Option<bool>,
}

impl Config {
    /// Load configuration from the environment, a .env file and the optional settings file
    pub fn load() -> BotResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let config_file =
            env::var("CONFIG_FILE").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let settings = FileSettings::load(Path::new(&config_file))?;

        Self::resolve(|key| env::var(key).ok(), settings)
    }

    /// Variables, then file overrides, then a single validation of the merged result
    pub fn resolve<F>(lookup: F, settings: Option<FileSettings>) -> BotResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::from_lookup(lookup)?;
        if let Some(settings) = settings {
            config.apply(settings);
        }
        config.validate()?;
        Ok(config)
    }

    /// Build configuration from an arbitrary variable lookup
    ///
    /// Only the syntax of each variable is checked here, see [`Config::validate`].
    pub fn from_lookup<F>(lookup: F) -> BotResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // The only variable whose absence prevents startup
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| env_error("DISCORD_TOKEN"))?;

        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let interactive_auth = match non_empty("INTERACTIVE_AUTH") {
            Some(value) => parse_bool(&value)
                .ok_or_else(|| config_error(&format!("Invalid INTERACTIVE_AUTH value: {}", value)))?,
            None => false,
        };

        let auth_redirect_port = match non_empty("AUTH_REDIRECT_PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| config_error(&format!("Invalid AUTH_REDIRECT_PORT value: {}", value)))?,
            None => 0,
        };

        let request_timeout_secs = match non_empty("REQUEST_TIMEOUT_SECS") {
            Some(value) => value
                .parse::<u64>()
                .map_err(|_| config_error(&format!("Invalid REQUEST_TIMEOUT_SECS value: {}", value)))?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let guild_id = match non_empty("GUILD_ID") {
            Some(value) => Some(
                value
                    .parse::<u64>()
                    .map_err(|_| config_error(&format!("Invalid GUILD_ID value: {}", value)))?,
            ),
            None => None,
        };

        let config = Config {
            discord_token,
            google_credentials: non_empty("GOOGLE_CREDENTIALS"),
            token_json_base64: non_empty("TOKEN_JSON_BASE64"),
            token_path: non_empty("TOKEN_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_PATH)),
            google_calendar_id: non_empty("GOOGLE_CALENDAR_ID")
                .unwrap_or_else(|| String::from("primary")),
            calendar_api_base: non_empty("CALENDAR_API_BASE")
                .unwrap_or_else(|| String::from(DEFAULT_CALENDAR_API_BASE)),
            timezone: non_empty("TIMEZONE").unwrap_or_else(|| String::from("UTC")),
            bot_locale: non_empty("BOT_LOCALE").unwrap_or_else(|| String::from("en")),
            activity: non_empty("BOT_ACTIVITY").unwrap_or_else(|| String::from(DEFAULT_ACTIVITY)),
            interactive_auth,
            auth_redirect_port,
            request_timeout_secs,
            guild_id,
        };

        Ok(config)
    }

    /// Overlay settings read from the TOML file
    pub fn apply(&mut self, settings: FileSettings) {
        if let Some(timezone) = settings.timezone {
            self.timezone = timezone;
        }
        if let Some(locale) = settings.bot_locale {
            self.bot_locale = locale;
        }
        if let Some(activity) = settings.activity {
            self.activity = activity;
        }
        if let Some(calendar_id) = settings.calendar_id {
            self.google_calendar_id = calendar_id;
        }
        if let Some(timeout) = settings.request_timeout_secs {
            self.request_timeout_secs = timeout;
        }
        if let Some(interactive) = settings.interactive_auth {
            self.interactive_auth = interactive;
        }
    }

    /// Check values that can only be judged once everything is merged
    pub fn validate(&self) -> BotResult<()> {
        self.tz()?;
        if self.request_timeout_secs == 0 {
            return Err(config_error("request_timeout_secs must be greater than zero"));
        }
        url::Url::parse(&self.calendar_api_base).map_err(|e| {
            config_error(&format!("Invalid CALENDAR_API_BASE {}: {}", self.calendar_api_base, e))
        })?;
        Ok(())
    }

    /// Display timezone parsed into a chrono-tz zone
    pub fn tz(&self) -> BotResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Unknown timezone: {}", self.timezone)))
    }

    /// Timeout applied to Google requests
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl FileSettings {
    /// Read the settings file, returning None when it does not exist
    pub fn load(path: &Path) -> BotResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        let settings = toml::from_str::<FileSettings>(&content)?;
        tracing::info!("Loaded settings from {}", path.display());
        Ok(Some(settings))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
