use std::fmt;
use std::path::PathBuf;

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A required environment variable is unset or empty.
    Missing(&'static str),
    /// An environment variable is set but unusable.
    Invalid { var: &'static str, detail: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(var) => write!(f, "required environment variable {var} is not set"),
            Self::Invalid { var, detail } => write!(f, "invalid value for {var}: {detail}"),
        }
    }
}

impl std::error::Error for ConfigError {}

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DB_PATH: &str = "chat_history.db";

/// Runtime configuration, read from the environment once at startup.
#[derive(Debug)]
pub struct Config {
    /// LINE channel access token, sent as a Bearer token on reply calls.
    pub channel_access_token: String,
    /// LINE channel secret used to verify webhook signatures.
    pub channel_secret: String,
    /// Gemini API key, passed as a query credential.
    pub gemini_api_key: String,
    /// Port to bind the HTTP server on.
    pub port: u16,
    /// Path of the SQLite history database.
    pub db_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a config from any variable source. Required variables must be
    /// present and non-empty; PORT must parse if set at all.
    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let channel_access_token = require(&get, "LINE_CHANNEL_ACCESS_TOKEN")?;
        let channel_secret = require(&get, "LINE_CHANNEL_SECRET")?;
        let gemini_api_key = require(&get, "GEMINI_API_KEY")?;

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                var: "PORT",
                detail: format!("'{raw}' is not a valid port number: {e}"),
            })?,
            None => DEFAULT_PORT,
        };

        let db_path = get("HISTORY_DB_PATH")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        Ok(Self {
            channel_access_token,
            channel_secret,
            gemini_api_key,
            port,
            db_path,
        })
    }
}

fn require(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<String, ConfigError> {
    match get(var) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(var)),
    }
}
