//! Environment-driven configuration structures shared by all binaries.

use std::env;

use thiserror::Error;

/// Default session lifetime handed to the internal minting endpoint.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 86_400;

/// HTTP surface configuration (bind targets + shared database) so the API
/// binary does not depend on gateway-only environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    database_url: String,
    api_bind_address: String,
    api_unix_socket: Option<String>,
    internal_bind_address: Option<String>,
    internal_unix_socket: Option<String>,
    session_ttl_secs: u64,
}

impl ApiConfig {
    /// Loads only the environment variables required by the API listener.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        hydrate_env_file()?;

        let session_ttl_secs = match get_optional_var("SESSION_TTL_SECS") {
            Some(raw) => raw.parse().map_err(|source| ConfigError::InvalidNumber {
                key: "SESSION_TTL_SECS",
                source,
            })?,
            None => DEFAULT_SESSION_TTL_SECS,
        };

        Ok(Self {
            database_url: get_required_var("DATABASE_URL")?,
            api_bind_address: get_required_var("API_BIND_ADDRESS")?,
            api_unix_socket: get_optional_var("API_UNIX_SOCKET"),
            internal_bind_address: get_optional_var("API_INTERNAL_BIND_ADDRESS"),
            internal_unix_socket: get_optional_var("API_INTERNAL_UNIX_SOCKET"),
            session_ttl_secs,
        })
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn api_bind_address(&self) -> &str {
        &self.api_bind_address
    }

    pub fn api_unix_socket(&self) -> Option<&str> {
        self.api_unix_socket.as_deref()
    }

    pub fn internal_bind_address(&self) -> Option<&str> {
        self.internal_bind_address.as_deref()
    }

    pub fn internal_unix_socket(&self) -> Option<&str> {
        self.internal_unix_socket.as_deref()
    }

    pub fn has_internal_listener(&self) -> bool {
        self.internal_bind_address.is_some() || self.internal_unix_socket.is_some()
    }

    pub fn session_ttl_secs(&self) -> u64 {
        self.session_ttl_secs
    }
}

/// Payment gateway credentials and endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    secret_key: String,
    base_url: String,
    callback_url: String,
}

impl GatewayConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.paystack.co";

    pub fn load_from_env() -> Result<Self, ConfigError> {
        hydrate_env_file()?;

        Ok(Self {
            secret_key: get_required_var("PAYSTACK_SECRET_KEY")?,
            base_url: get_optional_var("PAYSTACK_BASE_URL")
                .unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string()),
            callback_url: get_required_var("PAYMENT_CALLBACK_URL")?,
        })
    }

    pub fn new(
        secret_key: impl Into<String>,
        base_url: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            secret_key: secret_key.into(),
            base_url: base_url.into(),
            callback_url: callback_url.into(),
        }
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }
}

fn get_required_var(key: &'static str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(ConfigError::MissingVar { key })
            } else {
                Ok(trimmed.to_string())
            }
        }
        Err(_) => Err(ConfigError::MissingVar { key }),
    }
}

fn get_optional_var(key: &'static str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub fn hydrate_env_file() -> Result<(), ConfigError> {
    if env::var_os("STREAMRICH_SKIP_DOTENV").is_some() {
        return Ok(());
    }
    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(ConfigError::Dotenv { source: err }),
    }

    Ok(())
}

/// Errors emitted when `.env` hydration or environment parsing fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable `{key}`")]
    MissingVar { key: &'static str },
    #[error("invalid integer in `{key}`: {source}")]
    InvalidNumber {
        key: &'static str,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to load .env file: {source}")]
    Dotenv {
        #[from]
        source: dotenvy::Error,
    },
}
