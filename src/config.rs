//! Runtime configuration read from the process environment.
//!
//! `main` loads a `.env` file with `dotenv` first, so everything here only
//! ever looks at environment variables.

use std::env;
use std::time::Duration;

use humantime_serde::re::humantime;
use thiserror::Error;
use url::Url;

const DEFAULT_PREFIX: &str = "!";
const DEFAULT_NODE_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// How to reach the Lavalink node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeConfig {
    /// `host:port` of the node.
    pub host: String,
    pub password: String,
    pub secure: bool,
    pub request_timeout: Duration,
}

impl NodeConfig {
    /// Base URL for the node's REST API.
    pub fn rest_url(&self) -> Result<Url, url::ParseError> {
        let scheme = if self.secure { "https" } else { "http" };
        Url::parse(&format!("{}://{}", scheme, self.host))
    }

    /// URL of the node's websocket endpoint.
    pub fn websocket_url(&self) -> Result<Url, url::ParseError> {
        let scheme = if self.secure { "wss" } else { "ws" };
        Url::parse(&format!("{}://{}/v4/websocket", scheme, self.host))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub discord_token: String,
    pub prefix: String,
    pub command_timeout: Duration,
    pub node: NodeConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let duration = |key: &'static str, default: Duration| match lookup(key) {
            Some(raw) => humantime::parse_duration(raw.trim()).map_err(|e| ConfigError::Invalid {
                key,
                reason: e.to_string(),
            }),
            None => Ok(default),
        };

        let secure = match lookup("LAVALINK_SECURE") {
            Some(raw) => raw
                .trim()
                .parse::<bool>()
                .map_err(|e| ConfigError::Invalid {
                    key: "LAVALINK_SECURE",
                    reason: e.to_string(),
                })?,
            None => false,
        };

        let prefix = lookup("BOT_PREFIX")
            .filter(|prefix| !prefix.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string());

        Ok(Self {
            discord_token: required("DISCORD_TOKEN")?,
            prefix,
            command_timeout: duration("COMMAND_TIMEOUT", DEFAULT_COMMAND_TIMEOUT)?,
            node: NodeConfig {
                host: required("LAVALINK_HOST")?,
                password: required("LAVALINK_PASSWORD")?,
                secure,
                request_timeout: duration("NODE_REQUEST_TIMEOUT", DEFAULT_NODE_TIMEOUT)?,
            },
        })
    }
}
