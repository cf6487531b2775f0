//! Environment configuration for the daemon

use anyhow::Result;
use ipwatch_core::config::{
    DEFAULT_LOOKUP_TIMEOUT_SECS, DEFAULT_LOOKUP_URL, NotifierConfig, ResolverConfig,
    StateStoreConfig, WatchConfig,
};
use ipwatch_core::state::DEFAULT_STATE_FILE;
use ipwatch_core::traits::ChannelId;
use tracing::Level;

/// Daemon configuration
pub struct Config {
    pub bot_token: String,
    pub channel_id: String,
    pub state_path: String,
    pub lookup_url: String,
    pub log_level: String,
}

impl Config {
    /// Load configuration from the process environment (and `.env`)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            match lookup(key) {
                Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
                _ => anyhow::bail!(
                    "{} is required. Set it via: export {}=...",
                    key,
                    key
                ),
            }
        };

        Ok(Self {
            bot_token: required("BOT_TOKEN")?,
            channel_id: required("CHANNEL_ID")?,
            state_path: lookup("IPWATCH_STATE_PATH")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_STATE_FILE.to_string()),
            lookup_url: lookup("IPWATCH_LOOKUP_URL")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_LOOKUP_URL.to_string()),
            log_level: lookup("IPWATCH_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.channel_id.chars().all(|c| c.is_ascii_digit()) {
            anyhow::bail!(
                "CHANNEL_ID must be a numeric Discord channel id. Got: {}",
                self.channel_id
            );
        }

        self.log_level()?;
        self.watch_config().validate()?;
        Ok(())
    }

    /// Maximum log level
    pub fn log_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "IPWATCH_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }

    /// Library configuration for the watcher components
    pub fn watch_config(&self) -> WatchConfig {
        WatchConfig {
            resolver: ResolverConfig {
                url: self.lookup_url.clone(),
                timeout_secs: DEFAULT_LOOKUP_TIMEOUT_SECS,
            },
            notifier: NotifierConfig::Discord {
                bot_token: self.bot_token.clone(),
                channel_id: ChannelId::new(self.channel_id.clone()),
            },
            state_store: StateStoreConfig::File {
                path: self.state_path.clone(),
            },
        }
    }
}
