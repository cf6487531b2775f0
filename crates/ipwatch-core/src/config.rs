//! Configuration types for the IP watcher
//!
//! The check interval is fixed ([`crate::scheduler::CHECK_INTERVAL`]) and is
//! intentionally not part of the configuration.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::traits::ChannelId;

/// Default IP-echo service (JSON body `{"ip": "..."}`)
pub const DEFAULT_LOOKUP_URL: &str = "https://api.ipify.org?format=json";

/// Default lookup request timeout in seconds
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;

/// Main watcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Public address lookup
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Announcement destination and credentials
    pub notifier: NotifierConfig,

    /// Where the last-known address is kept
    #[serde(default)]
    pub state_store: StateStoreConfig,
}

impl WatchConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.resolver.validate()?;
        self.notifier.validate()?;
        self.state_store.validate()?;
        Ok(())
    }
}

/// Address lookup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// IP-echo service URL
    #[serde(default = "default_lookup_url")]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_lookup_timeout_secs")]
    pub timeout_secs: u64,
}

impl ResolverConfig {
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.url.is_empty() {
            return Err(crate::Error::config("Lookup URL cannot be empty"));
        }
        if !self.url.starts_with("https://") && !self.url.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "Lookup URL must use HTTP or HTTPS scheme. Got: {}",
                self.url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Lookup timeout must be > 0"));
        }
        Ok(())
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            url: default_lookup_url(),
            timeout_secs: default_lookup_timeout_secs(),
        }
    }
}

fn default_lookup_url() -> String {
    DEFAULT_LOOKUP_URL.to_string()
}

fn default_lookup_timeout_secs() -> u64 {
    DEFAULT_LOOKUP_TIMEOUT_SECS
}

/// Messaging platform configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotifierConfig {
    /// Discord bot
    Discord {
        /// Bot token
        /// ⚠️ NEVER log this value
        bot_token: String,
        /// Channel that receives announcements and commands
        channel_id: ChannelId,
    },
}

impl NotifierConfig {
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            NotifierConfig::Discord {
                bot_token,
                channel_id,
            } => {
                if bot_token.is_empty() {
                    return Err(crate::Error::config("BOT_TOKEN cannot be empty"));
                }
                if channel_id.as_str().is_empty() {
                    return Err(crate::Error::config("CHANNEL_ID cannot be empty"));
                }
                Ok(())
            }
        }
    }

    /// Destination channel for announcements
    pub fn channel_id(&self) -> &ChannelId {
        match self {
            NotifierConfig::Discord { channel_id, .. } => channel_id,
        }
    }
}

// Custom Debug implementation that hides the bot token
impl fmt::Debug for NotifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifierConfig::Discord { channel_id, .. } => f
                .debug_struct("Discord")
                .field("bot_token", &"<REDACTED>")
                .field("channel_id", channel_id)
                .finish(),
        }
    }
}

/// Address store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateStoreConfig {
    /// Plain text file
    File {
        /// Path to the state file
        path: String,
    },

    /// In-memory store (not persistent)
    Memory,
}

impl StateStoreConfig {
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StateStoreConfig::File { path } if path.is_empty() => {
                Err(crate::Error::config("State file path cannot be empty"))
            }
            _ => Ok(()),
        }
    }
}

impl Default for StateStoreConfig {
    fn default() -> Self {
        StateStoreConfig::File {
            path: crate::state::DEFAULT_STATE_FILE.to_string(),
        }
    }
}
