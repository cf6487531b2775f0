//! Minimal Discord REST API v10 client
//!
//! Only the four calls the watcher needs:
//! - `GET /users/@me` (login check, bot tag)
//! - `GET /channels/{id}` (destination resolution)
//! - `POST /channels/{id}/messages` (announcement)
//! - `GET /channels/{id}/messages` (command polling)

use ipwatch_core::error::NotifyError;
use ipwatch_core::traits::ChannelId;
use ipwatch_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Discord API base URL
pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Channel types that cannot carry text messages
/// (category, directory, forum, media)
const NON_TEXT_CHANNEL_TYPES: &[u8] = &[4, 14, 15, 16];

/// Discord epoch (2015-01-01T00:00:00Z) in Unix milliseconds
const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

/// Smallest snowflake id that could be generated at `at`
pub(crate) fn snowflake_at(at: SystemTime) -> u64 {
    let unix_ms = at
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    unix_ms.saturating_sub(DISCORD_EPOCH_MS) << 22
}

/// The logged-in bot account
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BotUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub discriminator: Option<String>,
}

impl BotUser {
    /// `username#1234`, or just `username` for accounts without a discriminator
    pub fn tag(&self) -> String {
        match self.discriminator.as_deref() {
            Some(d) if !d.is_empty() && d != "0" => format!("{}#{}", self.username, d),
            _ => self.username.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Channel {
    #[serde(rename = "type")]
    pub kind: u8,
}

impl Channel {
    pub(crate) fn is_text_based(&self) -> bool {
        !NON_TEXT_CHANNEL_TYPES.contains(&self.kind)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Author {
    pub username: String,
    #[serde(default)]
    pub bot: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Message {
    pub id: String,
    #[serde(default)]
    pub content: String,
    pub author: Author,
}

impl Message {
    /// Snowflake ids grow with time; unparseable ids sort first
    pub(crate) fn snowflake(&self) -> u64 {
        self.id.parse().unwrap_or(0)
    }
}

#[derive(Serialize)]
struct CreateMessage<'a> {
    content: &'a str,
}

/// Discord REST client
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the bot token.
#[derive(Clone)]
pub struct DiscordClient {
    /// Bot token
    /// ⚠️ NEVER log this value
    token: String,

    /// API base URL (overridable for tests)
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the bot token
impl std::fmt::Debug for DiscordClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordClient")
            .field("token", &"<REDACTED>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl DiscordClient {
    /// Create a client against the public Discord API
    ///
    /// Fails with a configuration error if the token is empty.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_api_base(token, DISCORD_API_BASE)
    }

    /// Create a client against a custom API base URL
    pub fn with_api_base(token: impl Into<String>, api_base: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(Error::config("Discord bot token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            token,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.token)
    }

    /// Validate the token and return the bot account
    ///
    /// ```http
    /// GET /users/@me
    /// Authorization: Bot <token>
    /// ```
    pub async fn current_user(&self) -> Result<BotUser> {
        let response = self
            .client
            .get(self.url("/users/@me"))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await
            .map_err(|e| Error::chat(format!("Login request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                401 | 403 => Error::chat(format!(
                    "Login failed: invalid bot token. Status: {}",
                    status
                )),
                _ => Error::chat(format!("Login failed. Status: {}", status)),
            });
        }

        response
            .json::<BotUser>()
            .await
            .map_err(|e| Error::chat(format!("Failed to parse login response: {}", e)))
    }

    /// Resolve a channel and check it can carry text
    pub(crate) async fn text_channel(
        &self,
        channel_id: &ChannelId,
    ) -> std::result::Result<Channel, NotifyError> {
        let response = self
            .client
            .get(self.url(&format!("/channels/{}", channel_id)))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await
            .map_err(|e| {
                NotifyError::DestinationUnavailable(format!(
                    "channel {} lookup failed: {}",
                    channel_id, e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::DestinationUnavailable(match status.as_u16() {
                404 => format!("channel {} not found", channel_id),
                401 | 403 => format!("no access to channel {}. Status: {}", channel_id, status),
                _ => format!("channel {} lookup failed. Status: {}", channel_id, status),
            }));
        }

        let channel: Channel = response.json().await.map_err(|e| {
            NotifyError::DestinationUnavailable(format!(
                "channel {} lookup returned an invalid body: {}",
                channel_id, e
            ))
        })?;

        if !channel.is_text_based() {
            return Err(NotifyError::DestinationUnavailable(format!(
                "channel {} (type {}) cannot carry text messages",
                channel_id, channel.kind
            )));
        }

        Ok(channel)
    }

    /// Post a text message
    pub(crate) async fn create_message(
        &self,
        channel_id: &ChannelId,
        content: &str,
    ) -> std::result::Result<(), NotifyError> {
        let response = self
            .client
            .post(self.url(&format!("/channels/{}/messages", channel_id)))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .json(&CreateMessage { content })
            .send()
            .await
            .map_err(|e| NotifyError::DeliveryFailed(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(NotifyError::DeliveryFailed(match status.as_u16() {
                429 => format!("rate limited. Status: {}", status),
                _ => format!("{} - {}", status, error_text),
            }));
        }

        Ok(())
    }

    /// List recent messages, oldest first
    ///
    /// With `after`, only messages newer than that id are returned.
    pub(crate) async fn messages(
        &self,
        channel_id: &ChannelId,
        after: Option<&str>,
        limit: u8,
    ) -> Result<Vec<Message>> {
        let mut request = self
            .client
            .get(self.url(&format!("/channels/{}/messages", channel_id)))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .query(&[("limit", limit.to_string())]);
        if let Some(after) = after {
            request = request.query(&[("after", after)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::chat(format!("Message poll failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::chat(format!("Message poll failed. Status: {}", status)));
        }

        let mut messages: Vec<Message> = response
            .json()
            .await
            .map_err(|e| Error::chat(format!("Failed to parse messages: {}", e)))?;
        messages.sort_by_key(Message::snowflake);
        Ok(messages)
    }
}
