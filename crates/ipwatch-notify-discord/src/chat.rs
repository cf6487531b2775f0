use ipwatch_core::traits::{ChannelId, ChatEvent, ChatEventStream, ChatSource, InboundMessage};
use ipwatch_core::Result;
use std::time::{Duration, SystemTime};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::client::{BotUser, DiscordClient, snowflake_at};

/// Default interval between message polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Maximum page size accepted by the messages endpoint
const POLL_PAGE_SIZE: u8 = 50;

/// Inbound chat events from one Discord channel, by REST polling
///
/// The stream yields [`ChatEvent::Ready`] first, then every message posted
/// in the channel after the stream was opened. Earlier history is never
/// replayed. If the channel cannot be read when the stream opens, messages
/// are taken from the current time on.
#[derive(Debug, Clone)]
pub struct DiscordChatSource {
    client: DiscordClient,
    channel_id: ChannelId,
    user: BotUser,
    poll_interval: Duration,
}

impl DiscordChatSource {
    /// Log in and prepare to listen on `channel_id`
    ///
    /// Fails if the token is rejected.
    pub async fn connect(client: DiscordClient, channel_id: ChannelId) -> Result<Self> {
        let user = client.current_user().await?;
        tracing::debug!("Authenticated as {} ({})", user.tag(), user.id);

        Ok(Self {
            client,
            channel_id,
            user,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Set a custom poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// The logged-in bot account
    pub fn user(&self) -> &BotUser {
        &self.user
    }
}

impl ChatSource for DiscordChatSource {
    fn events(&self) -> ChatEventStream {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

        let client = self.client.clone();
        let channel_id = self.channel_id.clone();
        let poll_interval = self.poll_interval;
        let tag = self.user.tag();

        tokio::spawn(async move {
            // Baseline before Ready: anything posted after Ready is delivered
            let opened_at = SystemTime::now();
            let mut cursor = match client.messages(&channel_id, None, 1).await {
                Ok(messages) => messages
                    .last()
                    .map(|m| m.id.clone())
                    .unwrap_or_else(|| "0".to_string()),
                Err(e) => {
                    tracing::warn!(
                        "Failed to read channel {}: {}. Listening from the current time.",
                        channel_id,
                        e
                    );
                    snowflake_at(opened_at).to_string()
                }
            };

            if tx.send(ChatEvent::Ready { user: tag }).is_err() {
                return;
            }

            tracing::debug!(
                "Listening for commands in channel {} (interval={:?})",
                channel_id,
                poll_interval
            );

            loop {
                tokio::time::sleep(poll_interval).await;

                let messages = match client
                    .messages(&channel_id, Some(&cursor), POLL_PAGE_SIZE)
                    .await
                {
                    Ok(messages) => messages,
                    Err(e) => {
                        tracing::warn!("Failed to poll channel {}: {}", channel_id, e);
                        if tx.is_closed() {
                            break;
                        }
                        continue;
                    }
                };

                for message in messages {
                    cursor = message.id.clone();
                    let mut inbound = InboundMessage::new(message.author.username, message.content);
                    if message.author.bot {
                        inbound = inbound.from_bot();
                    }
                    if tx.send(ChatEvent::Message(inbound)).is_err() {
                        tracing::debug!("Receiver dropped, stopping channel poll");
                        return;
                    }
                }

                if tx.is_closed() {
                    break;
                }
            }
        });

        Box::pin(UnboundedReceiverStream::new(rx))
    }
}
