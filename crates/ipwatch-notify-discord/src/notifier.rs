use async_trait::async_trait;
use ipwatch_core::error::NotifyError;
use ipwatch_core::traits::{ChannelId, Notifier};

use crate::client::DiscordClient;

/// Posts announcements to a Discord text channel
///
/// Every call resolves the channel first; the message is only posted when
/// the channel exists and can carry text.
#[derive(Debug, Clone)]
pub struct DiscordNotifier {
    client: DiscordClient,
}

impl DiscordNotifier {
    pub fn new(client: DiscordClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, destination: &ChannelId, message: &str) -> Result<(), NotifyError> {
        self.client.text_channel(destination).await?;
        self.client.create_message(destination, message).await?;
        tracing::trace!("Posted message to channel {}", destination);
        Ok(())
    }

    fn notifier_name(&self) -> &'static str {
        "discord"
    }
}
