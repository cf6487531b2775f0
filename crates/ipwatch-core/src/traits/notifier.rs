// # Notifier Trait
//
// Defines the interface for delivering announcements to a messaging platform.
//
// ## Implementations
//
// - Discord: `ipwatch-notify-discord` crate

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::NotifyError;

/// Identifier of a destination channel on the messaging platform
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Trait for announcement delivery
///
/// # Contract
///
/// - The destination is resolved before anything is sent. If it cannot be
///   resolved, or it is not capable of carrying text, the call fails with
///   [`NotifyError::DestinationUnavailable`] and performs no send.
/// - A successful call makes exactly one message visible in the destination.
/// - No retries: the caller decides what a failure means.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `message` to `destination`
    async fn notify(&self, destination: &ChannelId, message: &str) -> Result<(), NotifyError>;

    /// Name of the messaging platform, for logging
    fn notifier_name(&self) -> &'static str {
        "unknown"
    }
}
