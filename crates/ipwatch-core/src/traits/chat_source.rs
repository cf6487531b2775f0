// # Chat Source Trait
//
// Defines the inbound side of the messaging platform: a lifecycle "ready"
// signal followed by the messages users post.
//
// ## Implementations
//
// - Discord REST polling: `ipwatch-notify-discord` crate

use std::pin::Pin;
use tokio_stream::Stream;

/// A message received from the chat platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Display name of the sender
    pub author: String,
    /// Whether the sender is a bot account
    pub author_is_bot: bool,
    /// Raw message text
    pub content: String,
}

impl InboundMessage {
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            author_is_bot: false,
            content: content.into(),
        }
    }

    /// Mark the sender as a bot account
    pub fn from_bot(mut self) -> Self {
        self.author_is_bot = true;
        self
    }
}

/// Events produced by a [`ChatSource`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// The session is established and messages can be sent
    Ready {
        /// Tag of the logged-in account
        user: String,
    },
    /// A message was posted
    Message(InboundMessage),
}

/// Boxed stream of chat events
pub type ChatEventStream = Pin<Box<dyn Stream<Item = ChatEvent> + Send + 'static>>;

/// Trait for inbound chat event sources
///
/// # Behavior
///
/// - Yields [`ChatEvent::Ready`] once the session is usable, before any
///   message event
/// - Runs indefinitely under normal conditions
/// - Must be cancellation-safe (dropping the stream cleans up resources)
pub trait ChatSource: Send + Sync {
    /// Subscribe to chat events
    fn events(&self) -> ChatEventStream;
}
