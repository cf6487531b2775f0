//! Core traits for the IP watcher
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`AddressResolver`]: Look up the current public address
//! - [`Notifier`]: Deliver announcements to a chat destination
//! - [`AddressStore`]: Persist the last announced address
//! - [`ChatSource`]: Inbound lifecycle and message events from the chat platform

pub mod address_resolver;
pub mod address_store;
pub mod chat_source;
pub mod notifier;

pub use address_resolver::AddressResolver;
pub use address_store::AddressStore;
pub use chat_source::{ChatEvent, ChatEventStream, ChatSource, InboundMessage};
pub use notifier::{ChannelId, Notifier};
