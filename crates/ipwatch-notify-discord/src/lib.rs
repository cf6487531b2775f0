// # Discord Integration
//
// This crate connects ipwatch to Discord through the REST API v10.
//
// ## Components
//
// - `DiscordClient`: authenticated HTTP client (bot token)
// - `DiscordNotifier`: implements `Notifier`; posts announcements
// - `DiscordChatSource`: implements `ChatSource`; login plus command polling
//
// ## Constraints
//
// - ✅ Token never appears in Debug output or logs
// - ✅ Channel is resolved and checked for text capability before each post
// - ✅ Only messages newer than the session start are delivered
// - ❌ NO gateway (websocket) connection
// - ❌ NO retries (the scheduler's next cycle is the retry)

mod chat;
mod client;
mod notifier;

pub use chat::{DEFAULT_POLL_INTERVAL, DiscordChatSource};
pub use client::{BotUser, DISCORD_API_BASE, DiscordClient};
pub use notifier::DiscordNotifier;
