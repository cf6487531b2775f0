// # ipwatch-core
//
// Core library for the public IP change notifier.
//
// ## Architecture Overview
//
// - **AddressResolver**: Trait for looking up the current public address
// - **Notifier**: Trait for announcing a new address to a chat channel
// - **AddressStore**: Trait for persisting the last announced address
// - **ChatSource**: Trait for inbound chat lifecycle and message events
// - **ChangeDetector**: One check cycle: resolve → compare → announce → persist
// - **Scheduler**: Runs the detector on a fixed timer and on `!getip`
//
// ## Design Principles
//
// 1. **Never persist what was not announced**: a failed announcement leaves
//    the stored address untouched so the next cycle retries it
// 2. **Failures are values**: every cycle outcome is a typed result; nothing
//    in a cycle can stop the process
// 3. **Library-First**: the daemon is a thin wiring layer over this crate

pub mod config;
pub mod detector;
pub mod error;
pub mod scheduler;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::{NotifierConfig, ResolverConfig, StateStoreConfig, WatchConfig};
pub use detector::{AddressCheckResult, ChangeDetector, format_announcement};
pub use error::{CheckError, Error, NotifyError, ResolutionError, Result, StoreError};
pub use scheduler::{CHECK_INTERVAL, ON_DEMAND_COMMAND, Scheduler};
pub use state::{FileAddressStore, MemoryAddressStore};
pub use traits::{AddressResolver, AddressStore, ChannelId, ChatEvent, ChatSource, Notifier};
