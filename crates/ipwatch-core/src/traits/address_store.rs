// # Address Store Trait
//
// Defines the interface for persisting the last announced address.
//
// ## Purpose
//
// The store is what keeps a restart from re-announcing an unchanged address.
// It holds exactly one optional value and owns both the durable copy and the
// in-memory cached copy of it.
//
// ## Implementations
//
// - File-based: plain text file (`FileAddressStore`)
// - In-memory: `MemoryAddressStore` (tests, embedding)
//
// ## Usage
//
// ```rust,ignore
// use ipwatch_core::AddressStore;
//
// let store = /* AddressStore implementation */;
//
// if store.last_known().await.as_deref() != Some("203.0.113.5") {
//     // announce, then:
//     store.save("203.0.113.5").await?;
// }
// ```

use async_trait::async_trait;

use crate::error::StoreError;

/// Trait for last-known address storage
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks. The
/// last `save()` to complete wins.
///
/// # Trust Level: Trusted (Core Component)
///
/// ## Allowed Capabilities
/// - ✅ Perform I/O against its own storage location
/// - ✅ Cache the single value in memory
///
/// ## Forbidden Capabilities
/// - ❌ Decide whether an address is new (owned by `ChangeDetector`)
/// - ❌ Announce anything (owned by `Notifier`)
///
/// ## Atomicity
///
/// `save()` must never leave a partially written value that could be read
/// back as a different valid address. Write-to-temp-then-rename satisfies
/// this.
#[async_trait]
pub trait AddressStore: Send + Sync {
    /// Read the persisted address from durable storage
    ///
    /// Refreshes the cached value on success.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(address))`: A previously saved address
    /// - `Ok(None)`: No prior address is known
    /// - `Err(StoreError::Read)`: Storage exists but is unreadable or corrupt
    async fn load(&self) -> Result<Option<String>, StoreError>;

    /// The cached last-known address, without touching storage
    async fn last_known(&self) -> Option<String>;

    /// Overwrite the persisted address
    ///
    /// The cached value is updated only after the write succeeds, so the
    /// cache never holds an address that failed to persist.
    async fn save(&self, address: &str) -> Result<(), StoreError>;
}
