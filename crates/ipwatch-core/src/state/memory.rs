// # Memory Address Store
//
// In-memory implementation of AddressStore.
//
// ## Crash Behavior
//
// - The address is lost on restart
// - The first cycle after a restart always announces
//
// ## When to Use
//
// - Tests
// - Embedding where a repeated first announcement is harmless

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::traits::address_store::AddressStore;

/// In-memory address store
///
/// Clones share the same value, so a test can keep a handle while the
/// detector owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryAddressStore {
    inner: Arc<RwLock<Option<String>>>,
}

impl MemoryAddressStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already knows `address`
    pub fn with_address(address: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(address.into()))),
        }
    }

    /// Forget the stored address
    pub async fn clear(&self) {
        *self.inner.write().await = None;
    }
}

#[async_trait]
impl AddressStore for MemoryAddressStore {
    async fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.inner.read().await.clone())
    }

    async fn last_known(&self) -> Option<String> {
        self.inner.read().await.clone()
    }

    async fn save(&self, address: &str) -> Result<(), StoreError> {
        *self.inner.write().await = Some(address.to_string());
        Ok(())
    }
}
