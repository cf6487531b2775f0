// # File Address Store
//
// File-based implementation of AddressStore.
//
// ## Purpose
//
// Keeps the last announced address across restarts so an unchanged address
// is not announced again.
//
// ## Crash Safety
//
// - Atomic writes: the address is written to a temporary file, synced, then
//   renamed over the real file
// - Unreadable or corrupt files are logged and treated as "no prior address"
//   at startup; losing one announcement cycle beats refusing to start
//
// ## File Format
//
// The address as plain text. Surrounding whitespace is ignored on load and an
// empty file means "absent":
//
// ```text
// 203.0.113.5
// ```

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::Error;
use crate::error::StoreError;
use crate::traits::address_store::AddressStore;

/// Default file name used when no path is configured
pub const DEFAULT_STATE_FILE: &str = "last_ip.txt";

/// File-based address store
///
/// # Example
///
/// ```rust,no_run
/// use ipwatch_core::state::FileAddressStore;
/// use ipwatch_core::traits::AddressStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileAddressStore::open("/var/lib/ipwatch/last_ip.txt").await?;
///
///     store.save("203.0.113.5").await?;
///     assert_eq!(store.last_known().await.as_deref(), Some("203.0.113.5"));
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileAddressStore {
    path: PathBuf,
    cached: Arc<RwLock<Option<String>>>,
}

impl FileAddressStore {
    /// Open a file address store and load the persisted address
    ///
    /// This will:
    /// 1. Create parent directories if needed
    /// 2. Load the existing address, if any
    /// 3. On a read error, log it and start with no known address
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create state directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let initial = match Self::read_address(&path).await {
            Ok(Some(address)) => {
                tracing::info!("Loaded last known IP address: {}", address);
                Some(address)
            }
            Ok(None) => {
                tracing::debug!("No previous IP address recorded at {}", path.display());
                None
            }
            Err(e) => {
                tracing::warn!("{}. Starting with no known IP address.", e);
                None
            }
        };

        Ok(Self {
            path,
            cached: Arc::new(RwLock::new(initial)),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_address(path: &Path) -> Result<Option<String>, StoreError> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let content = String::from_utf8(bytes).map_err(|e| StoreError::Read {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;

        let address = content.trim();
        if address.is_empty() {
            Ok(None)
        } else {
            Ok(Some(address.to_string()))
        }
    }

    async fn write_address(&self, address: &str) -> Result<(), StoreError> {
        let temp_path = self.temp_path();
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        let written = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(address.as_bytes()).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path).await;
            return Err(write_err(e));
        }

        fs::rename(&temp_path, &self.path).await.map_err(write_err)?;

        tracing::trace!("Address written to {}", self.path.display());
        Ok(())
    }

    /// Sibling of the state file: `last_ip.txt` -> `last_ip.txt.tmp`
    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        PathBuf::from(temp)
    }
}

#[async_trait]
impl AddressStore for FileAddressStore {
    async fn load(&self) -> Result<Option<String>, StoreError> {
        let address = Self::read_address(&self.path).await?;
        *self.cached.write().await = address.clone();
        Ok(address)
    }

    async fn last_known(&self) -> Option<String> {
        self.cached.read().await.clone()
    }

    async fn save(&self, address: &str) -> Result<(), StoreError> {
        self.write_address(address).await?;
        *self.cached.write().await = Some(address.to_string());
        Ok(())
    }
}
