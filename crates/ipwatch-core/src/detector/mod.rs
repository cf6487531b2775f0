//! Change detection
//!
//! The ChangeDetector is responsible for one check cycle:
//! - Resolving the current public address via AddressResolver
//! - Comparing it against the AddressStore's last-known value
//! - Announcing a changed address via Notifier
//! - Persisting the address only after a successful announcement
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ AddressResolver │─── current address ───┐
//! └─────────────────┘                       │
//!                                           ▼
//!                                  ┌────────────────┐
//!                                  │ ChangeDetector │
//!                                  └────────────────┘
//!                                           │
//!                     ┌─────────────────────┴─────────────────────┐
//!                     ▼                                           ▼
//!             ┌──────────────┐                           ┌──────────────┐
//!             │   Notifier   │ ── on success only ──────▶│ AddressStore │
//!             │  (announce)  │                           │   (save)     │
//!             └──────────────┘                           └──────────────┘
//! ```
//!
//! ## State Machine
//!
//! `Unknown → Known(X)` on the first announce+persist, `Known(X) → Known(Y)`
//! on announce+persist of a different value. Resolution and notify failures
//! cause no transition, so the next cycle retries the same announcement.
//!
//! An address that was announced but could not be saved is remembered by the
//! detector for the rest of the process. Later cycles treat it as known and
//! only retry the save, so a read-only state location costs one duplicate
//! announcement per restart instead of one per cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::error::CheckError;
use crate::traits::{AddressResolver, AddressStore, ChannelId, Notifier};

/// Announcement text for a newly observed address
pub fn format_announcement(address: &str) -> String {
    format!("\u{2139}\u{fe0f} Server current IP is `{}`", address)
}

/// Outcome of a completed check cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressCheckResult {
    /// The address reported by the resolver
    pub current_address: String,
    /// Whether the address differed from the last-known one (and was announced)
    pub changed: bool,
    /// Whether the store holds `current_address` after the cycle
    ///
    /// `false` only while an announced address has not been saved yet.
    pub persisted: bool,
}

impl AddressCheckResult {
    fn unchanged(current_address: String, persisted: bool) -> Self {
        Self {
            current_address,
            changed: false,
            persisted,
        }
    }

    fn announced(current_address: String, persisted: bool) -> Self {
        Self {
            current_address,
            changed: true,
            persisted,
        }
    }
}

/// Check cycle orchestrator
///
/// ## Concurrency
///
/// A single-flight guard rejects a cycle that starts while another is still
/// in flight with [`CheckError::AlreadyRunning`]. The guard is a flag, so no
/// lock is held across the network calls.
pub struct ChangeDetector {
    /// Public address lookup
    resolver: Box<dyn AddressResolver>,

    /// Announcement delivery
    notifier: Box<dyn Notifier>,

    /// Last-known address storage
    store: Box<dyn AddressStore>,

    /// Where announcements go
    destination: ChannelId,

    in_flight: AtomicBool,

    /// Announced address whose save failed
    unsaved: Mutex<Option<String>>,
}

impl ChangeDetector {
    /// Create a new change detector
    ///
    /// The store should already hold the value loaded at startup.
    pub fn new(
        resolver: Box<dyn AddressResolver>,
        notifier: Box<dyn Notifier>,
        store: Box<dyn AddressStore>,
        destination: ChannelId,
    ) -> Self {
        Self {
            resolver,
            notifier,
            store,
            destination,
            in_flight: AtomicBool::new(false),
            unsaved: Mutex::new(None),
        }
    }

    /// The last announced address
    ///
    /// Includes an announced address the store failed to save.
    pub async fn last_known(&self) -> Option<String> {
        match self.unsaved.lock().await.clone() {
            Some(address) => Some(address),
            None => self.store.last_known().await,
        }
    }

    /// Save `address` and track whether it is still unsaved
    async fn persist(&self, address: &str) -> bool {
        match self.store.save(address).await {
            Ok(()) => {
                *self.unsaved.lock().await = None;
                true
            }
            Err(e) => {
                warn!(
                    "IP address {} was announced but could not be persisted: {}. \
                     It will be announced again after a restart.",
                    address, e
                );
                *self.unsaved.lock().await = Some(address.to_string());
                false
            }
        }
    }

    /// Run one check cycle
    ///
    /// # Returns
    ///
    /// - `Ok(AddressCheckResult)`: The cycle completed (changed or not)
    /// - `Err(CheckError::Resolution)`: Lookup failed, nothing changed
    /// - `Err(CheckError::Notify)`: Announcement failed, nothing persisted
    /// - `Err(CheckError::AlreadyRunning)`: Another cycle is in flight
    pub async fn check_and_notify(&self) -> Result<AddressCheckResult, CheckError> {
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or_else(|| {
            debug!("Check already in progress, skipping");
            CheckError::AlreadyRunning
        })?;

        let current = match self.resolver.resolve().await {
            Ok(address) => address,
            Err(e) => {
                error!(
                    "Failed to get IP address from {}: {}",
                    self.resolver.resolver_name(),
                    e
                );
                return Err(e.into());
            }
        };

        let last = self.last_known().await;
        if last.as_deref() == Some(current.as_str()) {
            info!("IP address unchanged: {}", current);
            let persisted = if self.unsaved.lock().await.is_some() {
                self.persist(&current).await
            } else {
                true
            };
            return Ok(AddressCheckResult::unchanged(current, persisted));
        }

        debug!(
            "IP address changed: {} -> {}",
            last.as_deref().unwrap_or("None"),
            current
        );

        let message = format_announcement(&current);
        if let Err(e) = self.notifier.notify(&self.destination, &message).await {
            error!(
                "Failed to announce IP address {} via {}: {}",
                current,
                self.notifier.notifier_name(),
                e
            );
            return Err(e.into());
        }

        info!(
            "Sent new IP address to channel {}: {}",
            self.destination, current
        );

        let persisted = self.persist(&current).await;

        Ok(AddressCheckResult::announced(current, persisted))
    }
}

/// Releases the in-flight flag when a cycle ends, including early returns
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
