//! Test doubles and common utilities for contract tests
//!
//! These doubles record every call so tests can assert on what the detector
//! did, not on log text.

#![allow(dead_code)]

use async_trait::async_trait;
use ipwatch_core::error::{NotifyError, ResolutionError, StoreError};
use ipwatch_core::traits::{
    AddressResolver, AddressStore, ChannelId, ChatEvent, ChatEventStream, ChatSource, Notifier,
};
use ipwatch_core::{ChangeDetector, MemoryAddressStore};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

pub const CHANNEL: &str = "123456789012345678";

/// A resolver that replays scripted results, then repeats a fallback
#[derive(Clone)]
pub struct ScriptedResolver {
    script: Arc<Mutex<VecDeque<Result<String, ResolutionError>>>>,
    fallback: Arc<Mutex<Result<String, ResolutionError>>>,
    calls: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

impl ScriptedResolver {
    /// Always resolve to `address`
    pub fn fixed(address: &str) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback: Arc::new(Mutex::new(Ok(address.to_string()))),
            calls: Arc::new(AtomicUsize::new(0)),
            delay: None,
        }
    }

    /// Resolve to each address in turn, then keep returning the last one
    pub fn sequence(addresses: &[&str]) -> Self {
        let resolver = Self::fixed(addresses.last().copied().unwrap_or("0.0.0.0"));
        {
            let mut script = resolver.script.lock().unwrap();
            for address in addresses {
                script.push_back(Ok(address.to_string()));
            }
        }
        resolver
    }

    /// Always fail with `error`
    pub fn failing(error: ResolutionError) -> Self {
        let resolver = Self::fixed("0.0.0.0");
        *resolver.fallback.lock().unwrap() = Err(error);
        resolver
    }

    /// Sleep before answering (to hold a cycle in flight)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Change what subsequent calls return
    pub fn set(&self, result: Result<String, ResolutionError>) {
        self.script.lock().unwrap().clear();
        *self.fallback.lock().unwrap() = result;
    }

    /// Get the number of times resolve() was called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AddressResolver for ScriptedResolver {
    async fn resolve(&self) -> Result<String, ResolutionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.lock().unwrap().clone())
    }

    fn resolver_name(&self) -> &'static str {
        "scripted"
    }
}

/// A notifier that records messages and can be told to fail
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(ChannelId, String)>>>,
    failure: Arc<Mutex<Option<NotifyError>>>,
    attempts: Arc<AtomicUsize>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent notify() calls fail with `error` (or succeed with `None`)
    pub fn fail_with(&self, error: Option<NotifyError>) {
        *self.failure.lock().unwrap() = error;
    }

    /// Messages that were successfully delivered
    pub fn sent(&self) -> Vec<(ChannelId, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Number of notify() calls, successful or not
    pub fn attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, destination: &ChannelId, message: &str) -> Result<(), NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }
        self.sent
            .lock()
            .unwrap()
            .push((destination.clone(), message.to_string()));
        Ok(())
    }

    fn notifier_name(&self) -> &'static str {
        "recording"
    }
}

/// A store wrapper that counts writes and can be told to fail them
#[derive(Clone, Default)]
pub struct CountingStore {
    inner: MemoryAddressStore,
    saves: Arc<AtomicUsize>,
    fail_saves: Arc<AtomicBool>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_address(address: &str) -> Self {
        Self {
            inner: MemoryAddressStore::with_address(address),
            ..Self::default()
        }
    }

    /// Get the number of successful save() calls
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub async fn stored(&self) -> Option<String> {
        self.inner.last_known().await
    }
}

#[async_trait]
impl AddressStore for CountingStore {
    async fn load(&self) -> Result<Option<String>, StoreError> {
        self.inner.load().await
    }

    async fn last_known(&self) -> Option<String> {
        self.inner.last_known().await
    }

    async fn save(&self, address: &str) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Write {
                path: "last_ip.txt".into(),
                source: std::io::Error::other("disk full"),
            });
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save(address).await
    }
}

/// A chat source driven by the test through a channel
pub struct ControlledChatSource {
    rx: Mutex<Option<mpsc::UnboundedReceiver<ChatEvent>>>,
}

impl ControlledChatSource {
    pub fn new() -> (Self, mpsc::UnboundedSender<ChatEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                rx: Mutex::new(Some(rx)),
            },
            tx,
        )
    }
}

impl ChatSource for ControlledChatSource {
    fn events(&self) -> ChatEventStream {
        let rx = self
            .rx
            .lock()
            .unwrap()
            .take()
            .expect("events() can only be called once");
        Box::pin(tokio_stream::wrappers::UnboundedReceiverStream::new(rx))
    }
}

/// Handles to the doubles behind a detector
pub struct Harness {
    pub resolver: ScriptedResolver,
    pub notifier: RecordingNotifier,
    pub store: CountingStore,
    pub detector: Arc<ChangeDetector>,
}

impl Harness {
    pub fn new(resolver: ScriptedResolver, store: CountingStore) -> Self {
        let notifier = RecordingNotifier::new();
        let detector = Arc::new(ChangeDetector::new(
            Box::new(resolver.clone()),
            Box::new(notifier.clone()),
            Box::new(store.clone()),
            ChannelId::new(CHANNEL),
        ));
        Self {
            resolver,
            notifier,
            store,
            detector,
        }
    }
}
