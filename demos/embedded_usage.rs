//! Minimal embedding example for ipwatch-core
//!
//! Runs the scheduler with in-process components: an address source the
//! application controls, a notifier that prints to stdout, and a chat source
//! fed from a channel. The application decides when the run ends.

use ipwatch_core::error::{NotifyError, ResolutionError};
use ipwatch_core::traits::{
    AddressResolver, AddressStore, ChannelId, ChatEvent, ChatEventStream, ChatSource,
    InboundMessage, Notifier,
};
use ipwatch_core::{ChangeDetector, MemoryAddressStore, Result, Scheduler};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Address source the application can change at will
#[derive(Clone)]
struct EmbeddedResolver {
    address: Arc<Mutex<String>>,
}

impl EmbeddedResolver {
    fn new(address: &str) -> Self {
        Self {
            address: Arc::new(Mutex::new(address.to_string())),
        }
    }

    /// Simulate a new public address
    fn set(&self, address: &str) {
        if let Ok(mut current) = self.address.lock() {
            *current = address.to_string();
        }
    }
}

#[async_trait::async_trait]
impl AddressResolver for EmbeddedResolver {
    async fn resolve(&self) -> std::result::Result<String, ResolutionError> {
        self.address
            .lock()
            .map(|a| a.clone())
            .map_err(|_| ResolutionError::NetworkUnavailable("resolver poisoned".into()))
    }

    fn resolver_name(&self) -> &'static str {
        "embedded"
    }
}

/// Prints announcements instead of posting them
struct StdoutNotifier;

#[async_trait::async_trait]
impl Notifier for StdoutNotifier {
    async fn notify(
        &self,
        destination: &ChannelId,
        message: &str,
    ) -> std::result::Result<(), NotifyError> {
        println!("[#{}] {}", destination, message);
        Ok(())
    }

    fn notifier_name(&self) -> &'static str {
        "stdout"
    }
}

/// Chat events pushed by the application
struct EmbeddedChat {
    rx: Mutex<Option<mpsc::UnboundedReceiver<ChatEvent>>>,
}

impl ChatSource for EmbeddedChat {
    fn events(&self) -> ChatEventStream {
        let rx = self.rx.lock().ok().and_then(|mut rx| rx.take());
        match rx {
            Some(rx) => Box::pin(UnboundedReceiverStream::new(rx)),
            None => Box::pin(tokio_stream::empty()),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    println!("=== Embedded ipwatch-core Example ===\n");

    let resolver = EmbeddedResolver::new("192.0.2.1");
    let store = MemoryAddressStore::new();
    let detector = Arc::new(ChangeDetector::new(
        Box::new(resolver.clone()),
        Box::new(StdoutNotifier),
        Box::new(store.clone()),
        ChannelId::new("demo"),
    ));

    let (events, rx) = mpsc::unbounded_channel();
    let chat = EmbeddedChat {
        rx: Mutex::new(Some(rx)),
    };
    let scheduler = Scheduler::new(detector, Box::new(chat));

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle = tokio::spawn(async move { scheduler.run_with_shutdown(Some(shutdown_rx)).await });

    println!("1. Session ready: first check announces the address");
    let _ = events.send(ChatEvent::Ready {
        user: "embedded#0001".to_string(),
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    println!("\n2. `!getip` with the same address: nothing to announce");
    let _ = events.send(ChatEvent::Message(InboundMessage::new("alice", "!getip")));
    tokio::time::sleep(Duration::from_millis(50)).await;

    println!("\n3. Address changes, `!getip` announces it");
    resolver.set("198.51.100.23");
    let _ = events.send(ChatEvent::Message(InboundMessage::new("alice", "!getip")));
    tokio::time::sleep(Duration::from_millis(50)).await;

    println!("\n4. Stopping scheduler...");
    let _ = shutdown_tx.send(());
    match handle.await {
        Ok(result) => result?,
        Err(e) => eprintln!("Scheduler task failed: {}", e),
    }

    println!(
        "\nLast announced address: {}",
        store.load().await.ok().flatten().unwrap_or_default()
    );
    println!("\n=== Embedding Successful ===");

    Ok(())
}
