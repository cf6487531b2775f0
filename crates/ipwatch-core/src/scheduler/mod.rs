//! Check scheduling
//!
//! Two producers feed one consumer loop:
//! - a fixed-period timer, started once the chat session reports `Ready`
//! - the chat event stream, where `!getip` from a human requests a check
//!
//! Every cycle runs inside the loop, so cycles triggered here never overlap.
//! An on-demand check does not reset the timer.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use crate::detector::ChangeDetector;
use crate::error::{CheckError, Error, Result};
use crate::traits::{ChatEvent, ChatSource, InboundMessage};

/// Period between timer-driven checks
pub const CHECK_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Message content that requests an immediate check
pub const ON_DEMAND_COMMAND: &str = "!getip";

/// Whether `message` asks for an out-of-band check
///
/// The content must match the command exactly (case-sensitive) and the
/// sender must not be a bot.
pub fn is_on_demand_trigger(message: &InboundMessage) -> bool {
    !message.author_is_bot && message.content == ON_DEMAND_COMMAND
}

/// What caused a check cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Ready,
    Timer,
    OnDemand,
}

type ShutdownFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

/// Drives the [`ChangeDetector`] from the timer and from chat commands
pub struct Scheduler {
    detector: Arc<ChangeDetector>,
    chat: Box<dyn ChatSource>,
    period: Duration,
}

impl Scheduler {
    pub fn new(detector: Arc<ChangeDetector>, chat: Box<dyn ChatSource>) -> Self {
        Self {
            detector,
            chat,
            period: CHECK_INTERVAL,
        }
    }

    /// Run until Ctrl-C
    pub async fn run(&self) -> Result<()> {
        let shutdown: ShutdownFuture = Box::pin(async {
            tokio::signal::ctrl_c()
                .await
                .map_err(|e| Error::Other(format!("Failed to listen for Ctrl-C: {}", e)))
        });
        self.run_internal(shutdown).await
    }

    /// Run until `shutdown_rx` fires (or its sender is dropped)
    ///
    /// With `None`, behaves like [`Scheduler::run`].
    pub async fn run_with_shutdown(
        &self,
        shutdown_rx: Option<oneshot::Receiver<()>>,
    ) -> Result<()> {
        match shutdown_rx {
            Some(rx) => {
                let shutdown: ShutdownFuture = Box::pin(async move {
                    let _ = rx.await;
                    Ok(())
                });
                self.run_internal(shutdown).await
            }
            None => self.run().await,
        }
    }

    async fn run_internal(&self, mut shutdown: ShutdownFuture) -> Result<()> {
        let mut events = self.chat.events();
        let mut events_open = true;
        let mut ticker: Option<Interval> = None;

        loop {
            tokio::select! {
                event = events.next(), if events_open => match event {
                    Some(ChatEvent::Ready { user }) => {
                        info!("Logged in as {}!", user);
                        if ticker.is_none() {
                            self.run_cycle(Trigger::Ready).await;
                            ticker = Some(self.start_timer());
                        } else {
                            debug!("Session ready again, timer already running");
                        }
                    }
                    Some(ChatEvent::Message(message)) => {
                        if is_on_demand_trigger(&message) {
                            info!("Check requested by {}", message.author);
                            self.run_cycle(Trigger::OnDemand).await;
                        }
                    }
                    None => {
                        warn!("Chat event stream ended, on-demand checks unavailable");
                        events_open = false;
                    }
                },

                _ = next_tick(&mut ticker) => {
                    self.run_cycle(Trigger::Timer).await;
                }

                result = &mut shutdown => {
                    result?;
                    info!("Shutdown signal received, scheduler stopped");
                    break;
                }
            }
        }

        Ok(())
    }

    fn start_timer(&self) -> Interval {
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    }

    async fn run_cycle(&self, trigger: Trigger) {
        debug!("Starting check ({:?})", trigger);
        match self.detector.check_and_notify().await {
            Ok(result) => debug!("Check ({:?}) finished: {:?}", trigger, result),
            Err(CheckError::AlreadyRunning) => {
                debug!("Check ({:?}) skipped, another one is in flight", trigger);
            }
            // Already logged by the detector; the next tick retries
            Err(_) => {}
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
