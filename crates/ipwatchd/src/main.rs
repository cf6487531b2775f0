// # ipwatchd - Public IP Change Notifier
//
// This daemon is a THIN integration layer:
// - DO NOT add detection, persistence, or scheduling logic here
// - All watcher logic lives in ipwatch-core
// - Configuration is via environment variables ONLY (a `.env` file is
//   loaded first if present)
//
// The ipwatchd daemon is responsible for:
// 1. Reading configuration from the environment
// 2. Initializing logging and the runtime
// 3. Logging in to Discord and building the components
// 4. Running the scheduler until SIGINT/SIGTERM
//
// ## Configuration
//
// - `BOT_TOKEN`: Discord bot token (required)
// - `CHANNEL_ID`: Channel to announce in and listen to (required)
// - `IPWATCH_STATE_PATH`: Last announced address file (default `last_ip.txt`)
// - `IPWATCH_LOOKUP_URL`: IP-echo service (default ipify JSON endpoint)
// - `IPWATCH_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export BOT_TOKEN=your_token
// export CHANNEL_ID=123456789012345678
//
// ipwatchd
// ```

mod config;
mod logging;

use anyhow::Result;
use config::Config;
use ipwatch_core::config::StateStoreConfig;
use ipwatch_core::traits::AddressStore;
use ipwatch_core::{ChangeDetector, FileAddressStore, MemoryAddressStore, Scheduler};
use ipwatch_ip_http::HttpAddressResolver;
use ipwatch_notify_discord::{DiscordChatSource, DiscordClient, DiscordNotifier};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum WatchExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<WatchExitCode> for ExitCode {
    fn from(code: WatchExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    // A missing .env file is not an error
    let _ = dotenvy::dotenv();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return WatchExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return WatchExitCode::ConfigError.into();
    }

    let log_level = match config.log_level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("{}", e);
            return WatchExitCode::ConfigError.into();
        }
    };

    if let Err(e) = logging::init(log_level) {
        eprintln!("{}", e);
        return WatchExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return WatchExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {}", e);
            if e.downcast_ref::<ipwatch_core::Error>()
                .is_some_and(ipwatch_core::Error::is_fatal)
            {
                WatchExitCode::ConfigError
            } else {
                WatchExitCode::RuntimeError
            }
        } else {
            WatchExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Build the components and run the scheduler
async fn run_daemon(config: Config) -> Result<()> {
    let watch = config.watch_config();

    let store: Box<dyn AddressStore> = match &watch.state_store {
        StateStoreConfig::File { path } => {
            info!("Using state file {}", path);
            Box::new(FileAddressStore::open(path).await?)
        }
        StateStoreConfig::Memory => Box::new(MemoryAddressStore::new()),
    };

    let resolver = HttpAddressResolver::from_config(&watch.resolver);
    info!("Looking up public IP via {}", resolver.url());

    let (bot_token, channel_id) = match &watch.notifier {
        ipwatch_core::NotifierConfig::Discord {
            bot_token,
            channel_id,
        } => (bot_token.clone(), channel_id.clone()),
    };

    let client = DiscordClient::new(bot_token)?;
    let chat = DiscordChatSource::connect(client.clone(), channel_id.clone()).await?;
    let notifier = DiscordNotifier::new(client);

    let detector = Arc::new(ChangeDetector::new(
        Box::new(resolver),
        Box::new(notifier),
        store,
        channel_id,
    ));
    let scheduler = Scheduler::new(detector, Box::new(chat));

    run_until_signal(&scheduler, wait_for_shutdown()).await?;
    info!("Shutting down daemon");
    Ok(())
}

/// Run the scheduler until `signal` resolves
///
/// A cycle in progress when the signal arrives is allowed to finish. A
/// failure to listen for signals stops the daemon with that error.
async fn run_until_signal<S>(scheduler: &Scheduler, signal: S) -> Result<()>
where
    S: Future<Output = Result<&'static str>>,
{
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let run = scheduler.run_with_shutdown(Some(shutdown_rx));
    tokio::pin!(run);

    tokio::select! {
        result = &mut run => result?,
        signal = signal => {
            let signal = signal?;
            info!("Received shutdown signal: {}", signal);
            let _ = shutdown_tx.send(());
            run.await?;
        }
    }

    Ok(())
}

/// Wait for SIGTERM or SIGINT
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for Ctrl-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
