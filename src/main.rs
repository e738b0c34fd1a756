use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use formrelay::config::Config;
use formrelay::journal::JournalStore;
use formrelay::relay::{RelayReceiver, RelaySender};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(&config.log_level)
        }))
        .with_thread_names(true)
        .init();

    tracing::info!("Starting formrelay");

    let journal = Arc::new(JournalStore::new(&config.journal));
    journal.ensure_exists().await?;
    tracing::info!(
        "Journal at {} (locking {})",
        journal.path().display(),
        if journal.is_locking() { "on" } else { "off" }
    );

    let relay_addr = config.relay.addr();
    let receiver = RelayReceiver::bind(relay_addr, config.relay.buffer_size).await?;
    let sender = RelaySender::bind(relay_addr).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let relay_task = tokio::spawn(receiver.run(journal.clone(), shutdown_rx));

    let addr = SocketAddr::new(config.host, config.port);
    let (app, _state) = formrelay::build_app(config, journal, sender);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    let _ = relay_task.await;

    tracing::info!("Stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
