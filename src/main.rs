use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pairbot::services::persistence;
use pairbot::transport::{ChatTransport, ConsoleTransport};
use pairbot::{AppState, Config, bot, handlers, maintenance};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    tracing::info!("✅ Configuration loaded successfully");

    let state = AppState::new(config.clone());

    match persistence::load(&config.data_file).await {
        Ok(Some(persisted)) => {
            let counts = {
                let mut store = state.store.write().unwrap();
                store.hydrate(persisted);
                store.snapshot()
            };
            tracing::info!(
                "📂 Loaded {} users and {} active codes from storage",
                counts.user_count,
                counts.active_code_count
            );
        }
        Ok(None) => tracing::info!("📂 No previous data file, starting fresh"),
        Err(e) => tracing::error!("Error loading data: {}", e),
    }

    tracing::info!("🚀 Starting Pair Code Bot v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "🔢 Code format: {}-character {}",
        config.code_length,
        config.code_format
    );
    if config.admin_ids.is_empty() {
        tracing::warn!("👑 No admin identifiers configured, admin commands are unreachable");
    } else {
        tracing::info!("👑 Admin access enabled for {} identifiers", config.admin_ids.len());
    }

    maintenance::spawn_sweep_task(state.clone());
    maintenance::spawn_checkpoint_task(state.clone());
    tracing::info!("🛠️ Maintenance jobs started (hourly sweep, 5-minute checkpoint)");

    let (events_tx, events_rx) = mpsc::channel(64);
    let transport: Arc<dyn ChatTransport> = Arc::new(ConsoleTransport::new());
    ConsoleTransport::spawn_stdin_reader(
        events_tx,
        config.console_user_id.clone(),
        "Console".to_string(),
    );
    tokio::spawn(bot::run(state.clone(), transport, events_rx));

    let app = handlers::create_router(state.clone());
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🌐 Web server running on http://{}", addr);
    tracing::info!("📊 Dashboard: http://localhost:{}", config.port);
    tracing::info!("❤️  Health check: http://localhost:{}/health", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("🛑 Shutting down gracefully...");
    match persistence::checkpoint(&state).await {
        Ok(()) => tracing::info!("💾 Data saved successfully"),
        Err(e) => tracing::error!("❌ Final checkpoint failed: {}", e),
    }
    tracing::info!("👋 Bot shut down gracefully");

    Ok(())
}

/// Completes on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        _ = terminate => {}
    }
}
