// Pirate Parlays - Main Entry Point

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use pirate_parlays::{ticker, AppState, Config, Snapshot, Sportsbook};

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    info!("═══════════════════════════════════════════════");
    info!("     🏴‍☠️ Pirate Parlays Sportsbook (Demo)");
    info!("═══════════════════════════════════════════════");

    let book = open_book(&config);
    let state = AppState::shared(book);

    // Clone state for shutdown handler before moving into router
    let shutdown_state = state.clone();

    let ticker = config
        .live_tick
        .map(|period| ticker::spawn_live_ticker(state.clone(), period));

    let app = pirate_parlays::router(state);

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.bind_addr, error = %e, "❌ Failed to bind");
            std::process::exit(1);
        }
    };

    info!("🚀 Server running on http://{}", config.bind_addr);
    info!("📋 Bettor:  /auth/login  /matches  /slip  /bets  /wallet  /notifications");
    info!("📋 Admin:   /admin/users  /admin/transactions  /admin/matches/:id  /admin/tickets");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "❌ Server error");
    }

    if let Some(handle) = ticker {
        handle.abort();
    }

    info!("💾 Saving state...");
    match shutdown_state.lock().book.flush() {
        Ok(()) => info!("✅ State saved successfully"),
        Err(e) => error!(error = %e, "❌ Failed to save state"),
    }
    info!("👋 Goodbye!");
}

/// Seeded book, rehydrated from the snapshot when persistence is on.
/// An undecodable snapshot is replaced with seed data. Storage that cannot
/// be opened at all stops the process.
fn open_book(config: &Config) -> Sportsbook {
    if !config.persist {
        info!("ℹ️  Persistence disabled, running in memory");
        return Sportsbook::new();
    }

    let opened = Snapshot::open(&config.data_dir).and_then(Sportsbook::open_or_reseed);
    match opened {
        Ok(book) => {
            info!(dir = %config.data_dir.display(), "💾 Snapshot attached");
            book
        }
        Err(e) => {
            error!(
                dir = %config.data_dir.display(),
                error = %e,
                "❌ Snapshot storage unavailable (set PP_PERSIST=false to run in memory)"
            );
            std::process::exit(1);
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "❌ Failed to install CTRL+C handler");
        std::future::pending::<()>().await;
    }
    info!("🛑 Shutdown signal received...");
}
