use std::net::SocketAddr;
use std::time::Instant;

use tokio::signal;

use workout_log::{AppState, Config, build_router, db::Db, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    let db = match config.database_url.as_deref() {
        Some(url) => Db::connect(url).await?,
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store");
            Db::memory()
        }
    };

    let state = AppState::new(config.clone(), db);

    let limiter = state.rate_limiter.clone();
    let sweep_every = config.rate_limit_sweep;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_every);
        loop {
            ticker.tick().await;
            let removed = limiter.purge_idle(Instant::now());
            if removed > 0 {
                tracing::debug!("Evicted {} idle rate limit keys", removed);
            }
        }
    });

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on http://{}", config.bind_addr);
    tracing::warn!(
        "Rate limit keys trust X-Forwarded-For; deploy behind a proxy that overwrites it"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received terminate signal, shutting down"),
    }
}
