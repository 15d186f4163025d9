/**
 * CAFEDESK STATUS - Entry point of the live status console
 *
 * ROLE: Load config, start the status synchronizer on the shared computers
 * table, and serve that table over HTTP until Ctrl-C.
 */

use anyhow::{Context, Result};
use cafedesk_status::http::{self, AppState};
use cafedesk_status::{load_config, new_state, HealthTracker, HttpStatusSource, SyncOptions, Synchronizer, TableView};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cafedesk_status=info")),
        )
        .init();

    let cfg = load_config().await;
    info!(status_url = %cfg.status_url, period_ms = cfg.poll_interval().as_millis() as u64, "cafedesk status console starting");

    let view = new_state(TableView::new());
    let health = HealthTracker::new();

    let source = HttpStatusSource::new(&cfg.status_url, cfg.request_timeout())
        .context("Failed to build status endpoint client")?;
    let synchronizer = Synchronizer::new(source, view.clone(), SyncOptions::from(&cfg)).with_health(health.clone());

    let app = http::build_router(AppState { view, health });
    let listener = TcpListener::bind(&cfg.listen)
        .await
        .with_context(|| format!("Failed to bind {}", cfg.listen))?;
    info!("listening on http://{}", cfg.listen);

    let sync_task = tokio::spawn(synchronizer.run_until(shutdown_signal()));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    match sync_task.await {
        Ok(sync) => info!(rows = sync.table().len(), "cafedesk status console stopped"),
        Err(e) => error!("synchronizer task failed: {}", e),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
