use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use herald_api::config::ServerConfig;
use herald_api::notifications::UpdateFanout;
use herald_api::router::build_app_router;
use herald_api::state::AppState;
use herald_api::ws;
use herald_db::SqliteJobStore;
use herald_worker::delivery::SimulatedSender;
use herald_worker::{JobExecutor, JobLifecycle, JobScheduler, SchedulerConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "herald_api=debug,herald_worker=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let scheduler_config = SchedulerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        heartbeat_secs = config.heartbeat_interval.as_secs(),
        "Loaded server configuration",
    );
    tracing::info!(
        poll_interval_ms = scheduler_config.poll_interval.as_millis() as u64,
        recover_on_start = scheduler_config.recover_on_start,
        "Loaded scheduler configuration",
    );

    // --- Database ---
    let pool = herald_db::create_pool(&config.database_url)
        .await
        .expect("Failed to open job database");
    tracing::info!(database_url = %config.database_url, "Database connection pool created");

    herald_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    herald_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    let store = Arc::new(SqliteJobStore::new(pool));

    // --- Update channel + engine ---
    let (publisher, updates) = herald_events::update_channel();
    let lifecycle = JobLifecycle::new(store, publisher);

    let sender = Arc::new(SimulatedSender::new(scheduler_config.simulated_delivery));
    let executor = JobExecutor::new(lifecycle.clone(), sender)
        .with_delivery_timeout(scheduler_config.delivery_timeout);

    // --- WebSocket manager ---
    let ws_manager = Arc::new(ws::WsManager::new());

    // Stops the scheduler and the heartbeat once the server has drained.
    let background = CancellationToken::new();

    // --- Heartbeat ---
    let heartbeat_handle = ws::start_heartbeat(
        Arc::clone(&ws_manager),
        config.heartbeat_interval,
        background.child_token(),
    );

    // --- Fan-out ---
    let fanout = UpdateFanout::new(Arc::clone(&ws_manager));
    let fanout_handle = tokio::spawn(fanout.run(updates));

    // --- Scheduler ---
    let scheduler = JobScheduler::new(executor, &scheduler_config);
    let scheduler_stats = scheduler.stats();
    let scheduler_handle = {
        let cancel = background.child_token();
        tokio::spawn(async move { scheduler.run(cancel).await })
    };
    tracing::info!("Background services started (scheduler, fan-out, heartbeat)");

    // --- App state ---
    let state = AppState {
        lifecycle,
        ws_manager: Arc::clone(&ws_manager),
        scheduler_stats,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = config.bind_addr().expect("HOST must be an IP address");
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let drain_timeout = config.shutdown_timeout;

    // Stop the scheduler first; an in-flight job finishes its writes.
    background.cancel();
    if tokio::time::timeout(drain_timeout, scheduler_handle).await.is_err() {
        tracing::warn!("Scheduler did not stop within the shutdown timeout");
    }
    tracing::info!("Scheduler stopped");

    // The router and the scheduler held the last publishers; once both are
    // gone the fan-out drains what is left and exits.
    if tokio::time::timeout(drain_timeout, fanout_handle).await.is_err() {
        tracing::warn!("Fan-out did not drain within the shutdown timeout");
    }
    tracing::info!("Update fan-out stopped");

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;

    if tokio::time::timeout(drain_timeout, heartbeat_handle).await.is_err() {
        tracing::warn!("Heartbeat did not stop within the shutdown timeout");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
