#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use herald_api::config::ServerConfig;
use herald_api::notifications::UpdateFanout;
use herald_api::router::build_app_router;
use herald_api::state::AppState;
use herald_api::ws::WsManager;
use herald_db::{JobStore, SqliteJobStore};
use herald_worker::delivery::SimulatedSender;
use herald_worker::{JobExecutor, JobLifecycle, JobScheduler, SchedulerConfig};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Development defaults, bound to loopback over an in-memory database.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        ..ServerConfig::default()
    }
}

/// Everything a test needs to drive the service without a network listener.
pub struct TestApp {
    pub router: Router,
    pub lifecycle: JobLifecycle,
    pub scheduler: JobScheduler,
    pub ws_manager: Arc<WsManager>,
    pub fanout: tokio::task::JoinHandle<()>,
}

/// Build the full application router over a fresh in-memory store.
///
/// The router uses the same middleware stack as `main.rs`. The update
/// channel is drained into `ws_manager` by a spawned fan-out task; the
/// scheduler is returned un-started so tests drive cycles explicitly.
pub async fn build_test_app() -> TestApp {
    let pool = herald_db::create_memory_pool().await.unwrap();
    let store = SqliteJobStore::new(pool);
    store.init().await.unwrap();

    let (publisher, updates) = herald_events::update_channel();
    let lifecycle = JobLifecycle::new(Arc::new(store), publisher);

    let sender = Arc::new(SimulatedSender::new(Duration::ZERO));
    let executor = JobExecutor::new(lifecycle.clone(), sender);
    let scheduler = JobScheduler::new(executor, &SchedulerConfig::default());

    let ws_manager = Arc::new(WsManager::new());
    let fanout = tokio::spawn(UpdateFanout::new(Arc::clone(&ws_manager)).run(updates));

    let config = test_config();
    let state = AppState {
        lifecycle: lifecycle.clone(),
        ws_manager: Arc::clone(&ws_manager),
        scheduler_stats: scheduler.stats(),
    };

    TestApp {
        router: build_app_router(state, &config),
        lifecycle,
        scheduler,
        ws_manager,
        fanout,
    }
}

/// Send a GET request through the router.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body through the router.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
