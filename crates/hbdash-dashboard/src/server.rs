//! HTTP server implementation using axum.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use futures_util::stream::StreamExt;
use futures_util::SinkExt;
use hbdash_telemetry::Metrics;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::state::DashboardState;
use crate::types::{DashboardMessage, DashboardSnapshot};

/// Caps concurrent WebSocket connections.
pub struct ConnectionLimiter {
    current: AtomicUsize,
    max: usize,
}

impl ConnectionLimiter {
    pub fn new(max: usize) -> Self {
        Self {
            current: AtomicUsize::new(0),
            max,
        }
    }

    /// Take a slot. The slot is released when the guard drops.
    pub fn try_acquire(self: &Arc<Self>) -> Option<ConnectionGuard> {
        loop {
            let current = self.current.load(Ordering::Acquire);
            if current >= self.max {
                return None;
            }
            if self
                .current
                .compare_exchange(current, current + 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return Some(ConnectionGuard {
                    limiter: Arc::clone(self),
                });
            }
        }
    }

    pub fn current_count(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }
}

/// Owned connection slot; can move into the upgraded socket task.
pub struct ConnectionGuard {
    limiter: Arc<ConnectionLimiter>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.limiter.current.fetch_sub(1, Ordering::Release);
    }
}

/// Shared application state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    dashboard_state: DashboardState,
    connection_limiter: Arc<ConnectionLimiter>,
    config: DashboardConfig,
}

impl AppState {
    pub fn new(dashboard_state: DashboardState, config: DashboardConfig) -> Self {
        Self {
            dashboard_state,
            connection_limiter: Arc::new(ConnectionLimiter::new(config.max_connections)),
            config,
        }
    }
}

/// Create the axum router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/api/snapshot", get(get_snapshot))
        .route("/metrics", get(get_metrics))
        .route("/ws", get(ws_handler))
        .with_state(state)
}

/// Serve the index HTML page.
async fn serve_index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

/// Latest snapshot as JSON; 503 until the first cycle finishes.
async fn get_snapshot(
    State(state): State<AppState>,
) -> Result<Json<DashboardSnapshot>, (StatusCode, &'static str)> {
    match state.dashboard_state.latest() {
        Some(snapshot) => Ok(Json(snapshot.as_ref().clone())),
        None => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "No refresh cycle has completed yet",
        )),
    }
}

/// Prometheus scrape endpoint.
async fn get_metrics() -> Response {
    match Metrics::gather_text() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// WebSocket upgrade handler.
async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let guard = match state.connection_limiter.try_acquire() {
        Some(guard) => guard,
        None => {
            warn!(
                current = state.connection_limiter.current_count(),
                max = state.config.max_connections,
                "WebSocket connection limit reached"
            );
            return (StatusCode::SERVICE_UNAVAILABLE, "Too many connections").into_response();
        }
    };

    info!(
        connections = state.connection_limiter.current_count(),
        "New WebSocket connection"
    );

    ws.on_upgrade(move |socket| handle_ws_connection(socket, state, guard))
}

/// Handle a WebSocket connection.
async fn handle_ws_connection(socket: WebSocket, state: AppState, _guard: ConnectionGuard) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before sending the current snapshot so nothing published in
    // between is lost.
    let mut updates = state.dashboard_state.subscribe();

    if let Some(snapshot) = state.dashboard_state.latest() {
        let initial = DashboardMessage::Snapshot(snapshot.as_ref().clone());
        if let Ok(json) = serde_json::to_string(&initial) {
            if sender.send(Message::Text(json.into())).await.is_err() {
                debug!("Failed to send initial snapshot, client disconnected");
                return;
            }
        }
    }

    let mut incoming_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Close(_)) => {
                    debug!("Client sent close frame");
                    break;
                }
                Err(e) => {
                    debug!(error = %e, "WebSocket receive error");
                    break;
                }
                _ => {}
            }
        }
    });

    loop {
        tokio::select! {
            result = updates.recv() => {
                match result {
                    Ok(msg) => {
                        if sender.send(Message::Text(msg.into())).await.is_err() {
                            debug!("Failed to send message, client disconnected");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "WebSocket client lagged, catching up");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Broadcast channel closed");
                        break;
                    }
                }
            }
            _ = &mut incoming_task => {
                debug!("Incoming task completed, closing connection");
                break;
            }
        }
    }

    incoming_task.abort();
    info!(
        connections = state.connection_limiter.current_count().saturating_sub(1),
        "WebSocket connection closed"
    );
}

/// Run the dashboard HTTP server.
pub async fn run_server(
    dashboard_state: DashboardState,
    config: DashboardConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = config.bind_addr();
    let app = create_router(AppState::new(dashboard_state, config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Dashboard server running on http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
