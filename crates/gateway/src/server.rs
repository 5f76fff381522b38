use std::net::SocketAddr;

use {
    axum::{
        Json, Router,
        extract::State,
        http::StatusCode,
        response::IntoResponse,
        routing::get,
    },
    serde::Serialize,
    serde_json::json,
    tokio::net::TcpListener,
    tokio_util::sync::CancellationToken,
    tracing::{info, warn},
};

use courier_relay::FlushReport;

use crate::state::AppState;

/// Body of the liveness route.
pub const LIVENESS_TEXT: &str = "Bot is running!";

/// JSON body of a successful flush.
#[derive(Debug, Serialize)]
struct FlushResponse {
    status: &'static str,
    message: String,
    #[serde(flatten)]
    report: FlushReport,
}

impl From<FlushReport> for FlushResponse {
    fn from(report: FlushReport) -> Self {
        Self {
            status: "ok",
            message: report.message(),
            report,
        }
    }
}

// ── Server startup ───────────────────────────────────────────────────────────

/// Build the HTTP router (shared between production startup and tests).
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/flush", get(flush_handler).post(flush_handler))
        .with_state(state)
}

/// Bind `bind:port` and serve `app` until `cancel` fires.
pub async fn serve(
    bind: &str,
    port: u16,
    app: Router,
    cancel: CancellationToken,
) -> std::io::Result<()> {
    let listener = TcpListener::bind((bind, port)).await?;
    serve_on(listener, app, cancel).await
}

/// Serve `app` on an already-bound listener until `cancel` fires.
pub async fn serve_on(
    listener: TcpListener,
    app: Router,
    cancel: CancellationToken,
) -> std::io::Result<()> {
    let addr: SocketAddr = listener.local_addr()?;
    info!(%addr, "http server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;
    info!(%addr, "http server stopped");
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn root_handler() -> &'static str {
    LIVENESS_TEXT
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut body = json!({
        "status": "ok",
        "mode": state.mode,
        "pending": state.pending().await,
    });
    if let Some(poller) = &state.poller {
        body["last_processed_id"] = json!(poller.last_processed_id().await);
    }
    Json(body)
}

async fn flush_handler(State(state): State<AppState>) -> impl IntoResponse {
    let Some(flusher) = &state.flusher else {
        warn!(mode = %state.mode, "flush requested outside queued mode");
        let message = format!(
            "flush is only available in queued mode (current mode: {})",
            state.mode
        );
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "status": "error", "message": message })),
        );
    };

    let report = flusher.flush().await;
    info!(
        forwarded = report.forwarded,
        failed = report.failed,
        "on-demand flush complete"
    );
    (StatusCode::OK, Json(json!(FlushResponse::from(report))))
}
