//! HTTP server implementation for the liveness routes

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use std::thread::JoinHandle;
use tower_http::trace::TraceLayer;

/// Process facts reported by `/health`, fixed at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthFlags {
    /// Whether the voice-call bridge passed its startup check
    pub voice_available: bool,
}

#[derive(Debug, Serialize)]
struct HealthReport {
    status: &'static str,
    voice_available: bool,
    bot: &'static str,
}

impl From<HealthFlags> for HealthReport {
    fn from(flags: HealthFlags) -> Self {
        Self {
            status: if flags.voice_available {
                "healthy"
            } else {
                "degraded"
            },
            voice_available: flags.voice_available,
            bot: "running",
        }
    }
}

/// Liveness server for the bot process
#[derive(Debug, Clone, Copy)]
pub struct LivenessServer {
    flags: HealthFlags,
}

impl LivenessServer {
    pub fn new(flags: HealthFlags) -> Self {
        Self { flags }
    }

    /// Create the axum router with all routes configured
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(index))
            .route("/health", get(health_check))
            .with_state(self.flags)
            .layer(TraceLayer::new_for_http())
    }

    /// Start the server
    ///
    /// # Arguments
    /// * `host` - Host to bind to (e.g., "0.0.0.0")
    /// * `port` - Port to bind to (e.g., 10000)
    pub async fn serve(self, host: &str, port: u16) -> crate::Result<()> {
        let addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        tracing::info!("Liveness server listening on {}", addr);

        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}

/// Run the server on a dedicated OS thread with its own runtime
///
/// Failures to build the runtime or bind the port are logged and end the
/// thread; the caller keeps running either way.
pub fn spawn_background(
    host: impl Into<String>,
    port: u16,
    flags: HealthFlags,
) -> std::io::Result<JoinHandle<()>> {
    let host = host.into();
    std::thread::Builder::new()
        .name("liveness".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    tracing::error!("Failed to start liveness runtime: {}", e);
                    return;
                }
            };

            if let Err(e) = runtime.block_on(LivenessServer::new(flags).serve(&host, port)) {
                tracing::error!("Liveness server on {}:{} stopped: {}", host, port, e);
            }
        })
}

async fn index() -> impl IntoResponse {
    (StatusCode::OK, "Bot is running!")
}

/// Health check endpoint
async fn health_check(State(flags): State<HealthFlags>) -> impl IntoResponse {
    (StatusCode::OK, Json(HealthReport::from(flags)))
}
