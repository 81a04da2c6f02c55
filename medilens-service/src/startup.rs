//! Application startup and lifecycle management.
//!
//! Builds the router (relay endpoints, probes, static SPA serving) and manages
//! the HTTP server lifecycle.

use crate::config::MedilensConfig;
use crate::handlers::{
    chat::chat_with_gemini,
    facilities::find_nearby_facilities,
    health::{health_check, readiness_check},
    image::analyze_image,
};
use crate::services::overpass::{FacilityIndex, OverpassClient};
use crate::services::providers::gemini::{GeminiConfig, GeminiProvider};
use crate::services::providers::mock::MockGenerativeProvider;
use crate::services::providers::GenerativeProvider;
use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use service_core::error::AppError;
use service_core::middleware::tracing::request_id_middleware;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Upload ceiling; the image handler enforces its own per-file cap below this.
const MAX_REQUEST_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: MedilensConfig,
    pub generative: Arc<dyn GenerativeProvider>,
    pub facility_index: Arc<dyn FacilityIndex>,
}

/// Build the service router over the given state.
pub fn build_router(state: AppState) -> Router {
    let build_dir = PathBuf::from(&state.config.frontend.build_dir);
    let index_file = build_dir.join("index.html");

    // Serve the prebuilt frontend bundle; unknown paths fall back to
    // index.html so client-side routing keeps working.
    let spa = ServeDir::new(&build_dir).not_found_service(ServeFile::new(index_file));

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/api/chat-with-gemini", post(chat_with_gemini))
        .route("/api/analyze-image", post(analyze_image))
        .route("/api/leaflet-hospitals", post(find_nearby_facilities))
        .fallback_service(spa)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(CorsLayer::permissive())
        // Add tracing layer
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        // Add tracing middleware for request_id
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: MedilensConfig) -> Result<Self, AppError> {
        let generative: Arc<dyn GenerativeProvider> = if config.gemini.api_key.is_empty() {
            tracing::warn!("GEMINI_API_KEY not set, using mock generative provider");
            Arc::new(MockGenerativeProvider::new(true))
        } else {
            let provider = GeminiProvider::new(GeminiConfig {
                api_key: config.gemini.api_key.clone(),
                text_model: config.gemini.text_model.clone(),
                vision_model: config.gemini.vision_model.clone(),
            })
            .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?;

            tracing::info!(
                text_model = %config.gemini.text_model,
                vision_model = %config.gemini.vision_model,
                "Initialized Gemini provider"
            );
            Arc::new(provider)
        };

        let facility_index: Arc<dyn FacilityIndex> = Arc::new(
            OverpassClient::new(
                &config.overpass.url,
                Duration::from_secs(config.overpass.timeout_secs),
            )
            .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?,
        );
        tracing::info!(endpoint = %config.overpass.url, "Initialized facility index client");

        let state = AppState {
            config: config.clone(),
            generative,
            facility_index,
        };

        // Bind the listener (port 0 = random port for testing).
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("MediLens backend listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
