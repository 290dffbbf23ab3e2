//! HTTP server: shared state, router, and the `serve` entry point.

pub mod error;
pub mod handlers;

use anyhow::Result;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::chat::session::SessionManager;
use crate::config::MonoqueConfig;
use crate::db::{self, SharedDb};
use crate::llm::{self, LlmBackend};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: SharedDb,
    pub sessions: Arc<SessionManager>,
    pub config: Arc<MonoqueConfig>,
}

impl AppState {
    pub fn new(db: SharedDb, backend: Arc<dyn LlmBackend>, config: MonoqueConfig) -> Self {
        let sessions = SessionManager::new(backend, config.chat.session_transcript_limit);
        Self {
            db,
            sessions: Arc::new(sessions),
            config: Arc::new(config),
        }
    }
}

/// Build the full router, CORS and request tracing included.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api", get(handlers::root))
        .route("/api/", get(handlers::root))
        .route("/api/chat", post(handlers::chat))
        .route(
            "/api/knowledge",
            get(handlers::get_knowledge).post(handlers::add_knowledge),
        )
        .route("/api/concepts", get(handlers::get_concepts))
        .route("/api/stats", get(handlers::get_stats))
        .route(
            "/api/phase",
            get(handlers::get_phase).post(handlers::update_phase),
        )
        .route("/api/validate", post(handlers::validate_knowledge))
        .route("/api/messages/{session_id}", get(handlers::get_messages))
        .route(
            "/api/versions",
            get(handlers::get_versions).post(handlers::add_version_entry),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// `*` allows any origin without credentials; an explicit list allows those
/// origins with credentials.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request());

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return base.allow_origin(AllowOrigin::any());
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    base.allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
}

/// Open the database, build the backend, and serve HTTP until ctrl-c.
pub async fn serve(config: MonoqueConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    let backend = llm::create_backend(&config.llm)?;
    if config.llm.api_key.is_none() {
        tracing::warn!("no LLM API key configured; chat requests will fail until MONOQUE_LLM_API_KEY is set");
    }
    tracing::info!(model = backend.id(), "LLM backend ready");

    let bind_addr = config.bind_addr();
    let state = AppState::new(db::shared(conn), backend, config);
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Monoque API listening at http://{bind_addr}/api");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    Ok(())
}
