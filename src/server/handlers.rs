//! Request handlers for the `/api` surface.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::AppState;
use crate::chat::{handle_chat, ChatRequest, ChatResponse};
use crate::db::with_conn;
use crate::knowledge::messages::session_messages;
use crate::knowledge::stats::{system_stats, SystemStats};
use crate::knowledge::store::{
    insert_knowledge, list_concepts, list_knowledge, set_verification, LIST_LIMIT,
};
use crate::knowledge::types::{ChatMessage, ConceptLearned, KnowledgeItem, ModelVersion, Phase};
use crate::knowledge::versions::{add_version, list_versions, VERSION_LIST_LIMIT};

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// GET /api/
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Monoque Intelligence API - Adaptive Learning Core".into(),
    })
}

/// GET /health
pub async fn health() -> &'static str {
    "OK"
}

/// POST /api/chat
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<ChatResponse> {
    let Json(request) = payload?;
    handle_chat(&state.db, &state.sessions, &state.config.chat, request)
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!(error = %format!("{e:#}"), "chat failed");
            ApiError::Internal(format!("Chat error: {e:#}"))
        })
}

/// GET /api/knowledge
pub async fn get_knowledge(State(state): State<AppState>) -> ApiResult<Vec<KnowledgeItem>> {
    with_conn(&state.db, |conn| list_knowledge(conn, LIST_LIMIT))
        .await
        .map(Json)
        .map_err(|e| ApiError::internal("get knowledge", e))
}

/// POST /api/knowledge
pub async fn add_knowledge(
    State(state): State<AppState>,
    payload: Result<Json<KnowledgeItem>, JsonRejection>,
) -> ApiResult<KnowledgeItem> {
    let Json(item) = payload?;
    if item.confidence_score > 100 {
        return Err(ApiError::BadRequest(
            "confidence_score must be between 0 and 100".into(),
        ));
    }

    let stored = item.clone();
    with_conn(&state.db, move |conn| insert_knowledge(conn, &stored))
        .await
        .map_err(|e| ApiError::insert_failed("add knowledge", "Knowledge item", &item.id, e))?;

    tracing::info!(id = %item.id, concept = %item.concept, source = %item.source, "knowledge added");
    Ok(Json(item))
}

/// GET /api/concepts
pub async fn get_concepts(State(state): State<AppState>) -> ApiResult<Vec<ConceptLearned>> {
    with_conn(&state.db, |conn| list_concepts(conn, LIST_LIMIT))
        .await
        .map(Json)
        .map_err(|e| ApiError::internal("get concepts", e))
}

/// GET /api/stats
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<SystemStats> {
    let phase = state.sessions.phase().await;
    with_conn(&state.db, move |conn| system_stats(conn, phase))
        .await
        .map(Json)
        .map_err(|e| ApiError::internal("get stats", e))
}

#[derive(Debug, Deserialize)]
pub struct PhaseUpdate {
    pub phase: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PhaseResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub phase: Phase,
}

/// POST /api/phase
pub async fn update_phase(
    State(state): State<AppState>,
    payload: Result<Json<PhaseUpdate>, JsonRejection>,
) -> ApiResult<PhaseResponse> {
    let Json(update) = payload?;
    let phase: Phase = update.phase.parse().map_err(ApiError::BadRequest)?;
    state.sessions.set_phase(phase).await;

    Ok(Json(PhaseResponse {
        message: Some(format!("Phase updated to {phase}")),
        phase,
    }))
}

/// GET /api/phase
pub async fn get_phase(State(state): State<AppState>) -> Json<PhaseResponse> {
    Json(PhaseResponse {
        message: None,
        phase: state.sessions.phase().await,
    })
}

#[derive(Debug, Deserialize)]
pub struct ValidationRequest {
    #[serde(default)]
    pub knowledge_id: String,
    pub approved: bool,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub message: String,
    pub approved: bool,
}

/// POST /api/validate
pub async fn validate_knowledge(
    State(state): State<AppState>,
    payload: Result<Json<ValidationRequest>, JsonRejection>,
) -> ApiResult<ValidationResponse> {
    let Json(request) = payload?;
    if request.knowledge_id.trim().is_empty() {
        return Err(ApiError::BadRequest("knowledge_id is required".into()));
    }

    let ValidationRequest {
        knowledge_id,
        approved,
        feedback,
    } = request;

    let id = knowledge_id.clone();
    let updated = with_conn(&state.db, move |conn| {
        set_verification(conn, &id, approved, feedback.as_deref())
    })
    .await
    .map_err(|e| ApiError::internal("validate knowledge", e))?;

    if !updated {
        return Err(ApiError::NotFound("Knowledge not found".into()));
    }

    tracing::info!(id = %knowledge_id, approved, "knowledge validated");
    Ok(Json(ValidationResponse {
        message: "Validation updated".into(),
        approved,
    }))
}

/// GET /api/messages/{session_id}
pub async fn get_messages(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Vec<ChatMessage>> {
    with_conn(&state.db, move |conn| session_messages(conn, &session_id, LIST_LIMIT))
        .await
        .map(Json)
        .map_err(|e| ApiError::internal("get messages", e))
}

/// GET /api/versions
pub async fn get_versions(State(state): State<AppState>) -> ApiResult<Vec<ModelVersion>> {
    with_conn(&state.db, |conn| list_versions(conn, VERSION_LIST_LIMIT))
        .await
        .map(Json)
        .map_err(|e| ApiError::internal("get versions", e))
}

/// POST /api/versions
pub async fn add_version_entry(
    State(state): State<AppState>,
    payload: Result<Json<ModelVersion>, JsonRejection>,
) -> ApiResult<ModelVersion> {
    let Json(version) = payload?;
    let stored = version.clone();
    with_conn(&state.db, move |conn| add_version(conn, &stored))
        .await
        .map_err(|e| ApiError::insert_failed("add version", "Version", &version.id, e))?;

    tracing::info!(version = %version.version, changes = version.changes.len(), "version recorded");
    Ok(Json(version))
}
