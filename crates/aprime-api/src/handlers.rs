//! Route handler functions for all API endpoints.
//!
//! Each handler extracts path parameters or a JSON body, calls the chat
//! orchestrator and returns a JSON response in the shape the web client
//! expects.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use aprime_core::types::{Message, Session};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    #[serde(rename = "lastModified")]
    pub last_modified: DateTime<Utc>,
}

impl From<Session> for SessionSummary {
    fn from(session: Session) -> Self {
        Self {
            id: session.id,
            title: session.title,
            last_modified: session.last_modified,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewChatResponse {
    pub session_id: String,
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub role: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "isImage")]
    pub is_image: bool,
    #[serde(rename = "isCode")]
    pub is_code: bool,
}

impl From<Message> for HistoryEntry {
    fn from(msg: Message) -> Self {
        Self {
            id: msg.id,
            role: msg.role.to_string(),
            text: msg.content,
            timestamp: msg.timestamp,
            is_image: msg.is_image,
            is_code: msg.is_code,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_title: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /health - health check.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /api/sessions - every session, most recently modified first.
pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionSummary>>, ApiError> {
    let sessions = state.orchestrator.list_sessions()?;
    Ok(Json(sessions.into_iter().map(SessionSummary::from).collect()))
}

/// POST /api/new_chat - create an empty session.
pub async fn new_chat(State(state): State<AppState>) -> Result<Json<NewChatResponse>, ApiError> {
    let session = state.orchestrator.new_session()?;
    Ok(Json(NewChatResponse {
        session_id: session.id,
        title: session.title,
    }))
}

/// GET /api/chat_history/{id} - messages of a session, oldest first.
pub async fn chat_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    let messages = state.orchestrator.history(&session_id)?;
    Ok(Json(messages.into_iter().map(HistoryEntry::from).collect()))
}

/// POST /api/chat - handle one user turn.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let turn = state
        .orchestrator
        .handle_message(&request.message, request.session_id.as_deref())
        .await?;
    Ok(Json(ChatResponse {
        response: turn.response,
        session_id: turn.session_id,
        new_title: turn.new_title,
    }))
}

/// DELETE /api/sessions/{id} - delete a session and its messages.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.orchestrator.delete_session(&session_id)?;
    Ok(Json(MessageResponse {
        message: "Session deleted successfully.".to_string(),
    }))
}
