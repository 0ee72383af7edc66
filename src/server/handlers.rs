//! HTTP handlers
//!
//! - POST /api/process: run the pipeline for a session
//! - POST /api/decrypt: decrypt one blob with a caller-held key
//! - POST /api/sessions: upload a file (multipart field `file`)
//! - GET  /api/sessions: list sessions
//! - GET  /api/sessions/:id: poll a session
//! - GET  /api/sessions/:id/document: download the processed document
//! - POST /api/sessions/:id/verify-key: check a key against the stored hash

use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::state::AppState;
use crate::crypto::{self, DocumentKey};
use crate::error::RedactError;
use crate::types::{DocumentSession, NewUpload, ProcessOutcome};

/// The only failure detail the decrypt endpoint ever reports
pub const DECRYPT_FAILED: &str = "Failed to decrypt text. Invalid key or corrupted data.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptRequest {
    #[serde(default)]
    pub encrypted_text: Option<String>,
    #[serde(default)]
    pub key_base64: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptResponse {
    pub decrypted_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyKeyRequest {
    #[serde(default)]
    pub key_base64: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyKeyResponse {
    pub valid: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    limit: Option<usize>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// POST /api/process
pub async fn process(
    State(state): State<AppState>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<ProcessOutcome>, RedactError> {
    let Json(request) = payload.map_err(|e| RedactError::Validation(e.body_text()))?;
    let session_id = non_empty(request.session_id)
        .ok_or_else(|| RedactError::Validation("Session ID is required".to_string()))?;

    let outcome = state.pipeline.process(&session_id).await?;
    Ok(Json(outcome))
}

/// POST /api/decrypt
///
/// Stateless. Wrong key, tampering and malformed input all produce the same
/// response so the endpoint cannot be used to tell them apart.
pub async fn decrypt(payload: Result<Json<DecryptRequest>, JsonRejection>) -> Response {
    let missing = || json_error(StatusCode::BAD_REQUEST, "Encrypted text and key are required");

    let Ok(Json(request)) = payload else {
        return missing();
    };
    let (Some(encrypted_text), Some(key_base64)) = (
        non_empty(request.encrypted_text),
        non_empty(request.key_base64),
    ) else {
        return missing();
    };

    let decrypted = DocumentKey::import(&key_base64)
        .and_then(|key| crypto::decrypt_str(&key, &encrypted_text));

    match decrypted {
        Ok(decrypted_text) => Json(DecryptResponse { decrypted_text }).into_response(),
        Err(e) => {
            tracing::debug!(error = %e, "Decrypt request rejected");
            json_error(StatusCode::BAD_REQUEST, DECRYPT_FAILED)
        }
    }
}

/// POST /api/sessions
pub async fn create_session(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<DocumentSession>), RedactError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RedactError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let mime_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| RedactError::Validation(format!("Failed to read upload: {}", e)))?;

        let session = state
            .pipeline
            .create_session(NewUpload {
                filename,
                mime_type,
                bytes,
            })
            .await?;
        return Ok((StatusCode::CREATED, Json(session)));
    }

    Err(RedactError::Validation(
        "Multipart field 'file' is required".to_string(),
    ))
}

/// GET /api/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, RedactError> {
    let limit = params.limit.unwrap_or(50).min(500);
    let sessions = state.pipeline.sessions(limit).await?;
    Ok(Json(serde_json::json!({
        "total": sessions.len(),
        "sessions": sessions,
    })))
}

/// GET /api/sessions/:id
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DocumentSession>, RedactError> {
    Ok(Json(state.pipeline.session(&id).await?))
}

/// GET /api/sessions/:id/document
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, RedactError> {
    let data = state.pipeline.processed_document(&id).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        data,
    )
        .into_response())
}

/// POST /api/sessions/:id/verify-key
pub async fn verify_key(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<VerifyKeyRequest>, JsonRejection>,
) -> Result<Json<VerifyKeyResponse>, RedactError> {
    let Json(request) = payload.map_err(|e| RedactError::Validation(e.body_text()))?;
    let key = non_empty(request.key_base64)
        .ok_or_else(|| RedactError::Validation("Key is required".to_string()))?;

    let valid = state.pipeline.verify_key(&id, &key).await?;
    Ok(Json(VerifyKeyResponse { valid }))
}
