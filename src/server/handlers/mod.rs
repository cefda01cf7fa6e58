use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::backend::{BackendError, MockBackend};
use crate::api::documents::ROOT_FIELDS;
use crate::models::*;
use crate::storage::DEFAULT_EXPIRY_SECS;

/// Longest display URL lifetime the mock will sign, matching presigned URLs.
pub const MAX_EXPIRY_SECS: i64 = 7 * 24 * 60 * 60;

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

// ============================================================
// GraphQL
// ============================================================

#[derive(Debug, Deserialize)]
pub struct GraphQlRequest {
    pub query: String,
    #[serde(default)]
    pub variables: Value,
}

/// Execute one of the note operations.
///
/// Only the root field is inspected; the selection set always returns
/// every note attribute. Failures come back as GraphQL `errors` with a
/// 200 status, the way a managed GraphQL service reports them.
pub async fn graphql(
    State(backend): State<MockBackend>,
    Json(request): Json<GraphQlRequest>,
) -> Json<Value> {
    match execute(&backend, &request) {
        Ok(data) => Json(json!({ "data": data })),
        Err(message) => {
            tracing::warn!("GraphQL error: {}", message);
            Json(json!({ "data": null, "errors": [{ "message": message }] }))
        }
    }
}

/// The first supported root field named in `query`.
fn root_field(query: &str) -> Option<&'static str> {
    ROOT_FIELDS
        .iter()
        .filter_map(|field| query.find(field).map(|pos| (pos, *field)))
        .min()
        .map(|(_, field)| field)
}

fn input<T: serde::de::DeserializeOwned>(variables: &Value) -> Result<T, String> {
    let input = variables
        .get("input")
        .cloned()
        .ok_or_else(|| "missing variable: input".to_string())?;
    serde_json::from_value(input).map_err(|e| format!("invalid input: {}", e))
}

fn execute(backend: &MockBackend, request: &GraphQlRequest) -> Result<Value, String> {
    let field = root_field(&request.query).ok_or_else(|| "unsupported operation".to_string())?;
    let vars = &request.variables;

    let data = match field {
        "listNotes" => {
            let limit = vars.get("limit").and_then(Value::as_u64).map(|l| l as usize);
            let next_token = vars.get("nextToken").and_then(Value::as_str);
            let page = backend
                .list_notes(limit, next_token)
                .map_err(|e| e.to_string())?;
            json!({ "listNotes": page })
        }
        "createNote" => {
            let note = backend.create_note(input::<CreateNoteInput>(vars)?);
            json!({ "createNote": note })
        }
        "updateNote" => {
            let note = backend
                .update_note(input::<UpdateNoteInput>(vars)?)
                .map_err(|e| conditional_failure(&e))?;
            json!({ "updateNote": note })
        }
        "deleteNote" => {
            let note = backend
                .delete_note(input::<DeleteNoteInput>(vars)?)
                .map_err(|e| conditional_failure(&e))?;
            json!({ "deleteNote": note })
        }
        other => return Err(format!("unsupported field: {}", other)),
    };
    Ok(data)
}

fn conditional_failure(e: &BackendError) -> String {
    format!("The conditional request failed ({})", e)
}

// ============================================================
// Storage
// ============================================================

#[derive(Debug, Deserialize)]
pub struct ExpiryQuery {
    pub expires: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlResponse {
    pub url: String,
    pub expires_at: chrono::DateTime<Utc>,
}

pub async fn put_blob(
    State(backend): State<MockBackend>,
    Path(key): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, (StatusCode, String)> {
    if key.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Empty key".to_string()));
    }
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    backend.put_blob(&key, body.to_vec(), content_type);
    tracing::debug!(key = %key, size = body.len(), "mock: stored blob");
    Ok(StatusCode::NO_CONTENT)
}

/// Issue a display URL valid for `expires` seconds, at most seven days.
///
/// Like a presigned URL, it is issued whether or not the blob exists.
pub async fn signed_url(
    Path(key): Path<String>,
    Query(query): Query<ExpiryQuery>,
    headers: HeaderMap,
) -> Result<Json<SignedUrlResponse>, (StatusCode, String)> {
    let secs = query.expires.unwrap_or(DEFAULT_EXPIRY_SECS as i64);
    if secs <= 0 {
        return Err((StatusCode::BAD_REQUEST, "expires must be positive".to_string()));
    }
    if secs > MAX_EXPIRY_SECS {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("expires must be at most {} seconds", MAX_EXPIRY_SECS),
        ));
    }
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let expires_at = Duration::try_seconds(secs)
        .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
        .ok_or((StatusCode::BAD_REQUEST, "expires out of range".to_string()))?;

    Ok(Json(SignedUrlResponse {
        url: format!(
            "http://{}/storage/{}?expires={}",
            host,
            urlencoding::encode(&key),
            expires_at.timestamp()
        ),
        expires_at,
    }))
}

/// Serve a blob through a display URL, refusing expired ones.
pub async fn get_blob(
    State(backend): State<MockBackend>,
    Path(key): Path<String>,
    Query(query): Query<ExpiryQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if let Some(expires) = query.expires {
        if expires < Utc::now().timestamp() {
            return Err((StatusCode::FORBIDDEN, "URL expired".to_string()));
        }
    }
    let blob = backend
        .get_blob(&key)
        .ok_or((StatusCode::NOT_FOUND, "Blob not found".to_string()))?;
    let content_type = blob
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());
    Ok(([(header::CONTENT_TYPE, content_type)], blob.bytes))
}

/// Remove a blob. Removing a missing key is not an error.
pub async fn delete_blob(
    State(backend): State<MockBackend>,
    Path(key): Path<String>,
) -> StatusCode {
    if !backend.remove_blob(&key) {
        tracing::debug!(key = %key, "mock: removing absent blob");
    }
    StatusCode::NO_CONTENT
}
