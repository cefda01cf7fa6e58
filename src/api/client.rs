//! GraphQL-over-HTTP client for the notes API.
//!
//! Every request is a `POST` of `{ query, variables }` to a single endpoint.
//! The endpoint answers `{ data, errors }`; a non-empty `errors` array is
//! reported as [`ClientError::GraphQl`] even when the HTTP status is 200.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::documents::{CREATE_NOTE, DELETE_NOTE, LIST_NOTES, UPDATE_NOTE};
use super::{NotePage, NotesApi};
use crate::error::ClientError;
use crate::models::*;

/// Default endpoint of the local mock backend.
pub const DEFAULT_URL: &str = "http://localhost:17020/graphql";

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlErrorItem>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorItem {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ListNotesData {
    #[serde(rename = "listNotes")]
    list_notes: NotePage,
}

#[derive(Debug, Deserialize)]
struct CreateNoteData {
    #[serde(rename = "createNote")]
    create_note: Note,
}

#[derive(Debug, Deserialize)]
struct UpdateNoteData {
    #[serde(rename = "updateNote")]
    update_note: Note,
}

#[derive(Debug, Deserialize)]
struct DeleteNoteData {
    #[serde(rename = "deleteNote")]
    delete_note: Note,
}

/// HTTP client for the notes GraphQL API.
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    endpoint: String,
    token: Option<String>,
    client: Client,
}

impl GraphqlClient {
    /// Create with explicit configuration.
    pub fn new(endpoint: impl Into<String>, token: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token,
            client: Client::new(),
        }
    }

    /// Execute a document and decode its `data`.
    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, ClientError> {
        let mut req = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "query": query, "variables": variables }));
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::NOT_FOUND => ClientError::NotFound(body),
                StatusCode::BAD_REQUEST => ClientError::BadRequest(body),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::Unauthorized,
                _ => ClientError::Server(format!("{}: {}", status, body)),
            });
        }

        let envelope: GraphQlResponse<T> = response.json().await?;
        decode_envelope(envelope)
    }
}

fn decode_envelope<T>(envelope: GraphQlResponse<T>) -> Result<T, ClientError> {
    if !envelope.errors.is_empty() {
        let messages: Vec<String> = envelope.errors.into_iter().map(|e| e.message).collect();
        return Err(ClientError::GraphQl(messages.join("; ")));
    }
    envelope
        .data
        .ok_or_else(|| ClientError::Server("response carried neither data nor errors".to_string()))
}

#[async_trait]
impl NotesApi for GraphqlClient {
    async fn list_notes(&self, next_token: Option<&str>) -> Result<NotePage, ClientError> {
        let data: ListNotesData = self
            .execute(LIST_NOTES, json!({ "nextToken": next_token }))
            .await?;
        tracing::debug!(
            count = data.list_notes.items.len(),
            more = data.list_notes.next_token.is_some(),
            "listNotes page"
        );
        Ok(data.list_notes)
    }

    async fn create_note(&self, input: &CreateNoteInput) -> Result<Note, ClientError> {
        let data: CreateNoteData = self.execute(CREATE_NOTE, json!({ "input": input })).await?;
        Ok(data.create_note)
    }

    async fn update_note(&self, input: &UpdateNoteInput) -> Result<Note, ClientError> {
        let data: UpdateNoteData = self.execute(UPDATE_NOTE, json!({ "input": input })).await?;
        Ok(data.update_note)
    }

    async fn delete_note(&self, input: &DeleteNoteInput) -> Result<Note, ClientError> {
        let data: DeleteNoteData = self.execute(DELETE_NOTE, json!({ "input": input })).await?;
        Ok(data.delete_note)
    }
}
