//! The notes API collaborator.
//!
//! [`NotesApi`] is the contract the controller depends on; [`GraphqlClient`]
//! implements it over GraphQL-on-HTTP.

mod client;
pub mod documents;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use client::{GraphqlClient, DEFAULT_URL as DEFAULT_API_URL};

use crate::error::ClientError;
use crate::models::{CreateNoteInput, DeleteNoteInput, Note, UpdateNoteInput};

/// One page of `listNotes`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePage {
    pub items: Vec<Note>,
    #[serde(default)]
    pub next_token: Option<String>,
}

/// Query and mutation execution against the notes backend.
#[async_trait]
pub trait NotesApi: Send + Sync {
    /// Fetch one page of notes, starting after `next_token`.
    async fn list_notes(&self, next_token: Option<&str>) -> Result<NotePage, ClientError>;

    async fn create_note(&self, input: &CreateNoteInput) -> Result<Note, ClientError>;

    async fn update_note(&self, input: &UpdateNoteInput) -> Result<Note, ClientError>;

    async fn delete_note(&self, input: &DeleteNoteInput) -> Result<Note, ClientError>;
}

#[async_trait]
impl<T: NotesApi + ?Sized> NotesApi for Arc<T> {
    async fn list_notes(&self, next_token: Option<&str>) -> Result<NotePage, ClientError> {
        (**self).list_notes(next_token).await
    }

    async fn create_note(&self, input: &CreateNoteInput) -> Result<Note, ClientError> {
        (**self).create_note(input).await
    }

    async fn update_note(&self, input: &UpdateNoteInput) -> Result<Note, ClientError> {
        (**self).update_note(input).await
    }

    async fn delete_note(&self, input: &DeleteNoteInput) -> Result<Note, ClientError> {
        (**self).delete_note(input).await
    }
}
