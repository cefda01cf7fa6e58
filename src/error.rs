//! Error types shared by the collaborator clients and the controller.

use thiserror::Error;

use crate::models::NoteId;

/// Failures reported by the API or storage collaborators.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: sign in again or check FOOD_NOTES_TOKEN")]
    Unauthorized,

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("Server error: {0}")]
    Server(String),
}

/// Failures of a [`NoteListController`](crate::controller::NoteListController) operation.
#[derive(Debug, Error)]
pub enum NotesError {
    #[error("API call failed: {0}")]
    Api(#[source] ClientError),

    #[error("Storage call failed: {0}")]
    Storage(#[source] ClientError),

    #[error("Invalid price: {0:?}")]
    InvalidPrice(String),

    #[error("Note not found: {0}")]
    NoteNotFound(NoteId),

    #[error("No note is being edited")]
    NotEditing,
}

impl NotesError {
    /// Whether the backend rejected our credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            NotesError::Api(ClientError::Unauthorized)
                | NotesError::Storage(ClientError::Unauthorized)
        )
    }
}
