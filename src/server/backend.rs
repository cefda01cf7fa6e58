//! In-memory state behind the mock server.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use thiserror::Error;
use uuid::Uuid;

use crate::api::NotePage;
use crate::models::*;

/// `listNotes` page size when the caller gives no limit.
pub const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("note not found: {0}")]
    NotFound(NoteId),
    #[error("invalid nextToken: {0}")]
    InvalidToken(String),
}

#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

#[derive(Default)]
struct Inner {
    notes: Vec<Note>,
    blobs: HashMap<String, StoredBlob>,
}

/// Notes and blobs held in memory, shared by every request handler.
#[derive(Clone, Default)]
pub struct MockBackend {
    inner: Arc<Mutex<Inner>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    // ============================================================
    // Notes
    // ============================================================

    /// Return up to `limit` notes after the offset encoded in `next_token`.
    pub fn list_notes(
        &self,
        limit: Option<usize>,
        next_token: Option<&str>,
    ) -> Result<NotePage, BackendError> {
        let offset = match next_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| BackendError::InvalidToken(token.to_string()))?,
            None => 0,
        };
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1);

        let inner = self.inner.lock();
        let items: Vec<Note> = inner.notes.iter().skip(offset).take(limit).cloned().collect();
        let end = offset + items.len();
        let next_token = (end < inner.notes.len()).then(|| end.to_string());
        Ok(NotePage { items, next_token })
    }

    pub fn create_note(&self, input: CreateNoteInput) -> Note {
        let now = Utc::now();
        let note = Note {
            id: NoteId::new(Uuid::new_v4().to_string()),
            name: input.name,
            description: input.description,
            price: input.price,
            image_key: input.image,
            image_url: None,
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.inner.lock().notes.push(note.clone());
        tracing::debug!(id = %note.id, "mock: created note");
        note
    }

    pub fn update_note(&self, input: UpdateNoteInput) -> Result<Note, BackendError> {
        let mut inner = self.inner.lock();
        let note = inner
            .notes
            .iter_mut()
            .find(|n| n.id == input.id)
            .ok_or_else(|| BackendError::NotFound(input.id.clone()))?;
        note.name = input.name;
        note.description = input.description;
        note.price = input.price;
        note.updated_at = Some(Utc::now());
        Ok(note.clone())
    }

    pub fn delete_note(&self, input: DeleteNoteInput) -> Result<Note, BackendError> {
        let mut inner = self.inner.lock();
        let pos = inner
            .notes
            .iter()
            .position(|n| n.id == input.id)
            .ok_or(BackendError::NotFound(input.id))?;
        Ok(inner.notes.remove(pos))
    }

    pub fn note_count(&self) -> usize {
        self.inner.lock().notes.len()
    }

    // ============================================================
    // Blobs
    // ============================================================

    /// Store a blob, silently replacing any blob with the same key.
    pub fn put_blob(&self, key: &str, bytes: Vec<u8>, content_type: Option<String>) {
        self.inner.lock().blobs.insert(
            key.to_string(),
            StoredBlob {
                bytes,
                content_type,
            },
        );
    }

    pub fn get_blob(&self, key: &str) -> Option<StoredBlob> {
        self.inner.lock().blobs.get(key).cloned()
    }

    /// Remove a blob. Returns whether it existed.
    pub fn remove_blob(&self, key: &str) -> bool {
        self.inner.lock().blobs.remove(key).is_some()
    }

    pub fn blob_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.lock().blobs.keys().cloned().collect();
        keys.sort();
        keys
    }
}
