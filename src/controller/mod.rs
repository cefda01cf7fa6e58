//! The note list controller: fetch, create, edit and delete notes against
//! the API and storage collaborators while keeping an explicit [`AppState`].
//!
//! Operations take `&self` so several can be in flight at once. The state
//! lock is only taken between suspension points, never across one, so
//! completions apply in whatever order the backend answers.

mod state;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use futures::future::try_join_all;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub use state::AppState;

use crate::api::NotesApi;
use crate::error::{ClientError, NotesError};
use crate::models::*;
use crate::storage::BlobStore;

/// How local state is brought back in line after a create or update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Re-list the whole collection.
    #[default]
    Refetch,
    /// Merge only the record returned by the mutation.
    Merge,
}

impl FromStr for SyncMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "refetch" => Ok(SyncMode::Refetch),
            "merge" => Ok(SyncMode::Merge),
            other => Err(format!("unknown sync mode: {other}")),
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::Refetch => f.write_str("refetch"),
            SyncMode::Merge => f.write_str("merge"),
        }
    }
}

pub struct NoteListController<A, S> {
    api: A,
    storage: S,
    sync_mode: SyncMode,
    state: Mutex<AppState>,
}

impl<A: NotesApi, S: BlobStore> NoteListController<A, S> {
    pub fn new(api: A, storage: S) -> Self {
        Self {
            api,
            storage,
            sync_mode: SyncMode::default(),
            state: Mutex::new(AppState::new()),
        }
    }

    pub fn with_sync_mode(mut self, sync_mode: SyncMode) -> Self {
        self.sync_mode = sync_mode;
        self
    }

    // ============================================================
    // Read side
    // ============================================================

    /// Snapshot of the visible working set.
    pub fn notes(&self) -> Vec<Note> {
        self.state.lock().visible().cloned().collect()
    }

    pub fn find(&self, id: &NoteId) -> Option<Note> {
        self.state.lock().find(id).cloned()
    }

    /// The row in edit mode and its uncommitted values.
    pub fn editing(&self) -> Option<EditDraft> {
        self.state.lock().editing().cloned()
    }

    /// Sum of all visible prices, formatted with two decimals.
    pub fn total_price(&self) -> String {
        self.state.lock().total_price()
    }

    /// A copy of the full state, for rendering or inspection.
    pub fn snapshot(&self) -> AppState {
        self.state.lock().clone()
    }

    // ============================================================
    // Fetch
    // ============================================================

    /// Replace the working set with the backend's full collection.
    ///
    /// Display URLs for every note with an image are resolved concurrently;
    /// if any resolution fails the whole fetch fails and the working set is
    /// left as it was. A fetch overtaken by a newer one is discarded.
    /// A `nextToken` handed out twice fails the fetch instead of looping.
    pub async fn fetch_all(&self) -> Result<(), NotesError> {
        let generation = self.state.lock().begin_fetch();

        let mut notes = Vec::new();
        let mut next_token: Option<String> = None;
        let mut seen_tokens = HashSet::new();
        loop {
            let page = self
                .api
                .list_notes(next_token.as_deref())
                .await
                .map_err(NotesError::Api)?;
            notes.extend(page.items);
            match page.next_token {
                Some(token) if !token.is_empty() => {
                    if !seen_tokens.insert(token.clone()) {
                        warn!(token = %token, "listNotes repeated a nextToken");
                        return Err(NotesError::Api(ClientError::Server(format!(
                            "listNotes repeated nextToken {token}"
                        ))));
                    }
                    next_token = Some(token);
                }
                _ => break,
            }
        }

        let notes = try_join_all(notes.into_iter().map(|note| self.resolve_image(note))).await?;
        let count = notes.len();

        if self.state.lock().apply_fetch(generation, notes) {
            debug!(count, generation, "working set replaced");
        } else {
            debug!(generation, "discarding fetch overtaken by a newer one");
        }
        Ok(())
    }

    async fn resolve_image(&self, mut note: Note) -> Result<Note, NotesError> {
        if let Some(key) = note.blob_key().map(str::to_string) {
            let url = self
                .storage
                .get_url(&key)
                .await
                .map_err(NotesError::Storage)?;
            note.image_url = Some(url);
        }
        Ok(note)
    }

    /// Bring local state in line after `note` was written.
    async fn resync(&self, note: Note) -> Result<(), NotesError> {
        match self.sync_mode {
            SyncMode::Refetch => self.fetch_all().await,
            SyncMode::Merge => {
                let known_url = self.state.lock().known_image_url(&note);
                let note = match known_url {
                    Some(url) => Note {
                        image_url: Some(url),
                        ..note
                    },
                    None => self.resolve_image(note).await?,
                };
                self.state.lock().merge(note);
                Ok(())
            }
        }
    }

    // ============================================================
    // Create
    // ============================================================

    /// Upload the form's image (if any), insert the record, then resync.
    ///
    /// The image is stored under its own file name; an existing blob with
    /// that name is overwritten. The form is consumed.
    pub async fn create(&self, form: NoteForm) -> Result<Note, NotesError> {
        let input = form.to_input()?;

        if let Some(upload) = form.image.filter(|image| !image.file_name.is_empty()) {
            self.storage
                .put(
                    &upload.file_name,
                    upload.bytes,
                    upload.content_type.as_deref(),
                )
                .await
                .map_err(NotesError::Storage)?;
        }

        let created = self
            .api
            .create_note(&input)
            .await
            .map_err(NotesError::Api)?;
        info!(id = %created.id, name = %created.name, "created note");

        self.resync(created.clone()).await?;
        Ok(created)
    }

    // ============================================================
    // Update
    // ============================================================

    /// Replace a note's name, description and price in one mutation.
    ///
    /// The payload is built only from the arguments, so two calls built
    /// from the same stale snapshot race: whichever completes last decides
    /// all three fields. Use the edit flow ([`Self::commit_edit`]) to save
    /// several edited fields together.
    pub async fn update(
        &self,
        id: &NoteId,
        name: &str,
        description: &str,
        price: &str,
    ) -> Result<Note, NotesError> {
        let input = UpdateNoteInput {
            id: id.clone(),
            name: name.to_string(),
            description: description.to_string(),
            price: parse_price(price)?,
        };
        self.apply_update(input).await
    }

    async fn apply_update(&self, input: UpdateNoteInput) -> Result<Note, NotesError> {
        let updated = self
            .api
            .update_note(&input)
            .await
            .map_err(NotesError::Api)?;
        info!(id = %updated.id, "updated note");

        self.state.lock().finish_edit(&input.id);
        self.resync(updated.clone()).await?;
        Ok(updated)
    }

    // ============================================================
    // Edit mode
    // ============================================================

    /// Show `id` with editable fields.
    ///
    /// Only one row is editable at a time; switching rows drops the other
    /// row's uncommitted values without a network call.
    pub fn begin_edit(&self, id: &NoteId) -> Result<EditDraft, NotesError> {
        let mut state = self.state.lock();
        if let Some(abandoned) = state.begin_edit(id)? {
            debug!(id = %abandoned.id, "abandoning uncommitted edit");
        }
        state.editing().cloned().ok_or(NotesError::NotEditing)
    }

    /// Change one field of the current draft.
    pub fn set_draft(&self, field: EditField, value: impl Into<String>) -> Result<(), NotesError> {
        if self.state.lock().set_draft(field, value.into()) {
            Ok(())
        } else {
            Err(NotesError::NotEditing)
        }
    }

    /// Leave edit mode without saving.
    pub fn cancel_edit(&self) -> Option<EditDraft> {
        self.state.lock().cancel_edit()
    }

    /// Save every field of the current draft in a single update.
    ///
    /// The draft stays in place if the update fails, so it can be retried.
    pub async fn commit_edit(&self) -> Result<Note, NotesError> {
        let draft = self.editing().ok_or(NotesError::NotEditing)?;
        let input = draft.to_update()?;
        self.apply_update(input).await
    }

    // ============================================================
    // Delete
    // ============================================================

    /// Delete a note: hide it immediately, remove its blob, then delete
    /// the record.
    ///
    /// The row disappears from [`Self::notes`] before any network call is
    /// made. If either call fails the row is shown again and the error is
    /// returned; the record delete is not attempted after a failed blob
    /// removal.
    pub async fn delete(&self, note: &Note) -> Result<(), NotesError> {
        self.state.lock().tombstone(&note.id);

        if let Some(key) = note.blob_key() {
            if let Err(e) = self.storage.remove(key).await {
                warn!(id = %note.id, error = %e, "blob removal failed, restoring note");
                self.state.lock().restore(&note.id);
                return Err(NotesError::Storage(e));
            }
        }

        let input = DeleteNoteInput {
            id: note.id.clone(),
        };
        if let Err(e) = self.api.delete_note(&input).await {
            warn!(id = %note.id, error = %e, "record delete failed, restoring note");
            let mut state = self.state.lock();
            state.restore(&note.id);
            if note.blob_key().is_some() {
                state.clear_image_url(&note.id);
            }
            return Err(NotesError::Api(e));
        }

        self.state.lock().forget(&note.id);
        info!(id = %note.id, "deleted note");
        Ok(())
    }

    /// Delete the visible note with the given id.
    pub async fn delete_by_id(&self, id: &NoteId) -> Result<(), NotesError> {
        let note = self
            .find(id)
            .ok_or_else(|| NotesError::NoteNotFound(id.clone()))?;
        self.delete(&note).await
    }
}
