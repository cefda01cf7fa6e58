use std::collections::HashSet;

use crate::error::NotesError;
use crate::models::{format_price, EditDraft, EditField, Note, NoteId};

/// Everything the note list shows, owned explicitly instead of living in
/// ambient UI state.
///
/// `notes` is the last fetched snapshot. Rows being deleted stay in the
/// snapshot but are hidden through `tombstones` until the backend confirms,
/// so a failed delete can put them back.
#[derive(Debug, Default, Clone)]
pub struct AppState {
    notes: Vec<Note>,
    editing: Option<EditDraft>,
    tombstones: HashSet<NoteId>,
    fetch_generation: u64,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notes currently shown, in fetch order.
    pub fn visible(&self) -> impl Iterator<Item = &Note> {
        self.notes
            .iter()
            .filter(|note| !self.tombstones.contains(&note.id))
    }

    pub fn find(&self, id: &NoteId) -> Option<&Note> {
        self.visible().find(|note| &note.id == id)
    }

    /// Sum of the visible prices with two decimals.
    pub fn total_price(&self) -> String {
        // `Sum for f64` starts at -0.0, which would format as "-0.00".
        format_price(self.visible().fold(0.0, |total, note| total + note.price))
    }

    // ============================================================
    // Fetch bookkeeping
    // ============================================================

    /// Reserve a generation number for a fetch about to start.
    pub fn begin_fetch(&mut self) -> u64 {
        self.fetch_generation += 1;
        self.fetch_generation
    }

    /// Replace the snapshot with a completed fetch.
    ///
    /// Returns `false` and leaves the snapshot alone when a newer fetch was
    /// started after this one.
    pub fn apply_fetch(&mut self, generation: u64, notes: Vec<Note>) -> bool {
        if generation != self.fetch_generation {
            return false;
        }
        self.notes = notes;
        true
    }

    /// Insert or replace a single record, keeping its position.
    pub fn merge(&mut self, note: Note) {
        match self.notes.iter_mut().find(|n| n.id == note.id) {
            Some(existing) => *existing = note,
            None => self.notes.push(note),
        }
    }

    /// A display URL already resolved for the same storage key.
    pub fn known_image_url(&self, note: &Note) -> Option<String> {
        let key = note.blob_key()?;
        self.notes
            .iter()
            .find(|n| n.id == note.id && n.blob_key() == Some(key))
            .and_then(|n| n.image_url.clone())
    }

    // ============================================================
    // Delete bookkeeping
    // ============================================================

    /// Hide a row pending its remote deletion.
    pub fn tombstone(&mut self, id: &NoteId) {
        self.tombstones.insert(id.clone());
        if self.editing.as_ref().is_some_and(|draft| &draft.id == id) {
            self.editing = None;
        }
    }

    /// Show a row again after its deletion failed.
    pub fn restore(&mut self, id: &NoteId) {
        self.tombstones.remove(id);
    }

    /// Drop the display URL of a row whose blob no longer exists.
    pub fn clear_image_url(&mut self, id: &NoteId) {
        if let Some(note) = self.notes.iter_mut().find(|n| &n.id == id) {
            note.image_url = None;
        }
    }

    /// Remove a row for good once the backend confirmed its deletion.
    pub fn forget(&mut self, id: &NoteId) {
        self.tombstones.remove(id);
        self.notes.retain(|note| &note.id != id);
    }

    pub fn is_tombstoned(&self, id: &NoteId) -> bool {
        self.tombstones.contains(id)
    }

    // ============================================================
    // Edit mode
    // ============================================================

    pub fn editing(&self) -> Option<&EditDraft> {
        self.editing.as_ref()
    }

    /// Put `id` in edit mode, abandoning any other row's uncommitted draft.
    ///
    /// Returns the abandoned draft, if there was one for a different row.
    pub fn begin_edit(&mut self, id: &NoteId) -> Result<Option<EditDraft>, NotesError> {
        let draft = EditDraft::from_note(
            self.find(id)
                .ok_or_else(|| NotesError::NoteNotFound(id.clone()))?,
        );
        let previous = self.editing.replace(draft);
        Ok(previous.filter(|prev| &prev.id != id))
    }

    pub fn set_draft(&mut self, field: EditField, value: String) -> bool {
        match self.editing.as_mut() {
            Some(draft) => {
                draft.set(field, value);
                true
            }
            None => false,
        }
    }

    pub fn cancel_edit(&mut self) -> Option<EditDraft> {
        self.editing.take()
    }

    /// Leave edit mode after `id` was saved, unless another row took over.
    pub fn finish_edit(&mut self, id: &NoteId) {
        if self.editing.as_ref().is_some_and(|draft| &draft.id == id) {
            self.editing = None;
        }
    }
}
