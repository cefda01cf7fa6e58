use serde::{Deserialize, Serialize};

use super::note::{parse_price, CreateNoteInput, Note, NoteId, UpdateNoteInput};
use crate::error::NotesError;

/// An image file chosen for a new note.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    /// The file's own name. Used verbatim as the storage key.
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).map(str::to_string);
        Self {
            file_name,
            bytes,
            content_type,
        }
    }
}

/// Best-effort content type from a file extension.
fn content_type_for(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// The values submitted by the "add note" form.
///
/// Presence of name, description and price is enforced by whatever collects
/// the form; only the price text is checked here, when it is coerced.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub image: Option<ImageUpload>,
}

impl NoteForm {
    /// The upload to perform, if a file with a non-empty name was chosen.
    pub fn upload(&self) -> Option<&ImageUpload> {
        self.image
            .as_ref()
            .filter(|image| !image.file_name.is_empty())
    }

    /// Build the `createNote` input, keyed by the upload's file name.
    pub fn to_input(&self) -> Result<CreateNoteInput, NotesError> {
        Ok(CreateNoteInput {
            name: self.name.clone(),
            description: self.description.clone(),
            price: parse_price(&self.price)?,
            image: self.upload().map(|image| image.file_name.clone()),
        })
    }
}

/// One of the three editable fields of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditField {
    Name,
    Description,
    Price,
}

/// Uncommitted values for the row currently in edit mode.
///
/// All three fields are committed together, so editing two fields before
/// saving can never lose one of them to a stale sibling value.
#[derive(Debug, Clone, PartialEq)]
pub struct EditDraft {
    pub id: NoteId,
    pub name: String,
    pub description: String,
    /// Kept as text until commit so partially typed numbers survive.
    pub price: String,
}

impl EditDraft {
    pub fn from_note(note: &Note) -> Self {
        Self {
            id: note.id.clone(),
            name: note.name.clone(),
            description: note.description.clone(),
            price: note.price.to_string(),
        }
    }

    pub fn set(&mut self, field: EditField, value: impl Into<String>) {
        let value = value.into();
        match field {
            EditField::Name => self.name = value,
            EditField::Description => self.description = value,
            EditField::Price => self.price = value,
        }
    }

    pub fn to_update(&self) -> Result<UpdateNoteInput, NotesError> {
        Ok(UpdateNoteInput {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            price: parse_price(&self.price)?,
        })
    }
}
