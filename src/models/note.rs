use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::NotesError;

/// Opaque record identifier assigned by the API on creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub String);

impl NoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A priced note as returned by `listNotes`.
///
/// The wire attribute `image` holds the storage key of the uploaded blob and
/// is kept in [`Note::image_key`]. The time-limited display URL resolved from
/// that key lives in [`Note::image_url`], which is never serialized, so no
/// payload built from a `Note` can carry a resolved URL back to the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub name: String,
    pub description: String,
    pub price: f64,
    /// Storage key of the attached image, if any.
    #[serde(rename = "image", default, skip_serializing_if = "Option::is_none")]
    pub image_key: Option<String>,
    /// Display URL resolved from `image_key`. Client-side only.
    #[serde(skip)]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Note {
    /// The storage key to resolve or remove, ignoring empty keys.
    pub fn blob_key(&self) -> Option<&str> {
        self.image_key.as_deref().filter(|key| !key.is_empty())
    }
}

/// Input for the `createNote` mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateNoteInput {
    pub name: String,
    pub description: String,
    pub price: f64,
    /// Storage key of an already uploaded blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Input for the `updateNote` mutation. Images cannot be changed after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateNoteInput {
    pub id: NoteId,
    pub name: String,
    pub description: String,
    pub price: f64,
}

/// Input for the `deleteNote` mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteNoteInput {
    pub id: NoteId,
}

/// Parse user-entered price text into a float.
///
/// Surrounding whitespace is ignored. Non-numeric and non-finite values are
/// rejected rather than silently truncated.
pub fn parse_price(input: &str) -> Result<f64, NotesError> {
    let trimmed = input.trim();
    match trimmed.parse::<f64>() {
        Ok(price) if price.is_finite() => Ok(price),
        _ => Err(NotesError::InvalidPrice(input.to_string())),
    }
}

/// Format a price the way it is displayed: two decimals.
pub fn format_price(price: f64) -> String {
    format!("{:.2}", price)
}
