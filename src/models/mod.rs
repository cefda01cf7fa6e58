//! Domain models for food-notes.
//!
//! - [`Note`]: a priced record with an optional image. The persisted storage
//!   key ([`Note::image_key`]) and the resolved display URL
//!   ([`Note::image_url`]) are separate attributes.
//! - [`CreateNoteInput`], [`UpdateNoteInput`], [`DeleteNoteInput`]: mutation
//!   payloads sent to the API.
//! - [`NoteForm`] and [`EditDraft`]: user input before it becomes a payload.

mod form;
mod note;

pub use form::*;
pub use note::*;
