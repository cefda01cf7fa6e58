//! GraphQL documents sent to the notes API.

/// Fields selected for every note returned by the API.
macro_rules! note_fields {
    () => {
        "id name description price image createdAt updatedAt"
    };
}

pub const LIST_NOTES: &str = concat!(
    "query ListNotes($limit: Int, $nextToken: String) {",
    " listNotes(limit: $limit, nextToken: $nextToken) {",
    " items { ",
    note_fields!(),
    " } nextToken } }"
);

pub const CREATE_NOTE: &str = concat!(
    "mutation CreateNote($input: CreateNoteInput!) {",
    " createNote(input: $input) { ",
    note_fields!(),
    " } }"
);

pub const UPDATE_NOTE: &str = concat!(
    "mutation UpdateNote($input: UpdateNoteInput!) {",
    " updateNote(input: $input) { ",
    note_fields!(),
    " } }"
);

pub const DELETE_NOTE: &str = concat!(
    "mutation DeleteNote($input: DeleteNoteInput!) {",
    " deleteNote(input: $input) { ",
    note_fields!(),
    " } }"
);

/// Root fields understood by the API, in document order.
pub const ROOT_FIELDS: [&str; 4] = ["listNotes", "createNote", "updateNote", "deleteNote"];
