//! Plain-text rendering of the note list.

use crate::controller::AppState;
use crate::models::{format_price, EditDraft, Note};

const EDIT_MARKER: &str = "✎";

/// Render the visible notes as a table followed by the total line.
///
/// Example output:
/// ```text
/// Total Price: $6.75
///
///   ID        NAME   DESCRIPTION  PRICE  IMAGE
///   1f0c…     Soup   Tomato       $4.50  https://…/lunch.jpg
/// ✎ 9ab2…     Tea    Green        $2.25  -
/// ```
///
/// The row in edit mode shows its draft values instead of the stored ones.
pub fn render_state(state: &AppState) -> String {
    let notes: Vec<&Note> = state.visible().collect();
    render_notes(&notes, state.editing(), &state.total_price())
}

pub fn render_notes(notes: &[&Note], editing: Option<&EditDraft>, total: &str) -> String {
    let mut output = format!("Total Price: ${}\n", total);
    if notes.is_empty() {
        output.push_str("\nNo notes yet.\n");
        return output;
    }

    let rows: Vec<[String; 5]> = notes
        .iter()
        .map(|note| match editing.filter(|draft| draft.id == note.id) {
            Some(draft) => [
                note.id.to_string(),
                draft.name.clone(),
                draft.description.clone(),
                format!("${}", draft.price),
                image_cell(note),
            ],
            None => [
                note.id.to_string(),
                note.name.clone(),
                note.description.clone(),
                format!("${}", format_price(note.price)),
                image_cell(note),
            ],
        })
        .collect();

    let header = ["ID", "NAME", "DESCRIPTION", "PRICE", "IMAGE"].map(str::to_string);
    let mut widths = header.clone().map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    output.push('\n');
    push_row(&mut output, "  ", &header, &widths);
    for (note, row) in notes.iter().zip(rows.iter()) {
        let marker = if editing.is_some_and(|draft| draft.id == note.id) {
            EDIT_MARKER
        } else {
            " "
        };
        push_row(&mut output, &format!("{marker} "), row, &widths);
    }
    output
}

fn image_cell(note: &Note) -> String {
    note.image_url
        .clone()
        .or_else(|| note.blob_key().map(|key| format!("({key})")))
        .unwrap_or_else(|| "-".to_string())
}

fn push_row(output: &mut String, prefix: &str, cells: &[String; 5], widths: &[usize; 5]) {
    output.push_str(prefix);
    let last = cells.len() - 1;
    for (i, (cell, width)) in cells.iter().zip(widths.iter()).enumerate() {
        if i == last {
            output.push_str(cell);
        } else {
            let pad = width.saturating_sub(cell.chars().count());
            output.push_str(cell);
            output.push_str(&" ".repeat(pad + 2));
        }
    }
    output.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NoteId;

    fn note(id: &str, name: &str, price: f64) -> Note {
        Note {
            id: NoteId::new(id),
            name: name.to_string(),
            description: format!("{name} description"),
            price,
            image_key: None,
            image_url: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn empty_list_shows_zero_total() {
        let output = render_notes(&[], None, "0.00");
        assert!(output.starts_with("Total Price: $0.00\n"));
        assert!(output.contains("No notes yet."));
    }

    #[test]
    fn prices_render_with_two_decimals() {
        let soup = note("a", "Soup", 4.5);
        let output = render_notes(&[&soup], None, "4.50");

        assert!(output.contains("$4.50"));
        assert!(output.contains("Soup"));
    }

    #[test]
    fn edited_row_shows_draft_values_and_marker() {
        let soup = note("a", "Soup", 4.5);
        let tea = note("b", "Tea", 2.0);
        let mut draft = EditDraft::from_note(&tea);
        draft.name = "Matcha".to_string();

        let output = render_notes(&[&soup, &tea], Some(&draft), "6.50");

        let edited = output
            .lines()
            .find(|line| line.contains("Matcha"))
            .expect("draft row rendered");
        assert!(edited.starts_with(EDIT_MARKER));
        assert!(edited.contains("Tea description"));
    }

    #[test]
    fn unresolved_image_shows_its_key() {
        let mut lunch = note("a", "Lunch", 1.0);
        lunch.image_key = Some("lunch.jpg".to_string());

        let output = render_notes(&[&lunch], None, "1.00");
        assert!(output.contains("(lunch.jpg)"));
    }
}
