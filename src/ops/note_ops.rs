use chrono::{DateTime, Local};

use crate::io::store::{KEY_NOTES, Store};
use crate::model::Note;
use crate::ops::{OpsError, required};

pub fn add_note(store: &Store, text: &str, now: DateTime<Local>) -> Result<Note, OpsError> {
    let text = required(text, "note")?;
    Ok(store.append(
        KEY_NOTES,
        Note {
            id: 0,
            text: text.to_string(),
            timestamp: now,
        },
    )?)
}

/// Notes, newest first.
pub fn list_notes(store: &Store) -> Vec<Note> {
    let mut notes = store.all::<Note>();
    notes.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
    notes
}

pub fn remove_note(store: &Store, id: u64) -> Result<Note, OpsError> {
    let note = store
        .all::<Note>()
        .into_iter()
        .find(|n| n.id == id)
        .ok_or_else(|| OpsError::NotFound {
            kind: "note",
            query: id.to_string(),
        })?;
    store.remove(KEY_NOTES, id)?;
    Ok(note)
}
