use std::collections::HashSet;

use log::{debug, error, info, trace, warn};
use serde_json::Value;

use crate::{
    normalize_record, IdGenerator, KeyValueStore, Note, NoteboxError, StorageNotice, NOTES_KEY,
};

/// Owns the canonical, newest-first collection of notes.
///
/// The collection is read from the store on first access and written back in
/// full after every mutation. Store failures never reach the caller: the
/// repository keeps working on its in-memory copy and raises a one-time
/// [`StorageNotice`]. If the store could not be read, nothing is written back
/// for the rest of the session so unread notes are never overwritten.
pub struct NoteRepository<S: KeyValueStore> {
    /// Backing key-value store
    store: S,

    /// Notes, newest first
    notes: Vec<Note>,

    /// Whether `notes` reflects the store yet
    loaded: bool,

    /// The store could not be read; work in memory only
    degraded: bool,

    ids: IdGenerator,

    /// Pending user-visible warning about storage
    notice: Option<StorageNotice>,

    /// Set once a notice has been raised, so it is never raised twice
    notice_raised: bool,
}

impl<S: KeyValueStore> NoteRepository<S> {
    /// Creates a repository over `store`. Nothing is read until first access.
    pub fn new(store: S) -> Self {
        Self {
            store,
            notes: Vec::new(),
            loaded: false,
            degraded: false,
            ids: IdGenerator::new(),
            notice: None,
            notice_raised: false,
        }
    }

    /// (Re)loads every note from the store, replacing the in-memory copy.
    ///
    /// A missing key yields an empty collection. Data that does not parse as
    /// a JSON array is discarded and logged; records that are not objects are
    /// dropped and the rest are normalized.
    pub fn load_all(&mut self) -> &[Note] {
        self.loaded = true;
        self.notes = match self.store.load(NOTES_KEY) {
            Ok(Some(raw)) => self.parse_notes(&raw),
            Ok(None) => {
                debug!("No stored notes found");
                Vec::new()
            }
            Err(e) => {
                error!("Failed to load notes, continuing in memory: {}", e);
                self.degraded = true;
                self.raise_notice(&e);
                Vec::new()
            }
        };

        info!("Loaded {} notes", self.notes.len());
        &self.notes
    }

    fn parse_notes(&mut self, raw: &str) -> Vec<Note> {
        let records = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(records)) => records,
            Ok(other) => {
                let anomaly = NoteboxError::MalformedPersistedData {
                    key: NOTES_KEY.to_string(),
                    message: format!("expected an array, found {}", json_kind(&other)),
                };
                warn!("{}; starting with no notes", anomaly);
                return Vec::new();
            }
            Err(e) => {
                let anomaly = NoteboxError::MalformedPersistedData {
                    key: NOTES_KEY.to_string(),
                    message: e.to_string(),
                };
                warn!("{}; starting with no notes", anomaly);
                return Vec::new();
            }
        };

        // Observe every valid id first so replacement ids never collide
        for id in records.iter().filter_map(|r| r.get("id").and_then(Value::as_u64)) {
            self.ids.observe(id);
        }

        let mut seen = HashSet::with_capacity(records.len());
        let mut notes = Vec::with_capacity(records.len());
        for record in &records {
            if let Some(mut note) = normalize_record(record, &mut self.ids) {
                if !seen.insert(note.id) {
                    let fresh = self.ids.next_id();
                    warn!("Duplicate note id {} in storage, reassigned {}", note.id, fresh);
                    note.id = fresh;
                    seen.insert(fresh);
                }
                notes.push(note);
            }
        }

        if notes.len() != records.len() {
            warn!("Discarded {} invalid stored notes", records.len() - notes.len());
        }
        notes
    }

    fn ensure_loaded(&mut self) {
        if !self.loaded {
            self.load_all();
        }
    }

    /// Returns all notes, or only those whose title or content contains
    /// `filter` ignoring case. Order is always newest first.
    pub fn list(&mut self, filter: Option<&str>) -> Vec<Note> {
        self.ensure_loaded();

        match filter {
            None | Some("") => self.notes.clone(),
            Some(term) => {
                let term = term.to_lowercase();
                let matches: Vec<Note> = self
                    .notes
                    .iter()
                    .filter(|note| note.matches_lowercase(&term))
                    .cloned()
                    .collect();
                debug!("Filter '{}' matched {} notes", term, matches.len());
                matches
            }
        }
    }

    /// The `count` most recently created notes.
    pub fn recent(&mut self, count: usize) -> Vec<Note> {
        self.ensure_loaded();
        self.notes.iter().take(count).cloned().collect()
    }

    /// Retrieves a note by its ID
    pub fn get(&mut self, id: u64) -> Option<Note> {
        self.ensure_loaded();
        self.notes.iter().find(|note| note.id == id).cloned()
    }

    pub fn len(&mut self) -> usize {
        self.ensure_loaded();
        self.notes.len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    /// Creates a note and puts it at the front of the collection.
    ///
    /// Title and content are trimmed. Nothing happens if the content is empty
    /// after trimming.
    ///
    /// # Returns
    ///
    /// The new note, or `None` when nothing was created
    pub fn add(&mut self, title: &str, content: &str, is_markdown: bool) -> Option<Note> {
        self.ensure_loaded();

        let content = content.trim();
        if content.is_empty() {
            debug!("Ignoring note with empty content");
            return None;
        }

        let note = Note::new(
            self.ids.next_id(),
            title.trim().to_string(),
            content.to_string(),
            is_markdown,
        );
        info!("Creating note: {}", note.id);

        self.notes.insert(0, note.clone());
        self.persist();
        Some(note)
    }

    /// Replaces the content of note `id`. Unknown ids are ignored.
    pub fn update(&mut self, id: u64, content: &str) {
        self.ensure_loaded();

        match self.notes.iter_mut().find(|note| note.id == id) {
            Some(note) => {
                info!("Updating note: {}", id);
                note.content = content.to_string();
            }
            None => {
                debug!("Cannot update note {}: not found", id);
                return;
            }
        }
        self.persist();
    }

    /// Replaces the title of note `id`. Unknown ids are ignored.
    pub fn update_title(&mut self, id: u64, title: &str) {
        self.ensure_loaded();

        match self.notes.iter_mut().find(|note| note.id == id) {
            Some(note) => {
                info!("Renaming note: {}", id);
                note.title = title.trim().to_string();
            }
            None => {
                debug!("Cannot rename note {}: not found", id);
                return;
            }
        }
        self.persist();
    }

    /// Removes note `id`. Unknown ids are ignored.
    pub fn delete(&mut self, id: u64) {
        self.ensure_loaded();

        let before = self.notes.len();
        self.notes.retain(|note| note.id != id);
        if self.notes.len() == before {
            debug!("Cannot delete note {}: not found", id);
            return;
        }

        info!("Deleted note: {}", id);
        self.persist();
    }

    /// Drops every note and removes the stored key entirely.
    pub fn clear(&mut self) {
        self.loaded = true;
        self.notes.clear();

        if self.degraded {
            debug!("Store unreadable this session, not removing stored notes");
            return;
        }

        match self.store.remove(NOTES_KEY) {
            Ok(()) => info!("Cleared all notes"),
            Err(e) => {
                error!("Failed to remove stored notes: {}", e);
                self.raise_notice(&e);
            }
        }
    }

    /// The pending storage warning, if any.
    pub fn notice(&self) -> Option<&StorageNotice> {
        self.notice.as_ref()
    }

    /// Hands out the storage warning. It is raised at most once per session.
    pub fn take_notice(&mut self) -> Option<StorageNotice> {
        self.notice.take()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Writes the whole collection back to the store.
    fn persist(&mut self) {
        if self.degraded {
            debug!("Store unreadable this session, keeping {} notes in memory", self.notes.len());
            return;
        }

        let json = match serde_json::to_string(&self.notes) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize notes: {}", e);
                self.raise_notice(&NoteboxError::Serialization(e));
                return;
            }
        };

        trace!("Persisting {} notes ({} bytes)", self.notes.len(), json.len());
        if let Err(e) = self.store.save(NOTES_KEY, &json) {
            error!("Failed to save notes, keeping them in memory: {}", e);
            self.raise_notice(&e);
        }
    }

    fn raise_notice(&mut self, err: &NoteboxError) {
        if !self.notice_raised {
            self.notice_raised = true;
            self.notice = Some(StorageNotice::new(NOTES_KEY, err.to_string()));
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
