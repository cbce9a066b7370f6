//! Tracking of open note windows.

use std::collections::HashMap;

use crate::host::WindowId;
use crate::note::{NoteId, NoteRecord};

/// An open note window and the state it was last synced to.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteWindow {
    /// Host handle of the window.
    pub window: WindowId,
    /// Write-through cache of the note's record.
    pub state: NoteRecord,
    /// Whether `load-note-data` has been delivered.
    pub hydrated: bool,
}

impl NoteWindow {
    /// Track a freshly created window showing `state`.
    #[must_use]
    pub fn new(window: WindowId, state: NoteRecord) -> Self {
        Self {
            window,
            state,
            hydrated: false,
        }
    }
}

/// Mapping from note id to its open window. At most one window per note.
#[derive(Debug, Default)]
pub struct WindowRegistry {
    entries: HashMap<NoteId, NoteWindow>,
}

impl WindowRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The window tracked for `id`.
    #[must_use]
    pub fn get(&self, id: &NoteId) -> Option<&NoteWindow> {
        self.entries.get(id)
    }

    /// Mutable access to the window tracked for `id`.
    pub fn get_mut(&mut self, id: &NoteId) -> Option<&mut NoteWindow> {
        self.entries.get_mut(id)
    }

    /// Track `entry` under `id`, returning any entry it replaced.
    pub fn put(&mut self, id: NoteId, entry: NoteWindow) -> Option<NoteWindow> {
        self.entries.insert(id, entry)
    }

    /// Stop tracking `id`.
    pub fn remove(&mut self, id: &NoteId) -> Option<NoteWindow> {
        self.entries.remove(id)
    }

    /// Visit every tracked window.
    pub fn for_each(&self, mut f: impl FnMut(&NoteId, &NoteWindow)) {
        for (id, entry) in &self.entries {
            f(id, entry);
        }
    }

    /// The note shown in `window`, if any.
    #[must_use]
    pub fn note_for_window(&self, window: WindowId) -> Option<NoteId> {
        let mut found = None;
        self.for_each(|id, entry| {
            if entry.window == window {
                found = Some(id.clone());
            }
        });
        found
    }

    /// Number of tracked windows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no windows are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
