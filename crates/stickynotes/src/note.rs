//! Core note types for stickynotes.
//!
//! This module defines the persisted note record, the partial patches surfaces
//! send back, and the identifiers that key both the store and the window
//! registry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::config::{NoteWindowConfig, DEFAULT_NOTE_COLOR};
use crate::error::{Error, Result};
use crate::host::Bounds;

/// Longest identifier accepted as a storage key.
const MAX_ID_LEN: usize = 64;

/// Size used when a record on disk carries no geometry.
const FALLBACK_SIZE: u32 = 300;

/// Opaque, immutable identifier of a note.
///
/// Ids are used verbatim as file names, so only ASCII alphanumerics, `-` and
/// `_` are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NoteId(String);

impl NoteId {
    /// Generate a fresh, never-before-used id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Validate an id received from a surface or the command line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNoteId`] if the id is empty, too long, or
    /// contains characters that are unsafe in a file name.
    pub fn parse(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let reason = if id.is_empty() {
            Some("must not be empty")
        } else if id.len() > MAX_ID_LEN {
            Some("longer than 64 characters")
        } else if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            Some("only ASCII letters, digits, '-' and '_' are allowed")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(Error::InvalidNoteId { id, reason }),
            None => Ok(Self(id)),
        }
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NoteId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for NoteId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<NoteId> for String {
    fn from(id: NoteId) -> Self {
        id.0
    }
}

/// The persisted state of one note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    /// Storage key and cross-surface reference.
    pub id: NoteId,

    /// Opaque note text.
    #[serde(default)]
    pub content: String,

    /// Display tint.
    #[serde(default = "default_color")]
    pub color: String,

    /// Last-known window width.
    #[serde(default = "fallback_size")]
    pub width: u32,

    /// Last-known window height.
    #[serde(default = "fallback_size")]
    pub height: u32,

    /// Last-known horizontal position; unset until first placement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,

    /// Last-known vertical position; unset until first placement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,

    /// Always-on-top flag.
    #[serde(default)]
    pub is_pinned: bool,

    /// Fields written by surfaces that this crate does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_color() -> String {
    DEFAULT_NOTE_COLOR.to_string()
}

fn fallback_size() -> u32 {
    FALLBACK_SIZE
}

impl NoteRecord {
    /// Create a record with a fresh id and the configured defaults.
    #[must_use]
    pub fn new(defaults: &NoteWindowConfig) -> Self {
        Self::with_id(NoteId::generate(), defaults)
    }

    /// Create a record for `id` with the configured defaults.
    #[must_use]
    pub fn with_id(id: NoteId, defaults: &NoteWindowConfig) -> Self {
        Self {
            id,
            content: String::new(),
            color: defaults.default_color.clone(),
            width: defaults.width,
            height: defaults.height,
            x: None,
            y: None,
            is_pinned: false,
            extra: Map::new(),
        }
    }

    /// Window bounds as last persisted, if the note has been placed.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some(Bounds {
                x,
                y,
                width: self.width,
                height: self.height,
            }),
            _ => None,
        }
    }

    /// Shallow-merge `patch` over this record.
    ///
    /// Every field present in the patch replaces the stored one; absent fields
    /// (including unknown extras) are kept. The id never changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the merged document no longer forms a valid record,
    /// e.g. an extra field collides with a typed one using the wrong type.
    pub fn merged(&self, patch: &NotePatch) -> Result<Self> {
        let mut base = into_object(serde_json::to_value(self)?);
        for (key, value) in into_object(serde_json::to_value(patch)?) {
            if key != "id" {
                base.insert(key, value);
            }
        }

        let mut merged: Self = serde_json::from_value(Value::Object(base))?;
        merged.id = self.id.clone();
        Ok(merged)
    }
}

fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// A partial record sent by a note surface.
///
/// Only the fields that are `Some` (plus any extras) overwrite the stored
/// record when merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePatch {
    /// The note being updated. Note surfaces may omit it to mean themselves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NoteId>,

    /// New content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// New tint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// New width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    /// New height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    /// New horizontal position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,

    /// New vertical position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,

    /// New pin flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_pinned: Option<bool>,

    /// Surface-defined fields passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NotePatch {
    /// A patch that only replaces the content.
    #[must_use]
    pub fn content(id: NoteId, content: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// A patch carrying a window's new geometry.
    #[must_use]
    pub fn geometry(id: NoteId, bounds: Bounds) -> Self {
        Self {
            id: Some(id),
            width: Some(bounds.width),
            height: Some(bounds.height),
            x: Some(bounds.x),
            y: Some(bounds.y),
            ..Self::default()
        }
    }

    /// Drop the fields the window itself reports (geometry and pin flag).
    ///
    /// Those reach the record only through host events and `toggle-pin`, so
    /// the stored values always match the live window.
    #[must_use]
    pub fn without_window_state(self) -> Self {
        Self {
            width: None,
            height: None,
            x: None,
            y: None,
            is_pinned: None,
            ..self
        }
    }

    /// A patch that only sets the pin flag.
    #[must_use]
    pub fn pinned(id: NoteId, is_pinned: bool) -> Self {
        Self {
            id: Some(id),
            is_pinned: Some(is_pinned),
            ..Self::default()
        }
    }
}

/// Named height targets for the note resize control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizePreset {
    /// 200 px tall.
    Small,
    /// 450 px tall.
    Medium,
    /// 700 px tall.
    Large,
}

impl ResizePreset {
    /// Every preset, smallest first.
    pub const ALL: [Self; 3] = [Self::Small, Self::Medium, Self::Large];

    /// Window height this preset resizes to.
    #[must_use]
    pub const fn height(self) -> u32 {
        match self {
            Self::Small => 200,
            Self::Medium => 450,
            Self::Large => 700,
        }
    }
}

impl fmt::Display for ResizePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Small => write!(f, "small"),
            Self::Medium => write!(f, "medium"),
            Self::Large => write!(f, "large"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> NoteRecord {
        NoteRecord::with_id(
            NoteId::parse("note-1").unwrap(),
            &NoteWindowConfig::default(),
        )
    }

    #[test]
    fn test_generate_ids_are_distinct() {
        let a = NoteId::generate();
        let b = NoteId::generate();
        assert_ne!(a, b);
        assert!(NoteId::parse(a.as_str()).is_ok());
    }

    #[test]
    fn test_parse_rejects_path_characters() {
        assert!(NoteId::parse("../secret").is_err());
        assert!(NoteId::parse("a/b").is_err());
        assert!(NoteId::parse("a.json").is_err());
        assert!(NoteId::parse("").is_err());
        assert!(NoteId::parse("x".repeat(65)).is_err());
        assert!(NoteId::parse("Note_42-b").is_ok());
    }

    #[test]
    fn test_note_id_deserialize_validates() {
        assert!(serde_json::from_value::<NoteId>(json!("ok-id")).is_ok());
        assert!(serde_json::from_value::<NoteId>(json!("../nope")).is_err());
    }

    #[test]
    fn test_new_record_defaults() {
        let r = NoteRecord::new(&NoteWindowConfig::default());
        assert!(r.content.is_empty());
        assert_eq!(r.color, DEFAULT_NOTE_COLOR);
        assert_eq!((r.width, r.height), (300, 300));
        assert!(r.x.is_none() && r.y.is_none());
        assert!(!r.is_pinned);
        assert!(r.bounds().is_none());
    }

    #[test]
    fn test_record_json_shape() {
        let mut r = record();
        r.is_pinned = true;
        let value = serde_json::to_value(&r).unwrap();

        assert_eq!(value["id"], "note-1");
        assert_eq!(value["isPinned"], true);
        assert!(value.get("x").is_none());
    }

    #[test]
    fn test_record_reads_sparse_document() {
        let r: NoteRecord = serde_json::from_value(json!({ "id": "abc" })).unwrap();
        assert_eq!(r.content, "");
        assert_eq!(r.color, DEFAULT_NOTE_COLOR);
        assert_eq!(r.width, 300);
    }

    #[test]
    fn test_merge_content_preserves_other_fields() {
        let mut r = record();
        r.x = Some(10);
        r.y = Some(20);
        r.is_pinned = true;
        r.extra.insert("font".to_string(), json!("mono"));

        let merged = r.merged(&NotePatch::content(r.id.clone(), "x")).unwrap();

        assert_eq!(merged.content, "x");
        assert_eq!(merged.x, Some(10));
        assert_eq!(merged.y, Some(20));
        assert!(merged.is_pinned);
        assert_eq!(merged.extra.get("font"), Some(&json!("mono")));
    }

    #[test]
    fn test_merge_never_changes_id() {
        let r = record();
        let patch = NotePatch::content(NoteId::parse("other").unwrap(), "y");
        let merged = r.merged(&patch).unwrap();
        assert_eq!(merged.id, r.id);
    }

    #[test]
    fn test_merge_geometry() {
        let r = record();
        let bounds = Bounds {
            x: 5,
            y: -7,
            width: 320,
            height: 410,
        };
        let merged = r.merged(&NotePatch::geometry(r.id.clone(), bounds)).unwrap();
        assert_eq!(merged.bounds(), Some(bounds));
        assert_eq!(merged.content, r.content);
    }

    #[test]
    fn test_patch_from_surface_json() {
        let patch: NotePatch =
            serde_json::from_value(json!({ "id": "n1", "content": "hi", "fontSize": 14 }))
                .unwrap();
        assert_eq!(patch.content.as_deref(), Some("hi"));
        assert!(patch.width.is_none());
        assert_eq!(patch.extra.get("fontSize"), Some(&json!(14)));
    }

    #[test]
    fn test_without_window_state_keeps_content_and_extras() {
        let patch: NotePatch = serde_json::from_value(json!({
            "content": "hi",
            "color": "#fff",
            "isPinned": true,
            "x": 3,
            "width": 900,
            "fontSize": 14
        }))
        .unwrap();

        let patch = patch.without_window_state();
        assert_eq!(patch.content.as_deref(), Some("hi"));
        assert_eq!(patch.color.as_deref(), Some("#fff"));
        assert!(patch.is_pinned.is_none());
        assert!(patch.x.is_none() && patch.width.is_none());
        assert_eq!(patch.extra.get("fontSize"), Some(&json!(14)));
    }

    #[test]
    fn test_preset_heights() {
        assert_eq!(ResizePreset::Small.height(), 200);
        assert_eq!(ResizePreset::Medium.height(), 450);
        assert_eq!(ResizePreset::Large.height(), 700);
    }

    #[test]
    fn test_preset_wire_names() {
        assert_eq!(
            serde_json::from_value::<ResizePreset>(json!("medium")).unwrap(),
            ResizePreset::Medium
        );
        assert_eq!(ResizePreset::Large.to_string(), "large");
    }
}
