//! File-backed note store.
//!
//! One pretty-printed JSON document per note, named `<id>.json`, in a single
//! directory. The store is only ever touched by the orchestrator, one call at
//! a time, so it takes no locks.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::note::{NoteId, NotePatch, NoteRecord};

/// Extension of record files.
const RECORD_EXTENSION: &str = "json";

/// Marker keeping records out of version control.
const IGNORE_MARKER: &str = ".gitignore";

/// Directory of note records.
#[derive(Debug, Clone)]
pub struct NoteStore {
    dir: PathBuf,
}

impl NoteStore {
    /// Open the store at `dir`, creating the directory if needed.
    ///
    /// Also drops a `.gitignore` marker in the directory if none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or marker cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();

        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|source| Error::DirectoryCreate {
                path: dir.clone(),
                source,
            })?;
        }

        let marker = dir.join(IGNORE_MARKER);
        if !marker.exists() {
            fs::write(&marker, "*\n")?;
        }

        info!("Note store opened at {}", dir.display());
        Ok(Self { dir })
    }

    /// The directory holding the records.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record file for `id`.
    #[must_use]
    pub fn path_for(&self, id: &NoteId) -> PathBuf {
        self.dir.join(format!("{id}.{RECORD_EXTENSION}"))
    }

    /// Whether a record exists for `id`.
    #[must_use]
    pub fn exists(&self, id: &NoteId) -> bool {
        self.path_for(id).is_file()
    }

    /// Read the record for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoteNotFound`] if there is no record, or
    /// [`Error::MalformedRecord`] if the file does not parse.
    pub fn load(&self, id: &NoteId) -> Result<NoteRecord> {
        let path = self.path_for(id);
        match fs::read(&path) {
            Ok(bytes) => parse_record(&path, &bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::not_found(id.as_str())),
            Err(e) => Err(e.into()),
        }
    }

    /// Read every record, ordered by file name.
    ///
    /// A single unreadable record aborts the whole listing: dropping notes
    /// from the manager silently would hide data.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read or any record file
    /// fails to parse.
    pub fn load_all(&self) -> Result<Vec<NoteRecord>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let is_record = path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext == RECORD_EXTENSION);
            if is_record {
                paths.push(path);
            }
        }
        paths.sort();

        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            let record = parse_record(&path, &fs::read(&path)?)?;
            if path.file_stem().is_some_and(|stem| stem != record.id.as_str()) {
                warn!(
                    "Record {} carries id {}, which does not match its file name",
                    path.display(),
                    record.id
                );
            }
            records.push(record);
        }

        debug!("Loaded {} note records", records.len());
        Ok(records)
    }

    /// Overwrite the record file for `record.id`.
    ///
    /// The document is written to a sibling temporary file and renamed into
    /// place, so readers never observe a half-written record.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any file operation fails.
    pub fn save(&self, record: &NoteRecord) -> Result<()> {
        let path = self.path_for(&record.id);
        let tmp = path.with_extension("json.tmp");

        let mut bytes = serde_json::to_vec_pretty(record)?;
        bytes.push(b'\n');
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &path)?;

        debug!("Saved note {}", record.id);
        Ok(())
    }

    /// Read-modify-write: shallow-merge `patch` into the stored record.
    ///
    /// Returns the merged record as written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoteNotFound`] if no record exists to merge into, or
    /// any error from [`NoteStore::load`] and [`NoteStore::save`].
    pub fn merge(&self, id: &NoteId, patch: &NotePatch) -> Result<NoteRecord> {
        let merged = self.load(id)?.merged(patch)?;
        self.save(&merged)?;
        Ok(merged)
    }

    /// Delete the record for `id`.
    ///
    /// Returns whether a record was removed; a missing record is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn delete(&self, id: &NoteId) -> Result<bool> {
        match fs::remove_file(self.path_for(id)) {
            Ok(()) => {
                debug!("Deleted note {id}");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Delete of unknown note {id} ignored");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn parse_record(path: &Path, bytes: &[u8]) -> Result<NoteRecord> {
    serde_json::from_slice(bytes).map_err(|source| Error::MalformedRecord {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NoteWindowConfig;
    use serde_json::json;

    fn create_test_store() -> (tempfile::TempDir, NoteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = NoteStore::open(dir.path()).unwrap();
        (dir, store)
    }

    fn create_test_record() -> NoteRecord {
        NoteRecord::new(&NoteWindowConfig::default())
    }

    #[test]
    fn test_open_creates_dir_and_marker() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/notes");

        let store = NoteStore::open(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(store.dir(), nested);
        assert_eq!(
            fs::read_to_string(nested.join(".gitignore")).unwrap(),
            "*\n"
        );
    }

    #[test]
    fn test_open_keeps_existing_marker() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "custom\n").unwrap();

        NoteStore::open(dir.path()).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join(".gitignore")).unwrap(),
            "custom\n"
        );
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let (_dir, store) = create_test_store();
        let mut record = create_test_record();
        record.content = "buy milk\nand eggs ✓".to_string();
        record.x = Some(-40);
        record.y = Some(12);
        record.is_pinned = true;

        store.save(&record).unwrap();
        assert!(store.exists(&record.id));
        assert_eq!(store.load(&record.id).unwrap(), record);
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let (dir, store) = create_test_store();
        let record = create_test_record();
        store.save(&record).unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let (_dir, store) = create_test_store();
        let err = store.load(&NoteId::generate()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_load_all_sorted_and_ignores_other_files() {
        let (dir, store) = create_test_store();
        for id in ["b", "a", "c"] {
            store
                .save(&NoteRecord::with_id(
                    NoteId::parse(id).unwrap(),
                    &NoteWindowConfig::default(),
                ))
                .unwrap();
        }
        fs::write(dir.path().join("readme.txt"), "not a note").unwrap();

        let ids: Vec<String> = store
            .load_all()
            .unwrap()
            .into_iter()
            .map(|r| r.id.to_string())
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn test_load_all_empty() {
        let (_dir, store) = create_test_store();
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_load_all_fails_on_malformed_record() {
        let (dir, store) = create_test_store();
        store.save(&create_test_record()).unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

        let err = store.load_all().unwrap_err();
        match err {
            Error::MalformedRecord { path, .. } => assert!(path.ends_with("broken.json")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_merge_preserves_unpatched_fields() {
        let (_dir, store) = create_test_store();
        let mut record = create_test_record();
        record.x = Some(100);
        record.y = Some(200);
        record.width = 333;
        record.is_pinned = true;
        store.save(&record).unwrap();

        let merged = store
            .merge(&record.id, &NotePatch::content(record.id.clone(), "x"))
            .unwrap();

        let loaded = store.load(&record.id).unwrap();
        assert_eq!(merged, loaded);
        assert_eq!(loaded.content, "x");
        assert_eq!(loaded.x, Some(100));
        assert_eq!(loaded.y, Some(200));
        assert_eq!(loaded.width, 333);
        assert!(loaded.is_pinned);
    }

    #[test]
    fn test_merge_keeps_unknown_fields_on_disk() {
        let (dir, store) = create_test_store();
        let id = NoteId::parse("legacy").unwrap();
        fs::write(
            dir.path().join("legacy.json"),
            json!({ "id": "legacy", "content": "old", "fontSize": 18 }).to_string(),
        )
        .unwrap();

        store
            .merge(&id, &NotePatch::content(id.clone(), "new"))
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("legacy.json")).unwrap())
                .unwrap();
        assert_eq!(raw["content"], "new");
        assert_eq!(raw["fontSize"], 18);
    }

    #[test]
    fn test_merge_missing_record_fails() {
        let (_dir, store) = create_test_store();
        let id = NoteId::generate();
        let err = store
            .merge(&id, &NotePatch::content(id.clone(), "x"))
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(!store.exists(&id));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (_dir, store) = create_test_store();
        let record = create_test_record();
        store.save(&record).unwrap();

        assert!(store.delete(&record.id).unwrap());
        assert!(!store.exists(&record.id));
        assert!(!store.delete(&record.id).unwrap());
        assert!(!store.delete(&NoteId::generate()).unwrap());
    }

    #[test]
    fn test_delete_leaves_other_records() {
        let (_dir, store) = create_test_store();
        let records: Vec<_> = (0..3).map(|_| create_test_record()).collect();
        for r in &records {
            store.save(r).unwrap();
        }

        store.delete(&records[1].id).unwrap();

        let remaining = store.load_all().unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().all(|r| r.id != records[1].id));
    }
}
