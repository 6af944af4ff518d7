//! Document list state for NovaScribe
//!
//! This module defines the `Document` record and the `DocumentStore` that
//! owns every document plus the active selection. Each mutation writes the
//! whole list to the storage collaborator; storage is best-effort, so
//! failures are logged and the in-memory list stays authoritative.

use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info, warn};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::files::storage::DocumentStorage;

/// Id of the document shown when nothing is stored yet.
pub const WELCOME_ID: &str = "welcome";

/// Title given to documents created with "new document".
pub const UNTITLED: &str = "Untitled";

const WELCOME_TITLE: &str = "Welcome to NovaScribe";

const WELCOME_CONTENT: &str = "# Start writing ✍️\n\n\
NovaScribe is a minimal block-based Markdown editor.\n\n\
## Highlights\n\
- **What you see is what you get**: click any block to edit it, click away to render it.\n\
- **Polish**: send the document to the text polishing service in one step.\n\
- **Local first**: attach a folder and edit the Markdown files inside it.\n\n\
## Shortcuts\n\
- `Enter`: start a new block\n\
- `Shift + Enter`: new line inside the block\n\
- `Ctrl + S`: save to the workspace file\n\
- `Tab`: insert indentation";

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

// ─────────────────────────────────────────────────────────────────────────────
// Document
// ─────────────────────────────────────────────────────────────────────────────

/// A stored Markdown document.
///
/// Serialized as `{id, title, content, lastModified}`; missing fields take
/// their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(rename = "lastModified", deserialize_with = "lenient_millis")]
    pub last_modified: u64,
}

/// Accept any JSON value for a timestamp; anything that isn't a
/// non-negative number or a numeric string becomes "now".
fn lenient_millis<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(millis.unwrap_or_else(now_millis))
}

/// Suffix of the key a stored list is copied to when it can't be read back
/// in full.
pub const BACKUP_SUFFIX: &str = ".backup";

/// Parse a stored document list element by element.
///
/// Returns the documents that parsed and whether anything was lost (the
/// value wasn't a JSON array or some elements were skipped).
fn parse_documents(key: &str, json: &str) -> (Vec<Document>, bool) {
    let items = match serde_json::from_str::<Value>(json) {
        Ok(Value::Array(items)) => items,
        Ok(other) => {
            warn!("Stored document list '{}' is not an array: {}", key, other);
            return (Vec::new(), true);
        }
        Err(e) => {
            warn!("Stored document list '{}' is invalid: {}", key, e);
            return (Vec::new(), true);
        }
    };

    let total = items.len();
    let documents: Vec<Document> = items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value::<Document>(item) {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!("Skipping stored document {} in '{}': {}", i, key, e);
                None
            }
        })
        .collect();
    let lossy = documents.len() < total;
    (documents, lossy)
}

impl Document {
    pub fn new(id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            last_modified: now_millis(),
        }
    }

    /// The built-in welcome document.
    pub fn welcome() -> Self {
        Self::new(WELCOME_ID, WELCOME_TITLE, WELCOME_CONTENT)
    }

    fn touch(&mut self) {
        // Keep timestamps strictly increasing even within one millisecond
        self.last_modified = now_millis().max(self.last_modified + 1);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DocumentStore
// ─────────────────────────────────────────────────────────────────────────────

/// All documents plus the active selection.
///
/// Invariants: the list is never empty and `active_id` names a document in
/// it.
pub struct DocumentStore {
    documents: Vec<Document>,
    active_id: String,
    storage: Box<dyn DocumentStorage>,
    key: String,
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("documents", &self.documents.len())
            .field("active_id", &self.active_id)
            .field("key", &self.key)
            .finish()
    }
}

impl DocumentStore {
    /// Load the document list stored under `key`.
    ///
    /// Elements are parsed one at a time, so a single malformed entry only
    /// drops that entry. Whenever the stored value can't be read back in
    /// full, the raw text is copied to `key` + [`BACKUP_SUFFIX`] before
    /// anything else can overwrite it. Falls back to the welcome document
    /// when nothing usable remains.
    pub fn load(mut storage: Box<dyn DocumentStorage>, key: impl Into<String>) -> Self {
        let key = key.into();
        let documents = match storage.load(&key) {
            Ok(Some(json)) => {
                let (docs, lossy) = parse_documents(&key, &json);
                if lossy {
                    let backup = format!("{}{}", key, BACKUP_SUFFIX);
                    match storage.save(&backup, &json) {
                        Ok(()) => warn!("Kept unreadable document list in '{}'", backup),
                        Err(e) => warn!("Failed to back up '{}': {}", key, e),
                    }
                }
                if docs.is_empty() {
                    debug!("No usable documents in '{}'", key);
                    vec![Document::welcome()]
                } else {
                    info!("Loaded {} documents from '{}'", docs.len(), key);
                    docs
                }
            }
            Ok(None) => {
                debug!("No stored documents under '{}'", key);
                vec![Document::welcome()]
            }
            Err(e) => {
                warn!("Failed to read stored documents: {}", e);
                vec![Document::welcome()]
            }
        };

        let active_id = documents
            .first()
            .map(|d| d.id.clone())
            .unwrap_or_else(|| WELCOME_ID.to_string());
        Self {
            documents,
            active_id,
            storage,
            key,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// The active document.
    pub fn active(&self) -> &Document {
        // The list is never empty
        let index = self.position(&self.active_id).unwrap_or(0);
        &self.documents[index]
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.documents.iter().position(|d| d.id == id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Prepend a new empty document and activate it. Returns its id.
    pub fn create(&mut self) -> String {
        let doc = Document::new(Uuid::new_v4().to_string(), UNTITLED, "");
        let id = doc.id.clone();
        self.documents.insert(0, doc);
        self.active_id = id.clone();
        debug!("Created document {}", id);
        self.persist();
        id
    }

    /// Activate the document with `id`. Content is not touched or persisted.
    pub fn select(&mut self, id: &str) -> bool {
        if self.position(id).is_none() {
            warn!("Cannot select unknown document {}", id);
            return false;
        }
        self.active_id = id.to_string();
        true
    }

    /// Delete the document with `id`.
    ///
    /// The last remaining document is never deleted. If the deleted
    /// document was active, the new first document becomes active.
    pub fn delete(&mut self, id: &str) -> bool {
        if self.documents.len() <= 1 {
            debug!("Refusing to delete the last document");
            return false;
        }
        let Some(index) = self.position(id) else {
            return false;
        };

        self.documents.remove(index);
        if self.active_id == id {
            self.active_id = self.documents[0].id.clone();
        }
        debug!("Deleted document {}", id);
        self.persist();
        true
    }

    pub fn rename(&mut self, id: &str, title: impl Into<String>) -> bool {
        let Some(doc) = self.documents.iter_mut().find(|d| d.id == id) else {
            return false;
        };
        doc.title = title.into();
        doc.touch();
        self.persist();
        true
    }

    /// Replace the content of a document. Unchanged content is a no-op.
    pub fn update_content(&mut self, id: &str, content: &str) -> bool {
        let Some(doc) = self.documents.iter_mut().find(|d| d.id == id) else {
            return false;
        };
        if doc.content == content {
            return false;
        }
        doc.content = content.to_string();
        doc.touch();
        self.persist();
        true
    }

    /// Add a document opened from a workspace file.
    ///
    /// The file name is used as both id and title; an existing document
    /// with the same id is replaced. The new document is first and active.
    pub fn import_file(&mut self, name: &str, content: impl Into<String>) -> String {
        self.documents.retain(|d| d.id != name);
        self.documents.insert(0, Document::new(name, name, content));
        self.active_id = name.to_string();
        info!("Imported {} into the document list", name);
        self.persist();
        self.active_id.clone()
    }

    /// Write the whole list to storage. Failures are logged only.
    fn persist(&mut self) -> bool {
        let json = match serde_json::to_string(&self.documents) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize documents: {}", e);
                return false;
            }
        };
        match self.storage.save(&self.key, &json) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to persist documents: {}", e);
                false
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::files::storage::MemoryStorage;
    use std::cell::RefCell;
    use std::rc::Rc;

    const KEY: &str = "novascribe_docs";

    /// Storage that shares its map with the test so saves can be inspected.
    #[derive(Clone, Default)]
    struct SharedStorage(Rc<RefCell<MemoryStorage>>);

    impl DocumentStorage for SharedStorage {
        fn load(&self, key: &str) -> Result<Option<String>> {
            self.0.borrow().load(key)
        }

        fn save(&mut self, key: &str, value: &str) -> Result<()> {
            self.0.borrow_mut().save(key, value)
        }
    }

    struct FailingLoad;

    impl DocumentStorage for FailingLoad {
        fn load(&self, key: &str) -> Result<Option<String>> {
            Err(Error::StorageLoad {
                key: key.to_string(),
                source: "denied".into(),
            })
        }

        fn save(&mut self, _key: &str, _value: &str) -> Result<()> {
            Ok(())
        }
    }

    fn empty_store() -> (DocumentStore, SharedStorage) {
        let shared = SharedStorage::default();
        let store = DocumentStore::load(Box::new(shared.clone()), KEY);
        (store, shared)
    }

    fn stored(shared: &SharedStorage) -> Vec<Document> {
        let json = shared.0.borrow().value(KEY).map(str::to_string).unwrap();
        serde_json::from_str(&json).unwrap()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Loading
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_load_empty_storage_gives_welcome() {
        let (store, _) = empty_store();
        assert_eq!(store.len(), 1);
        assert_eq!(store.active_id(), WELCOME_ID);
        assert!(store.active().content.starts_with("# "));
    }

    #[test]
    fn test_load_invalid_json_gives_welcome() {
        let storage = MemoryStorage::new().with_value(KEY, "{not json");
        let store = DocumentStore::load(Box::new(storage), KEY);
        assert_eq!(store.active_id(), WELCOME_ID);
    }

    #[test]
    fn test_load_empty_list_gives_welcome() {
        let storage = MemoryStorage::new().with_value(KEY, "[]");
        let store = DocumentStore::load(Box::new(storage), KEY);
        assert_eq!(store.len(), 1);
        assert_eq!(store.active_id(), WELCOME_ID);
    }

    #[test]
    fn test_load_unreadable_storage_gives_welcome() {
        let store = DocumentStore::load(Box::new(FailingLoad), KEY);
        assert_eq!(store.active_id(), WELCOME_ID);
    }

    #[test]
    fn test_load_tolerates_missing_fields() {
        let json = r#"[{"id": "a", "content": "hello", "extra": 1}, {"id": "b", "title": "B", "content": "", "lastModified": 5}]"#;
        let storage = MemoryStorage::new().with_value(KEY, json);
        let store = DocumentStore::load(Box::new(storage), KEY);

        assert_eq!(store.len(), 2);
        assert_eq!(store.active_id(), "a");
        assert_eq!(store.active().title, "");
        assert_eq!(store.get("b").map(|d| d.last_modified), Some(5));
    }

    #[test]
    fn test_load_skips_only_malformed_entries() {
        let json = r#"[
            {"id": "a", "title": "keep me", "content": "x", "lastModified": null},
            {"id": 7, "title": ["broken"]},
            {"id": "b", "title": "B", "content": "y", "lastModified": 12.9},
            {"id": "c", "title": "C", "content": "z", "lastModified": "33"}
        ]"#;
        let shared = SharedStorage(Rc::new(RefCell::new(
            MemoryStorage::new().with_value(KEY, json),
        )));
        let mut store = DocumentStore::load(Box::new(shared.clone()), KEY);

        assert_eq!(store.len(), 3);
        assert_eq!(store.active_id(), "a");
        assert!(store.active().last_modified > 0);
        assert_eq!(store.get("b").map(|d| d.last_modified), Some(12));
        assert_eq!(store.get("c").map(|d| d.last_modified), Some(33));

        // The original text is kept aside before the next persist
        let backup = format!("{}{}", KEY, BACKUP_SUFFIX);
        assert_eq!(shared.0.borrow().value(&backup), Some(json));

        store.create();
        let titles: Vec<String> = stored(&shared).into_iter().map(|d| d.title).collect();
        assert!(titles.contains(&"keep me".to_string()));
        assert_eq!(titles.len(), 4);
    }

    #[test]
    fn test_load_null_timestamp_keeps_document() {
        let json = r#"[{"id":"a","title":"keep me","content":"x","lastModified":null}]"#;
        let shared = SharedStorage(Rc::new(RefCell::new(
            MemoryStorage::new().with_value(KEY, json),
        )));
        let mut store = DocumentStore::load(Box::new(shared.clone()), KEY);
        assert_eq!(store.active_id(), "a");

        store.create();
        assert!(stored(&shared).iter().any(|d| d.title == "keep me"));
        // Nothing was dropped, so no backup is written
        let backup = format!("{}{}", KEY, BACKUP_SUFFIX);
        assert_eq!(shared.0.borrow().value(&backup), None);
    }

    #[test]
    fn test_unparseable_list_backed_up_before_overwrite() {
        let shared = SharedStorage(Rc::new(RefCell::new(
            MemoryStorage::new().with_value(KEY, "{not json"),
        )));
        let mut store = DocumentStore::load(Box::new(shared.clone()), KEY);
        assert_eq!(store.active_id(), WELCOME_ID);

        store.create();
        let backup = format!("{}{}", KEY, BACKUP_SUFFIX);
        assert_eq!(shared.0.borrow().value(&backup), Some("{not json"));
        assert_eq!(stored(&shared).len(), 2);
    }

    #[test]
    fn test_serialized_field_names() {
        let doc = Document {
            id: "x".to_string(),
            title: "T".to_string(),
            content: "c".to_string(),
            last_modified: 42,
        };
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(
            json,
            r#"{"id":"x","title":"T","content":"c","lastModified":42}"#
        );
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_create_prepends_and_activates() {
        let (mut store, shared) = empty_store();
        let id = store.create();

        assert_eq!(store.documents()[0].id, id);
        assert_eq!(store.active_id(), id);
        assert_eq!(store.active().title, UNTITLED);
        assert_eq!(store.active().content, "");
        assert_eq!(stored(&shared).len(), 2);
    }

    #[test]
    fn test_select_does_not_persist() {
        let (mut store, shared) = empty_store();
        store.create();
        let saves = shared.0.borrow().save_count;

        assert!(store.select(WELCOME_ID));
        assert_eq!(store.active_id(), WELCOME_ID);
        assert!(!store.select("missing"));
        assert_eq!(store.active_id(), WELCOME_ID);
        assert_eq!(shared.0.borrow().save_count, saves);
    }

    #[test]
    fn test_delete_last_document_is_noop() {
        let (mut store, shared) = empty_store();
        assert!(!store.delete(WELCOME_ID));
        assert_eq!(store.len(), 1);
        assert_eq!(shared.0.borrow().save_count, 0);
    }

    #[test]
    fn test_delete_active_falls_back_to_first() {
        let (mut store, _) = empty_store();
        let a = store.create();
        let b = store.create();
        assert_eq!(store.active_id(), b);

        assert!(store.delete(&b));
        assert_eq!(store.active_id(), a);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_delete_inactive_keeps_selection() {
        let (mut store, _) = empty_store();
        let a = store.create();
        assert!(store.delete(WELCOME_ID));
        assert_eq!(store.active_id(), a);
    }

    #[test]
    fn test_rename_stamps_timestamp() {
        let (mut store, shared) = empty_store();
        let before = store.active().last_modified;

        assert!(store.rename(WELCOME_ID, "Notes"));
        assert_eq!(store.active().title, "Notes");
        assert!(store.active().last_modified > before);
        assert_eq!(stored(&shared)[0].title, "Notes");
        assert!(!store.rename("missing", "x"));
    }

    #[test]
    fn test_update_content() {
        let (mut store, shared) = empty_store();
        let before = store.active().last_modified;

        assert!(store.update_content(WELCOME_ID, "new text"));
        assert_eq!(store.active().content, "new text");
        assert!(store.active().last_modified > before);
        assert_eq!(stored(&shared)[0].content, "new text");

        let saves = shared.0.borrow().save_count;
        assert!(!store.update_content(WELCOME_ID, "new text"));
        assert_eq!(shared.0.borrow().save_count, saves);
    }

    #[test]
    fn test_import_file_replaces_same_name() {
        let (mut store, _) = empty_store();
        store.import_file("notes.md", "v1");
        store.create();
        let id = store.import_file("notes.md", "v2");

        assert_eq!(id, "notes.md");
        assert_eq!(store.len(), 3);
        assert_eq!(store.documents()[0].content, "v2");
        assert_eq!(store.active().title, "notes.md");
        assert_eq!(
            store.documents().iter().filter(|d| d.id == "notes.md").count(),
            1
        );
    }

    #[test]
    fn test_failed_persist_keeps_memory_state() {
        let mut storage = MemoryStorage::default();
        storage.fail_saves = true;
        let mut store = DocumentStore::load(Box::new(storage), KEY);
        store.create();
        assert_eq!(store.len(), 2);
    }
}
