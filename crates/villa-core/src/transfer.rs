//! Export and import
//!
//! The export file is the published snapshot format: pretty-printed JSON
//! (2-space indent) of a content document. Import is the reverse, with
//! validation and migration in between.

use std::path::Path;

use serde_json::Value;
use tracing::info;

use crate::migrate::{migrate_value, strip_deprecated, MigrationError};
use crate::models::ContentDocument;
use crate::session::{Mode, Session, SessionError};
use crate::storage::{atomic_write, StorageResult};

/// Serialize a document for export
pub fn export_bytes(doc: &ContentDocument) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec_pretty(doc)
}

/// Write a document to `path` atomically
pub fn export_to_path(doc: &ContentDocument, path: &Path) -> StorageResult<()> {
    let bytes = export_bytes(doc)?;
    atomic_write(path, &bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "content exported");
    Ok(())
}

/// Parse an import file into a current-schema document
pub fn import_document(bytes: &[u8]) -> Result<ContentDocument, MigrationError> {
    let mut value: Value =
        serde_json::from_slice(bytes).map_err(|e| MigrationError::InvalidFormat(e.to_string()))?;
    let stripped = strip_deprecated(&mut value);
    if stripped > 0 {
        tracing::debug!(fields = stripped, "dropped retired fields from import");
    }
    migrate_value(value)
}

impl Session {
    /// The working document as export bytes
    pub fn export(&self) -> Result<Vec<u8>, SessionError> {
        Ok(export_bytes(self.working())?)
    }

    /// Write the working document to a file
    pub fn export_to_path(&self, path: &Path) -> Result<(), SessionError> {
        export_to_path(self.working(), path).map_err(|source| SessionError::Export {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load an export file into the draft
    ///
    /// The imported document goes through `update`, so it is not live until
    /// published.
    pub fn import(&mut self, bytes: &[u8]) -> Result<u64, SessionError> {
        if self.mode() != Mode::Editor {
            return Err(SessionError::ReadOnly);
        }
        let doc = import_document(bytes)?;
        info!(photos = doc.photo_count(), faqs = doc.faqs.len(), "content imported");
        self.update(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::{default_location, initial_content};
    use crate::models::{Faq, Photo, Slot};
    use crate::session::{Sources, Viewer};
    use crate::storage::{MemorySlotStore, SlotStore};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn edited() -> ContentDocument {
        let mut doc = initial_content();
        let sub_id = doc.gallery[1].sub_sections[0].id.clone();
        doc.add_photo(&sub_id, Photo::new("https://cdn/garden.jpg").with_caption("Garden"))
            .unwrap();
        doc.add_faq(Faq::new("Airport transfer?", "On request.")).unwrap();
        doc.branding.favicon_url = Some("data:image/png;base64,AAAA".into());
        doc
    }

    #[test]
    fn test_export_import_roundtrip() {
        let doc = edited();
        let bytes = export_bytes(&doc).unwrap();
        assert_eq!(import_document(&bytes).unwrap(), doc);
    }

    #[test]
    fn test_export_is_two_space_indented() {
        let bytes = export_bytes(&initial_content()).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("{\n  \""));
        assert!(text.contains("\"gallerySections\""));

        // Empty legacy photo list is omitted at the top level
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value.get("photos").is_none());
    }

    #[test]
    fn test_import_without_location_gets_default() {
        let mut value = serde_json::to_value(initial_content()).unwrap();
        value.as_object_mut().unwrap().remove("location");
        value["viewingSlots"] = serde_json::json!([]);

        let doc = import_document(&serde_json::to_vec(&value).unwrap()).unwrap();
        assert_eq!(doc.location, default_location());
    }

    #[test]
    fn test_import_rejects_non_document() {
        assert!(import_document(b"{\"hello\": \"world\"}").is_err());
        assert!(import_document(b"\xff\xfe").is_err());
    }

    #[tokio::test]
    async fn test_session_import_goes_to_draft() {
        let store = Arc::new(MemorySlotStore::new());
        let mut session = Session::open(Sources::from_store(store.clone()), Viewer::editor()).await;

        let doc = edited();
        session.import(&export_bytes(&doc).unwrap()).unwrap();
        assert_eq!(session.draft(), &doc);
        assert!(session.dirty());
        assert!(session.flush().await.is_persisted());
        assert!(store.get(Slot::Draft).await.unwrap().is_some());
        assert!(store.get(Slot::Live).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_import_invalid_keeps_draft() {
        let store = Arc::new(MemorySlotStore::new());
        let mut session = Session::open(Sources::from_store(store), Viewer::editor()).await;
        let before = session.draft().clone();

        let err = session.import(b"{\"faqs\": []}").unwrap_err();
        assert!(matches!(err, SessionError::InvalidFormat(_)));
        assert_eq!(session.draft(), &before);
    }

    #[tokio::test]
    async fn test_export_to_path_uses_working_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("villa-content.json");
        let store = Arc::new(MemorySlotStore::new());
        let mut session = Session::open(Sources::from_store(store), Viewer::editor()).await;

        let doc = edited();
        session.update(doc.clone()).unwrap();
        session.export_to_path(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(import_document(&bytes).unwrap(), doc);
    }
}
