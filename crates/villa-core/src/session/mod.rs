//! Content session
//!
//! A `Session` resolves which document a visitor sees and owns the editing
//! workflow over the two slots. Create one on entry, drop it on exit.
//!
//! ## Load protocol
//!
//! 1. Absorb the retired storage layout (once per store)
//! 2. live: `Live` slot, else the published snapshot, else the initial content
//! 3. draft: `Draft` slot, else a copy of live
//! 4. dirty: draft and live serialize differently
//! 5. mode: from the viewer and whether a draft exists in the slot
//!
//! Every candidate is migrated; one that fails to read or validate falls
//! through to the next source, so loading never fails.

mod error;
mod writer;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::defaults::initial_content;
use crate::migrate::{absorb_legacy, migrate_str};
use crate::models::{ContentDocument, Slot};
use crate::snapshot::{FileSnapshot, HttpSnapshot, SnapshotSource};
use crate::storage::{LegacyStore, SlotStore, SqliteSlotStore};

pub use error::{PersistFailure, SessionError, CAPACITY_MESSAGE, IMPORT_MESSAGE};
pub use writer::PersistState;

use writer::DraftWriter;

/// Query parameter that requests the draft preview
pub const PREVIEW_PARAM: &str = "preview";

/// Who is looking at the site
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewer {
    pub authenticated: bool,
    pub preview: bool,
}

impl Viewer {
    /// An authenticated editor
    pub fn editor() -> Self {
        Self {
            authenticated: true,
            preview: false,
        }
    }

    /// An anonymous visitor
    pub fn public() -> Self {
        Self::default()
    }

    /// An anonymous visitor asking for the preview
    pub fn previewer() -> Self {
        Self {
            authenticated: false,
            preview: true,
        }
    }

    /// Anonymous viewer derived from an entry URL query string
    ///
    /// Preview is requested with `preview=true`; a leading `?` is allowed.
    pub fn from_query(query: &str) -> Self {
        let preview = query
            .trim_start_matches('?')
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .any(|(key, value)| key == PREVIEW_PARAM && value == "true");
        Self {
            authenticated: false,
            preview,
        }
    }
}

/// How the session presents content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Visitors see the live document
    Public,
    /// An authenticated editor works on the draft
    Editor,
    /// A visitor sees the unpublished draft
    Preview,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Mode::Public => "public",
            Mode::Editor => "editor",
            Mode::Preview => "preview",
        };
        f.write_str(name)
    }
}

/// Where a session reads and writes
#[derive(Clone)]
pub struct Sources {
    pub slots: Arc<dyn SlotStore>,
    pub legacy: Arc<dyn LegacyStore>,
    pub snapshot: Option<Arc<dyn SnapshotSource>>,
}

impl Sources {
    /// Use one store for both slot and legacy access, with no snapshot
    pub fn from_store<T>(store: Arc<T>) -> Self
    where
        T: SlotStore + LegacyStore + 'static,
    {
        Self {
            slots: store.clone(),
            legacy: store,
            snapshot: None,
        }
    }

    pub fn with_snapshot(mut self, snapshot: Arc<dyn SnapshotSource>) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Open the SQLite store and snapshot source named by the configuration
    ///
    /// A published URL wins over a published path.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = SqliteSlotStore::open(config).with_context(|| {
            format!(
                "Failed to open content database: {:?}",
                config.content_db_path()
            )
        })?;
        let mut sources = Self::from_store(Arc::new(store));

        if let Some(url) = &config.published_url {
            let snapshot = HttpSnapshot::new(url.as_str())
                .with_context(|| format!("Failed to set up snapshot fetch for {}", url))?;
            sources = sources.with_snapshot(Arc::new(snapshot));
        } else if let Some(path) = &config.published_path {
            sources = sources.with_snapshot(Arc::new(FileSnapshot::new(path)));
        }

        Ok(sources)
    }
}

/// Result of one run of the load protocol
struct Loaded {
    live: ContentDocument,
    draft: ContentDocument,
    draft_in_slot: bool,
}

/// An open content session
///
/// There is no "loading" state: [`Session::open`] returns only after the
/// load protocol has finished, so every accessor sees fully resolved content.
pub struct Session {
    sources: Sources,
    viewer: Viewer,
    live: ContentDocument,
    draft: ContentDocument,
    dirty: bool,
    mode: Mode,
    draft_in_slot: bool,
    writer: DraftWriter,
}

impl Session {
    /// Open a session and run the load protocol
    pub async fn open(sources: Sources, viewer: Viewer) -> Self {
        let Loaded {
            live,
            draft,
            draft_in_slot,
        } = load(&sources).await;
        let dirty = differs(&draft, &live);
        let mode = resolve_mode(viewer, draft_in_slot);
        info!(%mode, dirty, draft_in_slot, "content loaded");

        let writer = DraftWriter::spawn(sources.slots.clone());
        Self {
            sources,
            viewer,
            live,
            draft,
            dirty,
            mode,
            draft_in_slot,
            writer,
        }
    }

    fn install(&mut self, loaded: Loaded) {
        self.live = loaded.live;
        self.draft = loaded.draft;
        self.draft_in_slot = loaded.draft_in_slot;
        self.dirty = differs(&self.draft, &self.live);
        self.mode = resolve_mode(self.viewer, self.draft_in_slot);
        info!(mode = %self.mode, dirty = self.dirty, draft_in_slot = self.draft_in_slot, "content reloaded");
    }

    // ==================== Accessors ====================

    pub fn live(&self) -> &ContentDocument {
        &self.live
    }

    pub fn draft(&self) -> &ContentDocument {
        &self.draft
    }

    /// The document this viewer should be shown
    pub fn effective(&self) -> &ContentDocument {
        match self.mode {
            Mode::Preview => &self.draft,
            Mode::Public | Mode::Editor => &self.live,
        }
    }

    /// The document an export or an edit starts from
    pub fn working(&self) -> &ContentDocument {
        match self.mode {
            Mode::Editor => &self.draft,
            Mode::Public | Mode::Preview => self.effective(),
        }
    }

    /// Whether the draft has unpublished changes
    pub fn dirty(&self) -> bool {
        self.dirty
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn viewer(&self) -> Viewer {
        self.viewer
    }

    /// Whether the `Draft` slot holds (or is about to hold) a document
    pub fn draft_in_slot(&self) -> bool {
        self.draft_in_slot
    }

    /// Durability of the latest edit
    pub fn persist_state(&self) -> PersistState {
        self.writer.state()
    }

    // ==================== Editing ====================

    fn require_editor(&self) -> Result<(), SessionError> {
        if self.mode == Mode::Editor {
            Ok(())
        } else {
            Err(SessionError::ReadOnly)
        }
    }

    /// Replace the draft and queue it for persistence
    ///
    /// Returns the generation of the queued write. The in-memory draft is
    /// updated even if the write later fails.
    pub fn update(&mut self, doc: ContentDocument) -> Result<u64, SessionError> {
        self.require_editor()?;
        let payload = doc.to_json()?;
        self.dirty = payload != self.live.to_json()?;
        self.draft = doc;
        self.draft_in_slot = true;
        let generation = self.writer.submit(payload);
        debug!(generation, dirty = self.dirty, "draft updated");
        Ok(generation)
    }

    /// Wait for every queued draft write and report the outcome
    pub async fn flush(&mut self) -> PersistState {
        self.writer.flush().await
    }

    /// Persist the current draft now and wait for the result
    pub async fn save_draft(&mut self) -> Result<(), SessionError> {
        self.require_editor()?;
        let payload = self.draft.to_json()?;
        self.draft_in_slot = true;
        self.writer.submit(payload);
        match self.writer.flush().await {
            PersistState::Failed(failure) => Err(failure.into()),
            _ => {
                info!("draft saved");
                Ok(())
            }
        }
    }

    /// Make the draft the live document
    pub async fn publish(&mut self) -> Result<(), SessionError> {
        self.require_editor()?;
        if let PersistState::Failed(failure) = self.writer.flush().await {
            debug!(%failure, "publishing over a failed draft write");
        }

        self.sources
            .slots
            .put(Slot::Live, &self.draft.to_json()?)
            .await?;
        self.sources.slots.clear(Slot::Draft).await?;

        self.live = self.draft.clone();
        self.dirty = false;
        self.draft_in_slot = false;
        info!(photos = self.live.photo_count(), faqs = self.live.faqs.len(), "draft published");
        Ok(())
    }

    /// Throw the draft away and reload
    pub async fn discard(&mut self) -> Result<(), SessionError> {
        self.require_editor()?;
        self.writer.flush().await;
        self.sources.slots.clear(Slot::Draft).await?;
        info!("draft discarded");
        self.reload().await;
        Ok(())
    }

    /// Rerun the load protocol against the current storage
    pub async fn reload(&mut self) {
        self.writer.flush().await;
        let loaded = load(&self.sources).await;
        self.install(loaded);
    }
}

/// Run the load protocol; never fails
async fn load(sources: &Sources) -> Loaded {
    match absorb_legacy(sources.slots.as_ref(), sources.legacy.as_ref()).await {
        Ok(report) if report.found_any() => {
            debug!(absorbed = report.absorbed.len(), "legacy absorption finished")
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "legacy absorption failed; will retry on next load"),
    }

    let live = load_live(sources).await;
    let (draft, draft_in_slot) = match read_slot(sources.slots.as_ref(), Slot::Draft).await {
        Some(draft) => (draft, true),
        None => (live.clone(), false),
    };

    Loaded {
        live,
        draft,
        draft_in_slot,
    }
}

async fn load_live(sources: &Sources) -> ContentDocument {
    if let Some(doc) = read_slot(sources.slots.as_ref(), Slot::Live).await {
        return doc;
    }

    if let Some(snapshot) = &sources.snapshot {
        match snapshot.fetch().await {
            Ok(Some(raw)) => match migrate_str(&raw) {
                Ok(doc) => {
                    info!(source = %snapshot.describe(), "live content from published snapshot");
                    return doc;
                }
                Err(e) => warn!(source = %snapshot.describe(), error = %e, "published snapshot rejected"),
            },
            Ok(None) => debug!(source = %snapshot.describe(), "no published snapshot"),
            Err(e) => warn!(error = %e, "failed to fetch published snapshot"),
        }
    }

    info!("using initial content");
    initial_content()
}

/// Read and migrate one slot, treating every failure as "absent"
async fn read_slot(slots: &dyn SlotStore, slot: Slot) -> Option<ContentDocument> {
    let raw = match slots.get(slot).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(%slot, "slot empty");
            return None;
        }
        Err(e) => {
            warn!(%slot, error = %e, "failed to read slot");
            return None;
        }
    };

    match migrate_str(&raw) {
        Ok(doc) => {
            debug!(%slot, bytes = raw.len(), "slot loaded");
            Some(doc)
        }
        Err(e) => {
            warn!(%slot, error = %e, "slot content rejected");
            None
        }
    }
}

fn resolve_mode(viewer: Viewer, draft_in_slot: bool) -> Mode {
    if viewer.authenticated {
        Mode::Editor
    } else if viewer.preview && draft_in_slot {
        Mode::Preview
    } else {
        Mode::Public
    }
}

/// Dirty comparison on the canonical serialized form
fn differs(a: &ContentDocument, b: &ContentDocument) -> bool {
    a.to_json().ok() != b.to_json().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Faq, Photo};
    use crate::snapshot::SnapshotError;
    use crate::storage::{LegacyRecord, MemorySlotStore, SqliteSlotStore, StorageError, StorageResult};
    use async_trait::async_trait;
    use std::io;
    use tempfile::TempDir;

    struct StaticSnapshot(Option<String>);

    #[async_trait]
    impl SnapshotSource for StaticSnapshot {
        async fn fetch(&self) -> Result<Option<String>, SnapshotError> {
            Ok(self.0.clone())
        }

        fn describe(&self) -> String {
            "static".to_string()
        }
    }

    /// Site that answers every fetch with a server error
    struct UnavailableSnapshot;

    #[async_trait]
    impl SnapshotSource for UnavailableSnapshot {
        async fn fetch(&self) -> Result<Option<String>, SnapshotError> {
            Err(SnapshotError::Status {
                url: "https://villa.example/villa-content.json".to_string(),
                status: 503,
            })
        }

        fn describe(&self) -> String {
            "unavailable".to_string()
        }
    }

    /// Slot store whose reads always fail; writes go to memory
    struct UnreadableSlots(MemorySlotStore);

    #[async_trait]
    impl SlotStore for UnreadableSlots {
        async fn get(&self, _slot: Slot) -> StorageResult<Option<String>> {
            Err(StorageError::Io(io::Error::new(
                io::ErrorKind::Other,
                "disk unavailable",
            )))
        }

        async fn put(&self, slot: Slot, payload: &str) -> StorageResult<()> {
            self.0.put(slot, payload).await
        }

        async fn clear(&self, slot: Slot) -> StorageResult<()> {
            self.0.clear(slot).await
        }
    }

    fn unreadable_sources(snapshot: Arc<dyn SnapshotSource>) -> Sources {
        Sources {
            slots: Arc::new(UnreadableSlots(MemorySlotStore::new())),
            legacy: Arc::new(MemorySlotStore::new()),
            snapshot: Some(snapshot),
        }
    }

    async fn editor_session(store: &Arc<MemorySlotStore>) -> Session {
        Session::open(Sources::from_store(store.clone()), Viewer::editor()).await
    }

    async fn slot(store: &MemorySlotStore, slot: Slot) -> Option<ContentDocument> {
        store
            .get(slot)
            .await
            .unwrap()
            .map(|raw| migrate_str(&raw).unwrap())
    }

    #[test]
    fn test_viewer_from_query() {
        assert!(Viewer::from_query("?preview=true").preview);
        assert!(Viewer::from_query("lang=en&preview=true").preview);
        assert!(!Viewer::from_query("preview=false").preview);
        assert!(!Viewer::from_query("").preview);
        assert!(!Viewer::from_query("preview=true").authenticated);
    }

    #[test]
    fn test_resolve_mode() {
        assert_eq!(resolve_mode(Viewer::editor(), false), Mode::Editor);
        assert_eq!(resolve_mode(Viewer::previewer(), true), Mode::Preview);
        assert_eq!(resolve_mode(Viewer::previewer(), false), Mode::Public);
        assert_eq!(resolve_mode(Viewer::public(), true), Mode::Public);
    }

    #[tokio::test]
    async fn test_fresh_store_uses_initial_content() {
        let store = Arc::new(MemorySlotStore::new());
        let session = editor_session(&store).await;

        assert_eq!(session.live(), &initial_content());
        assert_eq!(session.draft(), session.live());
        assert!(!session.dirty());
        assert!(!session.draft_in_slot());
        assert_eq!(session.mode(), Mode::Editor);
    }

    #[tokio::test]
    async fn test_edit_then_publish() {
        let store = Arc::new(MemorySlotStore::new());
        store
            .put(Slot::Live, &initial_content().to_json().unwrap())
            .await
            .unwrap();
        let mut session = editor_session(&store).await;

        let mut doc = session.draft().clone();
        doc.add_faq(Faq::new("Is there parking?", "Yes, two spaces."))
            .unwrap();
        session.update(doc.clone()).unwrap();

        assert!(session.dirty());
        assert!(session.flush().await.is_persisted());
        assert_eq!(slot(&store, Slot::Draft).await, Some(doc.clone()));
        assert_eq!(slot(&store, Slot::Live).await, Some(initial_content()));

        session.publish().await.unwrap();
        assert!(!session.dirty());
        assert_eq!(session.live(), &doc);
        assert_eq!(slot(&store, Slot::Live).await, Some(doc));
        assert!(slot(&store, Slot::Draft).await.is_none());
    }

    #[tokio::test]
    async fn test_update_back_to_live_is_not_dirty() {
        let store = Arc::new(MemorySlotStore::new());
        let mut session = editor_session(&store).await;
        let original = session.draft().clone();

        let mut doc = original.clone();
        doc.text.hero_title = "Changed".into();
        session.update(doc).unwrap();
        assert!(session.dirty());

        session.update(original).unwrap();
        assert!(!session.dirty());
    }

    #[tokio::test]
    async fn test_discard_restores_live() {
        let store = Arc::new(MemorySlotStore::new());
        let mut session = editor_session(&store).await;

        let mut doc = session.draft().clone();
        doc.faqs.clear();
        session.update(doc).unwrap();
        session.discard().await.unwrap();

        assert!(!session.dirty());
        assert_eq!(session.draft(), session.live());
        assert!(slot(&store, Slot::Draft).await.is_none());
    }

    #[tokio::test]
    async fn test_capacity_failure_keeps_draft() {
        let store = Arc::new(MemorySlotStore::new().with_capacity(4096));
        let mut session = editor_session(&store).await;

        let mut doc = session.draft().clone();
        let sub_id = doc.gallery[0].sub_sections[0].id.clone();
        let huge = format!("data:image/jpeg;base64,{}", "A".repeat(8192));
        doc.add_photo(&sub_id, Photo::new(huge)).unwrap();
        session.update(doc.clone()).unwrap();

        let state = session.flush().await;
        assert!(state.failure().unwrap().is_capacity());
        assert_eq!(session.draft(), &doc);
        assert!(session.dirty());

        let err = session.save_draft().await.unwrap_err();
        assert!(err.is_capacity());
        assert_eq!(err.user_message(), Some(CAPACITY_MESSAGE));
    }

    #[tokio::test]
    async fn test_public_session_is_read_only() {
        let store = Arc::new(MemorySlotStore::new());
        let mut session = Session::open(Sources::from_store(store.clone()), Viewer::public()).await;

        let doc = session.live().clone();
        assert!(matches!(session.update(doc), Err(SessionError::ReadOnly)));
        assert!(matches!(session.publish().await, Err(SessionError::ReadOnly)));
        assert!(matches!(session.discard().await, Err(SessionError::ReadOnly)));
    }

    #[tokio::test]
    async fn test_preview_shows_draft() {
        let store = Arc::new(MemorySlotStore::new());
        let mut draft = initial_content();
        draft.text.hero_title = "Coming soon".into();
        store.put(Slot::Draft, &draft.to_json().unwrap()).await.unwrap();

        let preview = Session::open(Sources::from_store(store.clone()), Viewer::previewer()).await;
        assert_eq!(preview.mode(), Mode::Preview);
        assert_eq!(preview.effective(), &draft);

        let public = Session::open(Sources::from_store(store.clone()), Viewer::public()).await;
        assert_eq!(public.mode(), Mode::Public);
        assert_eq!(public.effective(), &initial_content());
    }

    #[tokio::test]
    async fn test_snapshot_used_when_live_empty() {
        let store = Arc::new(MemorySlotStore::new());
        let mut published = initial_content();
        published.text.hero_title = "From the site".into();

        let sources = Sources::from_store(store.clone())
            .with_snapshot(Arc::new(StaticSnapshot(Some(published.to_json().unwrap()))));
        let session = Session::open(sources, Viewer::public()).await;
        assert_eq!(session.live(), &published);
    }

    #[tokio::test]
    async fn test_invalid_sources_fall_through() {
        let store = Arc::new(MemorySlotStore::new());
        store.put(Slot::Live, r#"{"faqs": 1}"#).await.unwrap();
        store.put(Slot::Draft, "not json").await.unwrap();

        let sources = Sources::from_store(store.clone())
            .with_snapshot(Arc::new(StaticSnapshot(Some("[]".to_string()))));
        let session = Session::open(sources, Viewer::editor()).await;

        assert_eq!(session.live(), &initial_content());
        assert_eq!(session.draft(), session.live());
        assert!(!session.draft_in_slot());
    }

    #[tokio::test]
    async fn test_slot_read_failure_falls_back_to_snapshot() {
        let mut published = initial_content();
        published.text.hero_title = "From the site".into();

        let sources = unreadable_sources(Arc::new(StaticSnapshot(Some(
            published.to_json().unwrap(),
        ))));
        let session = Session::open(sources, Viewer::editor()).await;

        assert_eq!(session.live(), &published);
        assert_eq!(session.draft(), &published);
        assert!(!session.draft_in_slot());
        assert!(!session.dirty());
    }

    #[tokio::test]
    async fn test_snapshot_failure_falls_back_to_initial_content() {
        let sources = unreadable_sources(Arc::new(UnavailableSnapshot));
        let session = Session::open(sources, Viewer::public()).await;

        assert_eq!(session.live(), &initial_content());
        assert_eq!(session.effective(), &initial_content());
        assert_eq!(session.mode(), Mode::Public);

        let store = Arc::new(MemorySlotStore::new());
        let sources = Sources::from_store(store).with_snapshot(Arc::new(UnavailableSnapshot));
        let session = Session::open(sources, Viewer::editor()).await;
        assert_eq!(session.live(), &initial_content());
    }

    #[tokio::test]
    async fn test_legacy_layout_absorbed_on_open() {
        let store = Arc::new(MemorySlotStore::new());
        store
            .insert_legacy_record(
                LegacyRecord::Working,
                serde_json::json!({
                    "photos": [{"id": "a", "url": "a.jpg"}, {"id": "b", "url": "b.jpg"}],
                    "faqs": [],
                    "textContent": {"considerationsTitle": "", "considerationsText": ""}
                })
                .to_string(),
            )
            .await;

        let session = editor_session(&store).await;
        let ids: Vec<&str> = session.draft().gallery[0].sub_sections[0]
            .photos
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(session.draft().legacy_photos.is_empty());
        assert!(session.dirty());
    }

    #[tokio::test]
    async fn test_sqlite_backed_session_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("content.db");

        let store = Arc::new(SqliteSlotStore::open_path(&path).unwrap());
        let mut session = Session::open(Sources::from_store(store), Viewer::editor()).await;
        let mut doc = session.draft().clone();
        doc.location.title = "Uluwatu".into();
        session.update(doc.clone()).unwrap();
        assert!(session.flush().await.is_persisted());
        drop(session);

        let store = Arc::new(SqliteSlotStore::open_path(&path).unwrap());
        let session = Session::open(Sources::from_store(store), Viewer::editor()).await;
        assert_eq!(session.draft(), &doc);
        assert!(session.dirty());
    }
}
