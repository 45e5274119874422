//! Villa Core Library
//!
//! Content store for the villa site: a published (live) document and an
//! unpublished (draft) one, plus everything needed to get older content into
//! that shape.
//!
//! # Architecture
//!
//! - **Slots**: two durable keys, `live` and `draft`, each holding one whole
//!   serialized document (SQLite, or in memory for tests)
//! - **Migration**: every document read from anywhere is validated and
//!   brought up to the current schema before use
//! - **Session**: resolves which document a viewer sees and runs the
//!   edit / publish / discard workflow, persisting drafts in the background
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut session = Session::open(Sources::from_config(&config)?, Viewer::editor()).await;
//!
//! let mut doc = session.draft().clone();
//! doc.add_faq(Faq::new("Is breakfast included?", "Yes."))?;
//! session.update(doc)?;
//! session.publish().await?;
//! ```
//!
//! # Modules
//!
//! - `models`: the content document and its parts
//! - `document`: structured edits on a document
//! - `migrate`: validation, schema migration, legacy absorption
//! - `storage`: slot store backends
//! - `session`: content resolution and the editing workflow
//! - `transfer`: export and import files
//! - `snapshot`: reading the published snapshot
//! - `image`: turning image files into document references
//! - `config`: application configuration

pub mod config;
pub mod defaults;
pub mod document;
pub mod image;
pub mod migrate;
pub mod models;
pub mod session;
pub mod snapshot;
pub mod storage;
pub mod transfer;

pub use config::Config;
pub use document::DocumentError;
pub use migrate::MigrationError;
pub use models::{ContentDocument, Faq, Feature, GallerySection, GallerySubSection, Photo, Slot};
pub use session::{Mode, PersistState, Session, SessionError, Sources, Viewer};
pub use storage::{MemorySlotStore, SlotStore, SqliteSlotStore, StorageError};
