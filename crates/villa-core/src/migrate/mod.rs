//! Migration engine
//!
//! Every document read from a slot, the published snapshot, an import file, or
//! the retired storage layout passes through here before anything else sees it.
//!
//! The pipeline:
//! 1. [`validate_shape`] rejects values that are not content documents
//! 2. missing optional sections (gallery, location) get their defaults
//! 3. [`migrate_gallery`] folds a flat photo list into the gallery
//!
//! Migration is idempotent: `migrate(migrate(d)) == migrate(d)`.

pub mod gallery;
pub mod legacy;
pub mod rehydrate;
pub mod shape;

use serde_json::Value;
use thiserror::Error;

use crate::models::ContentDocument;

pub use gallery::migrate_gallery;
pub use legacy::{absorb_legacy, AbsorbReport};
pub use rehydrate::{indirection_key, indirection_keys, rehydrate, LookupMiss, Rehydrated, INDIRECTION_PREFIX};
pub use shape::{strip_deprecated, validate_shape, DEPRECATED_FIELDS};

use shape::DocumentCandidate;

/// Errors produced while turning raw input into a content document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MigrationError {
    /// The input is not a recognizable content document
    #[error("Invalid content format: {0}")]
    InvalidFormat(String),
}

/// Bring an already-typed document up to the current shape
pub fn migrate(mut doc: ContentDocument) -> ContentDocument {
    let moved = migrate_gallery(&mut doc);
    if moved > 0 {
        tracing::debug!(photos = moved, "moved flat photo list into gallery");
    }
    doc
}

/// Validate, decode and migrate a JSON value
pub fn migrate_value(value: Value) -> Result<ContentDocument, MigrationError> {
    validate_shape(&value)?;
    let doc = DocumentCandidate::decode(value)?.into_document();
    Ok(migrate(doc))
}

/// Parse, validate, decode and migrate serialized JSON
pub fn migrate_str(raw: &str) -> Result<ContentDocument, MigrationError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| MigrationError::InvalidFormat(e.to_string()))?;
    migrate_value(value)
}
