//! One-time absorption of the retired storage layout
//!
//! Older editors wrote two records (a working copy and a published copy) and
//! kept image payloads in a side table behind `idb:` references. On the first
//! load after upgrading, each record is migrated, rehydrated, and written into
//! its slot if that slot is still empty. Afterwards the records and every
//! consumed blob are deleted and a marker makes the whole step a no-op.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info, warn};

use super::rehydrate::{indirection_keys, rehydrate};
use super::{migrate_str, MigrationError};
use crate::models::ContentDocument;
use crate::storage::{LegacyRecord, LegacyStore, SlotStore, StorageResult};

/// What a call to [`absorb_legacy`] did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbsorbReport {
    /// Absorption had already happened; nothing was read
    pub skipped: bool,
    /// Records written into their slot
    pub absorbed: Vec<LegacyRecord>,
    /// Records found but not written because the slot already had content
    pub superseded: Vec<LegacyRecord>,
    /// Records that failed shape validation and were discarded
    pub rejected: Vec<LegacyRecord>,
    /// Indirection references that could not be resolved
    pub unresolved: usize,
    /// Blobs deleted after their payload was inlined
    pub blobs_removed: usize,
}

impl AbsorbReport {
    /// Whether any legacy data was found at all
    pub fn found_any(&self) -> bool {
        !(self.absorbed.is_empty() && self.superseded.is_empty() && self.rejected.is_empty())
    }
}

/// Absorb legacy records into the slots, at most once per store
///
/// Storage failures propagate and leave the marker unset so the next load
/// tries again. A record that is not a valid document is dropped with a
/// warning; it would fail the same way on every retry.
pub async fn absorb_legacy(
    slots: &dyn SlotStore,
    legacy: &dyn LegacyStore,
) -> StorageResult<AbsorbReport> {
    if legacy.is_absorbed().await? {
        return Ok(AbsorbReport {
            skipped: true,
            ..AbsorbReport::default()
        });
    }

    let mut report = AbsorbReport::default();
    let mut consumed = BTreeSet::new();
    let mut processed = Vec::new();

    // Live slot content (or the freshly absorbed published record) is the
    // fallback for references whose blob has gone missing
    let mut fallback: Option<ContentDocument> = match slots.get(LegacyRecord::Published.target()).await? {
        Some(raw) => migrate_str(&raw).ok(),
        None => None,
    };

    for record in LegacyRecord::ALL {
        let Some(raw) = legacy.read_record(record).await? else {
            continue;
        };

        let doc = match migrate_str(&raw) {
            Ok(doc) => doc,
            Err(MigrationError::InvalidFormat(reason)) => {
                warn!(record = record.key(), %reason, "discarding unreadable legacy record");
                report.rejected.push(record);
                legacy.remove_record(record).await?;
                continue;
            }
        };

        let mut blobs = HashMap::new();
        for key in indirection_keys(&doc) {
            if let Some(payload) = legacy.get_blob(&key).await? {
                blobs.insert(key, payload);
            }
        }

        let out = rehydrate(doc, &blobs, fallback.as_ref());
        for miss in &out.misses {
            warn!(record = record.key(), field = %miss.field, key = %miss.key, "legacy image reference not found");
        }
        report.unresolved += out.misses.len();

        let target = record.target();
        if slots.get(target).await?.is_none() {
            slots.put(target, &out.document.to_json()?).await?;
            info!(
                record = record.key(),
                slot = %target,
                from_blobs = out.consumed.len(),
                from_live = out.from_live,
                "absorbed legacy record"
            );
            report.absorbed.push(record);
        } else {
            debug!(record = record.key(), slot = %target, "slot already populated; legacy record superseded");
            report.superseded.push(record);
        }

        if record == LegacyRecord::Published && fallback.is_none() {
            fallback = Some(out.document);
        }

        // Both records may reference the same blob
        consumed.extend(out.consumed);
        processed.push(record);
    }

    for key in &consumed {
        legacy.delete_blob(key).await?;
        report.blobs_removed += 1;
    }
    for record in processed {
        legacy.remove_record(record).await?;
    }

    legacy.mark_absorbed().await?;
    if report.found_any() {
        info!(
            absorbed = report.absorbed.len(),
            superseded = report.superseded.len(),
            rejected = report.rejected.len(),
            unresolved = report.unresolved,
            "legacy storage absorbed"
        );
    }
    Ok(report)
}
