//! Flat photo list to hierarchical gallery

use crate::defaults::default_gallery;
use crate::models::ContentDocument;

/// Move a legacy flat photo list into the gallery
///
/// When the gallery is empty, the default skeleton is built and every legacy
/// photo goes into its first sub-section, in order. A non-empty gallery is
/// authoritative and the flat list is discarded. Either way the flat list ends
/// up empty, so running this twice changes nothing.
///
/// Returns the number of photos moved into the gallery.
pub fn migrate_gallery(doc: &mut ContentDocument) -> usize {
    if doc.legacy_photos.is_empty() {
        return 0;
    }

    let photos = std::mem::take(&mut doc.legacy_photos);
    if !doc.gallery.is_empty() {
        return 0;
    }

    let mut gallery = default_gallery();
    let moved = photos.len();
    if let Some(first) = gallery
        .first_mut()
        .and_then(|section| section.sub_sections.first_mut())
    {
        first.photos = photos;
    }
    doc.gallery = gallery;
    moved
}
