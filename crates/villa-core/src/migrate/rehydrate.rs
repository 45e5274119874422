//! Indirect-payload rehydration
//!
//! The retired storage layout kept image data out of the document: an image
//! field held `idb:<key>` and the payload lived in a separate blob table.
//! Rehydration swaps each such reference for the real payload.
//!
//! Resolution order for a reference:
//! 1. the blob table (pre-fetched by the caller into `blobs`)
//! 2. the same photo (matched by `id`) or the same field in the live document
//! 3. give up: photos are dropped, other image fields are cleared
//!
//! This module does no I/O; the async caller gathers blobs with
//! [`indirection_keys`] first and deletes the consumed ones afterwards.

use std::collections::{BTreeSet, HashMap};

use crate::models::{ContentDocument, Photo};

/// Prefix marking an image reference as an indirection key
pub const INDIRECTION_PREFIX: &str = "idb:";

/// Return the lookup key if `image_ref` is an indirection reference
pub fn indirection_key(image_ref: &str) -> Option<&str> {
    image_ref.strip_prefix(INDIRECTION_PREFIX)
}

/// Image field that could not be resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageField {
    Photo(String),
    Logo,
    Favicon,
    HeroImage,
    LocationImage,
}

impl std::fmt::Display for ImageField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageField::Photo(id) => write!(f, "photo {}", id),
            ImageField::Logo => f.write_str("logo"),
            ImageField::Favicon => f.write_str("favicon"),
            ImageField::HeroImage => f.write_str("hero image"),
            ImageField::LocationImage => f.write_str("location image"),
        }
    }
}

/// An indirection reference found in neither the blob table nor the live document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupMiss {
    pub field: ImageField,
    pub key: String,
}

/// Outcome of rehydrating one document
#[derive(Debug, Clone)]
pub struct Rehydrated {
    pub document: ContentDocument,
    /// Blob keys whose payload was used; the caller deletes these
    pub consumed: BTreeSet<String>,
    /// References satisfied from the live document
    pub from_live: usize,
    pub misses: Vec<LookupMiss>,
}

/// Every distinct indirection key referenced by a document
pub fn indirection_keys(doc: &ContentDocument) -> BTreeSet<String> {
    let fields = [
        doc.branding.logo_url.as_deref(),
        doc.branding.favicon_url.as_deref(),
        Some(doc.text.hero_image_url.as_str()),
        Some(doc.location.image_url.as_str()),
    ];

    fields
        .into_iter()
        .flatten()
        .chain(doc.photos().map(|p| p.image_ref.as_str()))
        .chain(doc.legacy_photos.iter().map(|p| p.image_ref.as_str()))
        .filter_map(indirection_key)
        .map(str::to_string)
        .collect()
}

/// Resolver state shared across all fields of one document
struct Resolver<'a> {
    blobs: &'a HashMap<String, String>,
    consumed: BTreeSet<String>,
    from_live: usize,
    misses: Vec<LookupMiss>,
}

impl Resolver<'_> {
    /// Resolve one reference. Returns `None` (and records a miss) when nothing
    /// satisfies it; non-indirection values pass through unchanged.
    fn resolve(&mut self, value: &str, fallback: Option<&str>, field: ImageField) -> Option<String> {
        let Some(key) = indirection_key(value) else {
            return Some(value.to_string());
        };

        if let Some(payload) = self.blobs.get(key) {
            self.consumed.insert(key.to_string());
            return Some(payload.clone());
        }

        let usable = fallback.filter(|v| !v.is_empty() && indirection_key(v).is_none());
        if let Some(live_value) = usable {
            self.from_live += 1;
            return Some(live_value.to_string());
        }

        self.misses.push(LookupMiss {
            field,
            key: key.to_string(),
        });
        None
    }

    fn resolve_photo(&mut self, photo: &mut Photo, live: Option<&ContentDocument>) -> bool {
        let fallback = live
            .and_then(|doc| doc.find_photo(&photo.id))
            .map(|p| p.image_ref.as_str());
        match self.resolve(&photo.image_ref, fallback, ImageField::Photo(photo.id.clone())) {
            Some(resolved) => {
                photo.image_ref = resolved;
                true
            }
            None => false,
        }
    }
}

/// Replace every indirection reference in `doc`
pub fn rehydrate(
    mut doc: ContentDocument,
    blobs: &HashMap<String, String>,
    live: Option<&ContentDocument>,
) -> Rehydrated {
    let mut resolver = Resolver {
        blobs,
        consumed: BTreeSet::new(),
        from_live: 0,
        misses: Vec::new(),
    };

    for sub in doc
        .gallery
        .iter_mut()
        .flat_map(|section| section.sub_sections.iter_mut())
    {
        sub.photos
            .retain_mut(|photo| resolver.resolve_photo(photo, live));
    }
    doc.legacy_photos
        .retain_mut(|photo| resolver.resolve_photo(photo, live));

    if let Some(logo) = doc.branding.logo_url.take() {
        let fallback = live.and_then(|l| l.branding.logo_url.as_deref());
        doc.branding.logo_url = resolver.resolve(&logo, fallback, ImageField::Logo);
    }
    if let Some(favicon) = doc.branding.favicon_url.take() {
        let fallback = live.and_then(|l| l.branding.favicon_url.as_deref());
        doc.branding.favicon_url = resolver.resolve(&favicon, fallback, ImageField::Favicon);
    }

    let hero_fallback = live.map(|l| l.text.hero_image_url.as_str());
    doc.text.hero_image_url = resolver
        .resolve(&doc.text.hero_image_url, hero_fallback, ImageField::HeroImage)
        .unwrap_or_default();

    let location_fallback = live.map(|l| l.location.image_url.as_str());
    doc.location.image_url = resolver
        .resolve(&doc.location.image_url, location_fallback, ImageField::LocationImage)
        .unwrap_or_default();

    Rehydrated {
        document: doc,
        consumed: resolver.consumed,
        from_live: resolver.from_live,
        misses: resolver.misses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::initial_content;

    fn photo(id: &str, image_ref: &str) -> Photo {
        Photo {
            id: id.to_string(),
            image_ref: image_ref.to_string(),
            caption: String::new(),
            description: String::new(),
        }
    }

    fn doc_with(photos: Vec<Photo>) -> ContentDocument {
        let mut doc = initial_content();
        doc.gallery[0].sub_sections[0].photos = photos;
        doc
    }

    #[test]
    fn test_indirection_key() {
        assert_eq!(indirection_key("idb:abc"), Some("abc"));
        assert_eq!(indirection_key("https://x/y.jpg"), None);
        assert_eq!(indirection_key("data:image/jpeg;base64,xx"), None);
    }

    #[test]
    fn test_collects_keys_from_all_fields() {
        let mut doc = doc_with(vec![photo("p1", "idb:k1"), photo("p2", "https://x")]);
        doc.branding.logo_url = Some("idb:logo".into());
        doc.location.image_url = "idb:loc".into();

        let keys: Vec<String> = indirection_keys(&doc).into_iter().collect();
        assert_eq!(keys, vec!["k1", "loc", "logo"]);
    }

    #[test]
    fn test_blob_lookup() {
        let doc = doc_with(vec![photo("p1", "idb:k1")]);
        let blobs = HashMap::from([("k1".to_string(), "data:image/jpeg;base64,AA".to_string())]);

        let out = rehydrate(doc, &blobs, None);
        assert_eq!(
            out.document.find_photo("p1").unwrap().image_ref,
            "data:image/jpeg;base64,AA"
        );
        assert!(out.consumed.contains("k1"));
        assert!(out.misses.is_empty());
    }

    #[test]
    fn test_falls_back_to_live_photo_by_id() {
        let doc = doc_with(vec![photo("p1", "idb:gone")]);
        let live = doc_with(vec![photo("p1", "https://cdn/p1.jpg")]);

        let out = rehydrate(doc, &HashMap::new(), Some(&live));
        assert_eq!(out.document.find_photo("p1").unwrap().image_ref, "https://cdn/p1.jpg");
        assert_eq!(out.from_live, 1);
        assert!(out.consumed.is_empty());
    }

    #[test]
    fn test_unresolved_photo_is_dropped() {
        let doc = doc_with(vec![
            photo("p1", "idb:gone"),
            photo("p2", "https://cdn/p2.jpg"),
        ]);
        // Live copy of p1 is itself an indirection reference: not usable
        let live = doc_with(vec![photo("p1", "idb:also-gone")]);

        let out = rehydrate(doc, &HashMap::new(), Some(&live));
        assert!(out.document.find_photo("p1").is_none());
        assert!(out.document.find_photo("p2").is_some());
        assert_eq!(
            out.misses,
            vec![LookupMiss {
                field: ImageField::Photo("p1".into()),
                key: "gone".into()
            }]
        );
    }

    #[test]
    fn test_non_photo_fields() {
        let mut doc = initial_content();
        doc.branding.logo_url = Some("idb:logo".into());
        doc.branding.favicon_url = Some("idb:fav".into());
        doc.text.hero_image_url = "idb:hero".into();

        let mut live = initial_content();
        live.text.hero_image_url = "https://cdn/hero.jpg".into();

        let blobs = HashMap::from([("logo".to_string(), "data:logo".to_string())]);
        let out = rehydrate(doc, &blobs, Some(&live));

        assert_eq!(out.document.branding.logo_url.as_deref(), Some("data:logo"));
        assert_eq!(out.document.branding.favicon_url, None);
        assert_eq!(out.document.text.hero_image_url, "https://cdn/hero.jpg");
        assert_eq!(out.misses.len(), 1);
        assert_eq!(out.misses[0].field, ImageField::Favicon);
    }

    #[test]
    fn test_plain_document_untouched() {
        let doc = doc_with(vec![photo("p1", "https://cdn/p1.jpg")]);
        let out = rehydrate(doc.clone(), &HashMap::new(), None);
        assert_eq!(out.document, doc);
        assert!(out.misses.is_empty());
        assert_eq!(out.from_live, 0);
    }
}
