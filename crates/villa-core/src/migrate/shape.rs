//! Shape validation
//!
//! Decides whether an arbitrary JSON value is a content document at all, and
//! decodes it into a candidate whose optional sections are still optional.

use serde::Deserialize;
use serde_json::Value;

use super::MigrationError;
use crate::defaults::default_location;
use crate::models::{Branding, ContentDocument, Faq, GallerySection, Location, Photo, TextContent};

/// Top-level fields from retired versions that are dropped on sight
pub const DEPRECATED_FIELDS: &[&str] = &["viewingSlots"];

/// Check the minimum shape of a content document
///
/// A value is accepted only if `textContent` is an object carrying both
/// considerations fields and `faqs` is an array (possibly empty).
pub fn validate_shape(value: &Value) -> Result<(), MigrationError> {
    let obj = value
        .as_object()
        .ok_or_else(|| MigrationError::InvalidFormat("document is not a JSON object".into()))?;

    let text = obj
        .get("textContent")
        .and_then(Value::as_object)
        .ok_or_else(|| MigrationError::InvalidFormat("missing textContent section".into()))?;

    for field in ["considerationsTitle", "considerationsText"] {
        if text.get(field).map_or(true, Value::is_null) {
            return Err(MigrationError::InvalidFormat(format!(
                "textContent.{} is missing",
                field
            )));
        }
    }

    if !obj.get("faqs").map_or(false, Value::is_array) {
        return Err(MigrationError::InvalidFormat("faqs is not a list".into()));
    }

    Ok(())
}

/// Remove retired top-level fields, returning how many were present
pub fn strip_deprecated(value: &mut Value) -> usize {
    let Some(obj) = value.as_object_mut() else {
        return 0;
    };
    DEPRECATED_FIELDS
        .iter()
        .filter(|field| obj.remove(**field).is_some())
        .count()
}

/// A shape-valid document whose optional sections may still be missing
#[derive(Debug, Deserialize)]
pub(crate) struct DocumentCandidate {
    #[serde(flatten)]
    branding: Branding,
    #[serde(rename = "gallerySections", default)]
    gallery: Option<Vec<GallerySection>>,
    #[serde(rename = "photos", default)]
    legacy_photos: Option<Vec<Photo>>,
    faqs: Vec<Faq>,
    #[serde(default)]
    location: Option<Location>,
    #[serde(rename = "textContent")]
    text: TextContent,
}

impl DocumentCandidate {
    /// Decode a value that already passed [`validate_shape`]
    pub(crate) fn decode(value: Value) -> Result<Self, MigrationError> {
        serde_json::from_value(value).map_err(|e| MigrationError::InvalidFormat(e.to_string()))
    }

    /// Fill in missing sections with their defaults
    pub(crate) fn into_document(self) -> ContentDocument {
        ContentDocument {
            branding: self.branding,
            gallery: self.gallery.unwrap_or_default(),
            legacy_photos: self.legacy_photos.unwrap_or_default(),
            faqs: self.faqs,
            location: self.location.unwrap_or_else(default_location),
            text: self.text,
        }
    }
}
