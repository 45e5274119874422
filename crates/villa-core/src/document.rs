//! Structured edits on a content document
//!
//! Storage only ever sees whole documents. Partial edits happen here: the
//! caller takes a copy of the draft, applies one of these operations, and
//! hands the result to `Session::update`.

use thiserror::Error;

use crate::models::{ContentDocument, Faq, Feature, GallerySection, GallerySubSection, Photo};

/// Errors that can occur while editing a document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} with id {id} already exists")]
    DuplicateId { kind: &'static str, id: String },

    #[error("Unknown text field: {0}")]
    UnknownTextField(String),

    #[error("Position {index} is out of range for {len} photo(s)")]
    OutOfRange { index: usize, len: usize },
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn not_found(kind: &'static str, id: &str) -> DocumentError {
    DocumentError::NotFound {
        kind,
        id: id.to_string(),
    }
}

/// Text fields that can be set by name, keyed the same way as the JSON
pub const TEXT_FIELDS: &[&str] = &[
    "heroTitle",
    "heroSubtitle",
    "heroImageUrl",
    "aboutTitle",
    "aboutText",
    "featuresTitle",
    "considerationsTitle",
    "considerationsText",
];

impl ContentDocument {
    // ==================== FAQ Operations ====================

    /// Add a FAQ entry
    pub fn add_faq(&mut self, faq: Faq) -> Result<(), DocumentError> {
        if self.faqs.iter().any(|f| f.id == faq.id) {
            return Err(DocumentError::DuplicateId {
                kind: "FAQ",
                id: faq.id,
            });
        }
        self.faqs.push(faq);
        Ok(())
    }

    /// Replace the question and answer of an existing FAQ
    pub fn update_faq(
        &mut self,
        id: &str,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Result<(), DocumentError> {
        let faq = self
            .faqs
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| not_found("FAQ", id))?;
        faq.question = question.into();
        faq.answer = answer.into();
        Ok(())
    }

    /// Remove a FAQ, returning it
    pub fn remove_faq(&mut self, id: &str) -> Result<Faq, DocumentError> {
        let pos = self
            .faqs
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| not_found("FAQ", id))?;
        Ok(self.faqs.remove(pos))
    }

    // ==================== Feature Operations ====================

    pub fn add_feature(&mut self, feature: Feature) -> Result<(), DocumentError> {
        if self.text.features.iter().any(|f| f.id == feature.id) {
            return Err(DocumentError::DuplicateId {
                kind: "Feature",
                id: feature.id,
            });
        }
        self.text.features.push(feature);
        Ok(())
    }

    pub fn remove_feature(&mut self, id: &str) -> Result<Feature, DocumentError> {
        let pos = self
            .text
            .features
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| not_found("Feature", id))?;
        Ok(self.text.features.remove(pos))
    }

    // ==================== Text Operations ====================

    /// Set a named copy field, using its JSON key (e.g. `heroTitle`)
    pub fn set_text_field(&mut self, key: &str, value: impl Into<String>) -> Result<(), DocumentError> {
        let text = &mut self.text;
        let field = match key {
            "heroTitle" => &mut text.hero_title,
            "heroSubtitle" => &mut text.hero_subtitle,
            "heroImageUrl" => &mut text.hero_image_url,
            "aboutTitle" => &mut text.about_title,
            "aboutText" => &mut text.about_text,
            "featuresTitle" => &mut text.features_title,
            "considerationsTitle" => &mut text.considerations_title,
            "considerationsText" => &mut text.considerations_text,
            _ => return Err(DocumentError::UnknownTextField(key.to_string())),
        };
        *field = value.into();
        Ok(())
    }

    // ==================== Location & Branding ====================

    /// Change any of the location fields; `None` leaves a field as it is
    pub fn set_location(
        &mut self,
        title: Option<String>,
        description: Option<String>,
        image_url: Option<String>,
    ) {
        let location = &mut self.location;
        if let Some(title) = title {
            location.title = title;
        }
        if let Some(description) = description {
            location.description = description;
        }
        if let Some(image_url) = image_url {
            location.image_url = image_url;
        }
    }

    /// Set or clear the logo. An empty string clears it.
    pub fn set_logo(&mut self, image_ref: impl Into<String>) {
        self.branding.logo_url = non_empty(image_ref.into());
    }

    /// Set or clear the favicon. An empty string clears it.
    pub fn set_favicon(&mut self, image_ref: impl Into<String>) {
        self.branding.favicon_url = non_empty(image_ref.into());
    }

    // ==================== Gallery Operations ====================

    /// Append a new top-level section, returning its id
    pub fn add_section(&mut self, title: impl Into<String>) -> String {
        let section = GallerySection::new(title);
        let id = section.id.clone();
        self.gallery.push(section);
        id
    }

    pub fn rename_section(&mut self, id: &str, title: impl Into<String>) -> Result<(), DocumentError> {
        self.section_mut(id)?.title = title.into();
        Ok(())
    }

    /// Remove a section together with everything in it
    pub fn remove_section(&mut self, id: &str) -> Result<GallerySection, DocumentError> {
        let pos = self
            .gallery
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| not_found("Section", id))?;
        Ok(self.gallery.remove(pos))
    }

    /// Append a sub-section to a section, returning its id
    pub fn add_sub_section(
        &mut self,
        section_id: &str,
        title: impl Into<String>,
    ) -> Result<String, DocumentError> {
        let sub = GallerySubSection::new(title);
        let id = sub.id.clone();
        self.section_mut(section_id)?.sub_sections.push(sub);
        Ok(id)
    }

    /// Remove a sub-section and its photos
    pub fn remove_sub_section(&mut self, sub_id: &str) -> Result<GallerySubSection, DocumentError> {
        for section in &mut self.gallery {
            if let Some(pos) = section.sub_sections.iter().position(|s| s.id == sub_id) {
                return Ok(section.sub_sections.remove(pos));
            }
        }
        Err(not_found("Sub-section", sub_id))
    }

    /// Append a photo to a sub-section
    pub fn add_photo(&mut self, sub_id: &str, photo: Photo) -> Result<(), DocumentError> {
        if self.find_photo(&photo.id).is_some() {
            return Err(DocumentError::DuplicateId {
                kind: "Photo",
                id: photo.id,
            });
        }
        self.sub_section_mut(sub_id)?.photos.push(photo);
        Ok(())
    }

    /// Apply a change to a photo in place
    pub fn update_photo<F>(&mut self, photo_id: &str, change: F) -> Result<(), DocumentError>
    where
        F: FnOnce(&mut Photo),
    {
        let photo = self
            .photos_mut()
            .find(|p| p.id == photo_id)
            .ok_or_else(|| not_found("Photo", photo_id))?;
        change(photo);
        Ok(())
    }

    /// Remove a photo from wherever it is in the gallery
    pub fn remove_photo(&mut self, photo_id: &str) -> Result<Photo, DocumentError> {
        for sub in self.gallery.iter_mut().flat_map(|s| s.sub_sections.iter_mut()) {
            if let Some(pos) = sub.photos.iter().position(|p| p.id == photo_id) {
                return Ok(sub.photos.remove(pos));
            }
        }
        Err(not_found("Photo", photo_id))
    }

    /// Move a photo to the end of another sub-section
    ///
    /// The target is checked before the photo is taken out, so a failed move
    /// leaves the document untouched.
    pub fn move_photo(&mut self, photo_id: &str, target_sub_id: &str) -> Result<(), DocumentError> {
        self.sub_section_mut(target_sub_id)?;
        let photo = self.remove_photo(photo_id)?;
        self.sub_section_mut(target_sub_id)?.photos.push(photo);
        Ok(())
    }

    /// Move a photo to a new position within its own sub-section
    pub fn reorder_photo(&mut self, photo_id: &str, new_index: usize) -> Result<(), DocumentError> {
        for sub in self.gallery.iter_mut().flat_map(|s| s.sub_sections.iter_mut()) {
            if let Some(pos) = sub.photos.iter().position(|p| p.id == photo_id) {
                let len = sub.photos.len();
                if new_index >= len {
                    return Err(DocumentError::OutOfRange {
                        index: new_index,
                        len,
                    });
                }
                let photo = sub.photos.remove(pos);
                sub.photos.insert(new_index, photo);
                return Ok(());
            }
        }
        Err(not_found("Photo", photo_id))
    }

    /// Find a photo anywhere in the gallery
    pub fn find_photo(&self, photo_id: &str) -> Option<&Photo> {
        self.photos().find(|p| p.id == photo_id)
    }

    /// Iterate over every gallery photo in display order
    pub fn photos(&self) -> impl Iterator<Item = &Photo> {
        self.gallery
            .iter()
            .flat_map(|s| s.sub_sections.iter())
            .flat_map(|sub| sub.photos.iter())
    }

    fn photos_mut(&mut self) -> impl Iterator<Item = &mut Photo> {
        self.gallery
            .iter_mut()
            .flat_map(|s| s.sub_sections.iter_mut())
            .flat_map(|sub| sub.photos.iter_mut())
    }

    /// Total number of gallery photos
    pub fn photo_count(&self) -> usize {
        self.photos().count()
    }

    fn section_mut(&mut self, id: &str) -> Result<&mut GallerySection, DocumentError> {
        self.gallery
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| not_found("Section", id))
    }

    fn sub_section_mut(&mut self, id: &str) -> Result<&mut GallerySubSection, DocumentError> {
        self.gallery
            .iter_mut()
            .flat_map(|s| s.sub_sections.iter_mut())
            .find(|s| s.id == id)
            .ok_or_else(|| not_found("Sub-section", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::initial_content;

    fn first_sub(doc: &ContentDocument) -> String {
        doc.gallery[0].sub_sections[0].id.clone()
    }

    #[test]
    fn test_location_and_branding() {
        let mut doc = initial_content();
        let description = doc.location.description.clone();

        doc.set_location(Some("Canggu".into()), None, Some("https://cdn/map.jpg".into()));
        assert_eq!(doc.location.title, "Canggu");
        assert_eq!(doc.location.description, description);
        assert_eq!(doc.location.image_url, "https://cdn/map.jpg");

        doc.set_logo("data:image/svg+xml;base64,PHN2Zz4=");
        assert!(doc.branding.logo_url.is_some());
        doc.set_logo("");
        assert!(doc.branding.logo_url.is_none());

        doc.set_favicon("https://cdn/favicon.ico");
        assert_eq!(doc.branding.favicon_url.as_deref(), Some("https://cdn/favicon.ico"));
    }

    #[test]
    fn test_add_and_remove_faq() {
        let mut doc = initial_content();
        let before = doc.faqs.len();

        let faq = Faq::new("Is there parking?", "Yes, for two cars.");
        let id = faq.id.clone();
        doc.add_faq(faq).unwrap();
        assert_eq!(doc.faqs.len(), before + 1);

        let removed = doc.remove_faq(&id).unwrap();
        assert_eq!(removed.question, "Is there parking?");
        assert_eq!(doc.faqs.len(), before);
    }

    #[test]
    fn test_duplicate_faq_rejected() {
        let mut doc = initial_content();
        let existing = doc.faqs[0].clone();
        let err = doc.add_faq(existing).unwrap_err();
        assert!(matches!(err, DocumentError::DuplicateId { .. }));
    }

    #[test]
    fn test_update_missing_faq() {
        let mut doc = initial_content();
        let err = doc.update_faq("nope", "q", "a").unwrap_err();
        assert_eq!(
            err,
            DocumentError::NotFound {
                kind: "FAQ",
                id: "nope".to_string()
            }
        );
    }

    #[test]
    fn test_set_text_field() {
        let mut doc = initial_content();
        doc.set_text_field("heroTitle", "Casa Luar").unwrap();
        assert_eq!(doc.text.hero_title, "Casa Luar");

        for key in TEXT_FIELDS {
            doc.set_text_field(key, "x").unwrap();
        }

        let err = doc.set_text_field("footer", "x").unwrap_err();
        assert!(matches!(err, DocumentError::UnknownTextField(_)));
    }

    #[test]
    fn test_add_photo_and_find() {
        let mut doc = initial_content();
        let sub = first_sub(&doc);
        let photo = Photo::new("https://example.com/pool.jpg").with_caption("Pool");
        let id = photo.id.clone();

        doc.add_photo(&sub, photo).unwrap();
        assert_eq!(doc.photo_count(), 1);
        assert_eq!(doc.find_photo(&id).unwrap().caption, "Pool");
    }

    #[test]
    fn test_add_photo_to_missing_sub_section() {
        let mut doc = initial_content();
        let err = doc.add_photo("missing", Photo::new("x")).unwrap_err();
        assert!(matches!(err, DocumentError::NotFound { kind: "Sub-section", .. }));
        assert_eq!(doc.photo_count(), 0);
    }

    #[test]
    fn test_move_photo_between_sub_sections() {
        let mut doc = initial_content();
        let from = first_sub(&doc);
        let to = doc.gallery[1].sub_sections[0].id.clone();

        let photo = Photo::new("a.jpg");
        let id = photo.id.clone();
        doc.add_photo(&from, photo).unwrap();

        doc.move_photo(&id, &to).unwrap();
        assert!(doc.gallery[0].sub_sections[0].photos.is_empty());
        assert_eq!(doc.gallery[1].sub_sections[0].photos[0].id, id);
    }

    #[test]
    fn test_failed_move_keeps_photo() {
        let mut doc = initial_content();
        let from = first_sub(&doc);
        let photo = Photo::new("a.jpg");
        let id = photo.id.clone();
        doc.add_photo(&from, photo).unwrap();

        assert!(doc.move_photo(&id, "nowhere").is_err());
        assert!(doc.find_photo(&id).is_some());
    }

    #[test]
    fn test_reorder_photo() {
        let mut doc = initial_content();
        let sub = first_sub(&doc);
        let ids: Vec<String> = (0..3)
            .map(|i| {
                let p = Photo::new(format!("{}.jpg", i));
                let id = p.id.clone();
                doc.add_photo(&sub, p).unwrap();
                id
            })
            .collect();

        doc.reorder_photo(&ids[2], 0).unwrap();
        let order: Vec<&str> = doc.gallery[0].sub_sections[0]
            .photos
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(order, vec![ids[2].as_str(), ids[0].as_str(), ids[1].as_str()]);

        let err = doc.reorder_photo(&ids[0], 3).unwrap_err();
        assert_eq!(err, DocumentError::OutOfRange { index: 3, len: 3 });
    }

    #[test]
    fn test_sections() {
        let mut doc = initial_content();
        let section = doc.add_section("Events");
        let sub = doc.add_sub_section(&section, "Weddings").unwrap();
        doc.rename_section(&section, "Celebrations").unwrap();

        doc.add_photo(&sub, Photo::new("w.jpg")).unwrap();
        let removed = doc.remove_sub_section(&sub).unwrap();
        assert_eq!(removed.photos.len(), 1);

        let removed = doc.remove_section(&section).unwrap();
        assert_eq!(removed.title, "Celebrations");
    }

    #[test]
    fn test_update_photo() {
        let mut doc = initial_content();
        let sub = first_sub(&doc);
        let photo = Photo::new("a.jpg");
        let id = photo.id.clone();
        doc.add_photo(&sub, photo).unwrap();

        doc.update_photo(&id, |p| p.description = "Sunset terrace".to_string())
            .unwrap();
        assert_eq!(doc.find_photo(&id).unwrap().description, "Sunset terrace");
    }

    #[test]
    fn test_features() {
        let mut doc = initial_content();
        let before = doc.text.features.len();
        let feature = Feature::new("Pool", "Private infinity pool");
        let id = feature.id.clone();

        doc.add_feature(feature.clone()).unwrap();
        assert!(matches!(
            doc.add_feature(feature),
            Err(DocumentError::DuplicateId { .. })
        ));
        assert_eq!(doc.text.features.len(), before + 1);

        assert_eq!(doc.remove_feature(&id).unwrap().name, "Pool");
        assert!(doc.remove_feature(&id).is_err());
    }
}
