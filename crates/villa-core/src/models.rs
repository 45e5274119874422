//! Data models for the site content
//!
//! Defines the content aggregate (`ContentDocument`) and its nested entities.
//! Field names on the wire follow the published `villa-content.json` format,
//! so a document exported here can be dropped straight into the site.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a fresh identifier for a photo, section, FAQ or feature
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// The full content aggregate held in each slot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentDocument {
    /// Logo and favicon references
    #[serde(flatten)]
    pub branding: Branding,
    /// Hierarchical photo gallery
    #[serde(rename = "gallerySections", default)]
    pub gallery: Vec<GallerySection>,
    /// Flat photo list from the old schema. Only ever read as a migration source.
    #[serde(rename = "photos", default, skip_serializing_if = "Vec::is_empty")]
    pub legacy_photos: Vec<Photo>,
    /// Chatbot FAQ entries
    pub faqs: Vec<Faq>,
    /// Location section
    pub location: Location,
    /// Named copy fields
    #[serde(rename = "textContent")]
    pub text: TextContent,
}

impl ContentDocument {
    /// Serialize to the canonical compact JSON form used for storage and
    /// dirty comparison
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Serialize to the pretty form used for export files
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Site branding images
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Branding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon_url: Option<String>,
}

/// Top level of the gallery (e.g. "The Villa")
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GallerySection {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sub_sections: Vec<GallerySubSection>,
}

impl GallerySection {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            sub_sections: Vec::new(),
        }
    }
}

/// Second level of the gallery (e.g. "Bedrooms")
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GallerySubSection {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub photos: Vec<Photo>,
}

impl GallerySubSection {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            photos: Vec::new(),
        }
    }
}

/// A single gallery photo
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Photo {
    /// Unique identifier, assigned at creation and never reused
    pub id: String,
    /// Image reference: a URL, a `data:` URL, or (legacy only) an indirection key
    #[serde(rename = "url", default)]
    pub image_ref: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub description: String,
}

impl Photo {
    /// Create a photo with a fresh id
    pub fn new(image_ref: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            image_ref: image_ref.into(),
            caption: String::new(),
            description: String::new(),
        }
    }

    /// Set the caption (builder style)
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    /// Set the description (builder style)
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A question/answer pair shown by the chatbot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Faq {
    pub id: String,
    pub question: String,
    pub answer: String,
}

impl Faq {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// The location section
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
}

/// A single entry in the features list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Feature {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub detail: String,
}

impl Feature {
    pub fn new(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            detail: detail.into(),
        }
    }
}

/// Fixed set of named copy fields
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct TextContent {
    pub hero_title: String,
    pub hero_subtitle: String,
    pub hero_image_url: String,
    pub about_title: String,
    pub about_text: String,
    pub features_title: String,
    pub features: Vec<Feature>,
    pub considerations_title: String,
    pub considerations_text: String,
}

/// One of the two durable storage locations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Live,
    Draft,
}

impl Slot {
    /// Storage key for this slot
    pub fn key(&self) -> &'static str {
        match self {
            Slot::Live => "live",
            Slot::Draft => "draft",
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
