//! Compiled-in content
//!
//! The initial content is used only when no other source yields a valid
//! document. The gallery skeleton and default location are also used by the
//! migration engine, so their ids are fixed: migrating the same input twice
//! must produce the same output.

use crate::models::{
    Branding, ContentDocument, Faq, Feature, GallerySection, GallerySubSection, Location,
    TextContent,
};

/// Default location, used when a document has no location section
pub fn default_location() -> Location {
    Location {
        title: "Location".to_string(),
        description: "Location description placeholder".to_string(),
        image_url: String::new(),
    }
}

/// Two-level gallery skeleton
///
/// Legacy flat photo lists are poured into the first sub-section of the
/// first section.
pub fn default_gallery() -> Vec<GallerySection> {
    vec![
        section(
            "section-villa",
            "The Villa",
            &[
                ("sub-villa-overview", "Overview"),
                ("sub-villa-rooms", "Rooms"),
            ],
        ),
        section(
            "section-surroundings",
            "Surroundings",
            &[
                ("sub-surroundings-garden", "Garden & Pool"),
                ("sub-surroundings-area", "The Area"),
            ],
        ),
    ]
}

fn section(id: &str, title: &str, subs: &[(&str, &str)]) -> GallerySection {
    GallerySection {
        id: id.to_string(),
        title: title.to_string(),
        sub_sections: subs
            .iter()
            .map(|(sub_id, sub_title)| GallerySubSection {
                id: sub_id.to_string(),
                title: sub_title.to_string(),
                photos: Vec::new(),
            })
            .collect(),
    }
}

/// The initial content shipped with the site
pub fn initial_content() -> ContentDocument {
    ContentDocument {
        branding: Branding::default(),
        gallery: default_gallery(),
        legacy_photos: Vec::new(),
        faqs: vec![
            Faq {
                id: "faq-checkin".to_string(),
                question: "What time is check-in?".to_string(),
                answer: "Check-in is from 3pm; check-out is by 11am.".to_string(),
            },
            Faq {
                id: "faq-pets".to_string(),
                question: "Are pets allowed?".to_string(),
                answer: "Please ask before booking.".to_string(),
            },
        ],
        location: default_location(),
        text: TextContent {
            hero_title: "Villa Luar".to_string(),
            hero_subtitle: "A quiet retreat by the sea".to_string(),
            hero_image_url: String::new(),
            about_title: "About the Villa".to_string(),
            about_text: "Tell guests about the villa here.".to_string(),
            features_title: "Features".to_string(),
            features: vec![
                Feature {
                    id: "feature-pool".to_string(),
                    name: "Private pool".to_string(),
                    detail: String::new(),
                },
                Feature {
                    id: "feature-wifi".to_string(),
                    name: "Wi-Fi".to_string(),
                    detail: String::new(),
                },
            ],
            considerations_title: "Things to Consider".to_string(),
            considerations_text: String::new(),
        },
    }
}
