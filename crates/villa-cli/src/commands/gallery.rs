//! Gallery command handlers (sections, sub-sections, photos)

use anyhow::Result;

use villa_core::{Config, ContentDocument, Photo, Viewer};

use super::{confirm, edit, image_ref, open_session, resolve_id};
use crate::output::Output;

fn section_ids(doc: &ContentDocument) -> Vec<(&str, &str)> {
    doc.gallery
        .iter()
        .map(|s| (s.id.as_str(), s.title.as_str()))
        .collect()
}

fn sub_section_ids(doc: &ContentDocument) -> Vec<(&str, &str)> {
    doc.gallery
        .iter()
        .flat_map(|s| s.sub_sections.iter())
        .map(|sub| (sub.id.as_str(), sub.title.as_str()))
        .collect()
}

fn photo_ids(doc: &ContentDocument) -> Vec<(&str, &str)> {
    doc.photos()
        .map(|p| (p.id.as_str(), p.caption.as_str()))
        .collect()
}

// ==================== Sections ====================

pub async fn add_section(config: &Config, title: String, output: &Output) -> Result<()> {
    let id = edit(config, |doc| Ok(doc.add_section(title))).await?;
    output.created("section", &id);
    Ok(())
}

pub async fn rename_section(config: &Config, id: String, title: String, output: &Output) -> Result<()> {
    let id = edit(config, |doc| {
        let id = resolve_id(section_ids(doc), &id, "section")?;
        doc.rename_section(&id, title)?;
        Ok(id)
    })
    .await?;
    output.success(&format!("Renamed section: {}", id));
    Ok(())
}

/// Remove a section along with its sub-sections and photos
pub async fn remove_section(config: &Config, id: String, output: &Output) -> Result<()> {
    if output.should_prompt() {
        let session = open_session(config, Viewer::editor()).await?;
        let doc = session.draft();
        let full = resolve_id(section_ids(doc), &id, "section")?;
        if let Some(section) = doc.gallery.iter().find(|s| s.id == full) {
            let photos: usize = section.sub_sections.iter().map(|sub| sub.photos.len()).sum();
            println!(
                "Remove section '{}' with {} sub-section(s) and {} photo(s)",
                section.title,
                section.sub_sections.len(),
                photos
            );
        }
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let removed = edit(config, |doc| {
        let id = resolve_id(section_ids(doc), &id, "section")?;
        Ok(doc.remove_section(&id)?)
    })
    .await?;
    output.success(&format!("Removed section: {}", removed.title));
    Ok(())
}

// ==================== Sub-sections ====================

pub async fn add_sub_section(
    config: &Config,
    section_id: String,
    title: String,
    output: &Output,
) -> Result<()> {
    let id = edit(config, |doc| {
        let section_id = resolve_id(section_ids(doc), &section_id, "section")?;
        Ok(doc.add_sub_section(&section_id, title)?)
    })
    .await?;
    output.created("sub-section", &id);
    Ok(())
}

pub async fn remove_sub_section(config: &Config, id: String, output: &Output) -> Result<()> {
    let removed = edit(config, |doc| {
        let id = resolve_id(sub_section_ids(doc), &id, "sub-section")?;
        Ok(doc.remove_sub_section(&id)?)
    })
    .await?;
    output.success(&format!(
        "Removed sub-section '{}' ({} photo(s))",
        removed.title,
        removed.photos.len()
    ));
    Ok(())
}

// ==================== Photos ====================

pub async fn list_photos(config: &Config, output: &Output) -> Result<()> {
    let session = open_session(config, Viewer::editor()).await?;
    output.print_photos(session.draft());
    Ok(())
}

/// Add a photo from a file or URL to the end of a sub-section
pub async fn add_photo(
    config: &Config,
    sub_section_id: String,
    source: String,
    caption: Option<String>,
    description: Option<String>,
    output: &Output,
) -> Result<()> {
    let image = image_ref(&source).await?;
    let mut photo = Photo::new(image);
    if let Some(caption) = caption {
        photo = photo.with_caption(caption);
    }
    if let Some(description) = description {
        photo = photo.with_description(description);
    }
    let id = photo.id.clone();

    edit(config, |doc| {
        let sub_id = resolve_id(sub_section_ids(doc), &sub_section_id, "sub-section")?;
        doc.add_photo(&sub_id, photo)?;
        Ok(())
    })
    .await?;
    output.created("photo", &id);
    Ok(())
}

/// Change a photo's caption, description or image
pub async fn update_photo(
    config: &Config,
    id: String,
    caption: Option<String>,
    description: Option<String>,
    source: Option<String>,
    output: &Output,
) -> Result<()> {
    let image = match source {
        Some(source) => Some(image_ref(&source).await?),
        None => None,
    };

    let id = edit(config, |doc| {
        let id = resolve_id(photo_ids(doc), &id, "photo")?;
        doc.update_photo(&id, |photo| {
            if let Some(caption) = caption {
                photo.caption = caption;
            }
            if let Some(description) = description {
                photo.description = description;
            }
            if let Some(image) = image {
                photo.image_ref = image;
            }
        })?;
        Ok(id)
    })
    .await?;
    output.success(&format!("Updated photo: {}", id));
    Ok(())
}

pub async fn remove_photo(config: &Config, id: String, output: &Output) -> Result<()> {
    let removed = edit(config, |doc| {
        let id = resolve_id(photo_ids(doc), &id, "photo")?;
        Ok(doc.remove_photo(&id)?)
    })
    .await?;
    output.success(&format!("Removed photo: {}", removed.id));
    Ok(())
}

/// Move a photo to another sub-section, or to a position within its own
pub async fn move_photo(
    config: &Config,
    id: String,
    to: Option<String>,
    position: Option<usize>,
    output: &Output,
) -> Result<()> {
    if to.is_none() && position.is_none() {
        anyhow::bail!("Nothing to do: give a target sub-section (--to) and/or a --position");
    }

    let id = edit(config, |doc| {
        let id = resolve_id(photo_ids(doc), &id, "photo")?;
        if let Some(to) = &to {
            let target = resolve_id(sub_section_ids(doc), to, "sub-section")?;
            doc.move_photo(&id, &target)?;
        }
        if let Some(position) = position {
            doc.reorder_photo(&id, position)?;
        }
        Ok(id)
    })
    .await?;
    output.success(&format!("Moved photo: {}", id));
    Ok(())
}
