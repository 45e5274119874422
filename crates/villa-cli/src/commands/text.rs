//! Text, location and branding command handlers

use anyhow::{bail, Result};

use villa_core::document::TEXT_FIELDS;
use villa_core::{Config, DocumentError};

use super::{edit, image_ref};
use crate::output::Output;

/// Set a named text field
pub async fn set_text(config: &Config, key: String, value: String, output: &Output) -> Result<()> {
    // Image fields accept a file path like the other image commands
    let value = if key == "heroImageUrl" {
        image_ref(&value).await?
    } else {
        value
    };

    edit(config, |doc| match doc.set_text_field(&key, value) {
        Err(DocumentError::UnknownTextField(_)) => bail!(
            "Unknown text field: '{}'\nValid fields: {}",
            key,
            TEXT_FIELDS.join(", ")
        ),
        other => Ok(other?),
    })
    .await?;

    output.success(&format!("Set {}", key));
    Ok(())
}

/// Change the location section
pub async fn set_location(
    config: &Config,
    title: Option<String>,
    description: Option<String>,
    image: Option<String>,
    output: &Output,
) -> Result<()> {
    if title.is_none() && description.is_none() && image.is_none() {
        bail!("Nothing to set: give --title, --description and/or --image");
    }
    let image = match image {
        Some(source) => Some(image_ref(&source).await?),
        None => None,
    };

    edit(config, |doc| {
        doc.set_location(title, description, image);
        Ok(())
    })
    .await?;

    output.success("Updated location");
    Ok(())
}

/// Change the logo and/or favicon. An empty value clears the image.
pub async fn set_branding(
    config: &Config,
    logo: Option<String>,
    favicon: Option<String>,
    output: &Output,
) -> Result<()> {
    if logo.is_none() && favicon.is_none() {
        bail!("Nothing to set: give --logo and/or --favicon");
    }
    let logo = match logo {
        Some(source) => Some(image_ref(&source).await?),
        None => None,
    };
    let favicon = match favicon {
        Some(source) => Some(image_ref(&source).await?),
        None => None,
    };

    edit(config, |doc| {
        if let Some(logo) = logo {
            doc.set_logo(logo);
        }
        if let Some(favicon) = favicon {
            doc.set_favicon(favicon);
        }
        Ok(())
    })
    .await?;

    output.success("Updated branding");
    Ok(())
}
