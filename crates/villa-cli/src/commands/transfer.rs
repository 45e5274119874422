//! Export and import command handlers

use std::path::PathBuf;

use anyhow::{Context, Result};

use villa_core::{Config, Viewer};

use super::{open_session, wait_for_draft};
use crate::output::Output;

/// Write the working document to a file
///
/// `-` writes to stdout.
pub async fn export(config: &Config, path: Option<PathBuf>, output: &Output) -> Result<()> {
    let session = open_session(config, Viewer::editor()).await?;

    if path.as_deref() == Some(std::path::Path::new("-")) {
        let bytes = session.export()?;
        println!("{}", String::from_utf8_lossy(&bytes));
        return Ok(());
    }

    let path = path.unwrap_or_else(|| config.default_export_path());
    session.export_to_path(&path)?;
    output.success(&format!("Exported content to {}", path.display()));
    if session.dirty() && !output.is_quiet() {
        output.message("Note: the export contains unpublished draft changes.");
    }
    Ok(())
}

/// Load a file into the draft
pub async fn import(config: &Config, path: PathBuf, output: &Output) -> Result<()> {
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read {:?}", path))?;

    let mut session = open_session(config, Viewer::editor()).await?;
    session.import(&bytes).map_err(|e| match e.user_message() {
        Some(msg) => anyhow::Error::new(e).context(msg),
        None => anyhow::Error::new(e),
    })?;
    wait_for_draft(&mut session).await?;

    output.success(&format!(
        "Imported {} into the draft. Review it, then run `villa publish`.",
        path.display()
    ));
    Ok(())
}
