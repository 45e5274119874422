//! Show, publish and discard

use anyhow::{Context, Result};

use villa_core::{Config, Mode, Viewer};

use super::{confirm, open_session};
use crate::output::Output;

/// Print the document a given viewer would see
pub async fn show(config: &Config, preview: bool, public: bool, output: &Output) -> Result<()> {
    let viewer = if public {
        Viewer::public()
    } else if preview {
        Viewer::previewer()
    } else {
        Viewer::editor()
    };

    let session = open_session(config, viewer).await?;
    if preview && session.mode() != Mode::Preview {
        output.warn("No draft to preview; showing the live content.");
    }
    output.print_document(session.working(), session.mode(), session.dirty());
    Ok(())
}

/// Publish the draft
pub async fn publish(config: &Config, output: &Output) -> Result<()> {
    let mut session = open_session(config, Viewer::editor()).await?;
    if !session.dirty() && !session.draft_in_slot() {
        output.message("Nothing to publish: the draft matches the live content.");
        return Ok(());
    }

    session.publish().await.context("Failed to publish")?;
    output.success("Published draft to live");
    Ok(())
}

/// Throw away the draft
pub async fn discard(config: &Config, yes: bool, output: &Output) -> Result<()> {
    let mut session = open_session(config, Viewer::editor()).await?;
    if !session.draft_in_slot() {
        output.message("No draft to discard.");
        return Ok(());
    }

    if !yes && output.should_prompt() {
        println!("This drops every unpublished change.");
        if !confirm("Discard the draft?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    session.discard().await.context("Failed to discard draft")?;
    output.success("Discarded draft");
    Ok(())
}
