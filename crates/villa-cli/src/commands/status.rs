//! Status command handler

use anyhow::Result;

use villa_core::{Config, ContentDocument, Viewer};

use super::open_session;
use crate::output::{Output, OutputFormat};

fn serialized_size(doc: &ContentDocument) -> usize {
    doc.to_json().map(|s| s.len()).unwrap_or(0)
}

/// Show status information
pub async fn show(config: &Config, output: &Output) -> Result<()> {
    let session = open_session(config, Viewer::editor()).await?;
    let live = session.live();
    let draft = session.draft();
    let snapshot = config
        .published_url
        .clone()
        .or_else(|| config.published_path.as_ref().map(|p| p.display().to_string()));

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "database": config.content_db_path(),
                    "published_snapshot": snapshot,
                    "dirty": session.dirty(),
                    "draft_in_slot": session.draft_in_slot(),
                    "capacity": config.max_document_bytes,
                    "live": {
                        "photos": live.photo_count(),
                        "faqs": live.faqs.len(),
                        "bytes": serialized_size(live)
                    },
                    "draft": {
                        "photos": draft.photo_count(),
                        "faqs": draft.faqs.len(),
                        "bytes": serialized_size(draft)
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", if session.dirty() { "dirty" } else { "clean" });
        }
        OutputFormat::Human => {
            println!("Villa Content Status");
            println!("====================");
            println!();
            println!("Storage:");
            println!("  Database: {}", config.content_db_path().display());
            println!(
                "  Snapshot: {}",
                snapshot.as_deref().unwrap_or("(not configured)")
            );
            println!();
            println!("Draft:");
            println!(
                "  State:    {}",
                if session.dirty() {
                    "unpublished changes"
                } else {
                    "same as live"
                }
            );
            println!("  Stored:   {}", if session.draft_in_slot() { "yes" } else { "no" });
            println!();
            println!("Contents:        live     draft");
            println!("  Photos:  {:>10} {:>9}", live.photo_count(), draft.photo_count());
            println!("  FAQs:    {:>10} {:>9}", live.faqs.len(), draft.faqs.len());
            println!(
                "  Bytes:   {:>10} {:>9}   (limit {})",
                serialized_size(live),
                serialized_size(draft),
                config.max_document_bytes
            );
        }
    }

    Ok(())
}
