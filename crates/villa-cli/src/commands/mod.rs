//! Command handlers
//!
//! Edit commands all follow the same path: open an editor session, copy the
//! draft, change the copy, hand it to `update`, and wait for the write.

pub mod config;
pub mod content;
pub mod faq;
pub mod gallery;
pub mod status;
pub mod text;
pub mod transfer;

use std::io::{self, IsTerminal, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::debug;

use villa_core::image::{encode_file, DataUrlEncoder};
use villa_core::{Config, ContentDocument, PersistState, Session, SessionError, Sources, Viewer};

/// Open a session against the configured store
pub async fn open_session(config: &Config, viewer: Viewer) -> Result<Session> {
    let sources = Sources::from_config(config)?;
    let session = Session::open(sources, viewer).await;
    debug!(mode = %session.mode(), dirty = session.dirty(), "session opened");
    Ok(session)
}

/// Apply one change to the draft and wait until it is stored
///
/// The closure's return value (e.g. a new id) is passed back.
pub async fn edit<T, F>(config: &Config, change: F) -> Result<T>
where
    F: FnOnce(&mut ContentDocument) -> Result<T>,
{
    let mut session = open_session(config, Viewer::editor()).await?;
    let mut doc = session.draft().clone();
    let value = change(&mut doc)?;
    session.update(doc)?;
    wait_for_draft(&mut session).await?;
    Ok(value)
}

/// Block until queued draft writes finish, turning a failure into an error
pub async fn wait_for_draft(session: &mut Session) -> Result<()> {
    match session.flush().await {
        PersistState::Failed(failure) => {
            Err(SessionError::from(failure)).context("Draft was not saved")
        }
        _ => Ok(()),
    }
}

/// Resolve an id given in full or as a unique prefix
pub fn resolve_id<'a, I>(ids: I, given: &str, kind: &str) -> Result<String>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let candidates: Vec<(&str, &str)> = ids.into_iter().collect();
    if let Some((id, _)) = candidates.iter().find(|(id, _)| *id == given) {
        return Ok(id.to_string());
    }

    let matches: Vec<_> = candidates
        .iter()
        .filter(|(id, _)| id.starts_with(given))
        .collect();

    match matches.len() {
        0 => bail!("No {} found matching: {}", kind, given),
        1 => Ok(matches[0].0.to_string()),
        _ => {
            eprintln!("Multiple {}s match '{}':", kind, given);
            for (id, label) in &matches {
                eprintln!("  {} - {}", id, label);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

/// Turn a command-line image argument into an image reference
///
/// URLs and `data:` URLs are used as given; anything else is read as a file
/// and embedded. An empty string passes through (clears the field).
pub async fn image_ref(source: &str) -> Result<String> {
    if source.is_empty()
        || source.starts_with("http://")
        || source.starts_with("https://")
        || source.starts_with("data:")
    {
        return Ok(source.to_string());
    }

    let path = Path::new(source);
    encode_file(&DataUrlEncoder, path)
        .await
        .with_context(|| format!("Failed to embed image {:?}", path))
}

/// Ask a yes/no question; anything but yes (or a non-interactive stdin) is no
pub fn confirm(prompt: &str) -> Result<bool> {
    if !io::stdin().is_terminal() {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}
