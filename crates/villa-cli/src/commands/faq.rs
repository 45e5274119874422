//! FAQ command handlers

use anyhow::Result;

use villa_core::{Config, Faq, Viewer};

use super::{confirm, edit, open_session, resolve_id};
use crate::output::Output;

/// List FAQs in the draft
pub async fn list(config: &Config, output: &Output) -> Result<()> {
    let session = open_session(config, Viewer::editor()).await?;
    output.print_faqs(&session.draft().faqs);
    Ok(())
}

/// Add a FAQ to the draft
pub async fn add(config: &Config, question: String, answer: String, output: &Output) -> Result<()> {
    let id = edit(config, |doc| {
        let faq = Faq::new(question, answer);
        let id = faq.id.clone();
        doc.add_faq(faq)?;
        Ok(id)
    })
    .await?;

    output.created("FAQ", &id);
    Ok(())
}

/// Change the question and/or answer of a FAQ
pub async fn update(
    config: &Config,
    id: String,
    question: Option<String>,
    answer: Option<String>,
    output: &Output,
) -> Result<()> {
    let id = edit(config, |doc| {
        let id = resolve_id(faq_ids(&doc.faqs), &id, "FAQ")?;
        let current = doc
            .faqs
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("FAQ not found: {}", id))?;
        doc.update_faq(
            &id,
            question.unwrap_or(current.question),
            answer.unwrap_or(current.answer),
        )?;
        Ok(id)
    })
    .await?;

    output.success(&format!("Updated FAQ: {}", id));
    Ok(())
}

/// Remove a FAQ from the draft
pub async fn remove(config: &Config, id: String, output: &Output) -> Result<()> {
    if output.should_prompt() {
        let session = open_session(config, Viewer::editor()).await?;
        let faqs = &session.draft().faqs;
        let full = resolve_id(faq_ids(faqs), &id, "FAQ")?;
        if let Some(faq) = faqs.iter().find(|f| f.id == full) {
            println!("Remove FAQ: {}", faq.question);
        }
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let removed = edit(config, |doc| {
        let id = resolve_id(faq_ids(&doc.faqs), &id, "FAQ")?;
        Ok(doc.remove_faq(&id)?)
    })
    .await?;

    output.success(&format!("Removed FAQ: {}", removed.id));
    Ok(())
}

fn faq_ids(faqs: &[Faq]) -> Vec<(&str, &str)> {
    faqs.iter()
        .map(|f| (f.id.as_str(), f.question.as_str()))
        .collect()
}
