//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use villa_core::{ContentDocument, Faq, Mode, Photo};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print a whole document
    ///
    /// JSON mode prints the document exactly as it would be exported.
    pub fn print_document(&self, doc: &ContentDocument, mode: Mode, dirty: bool) {
        match self.format {
            OutputFormat::Human => {
                let text = &doc.text;
                println!("Mode:      {}{}", mode, if dirty { " (unpublished changes)" } else { "" });
                println!("Title:     {}", text.hero_title);
                if !text.hero_subtitle.is_empty() {
                    println!("Subtitle:  {}", text.hero_subtitle);
                }
                println!("Logo:      {}", describe_image(doc.branding.logo_url.as_deref().unwrap_or("")));
                println!("Favicon:   {}", describe_image(doc.branding.favicon_url.as_deref().unwrap_or("")));
                println!("Hero:      {}", describe_image(&text.hero_image_url));
                println!();
                println!("── Gallery ({} photo(s)) ──", doc.photo_count());
                for section in &doc.gallery {
                    println!("{} {}", short_id(&section.id), section.title);
                    for sub in &section.sub_sections {
                        println!("  {} {} [{}]", short_id(&sub.id), sub.title, sub.photos.len());
                    }
                }
                println!();
                println!("── Location ──");
                println!("{}", doc.location.title);
                println!("{}", truncate_line(&doc.location.description, 70));
                println!();
                println!("── Features ──");
                for feature in &text.features {
                    println!("{} {}", short_id(&feature.id), feature.name);
                }
                println!();
                println!("── {} ──", text.considerations_title);
                println!("{}", truncate_line(&text.considerations_text, 70));
                println!();
                println!("{} FAQ(s)", doc.faqs.len());
            }
            OutputFormat::Json => {
                println!("{}", to_json_pretty(doc));
            }
            OutputFormat::Quiet => {
                println!("{}", mode);
            }
        }
    }

    /// Print the FAQ list
    pub fn print_faqs(&self, faqs: &[Faq]) {
        match self.format {
            OutputFormat::Human => {
                if faqs.is_empty() {
                    println!("No FAQs.");
                    return;
                }
                for faq in faqs {
                    println!("{} | {}", short_id(&faq.id), truncate(&faq.question, 60));
                    println!("         {}", truncate_line(&faq.answer, 70));
                }
                println!("\n{} FAQ(s)", faqs.len());
            }
            OutputFormat::Json => {
                println!("{}", to_json_pretty(faqs));
            }
            OutputFormat::Quiet => {
                for faq in faqs {
                    println!("{}", faq.id);
                }
            }
        }
    }

    /// Print every photo, grouped by sub-section
    pub fn print_photos(&self, doc: &ContentDocument) {
        match self.format {
            OutputFormat::Human => {
                if doc.photo_count() == 0 {
                    println!("No photos.");
                    return;
                }
                for section in &doc.gallery {
                    for sub in &section.sub_sections {
                        if sub.photos.is_empty() {
                            continue;
                        }
                        println!("{} / {}", section.title, sub.title);
                        for photo in &sub.photos {
                            println!("  {}", photo_line(photo));
                        }
                    }
                }
                println!("\n{} photo(s)", doc.photo_count());
            }
            OutputFormat::Json => {
                let rows: Vec<_> = doc
                    .gallery
                    .iter()
                    .flat_map(|s| s.sub_sections.iter())
                    .flat_map(|sub| {
                        sub.photos.iter().map(move |p| {
                            serde_json::json!({
                                "id": p.id,
                                "subSectionId": sub.id,
                                "caption": p.caption,
                                "description": p.description,
                                "image": describe_image(&p.image_ref),
                            })
                        })
                    })
                    .collect();
                println!("{}", to_json_pretty(&rows));
            }
            OutputFormat::Quiet => {
                for photo in doc.photos() {
                    println!("{}", photo.id);
                }
            }
        }
    }

    /// Print the id of something just created
    pub fn created(&self, kind: &str, id: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ Added {}: {}", kind, id),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"status": "success", "kind": kind, "id": id}));
            }
            OutputFormat::Quiet => println!("{}", id),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a warning to stderr (suppressed in quiet mode)
    pub fn warn(&self, message: &str) {
        if !self.is_quiet() {
            eprintln!("⚠ {}", message);
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn to_json_pretty<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

fn photo_line(photo: &Photo) -> String {
    let caption = if photo.caption.is_empty() {
        "(no caption)"
    } else {
        photo.caption.as_str()
    };
    format!(
        "{} | {} | {}",
        short_id(&photo.id),
        truncate(caption, 35),
        describe_image(&photo.image_ref)
    )
}

/// First eight characters of an id, for listings
fn short_id(id: &str) -> &str {
    id.char_indices().nth(8).map_or(id, |(i, _)| &id[..i])
}

/// Summarize an image reference without dumping embedded data
fn describe_image(image_ref: &str) -> String {
    if image_ref.is_empty() {
        return "(none)".to_string();
    }
    match image_ref.strip_prefix("data:") {
        Some(rest) => {
            let mime = rest.split(';').next().unwrap_or("");
            format!("embedded {} ({})", mime, human_size(image_ref.len()))
        }
        None => truncate(image_ref, 45),
    }
}

fn human_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

/// Truncate a string to max length, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        assert_eq!(truncate("Sélection de vins", 8), "Sélec...");
    }

    #[test]
    fn test_truncate_line() {
        assert_eq!(truncate_line("single line", 20), "single line");
        assert_eq!(truncate_line("line one\nline two", 20), "line one");
    }

    #[test]
    fn test_describe_image() {
        assert_eq!(describe_image(""), "(none)");
        assert_eq!(describe_image("https://cdn/a.jpg"), "https://cdn/a.jpg");
        assert!(describe_image("data:image/png;base64,AAAA").starts_with("embedded image/png"));
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("faq-checkin"), "faq-chec");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(3 * 1024 * 1024), "3.0 MB");
    }
}
