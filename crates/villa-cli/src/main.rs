//! Villa CLI
//!
//! Command-line editor for the villa site content: edit the draft, preview
//! it, publish it, and move content in and out as `villa-content.json`.

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use villa_core::Config;

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "villa")]
#[command(about = "Villa site content editor - draft, preview, publish")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show draft/live status
    Status,
    /// Show the content a viewer would see
    Show {
        /// Show the unpublished draft as a visitor would with ?preview=true
        #[arg(long, conflicts_with = "public")]
        preview: bool,
        /// Show what an anonymous visitor sees
        #[arg(long)]
        public: bool,
    },
    /// Export the working document as villa-content.json
    Export {
        /// Output path ('-' for stdout); defaults to <data_dir>/villa-content.json
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Import a content file into the draft
    Import {
        /// File previously written by `export`
        file: PathBuf,
    },
    /// Publish the draft
    Publish,
    /// Throw away the draft
    Discard {
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Manage chatbot FAQs
    Faq {
        #[command(subcommand)]
        command: FaqCommands,
    },
    /// Manage gallery sections
    Section {
        #[command(subcommand)]
        command: SectionCommands,
    },
    /// Manage gallery sub-sections
    SubSection {
        #[command(subcommand)]
        command: SubSectionCommands,
    },
    /// Manage gallery photos
    Photo {
        #[command(subcommand)]
        command: PhotoCommands,
    },
    /// Edit text content
    Text {
        #[command(subcommand)]
        command: TextCommands,
    },
    /// Edit the location section
    Location {
        #[command(subcommand)]
        command: LocationCommands,
    },
    /// Edit the logo and favicon
    Branding {
        #[command(subcommand)]
        command: BrandingCommands,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum FaqCommands {
    /// List FAQs in the draft
    #[command(alias = "ls")]
    List,
    /// Add a FAQ
    Add { question: String, answer: String },
    /// Change a FAQ
    Update {
        /// FAQ ID (full or prefix)
        id: String,
        #[arg(long)]
        question: Option<String>,
        #[arg(long)]
        answer: Option<String>,
    },
    /// Remove a FAQ
    #[command(alias = "rm")]
    Remove {
        /// FAQ ID (full or prefix)
        id: String,
    },
}

#[derive(Subcommand)]
enum SectionCommands {
    /// Add a top-level gallery section
    Add { title: String },
    /// Rename a section
    Rename {
        /// Section ID (full or prefix)
        id: String,
        title: String,
    },
    /// Remove a section and everything in it
    #[command(alias = "rm")]
    Remove {
        /// Section ID (full or prefix)
        id: String,
    },
}

#[derive(Subcommand)]
enum SubSectionCommands {
    /// Add a sub-section to a section
    Add {
        /// Section ID (full or prefix)
        section_id: String,
        title: String,
    },
    /// Remove a sub-section and its photos
    #[command(alias = "rm")]
    Remove {
        /// Sub-section ID (full or prefix)
        id: String,
    },
}

#[derive(Subcommand)]
enum PhotoCommands {
    /// List photos in the draft
    #[command(alias = "ls")]
    List,
    /// Add a photo to the end of a sub-section
    Add {
        /// Sub-section ID (full or prefix)
        sub_section_id: String,
        /// Image file to embed, or an image URL
        source: String,
        #[arg(short, long)]
        caption: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Change a photo
    Update {
        /// Photo ID (full or prefix)
        id: String,
        #[arg(short, long)]
        caption: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// Replacement image file or URL
        #[arg(long)]
        image: Option<String>,
    },
    /// Remove a photo
    #[command(alias = "rm")]
    Remove {
        /// Photo ID (full or prefix)
        id: String,
    },
    /// Move a photo to another sub-section and/or position
    #[command(alias = "mv")]
    Move {
        /// Photo ID (full or prefix)
        id: String,
        /// Target sub-section ID (full or prefix)
        #[arg(long)]
        to: Option<String>,
        /// Zero-based position within the sub-section
        #[arg(long)]
        position: Option<usize>,
    },
}

#[derive(Subcommand)]
enum TextCommands {
    /// Set a text field by its JSON key (e.g. heroTitle)
    Set { key: String, value: String },
}

#[derive(Subcommand)]
enum LocationCommands {
    /// Change location fields
    Set {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Image file or URL
        #[arg(long)]
        image: Option<String>,
    },
}

#[derive(Subcommand)]
enum BrandingCommands {
    /// Change the logo and/or favicon (empty value clears)
    Set {
        /// Logo image file or URL
        #[arg(long)]
        logo: Option<String>,
        /// Favicon image file or URL
        #[arg(long)]
        favicon: Option<String>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, published_url, published_path, max_document_bytes, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands work even when the configured data dir is broken
    if let Commands::Config { command } = &cli.command {
        return match command.clone() {
            Some(ConfigCommands::Show) | None => commands::config::show(config_path, &output),
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, config_path, &output)
            }
        };
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    init_logging(&config, cli.verbose);

    match cli.command {
        Commands::Status => commands::status::show(&config, &output).await,
        Commands::Show { preview, public } => {
            commands::content::show(&config, preview, public, &output).await
        }
        Commands::Export { output: path } => {
            commands::transfer::export(&config, path, &output).await
        }
        Commands::Import { file } => commands::transfer::import(&config, file, &output).await,
        Commands::Publish => commands::content::publish(&config, &output).await,
        Commands::Discard { yes } => commands::content::discard(&config, yes, &output).await,
        Commands::Faq { command } => handle_faq_command(command, &config, &output).await,
        Commands::Section { command } => handle_section_command(command, &config, &output).await,
        Commands::SubSection { command } => {
            handle_sub_section_command(command, &config, &output).await
        }
        Commands::Photo { command } => handle_photo_command(command, &config, &output).await,
        Commands::Text {
            command: TextCommands::Set { key, value },
        } => commands::text::set_text(&config, key, value, &output).await,
        Commands::Location {
            command:
                LocationCommands::Set {
                    title,
                    description,
                    image,
                },
        } => commands::text::set_location(&config, title, description, image, &output).await,
        Commands::Branding {
            command: BrandingCommands::Set { logo, favicon },
        } => commands::text::set_branding(&config, logo, favicon, &output).await,
        Commands::Config { .. } => Ok(()), // Handled above
    }
}

async fn handle_faq_command(command: FaqCommands, config: &Config, output: &Output) -> Result<()> {
    match command {
        FaqCommands::List => commands::faq::list(config, output).await,
        FaqCommands::Add { question, answer } => {
            commands::faq::add(config, question, answer, output).await
        }
        FaqCommands::Update {
            id,
            question,
            answer,
        } => commands::faq::update(config, id, question, answer, output).await,
        FaqCommands::Remove { id } => commands::faq::remove(config, id, output).await,
    }
}

async fn handle_section_command(
    command: SectionCommands,
    config: &Config,
    output: &Output,
) -> Result<()> {
    match command {
        SectionCommands::Add { title } => commands::gallery::add_section(config, title, output).await,
        SectionCommands::Rename { id, title } => {
            commands::gallery::rename_section(config, id, title, output).await
        }
        SectionCommands::Remove { id } => commands::gallery::remove_section(config, id, output).await,
    }
}

async fn handle_sub_section_command(
    command: SubSectionCommands,
    config: &Config,
    output: &Output,
) -> Result<()> {
    match command {
        SubSectionCommands::Add { section_id, title } => {
            commands::gallery::add_sub_section(config, section_id, title, output).await
        }
        SubSectionCommands::Remove { id } => {
            commands::gallery::remove_sub_section(config, id, output).await
        }
    }
}

async fn handle_photo_command(command: PhotoCommands, config: &Config, output: &Output) -> Result<()> {
    match command {
        PhotoCommands::List => commands::gallery::list_photos(config, output).await,
        PhotoCommands::Add {
            sub_section_id,
            source,
            caption,
            description,
        } => {
            commands::gallery::add_photo(config, sub_section_id, source, caption, description, output)
                .await
        }
        PhotoCommands::Update {
            id,
            caption,
            description,
            image,
        } => commands::gallery::update_photo(config, id, caption, description, image, output).await,
        PhotoCommands::Remove { id } => commands::gallery::remove_photo(config, id, output).await,
        PhotoCommands::Move { id, to, position } => {
            commands::gallery::move_photo(config, id, to, position, output).await
        }
    }
}

/// Initialize logging
///
/// `RUST_LOG` wins when set; otherwise the level comes from `-v`. Logs go to
/// `config.log_file` when configured, else stderr.
fn init_logging(config: &Config, verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("villa_core={},villa_cli={}", level, level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    // Ignore the error if a subscriber is already installed
    match &config.log_file {
        Some(path) => match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                let _ = builder.with_ansi(false).with_writer(file).try_init();
            }
            Err(e) => {
                eprintln!("Warning: Could not open log file {:?}: {}", path, e);
                let _ = builder.with_writer(std::io::stderr).try_init();
            }
        },
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }
}
