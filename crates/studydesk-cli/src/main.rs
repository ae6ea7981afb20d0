use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use studydesk::configuration::Settings;
use studydesk::providers::factory::get_provider;
use studydesk::tools::ProviderHandle;

mod commands;
mod prompt;
mod render;
mod session;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Turn notes, a lecture transcript or a file into concise study notes
    Summarize {
        /// Text to summarize
        text: Option<String>,

        /// File to summarize instead of text (image, pdf or plain text)
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,
    },

    /// Generate flashcards from study material
    Flashcards {
        /// Text to build cards from
        text: Option<String>,

        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Card numbers to mark for review, skipping the interactive picker
        #[arg(short, long, value_delimiter = ',')]
        review: Vec<usize>,
    },

    /// Build a study schedule leading up to an exam
    Plan {
        /// Subjects or topics to cover
        #[arg(short, long)]
        subjects: Option<String>,

        #[arg(short, long)]
        exam_date: Option<String>,

        /// Hours available for study each day
        #[arg(long)]
        hours: Option<String>,
    },

    /// Talk a concept through with the tutor
    Chat,

    /// Open the interactive desk with every tool (default)
    Desk,
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

fn load_provider() -> ProviderHandle {
    let provider = Settings::new()
        .map_err(anyhow::Error::from)
        .and_then(|settings| get_provider(settings.provider.into_config()));
    ProviderHandle::from(provider)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let provider = load_provider();

    match cli.command {
        Some(Command::Summarize { text, file }) => {
            commands::summarize::execute(provider, text, file).await
        }
        Some(Command::Flashcards { text, file, review }) => {
            commands::flashcards::execute(provider, text, file, review).await
        }
        Some(Command::Plan {
            subjects,
            exam_date,
            hours,
        }) => commands::plan::execute(provider, subjects, exam_date, hours).await,
        Some(Command::Chat) => commands::chat::execute(provider).await,
        Some(Command::Desk) | None => commands::desk::execute(provider).await,
    }
}
