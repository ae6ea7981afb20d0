use anyhow::Result;
use cliclack::{input, select};
use std::path::PathBuf;

use studydesk::encoder::Attachment;
use studydesk::errors::ToolResult;
use studydesk::tools::summarizer::Summarizer;
use studydesk::tools::ProviderHandle;

use crate::prompt::Theme;
use crate::render::{busy, print_markdown, print_tool_error};

pub async fn execute(
    provider: ProviderHandle,
    text: Option<String>,
    file: Option<PathBuf>,
) -> Result<()> {
    let mut summarizer = Summarizer::new(provider);
    if let Some(text) = text {
        summarizer.set_text(text);
    }
    if let Some(file) = file {
        summarizer.set_attachment(Attachment::from_path(file));
    }
    run(&mut summarizer).await
}

/// Where study material comes from when none was given up front
#[derive(Clone, PartialEq, Eq)]
pub enum Source {
    Text,
    File,
}

/// Ask for material. Returns the text or the attachment, whichever was chosen.
pub fn ask_for_source(what: &str) -> Result<(Option<String>, Option<Attachment>)> {
    let source = select(format!("What should I {}?", what))
        .item(Source::Text, "Paste text", "")
        .item(Source::File, "Upload a file", "image, pdf or .txt")
        .interact()?;
    match source {
        Source::Text => {
            let text: String = input("Text").placeholder("").multiline().interact()?;
            Ok((Some(text), None))
        }
        Source::File => {
            let path: String = input("Path to file").placeholder("notes.pdf").interact()?;
            Ok((None, Some(Attachment::from_path(path.trim()))))
        }
    }
}

/// Ask for material unless some is already staged
pub fn gather(summarizer: &mut Summarizer) -> Result<()> {
    if summarizer.input().is_empty() {
        match ask_for_source("summarize")? {
            (Some(text), _) => summarizer.set_text(text),
            (_, Some(attachment)) => summarizer.set_attachment(attachment),
            _ => {}
        }
    }
    Ok(())
}

pub fn show(outcome: &ToolResult<String>) -> Result<()> {
    match outcome {
        Ok(summary) => print_markdown(summary, Theme::Dark),
        Err(e) => print_tool_error(e),
    }
}

pub async fn run(summarizer: &mut Summarizer) -> Result<()> {
    gather(summarizer)?;
    let outcome = busy("Summarizing...", summarizer.submit()).await;
    show(&outcome)
}
