use std::future::Future;

use anyhow::{anyhow, Result};
use bat::WrappingMode;
use cliclack::spinner;
use console::style;
use studydesk::errors::ToolError;

use crate::prompt::Theme;

pub fn print_markdown(content: &str, theme: Theme) -> Result<()> {
    bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()))
        .theme(theme.bat_theme())
        .language("Markdown")
        .wrapping_mode(WrappingMode::Character)
        .print()
        .map_err(|e| anyhow!("failed to render output: {}", e))?;
    println!();
    Ok(())
}

/// Show a tool failure without ending the program
pub fn print_tool_error(error: &ToolError) -> Result<()> {
    cliclack::log::error(style(error.to_string()).red())?;
    Ok(())
}

/// Run `work` behind a spinner
pub async fn busy<F: Future>(message: &str, work: F) -> F::Output {
    let spin = spinner();
    spin.start(message);
    let output = work.await;
    spin.stop("");
    output
}
