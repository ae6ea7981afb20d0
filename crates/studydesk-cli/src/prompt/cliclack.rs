use anyhow::Result;
use cliclack::{input, select, spinner};
use console::style;
use studydesk::tools::tutor::{ChatEntry, Sender};

use super::{Input, InputType, Prompt, Theme};
use crate::render::print_markdown;

pub struct CliclackPrompt {
    spinner: Option<cliclack::ProgressBar>,
    input_mode: InputMode,
    theme: Theme,
}

enum InputMode {
    Singleline,
    Multiline,
}

impl CliclackPrompt {
    pub fn new() -> Self {
        CliclackPrompt {
            spinner: None,
            input_mode: InputMode::Singleline,
            theme: Theme::Dark,
        }
    }

    fn pick_topic(&self, topics: &[String]) -> Result<Input> {
        if topics.is_empty() {
            println!("No topics marked for review yet. Mark flashcards first.");
            return Ok(Input {
                input_type: InputType::AskAgain,
                content: None,
            });
        }
        let mut picker = select("Topics to review");
        for topic in topics {
            picker = picker.item(topic.clone(), topic, "");
        }
        let topic = picker.interact()?;
        Ok(Input {
            input_type: InputType::Topic,
            content: Some(topic),
        })
    }
}

fn control(input_type: InputType) -> Result<Input> {
    Ok(Input {
        input_type,
        content: None,
    })
}

impl Prompt for CliclackPrompt {
    fn render(&mut self, entry: &ChatEntry) {
        match entry.sender {
            Sender::User => println!("{} {}", style("You:").bold().cyan(), entry.text),
            Sender::Assistant => {
                println!("{}", style("Tutor:").bold().green());
                if let Err(e) = print_markdown(&entry.text, self.theme) {
                    tracing::debug!(error = %e, "markdown rendering failed, printing plain text");
                    println!("{}", entry.text);
                }
            }
        }
        println!();
    }

    fn show_busy(&mut self) {
        let spin = spinner();
        spin.start("Thinking...");
        self.spinner = Some(spin);
    }

    fn hide_busy(&mut self) {
        if let Some(spin) = self.spinner.take() {
            spin.stop("");
        }
    }

    fn get_input(&mut self, topics: &[String]) -> Result<Input> {
        let label = if topics.is_empty() {
            "Ask the tutor:  [Help: /?]".to_string()
        } else {
            format!("Ask the tutor:  [{} topics to review: /r]  [Help: /?]", topics.len())
        };
        let mut input = input(label).placeholder("");
        if let InputMode::Multiline = self.input_mode {
            input = input.multiline();
        }
        let message_text: String = input.interact()?;
        let message_text = message_text.trim();

        if message_text.eq_ignore_ascii_case("/exit") || message_text.eq_ignore_ascii_case("/quit")
        {
            control(InputType::Exit)
        } else if message_text.eq_ignore_ascii_case("/r") {
            self.pick_topic(topics)
        } else if message_text.eq_ignore_ascii_case("/new") {
            control(InputType::Reset)
        } else if message_text.eq_ignore_ascii_case("/m") {
            self.input_mode = InputMode::Multiline;
            control(InputType::AskAgain)
        } else if message_text.eq_ignore_ascii_case("/s") {
            self.input_mode = InputMode::Singleline;
            control(InputType::AskAgain)
        } else if message_text.eq_ignore_ascii_case("/t") {
            self.theme = match self.theme {
                Theme::Light => {
                    println!("Switching to Dark theme");
                    Theme::Dark
                }
                Theme::Dark => {
                    println!("Switching to Light theme");
                    Theme::Light
                }
            };
            control(InputType::AskAgain)
        } else if message_text.eq_ignore_ascii_case("/?") {
            println!("Commands:");
            println!("/exit - Leave the chat");
            println!("/r - Ask about a topic marked for review");
            println!("/new - Start a new conversation");
            println!("/m - Switch to multiline input mode");
            println!("/s - Switch to singleline input mode");
            println!("/t - Toggle Light/Dark theme");
            println!("/? - Display this help message");
            control(InputType::AskAgain)
        } else {
            Ok(Input {
                input_type: InputType::Message,
                content: Some(message_text.to_string()),
            })
        }
    }

    fn close(&self) {
        // No cleanup required
    }
}
