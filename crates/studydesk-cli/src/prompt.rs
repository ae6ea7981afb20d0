use anyhow::Result;
use studydesk::tools::tutor::ChatEntry;

pub mod cliclack;

pub trait Prompt {
    fn render(&mut self, entry: &ChatEntry);
    /// Read the next action. `topics` are the review topics on offer.
    fn get_input(&mut self, topics: &[String]) -> Result<Input>;
    fn show_busy(&mut self);
    fn hide_busy(&mut self);
    fn close(&self);
    fn tutor_ready(&self) {
        println!("\n");
        println!("The tutor is ready. Ask about anything you're stuck on.");
        println!("\n");
    }
}

pub struct Input {
    pub input_type: InputType,
    pub content: Option<String>, // Message text or the picked topic
}

pub enum InputType {
    AskAgain, // Ask the user for input again. Control flow command.
    Message,  // User sent a message
    Topic,    // User picked a review topic
    Reset,    // Start the conversation over
    Exit,     // User wants to leave the chat
}

#[derive(Clone, Copy)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn bat_theme(&self) -> &'static str {
        match self {
            Theme::Light => "GitHub",
            Theme::Dark => "zenburn",
        }
    }
}
