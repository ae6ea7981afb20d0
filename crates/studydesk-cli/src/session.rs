use anyhow::Result;

use crate::prompt::{InputType, Prompt};
use studydesk::errors::ToolError;
use studydesk::tools::tutor::TutorController;

/// Drives the tutor chat from a prompt until the user leaves
pub struct Session<'a> {
    tutor: &'a mut TutorController,
    prompt: Box<dyn Prompt + 'a>,
}

impl<'a> Session<'a> {
    pub fn new(tutor: &'a mut TutorController, prompt: Box<impl Prompt + 'a>) -> Self {
        Session { tutor, prompt }
    }

    pub async fn start(&mut self) -> Result<()> {
        self.tutor.activate();
        if let Some(error) = self.tutor.init_error() {
            crate::render::print_tool_error(&ToolError::Initialization(error.to_string()))?;
            self.prompt.close();
            return Ok(());
        }

        for entry in self.tutor.log() {
            self.prompt.render(entry);
        }
        self.prompt.tutor_ready();

        loop {
            let input = self.prompt.get_input(&self.tutor.review_topics())?;
            let content = input.content.unwrap_or_default();
            let logged = self.tutor.log().len();

            let reply = match input.input_type {
                InputType::Message => {
                    self.prompt.show_busy();
                    let reply = self.tutor.send(&content).await;
                    self.prompt.hide_busy();
                    reply
                }
                InputType::Topic => {
                    self.prompt.show_busy();
                    let reply = self.tutor.ask_about_topic(&content).await;
                    self.prompt.hide_busy();
                    reply
                }
                InputType::Reset => {
                    self.tutor.reset()?;
                    continue;
                }
                InputType::AskAgain => continue,
                InputType::Exit => break,
            };

            // A typed message is already on screen
            let skip = match input.input_type {
                InputType::Message => logged + 1,
                _ => logged,
            };
            for entry in self.tutor.log().iter().skip(skip) {
                self.prompt.render(entry);
            }
            if let Err(e) = reply {
                tracing::debug!(error = %e, "tutor turn failed");
            }
        }

        self.prompt.close();
        Ok(())
    }
}
