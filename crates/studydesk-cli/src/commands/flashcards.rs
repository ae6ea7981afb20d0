use anyhow::Result;
use cliclack::{confirm, multiselect, select};
use console::style;
use std::path::PathBuf;

use studydesk::desk::{StudyDesk, View};
use studydesk::encoder::Attachment;
use studydesk::tools::flashcards::FlashcardGenerator;
use studydesk::tools::ProviderHandle;

use super::summarize::ask_for_source;
use crate::render::{busy, print_tool_error};

pub async fn execute(
    provider: ProviderHandle,
    text: Option<String>,
    file: Option<PathBuf>,
    review: Vec<usize>,
) -> Result<()> {
    let mut desk = StudyDesk::new(provider);
    desk.switch_to(View::Flashcards);
    if let Some(text) = text {
        desk.flashcards().set_text(text);
    }
    if let Some(file) = file {
        desk.flashcards().set_attachment(Attachment::from_path(file));
    }

    if review.is_empty() {
        run(desk.flashcards()).await?;
    } else {
        generate(desk.flashcards()).await?;
        // Card numbers on screen start at 1
        for number in review {
            if let Some(index) = number.checked_sub(1) {
                desk.flashcards().toggle_selection(index);
            }
        }
        desk.flashcards().add_selected_to_review();
    }

    let topics = desk.review_topics();
    if !topics.is_empty() && confirm("Ask the tutor about the marked cards now?").interact()? {
        desk.switch_to(View::Doubts);
        super::chat::run(desk.tutor()).await?;
    }
    Ok(())
}

fn print_cards(generator: &FlashcardGenerator) {
    for (index, card) in generator.cards().iter().enumerate() {
        let marker = if generator.is_selected(index) { "*" } else { " " };
        println!(
            "{} {} {}",
            style(marker).yellow(),
            style(format!("{:>2}.", index + 1)).dim(),
            style(&card.question).bold()
        );
        if generator.flipped() == Some(index) {
            println!("      {}", style(&card.answer).green());
        }
    }
    println!();
}

/// Generate cards, printing them or the failure. Returns whether any came back.
async fn generate(generator: &mut FlashcardGenerator) -> Result<bool> {
    if generator.input().is_empty() {
        match ask_for_source("make flashcards from")? {
            (Some(text), _) => generator.set_text(text),
            (_, Some(attachment)) => generator.set_attachment(attachment),
            _ => {}
        }
    }

    match busy("Generating flashcards...", generator.submit()).await {
        Ok(_) => {
            print_cards(generator);
            Ok(true)
        }
        Err(e) => {
            print_tool_error(&e)?;
            Ok(false)
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
enum Action {
    Flip(usize),
    Review,
    Done,
}

/// Generate, let the user flip through the cards, then mark some for review
pub async fn run(generator: &mut FlashcardGenerator) -> Result<()> {
    if !generate(generator).await? {
        return Ok(());
    }

    loop {
        let mut picker = select("Flip a card to see its answer");
        for (index, card) in generator.cards().iter().enumerate() {
            picker = picker.item(Action::Flip(index), format!("{}. {}", index + 1, card.question), "");
        }
        let action = picker
            .item(Action::Review, "Mark cards for review", "")
            .item(Action::Done, "Done", "")
            .interact()?;

        match action {
            Action::Flip(index) => {
                generator.flip(index);
                print_cards(generator);
            }
            Action::Review => {
                let mut picker = multiselect("Cards to review with the tutor").required(false);
                for (index, card) in generator.cards().iter().enumerate() {
                    picker = picker.item(index, &card.question, "");
                }
                for index in picker.interact()? {
                    generator.toggle_selection(index);
                }
                let added = generator.add_selected_to_review();
                if !added.is_empty() {
                    cliclack::log::success(format!("Marked {} for review", added.len()))?;
                }
            }
            Action::Done => return Ok(()),
        }
    }
}
