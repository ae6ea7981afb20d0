//! The shell that ties the four tools together.
//!
//! `StudyDesk` owns one controller per tool plus the review board they share,
//! and remembers which view is in front. Nothing is cancelled on a view switch.
use serde::Serialize;
use strum_macros::{Display, EnumIter};

use crate::review::ReviewBoard;
use crate::tools::flashcards::FlashcardGenerator;
use crate::tools::planner::StudyPlanner;
use crate::tools::summarizer::Summarizer;
use crate::tools::tutor::TutorController;
use crate::tools::ProviderHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter, Serialize)]
pub enum View {
    #[default]
    Dashboard,
    Summarizer,
    Flashcards,
    Planner,
    Doubts,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Summarizer => "Summarizer",
            View::Flashcards => "Flashcard Generator",
            View::Planner => "Study Planner",
            View::Doubts => "Doubt Solver",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            View::Dashboard => "Pick a tool to get started.",
            View::Summarizer => {
                "Convert long lectures, PDFs, and notes into concise summaries instantly."
            }
            View::Flashcards => {
                "Automatically create flashcards from your study materials to ace your exams."
            }
            View::Planner => "Get a personalized study schedule based on your deadlines and subjects.",
            View::Doubts => "Get step-by-step explanations for any concept you're struggling with.",
        }
    }

    /// Every view except the dashboard, in dashboard order
    pub fn tools() -> [View; 4] {
        [View::Summarizer, View::Flashcards, View::Planner, View::Doubts]
    }
}

/// A dashboard card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolCard {
    pub view: View,
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug)]
pub struct StudyDesk {
    board: ReviewBoard,
    summarizer: Summarizer,
    flashcards: FlashcardGenerator,
    planner: StudyPlanner,
    tutor: TutorController,
    active: View,
}

impl StudyDesk {
    pub fn new(provider: ProviderHandle) -> Self {
        let board = ReviewBoard::new();
        Self {
            summarizer: Summarizer::new(provider.clone()),
            flashcards: FlashcardGenerator::new(provider.clone(), board.writer()),
            planner: StudyPlanner::new(provider.clone()),
            tutor: TutorController::new(provider, board.reader()),
            board,
            active: View::Dashboard,
        }
    }

    pub fn active(&self) -> View {
        self.active
    }

    pub fn switch_to(&mut self, view: View) {
        tracing::debug!(from = %self.active, to = %view, "switching view");
        if view == View::Doubts {
            self.tutor.activate();
        }
        self.active = view;
    }

    pub fn dashboard(&self) -> Vec<ToolCard> {
        View::tools()
            .into_iter()
            .map(|view| ToolCard {
                view,
                title: view.title(),
                description: view.description(),
            })
            .collect()
    }

    pub fn review_topics(&self) -> Vec<String> {
        self.board.snapshot()
    }

    pub fn summarizer(&mut self) -> &mut Summarizer {
        &mut self.summarizer
    }

    pub fn flashcards(&mut self) -> &mut FlashcardGenerator {
        &mut self.flashcards
    }

    pub fn planner(&mut self) -> &mut StudyPlanner {
        &mut self.planner
    }

    pub fn tutor(&mut self) -> &mut TutorController {
        &mut self.tutor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockProvider;
    use std::sync::Arc;
    use strum::IntoEnumIterator;

    #[test]
    fn test_dashboard_lists_the_four_tools() {
        let desk = StudyDesk::new(ProviderHandle::unavailable("no key"));
        let titles: Vec<_> = desk.dashboard().iter().map(|card| card.title).collect();
        assert_eq!(
            titles,
            vec!["Summarizer", "Flashcard Generator", "Study Planner", "Doubt Solver"]
        );
        assert_eq!(desk.active(), View::Dashboard);
        assert_eq!(View::iter().count(), 5);
    }

    #[test]
    fn test_entering_doubts_activates_the_chat() {
        let mock = MockProvider::default();
        let mut desk = StudyDesk::new(ProviderHandle::ready(Arc::new(mock)));
        assert!(!desk.tutor().is_active());

        desk.switch_to(View::Planner);
        assert!(!desk.tutor().is_active());
        desk.switch_to(View::Doubts);
        assert!(desk.tutor().is_active());
        assert_eq!(desk.active(), View::Doubts);
    }

    #[test]
    fn test_missing_provider_surfaces_on_the_chat_view() {
        let mut desk = StudyDesk::new(ProviderHandle::unavailable("no key"));
        desk.switch_to(View::Doubts);
        assert!(desk.tutor().init_error().is_some());
    }

    #[tokio::test]
    async fn test_flashcard_selection_reaches_the_tutor() {
        let mock = MockProvider::with_texts(vec![
            r#"[{"question":"What is a limit?","answer":"A value approached."}]"#,
        ]);
        let mut desk = StudyDesk::new(ProviderHandle::ready(Arc::new(mock)));

        desk.switch_to(View::Flashcards);
        desk.flashcards().set_text("Limits and continuity");
        desk.flashcards().submit().await.unwrap();
        desk.flashcards().toggle_selection(0);
        desk.flashcards().add_selected_to_review();

        desk.switch_to(View::Doubts);
        assert_eq!(desk.tutor().review_topics(), vec!["What is a limit?"]);
        assert_eq!(desk.review_topics(), vec!["What is a limit?"]);
    }
}
