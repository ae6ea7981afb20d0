pub mod chat;
pub mod desk;
pub mod flashcards;
pub mod plan;
pub mod summarize;
