//! These models represent the objects passed between the study tools and a provider
//!
//! Each provider speaks its own wire format (gemini `contents`/`parts`, openai chat
//! messages). We always immediately convert those into the internal structs using the
//! helpers in `providers::utils`, so the tools never see a provider specific shape.
pub mod content;
pub mod message;
pub mod role;
