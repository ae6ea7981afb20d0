pub mod configuration;
pub mod desk;
pub mod encoder;
pub mod errors;
pub mod models;
pub mod prompt_template;
pub mod providers;
pub mod review;
pub mod session;
pub mod state;
pub mod tools;
