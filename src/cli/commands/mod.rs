//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod doctor;
mod locate;
mod transcript;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use doctor::run_doctor;
pub use locate::run_locate;
pub use transcript::run_transcript;
