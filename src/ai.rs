// Talking to the chat-completion provider

pub mod client;
pub mod common;
pub mod config;
pub mod generator;
pub mod prompts;

pub use client::ChatClient;
pub use config::{AiConfig, ResponseFormat};
pub use generator::{fallback_outcome, GenerationOutcome, RecipeGenerator};
