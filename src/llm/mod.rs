// file: src/llm/mod.rs
// description: answer generation module exports
// reference: internal module structure

pub mod chat;

pub use chat::{ChatClient, extract_answer};
