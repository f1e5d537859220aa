// file: src/database/mod.rs
// description: vector database operations module exports
// reference: internal module structure

pub mod client;
pub mod embeddings;

pub use client::ChromaClient;
pub use embeddings::EmbeddingClient;
