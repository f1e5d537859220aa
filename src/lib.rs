// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod database;
pub mod error;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod scanner;
pub mod utils;

pub use config::{
    Config, DatabaseConfig, EmbeddingConfig, LlmConfig, QueryConfig, ScannerConfig,
};
pub use database::{ChromaClient, EmbeddingClient};
pub use error::{Result, ScoutError};
pub use llm::ChatClient;
pub use models::{Collection, QueryMatch, QueryRequest, QueryResponse};
pub use pipeline::{
    PrintOptions, RagAnswer, RagSource, RunOutcome, ScoutPipeline, print_answer, print_results,
};
pub use scanner::{PdfScanner, ScannedPdf};
pub use utils::Validator;
