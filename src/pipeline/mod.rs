// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: pipeline orchestration

mod orchestrator;
pub mod rag;

pub use orchestrator::{
    MATCH_LABEL, NO_PDFS_MESSAGE, PrintOptions, RunOutcome, ScoutPipeline, print_results,
};
pub use rag::{RagAnswer, RagSource, print_answer};
