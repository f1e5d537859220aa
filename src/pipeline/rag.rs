// file: src/pipeline/rag.rs
// description: retrieval augmented answers: context assembly, prompt, sources and printing
// reference: retrieved chunks become the only context the model may answer from

use crate::models::QueryResponse;
use std::io::Write;
use std::time::Duration;

pub const PREVIEW_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct RagSource {
    pub id: String,
    pub source: Option<String>,
    pub chunk_index: Option<i64>,
    pub preview: String,
}

#[derive(Debug, Clone)]
pub struct RagAnswer {
    pub answer: String,
    pub sources: Vec<RagSource>,
    pub latency: Duration,
}

pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a helpful assistant.\n\
         \n\
         Answer the question using ONLY the provided context.\n\
         If the answer is not in the context, say so clearly.\n\
         Do not mention page numbers.\n\
         Write a complete and well-structured answer.\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question:\n\
         {question}\n\
         \n\
         Answer:"
    )
}

/// Joins the first group's documents with blank lines, cut to `max_chars` characters.
pub fn build_context(results: &QueryResponse, max_chars: usize) -> String {
    let joined = results
        .matches(0)
        .into_iter()
        .filter_map(|m| m.document)
        .collect::<Vec<_>>()
        .join("\n\n");

    match joined.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => joined[..byte_idx].to_string(),
        None => joined,
    }
}

pub fn extract_sources(results: &QueryResponse) -> Vec<RagSource> {
    results
        .matches(0)
        .into_iter()
        .filter(|m| m.document.is_some())
        .map(|m| RagSource {
            source: m.source().map(str::to_string),
            chunk_index: m.chunk(),
            preview: m.snippet(Some(PREVIEW_CHARS)),
            id: m.id,
        })
        .collect()
}

pub fn print_answer<W: Write>(answer: &RagAnswer, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "\nAI Answer:\n")?;
    writeln!(out, "{}", answer.answer)?;

    if !answer.sources.is_empty() {
        writeln!(out, "\nSources:")?;
        for (idx, source) in answer.sources.iter().enumerate() {
            let chunk = source
                .chunk_index
                .map(|c| c.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            writeln!(
                out,
                "{}. {} (chunk {})",
                idx + 1,
                source.source.as_deref().unwrap_or("Unknown source"),
                chunk
            )?;
        }
    }

    writeln!(out, "\nLatency: {:.2} seconds", answer.latency.as_secs_f64())
}
