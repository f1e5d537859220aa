// file: src/pipeline/orchestrator.rs
// description: coordinates the downloads scan and the similarity query, printing both
// reference: sequential scan then connect, fetch collection, query, print

use crate::config::Config;
use crate::database::{ChromaClient, EmbeddingClient};
use crate::error::Result;
use crate::llm::{ChatClient, extract_answer};
use crate::models::{QueryRequest, QueryResponse};
use crate::pipeline::rag::{RagAnswer, build_context, build_prompt, extract_sources};
use crate::scanner::{PdfScanner, ScannedPdf};
use crate::utils::logging::format_step;
use std::io::Write;
use std::time::Instant;
use tracing::{info, warn};

pub const NO_PDFS_MESSAGE: &str = "No PDFs found in Downloads folder.";
pub const MATCH_LABEL: &str = "Found relevant concept in:";

const QUERY_STEPS: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct PrintOptions {
    pub max_chars: Option<usize>,
    /// Rank, distance and source path alongside each document
    pub details: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The scan found nothing and the query stage was skipped.
    NoPdfs,
    Completed { pdfs: usize, documents: usize },
}

pub struct ScoutPipeline {
    config: Config,
    show_progress: bool,
}

impl ScoutPipeline {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Scan, then query. An empty scan ends the run successfully before any network call.
    pub async fn run<W: Write>(
        &self,
        query_text: &str,
        options: &PrintOptions,
        out: &mut W,
    ) -> Result<RunOutcome> {
        let pdfs = self.scan(out)?;
        if pdfs.is_empty() {
            return Ok(RunOutcome::NoPdfs);
        }

        let documents = self.query(query_text, options, out).await?;

        Ok(RunOutcome::Completed {
            pdfs: pdfs.len(),
            documents,
        })
    }

    pub fn scan<W: Write>(&self, out: &mut W) -> Result<Vec<ScannedPdf>> {
        let root = self.config.scanner.resolve_root()?;
        writeln!(out, "Scanning PDFs in: {}", root.display())?;

        let scanner =
            PdfScanner::new(self.config.scanner.clone()).with_progress(self.show_progress);
        let pdfs = scanner.scan(&root)?;

        if pdfs.is_empty() {
            writeln!(out, "{}", NO_PDFS_MESSAGE)?;
            return Ok(pdfs);
        }

        writeln!(out, "Found PDFs:")?;
        for pdf in &pdfs {
            writeln!(out, "- {}", pdf.path.display())?;
        }

        Ok(pdfs)
    }

    /// Connect, fetch the collection, run the query and print every returned document.
    /// Returns the number of documents printed.
    pub async fn query<W: Write>(
        &self,
        query_text: &str,
        options: &PrintOptions,
        out: &mut W,
    ) -> Result<usize> {
        let results = self
            .retrieve(query_text, self.config.query.n_results)
            .await?;

        print_results(&results, options, out)
    }

    /// Retrieves the closest chunks for `question` and asks the chat model to answer
    /// from them alone.
    pub async fn ask(&self, question: &str) -> Result<RagAnswer> {
        let start_time = Instant::now();

        let results = self.retrieve(question, self.config.llm.top_k).await?;
        let context = build_context(&results, self.config.llm.max_context_chars);
        let prompt = build_prompt(&context, question);

        let chat = ChatClient::new(self.config.llm.clone());
        info!("Generating answer with {}", chat.model());
        let completion = chat.complete(&prompt).await?;

        Ok(RagAnswer {
            answer: extract_answer(&completion),
            sources: extract_sources(&results),
            latency: start_time.elapsed(),
        })
    }

    /// Connect, fetch the collection, embed the text and run the nearest-neighbour query.
    pub async fn retrieve(&self, query_text: &str, n_results: usize) -> Result<QueryResponse> {
        // checked before any network call so a missing endpoint never reaches Chroma
        let embedder = EmbeddingClient::from_config(&self.config.embedding)?;
        let filter = self.config.query.parsed_where_filter()?;

        info!("{}", format_step(1, QUERY_STEPS, "Connecting to Chroma"));
        let client = ChromaClient::connect(self.config.database.clone()).await?;

        info!("{}", format_step(2, QUERY_STEPS, "Fetching collection"));
        let collection = client.get_collection(client.collection_name()).await?;

        info!(
            "{}",
            format_step(3, QUERY_STEPS, &format!("Querying for \"{}\"", query_text))
        );
        info!("Embedding query with {}", embedder.model());
        let embedding = embedder.generate_embedding(query_text).await?;
        let request = QueryRequest::embedding(embedding, n_results).with_where(filter);
        let results = client.query(&collection, &request).await?;

        if results.is_empty() {
            warn!("Query returned no documents");
        }

        Ok(results)
    }
}

pub fn print_results<W: Write>(
    results: &QueryResponse,
    options: &PrintOptions,
    out: &mut W,
) -> Result<usize> {
    let mut printed = 0;

    for group in results.groups() {
        for m in group {
            if m.document.is_none() {
                continue;
            }

            if options.details {
                writeln!(out, "{}", m.format_summary(options.max_chars))?;
                writeln!(out, "{}", "-".repeat(50))?;
            } else {
                writeln!(out, "{} {}", MATCH_LABEL, m.snippet(options.max_chars))?;
            }
            printed += 1;
        }
    }

    Ok(printed)
}
