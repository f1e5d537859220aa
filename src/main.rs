// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use pdf_scout::utils::logging::{format_info, format_success};
use pdf_scout::{ChromaClient, Config, PrintOptions, RunOutcome, ScoutPipeline, print_answer};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "pdf_scout")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(
    about = "Find PDFs in your Downloads folder and query a Chroma collection for related documents",
    long_about = None
)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = pdf_scout::config::DEFAULT_CONFIG_PATH
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    /// Directory to scan instead of ~/Downloads
    #[arg(long, value_name = "DIR", global = true)]
    root: Option<PathBuf>,

    /// Chroma base URL
    #[arg(long, value_name = "URL", global = true, env = "CHROMA_URL")]
    url: Option<String>,

    #[arg(long, value_name = "NAME", global = true)]
    collection: Option<String>,

    #[arg(short = 'n', long, value_name = "NUM", global = true)]
    n_results: Option<usize>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan for PDFs, then query the collection (default)
    Run {
        /// Query text, defaults to the configured query
        query: Option<String>,
    },

    /// Scan for PDFs only
    Scan,

    /// Query the collection only
    Query {
        /// Query text, defaults to the configured query
        query: Option<String>,

        /// Chroma metadata filter as JSON, e.g. '{"chunk": 0}'
        #[arg(long = "where", value_name = "JSON")]
        where_filter: Option<String>,

        #[arg(long, value_name = "NUM")]
        max_chars: Option<usize>,

        /// Print rank, distance and source for each result
        #[arg(long)]
        details: bool,
    },

    /// Answer a question from the closest chunks using a chat model
    Ask {
        /// Question text, defaults to the configured query
        question: Option<String>,

        /// Chunks handed to the model as context
        #[arg(long, value_name = "NUM")]
        top_k: Option<usize>,
    },

    /// Check the Chroma connection and the collection
    Verify,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if !cli.color {
        colored::control::set_override(false);
    }
    pdf_scout::utils::logging::init_logger(cli.color, cli.verbose);

    let config = load_config(&cli)?;

    match cli.command {
        None => cmd_run(&config, None, cli.color).await?,
        Some(Commands::Run { query }) => cmd_run(&config, query, cli.color).await?,
        Some(Commands::Scan) => cmd_scan(&config, cli.color)?,
        Some(Commands::Query {
            query,
            where_filter,
            max_chars,
            details,
        }) => {
            let mut config = config;
            if where_filter.is_some() {
                config.query.where_filter = where_filter;
            }
            if max_chars.is_some() {
                config.query.max_chars = max_chars;
            }
            config
                .validate()
                .context("Invalid query options")?;
            cmd_query(&config, query, details).await?
        }
        Some(Commands::Ask { question, top_k }) => {
            let mut config = config;
            if let Some(top_k) = top_k {
                config.llm.top_k = top_k;
            }
            config.validate().context("Invalid ask options")?;
            cmd_ask(&config, question).await?
        }
        Some(Commands::Verify) => cmd_verify(&config).await?,
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    info!("Loading configuration from: {}", cli.config.display());

    let mut config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::load(None).context("Failed to load configuration")?
    };

    if let Some(root) = &cli.root {
        config.scanner.root = Some(root.clone());
    }
    if let Some(url) = &cli.url {
        config.database.url = url.clone();
    }
    if let Some(collection) = &cli.collection {
        config.database.collection = collection.clone();
    }
    if let Some(n_results) = cli.n_results {
        config.query.n_results = n_results;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn show_progress(color: bool) -> bool {
    color && io::stderr().is_terminal()
}

async fn cmd_run(config: &Config, query: Option<String>, color: bool) -> Result<()> {
    let start_time = Instant::now();
    let query = query.unwrap_or_else(|| config.query.text.clone());

    let pipeline = ScoutPipeline::new(config.clone()).with_progress(show_progress(color));
    let options = PrintOptions {
        max_chars: config.query.max_chars,
        details: false,
    };

    let mut stdout = io::stdout().lock();
    let outcome = pipeline.run(&query, &options, &mut stdout).await?;

    match outcome {
        RunOutcome::NoPdfs => info!("Nothing to query"),
        RunOutcome::Completed { pdfs, documents } => info!(
            "Listed {} PDF(s), printed {} document(s) in {:.2}s",
            pdfs,
            documents,
            start_time.elapsed().as_secs_f64()
        ),
    }

    Ok(())
}

fn cmd_scan(config: &Config, color: bool) -> Result<()> {
    let pipeline = ScoutPipeline::new(config.clone()).with_progress(show_progress(color));
    let mut stdout = io::stdout().lock();

    let pdfs = pipeline
        .scan(&mut stdout)
        .context("Failed to scan directory")?;

    for pdf in &pdfs {
        debug!("{} ({} bytes)", pdf.relative_path, pdf.size);
    }

    let total_bytes: u64 = pdfs.iter().map(|pdf| pdf.size).sum();
    info!("{} PDF(s), {} bytes", pdfs.len(), total_bytes);

    if let Some(latest) = pdfs.iter().filter_map(|pdf| pdf.modified).max() {
        info!("Most recent download: {}", latest.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    Ok(())
}

async fn cmd_query(config: &Config, query: Option<String>, details: bool) -> Result<()> {
    let query = query.unwrap_or_else(|| config.query.text.clone());
    let pipeline = ScoutPipeline::new(config.clone());
    let options = PrintOptions {
        max_chars: config.query.max_chars,
        details,
    };

    let mut stdout = io::stdout().lock();
    let printed = pipeline
        .query(&query, &options, &mut stdout)
        .await
        .context("Similarity query failed")?;

    if printed == 0 {
        println!("No results found for query: \"{}\"", query);
    }

    Ok(())
}

async fn cmd_ask(config: &Config, question: Option<String>) -> Result<()> {
    let question = question.unwrap_or_else(|| config.query.text.clone());
    info!("Answering: {}", question);

    let pipeline = ScoutPipeline::new(config.clone());
    let answer = pipeline
        .ask(&question)
        .await
        .context("Failed to answer question")?;

    let mut stdout = io::stdout().lock();
    print_answer(&answer, &mut stdout)?;

    Ok(())
}

async fn cmd_verify(config: &Config) -> Result<()> {
    info!("Verifying Chroma connection");

    let client = ChromaClient::connect(config.database.clone())
        .await
        .context("Failed to connect to Chroma")?;
    println!("{}", format_success(&format!("Connected to {}", client.url())));

    let collection = client
        .get_collection(client.collection_name())
        .await
        .context("Failed to fetch collection")?;
    println!(
        "{}",
        format_success(&format!("Collection {} ({})", collection.name, collection.id))
    );

    let count = client
        .count(&collection)
        .await
        .context("Failed to count documents")?;
    println!("{}", format_info(&format!("{} document(s) stored", count)));

    if count == 0 {
        warn!("Collection is empty, queries will return nothing");
    }

    Ok(())
}
