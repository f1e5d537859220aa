// file: src/config.rs
// description: application configuration management with toml and environment support
// reference: https://docs.rs/config

use crate::error::{Result, ScoutError};
use crate::utils::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const ENV_PREFIX: &str = "PDF_SCOUT";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub scanner: ScannerConfig,
    pub database: DatabaseConfig,
    pub query: QueryConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScannerConfig {
    /// Directory to walk; `None` means `$HOME/Downloads`.
    #[serde(default)]
    pub root: Option<PathBuf>,
    pub suffix: String,
    #[serde(default)]
    pub follow_links: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub tenant: String,
    pub database: String,
    pub collection: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryConfig {
    pub text: String,
    pub n_results: usize,
    #[serde(default)]
    pub max_chars: Option<usize>,
    /// Chroma `where` metadata filter as a JSON object.
    #[serde(default)]
    pub where_filter: Option<String>,
}

/// OpenAI-compatible embeddings endpoint. Chroma only accepts vectors in a
/// query, so the query text is embedded here first and must use the same
/// model the collection was built with.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

/// OpenAI-compatible chat completions endpoint used by `ask`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    pub endpoint: String,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub top_k: usize,
    pub max_context_chars: usize,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ScannerConfig {
    /// Resolves the scan root, falling back to the user's Downloads folder.
    pub fn resolve_root(&self) -> Result<PathBuf> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => dirs::home_dir()
                .map(|home| home.join("Downloads"))
                .ok_or(ScoutError::HomeDirectory),
        }
    }
}

impl QueryConfig {
    pub fn parsed_where_filter(&self) -> Result<Option<serde_json::Value>> {
        match &self.where_filter {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => {
                let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| {
                    ScoutError::Config(format!("where_filter is not valid JSON: {}", e))
                })?;
                if !value.is_object() {
                    return Err(ScoutError::Config(
                        "where_filter must be a JSON object".to_string(),
                    ));
                }
                Ok(Some(value))
            }
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let defaults = config::Config::try_from(&Self::default_config())
            .map_err(|e| ScoutError::Config(e.to_string()))?;

        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder
                .add_source(config::File::from(Path::new(DEFAULT_CONFIG_PATH)).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| ScoutError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| ScoutError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            scanner: ScannerConfig {
                root: None,
                suffix: ".pdf".to_string(),
                follow_links: false,
            },
            database: DatabaseConfig {
                url: "http://localhost:8000".to_string(),
                tenant: "default_tenant".to_string(),
                database: "default_database".to_string(),
                collection: "my_pdfs".to_string(),
                timeout_secs: None,
            },
            query: QueryConfig {
                text: "concurrency in Go".to_string(),
                n_results: 5,
                max_chars: None,
                where_filter: None,
            },
            embedding: EmbeddingConfig {
                endpoint: Some("http://localhost:11434/v1/embeddings".to_string()),
                model: "nomic-embed-text".to_string(),
                api_key: None,
            },
            llm: LlmConfig {
                endpoint: "http://localhost:11434/v1/chat/completions".to_string(),
                model: "tinyllama".to_string(),
                api_key: None,
                top_k: 2,
                max_context_chars: 2000,
                max_tokens: 80,
                temperature: 0.2,
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.scanner.suffix.trim().is_empty() {
            return Err(ScoutError::Config(
                "scanner.suffix must not be empty".to_string(),
            ));
        }

        Validator::validate_url(&self.database.url)?;
        Validator::validate_name("database.collection", &self.database.collection)?;
        Validator::validate_name("database.tenant", &self.database.tenant)?;
        Validator::validate_name("database.database", &self.database.database)?;
        Validator::validate_n_results(self.query.n_results)?;

        if self.query.text.trim().is_empty() {
            return Err(ScoutError::Config("query.text must not be empty".to_string()));
        }

        if let Some(endpoint) = &self.embedding.endpoint {
            Validator::validate_url(endpoint)?;
            Validator::validate_not_empty("embedding.model", &self.embedding.model)?;
        }

        Validator::validate_url(&self.llm.endpoint)?;
        Validator::validate_not_empty("llm.model", &self.llm.model)?;
        Validator::validate_n_results(self.llm.top_k)?;

        if self.llm.max_context_chars == 0 {
            return Err(ScoutError::Config(
                "llm.max_context_chars must be greater than 0".to_string(),
            ));
        }

        self.query.parsed_where_filter()?;
        Ok(())
    }
}
