// file: src/database/embeddings.rs
// description: OpenAI-compatible embeddings endpoint client for query text
// reference: https://platform.openai.com/docs/api-reference/embeddings

use crate::config::EmbeddingConfig;
use crate::error::{Result, ScoutError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: Vec<&'a str>,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

pub struct EmbeddingClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl EmbeddingClient {
    pub fn new(endpoint: String, model: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            model,
            api_key,
        }
    }

    /// Chroma cannot embed text server side, so a missing endpoint is an error.
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        let endpoint = config.endpoint.as_ref().ok_or_else(|| {
            ScoutError::Embedding(
                "embedding.endpoint is not set; Chroma queries need a query vector".to_string(),
            )
        })?;

        Ok(Self::new(
            endpoint.clone(),
            config.model.clone(),
            config.api_key.clone(),
        ))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            input: vec![text],
            model: &self.model,
        };

        debug!(
            "Requesting embedding from {} for {} chars",
            self.endpoint,
            text.len()
        );

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await.map_err(|e| {
            ScoutError::Embedding(format!("Failed to send embedding request: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ScoutError::Embedding(format!(
                "Embedding request failed with status {}: {}",
                status, error_text
            )));
        }

        let embedding_response: EmbeddingResponse = response.json().await.map_err(|e| {
            ScoutError::Embedding(format!("Failed to parse embedding response: {}", e))
        })?;

        let embedding = embedding_response
            .data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .ok_or_else(|| ScoutError::Embedding("No embedding data returned".to_string()))?;

        if embedding.is_empty() {
            return Err(ScoutError::Embedding("Empty embedding returned".to_string()));
        }

        debug!("Received embedding with {} dimensions", embedding.len());
        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_without_endpoint() {
        let config = EmbeddingConfig {
            endpoint: None,
            model: "nomic-embed-text".to_string(),
            api_key: None,
        };
        let err = EmbeddingClient::from_config(&config).err().unwrap();
        assert!(matches!(err, ScoutError::Embedding(_)));
    }

    #[test]
    fn test_from_config_with_endpoint() {
        let config = EmbeddingConfig {
            endpoint: Some("http://localhost:11434/v1/embeddings".to_string()),
            model: "nomic-embed-text".to_string(),
            api_key: None,
        };
        let client = EmbeddingClient::from_config(&config).unwrap();
        assert_eq!(client.model(), "nomic-embed-text");
    }

    #[test]
    fn test_request_body_shape() {
        let request = EmbeddingRequest {
            input: vec!["concurrency in Go"],
            model: "nomic-embed-text",
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["input"][0], "concurrency in Go");
        assert_eq!(body["model"], "nomic-embed-text");
    }
}
