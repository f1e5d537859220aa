// file: src/database/client.rs
// description: Chroma HTTP client wrapper with connection check, collection lookup and query
// reference: https://docs.trychroma.com/reference

use crate::config::DatabaseConfig;
use crate::error::{Result, ScoutError};
use crate::models::{Collection, QueryRequest, QueryResponse};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

const API_PREFIX: &str = "api/v2";

#[derive(Debug, Deserialize)]
struct HeartbeatResponse {
    #[serde(rename = "nanosecond heartbeat")]
    nanosecond_heartbeat: i64,
}

#[derive(Clone)]
pub struct ChromaClient {
    client: Client,
    config: DatabaseConfig,
}

impl ChromaClient {
    /// Builds the client without touching the network.
    pub fn new(config: DatabaseConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder
            .build()
            .map_err(|e| ScoutError::Database(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Builds the client and confirms the service answers a heartbeat.
    pub async fn connect(config: DatabaseConfig) -> Result<Self> {
        info!("Connecting to Chroma at {}", config.url);

        let client = Self::new(config)?;
        client.heartbeat().await?;
        Ok(client)
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    pub fn collection_name(&self) -> &str {
        &self.config.collection
    }

    pub async fn heartbeat(&self) -> Result<i64> {
        debug!("Checking Chroma heartbeat");

        let url = self.endpoint(&["heartbeat"]);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.connection_error(e))?;

        let heartbeat: HeartbeatResponse = Self::read_json(response, "heartbeat")
            .await
            .map_err(|e| ScoutError::Connection {
                url: self.config.url.clone(),
                message: e.to_string(),
            })?;

        info!("Chroma connection successful");
        Ok(heartbeat.nanosecond_heartbeat)
    }

    /// Looks up a collection by name. No embedding function travels with the lookup.
    pub async fn get_collection(&self, name: &str) -> Result<Collection> {
        debug!("Fetching collection {}", name);

        let url = self.collections_endpoint(&[name]);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.connection_error(e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ScoutError::CollectionNotFound(name.to_string()));
        }

        let collection: Collection =
            Self::read_json(response, &format!("get collection {}", name)).await?;

        info!("Using collection {} ({})", collection.name, collection.id);
        Ok(collection)
    }

    pub async fn count(&self, collection: &Collection) -> Result<u64> {
        let url = self.collections_endpoint(&[&collection.id, "count"]);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.connection_error(e))?;

        Self::read_json(response, &format!("count {}", collection.name)).await
    }

    /// Runs a nearest-neighbour query against `collection`.
    pub async fn query(
        &self,
        collection: &Collection,
        request: &QueryRequest,
    ) -> Result<QueryResponse> {
        debug!(
            "Querying collection {} for {} results",
            collection.name, request.n_results
        );

        let url = self.collections_endpoint(&[&collection.id, "query"]);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.connection_error(e))?;

        let results: QueryResponse =
            Self::read_json(response, &format!("query {}", collection.name)).await?;

        debug!(
            "Query returned {} group(s)",
            results.group_count()
        );
        Ok(results)
    }

    fn endpoint(&self, segments: &[&str]) -> String {
        let mut url = format!("{}/{}", self.config.url.trim_end_matches('/'), API_PREFIX);
        for segment in segments {
            url.push('/');
            url.push_str(segment);
        }
        url
    }

    fn collections_endpoint(&self, segments: &[&str]) -> String {
        let mut path = vec![
            "tenants",
            self.config.tenant.as_str(),
            "databases",
            self.config.database.as_str(),
            "collections",
        ];
        path.extend_from_slice(segments);
        self.endpoint(&path)
    }

    fn connection_error(&self, err: reqwest::Error) -> ScoutError {
        ScoutError::Connection {
            url: self.config.url.clone(),
            message: err.to_string(),
        }
    }

    async fn read_json<T: DeserializeOwned>(response: Response, operation: &str) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ScoutError::Database(format!(
                "Chroma {} failed with status {}: {}",
                operation, status, error_text
            )));
        }

        response.json().await.map_err(|e| {
            ScoutError::Database(format!(
                "Failed to parse Chroma {} response: {}",
                operation, e
            ))
        })
    }
}
