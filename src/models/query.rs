// file: src/models/query.rs
// description: Similarity query request and nested response shapes
// reference: https://docs.trychroma.com/reference

use crate::utils::Validator;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Include {
    Documents,
    Metadatas,
    Distances,
}

/// Chroma query body. The server never embeds text, so inputs are vectors.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest {
    pub query_embeddings: Vec<Vec<f32>>,

    pub n_results: usize,

    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_filter: Option<Value>,

    pub include: Vec<Include>,
}

impl QueryRequest {
    pub fn embedding(embedding: Vec<f32>, n_results: usize) -> Self {
        Self {
            query_embeddings: vec![embedding],
            n_results,
            where_filter: None,
            include: vec![Include::Documents, Include::Metadatas, Include::Distances],
        }
    }

    pub fn with_where(mut self, filter: Option<Value>) -> Self {
        self.where_filter = filter;
        self
    }
}

/// Per-input result groups. Every outer vector has one entry per query input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResponse {
    pub ids: Vec<Vec<String>>,

    #[serde(default)]
    pub documents: Option<Vec<Vec<Option<String>>>>,

    #[serde(default)]
    pub metadatas: Option<Vec<Vec<Option<Map<String, Value>>>>>,

    #[serde(default)]
    pub distances: Option<Vec<Vec<Option<f32>>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryMatch {
    /// 1-based position within its group
    pub rank: usize,
    pub id: String,
    pub document: Option<String>,
    pub metadata: Option<Map<String, Value>>,
    pub distance: Option<f32>,
}

impl QueryResponse {
    pub fn group_count(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.iter().all(Vec::is_empty)
    }

    /// Flattens one result group into rows, aligning ids with the optional columns.
    pub fn matches(&self, group: usize) -> Vec<QueryMatch> {
        let Some(ids) = self.ids.get(group) else {
            return Vec::new();
        };

        ids.iter()
            .enumerate()
            .map(|(idx, id)| QueryMatch {
                rank: idx + 1,
                id: id.clone(),
                document: column(&self.documents, group, idx).cloned().flatten(),
                metadata: column(&self.metadatas, group, idx).cloned().flatten(),
                distance: column(&self.distances, group, idx).copied().flatten(),
            })
            .collect()
    }

    pub fn groups(&self) -> Vec<Vec<QueryMatch>> {
        (0..self.group_count()).map(|g| self.matches(g)).collect()
    }
}

fn column<T>(values: &Option<Vec<Vec<T>>>, group: usize, idx: usize) -> Option<&T> {
    values.as_ref()?.get(group)?.get(idx)
}

impl QueryMatch {
    /// Path of the originating PDF when the indexer stored one under `source`.
    pub fn source(&self) -> Option<&str> {
        self.metadata.as_ref()?.get("source")?.as_str()
    }

    /// Chunk index within the source document, stored by the indexer as `chunk`.
    pub fn chunk(&self) -> Option<i64> {
        self.metadata.as_ref()?.get("chunk")?.as_i64()
    }

    pub fn snippet(&self, max_chars: Option<usize>) -> String {
        let document = self.document.as_deref().unwrap_or_default();
        match max_chars {
            Some(max) => Validator::truncate_text(document, max),
            None => document.to_string(),
        }
    }

    pub fn format_summary(&self, max_chars: Option<usize>) -> String {
        let mut summary = format!("Result {}: {}", self.rank, self.id);

        if let Some(distance) = self.distance {
            summary.push_str(&format!(" (distance: {:.4})", distance));
        }

        if let Some(source) = self.source() {
            summary.push_str(&format!("\n  Source: {}", source));
            if let Some(chunk) = self.chunk() {
                summary.push_str(&format!(" (chunk {})", chunk));
            }
        }

        summary.push('\n');
        summary.push_str(&self.snippet(max_chars));
        summary
    }
}
