// file: src/models/collection.rs
// description: Chroma collection handle as returned by the collections endpoint
// reference: https://docs.trychroma.com/reference

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    /// Server-assigned collection id, used to address query and count calls
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,

    /// Embedding dimension, unset until the first record is added
    #[serde(default)]
    pub dimension: Option<u32>,

    #[serde(default)]
    pub tenant: Option<String>,

    #[serde(default)]
    pub database: Option<String>,
}
