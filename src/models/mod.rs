// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod collection;
pub mod query;

pub use collection::Collection;
pub use query::{Include, QueryMatch, QueryRequest, QueryResponse};
