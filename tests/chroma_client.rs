// file: tests/chroma_client.rs
// description: end to end checks against an in-process fake Chroma service
// reference: https://docs.rs/axum

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use pdf_scout::{
    ChromaClient, Config, PrintOptions, QueryRequest, RunOutcome, ScoutError, ScoutPipeline,
    print_answer,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::net::TcpListener;

const COLLECTIONS: &str = "/api/v2/tenants/{tenant}/databases/{database}/collections";

#[derive(Clone, Default)]
struct FakeChroma {
    last_query: Arc<Mutex<Option<Value>>>,
    last_embedding_request: Arc<Mutex<Option<Value>>>,
    last_chat_request: Arc<Mutex<Option<Value>>>,
}

impl FakeChroma {
    fn last_query(&self) -> Value {
        self.last_query.lock().unwrap().clone().expect("no query received")
    }

    fn received_query(&self) -> bool {
        self.last_query.lock().unwrap().is_some()
    }
}

async fn heartbeat() -> Json<Value> {
    Json(json!({"nanosecond heartbeat": 1_700_000_000_000_000_000_i64}))
}

async fn get_collection(
    Path((tenant, database, name)): Path<(String, String, String)>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match name.as_str() {
        "my_pdfs" | "broken" => Ok(Json(json!({
            "id": format!("{}-id", name),
            "name": name,
            "metadata": null,
            "dimension": 3,
            "tenant": tenant,
            "database": database
        }))),
        _ => Err((
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "NotFoundError",
                "message": format!("Collection [{}] does not exist", name)
            })),
        )),
    }
}

async fn count(Path((_tenant, _database, id)): Path<(String, String, String)>) -> Json<Value> {
    let count = if id == "my_pdfs-id" { 2 } else { 0 };
    Json(json!(count))
}

async fn query(
    State(state): State<FakeChroma>,
    Path((_tenant, _database, id)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let has_embeddings = body.get("query_embeddings").is_some();
    *state.last_query.lock().unwrap() = Some(body);

    // Chroma's REST API has no server-side embedding for queries
    if !has_embeddings {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "missing field `query_embeddings`".to_string(),
        ));
    }

    if id != "my_pdfs-id" {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "index unavailable".to_string(),
        ));
    }

    Ok(Json(json!({
        "ids": [["doc_0", "doc_1"]],
        "documents": [[
            "This page discusses Go routines and concurrency...",
            "Channels let goroutines communicate."
        ]],
        "metadatas": [[
            {"source": "/home/u/Downloads/learning-go.pdf", "chunk": 0},
            {"source": "/home/u/Downloads/learning-go.pdf", "chunk": 1}
        ]],
        "distances": [[0.21, 0.34]],
        "embeddings": null,
        "include": ["documents", "metadatas", "distances"]
    })))
}

async fn embeddings(State(state): State<FakeChroma>, Json(body): Json<Value>) -> Json<Value> {
    *state.last_embedding_request.lock().unwrap() = Some(body);
    Json(json!({"data": [{"embedding": [0.1, 0.2, 0.3], "index": 0}]}))
}

async fn chat(State(state): State<FakeChroma>, Json(body): Json<Value>) -> Json<Value> {
    *state.last_chat_request.lock().unwrap() = Some(body);
    Json(json!({
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": "Sure.\nAnswer: Goroutines talk over channels."
            }
        }]
    }))
}

async fn spawn_fake_chroma() -> (String, FakeChroma) {
    let state = FakeChroma::default();
    let app = Router::new()
        .route("/api/v2/heartbeat", get(heartbeat))
        .route(&format!("{}/{{name}}", COLLECTIONS), get(get_collection))
        .route(&format!("{}/{{id}}/count", COLLECTIONS), get(count))
        .route(&format!("{}/{{id}}/query", COLLECTIONS), post(query))
        .route("/v1/embeddings", post(embeddings))
        .route("/v1/chat/completions", post(chat))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), state)
}

async fn unused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn config_with(url: &str, root: &std::path::Path) -> Config {
    let mut config = Config::default_config();
    config.database.url = url.to_string();
    config.scanner.root = Some(root.to_path_buf());
    config.embedding.endpoint = Some(format!("{}/v1/embeddings", url));
    config.llm.endpoint = format!("{}/v1/chat/completions", url);
    config
}

#[tokio::test]
async fn test_run_scans_then_prints_matches() {
    let (url, fake) = spawn_fake_chroma().await;
    let downloads = TempDir::new().unwrap();
    fs::write(downloads.path().join("a.PDF"), "").unwrap();
    fs::write(downloads.path().join("b.txt"), "").unwrap();
    fs::create_dir(downloads.path().join("sub")).unwrap();
    fs::write(downloads.path().join("sub/c.pdf"), "").unwrap();

    let pipeline = ScoutPipeline::new(config_with(&url, downloads.path()));
    let mut out = Vec::new();
    let outcome = pipeline
        .run("concurrency in Go", &PrintOptions::default(), &mut out)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Completed {
            pdfs: 2,
            documents: 2
        }
    );

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("a.PDF"));
    assert!(text.contains("c.pdf"));
    assert!(!text.contains("b.txt"));
    assert!(text.ends_with(
        "Found relevant concept in: This page discusses Go routines and concurrency...\n\
         Found relevant concept in: Channels let goroutines communicate.\n"
    ));

    let body = fake.last_query();
    assert_eq!(body["query_embeddings"], json!([[0.1, 0.2, 0.3]]));
    assert_eq!(body["n_results"], json!(5));
    assert!(body.get("where").is_none());
}

#[tokio::test]
async fn test_query_embeds_text_and_forwards_where_filter() {
    let (url, fake) = spawn_fake_chroma().await;
    let downloads = TempDir::new().unwrap();
    let mut config = config_with(&url, downloads.path());
    config.query.where_filter = Some(r#"{"chunk": 0}"#.to_string());

    let pipeline = ScoutPipeline::new(config);
    let mut out = Vec::new();
    let printed = pipeline
        .query("concurrency in Go", &PrintOptions::default(), &mut out)
        .await
        .unwrap();

    assert_eq!(printed, 2);

    let embedding_request = fake.last_embedding_request.lock().unwrap().clone().unwrap();
    assert_eq!(embedding_request["input"], json!(["concurrency in Go"]));
    assert_eq!(embedding_request["model"], json!("nomic-embed-text"));

    let body = fake.last_query();
    assert!(body.get("query_texts").is_none());
    assert_eq!(body["query_embeddings"].as_array().unwrap().len(), 1);
    assert_eq!(body["where"], json!({"chunk": 0}));
}

#[tokio::test]
async fn test_get_collection_and_count() {
    let (url, _fake) = spawn_fake_chroma().await;
    let mut config = Config::default_config().database;
    config.url = url;

    let client = ChromaClient::connect(config).await.unwrap();
    let collection = client.get_collection("my_pdfs").await.unwrap();

    assert_eq!(collection.id, "my_pdfs-id");
    assert_eq!(collection.tenant.as_deref(), Some("default_tenant"));
    assert_eq!(client.count(&collection).await.unwrap(), 2);
}

#[tokio::test]
async fn test_missing_collection_is_error() {
    let (url, _fake) = spawn_fake_chroma().await;
    let mut config = Config::default_config().database;
    config.url = url;

    let client = ChromaClient::connect(config).await.unwrap();
    let err = client.get_collection("unknown").await.unwrap_err();

    assert!(matches!(err, ScoutError::CollectionNotFound(name) if name == "unknown"));
}

#[tokio::test]
async fn test_query_failure_is_database_error() {
    let (url, _fake) = spawn_fake_chroma().await;
    let mut config = Config::default_config().database;
    config.url = url;

    let client = ChromaClient::connect(config).await.unwrap();
    let collection = client.get_collection("broken").await.unwrap();
    let err = client
        .query(&collection, &QueryRequest::embedding(vec![0.1, 0.2, 0.3], 5))
        .await
        .unwrap_err();

    match err {
        ScoutError::Database(message) => {
            assert!(message.contains("500"));
            assert!(message.contains("index unavailable"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_query_without_embeddings_is_rejected() {
    let (url, _fake) = spawn_fake_chroma().await;
    let response = reqwest::Client::new()
        .post(format!(
            "{}/api/v2/tenants/default_tenant/databases/default_database/collections/my_pdfs-id/query",
            url
        ))
        .json(&json!({"query_texts": ["concurrency in Go"], "n_results": 5}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_missing_embedding_endpoint_never_reaches_chroma() {
    let (url, fake) = spawn_fake_chroma().await;
    let downloads = TempDir::new().unwrap();
    let mut config = config_with(&url, downloads.path());
    config.embedding.endpoint = None;

    let pipeline = ScoutPipeline::new(config);
    let mut out = Vec::new();
    let err = pipeline
        .query("concurrency in Go", &PrintOptions::default(), &mut out)
        .await
        .unwrap_err();

    assert!(matches!(err, ScoutError::Embedding(_)));
    assert!(!fake.received_query());
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_ask_answers_from_retrieved_chunks() {
    let (url, fake) = spawn_fake_chroma().await;
    let downloads = TempDir::new().unwrap();

    let pipeline = ScoutPipeline::new(config_with(&url, downloads.path()));
    let answer = pipeline.ask("How do goroutines communicate?").await.unwrap();

    assert_eq!(answer.answer, "Goroutines talk over channels.");
    assert_eq!(answer.sources.len(), 2);
    assert_eq!(
        answer.sources[0].source.as_deref(),
        Some("/home/u/Downloads/learning-go.pdf")
    );
    assert_eq!(answer.sources[0].chunk_index, Some(0));
    assert_eq!(answer.sources[1].chunk_index, Some(1));
    assert_eq!(answer.sources[1].preview, "Channels let goroutines communicate.");

    assert_eq!(fake.last_query()["n_results"], json!(2));

    let chat_request = fake.last_chat_request.lock().unwrap().clone().unwrap();
    assert_eq!(chat_request["model"], json!("tinyllama"));
    assert_eq!(chat_request["max_tokens"], json!(80));
    let prompt = chat_request["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.starts_with("You are a helpful assistant."));
    assert!(prompt.contains(
        "This page discusses Go routines and concurrency...\n\nChannels let goroutines communicate."
    ));
    assert!(prompt.contains("How do goroutines communicate?"));
    assert!(prompt.ends_with("Answer:"));

    let mut printed = Vec::new();
    print_answer(&answer, &mut printed).unwrap();
    let text = String::from_utf8(printed).unwrap();
    assert!(text.contains("1. /home/u/Downloads/learning-go.pdf (chunk 0)"));
    assert!(text.contains("2. /home/u/Downloads/learning-go.pdf (chunk 1)"));
}

#[tokio::test]
async fn test_unreachable_service_fails_to_connect() {
    let mut config = Config::default_config().database;
    config.url = unused_url().await;

    let err = ChromaClient::connect(config).await.err().unwrap();
    assert!(matches!(err, ScoutError::Connection { .. }));
}

#[tokio::test]
async fn test_unreachable_service_aborts_run_after_scan_output() {
    let downloads = TempDir::new().unwrap();
    fs::write(downloads.path().join("go.pdf"), "").unwrap();
    let url = unused_url().await;

    let pipeline = ScoutPipeline::new(config_with(&url, downloads.path()));
    let mut out = Vec::new();
    let result = pipeline
        .run("concurrency in Go", &PrintOptions::default(), &mut out)
        .await;

    assert!(result.is_err());
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Found PDFs:"));
    assert!(!text.contains("Found relevant concept in:"));
}
