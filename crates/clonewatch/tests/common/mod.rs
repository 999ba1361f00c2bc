//! Common test utilities.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use clonewatch::client::{DocumentService, ServiceError};
use clonewatch::server::{self, DocumentRepository};
use clonewatch_api::{ApiDocument, CompleteRequest, CompleteResponse};
use tokio::sync::Notify;

pub const BROWSE_URL: &str = "https://tracker.example/browse/";

/// Get the path to the test fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// The documents in `fixtures/documents.json`
pub fn fixture_documents() -> Vec<ApiDocument> {
    let json = std::fs::read_to_string(fixtures_dir().join("documents.json"))
        .expect("Failed to read documents.json");
    clonewatch_api::parse_documents(&json).expect("Failed to parse documents.json")
}

/// Copy the fixture data file into a temporary directory.
pub fn temp_data_file() -> (tempfile::TempDir, PathBuf) {
    let temp = tempfile::tempdir().expect("Failed to create temp dir");
    let path = temp.path().join("documents.json");
    std::fs::copy(fixtures_dir().join("documents.json"), &path)
        .expect("Failed to copy documents.json");
    (temp, path)
}

/// Start the reference document service on an ephemeral port.
pub async fn spawn_server(repo: DocumentRepository) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(server::serve(listener, repo));
    addr
}

/// A document with the fields the filter and gap tests care about
pub fn document(id: &str, assignee: Option<&str>, completed: bool) -> ApiDocument {
    ApiDocument {
        id: Some(id.to_string()),
        assignee: assignee.map(str::to_string),
        completed: Some(completed),
        ..Default::default()
    }
}

/// In-memory [`DocumentService`] with scripted replies.
///
/// Completion updates pop the next scripted reply; once the script runs out
/// every update is acknowledged. With a gate, each update waits for a
/// `notify_one` before replying.
pub struct ScriptedService {
    documents: Vec<ApiDocument>,
    fetch_error: Option<ServiceError>,
    replies: Mutex<VecDeque<Result<CompleteResponse, ServiceError>>>,
    requests: Mutex<Vec<CompleteRequest>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedService {
    pub fn new(documents: Vec<ApiDocument>) -> Self {
        Self {
            documents,
            fetch_error: None,
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn failing_fetch(error: ServiceError) -> Self {
        Self {
            fetch_error: Some(error),
            ..Self::new(Vec::new())
        }
    }

    pub fn reply(self, reply: Result<CompleteResponse, ServiceError>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Every completion update received so far
    pub fn requests(&self) -> Vec<CompleteRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentService for ScriptedService {
    async fn fetch_documents(&self) -> Result<Vec<ApiDocument>, ServiceError> {
        match &self.fetch_error {
            Some(error) => Err(error.clone()),
            None => Ok(self.documents.clone()),
        }
    }

    async fn update_completion(
        &self,
        request: &CompleteRequest,
    ) -> Result<CompleteResponse, ServiceError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let scripted = self.replies.lock().unwrap().pop_front();
        scripted.unwrap_or(Ok(CompleteResponse {
            success: true,
            modified: Some(1),
            completed: Some(request.completed),
        }))
    }
}
