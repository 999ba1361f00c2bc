//! Reference document service.
//!
//! Serves the two endpoints the client consumes from a JSON array kept in
//! memory and written back to its data file after every completion update.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clonewatch_api::{
    ApiDocument, ApiError, COMPLETE_PATH, CompleteRequest, CompleteResponse, DOCUMENTS_PATH,
};
use eyre::{Result, WrapErr};
use facet_axum::Json;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info, warn};

/// The documents served, and where they are persisted
pub struct DocumentRepository {
    documents: Vec<ApiDocument>,
    data_file: Option<PathBuf>,
}

impl DocumentRepository {
    /// A repository that is never written to disk
    pub fn in_memory(documents: Vec<ApiDocument>) -> Self {
        Self {
            documents,
            data_file: None,
        }
    }

    /// Load the JSON array in `path`; updates are written back to it
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            eyre::bail!(
                "Data file not found at {}\n\n\
                 Create it with a JSON array of documents:\n\n\
                 [{{\"_id\": \"OCPBUGS-1\", \"target_backport_versions\": \"4.18.z\"}}]",
                path.display()
            );
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .wrap_err_with(|| format!("Failed to read data file: {}", path.display()))?;
        let documents = clonewatch_api::parse_documents(&content)
            .wrap_err_with(|| format!("Failed to parse data file: {}", path.display()))?;

        info!(count = documents.len(), path = %path.display(), "loaded data file");
        Ok(Self {
            documents,
            data_file: Some(path),
        })
    }

    pub fn documents(&self) -> &[ApiDocument] {
        &self.documents
    }

    /// Set `completed` on the top-level document `id`.
    ///
    /// Returns the number of documents modified: 0 when the id is unknown or
    /// the flag already had this value.
    pub fn set_completed(&mut self, id: &str, completed: bool) -> u64 {
        let Some(doc) = self
            .documents
            .iter_mut()
            .find(|doc| doc.id.as_deref() == Some(id))
        else {
            return 0;
        };

        if doc.completed == Some(completed) {
            return 0;
        }
        doc.completed = Some(completed);
        1
    }

    /// Set `completed` on `id` and persist the change.
    ///
    /// If the data file cannot be written, the in-memory flag is restored so
    /// that the served documents keep matching the file.
    pub async fn update_completed(&mut self, id: &str, completed: bool) -> Result<u64> {
        let previous = self
            .documents
            .iter()
            .find(|doc| doc.id.as_deref() == Some(id))
            .map(|doc| doc.completed);

        let modified = self.set_completed(id, completed);
        if modified == 0 {
            return Ok(0);
        }

        if let Err(e) = self.save().await {
            if let Some(doc) = self
                .documents
                .iter_mut()
                .find(|doc| doc.id.as_deref() == Some(id))
            {
                doc.completed = previous.flatten();
            }
            return Err(e);
        }
        Ok(modified)
    }

    /// Write the documents back to the data file, if there is one
    pub async fn save(&self) -> Result<()> {
        let Some(path) = &self.data_file else {
            return Ok(());
        };

        let json = facet_json::to_string_pretty(&self.documents)
            .map_err(|e| eyre::eyre!("Failed to encode documents: {e}"))?;
        tokio::fs::write(path, json)
            .await
            .wrap_err_with(|| format!("Failed to write data file: {}", path.display()))?;
        debug!(path = %path.display(), "saved data file");
        Ok(())
    }
}

/// State shared across HTTP handlers.
struct AppState {
    repo: RwLock<DocumentRepository>,
}

/// Build the router for the two endpoints
pub fn router(repo: DocumentRepository) -> Router {
    let state = Arc::new(AppState {
        repo: RwLock::new(repo),
    });

    Router::new()
        .route(DOCUMENTS_PATH, get(api_documents))
        .route(COMPLETE_PATH, post(api_complete))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Serve `repo` on an already bound listener until the process exits
pub async fn serve(listener: TcpListener, repo: DocumentRepository) -> Result<()> {
    let addr = listener.local_addr()?;
    info!("document service listening on http://{}", addr);
    axum::serve(listener, router(repo)).await?;
    Ok(())
}

/// Open the data file and serve it on `port`
pub async fn run(port: u16, data_file: PathBuf) -> Result<()> {
    let repo = DocumentRepository::open(&data_file).await?;

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind {addr}"))?;

    serve(listener, repo).await
}

fn api_error(status: StatusCode, code: &str, msg: impl Into<String>) -> Response {
    (
        status,
        Json(ApiError {
            error: msg.into(),
            code: code.to_string(),
        }),
    )
        .into_response()
}

fn bad_request(msg: impl Into<String>) -> Response {
    api_error(StatusCode::BAD_REQUEST, "bad_request", msg)
}

fn internal(msg: impl Into<String>) -> Response {
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
}

/// GET /api/documents - every stored document.
async fn api_documents(State(state): State<Arc<AppState>>) -> Response {
    let documents = state.repo.read().await.documents().to_vec();
    debug!(count = documents.len(), "serving documents");
    Json(documents).into_response()
}

/// POST /api/documents/complete - set the completion flag of one document.
async fn api_complete(State(state): State<Arc<AppState>>, body: String) -> Response {
    let request: CompleteRequest = match facet_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "rejecting malformed completion request");
            return bad_request(format!("Invalid request body: {e}"));
        }
    };

    let mut repo = state.repo.write().await;
    let modified = match repo.update_completed(&request.id, request.completed).await {
        Ok(modified) => modified,
        Err(e) => {
            error!(id = %request.id, error = %e, "failed to persist completion update");
            return internal(format!("{e:#}"));
        }
    };
    info!(id = %request.id, completed = request.completed, modified, "completion updated");

    Json(CompleteResponse {
        success: true,
        modified: Some(modified),
        completed: Some(request.completed),
    })
    .into_response()
}
