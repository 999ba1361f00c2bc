//! Client for the document service.
//!
//! The service exposes two endpoints: one lists every document, the other
//! sets the completion flag of a single document. [`DocumentService`] is the
//! seam the rest of the crate talks through, so tests can script responses.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use clonewatch_api::{
    ApiDocument, COMPLETE_PATH, CompleteRequest, CompleteResponse, DOCUMENTS_PATH,
};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use std::time::Duration;
use tracing::debug;

/// Responses larger than this are refused
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// A failed exchange with the document service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The request never produced a response (connect error, timeout, ...)
    Transport(String),
    /// The service answered with a non-2xx status
    Status { status: u16, body: String },
    /// The response body was not the expected JSON
    Decode(String),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Transport(msg) => write!(f, "request failed: {msg}"),
            ServiceError::Status { status, body } if body.is_empty() => {
                write!(f, "HTTP error: {status}")
            }
            ServiceError::Status { status, body } => write!(f, "HTTP error: {status}: {body}"),
            ServiceError::Decode(msg) => write!(f, "invalid response: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {}

/// The two operations of the document service
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// `GET /api/documents`
    async fn fetch_documents(&self) -> Result<Vec<ApiDocument>, ServiceError>;

    /// `POST /api/documents/complete`
    async fn update_completion(
        &self,
        request: &CompleteRequest,
    ) -> Result<CompleteResponse, ServiceError>;
}

/// [`DocumentService`] over plain HTTP
#[derive(Clone)]
pub struct HttpDocumentService {
    base_url: String,
    timeout: Duration,
    client: Client<HttpConnector, Body>,
}

impl HttpDocumentService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            timeout,
            client: Client::builder(TokioExecutor::new()).build_http(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one request and return the status and body of the response
    async fn exchange(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<(StatusCode, String), ServiceError> {
        let uri = format!("{}{}", self.base_url, path);
        debug!(method = %method, uri = %uri, "-> document service");

        let mut builder = Request::builder()
            .method(method)
            .uri(&uri)
            .header(header::ACCEPT, "application/json");
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json)
            }
            None => Body::empty(),
        };
        let request = builder
            .body(body)
            .map_err(|e| ServiceError::Transport(format!("invalid request to {uri}: {e}")))?;

        let response = tokio::time::timeout(self.timeout, self.client.request(request))
            .await
            .map_err(|_| {
                ServiceError::Transport(format!("timed out after {:?} ({uri})", self.timeout))
            })?
            .map_err(|e| ServiceError::Transport(format!("{uri}: {e}")))?;

        let status = response.status();
        debug!(status = %status, uri = %uri, "<- document service");

        let bytes = axum::body::to_bytes(Body::new(response.into_body()), MAX_BODY_BYTES)
            .await
            .map_err(|e| ServiceError::Transport(format!("reading body from {uri}: {e}")))?;
        let text = String::from_utf8(bytes.to_vec())
            .map_err(|e| ServiceError::Decode(format!("body from {uri} is not UTF-8: {e}")))?;

        Ok((status, text))
    }
}

/// Map a non-2xx status to an error, keep the body otherwise
fn expect_success(status: StatusCode, body: String) -> Result<String, ServiceError> {
    if status.is_success() {
        Ok(body)
    } else {
        Err(ServiceError::Status {
            status: status.as_u16(),
            body: body.trim().to_string(),
        })
    }
}

fn decode_ack(body: &str) -> Result<CompleteResponse, ServiceError> {
    facet_json::from_str::<CompleteResponse>(body).map_err(|e| ServiceError::Decode(e.to_string()))
}

#[async_trait]
impl DocumentService for HttpDocumentService {
    async fn fetch_documents(&self) -> Result<Vec<ApiDocument>, ServiceError> {
        let (status, body) = self.exchange(Method::GET, DOCUMENTS_PATH, None).await?;
        let body = expect_success(status, body)?;
        clonewatch_api::parse_documents(&body).map_err(|e| ServiceError::Decode(format!("{e:#}")))
    }

    async fn update_completion(
        &self,
        request: &CompleteRequest,
    ) -> Result<CompleteResponse, ServiceError> {
        let json = facet_json::to_string(request)
            .map_err(|e| ServiceError::Transport(format!("encoding request: {e}")))?;
        let (status, body) = self
            .exchange(Method::POST, COMPLETE_PATH, Some(json))
            .await?;
        let body = expect_success(status, body)?;
        decode_ack(&body)
    }
}
