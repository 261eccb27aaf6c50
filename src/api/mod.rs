//! HTTP client for the document-processing backend
//!
//! The backend owns every heavy operation (text extraction, embedding
//! generation, provider selection); this client only speaks its REST
//! surface: upload, file listing, deletion, processing triggers, status
//! polling, and configuration reads.
//!
//! Calls are single-shot: no retries, and no explicit timeout beyond the
//! network stack's defaults. Backend error bodies carry a `detail` string;
//! that text is surfaced to the user, with a generic per-operation fallback
//! when the body is unreadable.

use crate::error::{Error, Result};
use crate::poller::StatusSource;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::debug;
use url::Url;

/// File extensions the backend accepts for upload
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "docx", "doc", "pptx", "ppt"];

/// A document known to the backend, with derived processing flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub filename: String,
    pub original_path: String,
    pub text_exists: bool,
    pub embeddings_exist: bool,
    /// Size in bytes
    pub size: u64,
    /// Modification time, seconds since the epoch
    pub modified: f64,
}

/// Processing state reported by the backend for a tracked file identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Queued,
    Uploaded,
    Processing,
    Completed,
    Error,
}

impl ProcessingStatus {
    /// Terminal states: the backend will not advance past these
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessingStatus::Completed | ProcessingStatus::Error)
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProcessingStatus::Queued => "Queued",
            ProcessingStatus::Uploaded => "Uploaded",
            ProcessingStatus::Processing => "Processing",
            ProcessingStatus::Completed => "Completed",
            ProcessingStatus::Error => "Error",
        };
        write!(f, "{}", label)
    }
}

/// Snapshot of one processing job, replaced wholesale on every poll
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingRecord {
    pub status: ProcessingStatus,
    pub filename: String,
    #[serde(default)]
    pub safe_filename: String,
    /// Progress percentage, 0-100
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub text_file: Option<String>,
    #[serde(default)]
    pub embeddings_file: Option<String>,
}

/// Acknowledgement returned by upload and process-local calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    pub file_id: String,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Embedding configuration as reported by the backend (read-only here)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Active provider name
    pub provider: String,
    /// Per-provider settings, open-ended
    #[serde(default)]
    pub providers: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct FilesResponse {
    files: Vec<FileRecord>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    data: ProcessingRecord,
}

#[derive(Debug, Deserialize)]
struct ConfigResponse {
    config: EmbeddingConfig,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    detail: String,
}

/// Typed client for the backend REST API
pub struct BackendClient {
    client: Client,
    base_url: Url,
}

impl BackendClient {
    /// Create a client for the given backend base URL
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        let client = Client::builder()
            .user_agent(concat!("ragdeck/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .brotli(true)
            .build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Config(format!("Invalid backend URL: {}", e)))
    }

    /// Build an endpoint URL ending in one percent-encoded path segment
    fn endpoint_with_segment(&self, path: &str, segment: &str) -> Result<Url> {
        let mut url = self.endpoint(path)?;
        url.path_segments_mut()
            .map_err(|_| Error::Config("Backend URL cannot carry a path".to_string()))?
            .push(segment);
        Ok(url)
    }

    /// Turn a non-success response into an upstream error, preferring the
    /// backend's own `detail` message over the generic fallback
    async fn check(response: Response, fallback: &str) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let detail = response
            .json::<ApiErrorBody>()
            .await
            .map(|body| body.detail)
            .unwrap_or_else(|_| fallback.to_string());
        debug!("Backend returned {}: {}", status, detail);
        Err(Error::Upstream(detail))
    }

    /// Check whether the backend answers its health endpoint
    pub async fn health(&self) -> bool {
        match self.client.get(self.base_url.clone()).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Upload one document as multipart form data
    pub async fn upload(&self, path: &Path) -> Result<UploadReceipt> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .unwrap_or_default();
        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(Error::Validation(format!(
                "Unsupported file type '{}'. Supported: {}",
                path.display(),
                SUPPORTED_EXTENSIONS.join(", ")
            )));
        }

        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::Validation(format!("Invalid file name: {}", path.display())))?
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        let mime = mime_guess::from_path(path).first_or_octet_stream();

        let part = Part::bytes(bytes)
            .file_name(filename)
            .mime_str(mime.essence_str())?;
        let form = Form::new().part("file", part);

        let url = self.endpoint("/api/upload")?;
        let response = self.client.post(url).multipart(form).send().await?;
        let response = Self::check(response, "Upload failed").await?;
        Ok(response.json().await?)
    }

    /// List all files the backend knows about
    pub async fn list_files(&self) -> Result<Vec<FileRecord>> {
        let url = self.endpoint("/api/files")?;
        let response = self.client.get(url).send().await?;
        let response = Self::check(response, "Failed to fetch files").await?;
        let parsed: FilesResponse = response.json().await?;
        Ok(parsed.files)
    }

    /// Delete a file and its derived text/embeddings
    pub async fn delete_file(&self, filename: &str) -> Result<()> {
        let url = self.endpoint_with_segment("/api/files", filename)?;
        let response = self.client.delete(url).send().await?;
        Self::check(response, "Failed to delete file").await?;
        Ok(())
    }

    /// Trigger processing of a file already present on the backend
    pub async fn process_local(&self, filename: &str) -> Result<UploadReceipt> {
        let url = self.endpoint_with_segment("/api/process-local", filename)?;
        let response = self.client.post(url).send().await?;
        let response = Self::check(response, "Failed to start processing").await?;
        Ok(response.json().await?)
    }

    /// Fetch the current processing status for a file identifier
    pub async fn status(&self, file_id: &str) -> Result<ProcessingRecord> {
        let url = self.endpoint_with_segment("/api/status", file_id)?;
        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::Upstream(format!("File ID not found: {}", file_id)));
        }
        let response = Self::check(response, "Failed to fetch status").await?;
        let parsed: StatusResponse = response.json().await?;
        Ok(parsed.data)
    }

    /// Fetch the embedding configuration
    pub async fn config(&self) -> Result<EmbeddingConfig> {
        let url = self.endpoint("/api/config")?;
        let response = self.client.get(url).send().await?;
        let response = Self::check(response, "Failed to fetch configuration").await?;
        let parsed: ConfigResponse = response.json().await?;
        Ok(parsed.config)
    }
}

#[async_trait]
impl StatusSource for BackendClient {
    async fn fetch_status(&self, file_id: &str) -> Result<ProcessingRecord> {
        self.status(file_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_list_files_unwraps_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "files": [{
                    "filename": "report.pdf",
                    "original_path": "Documents/report.pdf",
                    "text_exists": true,
                    "embeddings_exist": false,
                    "size": 1536,
                    "modified": 1700000000.0
                }]
            })))
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri()).unwrap();
        let files = client.list_files().await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].filename, "report.pdf");
        assert!(files[0].text_exists);
        assert!(!files[0].embeddings_exist);
        assert_eq!(files[0].size, 1536);
    }

    #[tokio::test]
    async fn test_status_unwraps_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/status/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "data": {
                    "status": "processing",
                    "filename": "report.pdf",
                    "safe_filename": "report_abc123.pdf",
                    "progress": 25,
                    "message": "Processing file (text extraction + embeddings)..."
                }
            })))
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri()).unwrap();
        let record = client.status("abc123").await.unwrap();
        assert_eq!(record.status, ProcessingStatus::Processing);
        assert_eq!(record.progress, 25);
        assert!(!record.status.is_terminal());
    }

    #[tokio::test]
    async fn test_error_detail_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/process-local/missing.pdf"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"detail": "File not found"})),
            )
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri()).unwrap();
        let err = client.process_local("missing.pdf").await.unwrap_err();
        assert_eq!(err.to_string(), "File not found");
    }

    #[tokio::test]
    async fn test_error_without_detail_uses_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/files"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri()).unwrap();
        let err = client.list_files().await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch files");
    }

    #[tokio::test]
    async fn test_delete_encodes_filename() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/files/annual%20report.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "message": "deleted"
            })))
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri()).unwrap();
        client.delete_file("annual report.pdf").await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.path(), "/api/files/annual%20report.pdf");
    }

    #[tokio::test]
    async fn test_upload_rejects_unsupported_extension_without_request() {
        let server = MockServer::start().await;
        let tmp = tempfile::TempDir::new().unwrap();
        let file = tmp.path().join("notes.txt");
        std::fs::write(&file, b"plain text").unwrap();

        let client = BackendClient::new(&server.uri()).unwrap();
        let err = client.upload(&file).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_returns_receipt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "message": "File uploaded and processing started",
                "file_id": "1a2b3c4d",
                "filename": "report.pdf"
            })))
            .mount(&server)
            .await;

        let tmp = tempfile::TempDir::new().unwrap();
        let file = tmp.path().join("report.pdf");
        std::fs::write(&file, b"%PDF-1.4").unwrap();

        let client = BackendClient::new(&server.uri()).unwrap();
        let receipt = client.upload(&file).await.unwrap();
        assert_eq!(receipt.file_id, "1a2b3c4d");
        assert_eq!(receipt.status, "success");
    }

    #[tokio::test]
    async fn test_config_parse() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/config"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "config": {
                    "provider": "openai",
                    "providers": {
                        "openai": {"model": "text-embedding-3-small"},
                        "dummy": {"dimension": 384}
                    }
                }
            })))
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri()).unwrap();
        let config = client.config().await.unwrap();
        assert_eq!(config.provider, "openai");
        assert!(config.providers.contains_key("dummy"));
    }
}
