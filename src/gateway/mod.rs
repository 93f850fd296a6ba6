pub mod error;
pub mod extract;

pub use error::{ErrorKind, GatewayError};
pub use extract::{extract_message, extract_response, extract_upload_id, FALLBACK_REPLY};

use crate::config::GatewayConfig;
use crate::session::models::{HistoryEntry, UploadedFile};
use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

pub const ALLOWED_EXTENSIONS: &[&str] = &["xlsx", "xls"];

/// Longest slice of an error body carried into the transcript.
pub const MAX_ERROR_DETAIL_CHARS: usize = 200;

/// A spreadsheet read into memory, ready to send.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub async fn from_path(path: &Path) -> Result<Self, GatewayError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        Ok(Self { name, bytes })
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub file: UploadedFile,
    /// Server-provided status text, when it sent one.
    pub message: Option<String>,
}

#[derive(Serialize)]
struct ChatTurnRequest<'a> {
    message: &'a str,
    timestamp: DateTime<Utc>,
    conversation_history: &'a [HistoryEntry],
}

pub fn is_allowed_file_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// HTTP client for the chat, upload and cleanup endpoints.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    config: GatewayConfig,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Uploads a spreadsheet. Rejected locally while `active` holds a file
    /// or when the name lacks an allowed extension.
    pub async fn submit_upload(
        &self,
        active: Option<&UploadedFile>,
        upload: FileUpload,
    ) -> Result<UploadOutcome, GatewayError> {
        if let Some(current) = active {
            return Err(GatewayError::Conflict(current.name.clone()));
        }
        if !is_allowed_file_name(&upload.name) {
            return Err(GatewayError::Validation(upload.name));
        }

        let FileUpload { name, bytes } = upload;
        let size = bytes.len() as u64;
        let mime = mime_guess::from_path(&name).first_or_octet_stream();
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(name.clone())
            .mime_str(mime.essence_str())?;
        let form = reqwest::multipart::Form::new().part("file", part);

        tracing::info!(file = %name, size, "uploading spreadsheet");
        let request = self.client.post(self.config.upload_url()).multipart(form);
        let payload = with_deadline("upload", self.config.upload_timeout, async {
            read_json(request.send().await?).await
        })
        .await?;

        let upload_id = extract_upload_id(&payload).ok_or_else(|| {
            GatewayError::InvalidResponse("upload response did not include an upload_id".into())
        })?;
        tracing::info!(file = %name, %upload_id, "upload accepted");

        Ok(UploadOutcome {
            file: UploadedFile::ready(name, size, upload_id),
            message: extract_message(&payload),
        })
    }

    /// Sends one chat turn to the conversation bound to `upload_id`.
    pub async fn submit_chat_turn(
        &self,
        text: &str,
        upload_id: &str,
        history: &[HistoryEntry],
    ) -> Result<String, GatewayError> {
        if upload_id.trim().is_empty() {
            return Err(GatewayError::Precondition);
        }

        let body = ChatTurnRequest {
            message: text,
            timestamp: Utc::now(),
            conversation_history: history,
        };
        let url = self.config.chat_url(upload_id).ok_or_else(|| {
            GatewayError::InvalidUrl(format!("{}{}", self.config.base_url, self.config.chat_path))
        })?;
        tracing::debug!(%upload_id, %url, history = history.len(), "sending chat turn");
        let request = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(&body);
        let payload = with_deadline("chat", self.config.chat_timeout, async {
            read_json(request.send().await?).await
        })
        .await?;

        Ok(extract_response(&payload))
    }

    /// Asks the gateway to drop every processed dataset for this client.
    pub async fn request_cleanup(&self) -> Result<(), GatewayError> {
        tracing::info!("requesting gateway cleanup");
        let request = self.client.delete(self.config.cleanup_url());
        with_deadline("cleanup", self.config.cleanup_timeout, async {
            let resp = request.send().await?;
            check_status(resp).await.map(|_| ())
        })
        .await
    }
}

async fn with_deadline<T>(
    operation: &'static str,
    after: Duration,
    fut: impl Future<Output = Result<T, GatewayError>>,
) -> Result<T, GatewayError> {
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, ?after, "gateway request timed out");
            Err(GatewayError::Timeout { operation, after })
        }
    }
}

async fn check_status(resp: Response) -> Result<Response, GatewayError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), body = %text, "gateway returned an error");
    let message = if text.trim().is_empty() {
        status.canonical_reason().unwrap_or_default().to_string()
    } else {
        truncate_detail(text.trim())
    };
    Err(GatewayError::Transport {
        status: status.as_u16(),
        message,
    })
}

/// Caps an error body so it fits in one transcript line.
fn truncate_detail(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(MAX_ERROR_DETAIL_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Bodies that are not JSON are kept as a bare string.
async fn read_json(resp: Response) -> Result<Value, GatewayError> {
    let text = check_status(resp).await?.text().await?;
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_file_names() {
        assert!(is_allowed_file_name("report.xlsx"));
        assert!(is_allowed_file_name("LEGACY.XLS"));
        assert!(is_allowed_file_name("q1.Xlsx"));
        assert!(!is_allowed_file_name("report.csv"));
        assert!(!is_allowed_file_name("xlsx"));
        assert!(!is_allowed_file_name("report.xlsx.pdf"));
    }

    #[test]
    fn test_truncate_detail() {
        assert_eq!(truncate_detail("Bad Gateway"), "Bad Gateway");
        let long = "x".repeat(MAX_ERROR_DETAIL_CHARS + 1);
        let cut = truncate_detail(&long);
        assert_eq!(cut.chars().count(), MAX_ERROR_DETAIL_CHARS + 3);
        assert!(cut.ends_with("..."));
        let exact = "é".repeat(MAX_ERROR_DETAIL_CHARS);
        assert_eq!(truncate_detail(&exact), exact);
    }

    #[tokio::test]
    async fn test_upload_conflict_checked_before_validation() {
        let gateway = GatewayClient::new(GatewayConfig::with_base_url("http://127.0.0.1:9"));
        let active = UploadedFile::ready("report.xlsx", 200, "u1");
        let upload = FileUpload {
            name: "notes.txt".into(),
            bytes: vec![],
        };
        let err = gateway.submit_upload(Some(&active), upload).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_chat_requires_upload_id() {
        let gateway = GatewayClient::new(GatewayConfig::with_base_url("http://127.0.0.1:9"));
        let err = gateway.submit_chat_turn("hi", "  ", &[]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
    }
}
