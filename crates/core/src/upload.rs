use crate::error::PipelineError;
use crate::models::{Document, RemoteFileHandle, RemoteFileState};
use crate::providers::backend_failure;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};
use uuid::Uuid;

/// Local byte copy staged for one remote transfer. Removed on drop, so the
/// release contract holds on success, error, and cancellation paths alike.
pub(crate) struct TempSpool {
    path: PathBuf,
}

impl TempSpool {
    pub(crate) async fn write(document: &Document) -> Result<Self, PipelineError> {
        let path = std::env::temp_dir().join(format!(
            "aeda_{}_{}",
            Uuid::new_v4(),
            document.file_name
        ));
        tokio::fs::write(&path, &document.bytes).await?;
        Ok(Self { path })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempSpool {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Two-phase large-document transport against the Gemini File API:
/// upload, then poll until the remote copy leaves `Processing`.
pub struct RemoteFileUploader {
    client: Client,
    endpoint: String,
    api_key: String,
    poll_interval: Duration,
    poll_timeout: Duration,
}

impl RemoteFileUploader {
    pub fn new(
        client: Client,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        poll_interval: Duration,
        poll_timeout: Duration,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            poll_interval,
            poll_timeout,
        }
    }

    /// Transfer the document to the backend. The local temp copy is deleted
    /// as soon as the transfer finishes, whatever the outcome.
    pub async fn upload(&self, document: &Document) -> Result<RemoteFileHandle, PipelineError> {
        let spool = TempSpool::write(document).await?;
        debug!(path = %spool.path().display(), bytes = document.len(), "spooled document for upload");

        let bytes = tokio::fs::read(spool.path()).await?;
        let metadata = Part::text(
            json!({ "file": { "display_name": document.file_name } }).to_string(),
        )
        .mime_str("application/json")?;
        let payload = Part::bytes(bytes)
            .file_name(document.file_name.clone())
            .mime_str(&document.mime_type)?;

        let response = self
            .client
            .post(format!("{}/upload/v1beta/files", self.endpoint))
            .header("x-goog-api-key", &self.api_key)
            .multipart(Form::new().part("metadata", metadata).part("file", payload))
            .send()
            .await;

        // Transfer is over either way; the local copy goes now.
        drop(spool);

        let response = response?;
        if !response.status().is_success() {
            return Err(backend_failure("gemini file api", response).await);
        }

        let parsed: Value = response.json().await?;
        let handle = decode_handle(&parsed, &document.mime_type);
        info!(name = %handle.name, state = ?handle.state, "remote file uploaded");
        Ok(handle)
    }

    /// Poll the remote copy until it is ready or terminally failed. The
    /// wait is bounded: exceeding the configured timeout surfaces as
    /// `ProcessingTimeout` rather than spinning forever.
    pub async fn await_ready(
        &self,
        mut handle: RemoteFileHandle,
    ) -> Result<RemoteFileHandle, PipelineError> {
        let started = Instant::now();

        loop {
            match handle.state {
                RemoteFileState::Ready => return Ok(handle),
                RemoteFileState::Failed => {
                    return Err(PipelineError::RemoteProcessingFailed(format!(
                        "backend reported terminal failure for {}",
                        handle.name
                    )));
                }
                RemoteFileState::Uploading | RemoteFileState::Processing => {
                    if started.elapsed() > self.poll_timeout {
                        return Err(PipelineError::ProcessingTimeout {
                            waited_secs: started.elapsed().as_secs(),
                        });
                    }
                    sleep(self.poll_interval).await;
                    handle = self.poll_once(&handle).await?;
                }
            }
        }
    }

    async fn poll_once(&self, handle: &RemoteFileHandle) -> Result<RemoteFileHandle, PipelineError> {
        let response = self
            .client
            .get(format!("{}/v1beta/{}", self.endpoint, handle.name))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(backend_failure("gemini file api", response).await);
        }

        let parsed: Value = response.json().await?;
        let state = parsed
            .pointer("/state")
            .and_then(Value::as_str)
            .map(decode_state)
            .unwrap_or(RemoteFileState::Processing);

        debug!(name = %handle.name, state = ?state, "polled remote file");
        Ok(RemoteFileHandle {
            state,
            ..handle.clone()
        })
    }
}

fn decode_handle(parsed: &Value, fallback_mime: &str) -> RemoteFileHandle {
    RemoteFileHandle {
        name: parsed
            .pointer("/file/name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        uri: parsed
            .pointer("/file/uri")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        mime_type: parsed
            .pointer("/file/mimeType")
            .and_then(Value::as_str)
            .unwrap_or(fallback_mime)
            .to_string(),
        state: parsed
            .pointer("/file/state")
            .and_then(Value::as_str)
            .map(decode_state)
            .unwrap_or(RemoteFileState::Processing),
    }
}

/// `PROCESSING` keeps the poll going and `FAILED` is terminal; anything
/// else the backend answers is treated as usable.
fn decode_state(raw: &str) -> RemoteFileState {
    match raw {
        "PROCESSING" => RemoteFileState::Processing,
        "FAILED" => RemoteFileState::Failed,
        _ => RemoteFileState::Ready,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Document;

    fn sample_document() -> Document {
        Document::new(vec![1, 2, 3], "application/pdf", "sample.pdf")
    }

    #[tokio::test]
    async fn temp_spool_is_removed_on_drop() {
        let spool = TempSpool::write(&sample_document()).await.unwrap();
        let path = spool.path().to_path_buf();
        assert!(path.exists());
        drop(spool);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn temp_spool_is_removed_when_a_later_step_fails() {
        let path = {
            let spool = TempSpool::write(&sample_document()).await.unwrap();
            let path = spool.path().to_path_buf();
            let failing: Result<(), PipelineError> = Err(PipelineError::EmptyDocument);
            assert!(failing.is_err());
            path
        };
        assert!(!path.exists());
    }

    #[test]
    fn state_decoding_matches_the_file_api_lifecycle() {
        assert_eq!(decode_state("PROCESSING"), RemoteFileState::Processing);
        assert_eq!(decode_state("FAILED"), RemoteFileState::Failed);
        assert_eq!(decode_state("ACTIVE"), RemoteFileState::Ready);
        assert_eq!(decode_state("STATE_UNSPECIFIED"), RemoteFileState::Ready);
    }

    #[test]
    fn upload_response_decodes_into_a_handle() {
        let parsed: Value = serde_json::from_str(
            r#"{"file":{"name":"files/abc","uri":"https://files/abc","mimeType":"application/pdf","state":"PROCESSING"}}"#,
        )
        .unwrap();
        let handle = decode_handle(&parsed, "application/pdf");
        assert_eq!(handle.name, "files/abc");
        assert_eq!(handle.state, RemoteFileState::Processing);
    }

    #[tokio::test]
    async fn failed_handle_surfaces_without_polling() {
        let uploader = RemoteFileUploader::new(
            Client::new(),
            "http://127.0.0.1:1",
            "test-key",
            Duration::from_millis(1),
            Duration::from_millis(10),
        );
        let handle = RemoteFileHandle {
            name: "files/abc".to_string(),
            uri: String::new(),
            mime_type: "application/pdf".to_string(),
            state: RemoteFileState::Failed,
        };

        let result = uploader.await_ready(handle).await;
        assert!(matches!(
            result,
            Err(PipelineError::RemoteProcessingFailed(_))
        ));
    }

    #[tokio::test]
    async fn processing_handle_times_out_at_the_configured_bound() {
        let uploader = RemoteFileUploader::new(
            Client::new(),
            "http://127.0.0.1:1",
            "test-key",
            Duration::from_millis(1),
            Duration::ZERO,
        );
        let handle = RemoteFileHandle {
            name: "files/abc".to_string(),
            uri: String::new(),
            mime_type: "application/pdf".to_string(),
            state: RemoteFileState::Processing,
        };

        let result = uploader.await_ready(handle).await;
        assert!(matches!(
            result,
            Err(PipelineError::ProcessingTimeout { .. })
        ));
    }

    #[tokio::test]
    async fn ready_handle_returns_immediately() {
        let uploader = RemoteFileUploader::new(
            Client::new(),
            "http://127.0.0.1:1",
            "test-key",
            Duration::from_millis(1),
            Duration::from_millis(10),
        );
        let handle = RemoteFileHandle {
            name: "files/abc".to_string(),
            uri: "https://files/abc".to_string(),
            mime_type: "application/pdf".to_string(),
            state: RemoteFileState::Ready,
        };

        let ready = uploader.await_ready(handle).await.unwrap();
        assert_eq!(ready.state, RemoteFileState::Ready);
    }
}
