use crate::capabilities::{self, ProviderCapabilities, Transport};
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::models::{ChatRole, ChatTurn, Document, ProviderId};
use crate::prompts::extraction_prompt;
use crate::providers::backend_failure;
use crate::traits::ProviderAdapter;
use crate::upload::RemoteFileUploader;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

/// Multimodal cloud backend. Takes PDFs and images; documents over the
/// inline ceiling go through the remote file API with a bounded readiness
/// poll.
pub struct GeminiAdapter {
    client: Client,
    endpoint: String,
    api_key: String,
    extract_model: String,
    chat_model: String,
    uploader: RemoteFileUploader,
}

impl GeminiAdapter {
    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let api_key = config
            .google_api_key
            .clone()
            .ok_or(PipelineError::ConfigurationMissing("GOOGLE_API_KEY"))?;

        let client = Client::new();
        let uploader = RemoteFileUploader::new(
            client.clone(),
            config.gemini_endpoint.clone(),
            api_key.clone(),
            config.poll_interval,
            config.poll_timeout,
        );

        Ok(Self {
            client,
            endpoint: config.gemini_endpoint.clone(),
            api_key,
            extract_model: config.gemini_extract_model.clone(),
            chat_model: config.gemini_chat_model.clone(),
            uploader,
        })
    }

    async fn generate(&self, model: &str, contents: Value) -> Result<String, PipelineError> {
        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.endpoint, model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&json!({ "contents": contents }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(backend_failure("gemini", response).await);
        }

        let parsed: Value = response.json().await?;
        parsed
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| PipelineError::BackendCall {
                backend: "gemini".to_string(),
                status: None,
                details: "response carried no candidate text".to_string(),
            })
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::CloudMultimodal
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &capabilities::CLOUD_MULTIMODAL
    }

    async fn extract_raw(&self, document: &Document) -> Result<String, PipelineError> {
        let transport = capabilities::select_transport(document, self.capabilities())?;
        debug!(file = %document.file_name, ?transport, "dispatching extraction to gemini");

        let document_part = match transport {
            Transport::Inline => json!({
                "inline_data": {
                    "mime_type": document.mime_type,
                    "data": STANDARD.encode(&document.bytes),
                }
            }),
            Transport::AsyncUpload => {
                let handle = self.uploader.upload(document).await?;
                let ready = self.uploader.await_ready(handle).await?;
                json!({
                    "file_data": {
                        "mime_type": ready.mime_type,
                        "file_uri": ready.uri,
                    }
                })
            }
        };

        let contents = json!([{
            "role": "user",
            "parts": [
                { "text": extraction_prompt(&document.file_name) },
                document_part,
            ],
        }]);

        self.generate(&self.extract_model, contents).await
    }

    async fn chat(&self, turns: &[ChatTurn], prompt: &str) -> Result<String, PipelineError> {
        let mut contents: Vec<Value> = turns
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    ChatRole::User => "user",
                    ChatRole::Assistant => "model",
                };
                json!({ "role": role, "parts": [{ "text": turn.content }] })
            })
            .collect();
        contents.push(json!({ "role": "user", "parts": [{ "text": prompt }] }));

        self.generate(&self.chat_model, Value::Array(contents)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_is_a_configuration_error() {
        let config = PipelineConfig::default();
        let result = GeminiAdapter::from_config(&config);
        assert!(matches!(
            result,
            Err(PipelineError::ConfigurationMissing("GOOGLE_API_KEY"))
        ));
    }

    #[test]
    fn adapter_reports_multimodal_capabilities() {
        let config = PipelineConfig {
            google_api_key: Some("test-key".to_string()),
            ..Default::default()
        };
        let adapter = GeminiAdapter::from_config(&config).unwrap();
        assert!(adapter.capabilities().supports_pdf);
        assert!(adapter.capabilities().supports_async_upload);
    }
}
