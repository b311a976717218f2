use crate::capabilities::{self, ProviderCapabilities};
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::models::{ChatTurn, Document, ProviderId};
use crate::prompts::extraction_prompt;
use crate::providers::backend_failure;
use crate::traits::ProviderAdapter;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

/// Local model runtime on loopback. No credential; images only. The vision
/// call asks for JSON-formatted output where the runtime supports it.
pub struct OllamaAdapter {
    client: Client,
    host: String,
    vision_model: String,
    chat_model: String,
}

impl OllamaAdapter {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            client: Client::new(),
            host: config.ollama_host.clone(),
            vision_model: config.ollama_vision_model.clone(),
            chat_model: config.ollama_chat_model.clone(),
        }
    }
}

#[async_trait]
impl ProviderAdapter for OllamaAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::LocalVisionText
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &capabilities::LOCAL_VISION_TEXT
    }

    async fn extract_raw(&self, document: &Document) -> Result<String, PipelineError> {
        if document.is_pdf() {
            return Err(PipelineError::UnsupportedMediaType {
                provider: "ollama".to_string(),
                mime: document.mime_type.clone(),
                detail: "local vision models handle images (JPG/PNG) only; for PDFs use Gemini or convert to images".to_string(),
            });
        }
        capabilities::select_transport(document, self.capabilities())?;
        debug!(file = %document.file_name, model = %self.vision_model, "dispatching extraction to ollama");

        let response = self
            .client
            .post(format!("{}/api/generate", self.host))
            .json(&json!({
                "model": self.vision_model,
                "prompt": extraction_prompt(&document.file_name),
                "images": [STANDARD.encode(&document.bytes)],
                "stream": false,
                "format": "json",
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(backend_failure("ollama", response).await);
        }

        let parsed: Value = response.json().await?;
        parsed
            .pointer("/response")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| PipelineError::BackendCall {
                backend: "ollama".to_string(),
                status: None,
                details: "generate response carried no text; is the vision model pulled?"
                    .to_string(),
            })
    }

    async fn chat(&self, turns: &[ChatTurn], prompt: &str) -> Result<String, PipelineError> {
        let mut messages: Vec<Value> = turns
            .iter()
            .map(|turn| json!({ "role": turn.role.as_str(), "content": turn.content }))
            .collect();
        messages.push(json!({ "role": "user", "content": prompt }));

        let response = self
            .client
            .post(format!("{}/api/chat", self.host))
            .json(&json!({
                "model": self.chat_model,
                "messages": messages,
                "stream": false,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(backend_failure("ollama", response).await);
        }

        let parsed: Value = response.json().await?;
        parsed
            .pointer("/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| PipelineError::BackendCall {
                backend: "ollama".to_string(),
                status: None,
                details: "chat response carried no message content".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pdf_is_rejected_before_any_network_call() {
        let adapter = OllamaAdapter::from_config(&PipelineConfig::default());
        let document = Document::new(vec![1, 2, 3], "application/pdf", "notes.pdf");
        let result = adapter.extract_raw(&document).await;
        assert!(matches!(
            result,
            Err(PipelineError::UnsupportedMediaType { provider, .. }) if provider == "ollama"
        ));
    }

    #[test]
    fn adapter_needs_no_credential() {
        let adapter = OllamaAdapter::from_config(&PipelineConfig::default());
        assert_eq!(adapter.id(), ProviderId::LocalVisionText);
        assert!(!adapter.capabilities().supports_async_upload);
    }
}
