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

/// Vision-capable cloud backend speaking the OpenAI chat-completions
/// dialect. Images only; PDFs are rejected before any network call.
pub struct GroqAdapter {
    client: Client,
    endpoint: String,
    api_key: String,
    vision_model: String,
    chat_model: String,
}

impl GroqAdapter {
    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let api_key = config
            .groq_api_key
            .clone()
            .ok_or(PipelineError::ConfigurationMissing("GROQ_API_KEY"))?;

        Ok(Self {
            client: Client::new(),
            endpoint: config.groq_endpoint.clone(),
            api_key,
            vision_model: config.groq_vision_model.clone(),
            chat_model: config.groq_chat_model.clone(),
        })
    }

    async fn complete(&self, model: &str, messages: Value) -> Result<String, PipelineError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": model,
                "messages": messages,
                "stream": false,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(backend_failure("groq", response).await);
        }

        let parsed: Value = response.json().await?;
        parsed
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| PipelineError::BackendCall {
                backend: "groq".to_string(),
                status: None,
                details: "response carried no message content".to_string(),
            })
    }
}

#[async_trait]
impl ProviderAdapter for GroqAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::CloudVisionText
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &capabilities::CLOUD_VISION_TEXT
    }

    async fn extract_raw(&self, document: &Document) -> Result<String, PipelineError> {
        if document.is_pdf() {
            return Err(PipelineError::UnsupportedMediaType {
                provider: "groq".to_string(),
                mime: document.mime_type.clone(),
                detail: "Groq Llama Vision handles images (JPG/PNG); for PDFs use Gemini or convert to images".to_string(),
            });
        }
        capabilities::select_transport(document, self.capabilities())?;
        debug!(file = %document.file_name, "dispatching extraction to groq vision");

        let data_url = format!(
            "data:{};base64,{}",
            document.mime_type,
            STANDARD.encode(&document.bytes)
        );
        let messages = json!([{
            "role": "user",
            "content": [
                { "type": "text", "text": extraction_prompt(&document.file_name) },
                { "type": "image_url", "image_url": { "url": data_url } },
            ],
        }]);

        self.complete(&self.vision_model, messages).await
    }

    async fn chat(&self, turns: &[ChatTurn], prompt: &str) -> Result<String, PipelineError> {
        let mut messages: Vec<Value> = turns
            .iter()
            .map(|turn| json!({ "role": turn.role.as_str(), "content": turn.content }))
            .collect();
        messages.push(json!({ "role": "user", "content": prompt }));

        self.complete(&self.chat_model, Value::Array(messages)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> GroqAdapter {
        let config = PipelineConfig {
            groq_api_key: Some("test-key".to_string()),
            ..Default::default()
        };
        GroqAdapter::from_config(&config).unwrap()
    }

    #[test]
    fn missing_credential_is_a_configuration_error() {
        let result = GroqAdapter::from_config(&PipelineConfig::default());
        assert!(matches!(
            result,
            Err(PipelineError::ConfigurationMissing("GROQ_API_KEY"))
        ));
    }

    #[tokio::test]
    async fn pdf_is_rejected_before_any_network_call() {
        let document = Document::new(vec![1, 2, 3], "application/pdf", "notes.pdf");
        let result = adapter().extract_raw(&document).await;
        assert!(matches!(
            result,
            Err(PipelineError::UnsupportedMediaType { provider, .. }) if provider == "groq"
        ));
    }

    #[tokio::test]
    async fn oversized_image_fails_without_an_upload_path() {
        let document = Document::new(vec![0u8; 5 * 1024 * 1024], "image/png", "big.png");
        let result = adapter().extract_raw(&document).await;
        assert!(matches!(result, Err(PipelineError::UnsupportedSize { .. })));
    }
}
