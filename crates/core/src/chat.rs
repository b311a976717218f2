use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::models::{ChatTurn, ProviderId};
use crate::pipeline::{build_adapters, resolve, SharedAdapter};
use crate::prompts::tutor_prompt;
use std::collections::HashMap;
use tracing::info;

/// Builds a grounded tutor prompt from prior turns plus document context
/// and dispatches it to the selected backend's chat operation.
pub struct ChatOrchestrator {
    adapters: HashMap<ProviderId, SharedAdapter>,
    cloud_context_budget: usize,
    local_context_budget: usize,
}

impl ChatOrchestrator {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            adapters: build_adapters(config),
            cloud_context_budget: config.cloud_context_budget,
            local_context_budget: config.local_context_budget,
        }
    }

    /// Construct from explicit adapters; tests inject fakes here.
    pub fn with_adapters(adapters: Vec<SharedAdapter>, config: &PipelineConfig) -> Self {
        Self {
            adapters: adapters
                .into_iter()
                .map(|adapter| (adapter.id(), adapter))
                .collect(),
            cloud_context_budget: config.cloud_context_budget,
            local_context_budget: config.local_context_budget,
        }
    }

    pub async fn answer(
        &self,
        session: &[ChatTurn],
        new_message: &str,
        document_context: &str,
        provider: Option<ProviderId>,
    ) -> Result<String, PipelineError> {
        let adapter = resolve(&self.adapters, provider)?;

        let budget = match adapter.id() {
            ProviderId::LocalVisionText => self.local_context_budget,
            _ => self.cloud_context_budget,
        };
        let context = truncate_context(document_context, budget);

        info!(
            provider = %adapter.id(),
            turns = session.len(),
            context_chars = context.len(),
            "dispatching chat turn"
        );

        let prompt = tutor_prompt(&context, new_message);
        adapter.chat(session, &prompt).await
    }
}

/// Hard character cut, not token-aware summarization. A known
/// simplification: the tail of long documents is simply not seen.
pub fn truncate_context(context: &str, budget: usize) -> String {
    context.chars().take(budget).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{ProviderCapabilities, CLOUD_MULTIMODAL, LOCAL_VISION_TEXT};
    use crate::models::Document;
    use crate::traits::ProviderAdapter;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    struct RecordingAdapter {
        id: ProviderId,
        capabilities: ProviderCapabilities,
        seen_prompts: Mutex<Vec<String>>,
    }

    impl RecordingAdapter {
        fn new(id: ProviderId, capabilities: ProviderCapabilities) -> Arc<Self> {
            Arc::new(Self {
                id,
                capabilities,
                seen_prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ProviderAdapter for RecordingAdapter {
        fn id(&self) -> ProviderId {
            self.id
        }

        fn capabilities(&self) -> &ProviderCapabilities {
            &self.capabilities
        }

        async fn extract_raw(&self, _document: &Document) -> Result<String, PipelineError> {
            Ok(String::new())
        }

        async fn chat(&self, _turns: &[ChatTurn], prompt: &str) -> Result<String, PipelineError> {
            self.seen_prompts.lock().unwrap().push(prompt.to_string());
            Ok("answer".to_string())
        }
    }

    #[test]
    fn truncation_is_a_hard_character_cut() {
        let context = "a".repeat(6_000);
        assert_eq!(truncate_context(&context, 5_000).len(), 5_000);
        assert_eq!(truncate_context("short", 5_000), "short");
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let context = "é".repeat(10);
        assert_eq!(truncate_context(&context, 4).chars().count(), 4);
    }

    #[tokio::test]
    async fn cloud_backend_gets_the_larger_context_budget() {
        let adapter = RecordingAdapter::new(ProviderId::CloudMultimodal, CLOUD_MULTIMODAL);
        let orchestrator =
            ChatOrchestrator::with_adapters(vec![adapter.clone()], &PipelineConfig::default());

        let context = "x".repeat(9_000);
        orchestrator
            .answer(&[], "Explain the diagram", &context, None)
            .await
            .unwrap();

        let prompts = adapter.seen_prompts.lock().unwrap();
        assert!(prompts[0].contains(&"x".repeat(5_000)));
        assert!(!prompts[0].contains(&"x".repeat(5_001)));
        assert!(prompts[0].contains("Explain the diagram"));
    }

    #[tokio::test]
    async fn local_backend_gets_the_smaller_context_budget() {
        let adapter = RecordingAdapter::new(ProviderId::LocalVisionText, LOCAL_VISION_TEXT);
        let orchestrator =
            ChatOrchestrator::with_adapters(vec![adapter.clone()], &PipelineConfig::default());

        let context = "x".repeat(9_000);
        orchestrator
            .answer(&[], "Summarize", &context, Some(ProviderId::LocalVisionText))
            .await
            .unwrap();

        let prompts = adapter.seen_prompts.lock().unwrap();
        assert!(prompts[0].contains(&"x".repeat(3_000)));
        assert!(!prompts[0].contains(&"x".repeat(3_001)));
    }

    #[tokio::test]
    async fn unconfigured_backend_is_a_configuration_error() {
        let orchestrator = ChatOrchestrator::with_adapters(vec![], &PipelineConfig::default());
        let result = orchestrator.answer(&[], "hello", "", None).await;
        assert!(matches!(
            result,
            Err(PipelineError::ConfigurationMissing(_))
        ));
    }
}
