use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::models::{Document, ExtractionResult, ProviderId};
use crate::normalize::normalize;
use crate::providers::{GeminiAdapter, GroqAdapter, OllamaAdapter};
use crate::traits::ProviderAdapter;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

pub type SharedAdapter = Arc<dyn ProviderAdapter + Send + Sync>;

/// Build one adapter per backend whose configuration is complete. A backend
/// with a missing credential is simply absent; selecting it later surfaces
/// the configuration error instead of a silent no-op.
pub fn build_adapters(config: &PipelineConfig) -> HashMap<ProviderId, SharedAdapter> {
    let mut adapters: HashMap<ProviderId, SharedAdapter> = HashMap::new();

    match GeminiAdapter::from_config(config) {
        Ok(adapter) => {
            adapters.insert(ProviderId::CloudMultimodal, Arc::new(adapter));
        }
        Err(error) => warn!(%error, "gemini backend unavailable"),
    }
    match GroqAdapter::from_config(config) {
        Ok(adapter) => {
            adapters.insert(ProviderId::CloudVisionText, Arc::new(adapter));
        }
        Err(error) => warn!(%error, "groq backend unavailable"),
    }
    adapters.insert(
        ProviderId::LocalVisionText,
        Arc::new(OllamaAdapter::from_config(config)),
    );

    adapters
}

pub(crate) fn resolve<'registry>(
    adapters: &'registry HashMap<ProviderId, SharedAdapter>,
    provider: Option<ProviderId>,
) -> Result<&'registry SharedAdapter, PipelineError> {
    let id = provider.unwrap_or_default();
    adapters.get(&id).ok_or(match id {
        ProviderId::CloudMultimodal => PipelineError::ConfigurationMissing("GOOGLE_API_KEY"),
        ProviderId::CloudVisionText => PipelineError::ConfigurationMissing("GROQ_API_KEY"),
        ProviderId::LocalVisionText => PipelineError::ConfigurationMissing("ollama host"),
    })
}

/// Top-level ingestion orchestrator: validate, pick a backend, extract,
/// normalize. Normalization never fails, so a reachable backend always
/// yields a structured result.
pub struct IngestionPipeline {
    adapters: HashMap<ProviderId, SharedAdapter>,
}

impl IngestionPipeline {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            adapters: build_adapters(config),
        }
    }

    /// Construct from explicit adapters; tests inject fakes here.
    pub fn with_adapters(adapters: Vec<SharedAdapter>) -> Self {
        Self {
            adapters: adapters
                .into_iter()
                .map(|adapter| (adapter.id(), adapter))
                .collect(),
        }
    }

    pub async fn ingest(
        &self,
        document: &Document,
        provider: Option<ProviderId>,
    ) -> Result<ExtractionResult, PipelineError> {
        if document.is_empty() {
            return Err(PipelineError::EmptyDocument);
        }

        let adapter = resolve(&self.adapters, provider)?;
        info!(
            provider = %adapter.id(),
            file = %document.file_name,
            bytes = document.len(),
            "ingesting document"
        );

        if document.is_pdf() && !adapter.capabilities().supports_pdf {
            return Err(PipelineError::UnsupportedMediaType {
                provider: adapter.id().to_string(),
                mime: document.mime_type.clone(),
                detail: "backend does not accept PDF documents".to_string(),
            });
        }

        let raw = adapter.extract_raw(document).await?;
        Ok(normalize(&raw, &document.file_name))
    }
}
