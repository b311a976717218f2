use crate::error::PipelineError;
use crate::models::{Document, ProviderId};

/// Static description of what a backend supports. Never mutated at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderCapabilities {
    pub supports_pdf: bool,
    pub supports_async_upload: bool,
    pub inline_byte_limit: u64,
}

const MIB: u64 = 1024 * 1024;

/// Gemini takes PDFs and images inline up to a safe 18 MiB threshold and
/// falls back to the remote file API above it.
pub const CLOUD_MULTIMODAL: ProviderCapabilities = ProviderCapabilities {
    supports_pdf: true,
    supports_async_upload: true,
    inline_byte_limit: 18 * MIB,
};

/// Groq vision models handle images only, sent inline as base64 data URLs.
pub const CLOUD_VISION_TEXT: ProviderCapabilities = ProviderCapabilities {
    supports_pdf: false,
    supports_async_upload: false,
    inline_byte_limit: 4 * MIB,
};

/// Local Ollama vision models: images only, but as a loopback service the
/// inline ceiling is generous.
pub const LOCAL_VISION_TEXT: ProviderCapabilities = ProviderCapabilities {
    supports_pdf: false,
    supports_async_upload: false,
    inline_byte_limit: 32 * MIB,
};

pub fn capabilities_for(provider: ProviderId) -> ProviderCapabilities {
    match provider {
        ProviderId::CloudMultimodal => CLOUD_MULTIMODAL,
        ProviderId::CloudVisionText => CLOUD_VISION_TEXT,
        ProviderId::LocalVisionText => LOCAL_VISION_TEXT,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Inline,
    AsyncUpload,
}

/// Decide how a document reaches the backend. Empty documents fail before
/// any transport decision; oversized documents on a backend without an
/// upload path fail without a network call.
pub fn select_transport(
    document: &Document,
    capabilities: &ProviderCapabilities,
) -> Result<Transport, PipelineError> {
    if document.is_empty() {
        return Err(PipelineError::EmptyDocument);
    }

    if document.len() > capabilities.inline_byte_limit {
        if capabilities.supports_async_upload {
            return Ok(Transport::AsyncUpload);
        }
        return Err(PipelineError::UnsupportedSize {
            size: document.len(),
            limit: capabilities.inline_byte_limit,
        });
    }

    Ok(Transport::Inline)
}
