use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One document submitted for ingestion. Lives for a single pipeline run;
/// nothing here is persisted after the call returns.
#[derive(Debug, Clone)]
pub struct Document {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
}

impl Document {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            file_name: file_name.into(),
        }
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_pdf(&self) -> bool {
        self.mime_type == "application/pdf"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProviderId {
    /// Gemini: PDFs and images, inline or via the remote file API.
    #[default]
    CloudMultimodal,
    /// Groq vision models: images only, inline only.
    CloudVisionText,
    /// Ollama on loopback: images only, inline only.
    LocalVisionText,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::CloudMultimodal => "gemini",
            ProviderId::CloudVisionText => "groq",
            ProviderId::LocalVisionText => "ollama",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = PipelineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderId::CloudMultimodal),
            "groq" => Ok(ProviderId::CloudVisionText),
            "ollama" => Ok(ProviderId::LocalVisionText),
            other => Err(PipelineError::UnknownProvider(other.to_string())),
        }
    }
}

/// Canonical structured output every successful ingestion produces.
/// Field names follow the wire contract the extraction prompt requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub full_extraction: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub topic: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// One turn of a caller-owned chat session. The pipeline only reads turns
/// to build prompts; it never stores them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            attachment: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            attachment: None,
        }
    }
}

/// Lifecycle of a document copy held by a backend during async upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteFileState {
    Uploading,
    Processing,
    Ready,
    Failed,
}

/// A backend-side copy of one document, owned by the uploader for the
/// duration of a single ingestion call.
#[derive(Debug, Clone)]
pub struct RemoteFileHandle {
    /// Backend resource name, e.g. `files/abc-123`.
    pub name: String,
    /// URI the generation call references the file by.
    pub uri: String,
    pub mime_type: String,
    pub state: RemoteFileState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_id_round_trips_through_str() {
        for id in [
            ProviderId::CloudMultimodal,
            ProviderId::CloudVisionText,
            ProviderId::LocalVisionText,
        ] {
            assert_eq!(id.as_str().parse::<ProviderId>().unwrap(), id);
        }
    }

    #[test]
    fn unknown_provider_is_a_hard_error() {
        assert!("claude".parse::<ProviderId>().is_err());
    }

    #[test]
    fn default_provider_is_the_multimodal_cloud_backend() {
        assert_eq!(ProviderId::default(), ProviderId::CloudMultimodal);
    }

    #[test]
    fn extraction_result_tolerates_missing_fields() {
        let parsed: ExtractionResult =
            serde_json::from_str(r#"{"summary":"s","full_extraction":"text"}"#).unwrap();
        assert_eq!(parsed.summary, "s");
        assert!(parsed.keywords.is_empty());
        assert!(parsed.subject.is_empty());
    }
}
