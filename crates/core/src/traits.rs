use crate::capabilities::ProviderCapabilities;
use crate::error::PipelineError;
use crate::models::{ChatTurn, Document, ProviderId};
use async_trait::async_trait;

/// One backend able to service extraction and chat calls. Implementations
/// own their HTTP client and credentials; they must never leak credentials
/// into returned error text.
#[async_trait]
pub trait ProviderAdapter {
    fn id(&self) -> ProviderId;

    fn capabilities(&self) -> &ProviderCapabilities;

    /// Run the fixed extraction instruction against the backend and return
    /// its raw text response. Transport (inline vs. remote upload) is the
    /// adapter's concern; parsing the response is the caller's.
    async fn extract_raw(&self, document: &Document) -> Result<String, PipelineError>;

    /// Submit a single grounded prompt, with prior turns as history, and
    /// return the backend's free-text answer.
    async fn chat(&self, turns: &[ChatTurn], prompt: &str) -> Result<String, PipelineError>;
}
