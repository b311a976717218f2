pub mod audit;
pub mod capabilities;
pub mod chat;
pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod traits;
pub mod upload;

pub use audit::{
    build_record, content_upload_record, qa_interaction_record, AuditRecord, DataPayload,
    IdentityContext, QaPair, RecordType, UserRole,
};
pub use capabilities::{
    capabilities_for, select_transport, ProviderCapabilities, Transport, CLOUD_MULTIMODAL,
    CLOUD_VISION_TEXT, LOCAL_VISION_TEXT,
};
pub use chat::{truncate_context, ChatOrchestrator};
pub use config::PipelineConfig;
pub use error::PipelineError;
pub use models::{
    ChatRole, ChatTurn, Document, ExtractionResult, ProviderId, RemoteFileHandle, RemoteFileState,
};
pub use normalize::normalize;
pub use pipeline::{build_adapters, IngestionPipeline, SharedAdapter};
pub use prompts::{attachment_prompt, extraction_prompt, tutor_prompt};
pub use providers::{GeminiAdapter, GroqAdapter, OllamaAdapter};
pub use traits::ProviderAdapter;
pub use upload::RemoteFileUploader;
