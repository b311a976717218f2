use std::time::Duration;

/// Everything the pipeline needs from the environment, passed in at
/// construction so tests can substitute fakes without touching process
/// state.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Credential for the multimodal cloud backend (Gemini).
    pub google_api_key: Option<String>,
    /// Credential for the vision-capable cloud backend (Groq).
    pub groq_api_key: Option<String>,
    /// Base URL of the local model runtime.
    pub ollama_host: String,

    pub gemini_endpoint: String,
    pub gemini_extract_model: String,
    pub gemini_chat_model: String,
    pub groq_endpoint: String,
    pub groq_vision_model: String,
    pub groq_chat_model: String,
    pub ollama_vision_model: String,
    pub ollama_chat_model: String,

    /// Readiness poll cadence for async uploads.
    pub poll_interval: Duration,
    /// Hard bound on the total readiness wait. Exceeding it is
    /// `ProcessingTimeout`, never a silent spin.
    pub poll_timeout: Duration,

    /// Hard character cut applied to document context in chat prompts.
    pub cloud_context_budget: usize,
    /// Smaller cut for the local runtime's tighter context windows.
    pub local_context_budget: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            google_api_key: None,
            groq_api_key: None,
            ollama_host: "http://127.0.0.1:11434".to_string(),
            gemini_endpoint: "https://generativelanguage.googleapis.com".to_string(),
            gemini_extract_model: "gemini-2.5-flash-lite".to_string(),
            gemini_chat_model: "gemini-2.5-flash".to_string(),
            groq_endpoint: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            groq_vision_model: "llama-3.2-11b-vision-preview".to_string(),
            groq_chat_model: "llama-3.3-70b-versatile".to_string(),
            ollama_vision_model: "llava".to_string(),
            ollama_chat_model: "mistral".to_string(),
            poll_interval: Duration::from_secs(2),
            poll_timeout: Duration::from_secs(120),
            cloud_context_budget: 5_000,
            local_context_budget: 3_000,
        }
    }
}
