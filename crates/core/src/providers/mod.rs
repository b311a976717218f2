use crate::error::PipelineError;

pub mod gemini;
pub mod groq;
pub mod ollama;

pub use gemini::GeminiAdapter;
pub use groq::GroqAdapter;
pub use ollama::OllamaAdapter;

/// Wrap a non-2xx backend response into the uniform failure kind. The body
/// is carried for diagnostics; credentials live in headers only and never
/// appear here.
pub(crate) async fn backend_failure(backend: &str, response: reqwest::Response) -> PipelineError {
    let status = response.status().as_u16();
    let details = response
        .text()
        .await
        .unwrap_or_else(|error| format!("unreadable error body: {error}"));
    PipelineError::BackendCall {
        backend: backend.to_string(),
        status: Some(status),
        details,
    }
}
