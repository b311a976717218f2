use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("document is empty (0 bytes)")]
    EmptyDocument,

    #[error("{provider} does not accept {mime}: {detail}")]
    UnsupportedMediaType {
        provider: String,
        mime: String,
        detail: String,
    },

    #[error("document of {size} bytes exceeds inline limit of {limit} and backend has no upload path")]
    UnsupportedSize { size: u64, limit: u64 },

    #[error("remote processing failed: {0}")]
    RemoteProcessingFailed(String),

    #[error("remote file still processing after {waited_secs}s")]
    ProcessingTimeout { waited_secs: u64 },

    #[error("{backend} call failed{}: {details}", status_suffix(.status))]
    BackendCall {
        backend: String,
        status: Option<u16>,
        details: String,
    },

    #[error("missing configuration: {0}")]
    ConfigurationMissing(&'static str),

    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (status {code})"),
        None => String::new(),
    }
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_failures_render_the_status_when_known() {
        let with_status = PipelineError::BackendCall {
            backend: "groq".to_string(),
            status: Some(429),
            details: "rate limited".to_string(),
        };
        assert_eq!(
            with_status.to_string(),
            "groq call failed (status 429): rate limited"
        );

        let without_status = PipelineError::BackendCall {
            backend: "gemini".to_string(),
            status: None,
            details: "response carried no candidate text".to_string(),
        };
        assert_eq!(
            without_status.to_string(),
            "gemini call failed: response carried no candidate text"
        );
    }
}
