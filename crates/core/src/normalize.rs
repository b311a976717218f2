use crate::models::ExtractionResult;
use regex::Regex;
use std::sync::OnceLock;
use tracing::warn;

/// Parse a backend's raw text response into the canonical shape.
///
/// Locates the first-`{`-to-last-`}` span and tries it as JSON. Backends
/// routinely wrap their JSON in prose or fences, so this is deliberately
/// best-effort: when nothing parses, the caller still gets a structured
/// result with the raw text carried in `full_extraction`. Pure function,
/// no I/O.
pub fn normalize(raw_text: &str, file_name: &str) -> ExtractionResult {
    if let Some(candidate) = json_span(raw_text) {
        match serde_json::from_str::<ExtractionResult>(candidate) {
            Ok(result) => return result,
            Err(error) => {
                warn!(%error, "backend response had a brace span that did not parse, degrading");
            }
        }
    }

    fallback(raw_text, file_name)
}

fn json_span(text: &str) -> Option<&str> {
    // Greedy span from the first opening brace to the last closing brace.
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("static pattern"));
    pattern.find(text).map(|found| found.as_str())
}

fn fallback(raw_text: &str, file_name: &str) -> ExtractionResult {
    ExtractionResult {
        summary: "Extracted Content".to_string(),
        full_extraction: raw_text.to_string(),
        keywords: vec!["Document".to_string(), "General".to_string()],
        subject: "General".to_string(),
        topic: file_name.to_string(),
    }
}
