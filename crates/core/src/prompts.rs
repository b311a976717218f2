/// Fixed extraction instruction sent with every document. The backend is
/// asked for the canonical five-field JSON shape; whatever actually comes
/// back goes through the normalizer.
pub fn extraction_prompt(file_name: &str) -> String {
    format!(
        "You are an Advanced Educational Data Agent (AEDA).\n\
         Analyze the attached academic document ({file_name}).\n\
         \n\
         Protocol:\n\
         1. EXTRACT: Capture the full text content.\n\
         2. DIAGRAMS: Describe any diagrams/graphs in detail (visual to text).\n\
         3. SUMMARY: Provide a concise executive summary.\n\
         4. KEYWORDS: Identify the top 5 subject keywords.\n\
         5. FORMAT: Return strict JSON compatible with this structure:\n\
            {{ \"summary\": string, \"full_extraction\": string, \"keywords\": string[], \"subject\": string, \"topic\": string }}\n\
         \n\
         Ensure all math is in LaTeX format (e.g. $E=mc^2$)."
    )
}

/// Tutor system prompt grounding the answer in (already truncated)
/// document context.
pub fn tutor_prompt(context: &str, question: &str) -> String {
    format!(
        "Pretend you are an expert tutor.\n\
         Context from uploaded document: \"\"\"{context}...\"\"\"\n\
         \n\
         Student Question: {question}\n\
         \n\
         Task:\n\
         - Answer the student's question based PRIMARILY on the context.\n\
         - If the question asks for \"PYQ\" (Previous Year Questions), generate 3 relevant practice questions.\n\
         - If the question asks for \"Notes\", generate bulleted revision notes.\n\
         - Always cite the document.\n\
         - Use LaTeX for math."
    )
}

/// Frame a chat question around a freshly ingested attachment.
pub fn attachment_prompt(file_name: &str, extraction: Option<&str>, question: &str) -> String {
    match extraction {
        Some(content) => format!(
            "[User attached a file named {file_name}. Content: {content}]\n\nQuestion: {question}"
        ),
        None => format!(
            "[User attached a file named {file_name} but processing failed]. Question: {question}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_prompt_names_the_document_and_the_shape() {
        let prompt = extraction_prompt("algebra.pdf");
        assert!(prompt.contains("algebra.pdf"));
        assert!(prompt.contains("\"full_extraction\""));
        assert!(prompt.contains("LaTeX"));
    }

    #[test]
    fn attachment_prompt_distinguishes_failed_processing() {
        let ok = attachment_prompt("hw.png", Some("x = 2"), "is this right?");
        assert!(ok.contains("Content: x = 2"));
        let failed = attachment_prompt("hw.png", None, "is this right?");
        assert!(failed.contains("processing failed"));
    }
}
