use crate::models::ExtractionResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordType {
    #[serde(rename = "CONTENT_UPLOAD")]
    ContentUpload,
    #[serde(rename = "QA_INTERACTION")]
    QaInteraction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Teacher,
    Student,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityContext {
    pub user_role: UserRole,
    pub subject: String,
    pub topic: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaPair {
    pub q: String,
    /// Answer text, LaTeX math preserved as-is.
    pub a: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_extraction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qa_pair: Option<QaPair>,
}

/// The structured event handed to the external append-only store after each
/// completed ingestion or chat turn. Built once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub record_type: RecordType,
    pub identity_context: IdentityContext,
    pub data_payload: DataPayload,
    pub search_tags: Vec<String>,
    pub firestore_ready: bool,
    pub timestamp: DateTime<Utc>,
}

/// Assemble a record, stamping the current time. No I/O here; persisting
/// the record is the caller's job.
pub fn build_record(
    record_type: RecordType,
    role: UserRole,
    subject: impl Into<String>,
    topic: impl Into<String>,
    payload: DataPayload,
    tags: Vec<String>,
) -> AuditRecord {
    AuditRecord {
        record_type,
        identity_context: IdentityContext {
            user_role: role,
            subject: subject.into(),
            topic: topic.into(),
        },
        data_payload: payload,
        search_tags: tags,
        firestore_ready: true,
        timestamp: Utc::now(),
    }
}

/// Record for a completed curriculum upload: role defaults to the content
/// owner, tags come from the extracted keywords, and the extraction text is
/// clipped to a 200-character preview.
pub fn content_upload_record(result: &ExtractionResult) -> AuditRecord {
    let subject = if result.subject.is_empty() {
        "General".to_string()
    } else {
        result.subject.clone()
    };
    let topic = if result.topic.is_empty() {
        "Upload".to_string()
    } else {
        result.topic.clone()
    };

    let preview: String = result.full_extraction.chars().take(200).collect();

    build_record(
        RecordType::ContentUpload,
        UserRole::Teacher,
        subject,
        topic,
        DataPayload {
            summary: Some(result.summary.clone()),
            full_extraction: Some(format!("{preview}...")),
            qa_pair: None,
        },
        result.keywords.clone(),
    )
}

/// Record for a completed chat turn: role defaults to the asker.
pub fn qa_interaction_record(question: impl Into<String>, answer: impl Into<String>) -> AuditRecord {
    build_record(
        RecordType::QaInteraction,
        UserRole::Student,
        "StudentDoubt",
        "Direct Upload",
        DataPayload {
            summary: None,
            full_extraction: None,
            qa_pair: Some(QaPair {
                q: question.into(),
                a: answer.into(),
            }),
        },
        vec!["student-upload".to_string()],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_marked_ready_and_timestamped() {
        let before = Utc::now();
        let record = build_record(
            RecordType::ContentUpload,
            UserRole::Teacher,
            "Math",
            "Algebra",
            DataPayload::default(),
            vec!["algebra".to_string()],
        );
        assert!(record.firestore_ready);
        assert!(record.timestamp >= before);
        assert_eq!(record.identity_context.subject, "Math");
    }

    #[test]
    fn record_type_uses_the_wire_names() {
        let json = serde_json::to_string(&RecordType::QaInteraction).unwrap();
        assert_eq!(json, "\"QA_INTERACTION\"");
    }

    #[test]
    fn content_upload_record_clips_the_extraction_preview() {
        let result = ExtractionResult {
            summary: "s".to_string(),
            full_extraction: "x".repeat(500),
            keywords: vec!["physics".to_string()],
            subject: "Physics".to_string(),
            topic: "Motion".to_string(),
        };

        let record = content_upload_record(&result);
        let preview = record.data_payload.full_extraction.unwrap();
        assert_eq!(preview.len(), 203);
        assert!(preview.ends_with("..."));
        assert_eq!(record.search_tags, vec!["physics"]);
    }

    #[test]
    fn qa_record_defaults_to_the_asker() {
        let record = qa_interaction_record("what is osmosis?", "diffusion of water");
        assert_eq!(record.identity_context.user_role, UserRole::Student);
        assert_eq!(record.record_type, RecordType::QaInteraction);
        assert_eq!(record.data_payload.qa_pair.unwrap().q, "what is osmosis?");
    }
}
