//! Inbound request payloads.
//!
//! Clients have shipped with both camelCase and snake_case field names over
//! time, so every identity field accepts either spelling.

use serde::Deserialize;
use validator::Validate;

/// JSON body of `POST /api/answer`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnswerRequest {
    #[serde(default)]
    pub question: Option<String>,

    #[serde(default)]
    pub context: Option<String>,

    #[serde(default, alias = "workHistory")]
    pub work_history: Option<String>,

    #[serde(default)]
    pub style: Option<String>,

    #[serde(default, rename = "deviceId", alias = "device_id")]
    pub device_id: Option<String>,

    #[serde(default, rename = "userEmail", alias = "user_email", alias = "email")]
    pub user_email: Option<String>,
}

/// JSON body of `POST /api/whisper`: one chunk of live transcript.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WhisperRequest {
    #[serde(default)]
    pub transcript_chunk: Option<String>,
}

/// JSON body of `POST /save_email`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SaveEmailRequest {
    #[serde(rename = "deviceId", alias = "device_id")]
    #[validate(length(min = 1, message = "deviceId must not be empty"))]
    pub device_id: String,

    #[serde(rename = "userEmail", alias = "user_email", alias = "email")]
    #[validate(email(message = "userEmail must be a valid email address"))]
    pub user_email: String,
}

/// An audio clip received as a multipart file part.
#[derive(Debug, Clone)]
pub struct UploadedAudio {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

impl UploadedAudio {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Multipart body of `POST /process` and `POST /process_audio`.
#[derive(Debug, Clone, Default)]
pub struct ProcessSubmission {
    pub audio: Option<UploadedAudio>,
    pub question: Option<String>,
    pub device_id: Option<String>,
    pub user_email: Option<String>,
    pub context: Option<String>,
    pub work_history: Option<String>,
    pub style: Option<String>,
}

impl ProcessSubmission {
    /// Part names that carry the audio file.
    pub const AUDIO_FIELDS: [&'static str; 2] = ["audio", "file"];

    pub fn is_audio_field(name: &str) -> bool {
        Self::AUDIO_FIELDS.contains(&name)
    }

    /// Record a text part. Returns `false` for names this endpoint ignores.
    ///
    /// When a client sends both spellings of a field, the first non-blank one wins.
    pub fn set_text_field(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "question" | "text" => &mut self.question,
            "deviceId" | "device_id" => &mut self.device_id,
            "userEmail" | "user_email" | "email" => &mut self.user_email,
            "context" => &mut self.context,
            "work_history" | "workHistory" => &mut self.work_history,
            "style" => &mut self.style,
            _ => return false,
        };

        if slot.as_deref().map_or(true, |v| v.trim().is_empty()) {
            *slot = Some(value);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn answer_request_accepts_both_spellings() {
        let camel: AnswerRequest = serde_json::from_value(json!({
            "question": "Tell me about yourself",
            "deviceId": "dev-1",
            "userEmail": "a@b.co",
            "workHistory": "5y Rust"
        }))
        .unwrap();
        assert_eq!(camel.device_id.as_deref(), Some("dev-1"));
        assert_eq!(camel.user_email.as_deref(), Some("a@b.co"));
        assert_eq!(camel.work_history.as_deref(), Some("5y Rust"));

        let snake: AnswerRequest = serde_json::from_value(json!({
            "question": "Why us?",
            "device_id": "dev-2",
            "user_email": "c@d.co",
            "work_history": "PM"
        }))
        .unwrap();
        assert_eq!(snake.device_id.as_deref(), Some("dev-2"));
        assert_eq!(snake.user_email.as_deref(), Some("c@d.co"));
    }

    #[test]
    fn answer_request_tolerates_missing_question() {
        let req: AnswerRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.question.is_none());
    }

    #[test]
    fn save_email_validation() {
        let ok: SaveEmailRequest = serde_json::from_value(json!({
            "deviceId": "dev-1",
            "userEmail": "jane@example.com"
        }))
        .unwrap();
        assert!(ok.validate().is_ok());

        let bad = SaveEmailRequest {
            device_id: String::new(),
            user_email: "not-an-email".to_string(),
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("device_id"));
        assert!(fields.contains_key("user_email"));
    }

    #[test]
    fn multipart_field_fallback() {
        let mut submission = ProcessSubmission::default();
        assert!(submission.set_text_field("device_id", "dev-9".to_string()));
        assert!(submission.set_text_field("workHistory", "Barista".to_string()));
        assert!(submission.set_text_field("text", "What is your weakness?".to_string()));
        assert!(!submission.set_text_field("unexpected", "x".to_string()));

        assert_eq!(submission.device_id.as_deref(), Some("dev-9"));
        assert_eq!(submission.work_history.as_deref(), Some("Barista"));
        assert_eq!(submission.question.as_deref(), Some("What is your weakness?"));
    }

    #[test]
    fn first_non_blank_spelling_wins() {
        let mut submission = ProcessSubmission::default();
        submission.set_text_field("deviceId", "".to_string());
        submission.set_text_field("device_id", "dev-7".to_string());
        submission.set_text_field("deviceId", "dev-8".to_string());
        assert_eq!(submission.device_id.as_deref(), Some("dev-7"));
    }

    #[test]
    fn audio_field_names() {
        assert!(ProcessSubmission::is_audio_field("audio"));
        assert!(ProcessSubmission::is_audio_field("file"));
        assert!(!ProcessSubmission::is_audio_field("question"));
    }
}
