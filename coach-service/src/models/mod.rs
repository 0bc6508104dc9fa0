//! Domain models for the coaching service.

pub mod request;
pub mod response;
pub mod style;
pub mod usage;

pub use request::{AnswerRequest, ProcessSubmission, SaveEmailRequest, UploadedAudio, WhisperRequest};
pub use response::{CoachResponse, SaveEmailResponse, WhisperResponse};
pub use style::Style;
pub use usage::UsageKey;
