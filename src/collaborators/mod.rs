//! External collaborators. The triage core only consumes their outputs
//! (findings, text) or hands them finished results (narration, storage);
//! none of them influence the numeric assessment.

pub mod narration;
pub mod sink;
pub mod transcript;
pub mod vision;

pub use narration::{
    describe_pain_map, narrate, pain_map_prompt, report_messages, ChatMessage, ChatRole, MockNarrator,
    NarrativeAssistant, OllamaNarrator, PainPoint,
};
pub use sink::{AssessmentRecord, AssessmentSink, JsonlAssessmentSink, MemorySink};
pub use transcript::{normalize_transcript, FixedTranscriber, Transcriber};
pub use vision::{StaticVisualAnalysis, VisualAnalysis, VisualAnalysisService, VisualFinding};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("Service is not reachable at {0}")]
    ServiceConnection(String),

    #[error("Service returned error (status {status}): {body}")]
    ServiceError { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing failed: {0}")]
    ResponseParsing(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Storage error ({0}): {1}")]
    Storage(String, String),

    #[error("Lock poisoned")]
    LockPoisoned,
}
