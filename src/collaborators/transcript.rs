use futures_util::future::BoxFuture;

use super::CollaboratorError;

/// Speech-to-text service. The core only ever sees the resulting text.
pub trait Transcriber: Send + Sync {
    fn transcribe<'a>(&'a self, audio: &'a [u8]) -> BoxFuture<'a, Result<String, CollaboratorError>>;
}

/// Collapse whitespace and strip control characters from a raw transcript.
pub fn normalize_transcript(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| word.chars().filter(|c| !c.is_control()).collect::<String>())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns a fixed transcript regardless of input.
pub struct FixedTranscriber {
    text: String,
}

impl FixedTranscriber {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

impl Transcriber for FixedTranscriber {
    fn transcribe<'a>(&'a self, _audio: &'a [u8]) -> BoxFuture<'a, Result<String, CollaboratorError>> {
        Box::pin(async move { Ok(normalize_transcript(&self.text)) })
    }
}
