//! Human-readable report narration through a generative assistant.
//!
//! The assistant only ever sees a finished `TriagePrediction`; its text is
//! presentation and never feeds back into the assessment.

use std::time::Duration;

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::models::TriagePrediction;

use super::CollaboratorError;

const REPORT_SYSTEM_PROMPT: &str = "You are assisting a humanitarian clinic. \
Rewrite the structured triage result you are given as a short plain-language summary \
for a clinician. Do not add diagnoses, probabilities or treatments that are not in the input. \
State the urgency level first.";

const PAIN_MAP_TEMPLATE: &str = "The patient marked the following pain locations on a body map. \
Each entry has a body region, an intensity from 0 to 10 and an optional description of the pain.\n\n\
PAIN MAP (JSON):\n{pain_map}\n\n\
Describe the pattern in two or three sentences for the clinician. \
Mention the most intense region first. Do not suggest a diagnosis.";

// ---------------------------------------------------------------------------
// Message types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// One marked region on a pain map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PainPoint {
    pub region: String,
    pub intensity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Prompt/response text service.
pub trait NarrativeAssistant: Send + Sync {
    /// Role-tagged conversation in, reply text out.
    fn complete<'a>(&'a self, messages: &'a [ChatMessage]) -> BoxFuture<'a, Result<String, CollaboratorError>>;
}

// ---------------------------------------------------------------------------
// Prompt builders
// ---------------------------------------------------------------------------

/// System and user messages asking for a clinician summary of `prediction`.
pub fn report_messages(prediction: &TriagePrediction) -> Result<Vec<ChatMessage>, CollaboratorError> {
    let payload = serde_json::to_string_pretty(prediction)
        .map_err(|e| CollaboratorError::Serialization(e.to_string()))?;
    Ok(vec![
        ChatMessage::system(REPORT_SYSTEM_PROMPT),
        ChatMessage::user(format!("TRIAGE RESULT (JSON):\n{payload}")),
    ])
}

/// Single instruction prompt embedding the serialized pain map.
/// Intensities are clamped to 0-10 before serialization.
pub fn pain_map_prompt(points: &[PainPoint]) -> Result<String, CollaboratorError> {
    let clamped: Vec<PainPoint> = points
        .iter()
        .map(|p| PainPoint {
            intensity: if p.intensity.is_finite() {
                p.intensity.clamp(0.0, 10.0)
            } else {
                0.0
            },
            ..p.clone()
        })
        .collect();
    let json = serde_json::to_string_pretty(&clamped)
        .map_err(|e| CollaboratorError::Serialization(e.to_string()))?;
    Ok(PAIN_MAP_TEMPLATE.replace("{pain_map}", &json))
}

/// Narrate a finished assessment.
pub async fn narrate(
    assistant: &dyn NarrativeAssistant,
    prediction: &TriagePrediction,
) -> Result<String, CollaboratorError> {
    let messages = report_messages(prediction)?;
    let text = assistant.complete(&messages).await?;
    Ok(text.trim().to_string())
}

/// Describe a pain map. The prompt goes out as a single user message.
pub async fn describe_pain_map(
    assistant: &dyn NarrativeAssistant,
    points: &[PainPoint],
) -> Result<String, CollaboratorError> {
    let messages = [ChatMessage::user(pain_map_prompt(points)?)];
    let text = assistant.complete(&messages).await?;
    Ok(text.trim().to_string())
}

// ---------------------------------------------------------------------------
// Ollama adapter
// ---------------------------------------------------------------------------

/// Request body for Ollama /api/chat
#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

/// Response body from Ollama /api/chat
#[derive(Deserialize)]
struct OllamaChatResponse {
    message: ChatMessage,
}

/// Narrative assistant backed by a local Ollama instance.
pub struct OllamaNarrator {
    base_url: String,
    model: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl OllamaNarrator {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, CollaboratorError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CollaboratorError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }

    /// Ollama at localhost:11434 with a 2-minute timeout.
    pub fn default_local(model: &str) -> Result<Self, CollaboratorError> {
        Self::new("http://localhost:11434", model, 120)
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, CollaboratorError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = OllamaChatRequest {
            model: &self.model,
            messages,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    CollaboratorError::ServiceConnection(self.base_url.clone())
                } else if e.is_timeout() {
                    CollaboratorError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    CollaboratorError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::ServiceError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::ResponseParsing(e.to_string()))?;

        Ok(parsed.message.content)
    }
}

impl NarrativeAssistant for OllamaNarrator {
    fn complete<'a>(&'a self, messages: &'a [ChatMessage]) -> BoxFuture<'a, Result<String, CollaboratorError>> {
        Box::pin(self.chat(messages))
    }
}

/// Mock assistant returning a configurable response.
pub struct MockNarrator {
    response: String,
}

impl MockNarrator {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
        }
    }
}

impl NarrativeAssistant for MockNarrator {
    fn complete<'a>(&'a self, _messages: &'a [ChatMessage]) -> BoxFuture<'a, Result<String, CollaboratorError>> {
        Box::pin(async move { Ok(self.response.clone()) })
    }
}
