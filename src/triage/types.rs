use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::enums::Specialty;

// ---------------------------------------------------------------------------
// Predictor seams
// ---------------------------------------------------------------------------

/// Deterministic, always-available predictor over one feature vector.
pub trait Predictor: Send + Sync {
    fn specialty(&self) -> Specialty;

    /// Probability distribution over the specialty's class table.
    fn predict(&self, features: &[f32]) -> Result<Vec<f32>, TriageError>;
}

/// Externally hosted model. May fail or stall; callers bound it with a timeout.
pub trait LearnedPredictor: Send + Sync {
    fn specialty(&self) -> Specialty;

    fn predict<'a>(&'a self, features: &'a [f32]) -> BoxFuture<'a, Result<Vec<f32>, TriageError>>;
}

// ---------------------------------------------------------------------------
// Specialist output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputSource {
    RuleBased,
    Learned,
}

/// One predictor's distribution, tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialistOutput {
    pub specialty: Specialty,
    pub distribution: Vec<f32>,
    pub source: OutputSource,
}

impl SpecialistOutput {
    /// Index and mass of the most likely class, first wins on ties.
    pub fn top_class(&self) -> Option<(usize, f32)> {
        self.distribution
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best, (i, p)| match best {
                Some((_, bp)) if bp >= p => best,
                _ => Some((i, p)),
            })
    }
}

/// Normalize raw model scores into a distribution. Rejects empty,
/// non-finite, negative, or all-zero output.
pub fn normalize_distribution(raw: &[f32]) -> Result<Vec<f32>, TriageError> {
    if raw.is_empty() {
        return Err(TriageError::InvalidDistribution("empty output".into()));
    }
    if raw.iter().any(|p| !p.is_finite() || *p < 0.0) {
        return Err(TriageError::InvalidDistribution(
            "non-finite or negative value".into(),
        ));
    }
    let total: f32 = raw.iter().sum();
    if total <= 0.0 {
        return Err(TriageError::InvalidDistribution("zero mass".into()));
    }
    Ok(raw.iter().map(|p| p / total).collect())
}

// ---------------------------------------------------------------------------
// TriageError
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum TriageError {
    #[error("Risk registry load failed ({0}): {1}")]
    RegistryLoad(String, String),

    #[error("Risk registry parse failed ({0}): {1}")]
    RegistryParse(String, String),

    #[error("Unknown origin group in registry file: {0}")]
    UnknownOrigin(String),

    #[error("Config load failed ({0}): {1}")]
    ConfigLoad(String, String),

    #[error("Config parse failed ({0}): {1}")]
    ConfigParse(String, String),

    #[error("Feature vector for {specialty} has {got} fields, expected {expected}")]
    FeatureLength {
        specialty: Specialty,
        expected: usize,
        got: usize,
    },

    #[error("Model server is not reachable at {0}")]
    ModelConnection(String),

    #[error("Model server returned error (status {status}): {body}")]
    ModelResponse { status: u16, body: String },

    #[error("Model {model} timed out after {timeout_ms}ms")]
    ModelTimeout { model: String, timeout_ms: u64 },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Model response parsing failed: {0}")]
    ResponseParsing(String),

    #[error("Invalid model distribution: {0}")]
    InvalidDistribution(String),
}
