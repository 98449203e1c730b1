//! Learned-model path: HTTP-hosted predictors behind a bounded timeout,
//! with per-specialty fallback to the rule predictors.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{join_all, BoxFuture};
use serde::{Deserialize, Serialize};

use crate::config::TriageConfig;
use crate::models::enums::Specialty;

use super::confidence::from_validator;
use super::ensemble::{rule_output, EnsembleReport, SPECIALTIES};
use super::features::FeatureSet;
use super::predictors::class_table;
use super::types::{
    normalize_distribution, LearnedPredictor, OutputSource, SpecialistOutput, TriageError,
};

/// Model name the validator is served under.
pub const VALIDATOR_MODEL: &str = "confidence_validator";

/// Binary validator over the primary distribution: `[p_unreliable, p_reliable]`.
pub trait ConfidenceValidator: Send + Sync {
    fn validate<'a>(&'a self, primary: &'a [f32]) -> BoxFuture<'a, Result<Vec<f32>, TriageError>>;
}

// ---------------------------------------------------------------------------
// HTTP model endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /v1/models/<name>:predict`
#[derive(Serialize)]
struct PredictRequest<'a> {
    instances: [&'a [f32]; 1],
}

/// Response body from `POST /v1/models/<name>:predict`
#[derive(Deserialize)]
struct PredictResponse {
    predictions: Vec<Vec<f32>>,
}

/// One named model on a prediction server.
struct ModelEndpoint {
    base_url: String,
    model_name: String,
    client: reqwest::Client,
    timeout_ms: u64,
}

impl ModelEndpoint {
    fn new(base_url: &str, model_name: &str, timeout: Duration) -> Result<Self, TriageError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TriageError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model_name: model_name.to_string(),
            client,
            timeout_ms: timeout.as_millis() as u64,
        })
    }

    fn url(&self) -> String {
        format!("{}/v1/models/{}:predict", self.base_url, self.model_name)
    }

    async fn predict(&self, features: &[f32]) -> Result<Vec<f32>, TriageError> {
        let body = PredictRequest {
            instances: [features],
        };

        let response = self
            .client
            .post(self.url())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    TriageError::ModelConnection(self.base_url.clone())
                } else if e.is_timeout() {
                    TriageError::ModelTimeout {
                        model: self.model_name.clone(),
                        timeout_ms: self.timeout_ms,
                    }
                } else {
                    TriageError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TriageError::ModelResponse {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: PredictResponse = response
            .json()
            .await
            .map_err(|e| TriageError::ResponseParsing(e.to_string()))?;

        let first = parsed
            .predictions
            .into_iter()
            .next()
            .ok_or_else(|| TriageError::ResponseParsing("empty predictions array".into()))?;

        normalize_distribution(&first)
    }
}

/// Specialist model served over HTTP.
pub struct HttpModelPredictor {
    specialty: Specialty,
    endpoint: ModelEndpoint,
}

impl HttpModelPredictor {
    /// Model name defaults to the specialty's wire name, e.g. `mental_health`.
    pub fn new(base_url: &str, specialty: Specialty, timeout: Duration) -> Result<Self, TriageError> {
        Ok(Self {
            specialty,
            endpoint: ModelEndpoint::new(base_url, specialty.as_str(), timeout)?,
        })
    }

    pub fn url(&self) -> String {
        self.endpoint.url()
    }
}

impl LearnedPredictor for HttpModelPredictor {
    fn specialty(&self) -> Specialty {
        self.specialty
    }

    fn predict<'a>(&'a self, features: &'a [f32]) -> BoxFuture<'a, Result<Vec<f32>, TriageError>> {
        Box::pin(self.endpoint.predict(features))
    }
}

/// Confidence validator served over HTTP.
pub struct HttpConfidenceValidator {
    endpoint: ModelEndpoint,
}

impl HttpConfidenceValidator {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TriageError> {
        Ok(Self {
            endpoint: ModelEndpoint::new(base_url, VALIDATOR_MODEL, timeout)?,
        })
    }
}

impl ConfidenceValidator for HttpConfidenceValidator {
    fn validate<'a>(&'a self, primary: &'a [f32]) -> BoxFuture<'a, Result<Vec<f32>, TriageError>> {
        Box::pin(self.endpoint.predict(primary))
    }
}

// ---------------------------------------------------------------------------
// Model set
// ---------------------------------------------------------------------------

/// Learned models keyed by specialty. Specialties without a model use
/// their rule predictor.
#[derive(Clone)]
pub struct LearnedModels {
    predictors: HashMap<Specialty, Arc<dyn LearnedPredictor>>,
    validator: Option<Arc<dyn ConfidenceValidator>>,
    timeout: Duration,
}

impl LearnedModels {
    pub fn new(timeout: Duration) -> Self {
        Self {
            predictors: HashMap::new(),
            validator: None,
            timeout,
        }
    }

    /// HTTP models for every specialty plus the validator when
    /// `model_url` is set; an empty set otherwise.
    pub fn from_config(config: &TriageConfig) -> Result<Self, TriageError> {
        let timeout = config.model_timeout();
        let mut models = Self::new(timeout);

        let Some(base_url) = config.model_url.as_deref() else {
            return Ok(models);
        };

        for specialty in std::iter::once(Specialty::General).chain(SPECIALTIES) {
            models = models.with_predictor(Arc::new(HttpModelPredictor::new(base_url, specialty, timeout)?));
        }
        models = models.with_validator(Arc::new(HttpConfidenceValidator::new(base_url, timeout)?));

        tracing::info!(
            base_url = %base_url,
            models = models.predictors.len(),
            timeout_ms = config.model_timeout_ms,
            "Learned models configured"
        );
        Ok(models)
    }

    pub fn with_predictor(mut self, predictor: Arc<dyn LearnedPredictor>) -> Self {
        self.predictors.insert(predictor.specialty(), predictor);
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn ConfidenceValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predictors.is_empty() && self.validator.is_none()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// One bounded attempt at the learned model; the rule predictor on
    /// any failure, timeout, or malformed output.
    pub async fn specialist_output(&self, specialty: Specialty, features: &FeatureSet) -> SpecialistOutput {
        let Some(model) = self.predictors.get(&specialty) else {
            return rule_output(specialty, features);
        };

        let attempt = bounded(specialty.as_str(), self.timeout, model.predict(features.for_specialty(specialty)))
            .await
            .and_then(|dist| check_classes(specialty, dist));

        match attempt {
            Ok(distribution) => SpecialistOutput {
                specialty,
                distribution,
                source: OutputSource::Learned,
            },
            Err(e) => {
                tracing::warn!(specialty = %specialty, error = %e, "Learned model unavailable, using rule predictor");
                rule_output(specialty, features)
            }
        }
    }

    /// Generic and specialist outputs, all models queried concurrently.
    pub async fn run_ensemble(&self, features: &FeatureSet) -> EnsembleReport {
        let (primary, specialists) = futures_util::future::join(
            self.specialist_output(Specialty::General, features),
            join_all(SPECIALTIES.iter().map(|&s| self.specialist_output(s, features))),
        )
        .await;
        EnsembleReport::from_outputs(primary, specialists)
    }

    /// Validator confidence for the primary distribution, `None` when no
    /// validator is configured or it fails.
    pub async fn validated_confidence(&self, primary: &SpecialistOutput) -> Option<f64> {
        let validator = self.validator.as_ref()?;
        let result = bounded(VALIDATOR_MODEL, self.timeout, validator.validate(&primary.distribution)).await;

        match result {
            Ok(output) => {
                let confidence = from_validator(&output);
                if confidence.is_none() {
                    tracing::warn!(len = output.len(), "Validator output is not binary, using rule confidence");
                }
                confidence
            }
            Err(e) => {
                tracing::warn!(error = %e, "Confidence validator unavailable, using rule confidence");
                None
            }
        }
    }
}

async fn bounded<F>(model: &str, timeout: Duration, call: F) -> Result<Vec<f32>, TriageError>
where
    F: Future<Output = Result<Vec<f32>, TriageError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(TriageError::ModelTimeout {
            model: model.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }),
    }
}

fn check_classes(specialty: Specialty, distribution: Vec<f32>) -> Result<Vec<f32>, TriageError> {
    let expected = class_table(specialty).len();
    if distribution.len() != expected {
        return Err(TriageError::InvalidDistribution(format!(
            "{specialty} model returned {} classes, expected {expected}",
            distribution.len()
        )));
    }
    normalize_distribution(&distribution)
}

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// Learned predictor returning a fixed distribution.
pub struct MockLearnedPredictor {
    specialty: Specialty,
    output: Vec<f32>,
    delay: Option<Duration>,
    fail: bool,
}

impl MockLearnedPredictor {
    pub fn new(specialty: Specialty, output: Vec<f32>) -> Self {
        Self {
            specialty,
            output,
            delay: None,
            fail: false,
        }
    }

    pub fn failing(specialty: Specialty) -> Self {
        Self {
            fail: true,
            ..Self::new(specialty, Vec::new())
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl LearnedPredictor for MockLearnedPredictor {
    fn specialty(&self) -> Specialty {
        self.specialty
    }

    fn predict<'a>(&'a self, _features: &'a [f32]) -> BoxFuture<'a, Result<Vec<f32>, TriageError>> {
        Box::pin(async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(TriageError::ModelConnection("mock://unreachable".into()));
            }
            Ok(self.output.clone())
        })
    }
}

/// Validator returning a fixed `[p_unreliable, p_reliable]` pair.
pub struct MockConfidenceValidator {
    output: Vec<f32>,
}

impl MockConfidenceValidator {
    pub fn new(output: Vec<f32>) -> Self {
        Self { output }
    }
}

impl ConfidenceValidator for MockConfidenceValidator {
    fn validate<'a>(&'a self, _primary: &'a [f32]) -> BoxFuture<'a, Result<Vec<f32>, TriageError>> {
        Box::pin(async move { Ok(self.output.clone()) })
    }
}
