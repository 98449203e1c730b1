use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::triage::TriageError;

/// Application-level constants
pub const APP_NAME: &str = "refugee-triage";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "refugee_triage=info,warn"
}

/// Clinical thresholds. One canonical value per concept, shared by every component.
pub mod thresholds {
    /// BMI below this reads as severe acute malnutrition.
    pub const BMI_SEVERE: f64 = 16.0;
    /// BMI below this reads as moderate malnutrition.
    pub const BMI_MODERATE: f64 = 18.5;
    /// Temperature at or above this counts as fever evidence.
    pub const FEVER_C: f64 = 38.0;
    pub const HYPERTENSION_SYSTOLIC: f64 = 140.0;
    pub const RED_FLAG_TEMPERATURE_C: f64 = 39.5;
    pub const RED_FLAG_SYSTOLIC: f64 = 200.0;
    pub const RED_FLAG_OXYGEN_SATURATION: f64 = 90.0;
}

/// Runtime settings for one engine instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TriageConfig {
    /// Predictions above this probability get a recommendation line.
    pub prediction_line_threshold: f64,
    pub malnutrition_threshold: f64,
    pub trauma_threshold: f64,
    pub infectious_threshold: f64,
    pub max_recommendations: usize,
    pub max_secondary_conditions: usize,
    /// Base URL of a model server exposing `/v1/models/<name>:predict`.
    pub model_url: Option<String>,
    pub model_timeout_ms: u64,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            prediction_line_threshold: 0.6,
            malnutrition_threshold: 0.6,
            trauma_threshold: 0.7,
            infectious_threshold: 0.6,
            max_recommendations: 8,
            max_secondary_conditions: 3,
            model_url: None,
            model_timeout_ms: 2_000,
        }
    }
}

impl TriageConfig {
    /// Defaults overlaid with `TRIAGE_*` environment variables.
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("TRIAGE_MODEL_URL") {
            if !url.trim().is_empty() {
                config.model_url = Some(url.trim().to_string());
            }
        }
        if let Ok(raw) = std::env::var("TRIAGE_MODEL_TIMEOUT_MS") {
            match raw.parse() {
                Ok(ms) => config.model_timeout_ms = ms,
                Err(_) => tracing::warn!(value = %raw, "Ignoring invalid TRIAGE_MODEL_TIMEOUT_MS"),
            }
        }
        if let Ok(raw) = std::env::var("TRIAGE_MAX_RECOMMENDATIONS") {
            match raw.parse() {
                Ok(n) => config.max_recommendations = n,
                Err(_) => {
                    tracing::warn!(value = %raw, "Ignoring invalid TRIAGE_MAX_RECOMMENDATIONS")
                }
            }
        }

        config
    }

    /// Load from a JSON file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, TriageError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| TriageError::ConfigLoad(path.display().to_string(), e.to_string()))?;
        serde_json::from_str(&json)
            .map_err(|e| TriageError::ConfigParse(path.display().to_string(), e.to_string()))
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_millis(self.model_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds() {
        let config = TriageConfig::default();
        assert!((config.malnutrition_threshold - 0.6).abs() < f64::EPSILON);
        assert!((config.trauma_threshold - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.max_secondary_conditions, 3);
        assert!(config.model_url.is_none());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: TriageConfig =
            serde_json::from_str(r#"{"maxRecommendations": 4, "modelTimeoutMs": 500}"#).unwrap();
        assert_eq!(config.max_recommendations, 4);
        assert_eq!(config.model_timeout(), Duration::from_millis(500));
        assert!((config.trauma_threshold - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triage.json");
        std::fs::write(&path, r#"{"infectiousThreshold": 0.5}"#).unwrap();
        let config = TriageConfig::load(&path).unwrap();
        assert!((config.infectious_threshold - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn load_missing_file_errors() {
        let err = TriageConfig::load(Path::new("/nonexistent/triage.json")).unwrap_err();
        assert!(matches!(err, TriageError::ConfigLoad(..)));
    }

    #[test]
    fn app_name_is_set() {
        assert_eq!(APP_NAME, "refugee-triage");
    }
}
