use std::time::Instant;

use crate::config::TriageConfig;
use crate::models::enums::{Disposition, OriginGroup};
use crate::models::{
    clamp_probability, clamp_unit, EthnicFactors, PatientProfile, Prediction, RefugeeSpecificRisks,
    RiskProfile, TriagePrediction,
};

use super::confidence::{rule_confidence, BASE_CONFIDENCE};
use super::ensemble::{run_rule_ensemble, select_secondary, specialist_candidates, EnsembleReport};
use super::features::{extract, FeatureSet};
use super::learned::LearnedModels;
use super::recommendations;
use super::registry::RiskModifierRegistry;
use super::risks;
use super::trees::{evaluate, TreeEvaluation};
use super::types::TriageError;
use super::urgency;

/// Hard ceiling on reported secondary conditions.
pub const MAX_SECONDARY_CONDITIONS: usize = 3;

/// Everything computed before the ensemble runs.
struct Intake {
    group: OriginGroup,
    risk: RiskProfile,
    features: FeatureSet,
    evaluation: TreeEvaluation,
    risks: RefugeeSpecificRisks,
}

/// Composes registry lookup, feature extraction, decision trees, the
/// ensemble, confidence, urgency and recommendations into one call.
/// Holds only read-only configuration; safe to share across threads.
pub struct TriageEngine {
    registry: RiskModifierRegistry,
    config: TriageConfig,
    models: LearnedModels,
}

impl TriageEngine {
    pub fn new(registry: RiskModifierRegistry, config: TriageConfig) -> Self {
        let models = LearnedModels::new(config.model_timeout());
        Self {
            registry,
            config,
            models,
        }
    }

    /// Built-in registry and default thresholds, rule-based only.
    pub fn with_defaults() -> Self {
        Self::new(RiskModifierRegistry::builtin(), TriageConfig::default())
    }

    /// Built-in registry plus learned models when `model_url` is set.
    pub fn from_config(config: TriageConfig) -> Result<Self, TriageError> {
        let models = LearnedModels::from_config(&config)?;
        Ok(Self::new(RiskModifierRegistry::builtin(), config).with_models(models))
    }

    pub fn with_models(mut self, models: LearnedModels) -> Self {
        self.models = models;
        self
    }

    pub fn registry(&self) -> &RiskModifierRegistry {
        &self.registry
    }

    pub fn config(&self) -> &TriageConfig {
        &self.config
    }

    /// Rule-based assessment. Never fails: degenerate input routes to the
    /// general-evaluation fallback.
    pub fn analyze(&self, profile: &PatientProfile) -> TriagePrediction {
        let start = Instant::now();
        let intake = self.intake(profile);
        let ensemble = run_rule_ensemble(&intake.features);
        self.assemble(profile, intake, ensemble, None, start)
    }

    /// Assessment with learned models where configured. Each model gets
    /// one bounded attempt; any that fails is replaced by its rule predictor.
    pub async fn analyze_with_models(&self, profile: &PatientProfile) -> TriagePrediction {
        let start = Instant::now();
        let intake = self.intake(profile);
        let ensemble = self.models.run_ensemble(&intake.features).await;
        let validated = self.models.validated_confidence(&ensemble.primary).await;
        self.assemble(profile, intake, ensemble, validated, start)
    }

    fn intake(&self, profile: &PatientProfile) -> Intake {
        let group = OriginGroup::from_key(&profile.origin);
        let risk = self.registry.profile_for(group).clone();
        let features = extract(profile, &risk);
        let evaluation = evaluate(profile, &risk);
        let risks = risks::assess(profile, &risk);

        Intake {
            group,
            risk,
            features,
            evaluation,
            risks,
        }
    }

    fn assemble(
        &self,
        profile: &PatientProfile,
        intake: Intake,
        ensemble: EnsembleReport,
        validated_confidence: Option<f64>,
        start: Instant,
    ) -> TriagePrediction {
        let Intake {
            group,
            risk,
            evaluation,
            risks,
            ..
        } = intake;

        let candidates = evaluation
            .additional
            .iter()
            .cloned()
            .chain(specialist_candidates(&ensemble.specialists, &risk));
        let secondary_conditions = select_secondary(
            &evaluation.primary,
            candidates,
            self.config.max_secondary_conditions.min(MAX_SECONDARY_CONDITIONS),
        );

        let confidence = if profile.is_degenerate() {
            BASE_CONFIDENCE
        } else {
            validated_confidence.unwrap_or_else(|| rule_confidence(profile.symptoms.len(), &risk))
        };

        let urgency_level = urgency::classify(profile, &evaluation);

        let predictions: Vec<&Prediction> = std::iter::once(&evaluation.primary)
            .chain(&secondary_conditions)
            .collect();
        let recommendations = recommendations::generate(profile, &predictions, &risks, &self.config);
        let cultural_considerations = recommendations::cultural_considerations(profile);

        let processing_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            origin = %group,
            urgency = urgency_level,
            confidence = confidence,
            agreement = ensemble.agreement,
            learned = ensemble.learned_count(),
            secondary = secondary_conditions.len(),
            processing_ms = processing_ms,
            "Triage analysis complete"
        );

        TriagePrediction {
            primary_diagnosis: evaluation.primary,
            secondary_conditions,
            ethnic_factors: EthnicFactors {
                origin_group: group,
                profile: risk,
            },
            refugee_specific_risks: risks,
            confidence: clamp_probability(confidence),
            urgency_level,
            disposition: Disposition::from_urgency(urgency_level),
            ensemble_agreement: clamp_unit(ensemble.agreement),
            recommendations,
            cultural_considerations,
        }
    }
}

impl Default for TriageEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}
