use serde::{Deserialize, Serialize};

use super::enums::{Disposition, OriginGroup, Severity};

/// Ceiling for any probability or confidence the engine reports.
pub const PROBABILITY_CAP: f64 = 0.95;

/// Clamp a computed scalar into [0, cap]; NaN collapses to 0.
pub fn clamp_probability(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, PROBABILITY_CAP)
    }
}

/// Clamp into [0, 1]; NaN collapses to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub condition: String,
    pub probability: f64,
    pub severity: Severity,
    pub reasoning: String,
}

impl Prediction {
    pub fn new(
        condition: impl Into<String>,
        probability: f64,
        severity: Severity,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            condition: condition.into(),
            probability: clamp_probability(probability),
            severity,
            reasoning: reasoning.into(),
        }
    }

    /// Case-insensitive condition comparison.
    pub fn same_condition(&self, other: &str) -> bool {
        self.condition.eq_ignore_ascii_case(other)
    }
}

/// Population-level priors for one origin group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskProfile {
    #[serde(default)]
    pub genetic_predispositions: Vec<String>,
    #[serde(default)]
    pub common_conditions: Vec<String>,
    #[serde(default)]
    pub dietary_factors: Vec<String>,
    #[serde(default = "neutral_modifier")]
    pub risk_modifier: f64,
}

fn neutral_modifier() -> f64 {
    1.0
}

impl RiskProfile {
    /// Neutral profile for unmodeled populations.
    pub fn neutral() -> Self {
        Self {
            genetic_predispositions: Vec::new(),
            common_conditions: vec![
                "Respiratory infections".into(),
                "Gastrointestinal infections".into(),
                "Mental health conditions".into(),
            ],
            dietary_factors: Vec::new(),
            risk_modifier: 1.0,
        }
    }

    pub fn lists_condition(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.common_conditions
            .iter()
            .any(|c| c.to_lowercase().contains(&needle))
    }

    /// Modifier sanitized to a finite value no lower than 1.0.
    pub fn effective_modifier(&self) -> f64 {
        if self.risk_modifier.is_finite() {
            self.risk_modifier.max(1.0)
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthnicFactors {
    pub origin_group: OriginGroup,
    #[serde(flatten)]
    pub profile: RiskProfile,
}

/// Independent risk scalars in [0, 1], each drawn from its own profile fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefugeeSpecificRisks {
    pub displacement_health: f64,
    pub trauma_score: f64,
    pub nutritional_status: f64,
    pub infectious_risk: f64,
    pub chronic_care_access: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriagePrediction {
    pub primary_diagnosis: Prediction,
    pub secondary_conditions: Vec<Prediction>,
    pub ethnic_factors: EthnicFactors,
    pub refugee_specific_risks: RefugeeSpecificRisks,
    pub confidence: f64,
    /// 1 (most urgent) to 5.
    pub urgency_level: u8,
    pub disposition: Disposition,
    pub ensemble_agreement: f64,
    pub recommendations: Vec<String>,
    pub cultural_considerations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_probability_is_capped() {
        let p = Prediction::new("x", 1.4, Severity::High, "");
        assert!((p.probability - PROBABILITY_CAP).abs() < f64::EPSILON);
        let n = Prediction::new("x", -0.2, Severity::Low, "");
        assert_eq!(n.probability, 0.0);
        let nan = Prediction::new("x", f64::NAN, Severity::Low, "");
        assert_eq!(nan.probability, 0.0);
    }

    #[test]
    fn neutral_profile_has_unit_modifier() {
        let neutral = RiskProfile::neutral();
        assert_eq!(neutral.risk_modifier, 1.0);
        assert!(neutral.genetic_predispositions.is_empty());
        assert!(!neutral.common_conditions.is_empty());
    }

    #[test]
    fn effective_modifier_never_discounts() {
        let mut profile = RiskProfile::neutral();
        profile.risk_modifier = 0.4;
        assert_eq!(profile.effective_modifier(), 1.0);
        profile.risk_modifier = f64::INFINITY;
        assert_eq!(profile.effective_modifier(), 1.0);
    }

    #[test]
    fn ethnic_factors_flatten_profile_fields() {
        let factors = EthnicFactors {
            origin_group: OriginGroup::Syria,
            profile: RiskProfile::neutral(),
        };
        let json = serde_json::to_value(&factors).unwrap();
        assert_eq!(json["originGroup"], "syria");
        assert_eq!(json["riskModifier"], 1.0);
    }
}
