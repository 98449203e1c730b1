//! Pattern decision trees.
//!
//! Trees run in a fixed order: chest pain, respiratory, mental health.
//! The first tree that lands in a bucket supplies the primary prediction;
//! later matches become secondary candidates. A profile no tree matches
//! gets the general-evaluation fallback.

use serde::{Deserialize, Serialize};

use crate::config::thresholds;
use crate::models::enums::Severity;
use crate::models::{PatientProfile, Prediction, RiskProfile};

use super::features::{chest_pain_severity, has_breathing_difficulty, has_fever, mental_keyword_count};

pub const GENERAL_EVALUATION: &str = "General evaluation";

// ---------------------------------------------------------------------------
// Buckets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChestPainBucket {
    HighRisk,
    ModerateRisk,
    LowRisk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RespiratoryBucket {
    /// Cough, fever and breathing difficulty together.
    LowerRespiratory,
    /// Same triad in a patient from a tuberculosis-endemic origin.
    TbRisk,
    UpperRespiratory,
    BreathingDifficulty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentalHealthBucket {
    Severe,
    Moderate,
    Mild,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tree", content = "bucket", rename_all = "snake_case")]
pub enum TreeOutcome {
    ChestPain(ChestPainBucket),
    Respiratory(RespiratoryBucket),
    MentalHealth(MentalHealthBucket),
}

/// Canned prediction for a bucket, before the origin modifier.
struct BucketTemplate {
    condition: &'static str,
    probability: f64,
    severity: Severity,
    reasoning: &'static str,
}

impl TreeOutcome {
    pub fn tree(&self) -> DecisionTree {
        match self {
            Self::ChestPain(_) => DecisionTree::ChestPain,
            Self::Respiratory(_) => DecisionTree::Respiratory,
            Self::MentalHealth(_) => DecisionTree::MentalHealth,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ChestPain(ChestPainBucket::HighRisk) => "high-risk",
            Self::ChestPain(ChestPainBucket::ModerateRisk) => "moderate-risk",
            Self::ChestPain(ChestPainBucket::LowRisk) => "low-risk",
            Self::Respiratory(RespiratoryBucket::LowerRespiratory) => "lower-respiratory",
            Self::Respiratory(RespiratoryBucket::TbRisk) => "tb-risk",
            Self::Respiratory(RespiratoryBucket::UpperRespiratory) => "upper-respiratory",
            Self::Respiratory(RespiratoryBucket::BreathingDifficulty) => "breathing-difficulty",
            Self::MentalHealth(MentalHealthBucket::Severe) => "severe-ptsd",
            Self::MentalHealth(MentalHealthBucket::Moderate) => "moderate-ptsd",
            Self::MentalHealth(MentalHealthBucket::Mild) => "mild-distress",
        }
    }

    fn template(&self) -> BucketTemplate {
        let t = |condition, probability, severity, reasoning| BucketTemplate {
            condition,
            probability,
            severity,
            reasoning,
        };
        match self {
            Self::ChestPain(ChestPainBucket::HighRisk) => t(
                "Acute coronary syndrome",
                0.75,
                Severity::Critical,
                "Severe chest pain in a patient over 45; rule out myocardial infarction immediately",
            ),
            Self::ChestPain(ChestPainBucket::ModerateRisk) => t(
                "Possible cardiac chest pain",
                0.55,
                Severity::High,
                "Chest pain with elevated blood pressure or marked severity; cardiac workup indicated",
            ),
            Self::ChestPain(ChestPainBucket::LowRisk) => t(
                "Non-cardiac chest pain",
                0.40,
                Severity::Moderate,
                "Mild chest pain without cardiac risk markers; likely musculoskeletal",
            ),
            Self::Respiratory(RespiratoryBucket::TbRisk) => t(
                "Suspected pulmonary tuberculosis",
                0.70,
                Severity::High,
                "Cough, fever and breathing difficulty in a patient from a tuberculosis-endemic \
                 region; isolate and arrange sputum testing and chest X-ray urgently",
            ),
            Self::Respiratory(RespiratoryBucket::LowerRespiratory) => t(
                "Lower respiratory tract infection",
                0.65,
                Severity::High,
                "Cough, fever and breathing difficulty together suggest pneumonia",
            ),
            Self::Respiratory(RespiratoryBucket::UpperRespiratory) => t(
                "Upper respiratory infection",
                0.60,
                Severity::Moderate,
                "Cough with fever and no breathing difficulty",
            ),
            Self::Respiratory(RespiratoryBucket::BreathingDifficulty) => t(
                "Acute breathing difficulty",
                0.55,
                Severity::High,
                "Breathing difficulty without infectious signs; assess for asthma or respiratory distress",
            ),
            Self::MentalHealth(MentalHealthBucket::Severe) => t(
                "Severe post-traumatic stress",
                0.75,
                Severity::High,
                "Trauma exposure, prolonged displacement and multiple psychological symptoms",
            ),
            Self::MentalHealth(MentalHealthBucket::Moderate) => t(
                "Moderate post-traumatic stress",
                0.60,
                Severity::Moderate,
                "Several displacement and trauma stressors present",
            ),
            Self::MentalHealth(MentalHealthBucket::Mild) => t(
                "Mild psychological distress",
                0.45,
                Severity::Low,
                "Isolated psychosocial stressor; monitor and offer psychosocial support",
            ),
        }
    }

    /// Bucket prediction with the origin modifier applied and capped at 0.95.
    pub fn prediction(&self, risk: &RiskProfile) -> Prediction {
        let template = self.template();
        let modifier = risk.effective_modifier();
        let reasoning = if modifier > 1.0 {
            format!(
                "{} (population risk modifier {:.2} applied)",
                template.reasoning, modifier
            )
        } else {
            template.reasoning.to_string()
        };
        Prediction::new(
            template.condition,
            template.probability * modifier,
            template.severity,
            reasoning,
        )
    }
}

// ---------------------------------------------------------------------------
// Trees
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionTree {
    ChestPain,
    Respiratory,
    MentalHealth,
}

impl DecisionTree {
    /// Cardiac patterns pre-empt softer categorizations.
    pub const EVALUATION_ORDER: [DecisionTree; 3] =
        [Self::ChestPain, Self::Respiratory, Self::MentalHealth];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ChestPain => "chest-pain",
            Self::Respiratory => "respiratory",
            Self::MentalHealth => "mental-health",
        }
    }

    /// Bucket for this profile, `None` when the tree does not apply.
    pub fn classify(&self, profile: &PatientProfile, risk: &RiskProfile) -> Option<TreeOutcome> {
        match self {
            Self::ChestPain => chest_pain(profile).map(TreeOutcome::ChestPain),
            Self::Respiratory => respiratory(profile, risk).map(TreeOutcome::Respiratory),
            Self::MentalHealth => mental_health(profile).map(TreeOutcome::MentalHealth),
        }
    }
}

fn chest_pain(profile: &PatientProfile) -> Option<ChestPainBucket> {
    let severity = chest_pain_severity(profile)?;
    let systolic_high = profile
        .vital_signs
        .systolic_bp
        .is_some_and(|bp| bp > thresholds::HYPERTENSION_SYSTOLIC);

    if severity >= 7.0 && profile.age > 45.0 {
        Some(ChestPainBucket::HighRisk)
    } else if systolic_high || severity >= 5.0 {
        Some(ChestPainBucket::ModerateRisk)
    } else {
        Some(ChestPainBucket::LowRisk)
    }
}

fn respiratory(profile: &PatientProfile, risk: &RiskProfile) -> Option<RespiratoryBucket> {
    let cough = profile.has_symptom("cough");
    let fever = has_fever(profile);
    let breathing = has_breathing_difficulty(profile);

    if cough && fever && breathing {
        if risk.lists_condition("tuberculosis") {
            Some(RespiratoryBucket::TbRisk)
        } else {
            Some(RespiratoryBucket::LowerRespiratory)
        }
    } else if cough && fever {
        Some(RespiratoryBucket::UpperRespiratory)
    } else if breathing {
        Some(RespiratoryBucket::BreathingDifficulty)
    } else {
        None
    }
}

/// Additive stressor score used by the mental-health tree.
pub fn mental_health_score(profile: &PatientProfile) -> u32 {
    let psych = &profile.psychosocial_factors;
    let months = profile.displacement_months();

    let mut score = 0;
    if psych.trauma_history {
        score += 2;
    }
    if psych.separation_from_family {
        score += 1;
    }
    if months > 12.0 {
        score += 2;
    } else if months > 6.0 {
        score += 1;
    }
    score + mental_keyword_count(profile) as u32
}

fn mental_health(profile: &PatientProfile) -> Option<MentalHealthBucket> {
    match mental_health_score(profile) {
        0 => None,
        1..=2 => Some(MentalHealthBucket::Mild),
        3..=4 => Some(MentalHealthBucket::Moderate),
        _ => Some(MentalHealthBucket::Severe),
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TreeEvaluation {
    pub primary: Prediction,
    /// Bucket behind the primary prediction; `None` for the fallback.
    pub outcome: Option<TreeOutcome>,
    /// Predictions from trees that matched after the first.
    pub additional: Vec<Prediction>,
}

impl TreeEvaluation {
    pub fn is_fallback(&self) -> bool {
        self.outcome.is_none()
    }
}

/// Fallback when no pattern applies or the profile is unusable.
pub fn general_evaluation(degenerate: bool) -> Prediction {
    let reasoning = if degenerate {
        "Insufficient or implausible intake data; complete a full clinical evaluation"
    } else {
        "No specific symptom pattern matched; routine clinical evaluation recommended"
    };
    Prediction::new(GENERAL_EVALUATION, 0.5, Severity::Low, reasoning)
}

/// Run every tree in order. Degenerate profiles skip the trees entirely.
pub fn evaluate(profile: &PatientProfile, risk: &RiskProfile) -> TreeEvaluation {
    if profile.is_degenerate() {
        return TreeEvaluation {
            primary: general_evaluation(true),
            outcome: None,
            additional: Vec::new(),
        };
    }

    let mut matches = DecisionTree::EVALUATION_ORDER
        .iter()
        .filter_map(|tree| tree.classify(profile, risk));

    match matches.next() {
        Some(outcome) => {
            tracing::debug!(tree = outcome.tree().name(), bucket = outcome.label(), "Decision tree matched");
            TreeEvaluation {
                primary: outcome.prediction(risk),
                outcome: Some(outcome),
                additional: matches.map(|o| o.prediction(risk)).collect(),
            }
        }
        None => TreeEvaluation {
            primary: general_evaluation(false),
            outcome: None,
            additional: Vec::new(),
        },
    }
}
