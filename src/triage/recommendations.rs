//! Recommendation and cultural-consideration synthesis.

use crate::config::TriageConfig;
use crate::models::{PatientProfile, Prediction, RefugeeSpecificRisks};

pub const PEDIATRIC_AGE: f64 = 5.0;
pub const GERIATRIC_AGE: f64 = 65.0;

const MONITORING_LINE: &str = "Continue monitoring symptoms and return if they worsen";
const BASIC_NEEDS_LINE: &str = "Ensure access to clean water, adequate nutrition and shelter";

/// Ordered list with set semantics on the rendered text.
#[derive(Debug, Default)]
struct LineSet {
    lines: Vec<String>,
}

impl LineSet {
    fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        if !self.lines.iter().any(|l| l.eq_ignore_ascii_case(&line)) {
            self.lines.push(line);
        }
    }

    fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn into_vec(self) -> Vec<String> {
        self.lines
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// Assemble recommendations in priority order:
/// likely conditions, elevated risks, interpreter, religious practice, age band.
/// When nothing fires, two safety-net lines are emitted.
pub fn generate(
    profile: &PatientProfile,
    predictions: &[&Prediction],
    risks: &RefugeeSpecificRisks,
    config: &TriageConfig,
) -> Vec<String> {
    let mut lines = LineSet::default();

    for prediction in predictions {
        if prediction.probability > config.prediction_line_threshold {
            lines.push(format!(
                "High likelihood of {}: immediate evaluation recommended",
                prediction.condition
            ));
        }
    }

    if risks.nutritional_status > config.malnutrition_threshold {
        lines.push("Malnutrition risk: nutritional assessment and supplementation recommended");
    }
    if risks.trauma_score > config.trauma_threshold {
        lines.push("High trauma burden: trauma-informed mental health screening recommended");
    }
    if risks.infectious_risk > config.infectious_threshold {
        lines.push("Elevated infectious risk: screen for endemic communicable diseases");
    }

    if profile.psychosocial_factors.language_barriers {
        lines.push("Arrange a professional medical interpreter for all consultations");
    }

    if let Some(religion) = non_blank(profile.cultural_background.religious_background.as_ref()) {
        lines.push(format!(
            "Respect {religion} religious practices in care planning and treatment timing"
        ));
    }

    if profile.age.is_finite() && profile.age >= 0.0 {
        if profile.age < PEDIATRIC_AGE {
            lines.push("Pediatric assessment: growth monitoring and immunization review");
        } else if profile.age > GERIATRIC_AGE {
            lines.push("Geriatric assessment: medication review and chronic disease screening");
        }
    }

    if lines.is_empty() {
        lines.push(MONITORING_LINE);
        lines.push(BASIC_NEEDS_LINE);
    }

    let mut out = lines.into_vec();
    out.truncate(config.max_recommendations);
    out
}

fn is_english(language: &str) -> bool {
    let lang = language.trim().to_lowercase();
    lang.is_empty() || lang == "en" || lang.starts_with("en-") || lang.starts_with("en_") || lang == "english"
}

/// Context a clinician should keep in mind, independent of the diagnosis.
pub fn cultural_considerations(profile: &PatientProfile) -> Vec<String> {
    let culture = &profile.cultural_background;
    let mut lines = LineSet::default();

    if !is_english(&culture.primary_language) {
        lines.push(format!(
            "Primary language is {}; provide translated materials",
            culture.primary_language.trim()
        ));
    }
    if let Some(religion) = non_blank(culture.religious_background.as_ref()) {
        lines.push(format!(
            "Religious background: {religion}; ask about dietary, fasting and modesty preferences"
        ));
    }
    for belief in culture.health_beliefs.iter().map(|b| b.trim()).filter(|b| !b.is_empty()) {
        lines.push(format!("Health belief to discuss respectfully: {belief}"));
    }
    if profile.psychosocial_factors.separation_from_family {
        lines.push("Separated from family; consider referral to family tracing services");
    }

    lines.into_vec()
}
