//! Ensemble aggregation: runs the generic and specialist predictors,
//! characterizes how much they agree, and turns specialist findings
//! into secondary-condition candidates.
//!
//! The aggregator never picks the primary diagnosis. That belongs to
//! the decision trees.

use crate::models::enums::Specialty;
use crate::models::{Prediction, RiskProfile};

use super::features::FeatureSet;
use super::predictors::{class_table, rule_predictor};
use super::types::{OutputSource, SpecialistOutput};

/// Specialists consulted alongside the generic predictor, in report order.
pub const SPECIALTIES: [Specialty; 3] = [
    Specialty::Respiratory,
    Specialty::MentalHealth,
    Specialty::Nutrition,
];

#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleReport {
    pub primary: SpecialistOutput,
    pub specialists: Vec<SpecialistOutput>,
    /// Mean pairwise cosine similarity, in [0, 1].
    pub agreement: f64,
}

impl EnsembleReport {
    /// Assemble a report from already-computed outputs.
    pub fn from_outputs(primary: SpecialistOutput, specialists: Vec<SpecialistOutput>) -> Self {
        let agreement = {
            let vectors: Vec<&[f32]> = std::iter::once(primary.distribution.as_slice())
                .chain(specialists.iter().map(|s| s.distribution.as_slice()))
                .collect();
            agreement(&vectors)
        };
        Self {
            primary,
            specialists,
            agreement,
        }
    }

    pub fn learned_count(&self) -> usize {
        std::iter::once(&self.primary)
            .chain(&self.specialists)
            .filter(|o| o.source == OutputSource::Learned)
            .count()
    }
}

// ---------------------------------------------------------------------------
// Agreement
// ---------------------------------------------------------------------------

/// Cosine similarity over the shorter vector's length.
/// Zero-norm inputs have no direction and score 0.
pub fn truncated_cosine(a: &[f32], b: &[f32]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (x, y) in a[..n].iter().zip(&b[..n]) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return 0.0;
    }
    dot / denom
}

/// Mean cosine similarity over all unordered pairs.
/// Fewer than two distributions agree vacuously.
pub fn agreement(distributions: &[&[f32]]) -> f64 {
    if distributions.len() < 2 {
        return 1.0;
    }

    let mut total = 0.0;
    let mut pairs = 0usize;
    for (i, a) in distributions.iter().enumerate() {
        for b in &distributions[i + 1..] {
            total += truncated_cosine(a, b);
            pairs += 1;
        }
    }

    let mean = total / pairs as f64;
    if mean.is_finite() {
        mean.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Rule-based ensemble
// ---------------------------------------------------------------------------

/// Run one rule predictor. Extracted vectors always have the right
/// length, so an error here means a wiring bug; fall back to a
/// baseline-only distribution rather than failing the assessment.
pub fn rule_output(specialty: Specialty, features: &FeatureSet) -> SpecialistOutput {
    let distribution = match rule_predictor(specialty).predict(features.for_specialty(specialty)) {
        Ok(dist) => dist,
        Err(e) => {
            tracing::error!(specialty = %specialty, error = %e, "Rule predictor failed");
            baseline_distribution(specialty)
        }
    };
    SpecialistOutput {
        specialty,
        distribution,
        source: OutputSource::RuleBased,
    }
}

fn baseline_distribution(specialty: Specialty) -> Vec<f32> {
    let mut dist = vec![0.0; class_table(specialty).len()];
    if let Some(first) = dist.first_mut() {
        *first = 1.0;
    }
    dist
}

pub fn run_rule_ensemble(features: &FeatureSet) -> EnsembleReport {
    let primary = rule_output(Specialty::General, features);
    let specialists = SPECIALTIES
        .iter()
        .map(|&s| rule_output(s, features))
        .collect();
    EnsembleReport::from_outputs(primary, specialists)
}

// ---------------------------------------------------------------------------
// Secondary conditions
// ---------------------------------------------------------------------------

/// Top non-baseline class of each specialist, as a Prediction.
pub fn specialist_candidates(specialists: &[SpecialistOutput], risk: &RiskProfile) -> Vec<Prediction> {
    let modifier = risk.effective_modifier();

    specialists
        .iter()
        .filter_map(|output| {
            let (index, mass) = output.top_class()?;
            let class = class_table(output.specialty).get(index)?;
            let condition = class.condition?;
            Some(Prediction::new(
                condition,
                mass as f64 * modifier,
                class.severity,
                format!(
                    "{} specialist assessment ({})",
                    output.specialty,
                    match output.source {
                        OutputSource::RuleBased => "rule-based",
                        OutputSource::Learned => "learned model",
                    }
                ),
            ))
        })
        .collect()
}

/// Merge candidates into the final secondary list: one entry per
/// condition (highest probability kept), primary excluded, most likely
/// first, at most `max` entries.
pub fn select_secondary(
    primary: &Prediction,
    candidates: impl IntoIterator<Item = Prediction>,
    max: usize,
) -> Vec<Prediction> {
    let mut selected: Vec<Prediction> = Vec::new();

    for candidate in candidates {
        if primary.same_condition(&candidate.condition) {
            continue;
        }
        match selected
            .iter_mut()
            .find(|s| s.same_condition(&candidate.condition))
        {
            Some(existing) if existing.probability < candidate.probability => *existing = candidate,
            Some(_) => {}
            None => selected.push(candidate),
        }
    }

    selected.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    selected.truncate(max);
    selected
}
