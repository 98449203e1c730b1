//! Urgency classification on a 1 (most urgent) to 5 scale.

use crate::config::thresholds;
use crate::models::enums::Severity;
use crate::models::profile::measured;
use crate::models::{PatientProfile, VitalSigns};

use super::trees::TreeEvaluation;

pub const MOST_URGENT: u8 = 1;
pub const LEAST_URGENT: u8 = 5;

/// Highest level a vital-sign red flag can force when the primary
/// diagnosis is not itself critical.
const RED_FLAG_CEILING: u8 = 2;

/// Normalized severity at or below which a fallback case may self-care.
const SELF_CARE_MAX_SEVERITY: f64 = 3.0;

pub fn severity_level(severity: Severity) -> u8 {
    match severity {
        Severity::Critical => 1,
        Severity::High => 2,
        Severity::Moderate => 3,
        Severity::Low => 4,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedFlag {
    Hyperpyrexia,
    HypertensiveCrisis,
    Hypoxia,
}

impl RedFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hyperpyrexia => "temperature above 39.5C",
            Self::HypertensiveCrisis => "systolic pressure above 200 mmHg",
            Self::Hypoxia => "oxygen saturation below 90%",
        }
    }
}

/// Measured vitals only; defaults and blank readings never raise a flag.
pub fn red_flags(vitals: &VitalSigns) -> Vec<RedFlag> {
    let mut flags = Vec::new();
    if measured(vitals.temperature).is_some_and(|t| t > thresholds::RED_FLAG_TEMPERATURE_C) {
        flags.push(RedFlag::Hyperpyrexia);
    }
    if measured(vitals.systolic_bp).is_some_and(|s| s > thresholds::RED_FLAG_SYSTOLIC) {
        flags.push(RedFlag::HypertensiveCrisis);
    }
    if measured(vitals.oxygen_saturation)
        .is_some_and(|o| o < thresholds::RED_FLAG_OXYGEN_SATURATION)
    {
        flags.push(RedFlag::Hypoxia);
    }
    flags
}

/// Urgency for one assessment.
///
/// Severity sets the base level. A fallback with at least one symptom,
/// nothing above mild severity, and no red flag relaxes to self-care.
/// Red flags only ever lower the number.
pub fn classify(profile: &PatientProfile, evaluation: &TreeEvaluation) -> u8 {
    let flags = red_flags(&profile.vital_signs);
    let mut level = severity_level(evaluation.primary.severity);

    if evaluation.is_fallback()
        && !profile.is_degenerate()
        && flags.is_empty()
        && profile
            .symptoms
            .iter()
            .all(|s| s.normalized_severity() <= SELF_CARE_MAX_SEVERITY)
    {
        level = LEAST_URGENT;
    }

    if !flags.is_empty() {
        let escalated = level.min(RED_FLAG_CEILING);
        if escalated < level {
            tracing::debug!(from = level, to = escalated, flags = flags.len(), "Vital-sign red flag escalation");
        }
        level = escalated;
    }

    level.clamp(MOST_URGENT, LEAST_URGENT)
}
