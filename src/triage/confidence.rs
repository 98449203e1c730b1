//! Confidence estimation.

use crate::models::{clamp_probability, RiskProfile};

pub const BASE_CONFIDENCE: f64 = 0.70;
pub const PER_SYMPTOM: f64 = 0.05;
pub const MODIFIER_BONUS: f64 = 0.10;

/// Rule-based confidence: base plus evidence volume plus a bonus when the
/// origin group carries an elevated risk modifier. Capped at 0.95.
pub fn rule_confidence(symptom_count: usize, risk: &RiskProfile) -> f64 {
    let bonus = if risk.effective_modifier() > 1.0 {
        MODIFIER_BONUS
    } else {
        0.0
    };
    clamp_probability(BASE_CONFIDENCE + PER_SYMPTOM * symptom_count as f64 + bonus)
}

/// Confidence from a binary validator's `[p_unreliable, p_reliable]` output.
/// Returns `None` when the output is not a usable two-class distribution.
pub fn from_validator(output: &[f32]) -> Option<f64> {
    match output {
        [unreliable, reliable]
            if unreliable.is_finite() && reliable.is_finite() && *unreliable >= 0.0 && *reliable >= 0.0 =>
        {
            let total = (*unreliable + *reliable) as f64;
            if total <= 0.0 {
                return None;
            }
            Some(clamp_probability(*reliable as f64 / total))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_risk(modifier: f64) -> RiskProfile {
        let mut risk = RiskProfile::neutral();
        risk.risk_modifier = modifier;
        risk
    }

    #[test]
    fn empty_profile_gets_base_confidence() {
        assert!((rule_confidence(0, &make_risk(1.0)) - 0.70).abs() < 1e-9);
    }

    #[test]
    fn symptoms_and_modifier_raise_confidence() {
        let c = rule_confidence(2, &make_risk(1.3));
        assert!((c - 0.90).abs() < 1e-9);
    }

    #[test]
    fn confidence_never_exceeds_cap() {
        assert_eq!(rule_confidence(40, &make_risk(1.6)), 0.95);
    }

    #[test]
    fn validator_uses_reliable_probability() {
        assert!((from_validator(&[0.2, 0.8]).unwrap() - 0.8).abs() < 1e-6);
        assert_eq!(from_validator(&[0.0, 1.0]), Some(0.95));
    }

    #[test]
    fn validator_rejects_malformed_output() {
        assert_eq!(from_validator(&[0.5]), None);
        assert_eq!(from_validator(&[0.2, 0.3, 0.5]), None);
        assert_eq!(from_validator(&[0.0, 0.0]), None);
        assert_eq!(from_validator(&[f32::NAN, 0.5]), None);
    }
}
