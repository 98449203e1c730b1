//! Refugee-specific risk scores.
//!
//! Each score reads its own slice of the profile and never another score:
//! - displacement health: months displaced, family size
//! - trauma: trauma history, family separation, mental-health symptoms
//! - nutrition: BMI, age, origin dietary factors
//! - infectious: fever / respiratory / GI symptoms, temperature, endemic infections
//! - chronic care access: resource access, chronic symptoms, language barriers

use crate::config::thresholds;
use crate::models::enums::{ResourceAccess, SymptomCategory};
use crate::models::{clamp_unit, PatientProfile, RefugeeSpecificRisks, RiskProfile};

use super::features::{endemic_infection_count, has_fever, mental_keyword_count};

pub fn assess(profile: &PatientProfile, risk: &RiskProfile) -> RefugeeSpecificRisks {
    RefugeeSpecificRisks {
        displacement_health: displacement_health(profile),
        trauma_score: trauma_score(profile),
        nutritional_status: nutritional_status(profile, risk),
        infectious_risk: infectious_risk(profile, risk),
        chronic_care_access: chronic_care_access(profile),
    }
}

fn displacement_health(profile: &PatientProfile) -> f64 {
    let duration = (profile.displacement_months() / 24.0).min(1.0);
    let crowding = (profile.household_size() / 8.0).min(1.0);
    clamp_unit(0.6 * duration + 0.4 * crowding)
}

fn trauma_score(profile: &PatientProfile) -> f64 {
    let psych = &profile.psychosocial_factors;
    let mut score = 0.0;
    if psych.trauma_history {
        score += 0.45;
    }
    if psych.separation_from_family {
        score += 0.25;
    }
    score += 0.15 * mental_keyword_count(profile) as f64;
    clamp_unit(score)
}

/// Higher means worse nutritional status.
fn nutritional_status(profile: &PatientProfile, risk: &RiskProfile) -> f64 {
    let mut score = match profile.vital_signs.bmi() {
        Some(bmi) if bmi < thresholds::BMI_SEVERE => 0.7,
        Some(bmi) if bmi < thresholds::BMI_MODERATE => 0.45,
        _ => 0.0,
    };
    if profile.age.is_finite() && profile.age >= 0.0 {
        if profile.age < 5.0 {
            score += 0.15;
        } else if profile.age > 65.0 {
            score += 0.1;
        }
    }
    if !risk.dietary_factors.is_empty() {
        score += 0.15;
    }
    clamp_unit(score)
}

fn infectious_risk(profile: &PatientProfile, risk: &RiskProfile) -> f64 {
    let mut score = 0.0;
    if has_fever(profile) {
        score += 0.3;
    }
    if profile.category_severity(SymptomCategory::Respiratory) > 0.0 {
        score += 0.2;
    }
    if profile.category_severity(SymptomCategory::Gastrointestinal) > 0.0 {
        score += 0.15;
    }
    score += (0.1 * endemic_infection_count(risk) as f64).min(0.3);
    clamp_unit(score)
}

/// Higher means poorer access to ongoing care.
fn chronic_care_access(profile: &PatientProfile) -> f64 {
    let psych = &profile.psychosocial_factors;
    let mut score = match psych.resource_access() {
        ResourceAccess::NoAccess => 0.5,
        ResourceAccess::Limited => 0.3,
        ResourceAccess::Adequate => 0.0,
    };
    let chronic = profile.symptoms.iter().filter(|s| s.is_chronic()).count();
    score += (0.15 * chronic as f64).min(0.3);
    if psych.language_barriers {
        score += 0.2;
    }
    clamp_unit(score)
}
