//! Feature extraction: `PatientProfile` → fixed-layout numeric vectors.
//!
//! Every field is scaled into [0, 1]. Missing vitals take the neutral
//! defaults from `models::vital_defaults`, unknown resource access reads
//! as "limited". Extraction is total: any well-typed profile yields
//! vectors of the documented lengths.

use serde::{Deserialize, Serialize};

use crate::config::thresholds;
use crate::models::enums::{Gender, Specialty, SymptomCategory};
use crate::models::profile::measured;
use crate::models::{PatientProfile, RiskProfile};

/// Symptom-name keywords counted as mental-health signals.
pub const MENTAL_HEALTH_KEYWORDS: [&str; 4] = ["anxiety", "depression", "sleep", "nightmare"];

/// Symptom-name keywords read as breathing difficulty.
pub const BREATHING_KEYWORDS: [&str; 5] = ["breath", "dyspnea", "wheez", "respiratory distress", "difficulty breathing"];

/// Infectious diseases whose presence in an origin's common conditions raises exposure risk.
pub const ENDEMIC_INFECTIONS: [&str; 7] = [
    "tuberculosis",
    "malaria",
    "cholera",
    "measles",
    "diphtheria",
    "ebola",
    "hepatitis",
];

/// Field order of the 20-field generic vector.
pub mod generic_fields {
    pub const AGE: usize = 0;
    pub const MALE: usize = 1;
    pub const FEMALE: usize = 2;
    pub const DISPLACEMENT: usize = 3;
    pub const FAMILY_SIZE: usize = 4;
    pub const SYMPTOM_COUNT: usize = 5;
    pub const FEVER_SEVERITY: usize = 6;
    pub const PAIN_SEVERITY: usize = 7;
    pub const RESPIRATORY_SEVERITY: usize = 8;
    pub const GI_SEVERITY: usize = 9;
    pub const OTHER_SEVERITY: usize = 10;
    pub const CHRONIC_FRACTION: usize = 11;
    pub const TEMPERATURE: usize = 12;
    pub const HEART_RATE: usize = 13;
    pub const SYSTOLIC: usize = 14;
    pub const DIASTOLIC: usize = 15;
    pub const BMI: usize = 16;
    pub const OXYGEN_SATURATION: usize = 17;
    pub const TRAUMA: usize = 18;
    pub const RESOURCE_ACCESS: usize = 19;
    pub const LEN: usize = 20;
}

/// Field order of the 15-field respiratory vector.
pub mod respiratory_fields {
    pub const AGE: usize = 0;
    pub const COUGH: usize = 1;
    pub const FEVER: usize = 2;
    pub const BREATHING_DIFFICULTY: usize = 3;
    pub const CHEST_PAIN: usize = 4;
    pub const SORE_THROAT: usize = 5;
    pub const TEMPERATURE: usize = 6;
    pub const HEART_RATE: usize = 7;
    pub const OXYGEN_SATURATION: usize = 8;
    pub const CHRONIC_RESPIRATORY: usize = 9;
    pub const TB_ENDEMIC: usize = 10;
    pub const DISPLACEMENT: usize = 11;
    pub const FAMILY_SIZE: usize = 12;
    pub const RESOURCE_ACCESS: usize = 13;
    pub const RISK_MODIFIER: usize = 14;
    pub const LEN: usize = 15;
}

/// Field order of the 12-field mental-health vector.
pub mod mental_health_fields {
    pub const AGE: usize = 0;
    pub const FEMALE: usize = 1;
    pub const TRAUMA: usize = 2;
    pub const SEPARATION: usize = 3;
    pub const LANGUAGE_BARRIERS: usize = 4;
    pub const DISPLACEMENT: usize = 5;
    pub const ANXIETY: usize = 6;
    pub const DEPRESSION: usize = 7;
    pub const SLEEP: usize = 8;
    pub const FAMILY_SIZE: usize = 9;
    pub const RESOURCE_ACCESS: usize = 10;
    pub const KEYWORD_COUNT: usize = 11;
    pub const LEN: usize = 12;
}

/// Field order of the 10-field nutrition vector.
pub mod nutrition_fields {
    pub const AGE: usize = 0;
    pub const BMI: usize = 1;
    pub const WEIGHT: usize = 2;
    pub const HEIGHT: usize = 3;
    pub const UNDER_FIVE: usize = 4;
    pub const DISPLACEMENT: usize = 5;
    pub const FAMILY_SIZE: usize = 6;
    pub const RESOURCE_ACCESS: usize = 7;
    pub const GI_SEVERITY: usize = 8;
    pub const DIETARY_RISK: usize = 9;
    pub const LEN: usize = 10;
}

/// Scale to [0, 1] against `max`. Non-finite input reads as 0.
fn ratio(value: f64, max: f64) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    (value / max).clamp(0.0, 1.0) as f32
}

fn flag(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Maps a value inside [low, high] onto [0, 1].
fn band(value: f64, low: f64, high: f64) -> f32 {
    ratio(value - low, high - low)
}

fn sanitized_age(profile: &PatientProfile) -> f64 {
    if profile.age.is_finite() {
        profile.age.max(0.0)
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Shared profile signals
// ---------------------------------------------------------------------------

/// Fever from a reported symptom or a measured temperature.
pub fn has_fever(profile: &PatientProfile) -> bool {
    profile.category_severity(SymptomCategory::Fever) > 0.0
        || measured(profile.vital_signs.temperature).is_some_and(|t| t >= thresholds::FEVER_C)
}

/// Highest severity among chest symptoms described as pain, tightness or pressure.
/// `None` when no such symptom was reported.
pub fn chest_pain_severity(profile: &PatientProfile) -> Option<f64> {
    profile
        .symptoms
        .iter()
        .filter(|s| s.mentions("chest") && ["pain", "tight", "pressure"].iter().any(|k| s.mentions(k)))
        .map(|s| s.normalized_severity())
        .reduce(f64::max)
}

pub fn has_breathing_difficulty(profile: &PatientProfile) -> bool {
    profile.has_any_symptom(&BREATHING_KEYWORDS)
}

pub fn breathing_difficulty_severity(profile: &PatientProfile) -> f64 {
    BREATHING_KEYWORDS
        .iter()
        .map(|k| profile.keyword_severity(k))
        .fold(0.0, f64::max)
}

/// Number of symptoms naming a mental-health keyword; each symptom counts once.
pub fn mental_keyword_count(profile: &PatientProfile) -> usize {
    profile
        .symptoms
        .iter()
        .filter(|s| MENTAL_HEALTH_KEYWORDS.iter().any(|k| s.mentions(k)))
        .count()
}

pub fn endemic_infection_count(risk: &RiskProfile) -> usize {
    ENDEMIC_INFECTIONS
        .iter()
        .filter(|d| risk.lists_condition(d))
        .count()
}

// ---------------------------------------------------------------------------
// FeatureSet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub generic: Vec<f32>,
    pub respiratory: Vec<f32>,
    pub mental_health: Vec<f32>,
    pub nutrition: Vec<f32>,
}

impl FeatureSet {
    pub fn for_specialty(&self, specialty: Specialty) -> &[f32] {
        match specialty {
            Specialty::General => &self.generic,
            Specialty::Respiratory => &self.respiratory,
            Specialty::MentalHealth => &self.mental_health,
            Specialty::Nutrition => &self.nutrition,
        }
    }
}

pub fn expected_len(specialty: Specialty) -> usize {
    match specialty {
        Specialty::General => generic_fields::LEN,
        Specialty::Respiratory => respiratory_fields::LEN,
        Specialty::MentalHealth => mental_health_fields::LEN,
        Specialty::Nutrition => nutrition_fields::LEN,
    }
}

/// Extract all four vectors. The risk profile supplies origin-level
/// signals (TB endemicity, dietary risk, modifier).
pub fn extract(profile: &PatientProfile, risk: &RiskProfile) -> FeatureSet {
    FeatureSet {
        generic: extract_generic(profile),
        respiratory: extract_respiratory(profile, risk),
        mental_health: extract_mental_health(profile),
        nutrition: extract_nutrition(profile, risk),
    }
}

fn extract_generic(profile: &PatientProfile) -> Vec<f32> {
    use generic_fields as f;

    let vitals = &profile.vital_signs;
    let psych = &profile.psychosocial_factors;
    let chronic_fraction = if profile.symptoms.is_empty() {
        0.0
    } else {
        let chronic = profile.symptoms.iter().filter(|s| s.is_chronic()).count();
        chronic as f64 / profile.symptoms.len() as f64
    };

    let mut v = vec![0.0; f::LEN];
    v[f::AGE] = ratio(sanitized_age(profile), 100.0);
    v[f::MALE] = flag(profile.gender == Gender::Male);
    v[f::FEMALE] = flag(profile.gender == Gender::Female);
    v[f::DISPLACEMENT] = ratio(profile.displacement_months(), 60.0);
    v[f::FAMILY_SIZE] = ratio(profile.household_size(), 10.0);
    v[f::SYMPTOM_COUNT] = ratio(profile.symptoms.len() as f64, 10.0);
    v[f::FEVER_SEVERITY] = ratio(profile.category_severity(SymptomCategory::Fever), 10.0);
    v[f::PAIN_SEVERITY] = ratio(profile.category_severity(SymptomCategory::Pain), 10.0);
    v[f::RESPIRATORY_SEVERITY] =
        ratio(profile.category_severity(SymptomCategory::Respiratory), 10.0);
    v[f::GI_SEVERITY] = ratio(profile.category_severity(SymptomCategory::Gastrointestinal), 10.0);
    v[f::OTHER_SEVERITY] = ratio(profile.category_severity(SymptomCategory::Other), 10.0);
    v[f::CHRONIC_FRACTION] = chronic_fraction as f32;
    v[f::TEMPERATURE] = band(vitals.temperature_or_default(), 35.0, 42.0);
    v[f::HEART_RATE] = ratio(vitals.heart_rate_or_default(), 200.0);
    v[f::SYSTOLIC] = ratio(vitals.systolic_or_default(), 250.0);
    v[f::DIASTOLIC] = ratio(vitals.diastolic_or_default(), 150.0);
    v[f::BMI] = ratio(vitals.bmi_or_default(), 40.0);
    v[f::OXYGEN_SATURATION] = ratio(vitals.oxygen_saturation_or_default(), 100.0);
    v[f::TRAUMA] = flag(psych.trauma_history);
    v[f::RESOURCE_ACCESS] = psych.resource_access().score();
    v
}

fn extract_respiratory(profile: &PatientProfile, risk: &RiskProfile) -> Vec<f32> {
    use respiratory_fields as f;

    let vitals = &profile.vital_signs;
    let chronic_respiratory = profile
        .symptoms
        .iter()
        .any(|s| s.category() == SymptomCategory::Respiratory && s.is_chronic());
    let fever = if has_fever(profile) {
        profile.category_severity(SymptomCategory::Fever).max(5.0)
    } else {
        0.0
    };

    let mut v = vec![0.0; f::LEN];
    v[f::AGE] = ratio(sanitized_age(profile), 100.0);
    v[f::COUGH] = ratio(profile.keyword_severity("cough"), 10.0);
    v[f::FEVER] = ratio(fever, 10.0);
    v[f::BREATHING_DIFFICULTY] = ratio(breathing_difficulty_severity(profile), 10.0);
    v[f::CHEST_PAIN] = ratio(chest_pain_severity(profile).unwrap_or(0.0), 10.0);
    v[f::SORE_THROAT] = ratio(profile.keyword_severity("throat"), 10.0);
    v[f::TEMPERATURE] = band(vitals.temperature_or_default(), 35.0, 42.0);
    v[f::HEART_RATE] = ratio(vitals.heart_rate_or_default(), 200.0);
    v[f::OXYGEN_SATURATION] = ratio(vitals.oxygen_saturation_or_default(), 100.0);
    v[f::CHRONIC_RESPIRATORY] = flag(chronic_respiratory);
    v[f::TB_ENDEMIC] = flag(risk.lists_condition("tuberculosis"));
    v[f::DISPLACEMENT] = ratio(profile.displacement_months(), 60.0);
    v[f::FAMILY_SIZE] = ratio(profile.household_size(), 10.0);
    v[f::RESOURCE_ACCESS] = profile.psychosocial_factors.resource_access().score();
    v[f::RISK_MODIFIER] = ratio(risk.effective_modifier() - 1.0, 0.6);
    v
}

fn extract_mental_health(profile: &PatientProfile) -> Vec<f32> {
    use mental_health_fields as f;

    let psych = &profile.psychosocial_factors;
    let sleep = profile
        .keyword_severity("sleep")
        .max(profile.keyword_severity("nightmare"));

    let mut v = vec![0.0; f::LEN];
    v[f::AGE] = ratio(sanitized_age(profile), 100.0);
    v[f::FEMALE] = flag(profile.gender == Gender::Female);
    v[f::TRAUMA] = flag(psych.trauma_history);
    v[f::SEPARATION] = flag(psych.separation_from_family);
    v[f::LANGUAGE_BARRIERS] = flag(psych.language_barriers);
    v[f::DISPLACEMENT] = ratio(profile.displacement_months(), 60.0);
    v[f::ANXIETY] = ratio(profile.keyword_severity("anxiety"), 10.0);
    v[f::DEPRESSION] = ratio(profile.keyword_severity("depression"), 10.0);
    v[f::SLEEP] = ratio(sleep, 10.0);
    v[f::FAMILY_SIZE] = ratio(profile.household_size(), 10.0);
    v[f::RESOURCE_ACCESS] = psych.resource_access().score();
    v[f::KEYWORD_COUNT] = ratio(mental_keyword_count(profile) as f64, 4.0);
    v
}

fn extract_nutrition(profile: &PatientProfile, risk: &RiskProfile) -> Vec<f32> {
    use nutrition_fields as f;

    let vitals = &profile.vital_signs;
    let age = sanitized_age(profile);

    let mut v = vec![0.0; f::LEN];
    v[f::AGE] = ratio(age, 100.0);
    v[f::BMI] = ratio(vitals.bmi_or_default(), 40.0);
    v[f::WEIGHT] = ratio(vitals.weight.unwrap_or(0.0), 150.0);
    v[f::HEIGHT] = ratio(vitals.height.unwrap_or(0.0), 220.0);
    v[f::UNDER_FIVE] = flag(profile.age.is_finite() && profile.age < 5.0 && profile.age >= 0.0);
    v[f::DISPLACEMENT] = ratio(profile.displacement_months(), 60.0);
    v[f::FAMILY_SIZE] = ratio(profile.household_size(), 10.0);
    v[f::RESOURCE_ACCESS] = profile.psychosocial_factors.resource_access().score();
    v[f::GI_SEVERITY] = ratio(profile.category_severity(SymptomCategory::Gastrointestinal), 10.0);
    v[f::DIETARY_RISK] = ratio(risk.dietary_factors.len() as f64, 4.0);
    v
}

/// BMI recovered from a nutrition vector.
pub fn bmi_from_nutrition(features: &[f32]) -> f64 {
    features
        .get(nutrition_fields::BMI)
        .map(|b| *b as f64 * 40.0)
        .unwrap_or(crate::models::vital_defaults::BMI)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::ResourceAccess;
    use crate::models::{PsychosocialFactors, Symptom, VitalSigns};

    fn make_profile() -> PatientProfile {
        PatientProfile {
            age: 35.0,
            gender: Gender::Female,
            origin: "syria".into(),
            months_in_displacement: 18.0,
            family_size: 5.0,
            symptoms: vec![
                Symptom::new("cough", 4.0, "1 week"),
                Symptom::new("fever", 3.0, "3 days"),
            ],
            vital_signs: VitalSigns {
                temperature: Some(38.7),
                ..Default::default()
            },
            psychosocial_factors: PsychosocialFactors {
                trauma_history: true,
                access_to_resources: Some(ResourceAccess::Limited),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn vectors_have_documented_lengths() {
        let features = extract(&make_profile(), &RiskProfile::neutral());
        assert_eq!(features.generic.len(), 20);
        assert_eq!(features.respiratory.len(), 15);
        assert_eq!(features.mental_health.len(), 12);
        assert_eq!(features.nutrition.len(), 10);
        for specialty in [
            Specialty::General,
            Specialty::Respiratory,
            Specialty::MentalHealth,
            Specialty::Nutrition,
        ] {
            assert_eq!(features.for_specialty(specialty).len(), expected_len(specialty));
        }
    }

    #[test]
    fn all_fields_within_unit_interval() {
        let mut profile = make_profile();
        profile.age = 250.0;
        profile.vital_signs.heart_rate = Some(900.0);
        profile.family_size = 40.0;
        let features = extract(&profile, &RiskProfile::neutral());
        for v in features
            .generic
            .iter()
            .chain(&features.respiratory)
            .chain(&features.mental_health)
            .chain(&features.nutrition)
        {
            assert!((0.0..=1.0).contains(v), "out of range: {v}");
        }
    }

    #[test]
    fn missing_vitals_use_neutral_defaults() {
        let profile = PatientProfile::default();
        let features = extract(&profile, &RiskProfile::neutral());
        let temp = features.generic[generic_fields::TEMPERATURE];
        assert!((temp - 2.0 / 7.0).abs() < 1e-5);
        assert!((features.generic[generic_fields::HEART_RATE] - 0.35).abs() < 1e-6);
        assert!((features.generic[generic_fields::RESOURCE_ACCESS] - 0.5).abs() < 1e-6);
        assert!((bmi_from_nutrition(&features.nutrition) - 22.0).abs() < 1e-4);
    }

    #[test]
    fn degenerate_profile_does_not_panic() {
        let profile = PatientProfile {
            age: f64::NAN,
            months_in_displacement: -3.0,
            ..Default::default()
        };
        let features = extract(&profile, &RiskProfile::neutral());
        assert_eq!(features.generic[generic_fields::AGE], 0.0);
        assert_eq!(features.generic[generic_fields::DISPLACEMENT], 0.0);
    }

    #[test]
    fn category_severity_feeds_generic_vector() {
        let features = extract(&make_profile(), &RiskProfile::neutral());
        assert!((features.generic[generic_fields::RESPIRATORY_SEVERITY] - 0.4).abs() < 1e-6);
        assert!((features.generic[generic_fields::FEVER_SEVERITY] - 0.3).abs() < 1e-6);
        assert_eq!(features.generic[generic_fields::GI_SEVERITY], 0.0);
    }

    #[test]
    fn tb_endemic_flag_follows_origin() {
        let mut risk = RiskProfile::neutral();
        risk.common_conditions.push("Tuberculosis".into());
        let features = extract(&make_profile(), &risk);
        assert_eq!(features.respiratory[respiratory_fields::TB_ENDEMIC], 1.0);
    }

    #[test]
    fn fever_from_temperature_alone() {
        let profile = PatientProfile {
            symptoms: vec![Symptom::new("cough", 3.0, "2 days")],
            vital_signs: VitalSigns {
                temperature: Some(38.2),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(has_fever(&profile));
        assert!(!has_fever(&PatientProfile::default()));
    }

    #[test]
    fn chest_congestion_is_not_chest_pain() {
        let profile = PatientProfile {
            symptoms: vec![Symptom::new("chest congestion", 6.0, "3 days")],
            ..Default::default()
        };
        assert!(chest_pain_severity(&profile).is_none());

        let profile = PatientProfile {
            symptoms: vec![Symptom::new("Chest tightness", 6.0, "3 days")],
            ..Default::default()
        };
        assert_eq!(chest_pain_severity(&profile), Some(6.0));
    }

    #[test]
    fn mental_keywords_count_symptoms_once() {
        let profile = PatientProfile {
            symptoms: vec![
                Symptom::new("anxiety and poor sleep", 6.0, "1 month"),
                Symptom::new("nightmares", 5.0, "2 weeks"),
                Symptom::new("insomnia", 4.0, "1 month"),
            ],
            ..Default::default()
        };
        assert_eq!(mental_keyword_count(&profile), 2);
    }
}
