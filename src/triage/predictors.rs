//! Rule-based predictors, one per specialty.
//!
//! Each reads only its own feature vector and returns a distribution over
//! the specialty's class table. Index 0 is always the baseline class.

use crate::models::enums::{Severity, Specialty};

use super::features::{
    bmi_from_nutrition, expected_len, generic_fields, mental_health_fields, nutrition_fields,
    respiratory_fields,
};
use super::types::{normalize_distribution, Predictor, TriageError};
use crate::config::thresholds;

/// One entry in a specialty's class table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialistClass {
    /// Condition reported when this class wins; `None` for non-diagnostic classes.
    pub condition: Option<&'static str>,
    pub severity: Severity,
}

const fn class(condition: &'static str, severity: Severity) -> SpecialistClass {
    SpecialistClass {
        condition: Some(condition),
        severity,
    }
}

const fn baseline(severity: Severity) -> SpecialistClass {
    SpecialistClass {
        condition: None,
        severity,
    }
}

static GENERAL_CLASSES: [SpecialistClass; 5] = [
    baseline(Severity::Low),
    baseline(Severity::Low),
    baseline(Severity::Moderate),
    baseline(Severity::High),
    baseline(Severity::Critical),
];

static RESPIRATORY_CLASSES: [SpecialistClass; 5] = [
    baseline(Severity::Low),
    class("Upper respiratory infection", Severity::Moderate),
    class("Acute breathing difficulty", Severity::High),
    class("Lower respiratory tract infection", Severity::High),
    class("Suspected pulmonary tuberculosis", Severity::High),
];

static MENTAL_HEALTH_CLASSES: [SpecialistClass; 4] = [
    baseline(Severity::Low),
    class("Mild psychological distress", Severity::Low),
    class("Moderate post-traumatic stress", Severity::Moderate),
    class("Severe post-traumatic stress", Severity::High),
];

static NUTRITION_CLASSES: [SpecialistClass; 3] = [
    baseline(Severity::Low),
    class("Moderate malnutrition", Severity::Moderate),
    class("Severe acute malnutrition", Severity::High),
];

pub fn class_table(specialty: Specialty) -> &'static [SpecialistClass] {
    match specialty {
        Specialty::General => &GENERAL_CLASSES,
        Specialty::Respiratory => &RESPIRATORY_CLASSES,
        Specialty::MentalHealth => &MENTAL_HEALTH_CLASSES,
        Specialty::Nutrition => &NUTRITION_CLASSES,
    }
}

fn check_len(specialty: Specialty, features: &[f32]) -> Result<(), TriageError> {
    let expected = expected_len(specialty);
    if features.len() != expected {
        return Err(TriageError::FeatureLength {
            specialty,
            expected,
            got: features.len(),
        });
    }
    Ok(())
}

/// Triangular membership of `value` in bins centred at `centers`,
/// with a small floor so no class has zero mass.
fn soft_bins(value: f32, centers: &[f32], width: f32) -> Vec<f32> {
    centers
        .iter()
        .map(|c| (1.0 - (value - c).abs() / width).max(0.0) + 0.02)
        .collect()
}

// ---------------------------------------------------------------------------
// Predictors
// ---------------------------------------------------------------------------

/// Severity-level predictor over the 20-field generic vector.
pub struct GeneralRulePredictor;

impl Predictor for GeneralRulePredictor {
    fn specialty(&self) -> Specialty {
        Specialty::General
    }

    fn predict(&self, features: &[f32]) -> Result<Vec<f32>, TriageError> {
        use generic_fields as f;
        check_len(Specialty::General, features)?;

        let worst_symptom = [
            f::FEVER_SEVERITY,
            f::PAIN_SEVERITY,
            f::RESPIRATORY_SEVERITY,
            f::GI_SEVERITY,
            f::OTHER_SEVERITY,
        ]
        .iter()
        .map(|&i| features[i])
        .fold(0.0_f32, f32::max);

        let temp_c = 35.0 + features[f::TEMPERATURE] * 7.0;
        let systolic = features[f::SYSTOLIC] * 250.0;
        let spo2 = features[f::OXYGEN_SATURATION] * 100.0;
        let red_flags = [
            temp_c as f64 > thresholds::RED_FLAG_TEMPERATURE_C,
            systolic as f64 > thresholds::RED_FLAG_SYSTOLIC,
            (spo2 as f64) < thresholds::RED_FLAG_OXYGEN_SATURATION,
        ]
        .iter()
        .filter(|flag| **flag)
        .count() as f32;

        let acuity = (0.6 * worst_symptom
            + 0.25 * red_flags
            + 0.1 * features[f::CHRONIC_FRACTION]
            + 0.05 * features[f::SYMPTOM_COUNT])
            .clamp(0.0, 1.0);

        normalize_distribution(&soft_bins(acuity, &[0.0, 0.25, 0.45, 0.65, 0.85], 0.25))
    }
}

pub struct RespiratoryRulePredictor;

impl Predictor for RespiratoryRulePredictor {
    fn specialty(&self) -> Specialty {
        Specialty::Respiratory
    }

    fn predict(&self, features: &[f32]) -> Result<Vec<f32>, TriageError> {
        use respiratory_fields as f;
        check_len(Specialty::Respiratory, features)?;

        let cough = features[f::COUGH];
        let fever = features[f::FEVER];
        let breathing = features[f::BREATHING_DIFFICULTY];
        let hypoxic = ((features[f::OXYGEN_SATURATION] * 100.0) as f64)
            < thresholds::RED_FLAG_OXYGEN_SATURATION;
        let tb_endemic = features[f::TB_ENDEMIC];
        let triad = cough > 0.0 && fever > 0.0 && breathing > 0.0;

        let upper = if cough > 0.0 && fever > 0.0 && !triad {
            0.5 + 0.25 * (cough + fever)
        } else {
            0.2 * (cough + features[f::SORE_THROAT])
        };
        let breathing_difficulty = if triad {
            0.2 * breathing
        } else {
            breathing + if hypoxic { 0.4 } else { 0.0 }
        };
        let lower = if triad {
            0.6 + (cough + fever + breathing) / 3.0 + if hypoxic { 0.2 } else { 0.0 }
        } else {
            0.0
        };
        let tb = tb_endemic
            * (if triad { lower } else { 0.0 }
                + 0.5 * features[f::CHRONIC_RESPIRATORY] * cough.max(0.1));
        let signal = upper.max(breathing_difficulty).max(lower).max(tb);
        let none = (1.0 - signal).max(0.05);

        let scores: Vec<f32> = [none, upper, breathing_difficulty, lower, tb]
            .iter()
            .map(|s| s + 0.02)
            .collect();
        normalize_distribution(&scores)
    }
}

pub struct MentalHealthRulePredictor;

impl Predictor for MentalHealthRulePredictor {
    fn specialty(&self) -> Specialty {
        Specialty::MentalHealth
    }

    fn predict(&self, features: &[f32]) -> Result<Vec<f32>, TriageError> {
        use mental_health_fields as f;
        check_len(Specialty::MentalHealth, features)?;

        let symptom_intensity = features[f::ANXIETY]
            .max(features[f::DEPRESSION])
            .max(features[f::SLEEP]);
        let displacement = (features[f::DISPLACEMENT] * 5.0).min(1.0);

        let stress = (0.3 * features[f::TRAUMA]
            + 0.15 * features[f::SEPARATION]
            + 0.05 * features[f::LANGUAGE_BARRIERS]
            + 0.15 * displacement
            + 0.25 * features[f::KEYWORD_COUNT]
            + 0.1 * symptom_intensity)
            .clamp(0.0, 1.0);

        normalize_distribution(&soft_bins(stress, &[0.0, 0.25, 0.5, 0.8], 0.3))
    }
}

pub struct NutritionRulePredictor;

impl Predictor for NutritionRulePredictor {
    fn specialty(&self) -> Specialty {
        Specialty::Nutrition
    }

    fn predict(&self, features: &[f32]) -> Result<Vec<f32>, TriageError> {
        use nutrition_fields as f;
        check_len(Specialty::Nutrition, features)?;

        let bmi = bmi_from_nutrition(features);
        let deficit = if bmi < thresholds::BMI_SEVERE {
            0.85
        } else if bmi < thresholds::BMI_MODERATE {
            0.5
        } else {
            0.05
        };
        let deficit = (deficit
            + 0.05 * features[f::UNDER_FIVE]
            + 0.05 * (1.0 - features[f::RESOURCE_ACCESS])
            + 0.05 * features[f::GI_SEVERITY]
            + 0.05 * features[f::DIETARY_RISK])
            .clamp(0.0, 1.0);

        normalize_distribution(&soft_bins(deficit, &[0.05, 0.5, 0.9], 0.35))
    }
}

/// The always-available rule predictor for a specialty.
pub fn rule_predictor(specialty: Specialty) -> Box<dyn Predictor> {
    match specialty {
        Specialty::General => Box::new(GeneralRulePredictor),
        Specialty::Respiratory => Box::new(RespiratoryRulePredictor),
        Specialty::MentalHealth => Box::new(MentalHealthRulePredictor),
        Specialty::Nutrition => Box::new(NutritionRulePredictor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::ResourceAccess;
    use crate::models::{PatientProfile, PsychosocialFactors, RiskProfile, Symptom, VitalSigns};
    use crate::triage::features::extract;

    fn argmax(dist: &[f32]) -> usize {
        dist.iter()
            .enumerate()
            .fold((0, f32::MIN), |best, (i, p)| if *p > best.1 { (i, *p) } else { best })
            .0
    }

    fn assert_distribution(dist: &[f32], len: usize) {
        assert_eq!(dist.len(), len);
        let total: f32 = dist.iter().sum();
        assert!((total - 1.0).abs() < 1e-4, "sum {total}");
        assert!(dist.iter().all(|p| *p > 0.0));
    }

    #[test]
    fn class_tables_match_distribution_lengths() {
        let features = extract(&PatientProfile::default(), &RiskProfile::neutral());
        for specialty in [
            Specialty::General,
            Specialty::Respiratory,
            Specialty::MentalHealth,
            Specialty::Nutrition,
        ] {
            let predictor = rule_predictor(specialty);
            assert_eq!(predictor.specialty(), specialty);
            let dist = predictor.predict(features.for_specialty(specialty)).unwrap();
            assert_distribution(&dist, class_table(specialty).len());
            assert!(class_table(specialty)[0].condition.is_none());
        }
    }

    #[test]
    fn wrong_length_rejected() {
        let err = RespiratoryRulePredictor.predict(&[0.0; 3]).unwrap_err();
        assert!(matches!(
            err,
            TriageError::FeatureLength { expected: 15, got: 3, .. }
        ));
    }

    #[test]
    fn healthy_profile_lands_on_baseline() {
        let profile = PatientProfile {
            symptoms: vec![Symptom::new("rash", 1.0, "1 day")],
            ..Default::default()
        };
        let features = extract(&profile, &RiskProfile::neutral());
        let resp = RespiratoryRulePredictor.predict(&features.respiratory).unwrap();
        assert_eq!(argmax(&resp), 0);
        let mental = MentalHealthRulePredictor.predict(&features.mental_health).unwrap();
        assert_eq!(argmax(&mental), 0);
        let nutrition = NutritionRulePredictor.predict(&features.nutrition).unwrap();
        assert_eq!(argmax(&nutrition), 0);
    }

    #[test]
    fn cough_and_fever_favor_upper_respiratory() {
        let profile = PatientProfile {
            symptoms: vec![Symptom::new("cough", 4.0, "1 week"), Symptom::new("fever", 3.0, "3 days")],
            ..Default::default()
        };
        let features = extract(&profile, &RiskProfile::neutral());
        let dist = RespiratoryRulePredictor.predict(&features.respiratory).unwrap();
        assert_eq!(argmax(&dist), 1);
    }

    #[test]
    fn triad_in_tb_origin_favors_tuberculosis() {
        let mut risk = RiskProfile::neutral();
        risk.common_conditions.push("Tuberculosis".into());
        let profile = PatientProfile {
            symptoms: vec![
                Symptom::new("cough", 7.0, "2 months"),
                Symptom::new("fever", 6.0, "3 weeks"),
                Symptom::new("shortness of breath", 6.0, "2 weeks"),
            ],
            ..Default::default()
        };
        let features = extract(&profile, &risk);
        let dist = RespiratoryRulePredictor.predict(&features.respiratory).unwrap();
        assert_eq!(argmax(&dist), 4);
    }

    #[test]
    fn severe_wasting_favors_severe_malnutrition() {
        let profile = PatientProfile {
            age: 7.0,
            vital_signs: VitalSigns {
                weight: Some(15.0),
                height: Some(110.0),
                ..Default::default()
            },
            psychosocial_factors: PsychosocialFactors {
                access_to_resources: Some(ResourceAccess::NoAccess),
                ..Default::default()
            },
            ..Default::default()
        };
        let features = extract(&profile, &RiskProfile::neutral());
        let dist = NutritionRulePredictor.predict(&features.nutrition).unwrap();
        assert_eq!(argmax(&dist), 2);
    }

    #[test]
    fn trauma_and_symptoms_raise_mental_health_class() {
        let profile = PatientProfile {
            months_in_displacement: 24.0,
            symptoms: vec![
                Symptom::new("anxiety", 8.0, "3 months"),
                Symptom::new("nightmares", 7.0, "3 months"),
                Symptom::new("depression", 7.0, "3 months"),
            ],
            psychosocial_factors: PsychosocialFactors {
                trauma_history: true,
                separation_from_family: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let features = extract(&profile, &RiskProfile::neutral());
        let dist = MentalHealthRulePredictor.predict(&features.mental_health).unwrap();
        assert_eq!(argmax(&dist), 3);
    }

    #[test]
    fn red_flags_raise_general_acuity() {
        let calm = PatientProfile {
            symptoms: vec![Symptom::new("headache", 2.0, "1 day")],
            ..Default::default()
        };
        let mut flagged = calm.clone();
        flagged.symptoms = vec![Symptom::new("headache", 9.0, "1 day")];
        flagged.vital_signs.temperature = Some(40.2);
        flagged.vital_signs.oxygen_saturation = Some(85.0);

        let calm_dist = GeneralRulePredictor
            .predict(&extract(&calm, &RiskProfile::neutral()).generic)
            .unwrap();
        let flagged_dist = GeneralRulePredictor
            .predict(&extract(&flagged, &RiskProfile::neutral()).generic)
            .unwrap();
        assert!(argmax(&flagged_dist) > argmax(&calm_dist));
        assert_eq!(argmax(&flagged_dist), 4);
    }
}
