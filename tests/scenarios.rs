use refugee_triage::models::enums::{Disposition, OriginGroup, ResourceAccess, Severity};
use refugee_triage::models::{PsychosocialFactors, Symptom, VitalSigns};
use refugee_triage::triage::{agreement, GENERAL_EVALUATION};
use refugee_triage::{PatientProfile, TriageEngine, TriagePrediction};

fn analyze(profile: &PatientProfile) -> TriagePrediction {
    TriageEngine::with_defaults().analyze(profile)
}

fn make_profile(origin: &str, age: f64, symptoms: Vec<Symptom>) -> PatientProfile {
    PatientProfile {
        age,
        origin: origin.into(),
        symptoms,
        ..Default::default()
    }
}

fn sample_profiles() -> Vec<PatientProfile> {
    let mut profiles = vec![
        PatientProfile::default(),
        make_profile("syria", 35.0, vec![Symptom::new("cough", 4.0, "1 week")]),
        make_profile("south sudan", 2.0, vec![Symptom::new("diarrhea", 9.0, "2 weeks")]),
        make_profile("somalia", 70.0, vec![Symptom::new("chest pain", 10.0, "1 hour")]),
        make_profile(
            "afghanistan",
            40.0,
            vec![
                Symptom::new("cough", 9.0, "3 months"),
                Symptom::new("fever", 9.0, "1 month"),
                Symptom::new("shortness of breath", 9.0, "2 weeks"),
                Symptom::new("anxiety", 9.0, "1 year"),
                Symptom::new("nightmares", 9.0, "1 year"),
            ],
        ),
        make_profile("atlantis", f64::NAN, vec![Symptom::new("fever", 20.0, "")]),
    ];

    let mut flagged = make_profile("yemen", 30.0, vec![Symptom::new("headache", 3.0, "1 day")]);
    flagged.vital_signs = VitalSigns {
        temperature: Some(41.0),
        systolic_bp: Some(230.0),
        oxygen_saturation: Some(82.0),
        ..Default::default()
    };
    flagged.psychosocial_factors = PsychosocialFactors {
        trauma_history: true,
        separation_from_family: true,
        language_barriers: true,
        access_to_resources: Some(ResourceAccess::NoAccess),
    };
    flagged.months_in_displacement = 48.0;
    profiles.push(flagged);
    profiles
}

// ---------------------------------------------------------------------------
// Concrete scenarios
// ---------------------------------------------------------------------------

#[test]
fn syrian_cough_and_fever_is_upper_respiratory() {
    let mut profile = make_profile(
        "syria",
        35.0,
        vec![Symptom::new("cough", 4.0, "1 week"), Symptom::new("fever", 3.0, "3 days")],
    );
    profile.months_in_displacement = 18.0;
    profile.vital_signs.temperature = Some(38.7);
    profile.psychosocial_factors.trauma_history = true;
    profile.psychosocial_factors.access_to_resources = Some(ResourceAccess::Limited);

    let result = analyze(&profile);
    assert_eq!(result.primary_diagnosis.condition, "Upper respiratory infection");
    assert!((result.primary_diagnosis.probability - 0.78).abs() < 1e-9);
    assert!((3..=4).contains(&result.urgency_level));
    assert!((result.ethnic_factors.profile.risk_modifier - 1.3).abs() < 1e-9);
    assert!(!result.ethnic_factors.profile.lists_condition("tuberculosis"));
    assert!(result
        .secondary_conditions
        .iter()
        .any(|s| s.condition == "Moderate post-traumatic stress"));
}

#[test]
fn ukrainian_insomnia_and_trauma_is_moderate_not_severe() {
    let mut profile = make_profile(
        "ukraine",
        28.0,
        vec![Symptom::new("headache", 5.0, "2 weeks"), Symptom::new("insomnia", 4.0, "1 month")],
    );
    profile.months_in_displacement = 8.0;
    profile.psychosocial_factors.trauma_history = true;
    profile.psychosocial_factors.separation_from_family = true;

    let result = analyze(&profile);
    assert_eq!(result.primary_diagnosis.condition, "Moderate post-traumatic stress");
    assert_eq!(result.primary_diagnosis.severity, Severity::Moderate);
    assert_eq!(result.urgency_level, 3);
}

#[test]
fn afghan_child_with_low_bmi_gets_nutrition_line_but_no_pediatric_line() {
    let profile = PatientProfile {
        age: 7.0,
        origin: "afghanistan".into(),
        months_in_displacement: 24.0,
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

    let result = analyze(&profile);
    assert!(result.refugee_specific_risks.nutritional_status > 0.6);
    assert!(result
        .recommendations
        .iter()
        .any(|r| r.to_lowercase().contains("malnutrition")));
    assert!(!result.recommendations.iter().any(|r| r.starts_with("Pediatric")));
    assert!(result
        .secondary_conditions
        .iter()
        .any(|s| s.condition == "Severe acute malnutrition"));
}

#[test]
fn chest_pain_pre_empts_other_patterns() {
    let mut profile = make_profile(
        "iraq",
        50.0,
        vec![
            Symptom::new("chest pain", 8.0, "2 hours"),
            Symptom::new("cough", 5.0, "1 week"),
            Symptom::new("fever", 5.0, "3 days"),
            Symptom::new("anxiety", 6.0, "2 months"),
        ],
    );
    profile.vital_signs.systolic_bp = Some(150.0);
    profile.psychosocial_factors.trauma_history = true;

    let result = analyze(&profile);
    assert_eq!(result.primary_diagnosis.condition, "Acute coronary syndrome");
    assert_eq!(result.primary_diagnosis.severity, Severity::Critical);
    assert_eq!(result.urgency_level, 1);
    assert_eq!(result.disposition, Disposition::Emergency);
    assert!(result
        .secondary_conditions
        .iter()
        .any(|s| s.condition == "Upper respiratory infection"));
}

#[test]
fn empty_profile_from_unknown_origin_falls_back() {
    let result = analyze(&make_profile("atlantis", 30.0, vec![]));
    assert_eq!(result.primary_diagnosis.condition, GENERAL_EVALUATION);
    assert_eq!(result.urgency_level, 4);
    assert!((result.confidence - 0.70).abs() < 1e-9);
    assert_eq!(result.ethnic_factors.origin_group, OriginGroup::Other);
    assert_eq!(result.ethnic_factors.profile.risk_modifier, 1.0);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn probabilities_and_confidence_stay_bounded() {
    for profile in sample_profiles() {
        let result = analyze(&profile);
        let p = result.primary_diagnosis.probability;
        assert!((0.0..=0.95).contains(&p), "primary probability {p}");
        assert!((0.0..=0.95).contains(&result.confidence));
        assert!((0.0..=1.0).contains(&result.ensemble_agreement));
        assert!(result.secondary_conditions.len() <= 3);
        for s in &result.secondary_conditions {
            assert!((0.0..=0.95).contains(&s.probability));
        }
        let r = result.refugee_specific_risks;
        for v in [
            r.displacement_health,
            r.trauma_score,
            r.nutritional_status,
            r.infectious_risk,
            r.chronic_care_access,
        ] {
            assert!((0.0..=1.0).contains(&v));
        }
        assert!((1..=5).contains(&result.urgency_level));
        assert!(result.recommendations.len() <= 8);
        assert!(!result.recommendations.is_empty());
    }
}

#[test]
fn urgency_one_implies_critical() {
    for profile in sample_profiles() {
        let result = analyze(&profile);
        if result.urgency_level == 1 {
            assert_eq!(result.primary_diagnosis.severity, Severity::Critical);
        }
    }
}

#[test]
fn vital_signs_only_escalate() {
    for profile in sample_profiles() {
        let mut calm = profile.clone();
        calm.vital_signs = VitalSigns::default();
        let mut flagged = profile.clone();
        flagged.vital_signs.temperature = Some(40.0);
        flagged.vital_signs.systolic_bp = Some(210.0);

        let calm_level = analyze(&calm).urgency_level;
        let flagged_level = analyze(&flagged).urgency_level;
        assert!(flagged_level <= calm_level);
        assert!(flagged_level <= 2);
    }
}

#[test]
fn analysis_is_deterministic() {
    let engine = TriageEngine::with_defaults();
    for profile in sample_profiles() {
        assert_eq!(engine.analyze(&profile), engine.analyze(&profile));
    }
}

#[test]
fn unknown_origin_is_neutral() {
    let result = analyze(&make_profile("narnia", 30.0, vec![Symptom::new("cough", 3.0, "2 days")]));
    assert_eq!(result.ethnic_factors.profile.risk_modifier, 1.0);
    assert!(result.ethnic_factors.profile.genetic_predispositions.is_empty());
}

#[test]
fn secondary_never_contains_primary() {
    for profile in sample_profiles() {
        let result = analyze(&profile);
        assert!(result
            .secondary_conditions
            .iter()
            .all(|s| s.condition != result.primary_diagnosis.condition));
    }
}

#[test]
fn single_predictor_agreement_is_one() {
    assert_eq!(agreement(&[&[0.1, 0.2, 0.7]]), 1.0);
}

#[test]
fn profile_json_uses_camel_case_and_defaults() {
    let json = r#"{
        "age": 35,
        "gender": "female",
        "origin": "Syria",
        "monthsInDisplacement": 18,
        "familySize": 5,
        "symptoms": [
            {"name": "cough", "severity": 2, "scale": "five_point", "duration": "1 week"},
            {"name": "fever", "severity": 3}
        ],
        "vitalSigns": {"temperature": 38.7},
        "psychosocialFactors": {"traumaHistory": true, "accessToResources": "limited"},
        "culturalBackground": {"primaryLanguage": "ar", "religiousBackground": "Muslim"}
    }"#;
    let profile: PatientProfile = serde_json::from_str(json).unwrap();
    assert_eq!(profile.symptoms[0].normalized_severity(), 4.0);

    let result = analyze(&profile);
    assert_eq!(result.primary_diagnosis.condition, "Upper respiratory infection");
    let out = serde_json::to_value(&result).unwrap();
    assert!(out.get("primaryDiagnosis").is_some());
    assert!(out.get("urgencyLevel").is_some());
    assert_eq!(out["ethnicFactors"]["originGroup"], "syria");
    assert!(result
        .cultural_considerations
        .iter()
        .any(|c| c.contains("Muslim")));
}

#[test]
fn blank_oxygen_reading_does_not_escalate() {
    let mut profile = make_profile("jordan", 30.0, vec![Symptom::new("rash", 2.0, "2 days")]);
    let baseline = analyze(&profile);

    profile.vital_signs.oxygen_saturation = Some(0.0);
    let blank = analyze(&profile);
    assert_eq!(blank.urgency_level, baseline.urgency_level);
    assert_eq!(blank.urgency_level, 5);
    assert_eq!(blank.disposition, Disposition::SelfCare);
}
