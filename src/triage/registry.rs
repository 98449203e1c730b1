use std::collections::HashMap;
use std::path::Path;

use crate::models::enums::OriginGroup;
use crate::models::RiskProfile;

use super::types::TriageError;

/// Read-only origin-group risk table. Built once, shared across analyses.
#[derive(Debug, Clone)]
pub struct RiskModifierRegistry {
    profiles: HashMap<OriginGroup, RiskProfile>,
    default: RiskProfile,
}

fn profile(genetic: &[&str], conditions: &[&str], dietary: &[&str], modifier: f64) -> RiskProfile {
    let owned = |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
    RiskProfile {
        genetic_predispositions: owned(genetic),
        common_conditions: owned(conditions),
        dietary_factors: owned(dietary),
        risk_modifier: modifier,
    }
}

impl RiskModifierRegistry {
    /// Compiled-in table covering every modeled origin group.
    pub fn builtin() -> Self {
        let profiles = HashMap::from([
            (
                OriginGroup::Syria,
                profile(
                    &["Familial Mediterranean fever", "Beta-thalassemia", "G6PD deficiency"],
                    &["Hypertension", "Diabetes", "Leishmaniasis", "Hepatitis A"],
                    &["Interrupted access to fresh produce", "High bread and sugar intake"],
                    1.3,
                ),
            ),
            (
                OriginGroup::Afghanistan,
                profile(
                    &["Beta-thalassemia", "G6PD deficiency"],
                    &["Tuberculosis", "Malnutrition", "Hepatitis B", "Malaria"],
                    &["Micronutrient deficiency", "Low dietary diversity"],
                    1.5,
                ),
            ),
            (
                OriginGroup::Ukraine,
                profile(
                    &[],
                    &["Cardiovascular disease", "Hypertension", "Tuberculosis", "HIV"],
                    &["High salt intake"],
                    1.2,
                ),
            ),
            (
                OriginGroup::SouthSudan,
                profile(
                    &["Sickle cell trait"],
                    &["Malaria", "Tuberculosis", "Malnutrition", "Cholera", "Kala-azar"],
                    &["Chronic food insecurity", "Unsafe drinking water"],
                    1.6,
                ),
            ),
            (
                OriginGroup::Sudan,
                profile(
                    &["Sickle cell trait", "G6PD deficiency"],
                    &["Malaria", "Malnutrition", "Cholera", "Tuberculosis"],
                    &["Chronic food insecurity"],
                    1.5,
                ),
            ),
            (
                OriginGroup::Somalia,
                profile(
                    &["Sickle cell trait"],
                    &["Tuberculosis", "Malaria", "Cholera", "Malnutrition", "Measles"],
                    &["Vitamin D deficiency", "Chronic food insecurity"],
                    1.6,
                ),
            ),
            (
                OriginGroup::Eritrea,
                profile(
                    &["G6PD deficiency"],
                    &["Tuberculosis", "Malaria", "Intestinal parasites"],
                    &["Iron deficiency"],
                    1.4,
                ),
            ),
            (
                OriginGroup::Myanmar,
                profile(
                    &["Alpha-thalassemia", "HbE disease"],
                    &["Tuberculosis", "Malaria", "Diphtheria", "Malnutrition"],
                    &["Rice-dominant diet", "Thiamine deficiency"],
                    1.4,
                ),
            ),
            (
                OriginGroup::DrCongo,
                profile(
                    &["Sickle cell disease"],
                    &["Malaria", "Tuberculosis", "Ebola virus disease", "Measles", "HIV"],
                    &["Cassava-dominant diet", "Protein deficiency"],
                    1.5,
                ),
            ),
            (
                OriginGroup::Iraq,
                profile(
                    &["Beta-thalassemia", "G6PD deficiency"],
                    &["Hypertension", "Diabetes", "Leishmaniasis"],
                    &["High sugar intake"],
                    1.2,
                ),
            ),
            (
                OriginGroup::Yemen,
                profile(
                    &["Sickle cell trait", "Beta-thalassemia"],
                    &["Cholera", "Malnutrition", "Diphtheria", "Dengue"],
                    &["Famine exposure", "Unsafe drinking water"],
                    1.5,
                ),
            ),
            (
                OriginGroup::Venezuela,
                profile(
                    &[],
                    &["Malaria", "Measles", "Diabetes", "Hypertension"],
                    &["Interrupted food supply"],
                    1.2,
                ),
            ),
        ]);

        Self {
            profiles,
            default: RiskProfile::neutral(),
        }
    }

    /// Load a registry from a JSON object keyed by origin group.
    /// An "other" entry replaces the neutral default. Unknown keys are rejected.
    pub fn load(path: &Path) -> Result<Self, TriageError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| TriageError::RegistryLoad(path.display().to_string(), e.to_string()))?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, TriageError> {
        let raw: HashMap<String, RiskProfile> = serde_json::from_str(json)
            .map_err(|e| TriageError::RegistryParse("risk registry".into(), e.to_string()))?;

        let mut profiles = HashMap::new();
        let mut default = RiskProfile::neutral();

        for (key, profile) in raw {
            match OriginGroup::from_key(&key) {
                OriginGroup::Other if key.trim().eq_ignore_ascii_case("other") => {
                    default = profile;
                }
                OriginGroup::Other => return Err(TriageError::UnknownOrigin(key)),
                group => {
                    profiles.insert(group, profile);
                }
            }
        }

        tracing::debug!(groups = profiles.len(), "Risk registry loaded");
        Ok(Self { profiles, default })
    }

    /// Profile for a free-text origin key; unknown keys get the default.
    pub fn lookup(&self, origin_key: &str) -> RiskProfile {
        self.profile_for(OriginGroup::from_key(origin_key)).clone()
    }

    pub fn profile_for(&self, group: OriginGroup) -> &RiskProfile {
        match self.profiles.get(&group) {
            Some(profile) => profile,
            None => {
                tracing::debug!(group = %group, "No modeled risk profile, using default");
                &self.default
            }
        }
    }

    pub fn default_profile(&self) -> &RiskProfile {
        &self.default
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for RiskModifierRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
