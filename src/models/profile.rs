use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::enums::{Gender, ResourceAccess, SeverityScale, SymptomCategory};

/// Neutral values used when a vital sign was not measured.
pub mod vital_defaults {
    pub const TEMPERATURE_C: f64 = 37.0;
    pub const HEART_RATE_BPM: f64 = 70.0;
    pub const SYSTOLIC_MMHG: f64 = 120.0;
    pub const DIASTOLIC_MMHG: f64 = 80.0;
    pub const OXYGEN_SATURATION_PCT: f64 = 98.0;
    pub const BMI: f64 = 22.0;
}

static CHRONIC_DURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:\d\s*|\b)(?:months?|mos?|years?|yrs?)\b").unwrap());

// ---------------------------------------------------------------------------
// Symptom
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symptom {
    pub name: String,
    pub severity: f64,
    #[serde(default)]
    pub scale: SeverityScale,
    #[serde(default)]
    pub duration: String,
}

impl Symptom {
    /// Ten-point symptom, the scale used by the intake form.
    pub fn new(name: impl Into<String>, severity: f64, duration: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            severity,
            scale: SeverityScale::TenPoint,
            duration: duration.into(),
        }
    }

    /// Severity on the shared 0-10 scale. Non-finite input reads as 0.
    pub fn normalized_severity(&self) -> f64 {
        if !self.severity.is_finite() {
            return 0.0;
        }
        let raw = match self.scale {
            SeverityScale::FivePoint => self.severity * 2.0,
            SeverityScale::TenPoint => self.severity,
        };
        raw.clamp(0.0, 10.0)
    }

    pub fn category(&self) -> SymptomCategory {
        SymptomCategory::categorize(&self.name)
    }

    /// Chronic when the duration mentions a month or year unit.
    pub fn is_chronic(&self) -> bool {
        CHRONIC_DURATION.is_match(&self.duration)
    }

    /// Case-insensitive substring match on the symptom name.
    pub fn mentions(&self, keyword: &str) -> bool {
        self.name.to_lowercase().contains(&keyword.to_lowercase())
    }
}

// ---------------------------------------------------------------------------
// VitalSigns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VitalSigns {
    /// Degrees Celsius.
    pub temperature: Option<f64>,
    pub heart_rate: Option<f64>,
    pub systolic_bp: Option<f64>,
    pub diastolic_bp: Option<f64>,
    /// Kilograms.
    pub weight: Option<f64>,
    /// Centimetres.
    pub height: Option<f64>,
    pub oxygen_saturation: Option<f64>,
}

/// Zero, negative and non-finite readings are blank form fields.
pub(crate) fn measured(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

impl VitalSigns {
    pub fn temperature_or_default(&self) -> f64 {
        measured(self.temperature).unwrap_or(vital_defaults::TEMPERATURE_C)
    }

    pub fn heart_rate_or_default(&self) -> f64 {
        measured(self.heart_rate).unwrap_or(vital_defaults::HEART_RATE_BPM)
    }

    pub fn systolic_or_default(&self) -> f64 {
        measured(self.systolic_bp).unwrap_or(vital_defaults::SYSTOLIC_MMHG)
    }

    pub fn diastolic_or_default(&self) -> f64 {
        measured(self.diastolic_bp).unwrap_or(vital_defaults::DIASTOLIC_MMHG)
    }

    pub fn oxygen_saturation_or_default(&self) -> f64 {
        measured(self.oxygen_saturation).unwrap_or(vital_defaults::OXYGEN_SATURATION_PCT)
    }

    /// Body-mass index when both weight and height were measured.
    pub fn bmi(&self) -> Option<f64> {
        let weight = measured(self.weight)?;
        let height_m = measured(self.height)? / 100.0;
        Some(weight / (height_m * height_m))
    }

    pub fn bmi_or_default(&self) -> f64 {
        self.bmi().unwrap_or(vital_defaults::BMI)
    }
}

// ---------------------------------------------------------------------------
// Psychosocial & cultural context
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PsychosocialFactors {
    pub trauma_history: bool,
    pub separation_from_family: bool,
    pub language_barriers: bool,
    pub access_to_resources: Option<ResourceAccess>,
}

impl PsychosocialFactors {
    /// Unknown access is treated as limited.
    pub fn resource_access(&self) -> ResourceAccess {
        self.access_to_resources.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CulturalBackground {
    /// ISO 639-1 code, e.g. "ar", "uk", "ps".
    pub primary_language: String,
    pub religious_background: Option<String>,
    pub health_beliefs: Vec<String>,
}

// ---------------------------------------------------------------------------
// PatientProfile
// ---------------------------------------------------------------------------

/// Intake snapshot for one assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    pub age: f64,
    #[serde(default = "default_gender")]
    pub gender: Gender,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub months_in_displacement: f64,
    #[serde(default)]
    pub family_size: f64,
    #[serde(default)]
    pub symptoms: Vec<Symptom>,
    #[serde(default)]
    pub vital_signs: VitalSigns,
    #[serde(default)]
    pub psychosocial_factors: PsychosocialFactors,
    #[serde(default)]
    pub cultural_background: CulturalBackground,
}

fn default_gender() -> Gender {
    Gender::Other
}

impl Default for PatientProfile {
    fn default() -> Self {
        Self {
            age: 30.0,
            gender: Gender::Other,
            origin: String::new(),
            months_in_displacement: 0.0,
            family_size: 1.0,
            symptoms: Vec::new(),
            vital_signs: VitalSigns::default(),
            psychosocial_factors: PsychosocialFactors::default(),
            cultural_background: CulturalBackground::default(),
        }
    }
}

impl PatientProfile {
    /// Profiles the pattern trees cannot reason about: no symptoms,
    /// or an age / displacement value outside any plausible range.
    pub fn is_degenerate(&self) -> bool {
        !self.age.is_finite()
            || self.age < 0.0
            || self.age > 130.0
            || !self.months_in_displacement.is_finite()
            || self.months_in_displacement < 0.0
            || self.symptoms.is_empty()
    }

    /// Displacement duration with invalid values read as zero.
    pub fn displacement_months(&self) -> f64 {
        if self.months_in_displacement.is_finite() {
            self.months_in_displacement.max(0.0)
        } else {
            0.0
        }
    }

    /// Household size with invalid values read as zero.
    pub fn household_size(&self) -> f64 {
        if self.family_size.is_finite() {
            self.family_size.max(0.0)
        } else {
            0.0
        }
    }

    /// Highest normalized severity among symptoms whose name contains `keyword`.
    pub fn keyword_severity(&self, keyword: &str) -> f64 {
        self.symptoms
            .iter()
            .filter(|s| s.mentions(keyword))
            .map(Symptom::normalized_severity)
            .fold(0.0, f64::max)
    }

    /// Highest normalized severity within a category, 0 when absent.
    pub fn category_severity(&self, category: SymptomCategory) -> f64 {
        self.symptoms
            .iter()
            .filter(|s| s.category() == category)
            .map(Symptom::normalized_severity)
            .fold(0.0, f64::max)
    }

    pub fn has_symptom(&self, keyword: &str) -> bool {
        self.symptoms.iter().any(|s| s.mentions(keyword))
    }

    pub fn has_any_symptom(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|k| self.has_symptom(k))
    }

    pub fn max_severity(&self) -> f64 {
        self.symptoms
            .iter()
            .map(Symptom::normalized_severity)
            .fold(0.0, f64::max)
    }
}
