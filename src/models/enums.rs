use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The string form doubles as the serde wire name.
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(Gender {
    Male => "male",
    Female => "female",
    Other => "other",
});

str_enum!(
    /// Access to food, water, shelter and basic care.
    ResourceAccess {
        NoAccess => "none",
        Limited => "limited",
        Adequate => "adequate",
    }
);

impl ResourceAccess {
    /// 0.0 for no access, 1.0 for adequate.
    pub fn score(&self) -> f32 {
        match self {
            Self::NoAccess => 0.0,
            Self::Limited => 0.5,
            Self::Adequate => 1.0,
        }
    }
}

impl Default for ResourceAccess {
    fn default() -> Self {
        Self::Limited
    }
}

str_enum!(
    /// Ordered from least to most severe.
    Severity {
        Low => "low",
        Moderate => "moderate",
        High => "high",
        Critical => "critical",
    }
);

str_enum!(
    /// Which intake sub-system recorded a symptom severity.
    SeverityScale {
        FivePoint => "five_point",
        TenPoint => "ten_point",
    }
);

impl Default for SeverityScale {
    fn default() -> Self {
        Self::TenPoint
    }
}

str_enum!(SymptomCategory {
    Fever => "fever",
    Pain => "pain",
    Respiratory => "respiratory",
    Gastrointestinal => "gastrointestinal",
    Other => "other",
});

impl SymptomCategory {
    /// Case-insensitive categorization of a free-text symptom name.
    /// Gastrointestinal is checked before pain so "abdominal pain" stays GI.
    pub fn categorize(name: &str) -> Self {
        let lower = name.to_lowercase();
        let has = |keys: &[&str]| keys.iter().any(|k| lower.contains(k));

        if has(&["fever", "chills", "temperature", "pyrexia"]) {
            Self::Fever
        } else if has(&["cough", "breath", "wheez", "dyspnea", "sputum", "congestion", "throat"]) {
            Self::Respiratory
        } else if has(&["nausea", "vomit", "diarrh", "stomach", "abdominal", "bowel", "appetite"]) {
            Self::Gastrointestinal
        } else if has(&["pain", "ache", "sore", "cramp", "tender"]) {
            Self::Pain
        } else {
            Self::Other
        }
    }
}

str_enum!(
    /// Care pathway implied by an urgency level.
    Disposition {
        Emergency => "emergency",
        UrgentCare => "urgent_care",
        PrimaryCare => "primary_care",
        RoutineClinic => "routine_clinic",
        SelfCare => "self_care",
    }
);

impl Disposition {
    pub fn from_urgency(level: u8) -> Self {
        match level {
            0 | 1 => Self::Emergency,
            2 => Self::UrgentCare,
            3 => Self::PrimaryCare,
            4 => Self::RoutineClinic,
            _ => Self::SelfCare,
        }
    }
}

str_enum!(Specialty {
    General => "general",
    Respiratory => "respiratory",
    MentalHealth => "mental_health",
    Nutrition => "nutrition",
});

str_enum!(
    /// Population groups with a modeled risk profile. `Other` carries the neutral default.
    OriginGroup {
        Syria => "syria",
        Afghanistan => "afghanistan",
        Ukraine => "ukraine",
        SouthSudan => "south_sudan",
        Sudan => "sudan",
        Somalia => "somalia",
        Eritrea => "eritrea",
        Myanmar => "myanmar",
        DrCongo => "dr_congo",
        Iraq => "iraq",
        Yemen => "yemen",
        Venezuela => "venezuela",
        Other => "other",
    }
);

impl OriginGroup {
    pub const MODELED: [OriginGroup; 12] = [
        Self::Syria,
        Self::Afghanistan,
        Self::Ukraine,
        Self::SouthSudan,
        Self::Sudan,
        Self::Somalia,
        Self::Eritrea,
        Self::Myanmar,
        Self::DrCongo,
        Self::Iraq,
        Self::Yemen,
        Self::Venezuela,
    ];

    /// Normalize a free-text origin key. Unrecognized keys resolve to `Other`.
    pub fn from_key(key: &str) -> Self {
        let normalized: String = key
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();

        if let Ok(group) = normalized.parse() {
            return group;
        }

        match normalized.as_str() {
            "syrian" | "syrian_arab_republic" => Self::Syria,
            "afghan" => Self::Afghanistan,
            "ukrainian" => Self::Ukraine,
            "south_sudanese" => Self::SouthSudan,
            "sudanese" => Self::Sudan,
            "somali" => Self::Somalia,
            "eritrean" => Self::Eritrea,
            "burma" | "burmese" | "rohingya" => Self::Myanmar,
            "drc" | "congo" | "congolese" | "democratic_republic_of_the_congo" => Self::DrCongo,
            "iraqi" => Self::Iraq,
            "yemeni" => Self::Yemen,
            "venezuelan" => Self::Venezuela,
            _ => Self::Other,
        }
    }
}

str_enum!(
    /// Analysis tag accepted by the visual-analysis collaborator.
    AnalysisType {
        Skin => "skin",
        Wound => "wound",
        Nutrition => "nutrition",
        General => "general",
        All => "all",
    }
);
