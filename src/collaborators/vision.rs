use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::models::enums::{AnalysisType, Severity};
use crate::models::{clamp_unit, Symptom};

use super::CollaboratorError;

/// One finding from the visual-analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualFinding {
    pub label: String,
    pub confidence: f64,
    pub severity: Severity,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualAnalysis {
    pub analysis_type: AnalysisType,
    #[serde(default)]
    pub findings: Vec<VisualFinding>,
}

impl VisualAnalysis {
    /// Findings at or above `min_confidence`, most confident first.
    pub fn confident_findings(&self, min_confidence: f64) -> Vec<&VisualFinding> {
        let mut findings: Vec<&VisualFinding> = self
            .findings
            .iter()
            .filter(|f| clamp_unit(f.confidence) >= min_confidence)
            .collect();
        findings.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        findings
    }

    /// Confident findings as intake symptoms on the ten-point scale, so
    /// they flow through the same pipeline as reported symptoms.
    pub fn to_symptoms(&self, min_confidence: f64) -> Vec<Symptom> {
        self.confident_findings(min_confidence)
            .into_iter()
            .map(|f| {
                let severity = match f.severity {
                    Severity::Low => 2.0,
                    Severity::Moderate => 5.0,
                    Severity::High => 7.0,
                    Severity::Critical => 9.0,
                };
                Symptom::new(f.label.clone(), severity, "")
            })
            .collect()
    }
}

/// Image analysis service. The core never decodes images itself.
pub trait VisualAnalysisService: Send + Sync {
    fn analyze<'a>(
        &'a self,
        image: &'a [u8],
        analysis_type: AnalysisType,
    ) -> BoxFuture<'a, Result<VisualAnalysis, CollaboratorError>>;
}

/// Returns the same findings for every image.
pub struct StaticVisualAnalysis {
    findings: Vec<VisualFinding>,
}

impl StaticVisualAnalysis {
    pub fn new(findings: Vec<VisualFinding>) -> Self {
        Self { findings }
    }
}

impl VisualAnalysisService for StaticVisualAnalysis {
    fn analyze<'a>(
        &'a self,
        _image: &'a [u8],
        analysis_type: AnalysisType,
    ) -> BoxFuture<'a, Result<VisualAnalysis, CollaboratorError>> {
        Box::pin(async move {
            Ok(VisualAnalysis {
                analysis_type,
                findings: self.findings.clone(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_finding(label: &str, confidence: f64, severity: Severity) -> VisualFinding {
        VisualFinding {
            label: label.into(),
            confidence,
            severity,
            recommendations: vec![],
        }
    }

    #[test]
    fn low_confidence_findings_dropped() {
        let analysis = VisualAnalysis {
            analysis_type: AnalysisType::Skin,
            findings: vec![
                make_finding("rash", 0.4, Severity::Low),
                make_finding("infected wound", 0.9, Severity::High),
                make_finding("scabies", 0.7, Severity::Moderate),
            ],
        };
        let kept = analysis.confident_findings(0.6);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].label, "infected wound");
    }

    #[test]
    fn findings_become_ten_point_symptoms() {
        let analysis = VisualAnalysis {
            analysis_type: AnalysisType::Wound,
            findings: vec![make_finding("infected wound", 0.9, Severity::High)],
        };
        let symptoms = analysis.to_symptoms(0.5);
        assert_eq!(symptoms.len(), 1);
        assert_eq!(symptoms[0].normalized_severity(), 7.0);
    }

    #[test]
    fn wire_format_is_camel_case() {
        let json = r#"{"analysisType":"nutrition","findings":[
            {"label":"visible wasting","confidence":0.8,"severity":"high","recommendations":["Weigh child"]}
        ]}"#;
        let analysis: VisualAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(analysis.analysis_type, AnalysisType::Nutrition);
        assert_eq!(analysis.findings[0].severity, Severity::High);
    }

    #[tokio::test]
    async fn static_service_echoes_analysis_type() {
        let service = StaticVisualAnalysis::new(vec![make_finding("rash", 0.8, Severity::Low)]);
        let analysis = service.analyze(&[0u8; 4], AnalysisType::All).await.unwrap();
        assert_eq!(analysis.analysis_type, AnalysisType::All);
        assert_eq!(analysis.findings.len(), 1);
    }
}
