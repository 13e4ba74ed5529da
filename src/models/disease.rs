use super::Language;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiseaseSeverity {
    Low,
    Medium,
    High,
}

impl DiseaseSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiseaseSeverity::Low => "low",
            DiseaseSeverity::Medium => "medium",
            DiseaseSeverity::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(DiseaseSeverity::Low),
            "medium" | "moderate" => Some(DiseaseSeverity::Medium),
            "high" | "severe" => Some(DiseaseSeverity::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for DiseaseSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseDiagnosis {
    pub disease_name: String,
    pub confidence: f64,
    pub description: String,
    pub symptoms_analysis: String,
    pub treatment: String,
    pub prevention: String,
    pub severity: DiseaseSeverity,
    #[serde(default)]
    pub affected_parts: Vec<String>,
    #[serde(default)]
    pub organic_solutions: Vec<String>,
    #[serde(default)]
    pub chemical_solutions: Vec<String>,
    #[serde(default)]
    pub precautions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spread_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment_timeline: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseRequest {
    pub crop_type: String,
    pub symptoms: String,
    #[serde(default)]
    pub language: Language,
}

impl DiseaseRequest {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.symptoms.trim().is_empty() {
            return Err(crate::error::AgriSenseError::InvalidData(
                "symptoms must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Catalogue entry describing a disease commonly seen on a crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonDisease {
    pub name: String,
    pub symptoms: String,
    pub severity: DiseaseSeverity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_from_str() {
        assert_eq!(DiseaseSeverity::from_str("HIGH"), Some(DiseaseSeverity::High));
        assert_eq!(
            DiseaseSeverity::from_str("moderate"),
            Some(DiseaseSeverity::Medium)
        );
        assert_eq!(DiseaseSeverity::from_str("critical"), None);
    }

    #[test]
    fn severity_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&DiseaseSeverity::Medium).unwrap(),
            "\"medium\""
        );
    }

    #[test]
    fn blank_symptoms_rejected() {
        let mut request = DiseaseRequest {
            crop_type: "rice".into(),
            symptoms: "   ".into(),
            language: Language::English,
        };
        assert!(request.validate().is_err());
        request.symptoms = "yellow leaves".into();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn severity_ordering() {
        assert!(DiseaseSeverity::High > DiseaseSeverity::Medium);
        assert!(DiseaseSeverity::Medium > DiseaseSeverity::Low);
    }
}
