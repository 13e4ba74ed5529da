use super::{CropRecommendation, DiseaseDiagnosis, FertilizerRecommendation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionKind {
    Crop,
    Fertilizer,
    Disease,
}

impl PredictionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionKind::Crop => "crop",
            PredictionKind::Fertilizer => "fertilizer",
            PredictionKind::Disease => "disease",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "crop" => Some(PredictionKind::Crop),
            "fertilizer" => Some(PredictionKind::Fertilizer),
            "disease" => Some(PredictionKind::Disease),
            _ => None,
        }
    }
}

impl std::fmt::Display for PredictionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// External AI services, in the order the gateway consults them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Groq,
    OpenAi,
    Gemini,
}

impl ProviderKind {
    pub const PRIORITY: [ProviderKind; 3] =
        [ProviderKind::Groq, ProviderKind::OpenAi, ProviderKind::Gemini];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "Groq",
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Gemini => "Gemini",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which engine produced a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "provider", rename_all = "snake_case")]
pub enum Engine {
    Provider(ProviderKind),
    RuleBased,
}

/// A provider that was called and did not produce a usable answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedAttempt {
    pub provider: ProviderKind,
    pub reason: String,
}

/// Gateway output: the engine result tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction<T> {
    pub output: T,
    pub engine: Engine,
    pub model_used: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<FailedAttempt>,
}

impl<T> Prediction<T> {
    pub fn used_fallback(&self) -> bool {
        self.engine == Engine::RuleBased
    }
}

/// Outputs that carry a confidence value for the history record.
pub trait Scored {
    fn confidence(&self) -> Option<f64>;
}

impl Scored for CropRecommendation {
    fn confidence(&self) -> Option<f64> {
        Some(self.confidence)
    }
}

impl Scored for DiseaseDiagnosis {
    fn confidence(&self) -> Option<f64> {
        Some(self.confidence)
    }
}

impl Scored for FertilizerRecommendation {
    fn confidence(&self) -> Option<f64> {
        None
    }
}

/// Stored audit record of one prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: Option<i64>,
    pub farmer: String,
    pub kind: PredictionKind,
    pub input_data: String,
    pub output_data: String,
    pub confidence: Option<f64>,
    pub model_used: String,
    pub created_at: DateTime<Utc>,
}

impl PredictionRecord {
    pub fn new<I, T>(
        farmer: &str,
        kind: PredictionKind,
        input: &I,
        prediction: &Prediction<T>,
    ) -> serde_json::Result<Self>
    where
        I: Serialize,
        T: Serialize + Scored,
    {
        Ok(Self {
            id: None,
            farmer: farmer.to_string(),
            kind,
            input_data: serde_json::to_string(input)?,
            output_data: serde_json::to_string(&prediction.output)?,
            confidence: prediction.output.confidence(),
            model_used: prediction.model_used.clone(),
            created_at: Utc::now(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionSummary {
    pub total_predictions: i64,
    pub predictions_by_type: BTreeMap<String, i64>,
    pub recent_activity_7days: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlternativeCrop, Deficiency};

    #[test]
    fn kind_round_trip() {
        for kind in [
            PredictionKind::Crop,
            PredictionKind::Fertilizer,
            PredictionKind::Disease,
        ] {
            assert_eq!(PredictionKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(PredictionKind::from_str("disease_image"), None);
    }

    #[test]
    fn provider_priority_order() {
        assert_eq!(
            ProviderKind::PRIORITY,
            [ProviderKind::Groq, ProviderKind::OpenAi, ProviderKind::Gemini]
        );
    }

    #[test]
    fn engine_serialization() {
        let json = serde_json::to_value(Engine::Provider(ProviderKind::Groq)).unwrap();
        assert_eq!(json["type"], "provider");
        assert_eq!(json["provider"], "groq");
        let json = serde_json::to_value(Engine::RuleBased).unwrap();
        assert_eq!(json["type"], "rule_based");
    }

    #[test]
    fn record_captures_confidence_and_model() {
        let prediction = Prediction {
            output: CropRecommendation {
                recommended_crop: "rice".into(),
                confidence: 1.0,
                reasoning: "test".into(),
                alternatives: vec![AlternativeCrop {
                    crop: "maize".into(),
                    confidence: 0.83,
                    reason: None,
                }],
                yield_potential: None,
                growing_tips: Vec::new(),
            },
            engine: Engine::RuleBased,
            model_used: "Rule-based (Local)".into(),
            attempts: Vec::new(),
        };
        let record =
            PredictionRecord::new("demo", PredictionKind::Crop, &"input", &prediction).unwrap();
        assert_eq!(record.confidence, Some(1.0));
        assert_eq!(record.model_used, "Rule-based (Local)");
        assert!(record.output_data.contains("rice"));
        assert!(prediction.used_fallback());
    }

    #[test]
    fn fertilizer_has_no_confidence() {
        let rec = FertilizerRecommendation::no_fertilizer_needed(Deficiency::default());
        assert_eq!(rec.confidence(), None);
    }
}
