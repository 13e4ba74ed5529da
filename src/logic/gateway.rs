use super::{CropScorer, DiseaseClassifier, FertilizerSelector};
use crate::models::{
    CropRecommendation, CropRequest, DiseaseDiagnosis, DiseaseRequest, Engine, FailedAttempt,
    FertilizerRecommendation, FertilizerRequest, Prediction, ProviderKind,
};
use crate::providers::{prompts, schema, Prompt, ProviderError, ProviderRegistry};
use crate::reference::ReferenceData;
use std::sync::Arc;

pub const CROP_FALLBACK_LABEL: &str = "Rule-based (Local)";
pub const FERTILIZER_FALLBACK_LABEL: &str = "Rule-based";
pub const DISEASE_FALLBACK_LABEL: &str = "Intelligent Pattern Matching";

/// Result of walking the provider chain.
struct Consultation<T> {
    answer: Option<(ProviderKind, String, T)>,
    attempts: Vec<FailedAttempt>,
}

/// Routes each request through the configured providers, falling back to the
/// rule-based engines. Every `predict` call returns a result.
#[derive(Debug)]
pub struct AdvisoryGateway {
    registry: Arc<ProviderRegistry>,
    reference: Arc<ReferenceData>,
    crops: CropScorer,
    fertilizers: FertilizerSelector,
    diseases: DiseaseClassifier,
}

impl AdvisoryGateway {
    pub fn new(registry: Arc<ProviderRegistry>, reference: Arc<ReferenceData>) -> Self {
        Self {
            crops: CropScorer::new(reference.clone()),
            fertilizers: FertilizerSelector::new(reference.clone()),
            diseases: DiseaseClassifier::new(reference.clone()),
            registry,
            reference,
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub async fn predict_crop(&self, request: &CropRequest) -> Prediction<CropRecommendation> {
        let prompt = prompts::crop_prompt(request);
        let consultation = self.consult("crop", &prompt, schema::parse_crop).await;

        finish(consultation, CROP_FALLBACK_LABEL, || {
            self.crops.recommend(&request.sample)
        })
    }

    pub async fn recommend_fertilizer(
        &self,
        request: &FertilizerRequest,
    ) -> Prediction<FertilizerRecommendation> {
        let required = self.reference.requirement_for(&request.crop_type);
        let deficit = self.fertilizers.deficiency_for(request);
        let prompt = prompts::fertilizer_prompt(request, required, deficit);

        let consultation = self
            .consult("fertilizer", &prompt, |text| {
                schema::parse_fertilizer(text, deficit)
            })
            .await;

        finish(consultation, FERTILIZER_FALLBACK_LABEL, || {
            self.fertilizers.select(request)
        })
    }

    pub async fn diagnose_disease(&self, request: &DiseaseRequest) -> Prediction<DiseaseDiagnosis> {
        let prompt = prompts::disease_prompt(request);
        let consultation = self.consult("disease", &prompt, schema::parse_disease).await;

        finish(consultation, DISEASE_FALLBACK_LABEL, || {
            self.diseases.classify(&request.symptoms)
        })
    }

    /// Try each provider in priority order until one returns a valid answer.
    async fn consult<T>(
        &self,
        operation: &'static str,
        prompt: &Prompt,
        parse: impl Fn(&str) -> Result<T, ProviderError>,
    ) -> Consultation<T> {
        let mut attempts = Vec::new();

        for provider in self.registry.iter() {
            let kind = provider.kind();
            tracing::debug!(operation, provider = %kind, model = provider.model(), "Calling provider");

            let outcome = provider
                .attempt(prompt)
                .await
                .and_then(|text| parse(&text));

            match outcome {
                Ok(answer) => {
                    tracing::info!(operation, provider = %kind, "Provider succeeded");
                    return Consultation {
                        answer: Some((kind, provider.label(), answer)),
                        attempts,
                    };
                }
                Err(e) => {
                    tracing::warn!(operation, provider = %kind, error = %e, "Provider failed");
                    attempts.push(FailedAttempt {
                        provider: kind,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if self.registry.is_empty() {
            tracing::debug!(operation, "No providers configured");
        }
        Consultation {
            answer: None,
            attempts,
        }
    }
}

fn finish<T>(
    consultation: Consultation<T>,
    fallback_label: &str,
    fallback: impl FnOnce() -> T,
) -> Prediction<T> {
    match consultation.answer {
        Some((kind, label, output)) => Prediction {
            output,
            engine: Engine::Provider(kind),
            model_used: label,
            attempts: consultation.attempts,
        },
        None => {
            tracing::info!(
                failed_attempts = consultation.attempts.len(),
                engine = fallback_label,
                "Using rule-based fallback"
            );
            Prediction {
                output: fallback(),
                engine: Engine::RuleBased,
                model_used: fallback_label.to_string(),
                attempts: consultation.attempts,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Language, Npk, SoilClimateSample};
    use crate::providers::test_support::{
        closed_port_url, serve_once, serve_stalled, CannedResponse,
    };
    use crate::providers::{ChatCompletionsClient, GeminiClient, Provider};
    use std::time::Duration;

    fn gateway(registry: ProviderRegistry) -> AdvisoryGateway {
        AdvisoryGateway::new(Arc::new(registry), ReferenceData::builtin().unwrap())
    }

    fn rice_request() -> CropRequest {
        CropRequest::new(SoilClimateSample {
            nitrogen: 90.0,
            phosphorus: 42.0,
            potassium: 43.0,
            temperature: 25.0,
            humidity: 82.0,
            ph: 6.0,
            rainfall: 200.0,
        })
    }

    fn wheat_request() -> FertilizerRequest {
        FertilizerRequest {
            crop_type: "wheat".into(),
            soil_type: "loamy".into(),
            current_npk: Npk::new(10.0, 5.0, 5.0),
            soil_ph: 6.5,
            moisture: 50.0,
            language: Language::English,
        }
    }

    fn chat_body(content: &str) -> String {
        serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })
        .to_string()
    }

    fn groq(base: String) -> Provider {
        Provider::Groq(
            ChatCompletionsClient::new(base, "k", "llama-test", Duration::from_secs(5)).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_empty_registry_falls_back_for_every_operation() {
        let gw = gateway(ProviderRegistry::empty());

        let crop = gw.predict_crop(&rice_request()).await;
        assert_eq!(crop.engine, Engine::RuleBased);
        assert_eq!(crop.model_used, "Rule-based (Local)");
        assert_eq!(crop.output.recommended_crop, "rice");
        assert!(crop.attempts.is_empty());

        let fert = gw.recommend_fertilizer(&wheat_request()).await;
        assert_eq!(fert.model_used, "Rule-based");
        assert_eq!(fert.output.fertilizer_name, "NPK 17-17-17");

        let disease = gw
            .diagnose_disease(&DiseaseRequest {
                crop_type: "tomato".into(),
                symptoms: "brown spots and wilting".into(),
                language: Language::English,
            })
            .await;
        assert_eq!(disease.model_used, "Intelligent Pattern Matching");
        assert_eq!(disease.output.disease_name, "Leaf Spot Disease");
        assert!(disease.used_fallback());
    }

    #[tokio::test]
    async fn test_transport_failure_is_recorded_then_falls_back() {
        let gw = gateway(ProviderRegistry::new(vec![groq(closed_port_url().await)]));

        let crop = gw.predict_crop(&rice_request()).await;
        assert_eq!(crop.engine, Engine::RuleBased);
        assert_eq!(crop.attempts.len(), 1);
        assert_eq!(crop.attempts[0].provider, ProviderKind::Groq);
        assert!(crop.attempts[0].reason.starts_with("transport error"));
    }

    #[tokio::test]
    async fn test_provider_answer_is_used() {
        let answer = r#"{"recommended_crop":"jute","confidence":0.91,"reasoning":"humid",
            "alternatives":[{"crop":"rice","confidence":0.8}]}"#;
        let (base, _) = serve_once(CannedResponse::ok(chat_body(answer))).await;
        let gw = gateway(ProviderRegistry::new(vec![groq(base)]));

        let crop = gw.predict_crop(&rice_request()).await;
        assert_eq!(crop.engine, Engine::Provider(ProviderKind::Groq));
        assert_eq!(crop.model_used, "Groq llama-test");
        assert_eq!(crop.output.recommended_crop, "jute");
        assert!(crop.attempts.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_answer_moves_to_next_provider() {
        // Groq answers with an out-of-range confidence; Gemini answers properly.
        let bad = r#"{"recommended_crop":"rice","confidence":7.5}"#;
        let (groq_base, _) = serve_once(CannedResponse::ok(chat_body(bad))).await;

        let good = r#"{"disease_name":"Late Blight","confidence":0.9,"severity":"high"}"#;
        let gemini_body = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": good}]}}]
        })
        .to_string();
        let (gemini_base, _) = serve_once(CannedResponse::ok(gemini_body)).await;

        let gw = gateway(ProviderRegistry::new(vec![
            Provider::Gemini(
                GeminiClient::new(gemini_base, "k", "gem-test", Duration::from_secs(5)).unwrap(),
            ),
            groq(groq_base),
        ]));

        let d = gw
            .diagnose_disease(&DiseaseRequest {
                crop_type: "potato".into(),
                symptoms: "water-soaked lesions".into(),
                language: Language::English,
            })
            .await;
        // The Groq body is a crop answer, so it fails disease validation too.
        assert_eq!(d.attempts.len(), 1);
        assert_eq!(d.attempts[0].provider, ProviderKind::Groq);
        assert_eq!(d.engine, Engine::Provider(ProviderKind::Gemini));
        assert_eq!(d.output.disease_name, "Late Blight");
    }

    #[tokio::test]
    async fn test_status_failure_then_fallback_keeps_local_deficiency() {
        let (base, _) = serve_once(CannedResponse::status(500, "boom")).await;
        let gw = gateway(ProviderRegistry::new(vec![groq(base)]));

        let fert = gw.recommend_fertilizer(&wheat_request()).await;
        assert!(fert.used_fallback());
        assert_eq!(fert.attempts.len(), 1);
        assert!(fert.attempts[0].reason.contains("500"));
        assert_eq!(fert.output.deficiency.n, 40.0);
    }

    #[tokio::test]
    async fn test_silent_provider_times_out_then_falls_back() {
        let base = serve_stalled(false).await;
        let client =
            ChatCompletionsClient::new(base, "k", "llama-test", Duration::from_secs(1)).unwrap();
        let gw = gateway(ProviderRegistry::new(vec![Provider::Groq(client)]));

        let crop = gw.predict_crop(&rice_request()).await;
        assert_eq!(crop.engine, Engine::RuleBased);
        assert_eq!(crop.attempts.len(), 1);
        assert_eq!(crop.attempts[0].reason, "request timed out");
        assert_eq!(crop.output.recommended_crop, "rice");
    }
}
