//! Parsing and range checks for provider answers.

use super::ProviderError;
use crate::logic::fertilizer_selector::MAX_SECONDARY;
use crate::models::{
    AlternativeCrop, CropRecommendation, Deficiency, DiseaseDiagnosis, DiseaseSeverity,
    FertilizerCategory, FertilizerRecommendation, SecondaryRecommendation,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Drop a surrounding markdown code fence, if the model added one.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ProviderError> {
    serde_json::from_str(strip_code_fence(text)).map_err(|e| ProviderError::Malformed(e.to_string()))
}

fn check_confidence(field: &str, value: f64) -> Result<(), ProviderError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ProviderError::Malformed(format!(
            "{} {} outside [0, 1]",
            field, value
        )))
    }
}

fn check_non_negative(field: &str, value: f64) -> Result<(), ProviderError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ProviderError::Malformed(format!("{} {} is negative", field, value)))
    }
}

fn check_present(field: &str, value: &str) -> Result<(), ProviderError> {
    if value.trim().is_empty() {
        Err(ProviderError::Malformed(format!("{} is empty", field)))
    } else {
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct CropAnswer {
    recommended_crop: String,
    confidence: f64,
    #[serde(default)]
    reasoning: String,
    #[serde(default)]
    alternatives: Vec<AlternativeCrop>,
    #[serde(default)]
    yield_potential: Option<String>,
    #[serde(default)]
    growing_tips: Vec<String>,
}

pub fn parse_crop(text: &str) -> Result<CropRecommendation, ProviderError> {
    let answer: CropAnswer = decode(text)?;

    check_present("recommended_crop", &answer.recommended_crop)?;
    check_confidence("confidence", answer.confidence)?;
    for alt in &answer.alternatives {
        check_confidence("alternative confidence", alt.confidence)?;
    }

    Ok(CropRecommendation {
        recommended_crop: answer.recommended_crop,
        confidence: answer.confidence,
        reasoning: answer.reasoning,
        alternatives: answer.alternatives,
        yield_potential: answer.yield_potential,
        growing_tips: answer.growing_tips,
    })
}

#[derive(Debug, Deserialize)]
struct FertilizerAnswer {
    fertilizer_name: String,
    #[serde(alias = "category")]
    fertilizer_type: String,
    quantity_kg_per_acre: f64,
    #[serde(default)]
    application_method: String,
    #[serde(default)]
    timing: String,
    #[serde(default)]
    frequency: String,
    #[serde(default)]
    precautions: Vec<String>,
    #[serde(default)]
    cost_estimate: f64,
    #[serde(default)]
    secondary_recommendations: Vec<SecondaryRecommendation>,
}

/// `deficiency` is computed locally and attached as-is.
pub fn parse_fertilizer(
    text: &str,
    deficiency: Deficiency,
) -> Result<FertilizerRecommendation, ProviderError> {
    let answer: FertilizerAnswer = decode(text)?;

    check_present("fertilizer_name", &answer.fertilizer_name)?;
    let category = FertilizerCategory::from_str(&answer.fertilizer_type).ok_or_else(|| {
        ProviderError::Malformed(format!(
            "unknown fertilizer_type '{}'",
            answer.fertilizer_type
        ))
    })?;
    check_non_negative("quantity_kg_per_acre", answer.quantity_kg_per_acre)?;
    check_non_negative("cost_estimate", answer.cost_estimate)?;
    let mut secondary_recommendations = answer.secondary_recommendations;
    secondary_recommendations.truncate(MAX_SECONDARY);
    for secondary in &secondary_recommendations {
        check_non_negative("secondary quantity", secondary.quantity)?;
    }

    Ok(FertilizerRecommendation {
        fertilizer_name: answer.fertilizer_name,
        category,
        quantity_kg_per_acre: answer.quantity_kg_per_acre,
        application_method: answer.application_method,
        timing: answer.timing,
        frequency: answer.frequency,
        precautions: answer.precautions,
        cost_estimate: answer.cost_estimate,
        secondary_recommendations,
        deficiency,
    })
}

#[derive(Debug, Deserialize)]
struct DiseaseAnswer {
    disease_name: String,
    confidence: f64,
    #[serde(default)]
    description: String,
    #[serde(default)]
    symptoms_analysis: String,
    #[serde(default)]
    treatment: String,
    #[serde(default)]
    prevention: String,
    severity: String,
    #[serde(default)]
    affected_parts: Vec<String>,
    #[serde(default)]
    organic_solutions: Vec<String>,
    #[serde(default)]
    chemical_solutions: Vec<String>,
    #[serde(default)]
    precautions: Vec<String>,
    #[serde(default)]
    spread_rate: Option<String>,
    #[serde(default)]
    treatment_timeline: Option<String>,
}

pub fn parse_disease(text: &str) -> Result<DiseaseDiagnosis, ProviderError> {
    let answer: DiseaseAnswer = decode(text)?;

    check_present("disease_name", &answer.disease_name)?;
    check_confidence("confidence", answer.confidence)?;
    let severity = DiseaseSeverity::from_str(&answer.severity).ok_or_else(|| {
        ProviderError::Malformed(format!("unknown severity '{}'", answer.severity))
    })?;

    Ok(DiseaseDiagnosis {
        disease_name: answer.disease_name,
        confidence: answer.confidence,
        description: answer.description,
        symptoms_analysis: answer.symptoms_analysis,
        treatment: answer.treatment,
        prevention: answer.prevention,
        severity,
        affected_parts: answer.affected_parts,
        organic_solutions: answer.organic_solutions,
        chemical_solutions: answer.chemical_solutions,
        precautions: answer.precautions,
        spread_rate: answer.spread_rate,
        treatment_timeline: answer.treatment_timeline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {}  "), "{}");
    }

    #[test]
    fn test_parse_crop() {
        let text = r#"{"recommended_crop":"rice","confidence":0.92,"reasoning":"wet",
            "alternatives":[{"crop":"maize","confidence":0.7,"reason":"ok"}],
            "growing_tips":["flood early"]}"#;
        let rec = parse_crop(text).unwrap();
        assert_eq!(rec.recommended_crop, "rice");
        assert_eq!(rec.alternatives[0].reason.as_deref(), Some("ok"));
        assert_eq!(rec.growing_tips.len(), 1);
    }

    #[test]
    fn test_crop_confidence_out_of_range() {
        let err = parse_crop(r#"{"recommended_crop":"rice","confidence":95}"#).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));

        let text = r#"{"recommended_crop":"rice","confidence":0.9,
            "alternatives":[{"crop":"maize","confidence":-0.1}]}"#;
        assert!(parse_crop(text).is_err());
    }

    #[test]
    fn test_not_json_is_malformed() {
        assert!(matches!(
            parse_crop("I recommend rice."),
            Err(ProviderError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_fertilizer_keeps_local_deficiency() {
        let text = r#"```json
        {"fertilizer_name":"Urea","fertilizer_type":"Nitrogen","quantity_kg_per_acre":87,
         "application_method":"broadcast","timing":"basal","frequency":"twice",
         "precautions":["gloves"],"cost_estimate":30.5}
        ```"#;
        let deficit = Deficiency { n: 40.0, p: 0.0, k: 0.0 };
        let rec = parse_fertilizer(text, deficit).unwrap();
        assert_eq!(rec.category, FertilizerCategory::Nitrogen);
        assert_eq!(rec.deficiency, deficit);
        assert!(rec.secondary_recommendations.is_empty());
    }

    #[test]
    fn test_fertilizer_secondaries_capped() {
        let text = r#"{"fertilizer_name":"Urea","fertilizer_type":"Nitrogen","quantity_kg_per_acre":50,
            "secondary_recommendations":[
                {"fertilizer_name":"DAP","quantity":40},
                {"fertilizer_name":"MOP","quantity":30},
                {"fertilizer_name":"Zinc Sulphate","quantity":5}]}"#;
        let rec = parse_fertilizer(text, Deficiency::default()).unwrap();
        let names: Vec<_> = rec
            .secondary_recommendations
            .iter()
            .map(|s| s.fertilizer_name.as_str())
            .collect();
        assert_eq!(names, ["DAP", "MOP"]);
    }

    #[test]
    fn test_fertilizer_negative_quantity() {
        let text = r#"{"fertilizer_name":"Urea","fertilizer_type":"Nitrogen","quantity_kg_per_acre":-5}"#;
        assert!(parse_fertilizer(text, Deficiency::default()).is_err());
    }

    #[test]
    fn test_fertilizer_unknown_type() {
        let text = r#"{"fertilizer_name":"Compost","fertilizer_type":"Organic","quantity_kg_per_acre":5}"#;
        assert!(parse_fertilizer(text, Deficiency::default()).is_err());
    }

    #[test]
    fn test_parse_disease() {
        let text = r#"{"disease_name":"Early Blight","confidence":0.88,"severity":"Moderate",
            "treatment":"copper","organic_solutions":["neem"]}"#;
        let d = parse_disease(text).unwrap();
        assert_eq!(d.severity, DiseaseSeverity::Medium);
        assert_eq!(d.organic_solutions, vec!["neem"]);
        assert!(d.spread_rate.is_none());
    }

    #[test]
    fn test_disease_unknown_severity() {
        let text = r#"{"disease_name":"X","confidence":0.5,"severity":"catastrophic"}"#;
        assert!(parse_disease(text).is_err());
    }
}
