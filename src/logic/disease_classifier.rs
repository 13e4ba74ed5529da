use crate::models::DiseaseDiagnosis;
use crate::reference::diseases::DiseaseRule;
use crate::reference::ReferenceData;
use std::sync::Arc;

/// Keyword matcher used when no provider can diagnose the symptoms.
#[derive(Debug, Clone)]
pub struct DiseaseClassifier {
    reference: Arc<ReferenceData>,
}

impl DiseaseClassifier {
    pub fn new(reference: Arc<ReferenceData>) -> Self {
        Self { reference }
    }

    /// First rule whose keywords appear in the symptoms, or the default rule.
    pub fn matching_rule(&self, symptoms: &str) -> &DiseaseRule {
        let symptoms = symptoms.to_lowercase();
        self.reference
            .disease_rules()
            .iter()
            .find(|rule| rule.matches(&symptoms))
            .unwrap_or_else(|| self.reference.default_disease())
    }

    pub fn classify(&self, symptoms: &str) -> DiseaseDiagnosis {
        let rule = self.matching_rule(symptoms);
        let template = self.reference.diagnosis_template();

        DiseaseDiagnosis {
            disease_name: rule.disease_name.clone(),
            confidence: template.confidence,
            description: rule.description.clone(),
            symptoms_analysis: template.symptoms_analysis.clone(),
            treatment: template.treatment.clone(),
            prevention: template.prevention.clone(),
            severity: rule.severity,
            affected_parts: template.affected_parts.clone(),
            organic_solutions: template.organic_solutions.clone(),
            chemical_solutions: template.chemical_solutions.clone(),
            precautions: template.precautions.clone(),
            spread_rate: Some(template.spread_rate.clone()),
            treatment_timeline: Some(template.treatment_timeline.clone()),
        }
    }

    pub fn list_rules(&self) -> Vec<(&str, &[String])> {
        self.reference
            .disease_rules()
            .iter()
            .map(|r| (r.disease_name.as_str(), r.keywords.as_slice()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiseaseSeverity;

    fn classifier() -> DiseaseClassifier {
        DiseaseClassifier::new(ReferenceData::builtin().unwrap())
    }

    #[test]
    fn test_spot_beats_wilt() {
        let d = classifier().classify("brown spots and wilting leaves");
        assert_eq!(d.disease_name, "Leaf Spot Disease");
        assert_eq!(d.severity, DiseaseSeverity::Medium);
    }

    #[test]
    fn test_case_insensitive() {
        let d = classifier().classify("Plants are WILTING by noon");
        assert_eq!(d.disease_name, "Wilt Disease");
        assert_eq!(d.severity, DiseaseSeverity::High);
    }

    #[test]
    fn test_each_rule_reachable() {
        let c = classifier();
        let cases = [
            ("lesions on the stem", "Leaf Spot Disease"),
            ("leaves droop", "Wilt Disease"),
            ("chlorosis between veins", "Nutrient Deficiency or Yellowing Disease"),
            ("mildew on upper leaves", "Powdery Mildew"),
            ("orange pustules underneath", "Rust Disease"),
            ("stem decay at the base", "Blight"),
        ];
        for (symptoms, expected) in cases {
            assert_eq!(c.classify(symptoms).disease_name, expected, "{symptoms}");
        }
    }

    #[test]
    fn test_default_when_nothing_matches() {
        let d = classifier().classify("leaves curling slightly");
        assert_eq!(d.disease_name, "Fungal Leaf Infection");
        assert_eq!(d.severity, DiseaseSeverity::Medium);
    }

    #[test]
    fn test_empty_symptoms_are_total() {
        let d = classifier().classify("");
        assert_eq!(d.disease_name, "Fungal Leaf Infection");
        assert_eq!(d.confidence, 0.78);
    }

    #[test]
    fn test_template_fields() {
        let d = classifier().classify("white powder");
        assert_eq!(d.confidence, 0.78);
        assert_eq!(d.affected_parts.len(), 4);
        assert_eq!(d.organic_solutions.len(), 3);
        assert_eq!(d.chemical_solutions, vec!["Mancozeb 75% WP", "Chlorothalonil fungicide"]);
        assert_eq!(d.precautions.len(), 3);
        assert!(d.spread_rate.is_some());
        assert!(d.treatment_timeline.is_some());
    }

    #[test]
    fn test_list_rules_in_priority_order() {
        let c = classifier();
        let rules = c.list_rules();
        assert_eq!(rules.len(), 6);
        assert_eq!(rules[0].0, "Leaf Spot Disease");
        assert_eq!(rules[5].0, "Blight");
    }
}
