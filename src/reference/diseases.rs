use crate::models::{CommonDisease, DiseaseSeverity};

/// One keyword rule of the fallback classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct DiseaseRule {
    pub keywords: Vec<String>,
    pub disease_name: String,
    pub description: String,
    pub severity: DiseaseSeverity,
}

impl DiseaseRule {
    fn new(
        keywords: &[&str],
        disease_name: &str,
        description: &str,
        severity: DiseaseSeverity,
    ) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            disease_name: disease_name.to_string(),
            description: description.to_string(),
            severity,
        }
    }

    /// `symptoms` must already be lowercased.
    pub fn matches(&self, symptoms: &str) -> bool {
        self.keywords.iter().any(|k| symptoms.contains(k.as_str()))
    }
}

/// Ordered keyword rules; the first match wins.
pub fn disease_rules() -> Vec<DiseaseRule> {
    use DiseaseSeverity::*;

    vec![
        DiseaseRule::new(
            &["spot", "spots", "lesion", "brown", "black"],
            "Leaf Spot Disease",
            "Fungal or bacterial infection causing spots on leaves. Common in humid conditions.",
            Medium,
        ),
        DiseaseRule::new(
            &["wilt", "wilting", "droop"],
            "Wilt Disease",
            "Vascular disease causing wilting and drooping. Often caused by soil-borne pathogens.",
            High,
        ),
        DiseaseRule::new(
            &["yellow", "yellowing", "chlorosis"],
            "Nutrient Deficiency or Yellowing Disease",
            "Yellowing of leaves may indicate nutrient deficiency or viral infection.",
            Medium,
        ),
        DiseaseRule::new(
            &["powder", "white", "mildew"],
            "Powdery Mildew",
            "Fungal disease appearing as white powdery coating on leaves and stems.",
            Medium,
        ),
        DiseaseRule::new(
            &["rust", "orange", "pustule"],
            "Rust Disease",
            "Fungal infection causing orange or brown pustules on leaves.",
            Medium,
        ),
        DiseaseRule::new(
            &["blight", "decay"],
            "Blight",
            "Rapid deterioration of plant tissue, often caused by bacteria or fungi.",
            High,
        ),
    ]
}

/// Answer used when no keyword rule matches.
pub fn default_rule() -> DiseaseRule {
    DiseaseRule::new(
        &[],
        "Fungal Leaf Infection",
        "Common fungal infection affecting leaf tissue. Requires prompt treatment.",
        DiseaseSeverity::Medium,
    )
}

/// Text shared by every fallback diagnosis.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosisTemplate {
    pub confidence: f64,
    pub symptoms_analysis: String,
    pub treatment: String,
    pub prevention: String,
    pub affected_parts: Vec<String>,
    pub spread_rate: String,
    pub treatment_timeline: String,
    pub organic_solutions: Vec<String>,
    pub chemical_solutions: Vec<String>,
    pub precautions: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn diagnosis_template() -> DiagnosisTemplate {
    DiagnosisTemplate {
        confidence: 0.78,
        symptoms_analysis: "Analysis based on observed symptoms and common disease patterns"
            .to_string(),
        treatment: "1) Remove affected leaves immediately 2) Apply copper-based fungicide or \
                    neem oil spray 3) Improve air circulation around plants 4) Avoid overhead \
                    watering 5) Monitor daily for 2 weeks"
            .to_string(),
        prevention: "Maintain proper plant spacing for air circulation, water at soil level \
                     avoiding foliage, practice crop rotation, remove plant debris regularly, \
                     use disease-resistant varieties when available"
            .to_string(),
        affected_parts: strings(&[
            "Leaf discoloration and abnormal patterns",
            "Visible spots or lesions on plant tissue",
            "Potential wilting or stunted growth",
            "Risk of spread to healthy plants",
        ]),
        spread_rate: "Moderate to fast in humid, warm conditions".to_string(),
        treatment_timeline: "Begin treatment within 24 hours. Apply weekly for 3 weeks."
            .to_string(),
        organic_solutions: strings(&[
            "Neem oil spray (2ml per liter water)",
            "Copper-based fungicide (Bordeaux mixture)",
            "Baking soda solution (1 tablespoon per liter)",
        ]),
        chemical_solutions: strings(&["Mancozeb 75% WP", "Chlorothalonil fungicide"]),
        precautions: strings(&[
            "Wear protective gloves during application",
            "Apply in early morning or evening",
            "Keep away from food and water sources",
        ]),
    }
}

/// Diseases commonly reported per crop, for the catalogue.
pub fn common_diseases() -> Vec<(String, Vec<CommonDisease>)> {
    use DiseaseSeverity::*;

    let entry = |name: &str, symptoms: &str, severity| CommonDisease {
        name: name.to_string(),
        symptoms: symptoms.to_string(),
        severity,
    };

    vec![
        (
            "rice".to_string(),
            vec![
                entry("Blast", "Diamond-shaped lesions on leaves", High),
                entry("Bacterial Blight", "Yellow to white lesions", Medium),
                entry("Brown Spot", "Circular brown spots", Low),
            ],
        ),
        (
            "wheat".to_string(),
            vec![
                entry("Rust", "Orange-red pustules", High),
                entry("Powdery Mildew", "White powdery coating", Medium),
                entry("Leaf Blight", "Brown lesions", Medium),
            ],
        ),
        (
            "tomato".to_string(),
            vec![
                entry("Late Blight", "Dark water-soaked lesions", High),
                entry("Early Blight", "Concentric rings on leaves", Medium),
                entry("Leaf Curl", "Upward curling of leaves", Medium),
            ],
        ),
        (
            "potato".to_string(),
            vec![
                entry("Late Blight", "Water-soaked lesions", High),
                entry("Early Blight", "Target spot patterns", Medium),
                entry("Black Scurf", "Black sclerotia on tubers", Low),
            ],
        ),
    ]
}
