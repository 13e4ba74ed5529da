use super::{Language, Npk};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FertilizerCategory {
    Nitrogen,
    Phosphorus,
    Potassium,
    Complex,
    Balanced,
    /// Only used by the "no fertilizer needed" result.
    None,
}

impl FertilizerCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FertilizerCategory::Nitrogen => "Nitrogen",
            FertilizerCategory::Phosphorus => "Phosphorus",
            FertilizerCategory::Potassium => "Potassium",
            FertilizerCategory::Complex => "Complex",
            FertilizerCategory::Balanced => "Balanced",
            FertilizerCategory::None => "None",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "nitrogen" => Some(FertilizerCategory::Nitrogen),
            "phosphorus" => Some(FertilizerCategory::Phosphorus),
            "potassium" => Some(FertilizerCategory::Potassium),
            "complex" => Some(FertilizerCategory::Complex),
            "balanced" => Some(FertilizerCategory::Balanced),
            "none" => Some(FertilizerCategory::None),
            _ => None,
        }
    }
}

impl std::fmt::Display for FertilizerCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Nutrient content of a commercial fertilizer, in percent by weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilizerProfile {
    pub name: String,
    pub n_pct: f64,
    pub p_pct: f64,
    pub k_pct: f64,
    pub category: FertilizerCategory,
}

/// Target nutrient levels for a crop, in kg/acre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientRequirement {
    pub crop_name: String,
    pub required: Npk,
}

/// Nutrient shortfall, floored at zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Deficiency {
    #[serde(rename = "N")]
    pub n: f64,
    #[serde(rename = "P")]
    pub p: f64,
    #[serde(rename = "K")]
    pub k: f64,
}

impl Deficiency {
    pub fn is_satisfied(&self) -> bool {
        self.n == 0.0 && self.p == 0.0 && self.k == 0.0
    }

    pub fn all_exceed(&self, threshold: f64) -> bool {
        self.n > threshold && self.p > threshold && self.k > threshold
    }

    pub fn mean(&self) -> f64 {
        (self.n + self.p + self.k) / 3.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryRecommendation {
    pub fertilizer_name: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilizerRecommendation {
    pub fertilizer_name: String,
    pub category: FertilizerCategory,
    pub quantity_kg_per_acre: f64,
    pub application_method: String,
    pub timing: String,
    pub frequency: String,
    pub precautions: Vec<String>,
    pub cost_estimate: f64,
    #[serde(default)]
    pub secondary_recommendations: Vec<SecondaryRecommendation>,
    pub deficiency: Deficiency,
}

impl FertilizerRecommendation {
    pub const NO_FERTILIZER_NEEDED: &'static str = "No Fertilizer Needed";

    pub fn no_fertilizer_needed(deficiency: Deficiency) -> Self {
        Self {
            fertilizer_name: Self::NO_FERTILIZER_NEEDED.to_string(),
            category: FertilizerCategory::None,
            quantity_kg_per_acre: 0.0,
            application_method: "Soil is already balanced".to_string(),
            timing: "N/A".to_string(),
            frequency: "N/A".to_string(),
            precautions: vec!["Maintain current nutrient levels".to_string()],
            cost_estimate: 0.0,
            secondary_recommendations: Vec::new(),
            deficiency,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilizerRequest {
    pub crop_type: String,
    pub soil_type: String,
    pub current_npk: Npk,
    pub soil_ph: f64,
    pub moisture: f64,
    #[serde(default)]
    pub language: Language,
}

impl FertilizerRequest {
    pub fn validate(&self) -> crate::error::Result<()> {
        self.current_npk.validate()?;
        super::soil::check_bound("soil_ph", self.soil_ph, (0.0, 14.0))?;
        super::soil::check_bound("moisture", self.moisture, (0.0, 100.0))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_from_str() {
        assert_eq!(
            FertilizerCategory::from_str("nitrogen"),
            Some(FertilizerCategory::Nitrogen)
        );
        assert_eq!(
            FertilizerCategory::from_str(" Balanced "),
            Some(FertilizerCategory::Balanced)
        );
        assert_eq!(FertilizerCategory::from_str("organic"), None);
    }

    #[test]
    fn category_round_trip() {
        for category in [
            FertilizerCategory::Nitrogen,
            FertilizerCategory::Phosphorus,
            FertilizerCategory::Potassium,
            FertilizerCategory::Complex,
            FertilizerCategory::Balanced,
            FertilizerCategory::None,
        ] {
            assert_eq!(FertilizerCategory::from_str(category.as_str()), Some(category));
        }
    }

    #[test]
    fn deficiency_helpers() {
        let d = Deficiency {
            n: 15.0,
            p: 15.0,
            k: 15.0,
        };
        assert!(d.all_exceed(10.0));
        assert!(!d.all_exceed(15.0));
        assert_eq!(d.mean(), 15.0);
        assert!(!d.is_satisfied());
        assert!(Deficiency::default().is_satisfied());
    }

    #[test]
    fn sentinel_recommendation() {
        let rec = FertilizerRecommendation::no_fertilizer_needed(Deficiency::default());
        assert_eq!(rec.category, FertilizerCategory::None);
        assert_eq!(rec.quantity_kg_per_acre, 0.0);
        assert_eq!(rec.cost_estimate, 0.0);
        assert!(rec.secondary_recommendations.is_empty());
    }

    #[test]
    fn request_validation() {
        let mut req = FertilizerRequest {
            crop_type: "wheat".into(),
            soil_type: "loamy".into(),
            current_npk: Npk::new(10.0, 5.0, 5.0),
            soil_ph: 6.5,
            moisture: 50.0,
            language: Language::English,
        };
        assert!(req.validate().is_ok());
        req.moisture = 120.0;
        assert!(req.validate().is_err());
    }
}
