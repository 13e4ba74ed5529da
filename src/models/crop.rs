use super::{Language, SoilClimateSample};
use serde::{Deserialize, Serialize};

/// Inclusive `[min, max]` band for one growing parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Absolute distance from `value` to the nearer of the two bounds.
    pub fn distance_to_nearer_bound(&self, value: f64) -> f64 {
        (value - self.min).abs().min((value - self.max).abs())
    }
}

/// Growing requirements of one crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropProfile {
    pub name: String,
    pub nitrogen: Range,
    pub phosphorus: Range,
    pub potassium: Range,
    pub temperature: Range,
    pub humidity: Range,
    pub ph: Range,
}

impl CropProfile {
    pub fn ranges(&self) -> [(&'static str, Range); 6] {
        [
            ("nitrogen", self.nitrogen),
            ("phosphorus", self.phosphorus),
            ("potassium", self.potassium),
            ("temperature", self.temperature),
            ("humidity", self.humidity),
            ("ph", self.ph),
        ]
    }

    /// The six scored parameters paired with the sample's values.
    /// Rainfall is carried by the sample but not scored.
    pub fn parameters(&self, sample: &SoilClimateSample) -> [(Range, f64); 6] {
        [
            (self.nitrogen, sample.nitrogen),
            (self.phosphorus, sample.phosphorus),
            (self.potassium, sample.potassium),
            (self.temperature, sample.temperature),
            (self.humidity, sample.humidity),
            (self.ph, sample.ph),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropScore {
    pub crop_name: String,
    pub score: f64,
    pub matched_parameter_count: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeCrop {
    pub crop: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRecommendation {
    pub recommended_crop: String,
    pub confidence: f64,
    pub reasoning: String,
    pub alternatives: Vec<AlternativeCrop>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yield_potential: Option<String>,
    #[serde(default)]
    pub growing_tips: Vec<String>,
}

/// Crop prediction input as received from the caller.
///
/// Location fields and language are forwarded to providers only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRequest {
    #[serde(flatten)]
    pub sample: SoilClimateSample,
    #[serde(default)]
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl CropRequest {
    pub fn new(sample: SoilClimateSample) -> Self {
        Self {
            sample,
            language: Language::default(),
            location: None,
            latitude: None,
            longitude: None,
        }
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        self.sample.validate()?;
        if let Some(lat) = self.latitude {
            super::soil::check_bound("latitude", lat, (-90.0, 90.0))?;
        }
        if let Some(lon) = self.longitude {
            super::soil::check_bound("longitude", lon, (-180.0, 180.0))?;
        }
        Ok(())
    }
}
