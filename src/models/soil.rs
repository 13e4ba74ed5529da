use crate::error::{AgriSenseError, Result};
use serde::{Deserialize, Serialize};

/// Soil and climate measurements for one crop recommendation request.
///
/// Nutrients are in kg/ha, temperature in °C, humidity in %, rainfall in mm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilClimateSample {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

impl SoilClimateSample {
    pub const NUTRIENT_BOUNDS: (f64, f64) = (0.0, 200.0);
    pub const TEMPERATURE_BOUNDS: (f64, f64) = (-10.0, 60.0);
    pub const HUMIDITY_BOUNDS: (f64, f64) = (0.0, 100.0);
    pub const PH_BOUNDS: (f64, f64) = (0.0, 14.0);
    pub const RAINFALL_BOUNDS: (f64, f64) = (0.0, 500.0);

    /// Reject values outside the declared input domain.
    pub fn validate(&self) -> Result<()> {
        check_bound("nitrogen", self.nitrogen, Self::NUTRIENT_BOUNDS)?;
        check_bound("phosphorus", self.phosphorus, Self::NUTRIENT_BOUNDS)?;
        check_bound("potassium", self.potassium, Self::NUTRIENT_BOUNDS)?;
        check_bound("temperature", self.temperature, Self::TEMPERATURE_BOUNDS)?;
        check_bound("humidity", self.humidity, Self::HUMIDITY_BOUNDS)?;
        check_bound("ph", self.ph, Self::PH_BOUNDS)?;
        check_bound("rainfall", self.rainfall, Self::RAINFALL_BOUNDS)?;
        Ok(())
    }
}

/// Nitrogen / phosphorus / potassium triple.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Npk {
    #[serde(rename = "N")]
    pub n: f64,
    #[serde(rename = "P")]
    pub p: f64,
    #[serde(rename = "K")]
    pub k: f64,
}

impl Npk {
    pub const fn new(n: f64, p: f64, k: f64) -> Self {
        Self { n, p, k }
    }

    pub fn validate(&self) -> Result<()> {
        check_bound("N", self.n, (0.0, f64::MAX))?;
        check_bound("P", self.p, (0.0, f64::MAX))?;
        check_bound("K", self.k, (0.0, f64::MAX))?;
        Ok(())
    }
}

pub(crate) fn check_bound(name: &str, value: f64, (min, max): (f64, f64)) -> Result<()> {
    // NaN fails `contains`, so it is rejected here too.
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(AgriSenseError::InvalidData(format!(
            "{} = {} is outside [{}, {}]",
            name, value, min, max
        )))
    }
}
