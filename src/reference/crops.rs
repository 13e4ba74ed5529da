use crate::models::{CropProfile, Npk, NutrientRequirement, Range};

fn profile(
    name: &str,
    nitrogen: (f64, f64),
    phosphorus: (f64, f64),
    potassium: (f64, f64),
    temperature: (f64, f64),
    humidity: (f64, f64),
    ph: (f64, f64),
) -> CropProfile {
    CropProfile {
        name: name.to_string(),
        nitrogen: Range::new(nitrogen.0, nitrogen.1),
        phosphorus: Range::new(phosphorus.0, phosphorus.1),
        potassium: Range::new(potassium.0, potassium.1),
        temperature: Range::new(temperature.0, temperature.1),
        humidity: Range::new(humidity.0, humidity.1),
        ph: Range::new(ph.0, ph.1),
    }
}

/// Crop suitability table. Order matters: it breaks score ties.
#[rustfmt::skip]
pub fn crop_profiles() -> Vec<CropProfile> {
    vec![
        profile("rice", (80.0, 100.0), (40.0, 50.0), (40.0, 50.0), (20.0, 30.0), (80.0, 90.0), (5.5, 7.0)),
        profile("wheat", (50.0, 70.0), (30.0, 40.0), (30.0, 40.0), (15.0, 25.0), (50.0, 70.0), (6.0, 7.5)),
        profile("maize", (60.0, 80.0), (35.0, 45.0), (35.0, 45.0), (18.0, 27.0), (60.0, 80.0), (5.5, 7.0)),
        profile("cotton", (100.0, 120.0), (50.0, 60.0), (50.0, 60.0), (21.0, 30.0), (50.0, 80.0), (6.0, 7.5)),
        profile("sugarcane", (120.0, 150.0), (60.0, 80.0), (80.0, 100.0), (25.0, 35.0), (70.0, 90.0), (6.0, 7.5)),
        profile("potato", (70.0, 90.0), (50.0, 60.0), (80.0, 100.0), (15.0, 25.0), (60.0, 80.0), (5.0, 6.5)),
        profile("tomato", (80.0, 100.0), (50.0, 70.0), (80.0, 100.0), (20.0, 30.0), (60.0, 80.0), (6.0, 7.0)),
    ]
}

/// Used when the crop has no entry in [`nutrient_requirements`].
pub const DEFAULT_REQUIREMENT: Npk = Npk::new(60.0, 30.0, 30.0);

/// Per-crop NPK targets in kg/acre.
pub fn nutrient_requirements() -> Vec<NutrientRequirement> {
    [
        ("rice", 60.0, 30.0, 30.0),
        ("wheat", 50.0, 25.0, 25.0),
        ("maize", 70.0, 35.0, 35.0),
        ("cotton", 80.0, 40.0, 40.0),
        ("sugarcane", 100.0, 50.0, 60.0),
        ("potato", 60.0, 40.0, 50.0),
        ("tomato", 70.0, 45.0, 50.0),
    ]
    .into_iter()
    .map(|(name, n, p, k)| NutrientRequirement {
        crop_name: name.to_string(),
        required: Npk::new(n, p, k),
    })
    .collect()
}

pub const DEFAULT_TIMING: &str = "Basal: 60%, Top dressing: 40%";

/// Split-application schedules keyed by crop.
pub fn timing_schedules() -> Vec<(String, String)> {
    [
        ("rice", "Basal: 50%, Tillering: 25%, Panicle: 25%"),
        ("wheat", "Basal: 60%, Crown root: 40%"),
        ("maize", "Basal: 40%, Knee-high: 30%, Tasseling: 30%"),
        ("cotton", "Basal: 30%, Square formation: 35%, Flowering: 35%"),
        ("sugarcane", "Basal: 50%, 30 days: 25%, 60 days: 25%"),
        ("potato", "Basal: 60%, Earthing up: 40%"),
        ("tomato", "Basal: 50%, Flowering: 25%, Fruiting: 25%"),
    ]
    .into_iter()
    .map(|(crop, schedule)| (crop.to_string(), schedule.to_string()))
    .collect()
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SoilTypeInfo {
    pub name: &'static str,
    pub description: &'static str,
}

pub const SOIL_TYPES: &[SoilTypeInfo] = &[
    SoilTypeInfo {
        name: "Sandy",
        description: "Loose, dry, gritty texture",
    },
    SoilTypeInfo {
        name: "Clay",
        description: "Heavy, sticky when wet",
    },
    SoilTypeInfo {
        name: "Loamy",
        description: "Balanced mixture, ideal for farming",
    },
    SoilTypeInfo {
        name: "Silty",
        description: "Smooth, retains water well",
    },
    SoilTypeInfo {
        name: "Peaty",
        description: "High organic matter",
    },
    SoilTypeInfo {
        name: "Chalky",
        description: "Alkaline, stony",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soil_types_in_catalogue_order() {
        let names: Vec<_> = SOIL_TYPES.iter().map(|s| s.name).collect();
        assert_eq!(names, ["Sandy", "Clay", "Loamy", "Silty", "Peaty", "Chalky"]);
    }

    #[test]
    fn timing_table_covers_seven_crops() {
        assert_eq!(timing_schedules().len(), 7);
        assert!(timing_schedules().iter().all(|(crop, _)| crop == &crop.to_lowercase()));
    }
}
