use crate::models::{FertilizerCategory, FertilizerProfile};

pub const UREA: &str = "Urea";
pub const DAP: &str = "DAP";
pub const MOP: &str = "MOP";
pub const NPK_BALANCED: &str = "NPK 17-17-17";

/// Unit cost for fertilizers missing from [`unit_costs`], USD/kg.
pub const DEFAULT_UNIT_COST: f64 = 0.40;

pub fn fertilizer_profiles() -> Vec<FertilizerProfile> {
    use FertilizerCategory::*;

    [
        (UREA, 46.0, 0.0, 0.0, Nitrogen),
        (DAP, 18.0, 46.0, 0.0, Phosphorus),
        (MOP, 0.0, 0.0, 60.0, Potassium),
        ("NPK 10-26-26", 10.0, 26.0, 26.0, Complex),
        ("NPK 12-32-16", 12.0, 32.0, 16.0, Complex),
        (NPK_BALANCED, 17.0, 17.0, 17.0, Balanced),
        ("Ammonium Sulphate", 21.0, 0.0, 0.0, Nitrogen),
        ("SSP", 0.0, 16.0, 0.0, Phosphorus),
    ]
    .into_iter()
    .map(|(name, n_pct, p_pct, k_pct, category)| FertilizerProfile {
        name: name.to_string(),
        n_pct,
        p_pct,
        k_pct,
        category,
    })
    .collect()
}

/// Approximate USD per kg.
pub fn unit_costs() -> Vec<(String, f64)> {
    [(UREA, 0.35), (DAP, 0.45), (MOP, 0.40), (NPK_BALANCED, 0.50)]
        .into_iter()
        .map(|(name, cost)| (name.to_string(), cost))
        .collect()
}

/// Always listed on a recommendation, after any pH amendment.
pub const BASE_PRECAUTIONS: [&str; 4] = [
    "Apply in cool hours (early morning or evening)",
    "Ensure adequate soil moisture before application",
    "Avoid direct contact with plant stems",
    "Store in dry, cool place",
];

pub const LIME_PRECAUTION: &str = "Apply lime to increase pH before fertilizer application";
pub const SULFUR_PRECAUTION: &str = "Apply sulfur to decrease pH for better nutrient absorption";

pub const FERTIGATION_METHOD: &str = "Apply with irrigation water (fertigation) due to low moisture";
pub const SPLIT_METHOD: &str = "Split application recommended for sandy soil";
pub const BROADCAST_METHOD: &str = "Broadcast and incorporate into soil, followed by irrigation";

pub const SPLIT_FREQUENCY: &str = "Split application as per timing";
