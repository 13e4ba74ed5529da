use super::calculations::{deficiency, product_quantity, round2};
use crate::models::{
    Deficiency, FertilizerProfile, FertilizerRecommendation, FertilizerRequest,
    SecondaryRecommendation,
};
use crate::reference::{fertilizers, ReferenceData};
use std::sync::Arc;

/// Per-nutrient thresholds a deficit must exceed to earn a straight fertilizer.
pub const NITROGEN_THRESHOLD: f64 = 30.0;
pub const PHOSPHORUS_THRESHOLD: f64 = 20.0;
pub const POTASSIUM_THRESHOLD: f64 = 20.0;

/// When every deficit exceeds this, a single balanced product replaces the candidates.
pub const BALANCED_THRESHOLD: f64 = 10.0;
pub const BALANCED_MULTIPLIER: f64 = 1.5;
pub const DEFAULT_BALANCED_QUANTITY: f64 = 50.0;

pub const LOW_PH: f64 = 5.5;
pub const HIGH_PH: f64 = 7.5;
pub const LOW_MOISTURE: f64 = 40.0;

/// Secondary products listed after the primary recommendation.
pub const MAX_SECONDARY: usize = 2;

/// One fertilizer the selector is considering, with its computed dose.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub fertilizer: FertilizerProfile,
    pub quantity: f64,
}

/// Picks a fertilizer program from the soil's nutrient shortfall.
#[derive(Debug, Clone)]
pub struct FertilizerSelector {
    reference: Arc<ReferenceData>,
}

impl FertilizerSelector {
    pub fn new(reference: Arc<ReferenceData>) -> Self {
        Self { reference }
    }

    pub fn deficiency_for(&self, request: &FertilizerRequest) -> Deficiency {
        let required = self.reference.requirement_for(&request.crop_type);
        deficiency(&request.current_npk, &required)
    }

    /// Straight fertilizers for each nutrient whose deficit passes its threshold,
    /// in N, P, K order. The balanced override is not applied here.
    pub fn nutrient_candidates(&self, deficit: &Deficiency) -> Vec<Candidate> {
        let staples = self.reference.staples();
        let mut candidates = Vec::with_capacity(3);

        if deficit.n > NITROGEN_THRESHOLD {
            candidates.push(Candidate {
                quantity: product_quantity(deficit.n, staples.nitrogen.n_pct),
                fertilizer: staples.nitrogen.clone(),
            });
        }
        if deficit.p > PHOSPHORUS_THRESHOLD {
            candidates.push(Candidate {
                quantity: product_quantity(deficit.p, staples.phosphorus.p_pct),
                fertilizer: staples.phosphorus.clone(),
            });
        }
        if deficit.k > POTASSIUM_THRESHOLD {
            candidates.push(Candidate {
                quantity: product_quantity(deficit.k, staples.potassium.k_pct),
                fertilizer: staples.potassium.clone(),
            });
        }

        candidates
    }

    /// Final candidate list after the balanced override and the empty-list default.
    pub fn candidates(&self, deficit: &Deficiency) -> Vec<Candidate> {
        let balanced = &self.reference.staples().balanced;

        if deficit.all_exceed(BALANCED_THRESHOLD) {
            return vec![Candidate {
                fertilizer: balanced.clone(),
                quantity: round2(deficit.mean() * BALANCED_MULTIPLIER),
            }];
        }

        let candidates = self.nutrient_candidates(deficit);
        if candidates.is_empty() {
            return vec![Candidate {
                fertilizer: balanced.clone(),
                quantity: DEFAULT_BALANCED_QUANTITY,
            }];
        }
        candidates
    }

    pub fn select(&self, request: &FertilizerRequest) -> FertilizerRecommendation {
        let deficit = self.deficiency_for(request);
        if deficit.is_satisfied() {
            return FertilizerRecommendation::no_fertilizer_needed(deficit);
        }

        let mut candidates = self.candidates(&deficit).into_iter();
        // `candidates` never returns an empty list.
        let Some(primary) = candidates.next() else {
            return FertilizerRecommendation::no_fertilizer_needed(deficit);
        };

        FertilizerRecommendation {
            cost_estimate: round2(
                primary.quantity * self.reference.unit_cost(&primary.fertilizer.name),
            ),
            fertilizer_name: primary.fertilizer.name,
            category: primary.fertilizer.category,
            quantity_kg_per_acre: primary.quantity,
            application_method: application_method(&request.soil_type, request.moisture)
                .to_string(),
            timing: self.reference.timing_for(&request.crop_type).to_string(),
            frequency: fertilizers::SPLIT_FREQUENCY.to_string(),
            precautions: precautions(request.soil_ph),
            secondary_recommendations: candidates
                .take(MAX_SECONDARY)
                .map(|c| SecondaryRecommendation {
                    fertilizer_name: c.fertilizer.name,
                    quantity: c.quantity,
                })
                .collect(),
            deficiency: deficit,
        }
    }
}

pub fn application_method(soil_type: &str, moisture: f64) -> &'static str {
    if moisture < LOW_MOISTURE {
        fertilizers::FERTIGATION_METHOD
    } else if soil_type.trim().eq_ignore_ascii_case("sandy") {
        fertilizers::SPLIT_METHOD
    } else {
        fertilizers::BROADCAST_METHOD
    }
}

/// Fixed precautions, preceded by a pH amendment when the soil needs one.
pub fn precautions(soil_ph: f64) -> Vec<String> {
    let amendment = if soil_ph < LOW_PH {
        Some(fertilizers::LIME_PRECAUTION)
    } else if soil_ph > HIGH_PH {
        Some(fertilizers::SULFUR_PRECAUTION)
    } else {
        None
    };

    amendment
        .into_iter()
        .chain(fertilizers::BASE_PRECAUTIONS)
        .map(str::to_string)
        .collect()
}
