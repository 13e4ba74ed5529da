use super::calculations::round2;
use crate::models::{AlternativeCrop, CropRecommendation, CropScore, SoilClimateSample};
use crate::reference::ReferenceData;
use std::sync::Arc;

/// Allowed distance outside a range that still earns half credit.
/// Applied to every parameter alike, pH included.
pub const TOLERANCE: f64 = 10.0;

const PARAMETER_COUNT: f64 = 6.0;
const ALTERNATIVE_COUNT: usize = 3;

pub const FALLBACK_REASONING: &str = "Best match based on NPK values and climate conditions";

/// Ranks crops by how well a soil/climate sample fits their growing ranges.
#[derive(Debug, Clone)]
pub struct CropScorer {
    reference: Arc<ReferenceData>,
}

impl CropScorer {
    pub fn new(reference: Arc<ReferenceData>) -> Self {
        Self { reference }
    }

    /// Every crop in the table, best first. Ties keep table order.
    pub fn score(&self, sample: &SoilClimateSample) -> Vec<CropScore> {
        let mut scores: Vec<CropScore> = self
            .reference
            .crops()
            .iter()
            .map(|crop| {
                let mut raw = 0.0;
                let mut matched = 0u8;
                for (range, value) in crop.parameters(sample) {
                    if range.contains(value) {
                        raw += 1.0;
                        matched += 1;
                    } else if range.distance_to_nearer_bound(value) <= TOLERANCE {
                        raw += 0.5;
                    }
                }
                CropScore {
                    crop_name: crop.name.clone(),
                    score: round2(raw / PARAMETER_COUNT),
                    matched_parameter_count: matched,
                }
            })
            .collect();

        // sort_by is stable
        scores.sort_by(|a, b| b.score.total_cmp(&a.score));
        scores
    }

    pub fn recommend(&self, sample: &SoilClimateSample) -> CropRecommendation {
        let mut ranked = self.score(sample).into_iter();
        // The reference table is never empty, so there is always a top entry.
        let top = ranked.next().unwrap_or_else(|| CropScore {
            crop_name: String::new(),
            score: 0.0,
            matched_parameter_count: 0,
        });

        CropRecommendation {
            recommended_crop: top.crop_name,
            confidence: top.score,
            reasoning: FALLBACK_REASONING.to_string(),
            alternatives: ranked
                .take(ALTERNATIVE_COUNT)
                .map(|s| AlternativeCrop {
                    crop: s.crop_name,
                    confidence: s.score,
                    reason: None,
                })
                .collect(),
            yield_potential: None,
            growing_tips: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Range;
    use crate::reference::ReferenceTables;

    fn scorer() -> CropScorer {
        CropScorer::new(ReferenceData::builtin().unwrap())
    }

    fn sample(n: f64, p: f64, k: f64, temp: f64, humidity: f64, ph: f64) -> SoilClimateSample {
        SoilClimateSample {
            nitrogen: n,
            phosphorus: p,
            potassium: k,
            temperature: temp,
            humidity,
            ph,
            rainfall: 200.0,
        }
    }

    #[test]
    fn test_rice_scenario() {
        let rec = scorer().recommend(&sample(90.0, 42.0, 43.0, 25.0, 82.0, 6.0));
        assert_eq!(rec.recommended_crop, "rice");
        assert_eq!(rec.confidence, 1.0);
        assert_eq!(rec.alternatives.len(), 3);
        assert_eq!(rec.reasoning, FALLBACK_REASONING);
    }

    #[test]
    fn test_scores_sorted_and_bounded() {
        let scores = scorer().score(&sample(60.0, 35.0, 35.0, 20.0, 60.0, 6.5));
        assert_eq!(scores.len(), 7);
        for pair in scores.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert!(scores.iter().all(|s| (0.0..=1.0).contains(&s.score)));
    }

    #[test]
    fn test_deterministic() {
        let s = sample(33.0, 71.0, 12.0, 31.0, 44.0, 8.1);
        assert_eq!(scorer().score(&s), scorer().score(&s));
    }

    #[test]
    fn test_tolerance_half_credit() {
        // Rice: N 80..100. 75 is within 10 of the lower bound.
        let scores = scorer().score(&sample(75.0, 45.0, 45.0, 25.0, 85.0, 6.0));
        let rice = scores.iter().find(|s| s.crop_name == "rice").unwrap();
        assert_eq!(rice.matched_parameter_count, 5);
        assert_eq!(rice.score, round2(5.5 / 6.0));
    }

    #[test]
    fn test_tolerance_applies_to_ph() {
        // pH 14 is within 10 of every crop's pH range, so it still earns half credit.
        let scores = scorer().score(&sample(90.0, 45.0, 45.0, 25.0, 85.0, 14.0));
        let rice = scores.iter().find(|s| s.crop_name == "rice").unwrap();
        assert_eq!(rice.score, round2(5.5 / 6.0));
    }

    #[test]
    fn test_ties_keep_table_order() {
        let mut tables = ReferenceTables::builtin();
        tables.crops.truncate(2);
        let wide = Range::new(0.0, 200.0);
        for crop in tables.crops.iter_mut() {
            crop.nitrogen = wide;
            crop.phosphorus = wide;
            crop.potassium = wide;
            crop.temperature = Range::new(-10.0, 60.0);
            crop.humidity = Range::new(0.0, 100.0);
            crop.ph = Range::new(0.0, 14.0);
        }
        let scorer = CropScorer::new(Arc::new(ReferenceData::from_tables(tables).unwrap()));
        let scores = scorer.score(&sample(1.0, 1.0, 1.0, 1.0, 1.0, 1.0));
        assert_eq!(scores[0].crop_name, "rice");
        assert_eq!(scores[1].crop_name, "wheat");
    }

    #[test]
    fn test_all_zero_still_recommends_first_crop() {
        let mut tables = ReferenceTables::builtin();
        tables.crops.truncate(3);
        for crop in tables.crops.iter_mut() {
            crop.ph = Range::new(0.0, 1.0);
        }
        let scorer = CropScorer::new(Arc::new(ReferenceData::from_tables(tables).unwrap()));
        let far = sample(200.0, 200.0, 200.0, -10.0, 0.0, 14.0);
        assert!(scorer.score(&far).iter().all(|s| s.score == 0.0));

        let rec = scorer.recommend(&far);
        assert_eq!(rec.recommended_crop, "rice");
        assert_eq!(rec.confidence, 0.0);
        assert_eq!(rec.alternatives.len(), 2);
    }
}
