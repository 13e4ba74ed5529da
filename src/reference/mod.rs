//! Static agronomic tables shared read-only by the engines.

pub mod crops;
pub mod diseases;
pub mod fertilizers;

use crate::error::{AgriSenseError, Result};
use crate::models::{CommonDisease, CropProfile, FertilizerProfile, Npk, NutrientRequirement};
use diseases::{DiagnosisTemplate, DiseaseRule};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Fertilizers the selector names directly.
#[derive(Debug, Clone, PartialEq)]
pub struct StapleFertilizers {
    pub nitrogen: FertilizerProfile,
    pub phosphorus: FertilizerProfile,
    pub potassium: FertilizerProfile,
    pub balanced: FertilizerProfile,
}

/// Raw tables before validation.
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    pub crops: Vec<CropProfile>,
    pub requirements: Vec<NutrientRequirement>,
    pub default_requirement: Npk,
    pub fertilizers: Vec<FertilizerProfile>,
    pub timings: Vec<(String, String)>,
    pub unit_costs: Vec<(String, f64)>,
    pub disease_rules: Vec<DiseaseRule>,
    pub default_disease: DiseaseRule,
    pub diagnosis_template: DiagnosisTemplate,
    pub common_diseases: Vec<(String, Vec<CommonDisease>)>,
}

impl ReferenceTables {
    pub fn builtin() -> Self {
        Self {
            crops: crops::crop_profiles(),
            requirements: crops::nutrient_requirements(),
            default_requirement: crops::DEFAULT_REQUIREMENT,
            fertilizers: fertilizers::fertilizer_profiles(),
            timings: crops::timing_schedules(),
            unit_costs: fertilizers::unit_costs(),
            disease_rules: diseases::disease_rules(),
            default_disease: diseases::default_rule(),
            diagnosis_template: diseases::diagnosis_template(),
            common_diseases: diseases::common_diseases(),
        }
    }
}

/// Validated reference data. Once built, every engine lookup is total.
#[derive(Debug)]
pub struct ReferenceData {
    crops: Vec<CropProfile>,
    requirements: HashMap<String, Npk>,
    default_requirement: Npk,
    fertilizers: Vec<FertilizerProfile>,
    staples: StapleFertilizers,
    timings: HashMap<String, String>,
    unit_costs: HashMap<String, f64>,
    disease_rules: Vec<DiseaseRule>,
    default_disease: DiseaseRule,
    diagnosis_template: DiagnosisTemplate,
    common_diseases: Vec<(String, Vec<CommonDisease>)>,
}

impl ReferenceData {
    /// Builds the compiled-in tables, shared behind an `Arc`.
    pub fn builtin() -> Result<Arc<Self>> {
        Self::from_tables(ReferenceTables::builtin()).map(Arc::new)
    }

    pub fn from_tables(tables: ReferenceTables) -> Result<Self> {
        if tables.crops.is_empty() {
            return Err(fault("crop table is empty"));
        }

        let mut seen = HashSet::new();
        for crop in &tables.crops {
            if !seen.insert(crop.name.to_lowercase()) {
                return Err(fault(format!("duplicate crop '{}'", crop.name)));
            }
            for (param, range) in crop.ranges() {
                if !(range.min <= range.max) {
                    return Err(fault(format!(
                        "crop '{}' has an inverted {param} range {}..{}",
                        crop.name, range.min, range.max
                    )));
                }
            }
        }

        for req in &tables.requirements {
            req.required
                .validate()
                .map_err(|e| fault(format!("requirement for '{}': {e}", req.crop_name)))?;
        }
        tables
            .default_requirement
            .validate()
            .map_err(|e| fault(format!("default requirement: {e}")))?;

        let staples = StapleFertilizers {
            nitrogen: staple(&tables.fertilizers, fertilizers::UREA, |f| f.n_pct)?,
            phosphorus: staple(&tables.fertilizers, fertilizers::DAP, |f| f.p_pct)?,
            potassium: staple(&tables.fertilizers, fertilizers::MOP, |f| f.k_pct)?,
            balanced: staple(&tables.fertilizers, fertilizers::NPK_BALANCED, |f| f.n_pct)?,
        };

        if let Some((name, cost)) = tables.unit_costs.iter().find(|(_, c)| *c < 0.0) {
            return Err(fault(format!("negative unit cost {cost} for '{name}'")));
        }

        if tables.disease_rules.is_empty() {
            return Err(fault("disease rule table is empty"));
        }
        if let Some(rule) = tables.disease_rules.iter().find(|r| r.keywords.is_empty()) {
            return Err(fault(format!("disease rule '{}' has no keywords", rule.disease_name)));
        }
        if !(0.0..=1.0).contains(&tables.diagnosis_template.confidence) {
            return Err(fault("diagnosis template confidence outside [0, 1]"));
        }

        Ok(Self {
            crops: tables.crops,
            requirements: tables
                .requirements
                .into_iter()
                .map(|r| (r.crop_name.to_lowercase(), r.required))
                .collect(),
            default_requirement: tables.default_requirement,
            fertilizers: tables.fertilizers,
            staples,
            timings: tables
                .timings
                .into_iter()
                .map(|(crop, schedule)| (crop.to_lowercase(), schedule))
                .collect(),
            unit_costs: tables.unit_costs.into_iter().collect(),
            disease_rules: tables
                .disease_rules
                .into_iter()
                .map(|mut rule| {
                    rule.keywords.iter_mut().for_each(|k| *k = k.to_lowercase());
                    rule
                })
                .collect(),
            default_disease: tables.default_disease,
            diagnosis_template: tables.diagnosis_template,
            common_diseases: tables.common_diseases,
        })
    }

    pub fn crops(&self) -> &[CropProfile] {
        &self.crops
    }

    /// NPK target for `crop`, case-insensitive, with the default for unknown crops.
    pub fn requirement_for(&self, crop: &str) -> Npk {
        self.requirements
            .get(&crop.trim().to_lowercase())
            .copied()
            .unwrap_or(self.default_requirement)
    }

    pub fn fertilizers(&self) -> &[FertilizerProfile] {
        &self.fertilizers
    }

    pub fn staples(&self) -> &StapleFertilizers {
        &self.staples
    }

    pub fn timing_for(&self, crop: &str) -> &str {
        self.timings
            .get(&crop.trim().to_lowercase())
            .map(String::as_str)
            .unwrap_or(crops::DEFAULT_TIMING)
    }

    pub fn unit_cost(&self, fertilizer: &str) -> f64 {
        self.unit_costs
            .get(fertilizer)
            .copied()
            .unwrap_or(fertilizers::DEFAULT_UNIT_COST)
    }

    pub fn disease_rules(&self) -> &[DiseaseRule] {
        &self.disease_rules
    }

    pub fn default_disease(&self) -> &DiseaseRule {
        &self.default_disease
    }

    pub fn diagnosis_template(&self) -> &DiagnosisTemplate {
        &self.diagnosis_template
    }

    /// Catalogue of diseases for `crop`; empty for crops without an entry.
    pub fn common_diseases_for(&self, crop: &str) -> &[CommonDisease] {
        let crop = crop.trim().to_lowercase();
        self.common_diseases
            .iter()
            .find(|(name, _)| *name == crop)
            .map(|(_, list)| list.as_slice())
            .unwrap_or(&[])
    }
}

fn fault(msg: impl Into<String>) -> AgriSenseError {
    AgriSenseError::ReferenceData(msg.into())
}

fn staple(
    table: &[FertilizerProfile],
    name: &str,
    pct: impl Fn(&FertilizerProfile) -> f64,
) -> Result<FertilizerProfile> {
    let profile = table
        .iter()
        .find(|f| f.name == name)
        .ok_or_else(|| fault(format!("staple fertilizer '{name}' missing")))?;
    if !(pct(profile) > 0.0) {
        return Err(fault(format!("staple fertilizer '{name}' has no nutrient content")));
    }
    Ok(profile.clone())
}
