use super::Prompt;
use crate::models::{CropRequest, Deficiency, DiseaseRequest, FertilizerRequest, Npk};

pub fn crop_prompt(request: &CropRequest) -> Prompt {
    let lang = request.language.prompt_name();
    let s = &request.sample;

    let mut location_context = String::new();
    if let Some(location) = &request.location {
        location_context.push_str(&format!("\n- Location: {}", location));
    }
    if let (Some(lat), Some(lon)) = (request.latitude, request.longitude) {
        location_context.push_str(&format!("\n- Coordinates: {}°N, {}°E", lat, lon));
    }
    let location_hint = request
        .location
        .as_ref()
        .map(|l| format!(" ({})", l))
        .unwrap_or_default();

    let user = format!(
        r#"You are an expert agricultural advisor. Analyze the following soil and climate conditions and recommend the best crop.

Soil and Climate Data:
- Nitrogen (N): {n} kg/ha
- Phosphorus (P): {p} kg/ha
- Potassium (K): {k} kg/ha
- Temperature: {temp}°C
- Humidity: {humidity}%
- Soil pH: {ph}
- Rainfall: {rainfall} mm{location_context}

IMPORTANT: Consider the location{location_hint} when recommending crops. Account for regional climate patterns, local soil characteristics, crops traditionally successful in the region, and market demand.

Provide a detailed response in {lang}. Include the most recommended crop, why it is suitable, expected yield potential, growing tips, and three alternative crops.

Respond ONLY with valid JSON in this exact format:
{{
  "recommended_crop": "crop name",
  "confidence": 0.95,
  "reasoning": "detailed explanation in {lang}",
  "yield_potential": "description in {lang}",
  "growing_tips": ["tip1 in {lang}", "tip2 in {lang}", "tip3 in {lang}"],
  "alternatives": [
    {{"crop": "alternative1", "confidence": 0.85, "reason": "why in {lang}"}},
    {{"crop": "alternative2", "confidence": 0.75, "reason": "why in {lang}"}},
    {{"crop": "alternative3", "confidence": 0.65, "reason": "why in {lang}"}}
  ]
}}"#,
        n = s.nitrogen,
        p = s.phosphorus,
        k = s.potassium,
        temp = s.temperature,
        humidity = s.humidity,
        ph = s.ph,
        rainfall = s.rainfall,
    );

    Prompt {
        system: format!(
            "You are an expert agricultural advisor. Always respond in {} with detailed, practical advice. Provide responses in valid JSON format only.",
            lang
        ),
        user,
    }
}

fn nutrient_status(deficit: f64) -> &'static str {
    if deficit > 10.0 {
        "DEFICIENT"
    } else if deficit > 0.0 {
        "ADEQUATE"
    } else {
        "OPTIMAL"
    }
}

pub fn fertilizer_prompt(request: &FertilizerRequest, required: Npk, deficit: Deficiency) -> Prompt {
    let lang = request.language.prompt_name();
    let current = request.current_npk;
    let crop = &request.crop_type;

    let user = format!(
        r#"You are an expert agricultural scientist. Analyze this SPECIFIC farm data and provide a CUSTOMIZED fertilizer recommendation.

Farm Details:
- Crop: {crop}
- Soil Type: {soil}
- Current Nitrogen: {cn} kg/ha (Required: {rn} kg/ha, Deficit: {dn} kg/ha)
- Current Phosphorus: {cp} kg/ha (Required: {rp} kg/ha, Deficit: {dp} kg/ha)
- Current Potassium: {ck} kg/ha (Required: {rk} kg/ha, Deficit: {dk} kg/ha)
- Soil pH: {ph}
- Soil Moisture: {moisture}%

Nutrient Analysis:
- Nitrogen Status: {sn}
- Phosphorus Status: {sp}
- Potassium Status: {sk}

Provide recommendation in {lang}. Your response MUST be based on the ACTUAL deficiency values above.

Respond ONLY with valid JSON:
{{
  "fertilizer_name": "SPECIFIC fertilizer name (e.g., Urea, DAP, NPK 10-26-26)",
  "fertilizer_type": "Nitrogen/Phosphorus/Potassium/Complex/Balanced",
  "quantity_kg_per_acre": <exact number based on deficiency>,
  "application_method": "detailed method in {lang}",
  "timing": "specific timing for {crop} in {lang}",
  "frequency": "frequency in {lang}",
  "precautions": ["precaution 1", "precaution 2", "precaution 3", "precaution 4"],
  "cost_estimate": <number>
}}"#,
        soil = request.soil_type,
        cn = current.n,
        cp = current.p,
        ck = current.k,
        rn = required.n,
        rp = required.p,
        rk = required.k,
        dn = deficit.n,
        dp = deficit.p,
        dk = deficit.k,
        ph = request.soil_ph,
        moisture = request.moisture,
        sn = nutrient_status(deficit.n),
        sp = nutrient_status(deficit.p),
        sk = nutrient_status(deficit.k),
    );

    Prompt {
        system: format!(
            "You are an expert agricultural scientist. Analyze the SPECIFIC nutrient values provided and give CUSTOMIZED recommendations. Always base your response on the actual N, P, K values and deficiencies. Respond in {} with valid JSON only.",
            lang
        ),
        user,
    }
}

pub fn disease_prompt(request: &DiseaseRequest) -> Prompt {
    let lang = request.language.prompt_name();
    let crop = &request.crop_type;

    let user = format!(
        r#"You are an expert plant pathologist analyzing a {crop} plant disease.

SYMPTOMS OBSERVED:
{symptoms}

Identify the MOST LIKELY specific disease based on the symptoms. If the crop is "general", consider common diseases across multiple crops. Be specific about disease names and set confidence based on symptom clarity.

Respond in {lang} with ONLY valid JSON in this EXACT format:
{{
  "disease_name": "Specific Disease Name",
  "confidence": 0.88,
  "description": "Explanation of this disease and how it affects plants",
  "symptoms_analysis": "Analysis of the observed symptoms",
  "treatment": "Step-by-step treatment",
  "prevention": "Prevention measures",
  "severity": "low | medium | high",
  "affected_parts": ["part 1", "part 2"],
  "spread_rate": "How fast it spreads",
  "treatment_timeline": "When and how often to treat",
  "organic_solutions": ["solution 1", "solution 2"],
  "chemical_solutions": ["product 1", "product 2"],
  "precautions": ["precaution 1", "precaution 2"]
}}"#,
        symptoms = request.symptoms,
    );

    Prompt {
        system: format!(
            "You are a highly experienced plant pathologist specializing in crop diseases. Provide accurate, specific disease diagnoses with practical treatment plans. Always respond in {} with valid JSON format only.",
            lang
        ),
        user,
    }
}
