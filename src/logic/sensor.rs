use crate::models::SensorReading;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

pub const DEFAULT_LOCATION: &str = "Farm-1";

const DRIFT: f64 = 0.1;

/// Values the simulated sensors hover around.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Baseline {
    soil_moisture: f64,
    soil_ph: f64,
    nitrogen: f64,
    phosphorus: f64,
    potassium: f64,
    temperature: f64,
    humidity: f64,
}

impl Default for Baseline {
    fn default() -> Self {
        Self {
            soil_moisture: 65.0,
            soil_ph: 6.5,
            nitrogen: 45.0,
            phosphorus: 38.0,
            potassium: 42.0,
            temperature: 28.0,
            humidity: 70.0,
        }
    }
}

impl Baseline {
    fn fields_mut(&mut self) -> [&mut f64; 7] {
        [
            &mut self.soil_moisture,
            &mut self.soil_ph,
            &mut self.nitrogen,
            &mut self.phosphorus,
            &mut self.potassium,
            &mut self.temperature,
            &mut self.humidity,
        ]
    }
}

struct SimulatorState {
    baseline: Baseline,
    rng: StdRng,
}

/// Simulated soil sensor. Each reading adds noise around a slowly drifting baseline.
pub struct SensorSimulator {
    location: String,
    state: Mutex<SimulatorState>,
}

impl SensorSimulator {
    pub fn new(location: impl Into<String>) -> Self {
        Self::with_rng(location, StdRng::from_entropy())
    }

    /// Seeded simulator, for reproducible sequences.
    pub fn seeded(location: impl Into<String>, seed: u64) -> Self {
        Self::with_rng(location, StdRng::seed_from_u64(seed))
    }

    fn with_rng(location: impl Into<String>, rng: StdRng) -> Self {
        Self {
            location: location.into(),
            state: Mutex::new(SimulatorState {
                baseline: Baseline::default(),
                rng,
            }),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn reading(&self) -> SensorReading {
        // Drift state stays valid even if a previous holder panicked.
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let SimulatorState { baseline, rng } = &mut *state;

        let reading = SensorReading {
            soil_moisture: (baseline.soil_moisture + rng.gen_range(-5.0..=5.0)).clamp(0.0, 100.0),
            soil_ph: (baseline.soil_ph + rng.gen_range(-0.3..=0.3)).clamp(4.0, 9.0),
            nitrogen: (baseline.nitrogen + rng.gen_range(-5.0..=5.0)).clamp(0.0, 200.0),
            phosphorus: (baseline.phosphorus + rng.gen_range(-3.0..=3.0)).clamp(0.0, 200.0),
            potassium: (baseline.potassium + rng.gen_range(-4.0..=4.0)).clamp(0.0, 200.0),
            temperature: (baseline.temperature + rng.gen_range(-2.0..=2.0)).clamp(-10.0, 50.0),
            humidity: (baseline.humidity + rng.gen_range(-5.0..=5.0)).clamp(0.0, 100.0),
            timestamp: Utc::now(),
            location: Some(self.location.clone()),
        };

        for value in baseline.fields_mut() {
            *value += rng.gen_range(-DRIFT..=DRIFT);
        }

        reading
    }

    /// Reading shifted for the hour of day: warmer and drier between 06:00 and 18:00.
    pub fn reading_at_hour(&self, hour: u32) -> SensorReading {
        let (temp_offset, humidity_offset) = day_cycle_offsets(hour);
        let mut reading = self.reading();
        reading.temperature = (reading.temperature + temp_offset).clamp(-10.0, 50.0);
        reading.humidity = (reading.humidity + humidity_offset).clamp(0.0, 100.0);
        reading
    }
}

impl Default for SensorSimulator {
    fn default() -> Self {
        Self::new(DEFAULT_LOCATION)
    }
}

impl std::fmt::Debug for SensorSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorSimulator")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

/// Temperature and humidity offsets for `hour` (0-23).
pub fn day_cycle_offsets(hour: u32) -> (f64, f64) {
    if (6..=18).contains(&hour) {
        (5.0 + (hour as f64 - 12.0) * -0.5, -10.0)
    } else {
        (-5.0, 10.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_bounds(r: &SensorReading) -> bool {
        (0.0..=100.0).contains(&r.soil_moisture)
            && (4.0..=9.0).contains(&r.soil_ph)
            && (0.0..=200.0).contains(&r.nitrogen)
            && (0.0..=200.0).contains(&r.phosphorus)
            && (0.0..=200.0).contains(&r.potassium)
            && (-10.0..=50.0).contains(&r.temperature)
            && (0.0..=100.0).contains(&r.humidity)
    }

    #[test]
    fn test_readings_stay_in_bounds() {
        let sim = SensorSimulator::seeded("Test", 7);
        for hour in 0..500 {
            let r = sim.reading_at_hour(hour % 24);
            assert!(in_bounds(&r), "{r:?}");
        }
    }

    #[test]
    fn test_first_reading_near_baseline() {
        let r = SensorSimulator::seeded("Test", 1).reading();
        assert!((r.soil_moisture - 65.0).abs() <= 5.0);
        assert!((r.soil_ph - 6.5).abs() <= 0.3 + 1e-9);
        assert!((r.phosphorus - 38.0).abs() <= 3.0);
        assert!((r.temperature - 28.0).abs() <= 2.0);
        assert_eq!(r.location.as_deref(), Some("Test"));
    }

    #[test]
    fn test_seeded_sequences_repeat() {
        let a = SensorSimulator::seeded("A", 42);
        let b = SensorSimulator::seeded("A", 42);
        for _ in 0..5 {
            let (ra, rb) = (a.reading(), b.reading());
            assert_eq!(ra.nitrogen, rb.nitrogen);
            assert_eq!(ra.humidity, rb.humidity);
        }
    }

    #[test]
    fn test_day_cycle_offsets() {
        assert_eq!(day_cycle_offsets(12), (5.0, -10.0));
        assert_eq!(day_cycle_offsets(6), (8.0, -10.0));
        assert_eq!(day_cycle_offsets(18), (2.0, -10.0));
        assert_eq!(day_cycle_offsets(2), (-5.0, 10.0));
        assert_eq!(day_cycle_offsets(23), (-5.0, 10.0));
    }

    #[test]
    fn test_default_location() {
        assert_eq!(SensorSimulator::default().location(), "Farm-1");
    }
}
