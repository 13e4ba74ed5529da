pub mod calculations;
pub mod crop_scorer;
pub mod disease_classifier;
pub mod fertilizer_selector;
pub mod gateway;
pub mod sensor;

pub use crop_scorer::CropScorer;
pub use disease_classifier::DiseaseClassifier;
pub use fertilizer_selector::FertilizerSelector;
pub use gateway::AdvisoryGateway;
pub use sensor::SensorSimulator;
