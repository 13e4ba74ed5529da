pub mod crop;
pub mod disease;
pub mod fertilizer;
pub mod language;
pub mod prediction;
pub mod sensor;
pub mod soil;

pub use crop::*;
pub use disease::*;
pub use fertilizer::*;
pub use language::*;
pub use prediction::*;
pub use sensor::*;
pub use soil::*;
