pub mod providers;
pub mod recommendation;

pub use recommendation::{EngineSettings, RecommendationEngine};
