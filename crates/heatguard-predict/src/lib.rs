//! Heat-stress prediction: input validation, the rule-based estimate, and
//! the adapter that prefers a trained classifier when one is loaded.

pub mod adapter;
pub mod model;
pub mod rules;
pub mod types;
pub mod validate;

pub use adapter::ModelAdapter;
pub use model::{Classifier, ForestModel, ModelError};
pub use rules::{estimate, heat_index_like};
pub use types::{PredictionResult, PredictionSource, RiskLabel, WeatherReading};
pub use validate::{reading_from_payload, validate};
