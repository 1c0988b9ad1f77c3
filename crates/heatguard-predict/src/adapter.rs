//! Chooses between a loaded classifier and the rule-based estimate.
//!
//! The choice is made once, when the adapter is built. A missing or broken
//! artifact leaves the adapter in the rule-based state for the lifetime of
//! the process.

use std::path::Path;
use std::sync::Arc;

use crate::model::{Classifier, ForestModel, ModelError};
use crate::rules;
use crate::types::{PredictionResult, PredictionSource, RiskLabel, WeatherReading};

#[derive(Clone)]
pub struct ModelAdapter {
    classifier: Option<Arc<dyn Classifier>>,
}

impl std::fmt::Debug for ModelAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelAdapter")
            .field("classifier", &self.classifier.as_ref().map(|c| c.name()))
            .finish()
    }
}

impl ModelAdapter {
    /// Adapter that always uses the rule-based estimate.
    pub fn rule_based() -> Self {
        Self { classifier: None }
    }

    /// Adapter backed by an already-loaded classifier.
    pub fn with_classifier(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            classifier: Some(classifier),
        }
    }

    /// Load the forest artifact at `path`.
    ///
    /// Never fails: a missing file or any load error yields the rule-based
    /// adapter. Load errors are logged here and nowhere else.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            tracing::info!(
                "No model artifact at {}, using rule-based predictions",
                path.display()
            );
            return Self::rule_based();
        }

        match ForestModel::from_path(path) {
            Ok(model) => {
                tracing::info!(
                    "Loaded {} model with {} trees from {}",
                    model.name(),
                    model.tree_count(),
                    path.display()
                );
                Self::with_classifier(Arc::new(model))
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to load model from {}, using rule-based predictions: {}",
                    path.display(),
                    e
                );
                Self::rule_based()
            }
        }
    }

    pub fn is_model_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn predict(&self, temperature: f64, humidity: f64, wind_speed: f64) -> PredictionResult {
        self.predict_reading(WeatherReading::new(temperature, humidity, wind_speed))
    }

    pub fn predict_reading(&self, reading: WeatherReading) -> PredictionResult {
        if let Some(classifier) = &self.classifier {
            match Self::classify(classifier.as_ref(), &reading) {
                Ok(label) => {
                    return PredictionResult {
                        label,
                        inputs: reading,
                        source: PredictionSource::ModelBased,
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        "{} model failed, falling back to rule-based prediction: {}",
                        classifier.name(),
                        e
                    );
                }
            }
        }

        PredictionResult {
            label: rules::estimate(reading.temperature, reading.humidity, reading.wind_speed),
            inputs: reading,
            source: PredictionSource::RuleBased,
        }
    }

    fn classify(
        classifier: &dyn Classifier,
        reading: &WeatherReading,
    ) -> Result<RiskLabel, ModelError> {
        let label = classifier.predict(&reading.features())?;
        label.parse::<RiskLabel>().map_err(ModelError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Returns a fixed label and records every feature row it sees.
    struct FixedClassifier {
        label: &'static str,
        calls: AtomicUsize,
        seen: Mutex<Vec<Vec<f64>>>,
    }

    impl FixedClassifier {
        fn new(label: &'static str) -> Arc<Self> {
            Arc::new(Self {
                label,
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl Classifier for FixedClassifier {
        fn name(&self) -> &str {
            "fixed"
        }

        fn predict(&self, features: &[f64]) -> Result<String, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(features.to_vec());
            Ok(self.label.to_string())
        }
    }

    struct FailingClassifier;

    impl Classifier for FailingClassifier {
        fn name(&self) -> &str {
            "failing"
        }

        fn predict(&self, features: &[f64]) -> Result<String, ModelError> {
            Err(ModelError::ShapeMismatch {
                expected: 4,
                got: features.len(),
            })
        }
    }

    const SINGLE_LEAF_FOREST: &str = r#"{
        "n_features": 3,
        "classes": ["Low", "Moderate", "High"],
        "trees": [{ "nodes": [{ "value": [0.0, 1.0, 0.0] }] }]
    }"#;

    #[test]
    fn test_rule_based_matches_estimator() {
        let adapter = ModelAdapter::rule_based();
        assert!(!adapter.is_model_loaded());

        for (t, h, w) in [(38.0, 60.0, 5.0), (20.0, 40.0, 3.0), (30.0, 100.0, 10.0), (-5.0, 0.0, 0.0)] {
            let result = adapter.predict(t, h, w);
            assert_eq!(result.label, rules::estimate(t, h, w));
            assert_eq!(result.source, PredictionSource::RuleBased);
            assert_eq!(result.inputs, WeatherReading::new(t, h, w));
        }
    }

    #[test]
    fn test_loaded_uses_classifier() {
        let classifier = FixedClassifier::new("Low");
        let adapter = ModelAdapter::with_classifier(classifier.clone());
        assert!(adapter.is_model_loaded());

        // The rule would say High here.
        let result = adapter.predict(38.0, 60.0, 5.0);
        assert_eq!(result.label, RiskLabel::Low);
        assert_eq!(result.source, PredictionSource::ModelBased);
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_feature_order() {
        let classifier = FixedClassifier::new("high");
        let adapter = ModelAdapter::with_classifier(classifier.clone());
        adapter.predict(31.5, 72.0, 4.25);

        let seen = classifier.seen.lock().unwrap();
        assert_eq!(seen.as_slice(), &[vec![31.5, 72.0, 4.25]]);
    }

    #[test]
    fn test_model_label_is_normalized() {
        let adapter = ModelAdapter::with_classifier(FixedClassifier::new(" MODERATE "));
        assert_eq!(adapter.predict(0.0, 0.0, 0.0).label, RiskLabel::Moderate);
    }

    #[test]
    fn test_unknown_model_label_falls_back() {
        let adapter = ModelAdapter::with_classifier(FixedClassifier::new("Extreme"));
        let result = adapter.predict(38.0, 60.0, 5.0);
        assert_eq!(result.label, RiskLabel::High);
        assert_eq!(result.source, PredictionSource::RuleBased);
    }

    #[test]
    fn test_model_failure_falls_back() {
        let adapter = ModelAdapter::with_classifier(Arc::new(FailingClassifier));
        assert!(adapter.is_model_loaded());

        let result = adapter.predict(34.0, 0.0, 0.0);
        assert_eq!(result.label, RiskLabel::Moderate);
        assert_eq!(result.source, PredictionSource::RuleBased);
    }

    #[test]
    fn test_load_missing_path_is_rule_based() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = ModelAdapter::load(&dir.path().join("heat_stress_model.json"));
        assert!(!adapter.is_model_loaded());
    }

    #[test]
    fn test_load_corrupt_file_is_rule_based() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not a model").unwrap();

        let adapter = ModelAdapter::load(file.path());
        assert!(!adapter.is_model_loaded());
        assert_eq!(adapter.predict(38.0, 60.0, 5.0).source, PredictionSource::RuleBased);
    }

    #[test]
    fn test_load_valid_forest() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SINGLE_LEAF_FOREST.as_bytes()).unwrap();

        let adapter = ModelAdapter::load(file.path());
        assert!(adapter.is_model_loaded());

        let result = adapter.predict(50.0, 90.0, 0.0);
        assert_eq!(result.label, RiskLabel::Moderate);
        assert_eq!(result.source, PredictionSource::ModelBased);
    }

    #[test]
    fn test_debug_names_backend() {
        let adapter = ModelAdapter::with_classifier(Arc::new(FailingClassifier));
        assert!(format!("{:?}", adapter).contains("failing"));
        assert!(format!("{:?}", ModelAdapter::rule_based()).contains("None"));
    }
}
