//! Pre-trained classifier artifacts.
//!
//! The offline pipeline trains a random forest on
//! `[temperature, humidity, wind_speed]` and exports it as JSON. Any other
//! backend plugs in by implementing [`Classifier`].

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::{RiskLabel, UnknownLabel};

/// Number of features every heat-stress classifier consumes.
pub const FEATURE_COUNT: usize = 3;

/// Model loading and invocation errors
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Failed to read model file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid model artifact: {0}")]
    Invalid(String),

    #[error("Feature vector has {got} values, model expects {expected}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("Model produced a label outside the risk categories: {0}")]
    UnknownLabel(#[from] UnknownLabel),

    #[error("Model evaluation failed: {0}")]
    Evaluation(String),
}

/// A loaded classifier that maps one feature row to one label.
pub trait Classifier: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Predict the label for a single feature row.
    fn predict(&self, features: &[f64]) -> Result<String, ModelError>;
}

/// Random-forest classifier exported from the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestModel {
    n_features: usize,
    classes: Vec<String>,
    trees: Vec<Tree>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// `x[feature] <= threshold` goes left, otherwise right.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Per-class weights aligned with `ForestModel::classes`.
    Leaf { value: Vec<f64> },
}

impl ForestModel {
    /// Read and check an artifact from disk.
    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let model: ForestModel = serde_json::from_str(json)?;
        model.check()?;
        Ok(model)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Structural checks so that prediction can never loop or index out of
    /// bounds.
    fn check(&self) -> Result<(), ModelError> {
        if self.n_features != FEATURE_COUNT {
            return Err(ModelError::Invalid(format!(
                "model has {} features, expected {}",
                self.n_features, FEATURE_COUNT
            )));
        }

        if self.classes.is_empty() {
            return Err(ModelError::Invalid("model has no classes".into()));
        }

        for class in &self.classes {
            class.parse::<RiskLabel>().map_err(|e| ModelError::Invalid(e.to_string()))?;
        }

        if self.trees.is_empty() {
            return Err(ModelError::Invalid("model has no trees".into()));
        }

        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(ModelError::Invalid(format!("tree {} is empty", t)));
            }

            for (i, node) in tree.nodes.iter().enumerate() {
                match node {
                    Node::Split {
                        feature,
                        left,
                        right,
                        ..
                    } => {
                        if *feature >= self.n_features {
                            return Err(ModelError::Invalid(format!(
                                "tree {} node {} splits on feature {}",
                                t, i, feature
                            )));
                        }
                        // Children must point forward, which also rules out cycles.
                        for child in [*left, *right] {
                            if child <= i || child >= tree.nodes.len() {
                                return Err(ModelError::Invalid(format!(
                                    "tree {} node {} has out-of-order child {}",
                                    t, i, child
                                )));
                            }
                        }
                    }
                    Node::Leaf { value } => {
                        if value.len() != self.classes.len() {
                            return Err(ModelError::Invalid(format!(
                                "tree {} leaf {} has {} weights for {} classes",
                                t,
                                i,
                                value.len(),
                                self.classes.len()
                            )));
                        }
                        if value.iter().any(|v| !v.is_finite() || *v < 0.0)
                            || value.iter().sum::<f64>() <= 0.0
                        {
                            return Err(ModelError::Invalid(format!(
                                "tree {} leaf {} has invalid weights",
                                t, i
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Leaf weights reached by `features` in one tree.
    fn leaf<'a>(&self, tree: &'a Tree, features: &[f64]) -> Result<&'a [f64], ModelError> {
        let mut index = 0;
        loop {
            match tree.nodes.get(index) {
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = features.get(*feature).copied().ok_or(ModelError::ShapeMismatch {
                        expected: self.n_features,
                        got: features.len(),
                    })?;
                    index = if x <= *threshold { *left } else { *right };
                }
                Some(Node::Leaf { value }) => return Ok(value),
                None => {
                    return Err(ModelError::Evaluation(format!(
                        "node {} does not exist",
                        index
                    )))
                }
            }
        }
    }
}

impl Classifier for ForestModel {
    fn name(&self) -> &str {
        "random_forest"
    }

    fn predict(&self, features: &[f64]) -> Result<String, ModelError> {
        if features.len() != self.n_features {
            return Err(ModelError::ShapeMismatch {
                expected: self.n_features,
                got: features.len(),
            });
        }

        // Mean of each tree's normalized class distribution.
        let mut votes = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let value = self.leaf(tree, features)?;
            let total: f64 = value.iter().sum();
            for (vote, weight) in votes.iter_mut().zip(value) {
                *vote += weight / total;
            }
        }

        let mut best = 0;
        for (i, vote) in votes.iter().enumerate() {
            if *vote > votes[best] {
                best = i;
            }
        }

        self.classes
            .get(best)
            .cloned()
            .ok_or_else(|| ModelError::Evaluation("no class selected".into()))
    }
}
