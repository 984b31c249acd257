// Flow classifier inference
// Scaler + classifier artifacts exported as JSON from the training pipeline

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Failed to read artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse artifact {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid artifact: {0}")]
    Invalid(String),

    #[error("Feature scaling failed - Shape mismatch: Expected {expected} features, got {got}")]
    FeatureMismatch { expected: usize, got: usize },
}

// =============================================================================
// SCALER
// =============================================================================

/// Standardization scaler: `(x - mean) / scale` per feature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn n_features_in(&self) -> usize {
        self.mean.len()
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.mean.is_empty() {
            return Err(ModelError::Invalid("scaler has no features".to_string()));
        }
        if self.mean.len() != self.scale.len() {
            return Err(ModelError::Invalid(format!(
                "scaler mean has {} entries but scale has {}",
                self.mean.len(),
                self.scale.len()
            )));
        }
        Ok(())
    }

    pub fn transform(&self, sample: &[f64]) -> Result<Vec<f64>, ModelError> {
        if sample.len() != self.n_features_in() {
            return Err(ModelError::FeatureMismatch {
                expected: self.n_features_in(),
                got: sample.len(),
            });
        }

        Ok(sample
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| {
                // Constant features were fitted with a zero scale
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (x - mean) / scale
            })
            .collect())
    }
}

// =============================================================================
// CLASSIFIERS
// =============================================================================

/// A single fitted decision tree in flattened node-array form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    fn validate(&self, n_classes: usize, n_features: usize) -> Result<(), ModelError> {
        let nodes = self.children_left.len();
        if nodes == 0 {
            return Err(ModelError::Invalid("tree has no nodes".to_string()));
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|&len| len != nodes)
        {
            return Err(ModelError::Invalid(
                "tree node arrays have different lengths".to_string(),
            ));
        }

        for node in 0..nodes {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left < 0 {
                if self.value[node].len() != n_classes {
                    return Err(ModelError::Invalid(format!(
                        "leaf {} has {} class weights, expected {}",
                        node,
                        self.value[node].len(),
                        n_classes
                    )));
                }
                continue;
            }
            let in_range = |child: i64| child > node as i64 && (child as usize) < nodes;
            if !in_range(left) || !in_range(right) {
                return Err(ModelError::Invalid(format!(
                    "node {} has out of range children ({}, {})",
                    node, left, right
                )));
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(ModelError::Invalid(format!(
                    "node {} splits on unknown feature {}",
                    node, feature
                )));
            }
        }
        Ok(())
    }

    /// Normalized class distribution of the leaf the sample falls into
    fn leaf_distribution(&self, sample: &[f64]) -> Vec<f64> {
        let mut node = 0usize;
        while self.children_left[node] >= 0 {
            let feature = self.feature[node] as usize;
            node = if sample[feature] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }

        let weights = &self.value[node];
        let total: f64 = weights.iter().sum();
        if total > 0.0 {
            weights.iter().map(|w| w / total).collect()
        } else {
            vec![1.0 / weights.len() as f64; weights.len()]
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub classes: Vec<String>,
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub classes: Vec<String>,
    /// One row for binary models, one row per class otherwise
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
}

/// Fitted classifier, tagged by estimator type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Classifier {
    RandomForest(RandomForest),
    LogisticRegression(LogisticRegression),
}

/// Predicted class with its full probability vector
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub probabilities: Vec<f64>,
}

impl Prediction {
    /// Probability of the predicted class
    pub fn confidence(&self) -> f64 {
        self.probabilities
            .iter()
            .copied()
            .fold(0.0_f64, f64::max)
    }
}

impl Classifier {
    pub fn classes(&self) -> &[String] {
        match self {
            Classifier::RandomForest(forest) => &forest.classes,
            Classifier::LogisticRegression(model) => &model.classes,
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            Classifier::RandomForest(forest) => forest.n_features,
            Classifier::LogisticRegression(model) => {
                model.coef.first().map(Vec::len).unwrap_or(0)
            },
        }
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.classes().len() < 2 {
            return Err(ModelError::Invalid(
                "classifier needs at least two classes".to_string(),
            ));
        }

        match self {
            Classifier::RandomForest(forest) => {
                if forest.trees.is_empty() {
                    return Err(ModelError::Invalid("forest has no trees".to_string()));
                }
                for tree in &forest.trees {
                    tree.validate(forest.classes.len(), forest.n_features)?;
                }
            },
            Classifier::LogisticRegression(model) => {
                let rows = model.coef.len();
                let expected_rows = if model.classes.len() == 2 {
                    1
                } else {
                    model.classes.len()
                };
                if rows != expected_rows || model.intercept.len() != rows {
                    return Err(ModelError::Invalid(format!(
                        "logistic model has {} coef rows and {} intercepts for {} classes",
                        rows,
                        model.intercept.len(),
                        model.classes.len()
                    )));
                }
                let width = self.n_features();
                if width == 0 || model.coef.iter().any(|row| row.len() != width) {
                    return Err(ModelError::Invalid(
                        "logistic coef rows have inconsistent widths".to_string(),
                    ));
                }
            },
        }
        Ok(())
    }

    pub fn predict_proba(&self, sample: &[f64]) -> Result<Vec<f64>, ModelError> {
        if sample.len() != self.n_features() {
            return Err(ModelError::FeatureMismatch {
                expected: self.n_features(),
                got: sample.len(),
            });
        }

        let probabilities = match self {
            Classifier::RandomForest(forest) => {
                let mut sums = vec![0.0; forest.classes.len()];
                for tree in &forest.trees {
                    for (sum, p) in sums.iter_mut().zip(tree.leaf_distribution(sample)) {
                        *sum += p;
                    }
                }
                let n_trees = forest.trees.len() as f64;
                sums.into_iter().map(|s| s / n_trees).collect()
            },
            Classifier::LogisticRegression(model) => {
                let logits: Vec<f64> = model
                    .coef
                    .iter()
                    .zip(&model.intercept)
                    .map(|(row, b)| row.iter().zip(sample).map(|(w, x)| w * x).sum::<f64>() + b)
                    .collect();

                if logits.len() == 1 {
                    let p = 1.0 / (1.0 + (-logits[0]).exp());
                    vec![1.0 - p, p]
                } else {
                    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                    let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
                    let total: f64 = exps.iter().sum();
                    exps.into_iter().map(|e| e / total).collect()
                }
            },
        };

        Ok(probabilities)
    }

    pub fn predict(&self, sample: &[f64]) -> Result<Prediction, ModelError> {
        let probabilities = self.predict_proba(sample)?;

        // First maximum wins on ties
        let mut best = 0usize;
        for (i, p) in probabilities.iter().enumerate() {
            if *p > probabilities[best] {
                best = i;
            }
        }

        Ok(Prediction {
            label: self.classes()[best].clone(),
            probabilities,
        })
    }
}

// =============================================================================
// ARTIFACT LOADING
// =============================================================================

fn read_artifact(path: &Path) -> Result<String, ModelError> {
    std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn parse_artifact<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ModelError> {
    let content = read_artifact(path)?;
    serde_json::from_str(&content).map_err(|source| ModelError::Parse {
        path: path.display().to_string(),
        source,
    })
}

pub fn load_classifier(path: impl AsRef<Path>) -> Result<Classifier, ModelError> {
    let classifier: Classifier = parse_artifact(path.as_ref())?;
    classifier.validate()?;
    Ok(classifier)
}

pub fn load_scaler(path: impl AsRef<Path>) -> Result<StandardScaler, ModelError> {
    let scaler: StandardScaler = parse_artifact(path.as_ref())?;
    scaler.validate()?;
    Ok(scaler)
}

/// Read the ordered feature column list, one name per non-empty line
pub fn load_feature_columns(path: impl AsRef<Path>) -> Result<Vec<String>, ModelError> {
    let content = read_artifact(path.as_ref())?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

/// Classifier and scaler; both load or neither does
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    pub classifier: Classifier,
    pub scaler: StandardScaler,
}

impl ModelArtifacts {
    pub fn new(classifier: Classifier, scaler: StandardScaler) -> Result<Self, ModelError> {
        classifier.validate()?;
        scaler.validate()?;
        if classifier.n_features() != scaler.n_features_in() {
            return Err(ModelError::Invalid(format!(
                "classifier expects {} features but scaler was fitted on {}",
                classifier.n_features(),
                scaler.n_features_in()
            )));
        }
        Ok(Self { classifier, scaler })
    }

    pub fn load(
        model_path: impl AsRef<Path>,
        scaler_path: impl AsRef<Path>,
    ) -> Result<Self, ModelError> {
        let classifier = load_classifier(model_path)?;
        info!(
            classes = classifier.classes().len(),
            features = classifier.n_features(),
            "Classifier loaded"
        );
        let scaler = load_scaler(scaler_path)?;
        info!(features = scaler.n_features_in(), "Scaler loaded");
        Self::new(classifier, scaler)
    }

    /// Scale then classify one raw feature vector
    pub fn predict(&self, raw: &[f64]) -> Result<Prediction, ModelError> {
        let scaled = self.scaler.transform(raw).map_err(|e| {
            warn!(
                expected = self.scaler.n_features_in(),
                received = raw.len(),
                "Feature vector does not match scaler"
            );
            e
        })?;
        self.classifier.predict(&scaled)
    }
}
