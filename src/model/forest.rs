//! Random Forest - JSON artifact loading and inference
//!
//! The trainer exports each fitted tree as parallel node arrays
//! (`children_left`, `children_right`, `feature`, `threshold`, `value`).
//! A node is a leaf when `children_left == -1`; a sample goes left when
//! `x[feature] <= threshold`, comparing the feature in single precision
//! because that is how the trainer saw it.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::features::layout::{self, FEATURE_COUNT, FEATURE_VERSION, LayoutMismatchError};
use crate::features::FeatureVector;
use super::predictor::Classifier;

pub const ARTIFACT_FORMAT: &str = "random_forest";

const LEAF: i64 = -1;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("model artifact {path} is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported artifact format `{0}` (expected `random_forest`)")]
    Format(String),

    #[error("artifact feature layout mismatch: {0}")]
    Layout(#[from] LayoutMismatchError),

    #[error("expected 2 classes, artifact declares {0}")]
    Classes(usize),

    #[error("artifact contains no trees")]
    Empty,

    #[error("tree {tree}: {reason}")]
    InvalidTree { tree: usize, reason: String },
}

// ============================================================================
// ARTIFACT FORMAT
// ============================================================================

/// On-disk forest export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestArtifact {
    pub format: String,
    pub feature_names: Vec<String>,
    pub classes: Vec<i64>,
    pub trees: Vec<TreeArtifact>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeArtifact {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class counts (or weights)
    pub value: Vec<Vec<f64>>,
}

/// Where a loaded forest came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub path: String,
    pub sha256: String,
    pub trees: usize,
    pub classes: [i64; 2],
    pub feature_version: u8,
    pub layout_hash: u32,
    pub loaded_at: DateTime<Utc>,
}

// ============================================================================
// TREE
// ============================================================================

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Normalised class distribution
        proba: [f64; 2],
    },
}

#[derive(Debug, Clone)]
struct DecisionTree {
    nodes: Box<[Node]>,
}

impl DecisionTree {
    fn from_artifact(index: usize, tree: TreeArtifact) -> Result<Self, ModelError> {
        let invalid = |reason: String| ModelError::InvalidTree { tree: index, reason };

        let n = tree.children_left.len();
        if n == 0 {
            return Err(invalid("no nodes".to_string()));
        }
        if tree.children_right.len() != n
            || tree.feature.len() != n
            || tree.threshold.len() != n
            || tree.value.len() != n
        {
            return Err(invalid("node arrays have different lengths".to_string()));
        }

        let mut nodes = Vec::with_capacity(n);
        for id in 0..n {
            let left = tree.children_left[id];
            let right = tree.children_right[id];

            if left == LEAF {
                if right != LEAF {
                    return Err(invalid(format!("node {} has only a right child", id)));
                }
                nodes.push(Node::Leaf { proba: normalise(&tree.value[id]).map_err(|e| invalid(format!("node {}: {}", id, e)))? });
                continue;
            }

            // Children always come after their parent, so traversal terminates
            let child = |c: i64| -> Result<usize, ModelError> {
                if c <= id as i64 || c >= n as i64 {
                    Err(invalid(format!("node {} has out-of-order child {}", id, c)))
                } else {
                    Ok(c as usize)
                }
            };
            let left = child(left)?;
            let right = child(right)?;

            let feature = tree.feature[id];
            if feature < 0 || feature >= FEATURE_COUNT as i64 {
                return Err(invalid(format!("node {} splits on unknown feature {}", id, feature)));
            }

            let threshold = tree.threshold[id];
            if !threshold.is_finite() {
                return Err(invalid(format!("node {} has a non-finite threshold", id)));
            }

            nodes.push(Node::Split {
                feature: feature as usize,
                threshold,
                left,
                right,
            });
        }

        Ok(Self { nodes: nodes.into_boxed_slice() })
    }

    fn predict_proba(&self, features: &[f64]) -> &[f64; 2] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { proba } => return proba,
                Node::Split { feature, threshold, left, right } => {
                    let value = f64::from(features[*feature] as f32);
                    idx = if value <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

fn normalise(counts: &[f64]) -> Result<[f64; 2], String> {
    let [c0, c1] = counts else {
        return Err(format!("expected 2 class values, found {}", counts.len()));
    };
    if !(c0.is_finite() && c1.is_finite()) || *c0 < 0.0 || *c1 < 0.0 {
        return Err("class values must be finite and non-negative".to_string());
    }

    let total = c0 + c1;
    let total = if total == 0.0 { 1.0 } else { total };
    Ok([c0 / total, c1 / total])
}

// ============================================================================
// FOREST
// ============================================================================

/// Binary random forest loaded from a JSON export
#[derive(Debug, Clone)]
pub struct RandomForest {
    classes: [i64; 2],
    trees: Vec<DecisionTree>,
    info: ModelInfo,
}

impl RandomForest {
    /// Load and validate an artifact from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let shown = path.display().to_string();

        tracing::info!(path = %shown, "Loading model artifact");

        let bytes = std::fs::read(path).map_err(|source| ModelError::Io {
            path: shown.clone(),
            source,
        })?;

        let artifact: ForestArtifact = serde_json::from_slice(&bytes)
            .map_err(|source| ModelError::Parse { path: shown.clone(), source })?;

        let forest = Self::from_artifact(artifact, shown, checksum(&bytes))?;

        tracing::info!(
            trees = forest.info.trees,
            sha256 = %forest.info.sha256,
            "Model artifact loaded"
        );

        Ok(forest)
    }

    /// Parse an artifact held in memory
    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        let artifact: ForestArtifact = serde_json::from_str(json).map_err(|source| ModelError::Parse {
            path: "<memory>".to_string(),
            source,
        })?;
        Self::from_artifact(artifact, "<memory>".to_string(), checksum(json.as_bytes()))
    }

    fn from_artifact(artifact: ForestArtifact, path: String, sha256: String) -> Result<Self, ModelError> {
        if artifact.format != ARTIFACT_FORMAT {
            return Err(ModelError::Format(artifact.format));
        }

        layout::validate_feature_names(&artifact.feature_names)?;

        let classes: [i64; 2] = artifact
            .classes
            .as_slice()
            .try_into()
            .map_err(|_| ModelError::Classes(artifact.classes.len()))?;

        if artifact.trees.is_empty() {
            return Err(ModelError::Empty);
        }

        let trees = artifact
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, tree)| DecisionTree::from_artifact(i, tree))
            .collect::<Result<Vec<_>, _>>()?;

        let info = ModelInfo {
            path,
            sha256,
            trees: trees.len(),
            classes,
            feature_version: FEATURE_VERSION,
            layout_hash: layout::layout_hash(),
            loaded_at: Utc::now(),
        };

        Ok(Self { classes, trees, info })
    }

    pub fn info(&self) -> &ModelInfo {
        &self.info
    }

    /// Mean of the per-tree leaf distributions
    pub fn predict_proba(&self, features: &FeatureVector) -> [f64; 2] {
        let mut proba = [0.0f64; 2];
        for tree in &self.trees {
            let leaf = tree.predict_proba(features.as_slice());
            proba[0] += leaf[0];
            proba[1] += leaf[1];
        }

        let n = self.trees.len() as f64;
        [proba[0] / n, proba[1] / n]
    }

    /// Class with the highest probability, first one on a tie
    pub fn predict(&self, features: &FeatureVector) -> i64 {
        let proba = self.predict_proba(features);
        if proba[1] > proba[0] { self.classes[1] } else { self.classes[0] }
    }
}

impl Classifier for RandomForest {
    fn classify(&self, features: &FeatureVector) -> i64 {
        self.predict(features)
    }

    fn class_probabilities(&self, features: &FeatureVector) -> (f64, f64) {
        let [p0, p1] = self.predict_proba(features);
        (p0, p1)
    }

    fn model_info(&self) -> Option<&ModelInfo> {
        Some(&self.info)
    }
}

fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

// ============================================================================
// TESTS
// ============================================================================
