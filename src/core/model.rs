//! Gradient-boosted regression tree ensemble
//!
//! Reads the JSON model dump written by the training pipeline and evaluates
//! it natively. Only regression objectives with an identity link are
//! supported: the prediction is `base_score` plus the sum of one leaf value
//! per tree.

use crate::core::defaults::FeatureField;
use crate::core::estimator::{PriceModel, ScoringError};
use crate::core::features::PredictionFeatureVector;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

const SUPPORTED_OBJECTIVES: [&str; 4] = [
    "reg:squarederror",
    "reg:linear",
    "reg:absoluteerror",
    "reg:pseudohubererror",
];

const LEAF: i32 = -1;

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("Failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed model JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid model: {0}")]
    Format(String),
}

#[derive(Debug, Deserialize)]
struct ModelDump {
    learner: LearnerDump,
}

#[derive(Debug, Deserialize)]
struct LearnerDump {
    learner_model_param: LearnerModelParam,
    gradient_booster: BoosterDump,
    #[serde(default)]
    objective: Option<ObjectiveDump>,
}

#[derive(Debug, Deserialize)]
struct LearnerModelParam {
    base_score: String,
    #[serde(default)]
    num_feature: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObjectiveDump {
    name: String,
}

#[derive(Debug, Deserialize)]
struct BoosterDump {
    model: TreesDump,
}

#[derive(Debug, Deserialize)]
struct TreesDump {
    trees: Vec<TreeDump>,
}

#[derive(Debug, Deserialize)]
struct TreeDump {
    left_children: Vec<i32>,
    right_children: Vec<i32>,
    split_indices: Vec<usize>,
    split_conditions: Vec<f32>,
    default_left: Vec<Flag>,
}

/// Older dumps write `default_left` as 0/1, newer ones as booleans
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(u8),
}

impl Flag {
    fn is_set(&self) -> bool {
        match self {
            Flag::Bool(b) => *b,
            Flag::Int(i) => *i != 0,
        }
    }
}

/// One node in flattened form; leaves keep their value in `threshold`.
/// The trainer stores both in single precision.
#[derive(Debug, Clone, Copy)]
struct Node {
    left: i32,
    right: i32,
    feature: usize,
    threshold: f32,
    default_left: bool,
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_dump(dump: TreeDump, num_features: usize) -> Result<Self, ModelLoadError> {
        let n = dump.left_children.len();
        if n == 0 {
            return Err(ModelLoadError::Format("tree has no nodes".into()));
        }
        if [
            dump.right_children.len(),
            dump.split_indices.len(),
            dump.split_conditions.len(),
            dump.default_left.len(),
        ]
        .iter()
        .any(|len| *len != n)
        {
            return Err(ModelLoadError::Format("tree arrays differ in length".into()));
        }

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let (left, right) = (dump.left_children[i], dump.right_children[i]);
            if left != LEAF {
                // Children always come after their parent, which also rules out cycles
                for child in [left, right] {
                    if child <= i as i32 || child as usize >= n {
                        return Err(ModelLoadError::Format(format!(
                            "node {} has invalid child {}",
                            i, child
                        )));
                    }
                }
                if dump.split_indices[i] >= num_features {
                    return Err(ModelLoadError::Format(format!(
                        "node {} splits on feature {} of {}",
                        i, dump.split_indices[i], num_features
                    )));
                }
            }
            nodes.push(Node {
                left,
                right,
                feature: dump.split_indices[i],
                threshold: dump.split_conditions[i],
                default_left: dump.default_left[i].is_set(),
            });
        }

        Ok(Self { nodes })
    }

    #[inline]
    fn leaf_value(&self, features: &[f64]) -> f32 {
        let mut node = &self.nodes[0];
        while node.left != LEAF {
            // Features are narrowed before the comparison, as in training
            let value = features[node.feature] as f32;
            let next = if value.is_nan() {
                if node.default_left { node.left } else { node.right }
            } else if value < node.threshold {
                node.left
            } else {
                node.right
            };
            node = &self.nodes[next as usize];
        }
        node.threshold
    }
}

/// Tree ensemble over the 13 listing features
#[derive(Debug, Clone)]
pub struct TreeEnsembleModel {
    base_score: f64,
    trees: Vec<Tree>,
}

impl TreeEnsembleModel {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ModelLoadError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let model = Self::from_json_str(&text)?;
        tracing::info!(
            "Loaded price model from {} ({} trees)",
            path.as_ref().display(),
            model.num_trees()
        );
        Ok(model)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ModelLoadError> {
        let dump: ModelDump = serde_json::from_str(text)?;
        let learner = dump.learner;

        if let Some(objective) = &learner.objective {
            if !SUPPORTED_OBJECTIVES.contains(&objective.name.as_str()) {
                return Err(ModelLoadError::Format(format!(
                    "unsupported objective {}",
                    objective.name
                )));
            }
        }

        if let Some(num_feature) = &learner.learner_model_param.num_feature {
            let declared: usize = num_feature
                .parse()
                .map_err(|_| ModelLoadError::Format(format!("bad num_feature {}", num_feature)))?;
            if declared != FeatureField::COUNT {
                return Err(ModelLoadError::Format(format!(
                    "model has {} features, expected {}",
                    declared,
                    FeatureField::COUNT
                )));
            }
        }

        let base_score = parse_base_score(&learner.learner_model_param.base_score)?;
        let trees = learner
            .gradient_booster
            .model
            .trees
            .into_iter()
            .map(|t| Tree::from_dump(t, FeatureField::COUNT))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { base_score, trees })
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn base_score(&self) -> f64 {
        self.base_score
    }
}

impl PriceModel for TreeEnsembleModel {
    fn score(&self, features: &PredictionFeatureVector) -> Result<f64, ScoringError> {
        let values = features.as_slice();
        if values.len() != FeatureField::COUNT {
            return Err(ScoringError::WrongArity {
                expected: FeatureField::COUNT,
                actual: values.len(),
            });
        }

        let margin = self
            .trees
            .iter()
            .fold(self.base_score as f32, |sum, t| sum + t.leaf_value(values));
        let margin = f64::from(margin);
        if margin.is_finite() {
            Ok(margin)
        } else {
            Err(ScoringError::NonFinite(margin))
        }
    }
}

/// `base_score` is a string, sometimes wrapped in brackets: "5E-1" or "[3.86E0]"
fn parse_base_score(raw: &str) -> Result<f64, ModelLoadError> {
    raw.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<f64>()
        .map_err(|_| ModelLoadError::Format(format!("bad base_score {}", raw)))
}
