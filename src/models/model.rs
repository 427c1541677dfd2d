//! Regression model evaluation for linear / decision-tree / random-forest
//! artifacts.
//!
//! The tree layout mirrors the flat node arrays of a CART regressor:
//! node `i` is a leaf when `children_left[i] < 0`; otherwise the sample goes
//! left when `x[feature[i]] <= threshold[i]` and right otherwise.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::PredictError;
use crate::models::Regressor;

/// Any model kind the artifact format can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressionModel {
    Linear(LinearModel),
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
}

impl RegressionModel {
    pub fn display_name(&self) -> &'static str {
        match self {
            RegressionModel::Linear(_) => "Linear regression",
            RegressionModel::DecisionTree(_) => "Decision tree",
            RegressionModel::RandomForest(_) => "Random forest",
        }
    }

    /// Number of features the model reads, when it can be determined.
    pub fn n_features(&self) -> Option<usize> {
        match self {
            RegressionModel::Linear(m) => Some(m.coefficients.len()),
            RegressionModel::DecisionTree(t) => t.max_feature().map(|f| f + 1),
            RegressionModel::RandomForest(forest) => forest
                .trees
                .iter()
                .filter_map(DecisionTree::max_feature)
                .max()
                .map(|f| f + 1),
        }
    }

    /// Structural checks run once on load. Returns a human-readable reason.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            RegressionModel::Linear(m) => m.validate(),
            RegressionModel::DecisionTree(t) => t.validate(),
            RegressionModel::RandomForest(f) => f.validate(),
        }
    }
}

impl Regressor for RegressionModel {
    fn predict(&self, features: &[f64]) -> Result<f64, PredictError> {
        match self {
            RegressionModel::Linear(m) => m.predict(features),
            RegressionModel::DecisionTree(t) => t.predict(features),
            RegressionModel::RandomForest(f) => f.predict(features),
        }
    }
}

/// `y = intercept + Σ coefficients[i] * x[i]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    fn validate(&self) -> Result<(), String> {
        if self.coefficients.is_empty() {
            return Err("linear model has no coefficients".to_string());
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err("linear model has non-finite parameters".to_string());
        }
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> Result<f64, PredictError> {
        if features.len() != self.coefficients.len() {
            return Err(PredictError::inference(format!(
                "expected {} features, got {}",
                self.coefficients.len(),
                features.len()
            )));
        }
        let x = DVector::from_column_slice(features);
        let beta = DVector::from_column_slice(&self.coefficients);
        Ok(self.intercept + beta.dot(&x))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl DecisionTree {
    fn node_count(&self) -> usize {
        self.value.len()
    }

    fn is_leaf(&self, node: usize) -> bool {
        self.children_left.get(node).is_none_or(|&left| left < 0)
    }

    fn max_feature(&self) -> Option<usize> {
        (0..self.node_count())
            .filter(|&n| !self.is_leaf(n))
            .filter_map(|n| self.feature.get(n).and_then(|&f| usize::try_from(f).ok()))
            .max()
    }

    fn validate(&self) -> Result<(), String> {
        let n = self.node_count();
        if n == 0 {
            return Err("decision tree has no nodes".to_string());
        }
        let lens = [
            self.children_left.len(),
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
        ];
        if lens.iter().any(|&len| len != n) {
            return Err(format!(
                "decision tree node arrays differ in length (value={n}, left={}, right={}, feature={}, threshold={})",
                lens[0], lens[1], lens[2], lens[3]
            ));
        }

        for node in 0..n {
            if self.is_leaf(node) {
                if !self.value[node].is_finite() {
                    return Err(format!("leaf {node} has a non-finite value"));
                }
                continue;
            }
            for child in [self.children_left[node], self.children_right[node]] {
                // Children always come after their parent in a CART node array,
                // which also rules out cycles.
                let in_range = usize::try_from(child).is_ok_and(|c| c > node && c < n);
                if !in_range {
                    return Err(format!("node {node} has invalid child index {child}"));
                }
            }
            if self.feature[node] < 0 {
                return Err(format!("node {node} has negative feature index"));
            }
            if self.threshold[node].is_nan() {
                return Err(format!("node {node} has a NaN threshold"));
            }
        }
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> Result<f64, PredictError> {
        let n = self.node_count();
        let broken = |node: usize| PredictError::inference(format!("tree node {node} is malformed"));
        let mut node = 0usize;
        // Depth cannot exceed the node count for a validated tree.
        for _ in 0..=n {
            let left = *self.children_left.get(node).ok_or_else(|| broken(node))?;
            if left < 0 {
                return self.value.get(node).copied().ok_or_else(|| broken(node));
            }
            let (Some(&feature), Some(&threshold), Some(&right)) = (
                self.feature.get(node),
                self.threshold.get(node),
                self.children_right.get(node),
            ) else {
                return Err(broken(node));
            };
            let Some(&x) = usize::try_from(feature).ok().and_then(|f| features.get(f)) else {
                return Err(PredictError::inference(format!(
                    "tree splits on feature {feature} but only {} features were given",
                    features.len()
                )));
            };
            let next = if x <= threshold { left } else { right };
            node = usize::try_from(next).map_err(|_| broken(node))?;
        }
        Err(PredictError::inference("tree traversal did not reach a leaf"))
    }
}

/// Mean of independent decision trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("random forest has no trees".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate().map_err(|e| format!("tree {i}: {e}"))?;
        }
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> Result<f64, PredictError> {
        if self.trees.is_empty() {
            return Err(PredictError::inference("random forest has no trees"));
        }
        let mut sum = 0.0;
        for tree in &self.trees {
            sum += tree.predict(features)?;
        }
        Ok(sum / self.trees.len() as f64)
    }
}
