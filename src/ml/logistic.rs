//! One-vs-rest L2-regularised logistic regression.
//!
//! Each binary problem minimises the primal objective
//!
//! ```text
//! 0.5 * |w|^2 + C * sum_i ln(1 + exp(-y_i * (w . x_i + b)))
//! ```
//!
//! with `y_i` in {-1, +1}. When an intercept is fitted it is treated as a
//! weight on a constant feature of 1 and is regularised like the others.
//!
//! The solver is cyclic coordinate descent. Each coordinate step minimises a
//! quadratic upper bound of the objective (the logistic curvature is at most
//! 1/4), so every step is a descent step. Coordinates are visited in an order
//! reshuffled each epoch from a fixed seed.

use log::{debug, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{NawbaError, Result};

/// Hyperparameters of [`LogisticRegression`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticConfig {
    /// Inverse regularisation strength.
    pub c: f64,
    /// Seed for the coordinate visiting order.
    pub seed: u64,
    /// Maximum number of epochs per binary problem.
    pub max_iter: usize,
    /// Stop once no coordinate moves more than this in an epoch.
    pub tol: f64,
    pub fit_intercept: bool,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            c: 0.01,
            seed: 42,
            max_iter: 100,
            tol: 1e-4,
            fit_intercept: true,
        }
    }
}

impl LogisticConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.c > 0.0) {
            return Err(NawbaError::invalid_config(format!(
                "regularisation strength C must be positive, got {}",
                self.c
            )));
        }
        if self.max_iter == 0 {
            return Err(NawbaError::invalid_config("max_iter must be at least 1"));
        }
        if !(self.tol > 0.0) {
            return Err(NawbaError::invalid_config(format!(
                "tol must be positive, got {}",
                self.tol
            )));
        }
        Ok(())
    }
}

/// Unfitted one-vs-rest logistic regression.
#[derive(Debug, Clone, Default)]
pub struct LogisticRegression {
    config: LogisticConfig,
}

impl LogisticRegression {
    pub fn new(config: LogisticConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LogisticConfig {
        &self.config
    }

    /// Fit on dense rows `x` with labels `y`.
    ///
    /// Two classes train a single model for the larger label; more classes
    /// train one model per class against the rest.
    pub fn fit<L>(&self, x: &[Vec<f64>], y: &[L]) -> Result<FittedLogistic<L>>
    where
        L: Ord + Clone,
    {
        self.config.validate()?;
        if x.len() != y.len() {
            return Err(NawbaError::invalid_argument(format!(
                "{} feature rows but {} labels",
                x.len(),
                y.len()
            )));
        }
        if x.is_empty() {
            return Err(NawbaError::empty_input("no training rows"));
        }
        let n_features = x[0].len();
        if let Some(row) = x.iter().position(|row| row.len() != n_features) {
            return Err(NawbaError::column_mismatch(format!(
                "training row {row} has {} features, expected {n_features}",
                x[row].len()
            )));
        }

        let mut classes: Vec<L> = y.to_vec();
        classes.sort();
        classes.dedup();
        if classes.len() < 2 {
            return Err(NawbaError::invalid_argument(format!(
                "training data holds {} class; at least 2 are required",
                classes.len()
            )));
        }

        let positives: Vec<&L> = if classes.len() == 2 {
            vec![&classes[1]]
        } else {
            classes.iter().collect()
        };

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let models = positives
            .into_iter()
            .enumerate()
            .map(|(k, positive)| {
                let targets: Vec<f64> = y
                    .iter()
                    .map(|label| if label == positive { 1.0 } else { -1.0 })
                    .collect();
                let model = self.fit_binary(x, &targets, n_features, &mut rng);
                debug!(
                    "binary problem {k}: {} epochs, converged = {}",
                    model.epochs, model.converged
                );
                if !model.converged {
                    warn!(
                        "logistic solver reached max_iter ({}) on binary problem {k} without converging",
                        self.config.max_iter
                    );
                }
                model
            })
            .collect();

        Ok(FittedLogistic {
            classes,
            models,
            n_features,
        })
    }

    fn fit_binary(
        &self,
        x: &[Vec<f64>],
        targets: &[f64],
        n_features: usize,
        rng: &mut StdRng,
    ) -> BinaryModel {
        let c = self.config.c;
        let n_coordinates = n_features + usize::from(self.config.fit_intercept);
        let feature = |i: usize, j: usize| if j < n_features { x[i][j] } else { 1.0 };

        let column_sq: Vec<f64> = (0..n_coordinates)
            .map(|j| (0..x.len()).map(|i| feature(i, j).powi(2)).sum::<f64>())
            .collect();

        let mut weights = vec![0.0; n_coordinates];
        let mut margins = vec![0.0; x.len()];
        let mut order: Vec<usize> = (0..n_coordinates).collect();
        let mut converged = false;
        let mut epochs = 0;

        while epochs < self.config.max_iter {
            epochs += 1;
            order.shuffle(rng);
            let mut largest_step: f64 = 0.0;

            for &j in &order {
                let mut gradient = weights[j];
                for i in 0..x.len() {
                    let xij = feature(i, j);
                    if xij != 0.0 {
                        gradient -= c * targets[i] * xij * sigmoid(-targets[i] * margins[i]);
                    }
                }
                let curvature = 1.0 + 0.25 * c * column_sq[j];
                let step = -gradient / curvature;
                if step == 0.0 {
                    continue;
                }

                weights[j] += step;
                for (i, margin) in margins.iter_mut().enumerate() {
                    *margin += step * feature(i, j);
                }
                largest_step = largest_step.max(step.abs());
            }

            if largest_step < self.config.tol {
                converged = true;
                break;
            }
        }

        let intercept = if self.config.fit_intercept {
            weights.pop().unwrap_or(0.0)
        } else {
            0.0
        };

        BinaryModel {
            coefficients: weights,
            intercept,
            epochs,
            converged,
        }
    }
}

fn sigmoid(t: f64) -> f64 {
    if t >= 0.0 {
        1.0 / (1.0 + (-t).exp())
    } else {
        let e = t.exp();
        e / (1.0 + e)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct BinaryModel {
    coefficients: Vec<f64>,
    intercept: f64,
    epochs: usize,
    converged: bool,
}

impl BinaryModel {
    fn decision(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(w, v)| w * v)
                .sum::<f64>()
    }
}

/// A fitted one-vs-rest model. Not persisted; it lives for one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedLogistic<L> {
    classes: Vec<L>,
    models: Vec<BinaryModel>,
    n_features: usize,
}

impl<L: Clone> FittedLogistic<L> {
    /// Class labels in sorted order.
    pub fn classes(&self) -> &[L] {
        &self.classes
    }

    /// Get the number of features the model was fit on.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Coefficients of every binary model.
    pub fn coefficients(&self) -> Vec<&[f64]> {
        self.models.iter().map(|m| m.coefficients.as_slice()).collect()
    }

    pub fn intercepts(&self) -> Vec<f64> {
        self.models.iter().map(|m| m.intercept).collect()
    }

    /// Raw decision values: one per binary model.
    pub fn decision_function(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.n_features {
            return Err(NawbaError::column_mismatch(format!(
                "model was fitted on {} features but the row has {}",
                self.n_features,
                row.len()
            )));
        }
        Ok(self.models.iter().map(|m| m.decision(row)).collect())
    }

    /// Predict one label per row.
    pub fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<L>> {
        x.iter().map(|row| self.predict_row(row)).collect()
    }

    fn predict_row(&self, row: &[f64]) -> Result<L> {
        let decisions = self.decision_function(row)?;
        let class = if self.models.len() == 1 {
            usize::from(decisions[0] > 0.0)
        } else {
            let mut best = 0;
            for (k, value) in decisions.iter().enumerate() {
                if *value > decisions[best] {
                    best = k;
                }
            }
            best
        };
        Ok(self.classes[class].clone())
    }
}
