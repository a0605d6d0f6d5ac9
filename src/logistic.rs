//! Logistic blend model

use serde::Serialize;

/// Logistic link, stable for large |x|
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + e^{-m})` for margin `m = y * z`, without overflow
pub(crate) fn log_loss(margin: f64) -> f64 {
    if margin >= 0.0 {
        (-margin).exp().ln_1p()
    } else {
        -margin + margin.exp().ln_1p()
    }
}

/// Immutable intercept + coefficient vector; coefficient `k` multiplies feature `k`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogisticModel {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LogisticModel {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self {
            intercept,
            coefficients,
        }
    }

    /// All-zero model; predicts 0.5 everywhere
    pub fn zeros(dimension: usize) -> Self {
        Self::new(0.0, vec![0.0; dimension])
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn dimension(&self) -> usize {
        self.coefficients.len()
    }

    /// `intercept + dot(coefficients, features)`
    pub fn linear_predictor(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        sigmoid(self.linear_predictor(features))
    }
}
