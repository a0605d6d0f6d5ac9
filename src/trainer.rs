//! Online SGD trainer for the logistic blend
//!
//! Each epoch re-reads the training examples, shuffles them with a seeded RNG and
//! takes one gradient step per example on the logistic loss with ±1 labels:
//!
//! ```text
//! z = intercept + Σ c_k x_k
//! g = sigmoid(-y z)
//! intercept += η y g
//! c_k       += η y g x_k      (skipped where component k had no opinion)
//! ```

use crate::error::{invalid_config, BlendResult};
use crate::features::FeatureBuilder;
use crate::logistic::{log_loss, sigmoid, LogisticModel};
use crate::types::Rating;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

pub const DEFAULT_LEARNING_RATE: f64 = 0.00005;
pub const DEFAULT_EPOCHS: usize = 100;
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainerConfig {
    pub learning_rate: f64,
    pub epochs: usize,
    pub seed: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            learning_rate: DEFAULT_LEARNING_RATE,
            epochs: DEFAULT_EPOCHS,
            seed: DEFAULT_SEED,
        }
    }
}

impl TrainerConfig {
    /// Build a config from raw values, rejecting negative epoch counts and
    /// non-finite or non-positive learning rates. Zero epochs is allowed.
    pub fn validated(learning_rate: f64, epochs: i64, seed: u64) -> BlendResult<Self> {
        let epochs = usize::try_from(epochs)
            .map_err(|_| invalid_config(format!("epoch count {} is negative", epochs)))?;
        let config = Self {
            learning_rate,
            epochs,
            seed,
        };
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> BlendResult<()> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(invalid_config(format!(
                "learning rate {} must be finite and positive",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

/// Re-readable collection of training examples
pub trait TrainingSource {
    fn training_examples(&self) -> Vec<Rating>;
}

impl TrainingSource for [Rating] {
    fn training_examples(&self) -> Vec<Rating> {
        self.to_vec()
    }
}

impl TrainingSource for Vec<Rating> {
    fn training_examples(&self) -> Vec<Rating> {
        self.clone()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EpochSummary {
    pub epoch: usize,
    /// Mean of `ln(1 + e^{-y z})` over the epoch, each term measured before its update
    pub mean_log_loss: f64,
    pub model: LogisticModel,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub model: LogisticModel,
    pub epochs: Vec<EpochSummary>,
}

impl TrainingReport {
    pub fn final_loss(&self) -> Option<f64> {
        self.epochs.last().map(|e| e.mean_log_loss)
    }
}

pub struct LogisticModelTrainer {
    config: TrainerConfig,
    features: FeatureBuilder,
}

impl LogisticModelTrainer {
    pub fn new(config: TrainerConfig, features: FeatureBuilder) -> BlendResult<Self> {
        config.check()?;
        Ok(Self { config, features })
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn features(&self) -> &FeatureBuilder {
        &self.features
    }

    /// Train and return the final epoch's model
    pub fn train<S: TrainingSource + ?Sized>(&self, source: &S) -> LogisticModel {
        self.train_with_report(source).model
    }

    /// Train, keeping a snapshot and loss summary for every epoch
    pub fn train_with_report<S: TrainingSource + ?Sized>(&self, source: &S) -> TrainingReport {
        let start = Instant::now();
        let dim = self.features.dimension();
        let eta = self.config.learning_rate;

        let mut intercept = 0.0;
        let mut coefficients = vec![0.0; dim];
        let mut current = LogisticModel::zeros(dim);
        let mut summaries = Vec::with_capacity(self.config.epochs);
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        info!(
            "Training logistic blend: {} parameters, {} epochs, lr={}, seed={}",
            dim + 1,
            self.config.epochs,
            eta,
            self.config.seed
        );

        for epoch in 0..self.config.epochs {
            let mut batch = source.training_examples();
            batch.shuffle(&mut rng);

            let mut loss_sum = 0.0;
            for rating in &batch {
                let fv = self.features.build(rating.user, rating.item);
                let y = rating.value;

                let z = intercept
                    + coefficients
                        .iter()
                        .zip(&fv.values)
                        .map(|(c, x)| c * x)
                        .sum::<f64>();
                loss_sum += log_loss(y * z);

                let step = eta * y * sigmoid(-y * z);
                intercept += step;
                for (k, coef) in coefficients.iter_mut().enumerate() {
                    if fv.available[k] {
                        *coef += step * fv.values[k];
                    }
                }
            }

            current = LogisticModel::new(intercept, coefficients.clone());
            let mean_log_loss = if batch.is_empty() {
                0.0
            } else {
                loss_sum / batch.len() as f64
            };

            debug!(
                "Epoch {}/{}: loss={:.6}, intercept={:.6}, coefficients={:?}",
                epoch + 1,
                self.config.epochs,
                mean_log_loss,
                intercept,
                coefficients
            );

            summaries.push(EpochSummary {
                epoch,
                mean_log_loss,
                model: current.clone(),
            });
        }

        info!(
            "Training complete in {}ms: intercept={:.6}, coefficients={:?}",
            start.elapsed().as_millis(),
            current.intercept(),
            current.coefficients()
        );

        TrainingReport {
            model: current,
            epochs: summaries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::{MeanBiasModel, RatingCounts};
    use crate::error::BlendError;
    use crate::recommenders::{RecommenderList, ScoreEntry, TableItemScorer};
    use crate::types::ItemId;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn builder(intercept: f64, counts: &[(ItemId, u64)], entries: Vec<ScoreEntry>) -> FeatureBuilder {
        let counts: HashMap<ItemId, u64> = counts.iter().copied().collect();
        FeatureBuilder::new(
            Arc::new(MeanBiasModel::constant(intercept)),
            Arc::new(RatingCounts::from_counts(counts)),
            RecommenderList::new(vec![
                Arc::new(TableItemScorer::new("signal", entries)),
                Arc::new(TableItemScorer::silent("mute")),
            ]),
        )
    }

    fn labelled_examples() -> Vec<Rating> {
        (0..20)
            .map(|i| Rating::new(i % 3, i, if i % 2 == 0 { 1.0 } else { -1.0 }))
            .collect()
    }

    fn signal_for(examples: &[Rating]) -> Vec<ScoreEntry> {
        examples
            .iter()
            .map(|r| ScoreEntry {
                user: r.user,
                item: r.item,
                score: r.value,
            })
            .collect()
    }

    fn config(learning_rate: f64, epochs: usize) -> TrainerConfig {
        TrainerConfig {
            learning_rate,
            epochs,
            seed: 7,
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(matches!(
            TrainerConfig::validated(0.01, -1, 0),
            Err(BlendError::InvalidConfig(_))
        ));
        assert!(TrainerConfig::validated(0.0, 10, 0).is_err());
        assert!(TrainerConfig::validated(f64::NAN, 10, 0).is_err());
        assert_eq!(TrainerConfig::validated(0.01, 0, 3).unwrap().epochs, 0);
    }

    #[test]
    fn test_zero_epochs_gives_zero_model() {
        let trainer =
            LogisticModelTrainer::new(config(0.1, 0), builder(0.0, &[], vec![])).unwrap();
        let model = trainer.train(&labelled_examples());
        assert_eq!(model, LogisticModel::zeros(4));
    }

    #[test]
    fn test_single_step_update() {
        let examples = vec![Rating::new(1, 9, 1.0)];
        let b = builder(
            2.0,
            &[(9, 10)],
            vec![ScoreEntry { user: 1, item: 9, score: 3.0 }],
        );
        let trainer = LogisticModelTrainer::new(config(0.1, 1), b).unwrap();
        let model = trainer.train(&examples);

        // z = 0 so g = 0.5; step = 0.1 * 1 * 0.5
        assert!((model.intercept() - 0.05).abs() < 1e-15);
        let expected = [0.1, 0.05, 0.05, 0.0];
        for (got, want) in model.coefficients().iter().zip(expected) {
            assert!((got - want).abs() < 1e-15, "{} vs {}", got, want);
        }
    }

    #[test]
    fn test_updates_accumulate_within_epoch() {
        let examples = vec![Rating::new(1, 9, 1.0), Rating::new(1, 9, 1.0)];
        let trainer =
            LogisticModelTrainer::new(config(0.1, 1), builder(0.0, &[], vec![])).unwrap();
        let model = trainer.train(&examples);

        // first step adds 0.05; second adds 0.1 * sigmoid(-0.05) on top of it
        let expected = 0.05 + 0.1 * sigmoid(-0.05);
        assert!((model.intercept() - expected).abs() < 1e-15);
    }

    #[test]
    fn test_more_epochs_move_parameters() {
        let examples = labelled_examples();
        let b = builder(0.0, &[], signal_for(&examples));

        let one = LogisticModelTrainer::new(config(0.05, 1), b.clone())
            .unwrap()
            .train(&examples);
        let two = LogisticModelTrainer::new(config(0.05, 2), b)
            .unwrap()
            .train(&examples);

        assert_ne!(one, two);
        assert!(two.coefficients()[2] > one.coefficients()[2]);
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let examples = labelled_examples();
        let b = builder(0.5, &[(0, 4), (1, 40)], signal_for(&examples));
        let trainer = LogisticModelTrainer::new(config(0.02, 5), b).unwrap();

        assert_eq!(trainer.train(&examples), trainer.train(&examples));
    }

    #[test]
    fn test_learns_informative_component() {
        let examples = labelled_examples();
        let b = builder(0.0, &[], signal_for(&examples));
        let trainer = LogisticModelTrainer::new(config(0.1, 30), b).unwrap();
        let report = trainer.train_with_report(&examples);
        let model = &report.model;

        assert!(model.coefficients()[2] > 0.0);
        // bias and popularity features are identically zero here
        assert_eq!(model.coefficients()[0], 0.0);
        assert_eq!(model.coefficients()[1], 0.0);
        // silent component never receives an update
        assert_eq!(model.coefficients()[3], 0.0);

        assert_eq!(report.epochs.len(), 30);
        assert_eq!(&report.epochs[29].model, model);
        let first = report.epochs[0].mean_log_loss;
        assert!(report.final_loss().unwrap() < first);
    }

    #[test]
    fn test_empty_source() {
        let trainer =
            LogisticModelTrainer::new(config(0.1, 3), builder(0.0, &[], vec![])).unwrap();
        let report = trainer.train_with_report(&Vec::<Rating>::new());
        assert_eq!(report.model, LogisticModel::zeros(4));
        assert_eq!(report.final_loss(), Some(0.0));
    }
}
