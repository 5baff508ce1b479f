//! Per-request training loop.
//!
//! Every call trains a freshly initialized [`ScoreNet`] against the supplied
//! target vector: full-batch MSE, Adam, and reduce-on-plateau learning-rate
//! decay. The loop sits behind [`crate::ports::ScoreModelTrainer`] so a
//! caching trainer could replace it without touching callers.

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::foundation::{Deadline, EngineError};

use super::network::{AdamState, AdamVecState, ScoreNet, DROPOUT_P};

/// Epoch budget for the full train-and-score path.
pub const TRAIN_EPOCHS: usize = 500;

/// Epoch budget for the interpretability path.
pub const EXPLAIN_EPOCHS: usize = 200;

/// Options for one training run.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub epochs: usize,
    pub learning_rate: f64,
    pub weight_decay: f64,
    /// Epochs without improvement before the learning rate is decayed.
    pub plateau_patience: usize,
    pub plateau_factor: f64,
    pub dropout: f64,
    /// Seed for parameter init and dropout; entropy-seeded when absent.
    pub seed: Option<u64>,
    pub deadline: Deadline,
}

impl TrainOptions {
    pub fn scoring() -> Self {
        Self {
            epochs: TRAIN_EPOCHS,
            learning_rate: 1e-3,
            weight_decay: 1e-5,
            plateau_patience: 50,
            plateau_factor: 0.1,
            dropout: DROPOUT_P,
            seed: None,
            deadline: Deadline::none(),
        }
    }

    pub fn explanation() -> Self {
        Self {
            epochs: EXPLAIN_EPOCHS,
            ..Self::scoring()
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }
}

/// A trained model plus its loss trajectory. Ephemeral: lives for one
/// request only.
#[derive(Debug, Clone)]
pub struct TrainedScoreModel {
    net: ScoreNet,
    losses: Vec<f64>,
}

impl TrainedScoreModel {
    pub fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        self.net.predict(x)
    }

    pub fn losses(&self) -> &[f64] {
        &self.losses
    }

    pub fn final_loss(&self) -> f64 {
        self.losses.last().copied().unwrap_or(0.0)
    }
}

/// The default training loop: full-batch Adam over a fixed epoch budget.
#[derive(Debug, Clone, Default)]
pub struct AdamTrainer;

impl AdamTrainer {
    pub fn train(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        opts: &TrainOptions,
    ) -> Result<TrainedScoreModel, EngineError> {
        let n = x.nrows();
        if n == 0 || n != y.len() {
            return Err(EngineError::dimension(format!(
                "target vector has length {}, expected {}",
                y.len(),
                n
            )));
        }

        let mut rng = match opts.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let dim = x.ncols();
        let mut net = ScoreNet::new(dim, opts.dropout, &mut rng);
        let targets = y.clone().insert_axis(Axis(1));

        let mut opt_w1 = AdamState::new(net.w1.dim());
        let mut opt_w2 = AdamState::new(net.w2.dim());
        let mut opt_w3 = AdamState::new(net.w3.dim());
        let mut opt_w4 = AdamState::new(net.w4.dim());
        let mut opt_b1 = AdamVecState::new(net.b1.len());
        let mut opt_b2 = AdamVecState::new(net.b2.len());
        let mut opt_b3 = AdamVecState::new(net.b3.len());
        let mut opt_b4 = AdamVecState::new(net.b4.len());

        let mut lr = opts.learning_rate;
        let mut best_loss = f64::INFINITY;
        let mut stale_epochs = 0usize;
        let mut losses = Vec::with_capacity(opts.epochs);

        for epoch in 0..opts.epochs {
            if epoch % 16 == 0 {
                opts.deadline.check()?;
            }

            let cache = net.forward_train(x, &mut rng);
            let residual = &cache.output - &targets;
            let loss = residual.mapv(|r| r * r).mean().unwrap_or(0.0);
            losses.push(loss);

            let grad_output = residual.mapv(|r| 2.0 * r / n as f64);
            let grads = net.backward(&cache, &grad_output);

            let t = epoch + 1;
            opt_w1.step(&mut net.w1, &grads.gw1, lr, opts.weight_decay, t);
            opt_w2.step(&mut net.w2, &grads.gw2, lr, opts.weight_decay, t);
            opt_w3.step(&mut net.w3, &grads.gw3, lr, opts.weight_decay, t);
            opt_w4.step(&mut net.w4, &grads.gw4, lr, opts.weight_decay, t);
            opt_b1.step(&mut net.b1, &grads.gb1, lr, t);
            opt_b2.step(&mut net.b2, &grads.gb2, lr, t);
            opt_b3.step(&mut net.b3, &grads.gb3, lr, t);
            opt_b4.step(&mut net.b4, &grads.gb4, lr, t);

            // Reduce-on-plateau: decay when the loss stops improving.
            if loss < best_loss * (1.0 - 1e-4) {
                best_loss = loss;
                stale_epochs = 0;
            } else {
                stale_epochs += 1;
                if stale_epochs > opts.plateau_patience {
                    lr *= opts.plateau_factor;
                    stale_epochs = 0;
                }
            }

            if !loss.is_finite() {
                return Err(EngineError::internal(format!(
                    "training diverged at epoch {}",
                    epoch
                )));
            }
        }

        Ok(TrainedScoreModel { net, losses })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn toy_data() -> (Array2<f64>, Array1<f64>) {
        // Standardized-looking inputs with a simple linear target.
        let x = array![
            [-1.2, 0.5],
            [-0.6, -0.9],
            [0.0, 1.1],
            [0.4, -0.3],
            [0.9, 0.8],
            [1.5, -1.2],
        ];
        let y = x.column(0).to_owned() * 0.7 - x.column(1).to_owned() * 0.3;
        (x, y)
    }

    fn quiet_options() -> TrainOptions {
        TrainOptions {
            dropout: 0.0,
            seed: Some(11),
            ..TrainOptions::scoring()
        }
    }

    #[test]
    fn records_one_loss_per_epoch() {
        let (x, y) = toy_data();
        let model = AdamTrainer.train(&x, &y, &quiet_options()).unwrap();
        assert_eq!(model.losses().len(), TRAIN_EPOCHS);
        assert!(model.losses().iter().all(|l| l.is_finite()));
    }

    #[test]
    fn loss_decreases_on_learnable_data() {
        let (x, y) = toy_data();
        let model = AdamTrainer.train(&x, &y, &quiet_options()).unwrap();
        assert!(
            model.final_loss() < model.losses()[0],
            "loss failed to improve: first={}, last={}",
            model.losses()[0],
            model.final_loss()
        );
    }

    #[test]
    fn same_seed_reproduces_the_run() {
        let (x, y) = toy_data();
        let a = AdamTrainer.train(&x, &y, &quiet_options()).unwrap();
        let b = AdamTrainer.train(&x, &y, &quiet_options()).unwrap();
        assert_eq!(a.losses(), b.losses());
        assert_eq!(a.predict(&x), b.predict(&x));
    }

    #[test]
    fn rejects_target_length_mismatch() {
        let (x, _) = toy_data();
        let y = array![1.0, 2.0];
        let err = AdamTrainer.train(&x, &y, &quiet_options()).unwrap_err();
        assert_eq!(err.code(), "DIMENSION_MISMATCH");
    }

    #[test]
    fn expired_deadline_aborts_training() {
        let (x, y) = toy_data();
        let opts = quiet_options().with_deadline(Deadline::after(std::time::Duration::ZERO));
        std::thread::sleep(std::time::Duration::from_millis(2));
        let err = AdamTrainer.train(&x, &y, &opts).unwrap_err();
        assert_eq!(err.code(), "DEADLINE_EXCEEDED");
    }
}
