//! Feed-forward scoring network.
//!
//! A small fully-connected regressor (input -> 64 -> 32 -> 16 -> 1, ReLU)
//! with inverted dropout after the first two hidden layers. Parameters are
//! randomly initialized per request and never persisted.

use ndarray::{Array1, Array2, Axis};
use rand::Rng;

const HIDDEN1: usize = 64;
const HIDDEN2: usize = 32;
const HIDDEN3: usize = 16;

/// Dropout probability used by the heavier training variant.
pub const DROPOUT_P: f64 = 0.2;

#[derive(Debug, Clone)]
pub struct ScoreNet {
    pub(super) w1: Array2<f64>,
    pub(super) b1: Array1<f64>,
    pub(super) w2: Array2<f64>,
    pub(super) b2: Array1<f64>,
    pub(super) w3: Array2<f64>,
    pub(super) b3: Array1<f64>,
    pub(super) w4: Array2<f64>,
    pub(super) b4: Array1<f64>,
    dropout: f64,
}

/// Activations cached by a training-mode forward pass.
pub(super) struct ForwardCache {
    x: Array2<f64>,
    z1: Array2<f64>,
    d1: Array2<f64>,
    mask1: Array2<f64>,
    z2: Array2<f64>,
    d2: Array2<f64>,
    mask2: Array2<f64>,
    z3: Array2<f64>,
    a3: Array2<f64>,
    pub(super) output: Array2<f64>,
}

/// Parameter gradients matching [`ScoreNet`]'s tensors.
pub(super) struct Gradients {
    pub gw1: Array2<f64>,
    pub gb1: Array1<f64>,
    pub gw2: Array2<f64>,
    pub gb2: Array1<f64>,
    pub gw3: Array2<f64>,
    pub gb3: Array1<f64>,
    pub gw4: Array2<f64>,
    pub gb4: Array1<f64>,
}

fn xavier<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Array2<f64> {
    let scale = (2.0 / (rows + cols) as f64).sqrt();
    Array2::from_shape_fn((rows, cols), |_| (rng.gen::<f64>() - 0.5) * 2.0 * scale)
}

fn relu(x: &Array2<f64>) -> Array2<f64> {
    x.mapv(|v| v.max(0.0))
}

fn relu_grad(z: &Array2<f64>) -> Array2<f64> {
    z.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 })
}

impl ScoreNet {
    /// Fresh Xavier-initialized parameters. `dropout` of 0 disables the
    /// dropout layers entirely.
    pub fn new<R: Rng>(input_dim: usize, dropout: f64, rng: &mut R) -> Self {
        Self {
            w1: xavier(input_dim, HIDDEN1, rng),
            b1: Array1::zeros(HIDDEN1),
            w2: xavier(HIDDEN1, HIDDEN2, rng),
            b2: Array1::zeros(HIDDEN2),
            w3: xavier(HIDDEN2, HIDDEN3, rng),
            b3: Array1::zeros(HIDDEN3),
            w4: xavier(HIDDEN3, 1, rng),
            b4: Array1::zeros(1),
            dropout,
        }
    }

    /// Inference pass: no dropout, returns one score per row.
    pub fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        let a1 = relu(&(x.dot(&self.w1) + &self.b1));
        let a2 = relu(&(a1.dot(&self.w2) + &self.b2));
        let a3 = relu(&(a2.dot(&self.w3) + &self.b3));
        let out = a3.dot(&self.w4) + &self.b4;
        out.column(0).to_owned()
    }

    /// Training-mode forward pass with inverted-dropout masks.
    pub(super) fn forward_train<R: Rng>(&self, x: &Array2<f64>, rng: &mut R) -> ForwardCache {
        let z1 = x.dot(&self.w1) + &self.b1;
        let a1 = relu(&z1);
        let mask1 = self.dropout_mask(a1.dim(), rng);
        let d1 = &a1 * &mask1;

        let z2 = d1.dot(&self.w2) + &self.b2;
        let a2 = relu(&z2);
        let mask2 = self.dropout_mask(a2.dim(), rng);
        let d2 = &a2 * &mask2;

        let z3 = d2.dot(&self.w3) + &self.b3;
        let a3 = relu(&z3);
        let output = a3.dot(&self.w4) + &self.b4;

        ForwardCache {
            x: x.clone(),
            z1,
            d1,
            mask1,
            z2,
            d2,
            mask2,
            z3,
            a3,
            output,
        }
    }

    /// Backpropagates the output gradient through the cached pass.
    pub(super) fn backward(&self, cache: &ForwardCache, grad_output: &Array2<f64>) -> Gradients {
        let gw4 = cache.a3.t().dot(grad_output);
        let gb4 = grad_output.sum_axis(Axis(0));

        let g_a3 = grad_output.dot(&self.w4.t());
        let g_z3 = &g_a3 * &relu_grad(&cache.z3);
        let gw3 = cache.d2.t().dot(&g_z3);
        let gb3 = g_z3.sum_axis(Axis(0));

        let g_d2 = g_z3.dot(&self.w3.t());
        let g_a2 = &g_d2 * &cache.mask2;
        let g_z2 = &g_a2 * &relu_grad(&cache.z2);
        let gw2 = cache.d1.t().dot(&g_z2);
        let gb2 = g_z2.sum_axis(Axis(0));

        let g_d1 = g_z2.dot(&self.w2.t());
        let g_a1 = &g_d1 * &cache.mask1;
        let g_z1 = &g_a1 * &relu_grad(&cache.z1);
        let gw1 = cache.x.t().dot(&g_z1);
        let gb1 = g_z1.sum_axis(Axis(0));

        Gradients {
            gw1,
            gb1,
            gw2,
            gb2,
            gw3,
            gb3,
            gw4,
            gb4,
        }
    }

    fn dropout_mask<R: Rng>(&self, dim: (usize, usize), rng: &mut R) -> Array2<f64> {
        if self.dropout <= 0.0 {
            return Array2::ones(dim);
        }
        let keep = 1.0 - self.dropout;
        Array2::from_shape_fn(dim, |_| {
            if rng.gen::<f64>() < keep {
                1.0 / keep
            } else {
                0.0
            }
        })
    }
}

/// First-order adaptive gradient step (Adam) for one parameter matrix.
#[derive(Debug, Clone)]
pub(super) struct AdamState {
    m: Array2<f64>,
    v: Array2<f64>,
}

impl AdamState {
    pub fn new(shape: (usize, usize)) -> Self {
        Self {
            m: Array2::zeros(shape),
            v: Array2::zeros(shape),
        }
    }

    pub fn step(
        &mut self,
        params: &mut Array2<f64>,
        grads: &Array2<f64>,
        lr: f64,
        weight_decay: f64,
        t: usize,
    ) {
        const BETA1: f64 = 0.9;
        const BETA2: f64 = 0.999;
        const EPS: f64 = 1e-8;

        // L2-style weight decay folded into the gradient.
        let grads = if weight_decay > 0.0 {
            grads + &(&*params * weight_decay)
        } else {
            grads.clone()
        };

        self.m = &self.m * BETA1 + &grads * (1.0 - BETA1);
        self.v = &self.v * BETA2 + &grads.mapv(|g| g * g) * (1.0 - BETA2);

        let t = t as f64;
        let m_hat = self.m.mapv(|x| x / (1.0 - BETA1.powf(t)));
        let v_hat = self.v.mapv(|x| x / (1.0 - BETA2.powf(t)));

        let update = m_hat / v_hat.mapv(|x| x.sqrt() + EPS);
        *params = &*params - &(update * lr);
    }
}

/// Adam state for a bias vector.
#[derive(Debug, Clone)]
pub(super) struct AdamVecState {
    m: Array1<f64>,
    v: Array1<f64>,
}

impl AdamVecState {
    pub fn new(len: usize) -> Self {
        Self {
            m: Array1::zeros(len),
            v: Array1::zeros(len),
        }
    }

    pub fn step(&mut self, params: &mut Array1<f64>, grads: &Array1<f64>, lr: f64, t: usize) {
        const BETA1: f64 = 0.9;
        const BETA2: f64 = 0.999;
        const EPS: f64 = 1e-8;

        self.m = &self.m * BETA1 + grads * (1.0 - BETA1);
        self.v = &self.v * BETA2 + &grads.mapv(|g| g * g) * (1.0 - BETA2);

        let t = t as f64;
        let m_hat = self.m.mapv(|x| x / (1.0 - BETA1.powf(t)));
        let v_hat = self.v.mapv(|x| x / (1.0 - BETA2.powf(t)));

        let update = m_hat / v_hat.mapv(|x| x.sqrt() + EPS);
        *params = &*params - &(update * lr);
    }
}
