//! Multilayer perceptron Q-network
//!
//! Pure ndarray implementation: dense hidden layers with a leaky rectifier,
//! a linear output layer with one unit per action, trained by minibatch
//! gradient descent on mean squared error.

use async_trait::async_trait;
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use shepherd_rl_core::{ObservationVector, QModel, RLError, Result};

/// MLP configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlpConfig {
    /// Input dimension (observation length)
    pub input_dim: usize,
    /// Hidden layer sizes
    pub hidden_dims: Vec<usize>,
    /// Output dimension (action count)
    pub output_dim: usize,
    /// Gradient descent step size
    pub learning_rate: f64,
    /// Slope of the rectifier for negative inputs
    pub negative_slope: f64,
}

impl MlpConfig {
    /// Three hidden layers as wide as the input, as used for the farm task
    #[must_use]
    pub fn for_observation(input_dim: usize, output_dim: usize) -> Self {
        Self {
            input_dim,
            hidden_dims: vec![input_dim; 3],
            output_dim,
            learning_rate: 0.01,
            negative_slope: 0.01,
        }
    }

    fn layer_dims(&self) -> Vec<usize> {
        let mut dims = Vec::with_capacity(self.hidden_dims.len() + 2);
        dims.push(self.input_dim);
        dims.extend_from_slice(&self.hidden_dims);
        dims.push(self.output_dim);
        dims
    }
}

/// On-disk form of a network
#[derive(Serialize, Deserialize)]
struct SavedNetwork {
    config: MlpConfig,
    weights: Vec<Array2<f64>>,
    biases: Vec<Array1<f64>>,
}

/// Dense feed-forward Q-network
#[derive(Debug, Clone)]
pub struct MlpQNetwork {
    config: MlpConfig,
    /// Weights for each layer, `in x out`
    weights: Vec<Array2<f64>>,
    /// Biases for each layer
    biases: Vec<Array1<f64>>,
}

/// Per-layer parameter gradients
struct Gradients {
    weights: Vec<Array2<f64>>,
    biases: Vec<Array1<f64>>,
}

impl MlpQNetwork {
    /// Create a network with He-initialized weights
    pub fn new(config: MlpConfig) -> Result<Self> {
        if config.input_dim == 0 || config.output_dim == 0 || config.hidden_dims.contains(&0) {
            return Err(RLError::Config(format!(
                "network layers must be non-empty, got {:?}",
                config.layer_dims()
            )));
        }

        let mut rng = rand::thread_rng();
        let dims = config.layer_dims();
        let mut weights = Vec::with_capacity(dims.len() - 1);
        let mut biases = Vec::with_capacity(dims.len() - 1);
        for pair in dims.windows(2) {
            let (fan_in, fan_out) = (pair[0], pair[1]);
            let std = (2.0 / fan_in as f64).sqrt();
            let normal = Normal::new(0.0, std).map_err(|e| RLError::Model(e.to_string()))?;
            weights.push(Array2::from_shape_fn((fan_in, fan_out), |_| {
                normal.sample(&mut rng)
            }));
            biases.push(Array1::zeros(fan_out));
        }

        Ok(Self {
            config,
            weights,
            biases,
        })
    }

    /// Network configuration
    #[must_use]
    pub fn config(&self) -> &MlpConfig {
        &self.config
    }

    fn activate(&self, z: &Array2<f64>) -> Array2<f64> {
        let slope = self.config.negative_slope;
        z.mapv(|v| if v > 0.0 { v } else { slope * v })
    }

    fn activation_grad(&self, z: &Array2<f64>) -> Array2<f64> {
        let slope = self.config.negative_slope;
        z.mapv(|v| if v > 0.0 { 1.0 } else { slope })
    }

    /// Forward pass keeping pre-activations and activations for backprop.
    ///
    /// `activations[0]` is the input; `pre[l]` is layer `l`'s affine output.
    fn forward_trace(&self, inputs: &Array2<f64>) -> (Vec<Array2<f64>>, Vec<Array2<f64>>) {
        let last = self.weights.len() - 1;
        let mut pre = Vec::with_capacity(self.weights.len());
        let mut activations = Vec::with_capacity(self.weights.len() + 1);
        activations.push(inputs.clone());

        for (l, (w, b)) in self.weights.iter().zip(&self.biases).enumerate() {
            let z = activations[l].dot(w) + b;
            let a = if l == last { z.clone() } else { self.activate(&z) };
            pre.push(z);
            activations.push(a);
        }

        (pre, activations)
    }

    fn forward(&self, inputs: &Array2<f64>) -> Array2<f64> {
        let (_, mut activations) = self.forward_trace(inputs);
        activations.pop().unwrap_or_else(|| inputs.clone())
    }

    /// Loss and gradients of the mean squared error over every output
    fn gradients(&self, inputs: &Array2<f64>, targets: &Array2<f64>) -> (f64, Gradients) {
        let (pre, activations) = self.forward_trace(inputs);
        let outputs = &activations[activations.len() - 1];
        let diff = outputs - targets;
        let count = diff.len() as f64;
        let loss = diff.mapv(|d| d * d).sum() / count;

        let layers = self.weights.len();
        let mut weight_grads = vec![Array2::zeros((0, 0)); layers];
        let mut bias_grads = vec![Array1::zeros(0); layers];
        let mut delta = diff * (2.0 / count);

        for l in (0..layers).rev() {
            weight_grads[l] = activations[l].t().dot(&delta);
            bias_grads[l] = delta.sum_axis(Axis(0));
            if l > 0 {
                delta = delta.dot(&self.weights[l].t()) * self.activation_grad(&pre[l - 1]);
            }
        }

        (
            loss,
            Gradients {
                weights: weight_grads,
                biases: bias_grads,
            },
        )
    }

    fn apply(&mut self, grads: &Gradients) {
        let lr = self.config.learning_rate;
        for (w, g) in self.weights.iter_mut().zip(&grads.weights) {
            w.scaled_add(-lr, g);
        }
        for (b, g) in self.biases.iter_mut().zip(&grads.biases) {
            b.scaled_add(-lr, g);
        }
    }

    fn check_batch(&self, inputs: &Array2<f64>, targets: &Array2<f64>) -> Result<()> {
        if inputs.ncols() != self.config.input_dim {
            return Err(RLError::DimensionMismatch {
                expected: self.config.input_dim,
                actual: inputs.ncols(),
            });
        }
        if targets.ncols() != self.config.output_dim {
            return Err(RLError::DimensionMismatch {
                expected: self.config.output_dim,
                actual: targets.ncols(),
            });
        }
        if inputs.nrows() != targets.nrows() {
            return Err(RLError::DimensionMismatch {
                expected: inputs.nrows(),
                actual: targets.nrows(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl QModel for MlpQNetwork {
    fn input_len(&self) -> usize {
        self.config.input_dim
    }

    fn num_actions(&self) -> usize {
        self.config.output_dim
    }

    fn predict(&self, state: &ObservationVector) -> Result<Vec<f64>> {
        if state.len() != self.config.input_dim {
            return Err(RLError::DimensionMismatch {
                expected: self.config.input_dim,
                actual: state.len(),
            });
        }
        let input = state.view().insert_axis(Axis(0)).to_owned();
        Ok(self.forward(&input).row(0).to_vec())
    }

    fn fit(
        &mut self,
        inputs: &Array2<f64>,
        targets: &Array2<f64>,
        epochs: usize,
        batch_size: usize,
    ) -> Result<()> {
        self.check_batch(inputs, targets)?;
        if batch_size == 0 {
            return Err(RLError::Model("batch size must be positive".into()));
        }
        if inputs.nrows() == 0 {
            return Ok(());
        }

        let mut rng = rand::thread_rng();
        let mut order: Vec<usize> = (0..inputs.nrows()).collect();
        for epoch in 0..epochs {
            order.shuffle(&mut rng);
            let mut epoch_loss = 0.0;
            for chunk in order.chunks(batch_size) {
                let x = inputs.select(Axis(0), chunk);
                let t = targets.select(Axis(0), chunk);
                let (loss, grads) = self.gradients(&x, &t);
                if !loss.is_finite() {
                    return Err(RLError::Model(format!(
                        "training diverged at epoch {epoch} (loss {loss})"
                    )));
                }
                self.apply(&grads);
                epoch_loss += loss * chunk.len() as f64;
            }
            debug!(epoch, loss = epoch_loss / inputs.nrows() as f64, "fit epoch");
        }

        Ok(())
    }

    fn evaluate(&self, inputs: &Array2<f64>, targets: &Array2<f64>) -> Result<f64> {
        self.check_batch(inputs, targets)?;
        if inputs.nrows() == 0 {
            return Err(RLError::InsufficientData);
        }
        let diff = self.forward(inputs) - targets;
        Ok(diff.mapv(|d| d * d).sum() / diff.len() as f64)
    }

    async fn save(&self, path: &Path) -> Result<()> {
        let saved = SavedNetwork {
            config: self.config.clone(),
            weights: self.weights.clone(),
            biases: self.biases.clone(),
        };
        let json = serde_json::to_string(&saved)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    async fn load(&mut self, path: &Path) -> Result<()> {
        let json = tokio::fs::read_to_string(path).await?;
        let saved: SavedNetwork = serde_json::from_str(&json)?;

        if saved.config.input_dim != self.config.input_dim {
            return Err(RLError::DimensionMismatch {
                expected: self.config.input_dim,
                actual: saved.config.input_dim,
            });
        }
        if saved.config.output_dim != self.config.output_dim {
            return Err(RLError::DimensionMismatch {
                expected: self.config.output_dim,
                actual: saved.config.output_dim,
            });
        }
        let dims = saved.config.layer_dims();
        let consistent = saved.weights.len() == dims.len() - 1
            && saved.biases.len() == dims.len() - 1
            && saved
                .weights
                .iter()
                .zip(dims.windows(2))
                .all(|(w, pair)| w.dim() == (pair[0], pair[1]));
        if !consistent {
            return Err(RLError::Model(format!(
                "saved weights do not match layers {dims:?}"
            )));
        }

        self.config = saved.config;
        self.weights = saved.weights;
        self.biases = saved.biases;
        Ok(())
    }
}
