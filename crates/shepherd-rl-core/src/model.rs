//! Value-model contract consumed by the training loop

use async_trait::async_trait;
use ndarray::Array2;
use std::path::Path;

use crate::ObservationVector;

/// Action-value model: one estimate per action in the full action space.
///
/// Inputs are row-major batches with one observation per row; targets carry
/// one row of per-action values per input.
#[async_trait]
pub trait QModel: Send + Sync {
    /// Length of observations the model accepts
    fn input_len(&self) -> usize;

    /// Size of the action space the model scores
    fn num_actions(&self) -> usize;

    /// Value estimate for every action
    fn predict(&self, state: &ObservationVector) -> crate::Result<Vec<f64>>;

    /// Train on a batch for `epochs` passes in minibatches of `batch_size`
    fn fit(
        &mut self,
        inputs: &Array2<f64>,
        targets: &Array2<f64>,
        epochs: usize,
        batch_size: usize,
    ) -> crate::Result<()>;

    /// Mean squared error on a batch
    fn evaluate(&self, inputs: &Array2<f64>, targets: &Array2<f64>) -> crate::Result<f64>;

    /// Persist learned parameters
    async fn save(&self, path: &Path) -> crate::Result<()>;

    /// Restore learned parameters
    async fn load(&mut self, path: &Path) -> crate::Result<()>;
}
