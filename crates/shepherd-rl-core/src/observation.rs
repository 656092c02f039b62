//! Observation vectors produced by the environment

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Fixed-length numeric snapshot of environment state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationVector {
    /// The observation data
    pub data: Vec<f64>,
}

impl ObservationVector {
    /// Wrap raw features
    #[must_use]
    pub fn new(data: Vec<f64>) -> Self {
        Self { data }
    }

    /// All-zero observation of the given length
    #[must_use]
    pub fn zeros(len: usize) -> Self {
        Self {
            data: vec![0.0; len],
        }
    }

    /// Number of features
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the observation carries no features
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow as an ndarray view for model input
    #[must_use]
    pub fn view(&self) -> ArrayView1<'_, f64> {
        ArrayView1::from(&self.data[..])
    }
}

impl From<Vec<f64>> for ObservationVector {
    fn from(data: Vec<f64>) -> Self {
        Self { data }
    }
}
