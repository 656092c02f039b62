//! Experience replay memory

use ndarray::Array2;
use rand::Rng;
use std::collections::VecDeque;

use shepherd_rl_core::{QModel, RLError, Result, Transition};

/// Discount applied to the bootstrapped next-state value
pub const DEFAULT_DISCOUNT: f64 = 0.95;

/// Inputs and bootstrapped targets for one training step
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingBatch {
    /// One previous-state observation per row
    pub inputs: Array2<f64>,
    /// One row of per-action target values per input
    pub targets: Array2<f64>,
}

impl TrainingBatch {
    /// Number of rows in the batch
    #[must_use]
    pub fn len(&self) -> usize {
        self.inputs.nrows()
    }

    /// Whether the batch has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inputs.nrows() == 0
    }
}

/// Fixed-capacity transition store with FIFO eviction.
///
/// Lives for the whole run and is shared by every episode. It has a single
/// writer; `remember` is the only mutator.
#[derive(Debug, Clone)]
pub struct ReplayMemory {
    /// Buffer storage, oldest first
    buffer: VecDeque<Transition>,
    /// Maximum capacity
    capacity: usize,
    /// Discount for the one-step bootstrap
    discount: f64,
}

impl ReplayMemory {
    /// Create an empty memory holding at most `capacity` transitions
    #[must_use]
    pub fn new(capacity: usize, discount: f64) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
            discount,
        }
    }

    /// Append a transition, evicting the oldest ones beyond capacity
    pub fn remember(&mut self, transition: Transition) {
        self.buffer.push_back(transition);
        while self.buffer.len() > self.capacity {
            self.buffer.pop_front();
        }
    }

    /// Draw `min(size, len)` distinct transitions uniformly at random
    pub fn sample<R>(&self, size: usize, rng: &mut R) -> Result<Vec<&Transition>>
    where
        R: Rng + ?Sized,
    {
        if self.buffer.is_empty() {
            return Err(RLError::InsufficientData);
        }

        let amount = size.min(self.buffer.len());
        let batch = rand::seq::index::sample(rng, self.buffer.len(), amount)
            .into_iter()
            .map(|i| &self.buffer[i])
            .collect();

        Ok(batch)
    }

    /// Sample transitions and turn them into model inputs and targets.
    ///
    /// Each target row starts from the model's current estimate for the
    /// previous state; the taken action's entry is replaced by the reward,
    /// plus the discounted best next-state value unless the step was terminal.
    pub fn training_batch<M, R>(&self, model: &M, size: usize, rng: &mut R) -> Result<TrainingBatch>
    where
        M: QModel + ?Sized,
        R: Rng + ?Sized,
    {
        let sampled = self.sample(size, rng)?;
        let input_len = model.input_len();
        let num_actions = model.num_actions();

        let mut inputs = Array2::zeros((sampled.len(), input_len));
        let mut targets = Array2::zeros((sampled.len(), num_actions));

        for (row, transition) in sampled.into_iter().enumerate() {
            if transition.previous_state.len() != input_len {
                return Err(RLError::DimensionMismatch {
                    expected: input_len,
                    actual: transition.previous_state.len(),
                });
            }
            let action = transition.action.index();
            if action >= num_actions {
                return Err(RLError::InvalidAction(transition.action));
            }

            let mut target = model.predict(&transition.previous_state)?;
            if target.len() != num_actions {
                return Err(RLError::DimensionMismatch {
                    expected: num_actions,
                    actual: target.len(),
                });
            }

            target[action] = if transition.terminal {
                transition.reward
            } else {
                let next_values = model.predict(&transition.next_state)?;
                let best_next = next_values
                    .iter()
                    .copied()
                    .fold(f64::NEG_INFINITY, f64::max);
                transition.reward + self.discount * best_next
            };

            inputs
                .row_mut(row)
                .assign(&transition.previous_state.view());
            targets.row_mut(row).assign(&ndarray::Array1::from(target));
        }

        Ok(TrainingBatch { inputs, targets })
    }

    /// Stored transitions, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buffer.iter()
    }

    /// Get the current size of the memory
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if memory is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Maximum number of transitions kept
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
