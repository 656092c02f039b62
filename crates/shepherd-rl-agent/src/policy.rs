//! Epsilon-greedy action selection

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use shepherd_rl_core::{argmax, ActionId, ObservationVector, QModel, RLError, Result};

/// Exploration probability used when none is configured
pub const DEFAULT_EPSILON: f64 = 0.10;

/// Outcome of one policy decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Uniform random pick among the valid actions
    Explore(ActionId),
    /// Model's highest-valued action
    Exploit(ActionId),
}

impl Selection {
    /// The chosen action
    #[must_use]
    pub fn action(self) -> ActionId {
        match self {
            Self::Explore(a) | Self::Exploit(a) => a,
        }
    }

    /// Whether the action came from the random branch
    #[must_use]
    pub fn is_exploration(self) -> bool {
        matches!(self, Self::Explore(_))
    }
}

/// Epsilon-greedy selector over a discrete action set.
///
/// The random branch only picks from the currently valid actions. The greedy
/// branch takes the argmax over the model's full output unless
/// `restrict_greedy_to_valid` is set, in which case it only considers valid
/// actions as well.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpsilonGreedy {
    /// Exploration rate
    pub epsilon: f64,
    /// Limit the greedy argmax to valid actions
    pub restrict_greedy_to_valid: bool,
}

impl Default for EpsilonGreedy {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            restrict_greedy_to_valid: false,
        }
    }
}

impl EpsilonGreedy {
    /// Create a policy with the given exploration rate
    #[must_use]
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon: epsilon.clamp(0.0, 1.0),
            restrict_greedy_to_valid: false,
        }
    }

    /// Toggle restricting the greedy branch to valid actions
    #[must_use]
    pub fn with_restricted_greedy(mut self, restrict: bool) -> Self {
        self.restrict_greedy_to_valid = restrict;
        self
    }

    /// Set the exploration rate
    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon.clamp(0.0, 1.0);
    }

    /// Pick an action for `state`.
    ///
    /// With no valid actions the random branch has nothing to draw from and
    /// the greedy branch is used instead.
    pub fn select<M, R>(
        &self,
        state: &ObservationVector,
        valid_actions: &[ActionId],
        model: &M,
        rng: &mut R,
    ) -> Result<Selection>
    where
        M: QModel + ?Sized,
        R: Rng + ?Sized,
    {
        if rng.gen::<f64>() < self.epsilon {
            if let Some(&action) = valid_actions.choose(rng) {
                return Ok(Selection::Explore(action));
            }
        }

        let values = model.predict(state)?;
        let best = if self.restrict_greedy_to_valid {
            let masked: Vec<f64> = (0..values.len())
                .map(|i| {
                    if valid_actions.contains(&ActionId(i)) {
                        values[i]
                    } else {
                        f64::NAN
                    }
                })
                .collect();
            argmax(&masked)
        } else {
            argmax(&values)
        };

        best.map(Selection::Exploit).ok_or_else(|| {
            RLError::Model(format!(
                "no selectable action among {} predicted values",
                values.len()
            ))
        })
    }
}
