//! Learning components of the shepherd training loop
//!
//! - [`ReplayMemory`]: bounded FIFO experience store and training-batch builder
//! - [`EpsilonGreedy`]: exploration policy over a discrete action set
//! - [`MlpQNetwork`]: small multilayer perceptron implementing [`QModel`]
//!
//! [`QModel`]: shepherd_rl_core::QModel

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod buffer;
pub mod network;
pub mod policy;

pub use buffer::{ReplayMemory, TrainingBatch, DEFAULT_DISCOUNT};
pub use network::{MlpConfig, MlpQNetwork};
pub use policy::{EpsilonGreedy, Selection, DEFAULT_EPSILON};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{EpsilonGreedy, MlpConfig, MlpQNetwork, ReplayMemory, Selection};
    pub use shepherd_rl_core::prelude::*;
}
