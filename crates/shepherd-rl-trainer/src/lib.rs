//! Training orchestration for the shepherd agent
//!
//! [`TrainingOrchestrator`] runs repeated missions, acting with an
//! epsilon-greedy policy, recording every step into a shared replay memory and
//! fitting the Q-model on a sampled batch after each step. [`TrainerConfig`]
//! and [`Cli`] build its settings from a JSON file and command-line flags.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod orchestrator;
pub mod report;

pub use config::{Cli, NetworkSettings, TimingSettings, TrainerConfig};
pub use orchestrator::{fatal_exit_code, TrainingOrchestrator, END_EPISODE_COMMAND};
pub use report::{EpisodeSummary, TrainingReport};
