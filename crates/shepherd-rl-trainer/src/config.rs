//! Trainer configuration: JSON file, defaults and command-line overrides

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use shepherd_rl_agent::{EpsilonGreedy, MlpConfig, ReplayMemory};
use shepherd_rl_core::{RLError, Result};
use shepherd_rl_env::{FarmMission, LifecycleTiming};

/// Q-network shape and step size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    /// Hidden layer widths; three layers as wide as the observation when absent
    pub hidden_dims: Option<Vec<usize>>,
    /// Gradient descent step size
    pub learning_rate: f64,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            hidden_dims: None,
            learning_rate: 0.01,
        }
    }
}

/// Pause lengths, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    /// Wait between failed mission starts
    pub retry_backoff_ms: u64,
    /// Wait between begin polls
    pub begin_poll_ms: u64,
    /// Rate-limiting pause before each step
    pub step_pause_ms: u64,
    /// Settle pause after each episode
    pub reset_pause_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            retry_backoff_ms: 2500,
            begin_poll_ms: 100,
            step_pause_ms: 10,
            reset_pause_ms: 500,
        }
    }
}

impl TimingSettings {
    /// Start-up timing for the mission lifecycle
    #[must_use]
    pub fn lifecycle(&self) -> LifecycleTiming {
        LifecycleTiming {
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
            begin_poll: Duration::from_millis(self.begin_poll_ms),
        }
    }

    /// Pause before each step
    #[must_use]
    pub fn step_pause(&self) -> Duration {
        Duration::from_millis(self.step_pause_ms)
    }

    /// Pause after each episode
    #[must_use]
    pub fn reset_pause(&self) -> Duration {
        Duration::from_millis(self.reset_pause_ms)
    }
}

/// Everything the training run is parameterised by
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Episodes to run
    pub num_repeats: usize,
    /// Start attempts per episode before giving up
    pub max_retries: usize,
    /// Exploration probability
    pub epsilon: f64,
    /// Restrict the greedy branch to valid actions
    pub restrict_greedy_to_valid: bool,
    /// Replay memory capacity
    pub memory_capacity: usize,
    /// Transitions sampled per training step
    pub data_size: usize,
    /// Discount for bootstrapped targets
    pub discount: f64,
    /// Passes over each sampled batch
    pub epochs: usize,
    /// Minibatch size inside `fit`
    pub fit_batch_size: usize,
    /// Where the trained model is written
    pub model_path: PathBuf,
    /// Farm scenario file
    pub mission_file: PathBuf,
    /// Network settings
    pub network: NetworkSettings,
    /// Pause lengths
    pub timing: TimingSettings,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            num_repeats: 100,
            max_retries: 5,
            epsilon: 0.10,
            restrict_greedy_to_valid: false,
            memory_capacity: 1000,
            data_size: 50,
            discount: 0.95,
            epochs: 8,
            fit_batch_size: 16,
            model_path: PathBuf::from("model.json"),
            mission_file: PathBuf::from("farm.json"),
            network: NetworkSettings::default(),
            timing: TimingSettings::default(),
        }
    }
}

impl TrainerConfig {
    /// Read a JSON configuration; missing fields take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        Ok(config)
    }

    /// Reject settings the loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(RLError::Config(format!(
                "epsilon must be within [0, 1], got {}",
                self.epsilon
            )));
        }
        if !(0.0..=1.0).contains(&self.discount) {
            return Err(RLError::Config(format!(
                "discount must be within [0, 1], got {}",
                self.discount
            )));
        }
        for (name, value) in [
            ("max_retries", self.max_retries),
            ("memory_capacity", self.memory_capacity),
            ("data_size", self.data_size),
            ("epochs", self.epochs),
            ("fit_batch_size", self.fit_batch_size),
        ] {
            if value == 0 {
                return Err(RLError::Config(format!("{name} must be positive")));
            }
        }
        if self.network.learning_rate <= 0.0 {
            return Err(RLError::Config("learning_rate must be positive".into()));
        }
        Ok(())
    }

    /// Exploration policy
    #[must_use]
    pub fn policy(&self) -> EpsilonGreedy {
        EpsilonGreedy::new(self.epsilon).with_restricted_greedy(self.restrict_greedy_to_valid)
    }

    /// Empty replay memory
    #[must_use]
    pub fn memory(&self) -> ReplayMemory {
        ReplayMemory::new(self.memory_capacity, self.discount)
    }

    /// Network layout for the given observation and action sizes
    #[must_use]
    pub fn network_config(&self, input_dim: usize, output_dim: usize) -> MlpConfig {
        let mut config = MlpConfig::for_observation(input_dim, output_dim);
        if let Some(hidden) = &self.network.hidden_dims {
            config.hidden_dims = hidden.clone();
        }
        config.learning_rate = self.network.learning_rate;
        config
    }

    /// Load the farm scenario, falling back to the built-in one when the file is absent
    pub fn load_mission(&self) -> Result<FarmMission> {
        if !self.mission_file.exists() {
            info!(
                path = %self.mission_file.display(),
                "mission file not found, using built-in farm"
            );
            return Ok(FarmMission::default());
        }
        let json = std::fs::read_to_string(&self.mission_file)?;
        let mission: FarmMission = serde_json::from_str(&json)?;
        mission.validate()?;
        Ok(mission)
    }
}

/// Command-line interface of `shepherd-train`
#[derive(Debug, Parser)]
#[command(name = "shepherd-train")]
#[command(about = "Train a sheep-herding agent with experience replay", version)]
pub struct Cli {
    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of episodes
    #[arg(short, long)]
    pub repeats: Option<usize>,

    /// Exploration probability
    #[arg(short, long)]
    pub epsilon: Option<f64>,

    /// Where to write the trained model
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Farm scenario file
    #[arg(short, long)]
    pub mission: Option<PathBuf>,

    /// Load model weights from this file before training
    #[arg(long)]
    pub resume: Option<PathBuf>,

    /// Seed for the simulator and the policy
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Cli {
    /// Build the effective configuration: file, then flags, then validation
    pub fn load_config(&self) -> Result<TrainerConfig> {
        let mut config = match &self.config {
            Some(path) => TrainerConfig::from_file(path)?,
            None => TrainerConfig::default(),
        };
        if let Some(repeats) = self.repeats {
            config.num_repeats = repeats;
        }
        if let Some(epsilon) = self.epsilon {
            config.epsilon = epsilon;
        }
        if let Some(output) = &self.output {
            config.model_path = output.clone();
        }
        if let Some(mission) = &self.mission {
            config.mission_file = mission.clone();
        }
        config.validate()?;
        Ok(config)
    }
}
