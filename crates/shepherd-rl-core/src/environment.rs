//! Environment collaborator contracts

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{ActionId, GameStatus, MissionSpec, ObservationVector, Position, Reward, WorldState};

/// Agent-side handle to an external, stateful mission host.
///
/// Every call is a synchronous round-trip from the loop's point of view.
#[async_trait]
pub trait MissionHost: Send + Sync {
    /// Ask the host to start a mission. Any error is treated as transient.
    async fn start_mission(&mut self, spec: &MissionSpec) -> crate::Result<()>;

    /// Poll the current world state
    async fn world_state(&mut self) -> crate::Result<WorldState>;

    /// Issue a raw command. Fire-and-forget: no acknowledgement.
    async fn send_command(&mut self, command: &str) -> crate::Result<()>;
}

/// Result of interpreting one world-state snapshot after an action
#[derive(Debug, Clone, PartialEq)]
pub struct StepUpdate {
    /// Observation after the action
    pub observation: ObservationVector,
    /// Reward signal
    pub reward: Reward,
    /// Running, won or lost
    pub status: GameStatus,
}

/// Agent-side model of the task: encodes world states into observations and
/// scores them.
#[async_trait]
pub trait World: Send + Sync {
    /// Length of every observation this world produces
    fn observation_len(&self) -> usize;

    /// Size of the full action space
    fn num_actions(&self) -> usize;

    /// Reset per-episode bookkeeping and return the initial observation
    fn reset(&mut self) -> ObservationVector;

    /// Current observation
    fn observe(&self) -> ObservationVector;

    /// Actions allowed in the current state
    fn valid_actions(&self) -> Vec<ActionId>;

    /// Agent position as last observed
    fn position(&self) -> Position;

    /// Fold a fresh world state into the world and score the step
    async fn update_state(
        &mut self,
        world_state: &WorldState,
        action: ActionId,
        host: &mut dyn MissionHost,
    ) -> crate::Result<StepUpdate>;
}

/// How an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EpisodeOutcome {
    /// Terminal win status
    Won,
    /// Terminal lose status
    Lost,
    /// Host stopped running without a terminal status
    Ended,
}

/// Episode information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    /// Episode ID
    pub id: String,
    /// Zero-based repeat index
    pub repeat: usize,
    /// Total reward
    pub total_reward: f64,
    /// Number of steps
    pub steps: usize,
    /// Outcome, once finished
    pub outcome: Option<EpisodeOutcome>,
    /// Loss evaluated on the last training batch
    pub last_loss: Option<f64>,
    /// Start time
    pub start_time: chrono::DateTime<chrono::Utc>,
    /// End time
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
}

impl Episode {
    /// Open a new episode record
    #[must_use]
    pub fn begin(repeat: usize) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            repeat,
            total_reward: 0.0,
            steps: 0,
            outcome: None,
            last_loss: None,
            start_time: chrono::Utc::now(),
            end_time: None,
        }
    }

    /// Account for one step
    pub fn record_step(&mut self, reward: f64, loss: Option<f64>) {
        self.steps += 1;
        self.total_reward += reward;
        if loss.is_some() {
            self.last_loss = loss;
        }
    }

    /// Close the record
    pub fn finish(&mut self, outcome: EpisodeOutcome) {
        self.outcome = Some(outcome);
        self.end_time = Some(chrono::Utc::now());
    }
}

impl EpisodeOutcome {
    /// Outcome implied by a terminal status; `None` while running
    #[must_use]
    pub fn from_status(status: GameStatus) -> Option<Self> {
        match status {
            GameStatus::Win => Some(Self::Won),
            GameStatus::Lose => Some(Self::Lost),
            GameStatus::Running => None,
        }
    }
}
