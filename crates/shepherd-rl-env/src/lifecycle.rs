//! Mission start-up with bounded retries

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, warn};

use shepherd_rl_core::{Clock, GameStatus, MissionHost, MissionSpec, RLError, Result, WorldState};

/// Mission progress, `NotStarted → Starting → Begun → Running → {Won, Lost, Failed}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    /// No start attempted yet
    NotStarted,
    /// Start accepted, waiting for the host to begin
    Starting,
    /// Host reports the mission has begun
    Begun,
    /// Host reports the mission is running
    Running,
    /// Ended with a win
    Won,
    /// Ended with a loss
    Lost,
    /// Start retries exhausted
    Failed,
}

impl MissionStatus {
    /// Whether no further transitions are possible
    #[must_use]
    pub fn is_final(self) -> bool {
        matches!(self, Self::Won | Self::Lost | Self::Failed)
    }
}

/// Per-episode start-up bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionAttempt {
    /// Start calls made
    pub attempts: usize,
    /// Current status
    pub status: MissionStatus,
    /// Errors reported by the host while starting
    pub errors: Vec<String>,
}

impl Default for MissionAttempt {
    fn default() -> Self {
        Self {
            attempts: 0,
            status: MissionStatus::NotStarted,
            errors: Vec::new(),
        }
    }
}

impl MissionAttempt {
    /// Move to `Won` or `Lost` for a terminal game status
    pub fn conclude(&mut self, status: GameStatus) {
        match status {
            GameStatus::Win => self.status = MissionStatus::Won,
            GameStatus::Lose => self.status = MissionStatus::Lost,
            GameStatus::Running => {}
        }
    }
}

/// Pause lengths used while starting a mission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleTiming {
    /// Wait between failed start attempts
    pub retry_backoff: Duration,
    /// Wait between begin polls
    pub begin_poll: Duration,
}

impl Default for LifecycleTiming {
    fn default() -> Self {
        Self {
            retry_backoff: Duration::from_millis(2500),
            begin_poll: Duration::from_millis(100),
        }
    }
}

/// Starts missions and waits for them to begin.
///
/// Start failures are absorbed here up to the retry budget. Running out of
/// retries is fatal for the whole process.
pub struct MissionLifecycle<C> {
    clock: C,
    max_retries: usize,
    timing: LifecycleTiming,
}

impl<C: Clock> MissionLifecycle<C> {
    /// Create a lifecycle allowing `max_retries` start attempts
    pub fn new(clock: C, max_retries: usize, timing: LifecycleTiming) -> Self {
        Self {
            clock,
            max_retries: max_retries.max(1),
            timing,
        }
    }

    /// Start the mission, retrying with a fixed backoff.
    ///
    /// Fails with [`RLError::MissionStart`] after `max_retries` consecutive
    /// failures; no backoff follows the final attempt.
    pub async fn start(
        &self,
        host: &mut dyn MissionHost,
        spec: &MissionSpec,
    ) -> Result<MissionAttempt> {
        let mut attempt = MissionAttempt::default();

        loop {
            attempt.attempts += 1;
            attempt.status = MissionStatus::Starting;
            match host.start_mission(spec).await {
                Ok(()) => {
                    info!(mission = %spec.name, attempts = attempt.attempts, "mission started");
                    return Ok(attempt);
                }
                Err(e) if attempt.attempts >= self.max_retries => {
                    attempt.status = MissionStatus::Failed;
                    error!(attempts = attempt.attempts, error = %e, "Error starting mission");
                    return Err(RLError::MissionStart {
                        attempts: attempt.attempts,
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    warn!(attempt = attempt.attempts, error = %e, "mission start failed, retrying");
                    attempt.errors.push(e.to_string());
                    self.clock.sleep(self.timing.retry_backoff).await;
                }
            }
        }
    }

    /// Poll until the host reports the mission has begun.
    ///
    /// Errors reported in the world state are logged and kept on the attempt;
    /// they never abort start-up.
    pub async fn await_begun(
        &self,
        host: &mut dyn MissionHost,
        attempt: &mut MissionAttempt,
    ) -> Result<WorldState> {
        info!("Waiting for the mission to start");
        let mut world_state = host.world_state().await?;
        Self::surface_errors(&world_state, attempt);

        while !world_state.has_mission_begun {
            self.clock.sleep(self.timing.begin_poll).await;
            world_state = host.world_state().await?;
            Self::surface_errors(&world_state, attempt);
        }

        attempt.status = if Self::is_running(&world_state) {
            MissionStatus::Running
        } else {
            MissionStatus::Begun
        };
        Ok(world_state)
    }

    fn surface_errors(world_state: &WorldState, attempt: &mut MissionAttempt) {
        for message in &world_state.errors {
            warn!(error = %message, "host reported error");
            attempt.errors.push(message.clone());
        }
    }

    /// Whether the host reports the mission as running
    #[must_use]
    pub fn is_running(world_state: &WorldState) -> bool {
        world_state.is_mission_running
    }

    /// Whether the episode is over: a win or loss, or the host stopped running
    #[must_use]
    pub fn is_terminal(status: GameStatus, world_state: &WorldState) -> bool {
        status.is_terminal() || !Self::is_running(world_state)
    }
}
