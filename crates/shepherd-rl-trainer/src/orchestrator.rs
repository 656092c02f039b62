//! Episode loop: act, observe, remember, train

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use shepherd_rl_agent::{EpsilonGreedy, ReplayMemory};
use shepherd_rl_core::{
    Clock, Episode, EpisodeOutcome, MissionHost, MissionSpec, QModel, RLError, Result, Transition,
    World,
};
use shepherd_rl_env::{ActionTable, CoordinateCorrector, MissionLifecycle};

use crate::config::TrainerConfig;
use crate::report::{EpisodeSummary, TrainingReport};

/// Command that ends an episode on the host
pub const END_EPISODE_COMMAND: &str = "quit";

/// Loop parameters taken from the trainer configuration
#[derive(Debug, Clone, PartialEq)]
struct LoopSettings {
    num_repeats: usize,
    data_size: usize,
    epochs: usize,
    fit_batch_size: usize,
    step_pause: Duration,
    reset_pause: Duration,
    model_path: PathBuf,
}

/// Drives repeated episodes against a mission host and trains the model
/// online from replayed experience.
///
/// Single-threaded: the replay memory has exactly one writer and persists
/// across every episode of the run.
pub struct TrainingOrchestrator<H, W, M, C> {
    host: H,
    world: W,
    model: M,
    clock: C,
    rng: StdRng,
    memory: ReplayMemory,
    policy: EpsilonGreedy,
    actions: ActionTable,
    lifecycle: MissionLifecycle<C>,
    corrector: CoordinateCorrector,
    mission: MissionSpec,
    settings: LoopSettings,
}

impl<H, W, M, C> TrainingOrchestrator<H, W, M, C>
where
    H: MissionHost,
    W: World,
    M: QModel,
    C: Clock + Clone,
{
    /// Wire the collaborators together.
    ///
    /// Fails when the world, the model and the action table disagree on
    /// observation length or action count.
    pub fn new(
        host: H,
        world: W,
        model: M,
        clock: C,
        config: &TrainerConfig,
        actions: ActionTable,
        mission: MissionSpec,
    ) -> Result<Self> {
        config.validate()?;
        if world.observation_len() != model.input_len() {
            return Err(RLError::DimensionMismatch {
                expected: model.input_len(),
                actual: world.observation_len(),
            });
        }
        for actual in [world.num_actions(), actions.len()] {
            if actual != model.num_actions() {
                return Err(RLError::DimensionMismatch {
                    expected: model.num_actions(),
                    actual,
                });
            }
        }

        Ok(Self {
            host,
            world,
            model,
            lifecycle: MissionLifecycle::new(
                clock.clone(),
                config.max_retries,
                config.timing.lifecycle(),
            ),
            clock,
            rng: StdRng::from_entropy(),
            memory: config.memory(),
            policy: config.policy(),
            actions,
            corrector: CoordinateCorrector::default(),
            mission,
            settings: LoopSettings {
                num_repeats: config.num_repeats,
                data_size: config.data_size,
                epochs: config.epochs,
                fit_batch_size: config.fit_batch_size,
                step_pause: config.timing.step_pause(),
                reset_pause: config.timing.reset_pause(),
                model_path: config.model_path.clone(),
            },
        })
    }

    /// Fix the seed used for exploration and batch sampling
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Replay memory shared by all episodes
    pub fn memory(&self) -> &ReplayMemory {
        &self.memory
    }

    /// Mission host
    pub fn host(&self) -> &H {
        &self.host
    }

    /// World
    pub fn world(&self) -> &W {
        &self.world
    }

    /// Model being trained
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Run every repeat, then save the model.
    ///
    /// Exhausting the mission start retries aborts the run with a fatal
    /// [`RLError::MissionStart`]; the model is not saved in that case.
    pub async fn run(&mut self) -> Result<TrainingReport> {
        let mut report = TrainingReport::default();

        for repeat in 0..self.settings.num_repeats {
            info!(repeat = repeat + 1, of = self.settings.num_repeats, "Repeat");
            let summary = self.run_episode(repeat).await?;
            report.episodes.push(summary);
            self.clock.sleep(self.settings.reset_pause).await;
        }

        self.model.save(&self.settings.model_path).await?;
        info!(path = %self.settings.model_path.display(), "model saved");
        Ok(report)
    }

    async fn run_episode(&mut self, repeat: usize) -> Result<EpisodeSummary> {
        let mut episode = Episode::begin(repeat);
        let mut state = self.world.reset();

        let mut attempt = self.lifecycle.start(&mut self.host, &self.mission).await?;
        let mut world_state = self
            .lifecycle
            .await_begun(&mut self.host, &mut attempt)
            .await?;

        let mut outcome = EpisodeOutcome::Ended;
        while MissionLifecycle::<C>::is_running(&world_state) {
            self.clock.sleep(self.settings.step_pause).await;

            let valid = self.world.valid_actions();
            let selection = self
                .policy
                .select(&state, &valid, &self.model, &mut self.rng)?;
            let action = selection.action();
            if selection.is_exploration() {
                info!(action = self.actions.label(action), "Random action");
            }

            self.actions
                .execute(action, &world_state, &mut self.host)
                .await?;
            world_state = self.host.world_state().await?;
            for message in &world_state.errors {
                warn!(error = %message, "host reported error");
            }

            let update = self
                .world
                .update_state(&world_state, action, &mut self.host)
                .await?;
            self.corrector
                .correct(
                    self.world.position(),
                    &mut self.host,
                    self.actions.heading(action),
                )
                .await?;

            let next_state = update.observation;
            let previous_state = std::mem::replace(&mut state, next_state.clone());
            self.memory.remember(Transition::new(
                previous_state,
                action,
                update.reward,
                next_state,
                update.status,
            ));

            let loss = self.train_step()?;
            episode.record_step(update.reward, loss);
            debug!(
                step = episode.steps,
                action = self.actions.label(action),
                reward = update.reward,
                status = ?update.status,
                loss,
                "step"
            );

            if MissionLifecycle::<C>::is_terminal(update.status, &world_state) {
                if let Some(terminal) = EpisodeOutcome::from_status(update.status) {
                    self.host.send_command(END_EPISODE_COMMAND).await?;
                    attempt.conclude(update.status);
                    outcome = terminal;
                }
                break;
            }
        }

        episode.finish(outcome);
        info!(
            repeat = repeat + 1,
            steps = episode.steps,
            reward = episode.total_reward,
            outcome = ?outcome,
            attempts = attempt.attempts,
            "episode finished"
        );
        Ok(episode.into())
    }

    /// Fit on a freshly sampled batch and report the loss on it.
    ///
    /// Skipped while the memory is empty.
    fn train_step(&mut self) -> Result<Option<f64>> {
        if self.memory.is_empty() {
            return Ok(None);
        }
        let batch = self
            .memory
            .training_batch(&self.model, self.settings.data_size, &mut self.rng)?;
        self.model.fit(
            &batch.inputs,
            &batch.targets,
            self.settings.epochs,
            self.settings.fit_batch_size,
        )?;
        self.model.evaluate(&batch.inputs, &batch.targets).map(Some)
    }
}

/// Process exit status for a run that failed with `error`, if the failure
/// must end the process rather than propagate.
#[must_use]
pub fn fatal_exit_code(error: &RLError) -> Option<i32> {
    error.is_fatal().then_some(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_mission_start_exhaustion_maps_to_exit_code() {
        let fatal = RLError::MissionStart {
            attempts: 5,
            message: "busy".into(),
        };
        assert_eq!(fatal_exit_code(&fatal), Some(1));
        assert_eq!(fatal_exit_code(&RLError::InsufficientData), None);
    }
}
