//! Scripted collaborators for driving the orchestrator without a simulator

#![allow(dead_code)]

use async_trait::async_trait;
use ndarray::Array2;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use shepherd_rl_core::{
    ActionId, GameStatus, MissionHost, MissionSpec, ObservationVector, Position, QModel, RLError,
    Result, StepUpdate, World, WorldState,
};
use shepherd_rl_env::{ActionCommand, ActionTable, Heading};
use shepherd_rl_trainer::TrainerConfig;

/// Host that refuses the first `fail_starts` starts and logs every command
#[derive(Default)]
pub struct ScriptedHost {
    pub fail_starts: usize,
    pub starts: usize,
    pub stop_after_commands: Option<usize>,
    pub commands: Vec<String>,
    pub started: bool,
    pub running: bool,
}

impl ScriptedHost {
    pub fn failing(fail_starts: usize) -> Self {
        Self {
            fail_starts,
            ..Self::default()
        }
    }

    pub fn count(&self, command: &str) -> usize {
        self.commands.iter().filter(|c| *c == command).count()
    }
}

#[async_trait]
impl MissionHost for ScriptedHost {
    async fn start_mission(&mut self, _: &MissionSpec) -> Result<()> {
        self.starts += 1;
        if self.starts <= self.fail_starts {
            return Err(RLError::Environment(format!("start {} refused", self.starts)));
        }
        self.started = true;
        self.running = true;
        Ok(())
    }

    async fn world_state(&mut self) -> Result<WorldState> {
        Ok(WorldState {
            has_mission_begun: self.started,
            is_mission_running: self.running,
            ..WorldState::default()
        })
    }

    async fn send_command(&mut self, command: &str) -> Result<()> {
        self.commands.push(command.to_string());
        if command == "quit" {
            self.running = false;
        }
        if Some(self.commands.len()) == self.stop_after_commands {
            self.running = false;
        }
        Ok(())
    }
}

/// World replaying a fixed reward/status script every episode.
///
/// Observations encode the step index so transitions can be told apart.
/// `drift` reports an off-grid position right after the given step.
pub struct ScriptedWorld {
    pub script: Vec<(f64, GameStatus)>,
    pub drift: Option<(usize, Position)>,
    pub resets: usize,
    step: usize,
}

impl ScriptedWorld {
    pub fn new(script: Vec<(f64, GameStatus)>) -> Self {
        Self {
            script,
            drift: None,
            resets: 0,
            step: 0,
        }
    }

    fn observation(step: usize) -> ObservationVector {
        ObservationVector::new(vec![step as f64, 1.0])
    }
}

#[async_trait]
impl World for ScriptedWorld {
    fn observation_len(&self) -> usize {
        2
    }

    fn num_actions(&self) -> usize {
        2
    }

    fn reset(&mut self) -> ObservationVector {
        self.resets += 1;
        self.step = 0;
        self.observe()
    }

    fn observe(&self) -> ObservationVector {
        Self::observation(self.step)
    }

    fn valid_actions(&self) -> Vec<ActionId> {
        vec![ActionId(0), ActionId(1)]
    }

    fn position(&self) -> Position {
        match self.drift {
            Some((step, position)) if step == self.step => position,
            _ => Position::new(0.5, 4.0, 0.5),
        }
    }

    async fn update_state(
        &mut self,
        _: &WorldState,
        _: ActionId,
        _: &mut dyn MissionHost,
    ) -> Result<StepUpdate> {
        let (reward, status) = self
            .script
            .get(self.step)
            .copied()
            .unwrap_or((0.0, GameStatus::Running));
        self.step += 1;
        Ok(StepUpdate {
            observation: self.observe(),
            reward,
            status,
        })
    }
}

/// Model that always prefers action 0 and counts training calls
pub struct FixedModel {
    pub actions: usize,
    pub fits: usize,
    pub saved: Mutex<Option<PathBuf>>,
}

impl FixedModel {
    pub fn new(actions: usize) -> Self {
        Self {
            actions,
            fits: 0,
            saved: Mutex::new(None),
        }
    }

    pub fn saved_path(&self) -> Option<PathBuf> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl QModel for FixedModel {
    fn input_len(&self) -> usize {
        2
    }

    fn num_actions(&self) -> usize {
        self.actions
    }

    fn predict(&self, _: &ObservationVector) -> Result<Vec<f64>> {
        let mut values = vec![0.0; self.actions];
        values[0] = 1.0;
        Ok(values)
    }

    fn fit(&mut self, _: &Array2<f64>, _: &Array2<f64>, _: usize, _: usize) -> Result<()> {
        self.fits += 1;
        Ok(())
    }

    fn evaluate(&self, _: &Array2<f64>, _: &Array2<f64>) -> Result<f64> {
        Ok(0.25)
    }

    async fn save(&self, path: &Path) -> Result<()> {
        *self.saved.lock().unwrap() = Some(path.to_path_buf());
        Ok(())
    }

    async fn load(&mut self, _: &Path) -> Result<()> {
        Ok(())
    }
}

pub fn two_action_table() -> ActionTable {
    ActionTable::new([
        (
            "movenorth 1",
            ActionCommand::Move {
                heading: Heading::North,
            },
        ),
        (
            "jump 1",
            ActionCommand::Raw {
                command: "jump 1".into(),
            },
        ),
    ])
}

/// Greedy, single-repeat configuration
pub fn config(num_repeats: usize) -> TrainerConfig {
    TrainerConfig {
        num_repeats,
        epsilon: 0.0,
        model_path: PathBuf::from("scripted-model.json"),
        ..TrainerConfig::default()
    }
}

pub fn spec() -> MissionSpec {
    MissionSpec::new("scripted", "{}")
}

pub fn win_on_third_step() -> Vec<(f64, GameStatus)> {
    vec![
        (0.0, GameStatus::Running),
        (0.0, GameStatus::Running),
        (1.0, GameStatus::Win),
    ]
}
