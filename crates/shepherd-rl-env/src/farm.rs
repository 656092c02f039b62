//! Simulated sheep-herding farm
//!
//! [`FarmHost`] plays the external simulator: it accepts start requests,
//! executes raw commands and reports world states. [`FarmWorld`] is the
//! agent-side view that turns those world states into observations, valid
//! actions and rewards. The task: lure the sheep into the pen by holding
//! wheat near it.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use shepherd_rl_core::{
    ActionId, Entity, GameStatus, MissionHost, MissionSpec, ObservationVector, Position, RLError,
    Result, StepUpdate, World, WorldState,
};

use crate::correction::GROUND_Y;
use crate::{ActionCommand, ActionTable, Heading};

/// Name of the agent entity in world states
pub const AGENT: &str = "Agent";
/// Name of the sheep entity in world states
pub const SHEEP: &str = "Sheep";
/// Hotbar slot holding the wheat
pub const WHEAT_SLOT: u8 = 2;
/// Hotbar slot holding nothing interesting
pub const EMPTY_SLOT: u8 = 1;

/// Move one block north
pub const MOVE_NORTH: ActionId = ActionId(0);
/// Move one block east
pub const MOVE_EAST: ActionId = ActionId(1);
/// Move one block south
pub const MOVE_SOUTH: ActionId = ActionId(2);
/// Move one block west
pub const MOVE_WEST: ActionId = ActionId(3);
/// Switch to the wheat slot
pub const HOLD_WHEAT: ActionId = ActionId(4);
/// Switch away from the wheat slot
pub const HIDE_WHEAT: ActionId = ActionId(5);
/// Teleport to just north of the sheep
pub const TELEPORT_TO_SHEEP: ActionId = ActionId(6);

const MOVES: [(ActionId, Heading); 4] = [
    (MOVE_NORTH, Heading::North),
    (MOVE_EAST, Heading::East),
    (MOVE_SOUTH, Heading::South),
    (MOVE_WEST, Heading::West),
];

/// Grid cell, `(x, z)` block indices
pub type Cell = (usize, usize);

/// Rectangular pen, inclusive cell bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pen {
    /// Lowest x cell
    pub min_x: usize,
    /// Lowest z cell
    pub min_z: usize,
    /// Highest x cell
    pub max_x: usize,
    /// Highest z cell
    pub max_z: usize,
}

impl Pen {
    /// Whether a cell lies inside the pen
    #[must_use]
    pub fn contains(&self, (x, z): Cell) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_z..=self.max_z).contains(&z)
    }

    /// Manhattan distance from a cell to the nearest pen cell
    #[must_use]
    pub fn distance(&self, (x, z): Cell) -> usize {
        let dx = self.min_x.saturating_sub(x) + x.saturating_sub(self.max_x);
        let dz = self.min_z.saturating_sub(z) + z.saturating_sub(self.max_z);
        dx + dz
    }
}

/// Declarative farm scenario, carried as the mission document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmMission {
    /// Mission name
    pub name: String,
    /// Field width in blocks (x)
    pub width: usize,
    /// Field depth in blocks (z)
    pub depth: usize,
    /// Agent start cell
    pub agent_start: Cell,
    /// Sheep start cell
    pub sheep_start: Cell,
    /// Target pen
    pub pen: Pen,
    /// Steps before the episode is lost
    pub max_steps: usize,
    /// Distance within which held wheat attracts the sheep
    pub lure_radius: f64,
    /// Chance the sheep takes a random step when not lured
    pub wander_probability: f64,
    /// Chance per step that the sheep bumps the agent off the grid
    pub nudge_probability: f64,
    /// Start requests the host refuses before accepting one
    pub flaky_starts: usize,
    /// World-state polls before a started mission reports begun
    pub begin_delay_polls: usize,
    /// Simulator seed; entropy when absent
    pub seed: Option<u64>,
}

impl Default for FarmMission {
    fn default() -> Self {
        Self {
            name: "farm".to_string(),
            width: 7,
            depth: 7,
            agent_start: (1, 1),
            sheep_start: (4, 4),
            pen: Pen {
                min_x: 0,
                min_z: 5,
                max_x: 1,
                max_z: 6,
            },
            max_steps: 60,
            lure_radius: 3.0,
            wander_probability: 0.1,
            nudge_probability: 0.05,
            flaky_starts: 0,
            begin_delay_polls: 1,
            seed: None,
        }
    }
}

impl FarmMission {
    /// Check that the scenario fits inside its field
    pub fn validate(&self) -> Result<()> {
        let inside = |(x, z): Cell| x < self.width && z < self.depth;
        if self.width == 0 || self.depth == 0 {
            return Err(RLError::Config("farm field must not be empty".into()));
        }
        if !inside(self.agent_start) || !inside(self.sheep_start) {
            return Err(RLError::Config("start cells must lie inside the field".into()));
        }
        if self.pen.min_x > self.pen.max_x
            || self.pen.min_z > self.pen.max_z
            || !inside((self.pen.max_x, self.pen.max_z))
        {
            return Err(RLError::Config("pen must be a non-empty area inside the field".into()));
        }
        if self.agent_start == self.sheep_start {
            return Err(RLError::Config("agent and sheep cannot share a start cell".into()));
        }
        if self.max_steps == 0 {
            return Err(RLError::Config("max_steps must be positive".into()));
        }
        Ok(())
    }

    /// Serialize into a mission spec for [`MissionHost::start_mission`]
    pub fn to_spec(&self) -> Result<MissionSpec> {
        Ok(MissionSpec::new(self.name.clone(), serde_json::to_string(self)?))
    }

    /// Parse the scenario back out of a mission spec
    pub fn from_spec(spec: &MissionSpec) -> Result<Self> {
        let mission: Self = serde_json::from_str(&spec.document)?;
        mission.validate()?;
        Ok(mission)
    }

    /// Number of grid cells
    #[must_use]
    pub fn cells(&self) -> usize {
        self.width * self.depth
    }

    /// Center of a cell at ground level
    #[must_use]
    pub fn center(&self, (x, z): Cell) -> Position {
        Position::new(x as f64 + 0.5, GROUND_Y, z as f64 + 0.5)
    }

    /// Cell containing a position, clamped to the field
    #[must_use]
    pub fn cell_of(&self, position: Position) -> Cell {
        let clamp = |v: f64, len: usize| {
            if v <= 0.0 {
                0
            } else {
                (v.floor() as usize).min(len - 1)
            }
        };
        (clamp(position.x, self.width), clamp(position.z, self.depth))
    }

    /// Whether a position is within the field
    #[must_use]
    pub fn in_field(&self, position: Position) -> bool {
        position.x >= 0.0
            && position.z >= 0.0
            && position.x < self.width as f64
            && position.z < self.depth as f64
    }

    /// Action table for the farm, in action-id order
    #[must_use]
    pub fn action_table() -> ActionTable {
        ActionTable::new([
            (
                "movenorth 1",
                ActionCommand::Move {
                    heading: Heading::North,
                },
            ),
            (
                "moveeast 1",
                ActionCommand::Move {
                    heading: Heading::East,
                },
            ),
            (
                "movesouth 1",
                ActionCommand::Move {
                    heading: Heading::South,
                },
            ),
            (
                "movewest 1",
                ActionCommand::Move {
                    heading: Heading::West,
                },
            ),
            ("hold_wheat", ActionCommand::SelectSlot { slot: WHEAT_SLOT }),
            ("hide_wheat", ActionCommand::SelectSlot { slot: EMPTY_SLOT }),
            (
                "teleport_to_sheep",
                ActionCommand::TeleportToEntity {
                    entity: SHEEP.to_string(),
                    dx: 0.0,
                    y: GROUND_Y,
                    dz: -1.0,
                },
            ),
        ])
    }
}

fn step_toward(from: Cell, to: Cell) -> Cell {
    let dx = to.0 as isize - from.0 as isize;
    let dz = to.1 as isize - from.1 as isize;
    if dx.abs() >= dz.abs() {
        ((from.0 as isize + dx.signum()) as usize, from.1)
    } else {
        (from.0, (from.1 as isize + dz.signum()) as usize)
    }
}

fn offset(position: Position, heading: Heading) -> Position {
    match heading {
        Heading::North => Position::new(position.x, position.y, position.z - 1.0),
        Heading::East => Position::new(position.x + 1.0, position.y, position.z),
        Heading::South => Position::new(position.x, position.y, position.z + 1.0),
        Heading::West => Position::new(position.x - 1.0, position.y, position.z),
    }
}

/// In-process simulator standing in for the external mission host
pub struct FarmHost {
    mission: Option<FarmMission>,
    rng: StdRng,
    agent: Position,
    sheep: Cell,
    selected_slot: u8,
    begin_countdown: usize,
    started: bool,
    running: bool,
    refused_starts: usize,
    pending_errors: Vec<String>,
}

impl FarmHost {
    /// Create a host; `seed` fixes the simulator's randomness
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            mission: None,
            rng: seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64),
            agent: Position::new(0.5, GROUND_Y, 0.5),
            sheep: (0, 0),
            selected_slot: EMPTY_SLOT,
            begin_countdown: 0,
            started: false,
            running: false,
            refused_starts: 0,
            pending_errors: Vec::new(),
        }
    }

    /// Current agent position
    #[must_use]
    pub fn agent(&self) -> Position {
        self.agent
    }

    /// Current sheep cell
    #[must_use]
    pub fn sheep(&self) -> Cell {
        self.sheep
    }

    fn mission(&self) -> Result<&FarmMission> {
        self.mission
            .as_ref()
            .ok_or_else(|| RLError::Environment("no mission started".into()))
    }

    fn holding_wheat(&self) -> bool {
        self.selected_slot == WHEAT_SLOT
    }

    fn move_agent(&mut self, heading: Heading) -> Result<()> {
        let mission = self.mission()?;
        let target = offset(self.agent, heading);
        if mission.in_field(target) && mission.cell_of(target) != self.sheep {
            self.agent = target;
        }
        Ok(())
    }

    /// Place the agent at `tp` coordinates.
    ///
    /// Targets past the fence are pulled back to the nearest cell center on
    /// that axis. A target on the sheep's cell is refused.
    fn teleport(&mut self, args: &str) -> Result<()> {
        let coords: Vec<f64> = args
            .split_whitespace()
            .map(str::parse)
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| RLError::Environment(format!("bad tp arguments '{args}': {e}")))?;
        let &[x, y, z] = coords.as_slice() else {
            return Err(RLError::Environment(format!(
                "tp expects 3 coordinates, got '{args}'"
            )));
        };
        let mission = self.mission()?;
        let fence = |v: f64, len: usize| {
            if v < 0.0 {
                0.5
            } else if v >= len as f64 {
                len as f64 - 0.5
            } else {
                v
            }
        };
        let target = Position::new(fence(x, mission.width), y, fence(z, mission.depth));
        if mission.cell_of(target) == self.sheep {
            return Err(RLError::Environment(format!(
                "tp target {} {} {} is occupied by the sheep",
                target.x, target.y, target.z
            )));
        }
        if target != Position::new(x, y, z) {
            debug!(x, z, to_x = target.x, to_z = target.z, "tp target clamped to the field");
        }
        self.agent = target;
        Ok(())
    }

    /// Advance the sheep and maybe bump the agent after an agent action
    fn tick(&mut self) -> Result<()> {
        let mission = self.mission()?.clone();
        let agent_cell = mission.cell_of(self.agent);
        let dx = self.agent.x - (self.sheep.0 as f64 + 0.5);
        let dz = self.agent.z - (self.sheep.1 as f64 + 0.5);
        let distance = (dx * dx + dz * dz).sqrt();

        let next = if self.holding_wheat() && distance <= mission.lure_radius {
            step_toward(self.sheep, agent_cell)
        } else if self.rng.gen_bool(mission.wander_probability.clamp(0.0, 1.0)) {
            let (_, heading) = MOVES[self.rng.gen_range(0..MOVES.len())];
            mission.cell_of(offset(mission.center(self.sheep), heading))
        } else {
            self.sheep
        };
        if next != agent_cell {
            self.sheep = next;
        }

        if self.rng.gen_bool(mission.nudge_probability.clamp(0.0, 1.0)) {
            let bump = if self.rng.gen_bool(0.5) { 0.3 } else { -0.3 };
            let nudged = if self.rng.gen_bool(0.5) {
                Position::new(self.agent.x + bump, self.agent.y, self.agent.z)
            } else {
                Position::new(self.agent.x, self.agent.y, self.agent.z + bump)
            };
            if mission.in_field(nudged) {
                debug!(x = nudged.x, z = nudged.z, "sheep nudged the agent");
                self.agent = nudged;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl MissionHost for FarmHost {
    async fn start_mission(&mut self, spec: &MissionSpec) -> Result<()> {
        let mission = FarmMission::from_spec(spec)?;
        if self.refused_starts < mission.flaky_starts {
            self.refused_starts += 1;
            return Err(RLError::Environment("mission host is busy".into()));
        }
        self.refused_starts = 0;

        self.agent = mission.center(mission.agent_start);
        self.sheep = mission.sheep_start;
        self.selected_slot = EMPTY_SLOT;
        self.begin_countdown = mission.begin_delay_polls;
        self.started = true;
        self.running = true;
        self.pending_errors.clear();
        self.mission = Some(mission);
        Ok(())
    }

    async fn world_state(&mut self) -> Result<WorldState> {
        if !self.started {
            return Ok(WorldState::default());
        }
        if self.begin_countdown > 0 {
            self.begin_countdown -= 1;
            return Ok(WorldState {
                errors: std::mem::take(&mut self.pending_errors),
                ..WorldState::default()
            });
        }

        let sheep = self.mission()?.center(self.sheep);
        Ok(WorldState {
            has_mission_begun: true,
            is_mission_running: self.running,
            errors: std::mem::take(&mut self.pending_errors),
            entities: vec![Entity::new(AGENT, self.agent), Entity::new(SHEEP, sheep)],
        })
    }

    async fn send_command(&mut self, command: &str) -> Result<()> {
        if !self.running {
            return Ok(());
        }
        let (verb, args) = command.split_once(' ').unwrap_or((command, ""));
        match verb {
            "movenorth" => self.move_agent(Heading::North)?,
            "moveeast" => self.move_agent(Heading::East)?,
            "movesouth" => self.move_agent(Heading::South)?,
            "movewest" => self.move_agent(Heading::West)?,
            // Teleports only reposition the agent; the sheep does not react.
            "tp" => {
                if let Err(e) = self.teleport(args) {
                    self.pending_errors.push(e.to_string());
                }
                return Ok(());
            }
            "quit" => {
                self.running = false;
                self.started = false;
                return Ok(());
            }
            _ => match verb.strip_prefix("hotbar.").map(str::parse::<u8>) {
                Some(Ok(slot)) => {
                    // Key release does nothing; the press selected the slot.
                    if args.trim() == "1" {
                        self.selected_slot = slot;
                    } else {
                        return Ok(());
                    }
                }
                _ => {
                    self.pending_errors
                        .push(format!("Unknown command: '{command}'"));
                    return Ok(());
                }
            },
        }
        self.tick()
    }
}

/// Agent-side view of the farm
pub struct FarmWorld {
    mission: FarmMission,
    agent: Position,
    sheep: Option<Cell>,
    holding_wheat: bool,
    steps: usize,
}

impl FarmWorld {
    /// Create a world for a scenario
    #[must_use]
    pub fn new(mission: FarmMission) -> Self {
        let agent = mission.center(mission.agent_start);
        let sheep = Some(mission.sheep_start);
        Self {
            mission,
            agent,
            sheep,
            holding_wheat: false,
            steps: 0,
        }
    }

    fn pen_distance(&self) -> Option<usize> {
        self.sheep.map(|cell| self.mission.pen.distance(cell))
    }
}

#[async_trait]
impl World for FarmWorld {
    fn observation_len(&self) -> usize {
        self.mission.cells() + 1
    }

    fn num_actions(&self) -> usize {
        7
    }

    fn reset(&mut self) -> ObservationVector {
        self.agent = self.mission.center(self.mission.agent_start);
        self.sheep = Some(self.mission.sheep_start);
        self.holding_wheat = false;
        self.steps = 0;
        self.observe()
    }

    fn observe(&self) -> ObservationVector {
        let m = &self.mission;
        let mut data = vec![0.0; self.observation_len()];
        for z in m.pen.min_z..=m.pen.max_z {
            for x in m.pen.min_x..=m.pen.max_x {
                data[z * m.width + x] = 0.3;
            }
        }
        if let Some((x, z)) = self.sheep {
            data[z * m.width + x] = 0.6;
        }
        let (ax, az) = m.cell_of(self.agent);
        data[az * m.width + ax] = 1.0;
        data[m.cells()] = if self.holding_wheat { 1.0 } else { 0.0 };
        ObservationVector::new(data)
    }

    fn valid_actions(&self) -> Vec<ActionId> {
        let mut valid: Vec<ActionId> = MOVES
            .iter()
            .filter(|(_, heading)| self.mission.in_field(offset(self.agent, *heading)))
            .map(|(action, _)| *action)
            .collect();
        valid.push(if self.holding_wheat { HIDE_WHEAT } else { HOLD_WHEAT });
        if self.sheep.is_some() {
            valid.push(TELEPORT_TO_SHEEP);
        }
        valid
    }

    fn position(&self) -> Position {
        self.agent
    }

    async fn update_state(
        &mut self,
        world_state: &WorldState,
        action: ActionId,
        _host: &mut dyn MissionHost,
    ) -> Result<StepUpdate> {
        let before = self.pen_distance();

        if let Some(agent) = world_state.entity(AGENT) {
            self.agent = agent.position();
        }
        self.sheep = world_state
            .entity(SHEEP)
            .map(|sheep| self.mission.cell_of(sheep.position()));
        if action == HOLD_WHEAT {
            self.holding_wheat = true;
        } else if action == HIDE_WHEAT {
            self.holding_wheat = false;
        }
        self.steps += 1;

        let (reward, status) = match self.sheep {
            Some(cell) if self.mission.pen.contains(cell) => (1.0, GameStatus::Win),
            _ if self.steps >= self.mission.max_steps => (-1.0, GameStatus::Lose),
            _ => {
                let progress = match (before, self.pen_distance()) {
                    (Some(b), Some(a)) => b as f64 - a as f64,
                    _ => 0.0,
                };
                (0.1 * progress - 0.01, GameStatus::Running)
            }
        };

        Ok(StepUpdate {
            observation: self.observe(),
            reward,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CoordinateCorrector;
    use approx::assert_relative_eq;

    fn calm_mission() -> FarmMission {
        FarmMission {
            wander_probability: 0.0,
            nudge_probability: 0.0,
            begin_delay_polls: 0,
            seed: Some(1),
            ..FarmMission::default()
        }
    }

    async fn started(mission: &FarmMission) -> FarmHost {
        let mut host = FarmHost::new(Some(1));
        host.start_mission(&mission.to_spec().unwrap()).await.unwrap();
        host
    }

    #[test]
    fn pen_distance_is_zero_inside() {
        let pen = FarmMission::default().pen;
        assert_eq!(pen.distance((1, 5)), 0);
        assert_eq!(pen.distance((4, 4)), 4);
        assert!(pen.contains((0, 6)));
        assert!(!pen.contains((2, 6)));
    }

    #[test]
    fn invalid_missions_are_rejected() {
        let outside = FarmMission {
            sheep_start: (9, 9),
            ..FarmMission::default()
        };
        assert!(matches!(outside.validate(), Err(RLError::Config(_))));
        assert!(FarmMission::default().validate().is_ok());
    }

    #[tokio::test]
    async fn flaky_host_refuses_configured_starts() {
        let mission = FarmMission {
            flaky_starts: 2,
            ..calm_mission()
        };
        let spec = mission.to_spec().unwrap();
        let mut host = FarmHost::new(Some(3));
        assert!(host.start_mission(&spec).await.is_err());
        assert!(host.start_mission(&spec).await.is_err());
        assert!(host.start_mission(&spec).await.is_ok());
    }

    #[tokio::test]
    async fn begin_is_delayed_by_configured_polls() {
        let mission = FarmMission {
            begin_delay_polls: 2,
            ..calm_mission()
        };
        let mut host = started(&mission).await;
        assert!(!host.world_state().await.unwrap().has_mission_begun);
        assert!(!host.world_state().await.unwrap().has_mission_begun);
        let state = host.world_state().await.unwrap();
        assert!(state.has_mission_begun && state.is_mission_running);
        assert_eq!(state.entities.len(), 2);
    }

    #[tokio::test]
    async fn moves_stay_inside_the_field() {
        let mut host = started(&calm_mission()).await;
        host.send_command("movenorth 1").await.unwrap();
        assert_relative_eq!(host.agent().z, 0.5);
        host.send_command("movenorth 1").await.unwrap();
        assert_relative_eq!(host.agent().z, 0.5);
        host.send_command("moveeast 1").await.unwrap();
        assert_relative_eq!(host.agent().x, 2.5);
    }

    #[tokio::test]
    async fn held_wheat_lures_the_sheep() {
        let mut host = started(&calm_mission()).await;
        host.send_command("tp 4.5 4 3.5").await.unwrap();
        assert_eq!(host.sheep(), (4, 4));

        host.send_command("hotbar.2 1").await.unwrap();
        host.send_command("hotbar.2 0").await.unwrap();
        host.send_command("movewest 1").await.unwrap();
        assert_eq!(host.sheep(), (3, 4));
    }

    #[tokio::test]
    async fn unknown_commands_surface_as_errors() {
        let mut host = started(&calm_mission()).await;
        host.send_command("dance").await.unwrap();
        let state = host.world_state().await.unwrap();
        assert_eq!(state.errors, vec!["Unknown command: 'dance'".to_string()]);
        assert!(host.world_state().await.unwrap().errors.is_empty());
    }

    #[tokio::test]
    async fn grid_correction_leaves_the_sheep_in_place() {
        let mut host = started(&calm_mission()).await;
        host.send_command("tp 4.5 4 1.5").await.unwrap();
        host.send_command("hotbar.2 1").await.unwrap();
        assert_eq!(host.sheep(), (4, 3));

        host.send_command("tp 4.8 4 1.5").await.unwrap();
        let sent = CoordinateCorrector::default()
            .correct(host.agent(), &mut host, None)
            .await
            .unwrap();

        assert_eq!(sent, Some(Position::new(4.5, GROUND_Y, 1.5)));
        assert_eq!(host.agent(), Position::new(4.5, GROUND_Y, 1.5));
        assert_eq!(host.sheep(), (4, 3));
    }

    #[tokio::test]
    async fn edge_correction_is_pulled_back_into_the_field() {
        let mut host = started(&calm_mission()).await;
        host.send_command("tp 0.2 4 1.5").await.unwrap();

        let sent = CoordinateCorrector::default()
            .correct(host.agent(), &mut host, Some(Heading::West))
            .await
            .unwrap();

        assert_eq!(sent, Some(Position::new(-0.5, GROUND_Y, 1.5)));
        assert_eq!(host.agent(), Position::new(0.5, GROUND_Y, 1.5));
        assert!(host.world_state().await.unwrap().errors.is_empty());
    }

    #[tokio::test]
    async fn teleport_onto_the_sheep_is_reported() {
        let mut host = started(&calm_mission()).await;
        host.send_command("tp 4.5 4 4.5").await.unwrap();

        assert_eq!(host.agent(), Position::new(1.5, GROUND_Y, 1.5));
        let errors = host.world_state().await.unwrap().errors;
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("occupied by the sheep"));
    }

    #[tokio::test]
    async fn quit_stops_the_mission() {
        let mut host = started(&calm_mission()).await;
        host.send_command("quit").await.unwrap();
        assert!(!host.world_state().await.unwrap().is_mission_running);
    }

    #[tokio::test]
    async fn sheep_in_pen_wins() {
        let mission = calm_mission();
        let mut world = FarmWorld::new(mission.clone());
        let mut host = started(&mission).await;
        world.reset();

        let state = WorldState {
            has_mission_begun: true,
            is_mission_running: true,
            errors: vec![],
            entities: vec![
                Entity::new(AGENT, mission.center((2, 5))),
                Entity::new(SHEEP, mission.center((1, 5))),
            ],
        };
        let update = world
            .update_state(&state, MOVE_WEST, &mut host)
            .await
            .unwrap();
        assert_eq!(update.status, GameStatus::Win);
        assert_relative_eq!(update.reward, 1.0);
    }

    #[tokio::test]
    async fn step_limit_loses() {
        let mission = FarmMission {
            max_steps: 2,
            ..calm_mission()
        };
        let mut world = FarmWorld::new(mission.clone());
        let mut host = started(&mission).await;
        world.reset();
        let state = host.world_state().await.unwrap();

        let first = world.update_state(&state, HOLD_WHEAT, &mut host).await.unwrap();
        assert_eq!(first.status, GameStatus::Running);
        let second = world.update_state(&state, HIDE_WHEAT, &mut host).await.unwrap();
        assert_eq!(second.status, GameStatus::Lose);
        assert_relative_eq!(second.reward, -1.0);
    }

    #[test]
    fn observation_marks_agent_sheep_pen_and_wheat() {
        let mission = calm_mission();
        let mut world = FarmWorld::new(mission.clone());
        let obs = world.reset();

        assert_eq!(obs.len(), mission.cells() + 1);
        assert_relative_eq!(obs.data[mission.width + 1], 1.0);
        assert_relative_eq!(obs.data[4 * mission.width + 4], 0.6);
        assert_relative_eq!(obs.data[5 * mission.width], 0.3);
        assert_relative_eq!(obs.data[mission.cells()], 0.0);
    }

    #[test]
    fn valid_actions_follow_position_and_wheat() {
        let world = FarmWorld::new(FarmMission {
            agent_start: (0, 0),
            ..calm_mission()
        });
        let valid = world.valid_actions();
        assert!(!valid.contains(&MOVE_NORTH));
        assert!(!valid.contains(&MOVE_WEST));
        assert!(valid.contains(&MOVE_EAST));
        assert!(valid.contains(&HOLD_WHEAT));
        assert!(!valid.contains(&HIDE_WHEAT));
        assert!(valid.contains(&TELEPORT_TO_SHEEP));
    }

    #[test]
    fn action_table_matches_action_ids() {
        let table = FarmMission::action_table();
        assert_eq!(table.len(), FarmWorld::new(FarmMission::default()).num_actions());
        assert_eq!(table.label(HOLD_WHEAT), "hold_wheat");
        assert_eq!(table.heading(MOVE_WEST), Some(Heading::West));
    }
}
