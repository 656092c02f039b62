//! Translation from action ids to host command sequences

use serde::{Deserialize, Serialize};
use tracing::warn;

use shepherd_rl_core::{ActionId, MissionHost, RLError, Result, WorldState};

/// Compass direction of a movement action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Heading {
    /// Toward lower z
    North,
    /// Toward higher x
    East,
    /// Toward higher z
    South,
    /// Toward lower x
    West,
}

impl Heading {
    fn name(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::East => "east",
            Self::South => "south",
            Self::West => "west",
        }
    }
}

/// How one action is carried out on the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionCommand {
    /// Discrete one-block move, `move<heading> 1`
    Move {
        /// Direction of travel
        heading: Heading,
    },
    /// Press then release a hotbar key, switching the held item
    SelectSlot {
        /// Hotbar slot
        slot: u8,
    },
    /// Teleport next to a named entity from the latest world state
    TeleportToEntity {
        /// Entity to look up
        entity: String,
        /// Offset added to the entity's x
        dx: f64,
        /// Absolute height to land at
        y: f64,
        /// Offset added to the entity's z
        dz: f64,
    },
    /// Command passed through unchanged
    Raw {
        /// Command string
        command: String,
    },
}

impl ActionCommand {
    /// Command strings for this action given the latest world state.
    ///
    /// A teleport whose target is not visible yields no commands.
    #[must_use]
    pub fn render(&self, world_state: &WorldState) -> Vec<String> {
        match self {
            Self::Move { heading } => vec![format!("move{} 1", heading.name())],
            Self::SelectSlot { slot } => {
                vec![format!("hotbar.{slot} 1"), format!("hotbar.{slot} 0")]
            }
            Self::TeleportToEntity { entity, dx, y, dz } => match world_state.entity(entity) {
                Some(target) => vec![format!("tp {} {} {}", target.x + dx, y, target.z + dz)],
                None => {
                    warn!(entity = %entity, "teleport target not visible, skipping");
                    Vec::new()
                }
            },
            Self::Raw { command } => vec![command.clone()],
        }
    }

    /// Heading of a movement action
    #[must_use]
    pub fn heading(&self) -> Option<Heading> {
        match self {
            Self::Move { heading } => Some(*heading),
            _ => None,
        }
    }
}

/// Labelled action entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEntry {
    /// Name shown in logs
    pub label: String,
    /// Command builder
    pub command: ActionCommand,
}

/// Full action space of an environment, indexed by [`ActionId`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionTable {
    entries: Vec<ActionEntry>,
}

impl ActionTable {
    /// Build a table from labelled commands, in action-id order
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, ActionCommand)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(label, command)| ActionEntry {
                    label: label.into(),
                    command,
                })
                .collect(),
        }
    }

    /// Number of actions
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for an action
    pub fn get(&self, action: ActionId) -> Result<&ActionEntry> {
        self.entries
            .get(action.index())
            .ok_or(RLError::InvalidAction(action))
    }

    /// Label for an action, `"?"` when out of range
    #[must_use]
    pub fn label(&self, action: ActionId) -> &str {
        self.entries
            .get(action.index())
            .map_or("?", |e| e.label.as_str())
    }

    /// Heading of an action, if it is a move
    #[must_use]
    pub fn heading(&self, action: ActionId) -> Option<Heading> {
        self.entries
            .get(action.index())
            .and_then(|e| e.command.heading())
    }

    /// Command strings for an action
    pub fn commands(&self, action: ActionId, world_state: &WorldState) -> Result<Vec<String>> {
        Ok(self.get(action)?.command.render(world_state))
    }

    /// Send an action's commands to the host, in order
    pub async fn execute(
        &self,
        action: ActionId,
        world_state: &WorldState,
        host: &mut dyn MissionHost,
    ) -> Result<()> {
        for command in self.commands(action, world_state)? {
            host.send_command(&command).await?;
        }
        Ok(())
    }
}
