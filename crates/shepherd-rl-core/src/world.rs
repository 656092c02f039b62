//! World-state snapshots reported by a mission host

use serde::{Deserialize, Serialize};

/// Point in the simulated world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// East-west axis
    pub x: f64,
    /// Height
    pub y: f64,
    /// North-south axis
    pub z: f64,
}

impl Position {
    /// Create a new position
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Named object visible in the world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity name, e.g. `"Sheep"`
    pub name: String,
    /// East-west coordinate
    pub x: f64,
    /// Height
    pub y: f64,
    /// North-south coordinate
    pub z: f64,
}

impl Entity {
    /// Create a named entity at a position
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            x: position.x,
            y: position.y,
            z: position.z,
        }
    }

    /// Entity position
    #[must_use]
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y, self.z)
    }
}

/// Externally reported environment status at one poll
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    /// Mission has begun on the host side
    pub has_mission_begun: bool,
    /// Mission is still running
    pub is_mission_running: bool,
    /// Errors the host reported since the previous poll
    #[serde(default)]
    pub errors: Vec<String>,
    /// Visible entities
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl WorldState {
    /// First entity with the given name
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }
}

/// Declarative mission description handed to the host when starting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionSpec {
    /// Human-readable mission name
    pub name: String,
    /// Raw description document, interpreted by the host
    pub document: String,
}

impl MissionSpec {
    /// Create a mission spec from a name and a document
    pub fn new(name: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            document: document.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_lookup_by_name() {
        let state = WorldState {
            has_mission_begun: true,
            is_mission_running: true,
            errors: vec![],
            entities: vec![
                Entity::new("Agent", Position::new(0.5, 4.0, 0.5)),
                Entity::new("Sheep", Position::new(3.5, 4.0, 2.5)),
            ],
        };
        let sheep = state.entity("Sheep").unwrap();
        assert_eq!(sheep.position(), Position::new(3.5, 4.0, 2.5));
        assert!(state.entity("Cow").is_none());
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let state: WorldState =
            serde_json::from_str(r#"{"has_mission_begun":true,"is_mission_running":false}"#)
                .unwrap();
        assert!(state.errors.is_empty());
        assert!(state.entities.is_empty());
    }
}
