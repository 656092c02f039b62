//! Recorded experience

use serde::{Deserialize, Serialize};

use crate::{ActionId, ObservationVector};

/// Scalar reward signal for one step
pub type Reward = f64;

/// Episode status derived by the world after each step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// Episode continues
    Running,
    /// Goal reached
    Win,
    /// Episode failed
    Lose,
}

impl GameStatus {
    /// `Win` and `Lose` end the episode
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Win | Self::Lose)
    }
}

/// Single step of experience.
///
/// Never mutated after it is handed to the replay memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Observation before the action
    pub previous_state: ObservationVector,
    /// Action taken
    pub action: ActionId,
    /// Reward received
    pub reward: Reward,
    /// Observation after the action
    pub next_state: ObservationVector,
    /// Whether the step ended the episode with a win or a loss
    pub terminal: bool,
}

impl Transition {
    /// Build a transition, deriving `terminal` from the step status
    #[must_use]
    pub fn new(
        previous_state: ObservationVector,
        action: ActionId,
        reward: Reward,
        next_state: ObservationVector,
        status: GameStatus,
    ) -> Self {
        Self {
            previous_state,
            action,
            reward,
            next_state,
            terminal: status.is_terminal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_follows_status() {
        let s = ObservationVector::zeros(2);
        let running = Transition::new(s.clone(), ActionId(0), 0.0, s.clone(), GameStatus::Running);
        let lost = Transition::new(s.clone(), ActionId(0), -1.0, s, GameStatus::Lose);
        assert!(!running.terminal);
        assert!(lost.terminal);
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&GameStatus::Win).unwrap();
        assert_eq!(json, "\"win\"");
    }
}
