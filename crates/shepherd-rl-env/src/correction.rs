//! Grid-alignment correction for agent drift

use tracing::warn;

use shepherd_rl_core::{MissionHost, Position, Result};

use crate::Heading;

/// Grid spacing agent coordinates are expected to sit on
pub const GRID_ALIGNMENT: f64 = 0.5;

/// Height the agent walks at
pub const GROUND_Y: f64 = 4.0;

/// Stateless check that teleports a drifted agent back onto the grid.
///
/// Other entities can push the agent off its half-block alignment. One call
/// issues at most one teleport and never retries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateCorrector {
    /// Required alignment of x and z
    pub alignment: f64,
    /// Height used in the teleport command
    pub ground_y: f64,
}

impl Default for CoordinateCorrector {
    fn default() -> Self {
        Self {
            alignment: GRID_ALIGNMENT,
            ground_y: GROUND_Y,
        }
    }
}

impl CoordinateCorrector {
    fn is_aligned(&self, v: f64) -> bool {
        v % self.alignment == 0.0
    }

    /// Corrected position for a drifted agent, `None` when already aligned.
    ///
    /// Each axis snaps to its truncated coordinate offset by one alignment
    /// step: downward for the axis a westward or northward move travels
    /// along, upward otherwise.
    #[must_use]
    pub fn correction(&self, position: Position, heading: Option<Heading>) -> Option<Position> {
        if self.is_aligned(position.x) && self.is_aligned(position.z) {
            return None;
        }

        let x_delta = if heading == Some(Heading::West) {
            -self.alignment
        } else {
            self.alignment
        };
        let z_delta = if heading == Some(Heading::North) {
            -self.alignment
        } else {
            self.alignment
        };

        Some(Position::new(
            position.x.trunc() + x_delta,
            self.ground_y,
            position.z.trunc() + z_delta,
        ))
    }

    /// Check `position` and send a teleport if it is off the grid.
    ///
    /// Returns the position the agent was sent to, if any.
    pub async fn correct(
        &self,
        position: Position,
        host: &mut dyn MissionHost,
        heading: Option<Heading>,
    ) -> Result<Option<Position>> {
        let Some(target) = self.correction(position, heading) else {
            return Ok(None);
        };

        warn!(
            x = position.x,
            z = position.z,
            to_x = target.x,
            to_z = target.z,
            "agent drifted off grid, correcting"
        );
        host.send_command(&format!("tp {} {} {}", target.x, target.y, target.z))
            .await?;
        Ok(Some(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shepherd_rl_core::{MissionSpec, WorldState};

    #[derive(Default)]
    struct CommandLog {
        commands: Vec<String>,
    }

    #[async_trait]
    impl MissionHost for CommandLog {
        async fn start_mission(&mut self, _: &MissionSpec) -> Result<()> {
            Ok(())
        }

        async fn world_state(&mut self) -> Result<WorldState> {
            Ok(WorldState::default())
        }

        async fn send_command(&mut self, command: &str) -> Result<()> {
            self.commands.push(command.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn aligned_position_sends_nothing() {
        let mut host = CommandLog::default();
        let corrector = CoordinateCorrector::default();
        let sent = corrector
            .correct(Position::new(2.5, 4.0, -1.0), &mut host, None)
            .await
            .unwrap();
        assert_eq!(sent, None);
        assert!(host.commands.is_empty());
    }

    #[tokio::test]
    async fn misaligned_axis_gets_one_teleport_and_then_settles() {
        let mut host = CommandLog::default();
        let corrector = CoordinateCorrector::default();

        let corrected = corrector
            .correct(Position::new(2.8, 4.0, 1.5), &mut host, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(host.commands, vec!["tp 2.5 4 1.5"]);

        let again = corrector.correct(corrected, &mut host, None).await.unwrap();
        assert_eq!(again, None);
        assert_eq!(host.commands.len(), 1);
    }

    #[test]
    fn heading_picks_correction_direction() {
        let corrector = CoordinateCorrector::default();
        let drifted = Position::new(3.2, 4.0, 5.7);

        let west = corrector.correction(drifted, Some(Heading::West)).unwrap();
        assert_eq!((west.x, west.z), (2.5, 5.5));

        let north = corrector.correction(drifted, Some(Heading::North)).unwrap();
        assert_eq!((north.x, north.z), (3.5, 4.5));

        let east = corrector.correction(drifted, Some(Heading::East)).unwrap();
        assert_eq!((east.x, east.z), (3.5, 5.5));
    }

    #[test]
    fn negative_coordinates_truncate_toward_zero() {
        let corrector = CoordinateCorrector::default();
        let fixed = corrector
            .correction(Position::new(-2.3, 4.0, 0.5), None)
            .unwrap();
        assert_eq!((fixed.x, fixed.z), (-1.5, 0.5));
    }
}
