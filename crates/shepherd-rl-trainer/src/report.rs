//! Per-episode statistics returned by a training run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shepherd_rl_core::{Episode, EpisodeOutcome};

/// Summary of one finished episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// Episode ID
    pub id: String,
    /// Zero-based repeat index
    pub repeat: usize,
    /// Steps taken
    pub steps: usize,
    /// Sum of step rewards
    pub total_reward: f64,
    /// How the episode ended
    pub outcome: EpisodeOutcome,
    /// Loss on the last training batch
    pub last_loss: Option<f64>,
    /// Start time
    pub start_time: DateTime<Utc>,
    /// End time
    pub end_time: DateTime<Utc>,
}

impl From<Episode> for EpisodeSummary {
    fn from(episode: Episode) -> Self {
        Self {
            id: episode.id,
            repeat: episode.repeat,
            steps: episode.steps,
            total_reward: episode.total_reward,
            outcome: episode.outcome.unwrap_or(EpisodeOutcome::Ended),
            last_loss: episode.last_loss,
            start_time: episode.start_time,
            end_time: episode.end_time.unwrap_or_else(Utc::now),
        }
    }
}

/// Result of a full training run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Episodes in the order they ran
    pub episodes: Vec<EpisodeSummary>,
}

impl TrainingReport {
    /// Episodes that ended with the given outcome
    #[must_use]
    pub fn count(&self, outcome: EpisodeOutcome) -> usize {
        self.episodes.iter().filter(|e| e.outcome == outcome).count()
    }

    /// Total steps across all episodes
    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.episodes.iter().map(|e| e.steps).sum()
    }

    /// Mean episode reward, `None` before any episode
    #[must_use]
    pub fn mean_reward(&self) -> Option<f64> {
        if self.episodes.is_empty() {
            return None;
        }
        let sum: f64 = self.episodes.iter().map(|e| e.total_reward).sum();
        Some(sum / self.episodes.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn summary(repeat: usize, reward: f64, outcome: EpisodeOutcome) -> EpisodeSummary {
        let mut episode = Episode::begin(repeat);
        episode.record_step(reward, None);
        episode.finish(outcome);
        episode.into()
    }

    #[test]
    fn report_aggregates_episodes() {
        let report = TrainingReport {
            episodes: vec![
                summary(0, 1.0, EpisodeOutcome::Won),
                summary(1, -1.0, EpisodeOutcome::Lost),
                summary(2, 0.5, EpisodeOutcome::Won),
            ],
        };
        assert_eq!(report.count(EpisodeOutcome::Won), 2);
        assert_eq!(report.total_steps(), 3);
        assert_relative_eq!(report.mean_reward().unwrap(), 0.5 / 3.0);
    }

    #[test]
    fn unfinished_episode_counts_as_ended() {
        let summary: EpisodeSummary = Episode::begin(0).into();
        assert_eq!(summary.outcome, EpisodeOutcome::Ended);
        assert_eq!(TrainingReport::default().mean_reward(), None);
    }
}
