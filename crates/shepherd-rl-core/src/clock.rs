//! Injectable sleeping for poll and backoff loops

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Source of fixed-duration pauses.
///
/// The loop only ever suspends through this trait, so tests can swap in a
/// clock that returns immediately.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Pause for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Real-time clock backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Clock that never waits and remembers every requested pause.
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingClock {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingClock {
    /// Create an empty recording clock
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pauses requested so far, in order
    #[must_use]
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requested pauses equal to `duration`
    #[must_use]
    pub fn count(&self, duration: Duration) -> usize {
        self.sleeps().iter().filter(|d| **d == duration).count()
    }
}

#[async_trait]
impl Clock for RecordingClock {
    async fn sleep(&self, duration: Duration) {
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recording_clock_logs_without_waiting() {
        let clock = RecordingClock::new();
        let shared = clock.clone();
        clock.sleep(Duration::from_secs(3600)).await;
        clock.sleep(Duration::from_millis(10)).await;

        assert_eq!(
            shared.sleeps(),
            vec![Duration::from_secs(3600), Duration::from_millis(10)]
        );
        assert_eq!(shared.count(Duration::from_millis(10)), 1);
    }

    #[test]
    fn tokio_clock_sleeps_under_runtime() {
        tokio_test::block_on(TokioClock.sleep(Duration::from_millis(1)));
    }
}
