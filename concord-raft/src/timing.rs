use std::time::Duration;

use rand::Rng;

use crate::error::RaftError;

/// Election/heartbeat timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    /// Lower bound of the randomized election timeout range.
    pub election_timeout_min: Duration,
    /// Upper bound of the randomized election timeout range.
    pub election_timeout_max: Duration,
    /// Fixed interval between leader heartbeats, well below the election
    /// timeout range.
    pub heartbeat_interval: Duration,
}

impl Default for TimingConfig {
    /// `T = 150ms`, range `[T, 2T]`, heartbeat `T/3`.
    fn default() -> Self {
        Self {
            election_timeout_min: Duration::from_millis(150),
            election_timeout_max: Duration::from_millis(300),
            heartbeat_interval: Duration::from_millis(50),
        }
    }
}

impl TimingConfig {
    /// Validates the range is non-empty.
    pub fn validate(&self) -> Result<(), RaftError> {
        if self.election_timeout_min >= self.election_timeout_max {
            return Err(RaftError::InvalidElectionTimeout {
                min_ms: self.election_timeout_min.as_millis() as u64,
                max_ms: self.election_timeout_max.as_millis() as u64,
            });
        }
        Ok(())
    }

    /// Samples a fresh randomized election timeout in
    /// `[election_timeout_min, election_timeout_max)`.
    pub fn random_election_timeout<R: Rng>(&self, rng: &mut R) -> Duration {
        let min_ms = self.election_timeout_min.as_millis() as u64;
        let max_ms = self.election_timeout_max.as_millis() as u64;
        Duration::from_millis(rng.gen_range(min_ms..max_ms))
    }
}
