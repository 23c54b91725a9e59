//! Reconnection policy with exponential backoff.
//!
//! This module contains pure logic without side effects: the connection
//! task asks the policy what to do after every non-deliberate close.

use std::time::Duration;

use super::RetrySchedule;

pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Configuration for automatic reconnection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectConfig {
    /// Delay before the first reconnect attempt
    pub base_delay: Duration,
    /// Ceiling for the doubled delay
    pub max_delay: Duration,
    /// Reconnect attempts allowed before giving up
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            max_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
        }
    }
}

/// What to do after a non-deliberate close
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDecision {
    /// Arm a reconnect timer
    Retry(RetrySchedule),
    /// The attempt budget is spent; the failure is terminal
    Exhausted,
}

/// Attempt counter plus the delay mapping.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    config: ReconnectConfig,
    attempts: u32,
}

impl ReconnectPolicy {
    pub fn new(config: ReconnectConfig) -> Self {
        Self {
            config,
            attempts: 0,
        }
    }

    /// Reconnect attempts made since the last successful open
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts
    }

    /// `min(base * 2^attempts, max_delay)`
    pub fn delay_for(&self, attempts: u32) -> Duration {
        let factor = 1u32.checked_shl(attempts).unwrap_or(u32::MAX);
        self.config
            .base_delay
            .checked_mul(factor)
            .map_or(self.config.max_delay, |delay| delay.min(self.config.max_delay))
    }

    /// Called for every close that was not deliberate.
    pub fn on_abnormal_close(&mut self) -> ReconnectDecision {
        if self.attempts >= self.config.max_attempts {
            return ReconnectDecision::Exhausted;
        }
        let delay = self.delay_for(self.attempts);
        self.attempts += 1;
        ReconnectDecision::Retry(RetrySchedule {
            attempt: self.attempts,
            delay,
        })
    }

    /// Called on successful open and on manual re-initiation
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}
