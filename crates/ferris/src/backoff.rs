//! Reconnect backoff
//!
//! Doubles from `base` up to `max` after every failed session and starts
//! over once a session reaches ready. Each delay is scaled by a random
//! factor in `[0.5, 1.0]` so clients dropped together do not reconnect
//! together.

use std::time::Duration;

use ferris_common::ReconnectConfig;
use rand::Rng;

const FACTOR: u32 = 2;

/// Exponential reconnect delay
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    current: Duration,
    jitter: bool,
}

impl Backoff {
    pub fn new(config: ReconnectConfig) -> Self {
        let base = config.base.min(config.max);
        Self {
            base,
            max: config.max,
            current: base,
            jitter: true,
        }
    }

    /// Disable the random scaling
    #[must_use]
    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    /// Delay before the next attempt; advances the schedule
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(FACTOR).min(self.max);

        if self.jitter {
            jittered(delay)
        } else {
            delay
        }
    }

    /// Start over from `base`
    pub fn reset(&mut self) {
        self.current = self.base;
    }
}

fn jittered(delay: Duration) -> Duration {
    if delay.is_zero() {
        return delay;
    }
    let scale: f64 = rand::thread_rng().gen_range(0.5..=1.0);
    delay.mul_f64(scale)
}
