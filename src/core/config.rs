//! Simulation configuration
//!
//! Runtime-tunable knobs live here; fixed tuning values live in
//! `core::constants`. Defaults reproduce the reference scenario pacing.

use crate::core::constants::{DEFAULT_TICK_SECONDS, ROUTER_RETRY_DELAY_SECS};

/// Configuration for a simulation run
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Simulated seconds advanced per tick.
    ///
    /// Larger steps make units move and fire more per tick; combat
    /// resolution stays stable because shot counts and travel distances
    /// scale linearly with the step.
    pub tick_seconds: f64,

    /// RNG seed. Same seed + same scenario + same collaborators = same run.
    pub seed: u64,

    /// Delay before retrying a rate-limited route request.
    ///
    /// There is deliberately no retry ceiling: rate-limiting is treated as
    /// eventually-recoverable, and a collection simply stays in the
    /// calculating state until its route arrives.
    pub router_retry_delay_secs: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_seconds: DEFAULT_TICK_SECONDS,
            seed: 42,
            router_retry_delay_secs: ROUTER_RETRY_DELAY_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_sane() {
        let config = SimulationConfig::default();
        assert!(config.tick_seconds > 0.0);
        assert!(config.router_retry_delay_secs > 0.0);
    }
}
