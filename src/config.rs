//! Engine tuning, read from the environment with safe defaults.

use std::env;

use once_cell::sync::Lazy;

static GLOBAL: Lazy<EngineConfig> = Lazy::new(EngineConfig::from_env);

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Bounded optimistic-retry budget for the validate-then-write cycle.
    pub max_commit_retries: u32,
    /// Per-game broadcast buffer; slow subscribers beyond this lag skip to
    /// the live edge.
    pub feed_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_commit_retries: 5,
            feed_capacity: 16,
        }
    }
}

impl EngineConfig {
    /// Build from `SCAMBODIA_MAX_COMMIT_RETRIES` / `SCAMBODIA_FEED_CAPACITY`,
    /// falling back to defaults on unset or unparsable values.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_commit_retries: env_parse("SCAMBODIA_MAX_COMMIT_RETRIES")
                .filter(|n| *n >= 1)
                .unwrap_or(defaults.max_commit_retries),
            feed_capacity: env_parse("SCAMBODIA_FEED_CAPACITY")
                .filter(|n| *n >= 1)
                .unwrap_or(defaults.feed_capacity),
        }
    }

    /// Process-wide config, read from the environment once.
    pub fn global() -> &'static EngineConfig {
        &GLOBAL
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|raw| raw.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = EngineConfig::default();
        assert!(config.max_commit_retries >= 1);
        assert!(config.feed_capacity >= 1);
    }
}
