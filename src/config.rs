//! Process-wide configuration.
//!
//! Read once at startup from CLI flags and environment variables and handed
//! down as plain values; nothing in [`crate::solve`] or [`crate::check`]
//! reads the environment directly, so the solver itself stays a pure
//! function of `(Instance, Assignment, Deadline)`.

use std::time::Duration;

/// Default search deadline: 30 minutes, matching the reference solver's
/// competition time budget.
const DEFAULT_DEADLINE_SECS: u64 = 1800;

const DEADLINE_ENV_VAR: &str = "MRP_DEADLINE_SECS";

/// Resolved configuration for a single run.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub deadline: Duration,
}

impl Config {
    /// Builds configuration from an optional CLI override and the process
    /// environment, falling back to [`DEFAULT_DEADLINE_SECS`].
    pub fn resolve(cli_deadline_secs: Option<u64>) -> Self {
        let deadline_secs = cli_deadline_secs
            .or_else(|| std::env::var(DEADLINE_ENV_VAR).ok().and_then(|v| v.parse().ok()))
            .unwrap_or(DEFAULT_DEADLINE_SECS);

        Config { deadline: Duration::from_secs(deadline_secs) }
    }
}

/// Installs a `tracing` subscriber reading its filter from `RUST_LOG`,
/// defaulting to `info` when the variable is unset or invalid.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_thirty_minutes_with_no_override() {
        std::env::remove_var(DEADLINE_ENV_VAR);
        let config = Config::resolve(None);
        assert_eq!(config.deadline, Duration::from_secs(1800));
    }

    #[test]
    fn cli_override_wins_over_default() {
        std::env::remove_var(DEADLINE_ENV_VAR);
        let config = Config::resolve(Some(60));
        assert_eq!(config.deadline, Duration::from_secs(60));
    }
}
