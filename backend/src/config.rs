//! Engine configuration loaded via OrthoConfig.
//!
//! Settings merge defaults, environment variables prefixed with `PATROL_`,
//! and command-line flags. The database URL is optional: without one the
//! server runs on fixture ports, which keeps local development and smoke
//! tests free of a PostgreSQL dependency.

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_LOOKAHEAD_HOURS: u32 = 24;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Configuration values controlling server startup.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PATROL")]
pub struct EngineSettings {
    /// PostgreSQL connection string; fixture ports are used when unset.
    pub database_url: Option<String>,
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// Hours of lookahead for generation passes that omit a window.
    pub lookahead_hours: Option<u32>,
    /// Maximum number of pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Minimum number of idle connections the pool keeps open.
    pub pool_min_idle: Option<u32>,
}

impl EngineSettings {
    /// Return the configured bind address, falling back to the default.
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Return the configured lookahead, falling back to the default.
    pub fn lookahead_hours(&self) -> u32 {
        self.lookahead_hours.unwrap_or(DEFAULT_LOOKAHEAD_HOURS)
    }

    /// Return the configured pool size, falling back to the default.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for engine configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> EngineSettings {
        EngineSettings::load_from_iter([OsString::from("backend")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("PATROL_DATABASE_URL", None::<String>),
            ("PATROL_BIND_ADDR", None::<String>),
            ("PATROL_LOOKAHEAD_HOURS", None::<String>),
            ("PATROL_POOL_MAX_SIZE", None::<String>),
            ("PATROL_POOL_MIN_IDLE", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert!(settings.database_url.is_none());
        assert_eq!(settings.bind_addr(), DEFAULT_BIND_ADDR);
        assert_eq!(settings.lookahead_hours(), DEFAULT_LOOKAHEAD_HOURS);
        assert_eq!(settings.pool_max_size(), DEFAULT_POOL_MAX_SIZE);
        assert!(settings.pool_min_idle.is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            (
                "PATROL_DATABASE_URL",
                Some("postgres://localhost/patrol".to_owned()),
            ),
            ("PATROL_BIND_ADDR", Some("127.0.0.1:9090".to_owned())),
            ("PATROL_LOOKAHEAD_HOURS", Some("48".to_owned())),
            ("PATROL_POOL_MAX_SIZE", Some("4".to_owned())),
            ("PATROL_POOL_MIN_IDLE", Some("1".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://localhost/patrol")
        );
        assert_eq!(settings.bind_addr(), "127.0.0.1:9090");
        assert_eq!(settings.lookahead_hours(), 48);
        assert_eq!(settings.pool_max_size(), 4);
        assert_eq!(settings.pool_min_idle, Some(1));
    }
}
