//! Process configuration loaded via OrthoConfig.
//!
//! Values come from `DUALWRITE_*` environment variables, CLI flags or a
//! config file. Both store locations are required; everything else has a
//! default.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_MONGODB_DATABASE: &str = "migrationgo";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_POOL_CONNECTION_TIMEOUT_SECS: u64 = 30;

/// Errors raised when a loaded setting is missing or malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// A required setting has no value.
    #[error("missing required setting `{setting}` (env DUALWRITE_{env})")]
    Missing {
        setting: &'static str,
        env: &'static str,
    },
    /// A setting could not be parsed.
    #[error("invalid value for `{setting}`: {message}")]
    Invalid {
        setting: &'static str,
        message: String,
    },
}

/// Configuration values for the dual-write service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DUALWRITE")]
pub struct AppSettings {
    /// MongoDB connection string.
    pub mongodb_uri: Option<String>,
    /// MongoDB database holding the `users` and `products` collections.
    pub mongodb_database: Option<String>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// Maximum pooled PostgreSQL connections.
    pub pool_max_size: Option<u32>,
    /// Seconds to wait for a pooled connection.
    pub pool_connection_timeout_secs: Option<u64>,
    /// Deadline for each individual store call, in milliseconds.
    pub store_call_timeout_ms: Option<u64>,
    /// Skip the bulk migration before serving. The schema is still ensured.
    #[ortho_config(default = false)]
    pub skip_migration: bool,
}

fn required<'a>(
    value: Option<&'a String>,
    setting: &'static str,
    env: &'static str,
) -> Result<&'a str, SettingsError> {
    value
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
        .ok_or(SettingsError::Missing { setting, env })
}

impl AppSettings {
    /// MongoDB connection string.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Missing`] when unset or blank.
    pub fn mongodb_uri(&self) -> Result<&str, SettingsError> {
        required(self.mongodb_uri.as_ref(), "mongodb_uri", "MONGODB_URI")
    }

    /// MongoDB database name, defaulting to `migrationgo`.
    pub fn mongodb_database(&self) -> &str {
        self.mongodb_database
            .as_deref()
            .unwrap_or(DEFAULT_MONGODB_DATABASE)
    }

    /// PostgreSQL connection string.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Missing`] when unset or blank.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        required(self.database_url.as_ref(), "database_url", "DATABASE_URL")
    }

    /// HTTP bind address, defaulting to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] when the value is not a socket
    /// address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::Invalid {
            setting: "bind_addr",
            message: format!("{raw}: {err}"),
        })
    }

    /// Pool size, defaulting to 10.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Pool checkout timeout, defaulting to 30 seconds.
    pub fn pool_connection_timeout(&self) -> Duration {
        Duration::from_secs(
            self.pool_connection_timeout_secs
                .unwrap_or(DEFAULT_POOL_CONNECTION_TIMEOUT_SECS),
        )
    }

    /// Per-call store deadline; unbounded when unset.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] for `0`, which would expire every
    /// call that does not finish on its first poll.
    pub fn store_call_timeout(&self) -> Result<Option<Duration>, SettingsError> {
        match self.store_call_timeout_ms {
            Some(0) => Err(SettingsError::Invalid {
                setting: "store_call_timeout_ms",
                message: "must be greater than zero".to_owned(),
            }),
            other => Ok(other.map(Duration::from_millis)),
        }
    }

    /// Whether to migrate before serving; true unless `skip_migration` is set.
    pub fn migrate_on_startup(&self) -> bool {
        !self.skip_migration
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "DUALWRITE_MONGODB_URI",
        "DUALWRITE_MONGODB_DATABASE",
        "DUALWRITE_DATABASE_URL",
        "DUALWRITE_BIND_ADDR",
        "DUALWRITE_POOL_MAX_SIZE",
        "DUALWRITE_POOL_CONNECTION_TIMEOUT_SECS",
        "DUALWRITE_STORE_CALL_TIMEOUT_MS",
        "DUALWRITE_SKIP_MIGRATION",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("dualwrite")]).expect("config should load")
    }

    fn env_with(overrides: &[(&'static str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(env_with(&[]));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.mongodb_uri(),
            Err(SettingsError::Missing {
                setting: "mongodb_uri",
                env: "MONGODB_URI",
            })
        );
        assert!(settings.database_url().is_err());
        assert_eq!(settings.mongodb_database(), "migrationgo");
        assert_eq!(
            settings.bind_addr(),
            Ok("0.0.0.0:8080".parse().expect("valid address"))
        );
        assert_eq!(settings.pool_max_size(), 10);
        assert_eq!(settings.pool_connection_timeout(), Duration::from_secs(30));
        assert_eq!(settings.store_call_timeout(), Ok(None));
        assert!(settings.migrate_on_startup());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("DUALWRITE_MONGODB_URI", "mongodb://localhost:27017"),
            ("DUALWRITE_MONGODB_DATABASE", "shop"),
            ("DUALWRITE_DATABASE_URL", "postgres://app@localhost/app"),
            ("DUALWRITE_BIND_ADDR", "127.0.0.1:9000"),
            ("DUALWRITE_POOL_MAX_SIZE", "4"),
            ("DUALWRITE_POOL_CONNECTION_TIMEOUT_SECS", "5"),
            ("DUALWRITE_STORE_CALL_TIMEOUT_MS", "250"),
            ("DUALWRITE_SKIP_MIGRATION", "false"),
        ]));

        let settings = load_from_empty_args();
        assert_eq!(settings.mongodb_uri(), Ok("mongodb://localhost:27017"));
        assert_eq!(settings.mongodb_database(), "shop");
        assert_eq!(settings.database_url(), Ok("postgres://app@localhost/app"));
        assert_eq!(
            settings.bind_addr(),
            Ok("127.0.0.1:9000".parse().expect("valid address"))
        );
        assert_eq!(settings.pool_max_size(), 4);
        assert_eq!(settings.pool_connection_timeout(), Duration::from_secs(5));
        assert_eq!(
            settings.store_call_timeout(),
            Ok(Some(Duration::from_millis(250)))
        );
        assert!(!settings.migrate_on_startup());
    }

    #[rstest]
    fn zero_store_call_timeout_is_rejected() {
        let _guard = lock_env(env_with(&[("DUALWRITE_STORE_CALL_TIMEOUT_MS", "0")]));

        let err = load_from_empty_args()
            .store_call_timeout()
            .expect_err("zero deadline should be rejected");
        assert!(matches!(
            err,
            SettingsError::Invalid {
                setting: "store_call_timeout_ms",
                ..
            }
        ));
    }

    #[rstest]
    fn malformed_bind_addr_is_reported() {
        let _guard = lock_env(env_with(&[("DUALWRITE_BIND_ADDR", "not-an-address")]));

        let err = load_from_empty_args()
            .bind_addr()
            .expect_err("address should be rejected");
        assert!(matches!(err, SettingsError::Invalid { setting: "bind_addr", .. }));
    }
}
