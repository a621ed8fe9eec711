//! Service configuration
//!
//! Settings are resolved once at startup (flags, environment, `.env`) by the
//! binary and handed down as plain structs; the server code itself does not
//! read the process environment.
//!
//! sqlx is the exception: [`PgConnectOptions::new`] seeds itself from the
//! libpq `PG*` variables. Host, port, user, password, database and
//! application name are always overwritten from [`DatabaseConfig`]; anything
//! left unset here (`PGSSLMODE`, `PGSSLROOTCERT`, ...) still comes from the
//! environment.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::PgConnectOptions;

/// Default Postgres port
pub const DEFAULT_DB_PORT: u16 = 5432;

/// Default host when `DB_HOST` is not set
pub const DEFAULT_DB_HOST: &str = "localhost";

/// `application_name` reported to Postgres.
pub const APPLICATION_NAME: &str = "parkpal";

/// How long a single connection attempt may take before it counts as failed.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required setting {setting} ({env})")]
    Missing {
        setting: &'static str,
        env: &'static str,
    },

    #[error("invalid value for {setting}: '{value}'")]
    Invalid { setting: &'static str, value: String },
}

/// Raw database settings as collected from flags and environment.
///
/// Everything is optional here; [`DatabaseConfig::from_settings`] decides
/// what is required.
#[derive(Debug, Default, Clone)]
pub struct DatabaseSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub connect_timeout_secs: Option<u64>,
}

/// Validated credentials for the relational store.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    password: String,
    pub database: String,
    pub connect_timeout: Duration,
}

impl DatabaseConfig {
    /// Build a config, rejecting absent or empty required settings.
    ///
    /// A missing password is an error; it is never defaulted.
    pub fn from_settings(settings: DatabaseSettings) -> Result<Self, ConfigError> {
        let user = required(settings.user, "database user", "DB_USER")?;
        let password = required(settings.password, "database password", "DB_PASSWORD")?;
        let database = required(settings.database, "database name", "DB_NAME")?;

        let host = settings
            .host
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DB_HOST.to_string());

        let connect_timeout = match settings.connect_timeout_secs {
            Some(0) => {
                return Err(ConfigError::Invalid {
                    setting: "connect timeout",
                    value: "0".into(),
                })
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_CONNECT_TIMEOUT,
        };

        Ok(Self {
            host,
            port: settings.port.unwrap_or(DEFAULT_DB_PORT),
            user,
            password,
            database,
            connect_timeout,
        })
    }

    /// Connection options for sqlx.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .application_name(APPLICATION_NAME)
    }
}

// Hand-written so the password never reaches a log line.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

fn required(
    value: Option<String>,
    setting: &'static str,
    env: &'static str,
) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing { setting, env })
}

/// How a reservation decides that a bay is still vacant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReservationMode {
    /// Single conditional `UPDATE ... WHERE baystatus = 0`, affected rows decide.
    #[default]
    Atomic,

    /// Read the status, then update in a second statement. Two concurrent
    /// reservations of the same vacant bay can both succeed.
    Legacy,
}

impl ReservationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Atomic => "atomic",
            Self::Legacy => "legacy",
        }
    }
}

impl fmt::Display for ReservationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "atomic" => Ok(Self::Atomic),
            "legacy" => Ok(Self::Legacy),
            _ => Err(ConfigError::Invalid {
                setting: "reservation mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Which store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Postgres,
    /// In-process table, lost on restart. Local development only.
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::Invalid {
                setting: "store backend",
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> DatabaseSettings {
        DatabaseSettings {
            host: Some("db.internal".into()),
            port: None,
            user: Some("parkpal".into()),
            password: Some("s3cret".into()),
            database: Some("parkpal".into()),
            connect_timeout_secs: None,
        }
    }

    #[test]
    fn complete_settings_build() {
        let config = DatabaseConfig::from_settings(complete()).unwrap();
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, DEFAULT_DB_PORT);
        assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
    }

    #[test]
    fn connect_options_carry_configured_values() {
        let settings = DatabaseSettings {
            port: Some(6543),
            ..complete()
        };
        let options = DatabaseConfig::from_settings(settings)
            .unwrap()
            .connect_options();

        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_username(), "parkpal");
        assert_eq!(options.get_database(), Some("parkpal"));
        assert_eq!(options.get_application_name(), Some(APPLICATION_NAME));
    }

    #[test]
    fn missing_password_is_an_error() {
        let settings = DatabaseSettings {
            password: None,
            ..complete()
        };
        let err = DatabaseConfig::from_settings(settings).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Missing {
                env: "DB_PASSWORD",
                ..
            }
        ));
    }

    #[test]
    fn empty_user_counts_as_missing() {
        let settings = DatabaseSettings {
            user: Some(String::new()),
            ..complete()
        };
        let err = DatabaseConfig::from_settings(settings).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing required setting database user (DB_USER)"
        );
    }

    #[test]
    fn host_defaults_to_localhost() {
        let settings = DatabaseSettings {
            host: None,
            ..complete()
        };
        let config = DatabaseConfig::from_settings(settings).unwrap();
        assert_eq!(config.host, DEFAULT_DB_HOST);
    }

    #[test]
    fn zero_timeout_rejected() {
        let settings = DatabaseSettings {
            connect_timeout_secs: Some(0),
            ..complete()
        };
        assert!(DatabaseConfig::from_settings(settings).is_err());
    }

    #[test]
    fn debug_redacts_password() {
        let config = DatabaseConfig::from_settings(complete()).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn parse_modes_and_backends() {
        assert_eq!("atomic".parse::<ReservationMode>().unwrap(), ReservationMode::Atomic);
        assert_eq!("LEGACY".parse::<ReservationMode>().unwrap(), ReservationMode::Legacy);
        assert!("optimistic".parse::<ReservationMode>().is_err());

        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert_eq!("postgresql".parse::<StoreBackend>().unwrap(), StoreBackend::Postgres);
        assert!("mysql".parse::<StoreBackend>().is_err());
    }
}
