//! Subcommand implementations

pub mod migrate;
pub mod serve;

use std::fmt;

use clap::Args;
use parkpal_server::{ConfigError, DatabaseConfig, DatabaseSettings};

/// Database connection flags shared by `serve` and `migrate`
#[derive(Args)]
pub struct DatabaseArgs {
    /// Database host (default: localhost)
    #[arg(long = "db-host", env = "DB_HOST")]
    pub db_host: Option<String>,

    /// Database port (default: 5432)
    #[arg(long = "db-port", env = "DB_PORT")]
    pub db_port: Option<u16>,

    /// Database user
    #[arg(long = "db-user", env = "DB_USER")]
    pub db_user: Option<String>,

    /// Database password (required for the postgres store)
    #[arg(long = "db-password", env = "DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// Database name
    #[arg(long = "db-name", env = "DB_NAME")]
    pub db_name: Option<String>,

    /// Seconds to wait for a database connection (default: 5)
    #[arg(long = "connect-timeout", env = "DB_CONNECT_TIMEOUT", value_name = "SECS")]
    pub connect_timeout: Option<u64>,
}

impl DatabaseArgs {
    pub fn into_config(self) -> Result<DatabaseConfig, ConfigError> {
        DatabaseConfig::from_settings(DatabaseSettings {
            host: self.db_host,
            port: self.db_port,
            user: self.db_user,
            password: self.db_password,
            database: self.db_name,
            connect_timeout_secs: self.connect_timeout,
        })
    }
}

impl fmt::Debug for DatabaseArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseArgs")
            .field("db_host", &self.db_host)
            .field("db_port", &self.db_port)
            .field("db_user", &self.db_user)
            .field("db_password", &self.db_password.as_ref().map(|_| "<redacted>"))
            .field("db_name", &self.db_name)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}
