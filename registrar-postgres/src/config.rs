use std::env::{self, VarError};

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::debug;

use crate::Error;

/// Environment variable holding the maximum size of the connection pool.
pub const MAX_CONNECTIONS_VAR: &str = "REGISTRAR_PG_MAX_CONNECTIONS";

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Connection settings of the PostgreSQL store.
#[derive(Debug, Clone)]
pub struct PgConfig {
    pub connect_options: PgConnectOptions,
    pub max_connections: u32,
}

impl PgConfig {
    /// Reads the settings from the environment, after loading the `.env` file if any.
    ///
    /// The connection itself is configured by the libpq variables (`PGHOST`, `PGUSER`, ...).
    pub fn from_env() -> Result<Self, Error> {
        if let Err(err) = dotenv::dotenv() {
            debug!(%err, "no .env file loaded");
        }
        let max_connections = parse_max_connections(env::var(MAX_CONNECTIONS_VAR))?;
        Ok(Self {
            connect_options: PgConnectOptions::new(),
            max_connections,
        })
    }
}

/// Opens a connection pool with the given settings.
pub async fn connect(config: &PgConfig) -> Result<PgPool, Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(config.connect_options.clone())
        .await?;
    Ok(pool)
}

fn parse_max_connections(value: Result<String, VarError>) -> Result<u32, Error> {
    let value = match value {
        Ok(value) => value,
        Err(VarError::NotPresent) => return Ok(DEFAULT_MAX_CONNECTIONS),
        Err(err) => return Err(Error::Config(format!("{MAX_CONNECTIONS_VAR}: {err}"))),
    };
    match value.trim().parse::<u32>() {
        Ok(max_connections) if max_connections > 0 => Ok(max_connections),
        _ => Err(Error::Config(format!(
            "{MAX_CONNECTIONS_VAR} must be a positive integer, got {value:?}"
        ))),
    }
}
