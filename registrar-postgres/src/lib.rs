#![doc = include_str!("../README.md")]
mod config;
mod error;
mod store;

pub use crate::config::{connect, PgConfig, MAX_CONNECTIONS_VAR};
pub use crate::error::Error;
pub use crate::store::PgRegistrationStore;

/// Initializes the PostgreSQL DB
///
/// It creates the tables and indexes used by the Postgres registration store. Every statement is
/// idempotent, so calling it on an initialized database is a no-op.
pub async fn setup(pool: &sqlx::PgPool) -> Result<(), Error> {
    crate::store::setup(pool).await
}
