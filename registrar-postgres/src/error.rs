use registrar::domain::StudentId;
use thiserror::Error;

/// Represents all the ways a method can fail within Registrar Postgres.
#[derive(Error, Debug)]
pub enum Error {
    /// Error returned from the database.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    /// The records of the student changed after the state of the decision was loaded.
    #[error("concurrent modification error")]
    Concurrency,
    /// A change concerns another student than the one of the saved state.
    #[error("change of student {found} saved on the state of student {expected}")]
    UnexpectedStudent {
        expected: StudentId,
        found: StudentId,
    },
    /// The connection settings are invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}
