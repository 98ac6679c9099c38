use std::error::Error as StdError;

use serde::Serialize;

use crate::decision;
use crate::domain::{EnrollmentError, StudentId};

/// Type-erased error of a store implementation.
pub type BoxDynError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors returned by the enrollment manager and the report aggregator.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Enrollment(#[from] EnrollmentError),
    #[error("student {0} is not approved")]
    UserNotApproved(StudentId),
    #[error("storage failure: {0}")]
    Storage(#[source] BoxDynError),
}

impl Error {
    pub(crate) fn storage<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Error::Storage(Box::new(err))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Enrollment(EnrollmentError::StudentNotFound(_)) => ErrorKind::StudentNotFound,
            Error::Enrollment(EnrollmentError::CourseNotFound(_)) => ErrorKind::CourseNotFound,
            Error::Enrollment(EnrollmentError::CourseLimitExceeded(_)) => {
                ErrorKind::CourseLimitExceeded
            }
            Error::Enrollment(EnrollmentError::DuplicateCourseEntry { .. }) => {
                ErrorKind::DuplicateCourseEntry
            }
            Error::Enrollment(EnrollmentError::PreferenceNotFound { .. }) => {
                ErrorKind::PreferenceNotFound
            }
            Error::UserNotApproved(_) => ErrorKind::UserNotApproved,
            Error::Storage(_) => ErrorKind::StorageFailure,
        }
    }
}

impl<SE> From<decision::Error<SE, EnrollmentError>> for Error
where
    SE: StdError + Send + Sync + 'static,
{
    fn from(err: decision::Error<SE, EnrollmentError>) -> Self {
        match err {
            decision::Error::Store(err) => Error::storage(err),
            decision::Error::Domain(err) => Error::Enrollment(err),
        }
    }
}

/// Stable classification of the failures, suitable for a transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    StudentNotFound,
    CourseNotFound,
    CourseLimitExceeded,
    DuplicateCourseEntry,
    PreferenceNotFound,
    UserNotApproved,
    StorageFailure,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::StudentNotFound => "student_not_found",
            ErrorKind::CourseNotFound => "course_not_found",
            ErrorKind::CourseLimitExceeded => "course_limit_exceeded",
            ErrorKind::DuplicateCourseEntry => "duplicate_course_entry",
            ErrorKind::PreferenceNotFound => "preference_not_found",
            ErrorKind::UserNotApproved => "user_not_approved",
            ErrorKind::StorageFailure => "storage_failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("connection reset")]
    struct ConnectionReset;

    #[test]
    fn it_maps_domain_errors_to_their_kind() {
        let err: Error = decision::Error::<ConnectionReset, _>::Domain(
            EnrollmentError::CourseLimitExceeded(1),
        )
        .into();

        assert_eq!(err.kind(), ErrorKind::CourseLimitExceeded);
        assert_eq!(err.to_string(), "student 1 has too many courses");
    }

    #[test]
    fn it_maps_store_errors_to_storage_failure() {
        let err: Error =
            decision::Error::<_, EnrollmentError>::Store(ConnectionReset).into();

        assert_eq!(err.kind(), ErrorKind::StorageFailure);
        assert_eq!(
            StdError::source(&err).map(ToString::to_string),
            Some("connection reset".to_string())
        );
    }

    #[test]
    fn it_serializes_kinds_as_their_code() {
        for kind in [
            ErrorKind::StudentNotFound,
            ErrorKind::PreferenceNotFound,
            ErrorKind::UserNotApproved,
            ErrorKind::StorageFailure,
        ] {
            assert_eq!(
                serde_json::to_value(kind).unwrap(),
                serde_json::Value::String(kind.code().to_string())
            );
        }
    }
}
