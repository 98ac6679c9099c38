//! Registration store is responsible for storing and retrieving the registration records.
//!
//! It is designed to be implemented by different storage backends. Implementations must make
//! `save` atomic and reject it when the student has been modified after `hydrate` read it.
use std::error::Error as StdError;
use std::ops::Deref;

use async_trait::async_trait;

use crate::domain::{
    Course, Enrollment, EnrollmentChange, EnrollmentQuery, GradeRecord, StudentId,
};
use crate::domain::is_approved;
use crate::error::Error;

/// Version of the records of a student, bumped by every successful save.
pub type Revision = i64;

/// A state loaded from the store together with the revision it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hydrated<S> {
    state: S,
    revision: Revision,
}

impl<S> Hydrated<S> {
    pub fn new(state: S, revision: Revision) -> Self {
        Self { state, revision }
    }

    pub fn revision(&self) -> Revision {
        self.revision
    }

    pub fn into_inner(self) -> S {
        self.state
    }
}

impl<S> Deref for Hydrated<S> {
    type Target = S;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

/// A registration store.
///
/// Write access goes through `hydrate` and `save`; the remaining methods are
/// read-only lookups used by the queries of the enrollment manager and the
/// report aggregator.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    type Error: StdError + Send + Sync + 'static;

    /// Loads the enrollment state described by `query`.
    ///
    /// A missing student yields a state without student. Courses of the
    /// query that are missing from the catalog are left out of the state.
    async fn hydrate(&self, query: &EnrollmentQuery) -> Result<Hydrated<Enrollment>, Self::Error>;

    /// Atomically applies `changes` to the student of `state`.
    ///
    /// # Returns
    ///
    /// The applied changes, or an error if the student revision moved past
    /// the one of `state`. On error nothing is written. A `PreferenceDropped`
    /// change carries the flag of the row actually deleted, which may differ
    /// from the hydrated one when the entry was confirmed in the meantime.
    async fn save(
        &self,
        state: &Hydrated<Enrollment>,
        changes: Vec<EnrollmentChange>,
    ) -> Result<Vec<EnrollmentChange>, Self::Error>;

    /// Lists the whole catalog.
    async fn list_courses(&self) -> Result<Vec<Course>, Self::Error>;

    /// Lists the courses of every preference entry of the student, pending and confirmed.
    async fn list_all_preference_entries(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<Course>, Self::Error>;

    /// Lists the courses of the confirmed preference entries of the student.
    async fn list_confirmed_preference_entries(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<Course>, Self::Error>;

    async fn count_confirmed_preference_entries(
        &self,
        student_id: StudentId,
    ) -> Result<usize, Self::Error>;

    async fn list_grade_records(&self, student_id: StudentId)
        -> Result<Vec<GradeRecord>, Self::Error>;

    /// Returns the approval flag of the student, `0` if the student does not exist.
    async fn approval_flag(&self, student_id: StudentId) -> Result<i32, Self::Error>;

    /// Returns the registration flag of the student, `false` if the student does not exist.
    async fn registration_flag(&self, student_id: StudentId) -> Result<bool, Self::Error>;

    async fn resolve_student_id_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StudentId>, Self::Error>;
}

/// Fails with `UserNotApproved` unless the approval flag of the student is at least 1.
pub(crate) async fn ensure_approved<S>(store: &S, student_id: StudentId) -> Result<(), Error>
where
    S: RegistrationStore + ?Sized,
{
    let approval = store
        .approval_flag(student_id)
        .await
        .map_err(Error::storage)?;
    if !is_approved(approval) {
        return Err(Error::UserNotApproved(student_id));
    }
    Ok(())
}
