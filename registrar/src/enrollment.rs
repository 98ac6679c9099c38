use std::collections::{BTreeMap, HashMap};

use tracing::{info, instrument};

use crate::decision::DecisionMaker;
use crate::domain::{
    AddCourses, Course, CourseId, DropCourse, EnrollmentChange, Rank, RegisterCourses, StudentId,
    REGISTRATION_THRESHOLD,
};
use crate::error::Error;
use crate::store::{ensure_approved, RegistrationStore};

/// Manages the lifecycle of the course selections of the students.
pub struct EnrollmentManager<S> {
    decision_maker: DecisionMaker<S>,
}

impl<S: RegistrationStore> EnrollmentManager<S> {
    pub fn new(store: S) -> Self {
        Self {
            decision_maker: DecisionMaker::new(store),
        }
    }

    fn store(&self) -> &S {
        self.decision_maker.store()
    }

    /// Initiates the administrative registration of the student.
    #[instrument(skip(self), err)]
    pub async fn register_courses(&self, student_id: StudentId) -> Result<(), Error> {
        self.decision_maker
            .make(RegisterCourses::new(student_id))
            .await?;
        info!("registration triggered");
        Ok(())
    }

    /// Adds ranked course preferences for the student.
    ///
    /// Either every selection is stored as a pending preference or none is.
    #[instrument(skip(self), err)]
    pub async fn add_courses(
        &self,
        student_id: StudentId,
        selections: BTreeMap<CourseId, Rank>,
    ) -> Result<(), Error> {
        let decision = self
            .decision_maker
            .make(AddCourses::new(student_id, selections))
            .await?;
        info!(added = decision.changes().len(), "courses added");
        Ok(())
    }

    /// Removes the preference entry of the student for the course.
    ///
    /// # Returns
    ///
    /// Whether the removed entry was a confirmed registration.
    #[instrument(skip(self), err)]
    pub async fn drop_courses(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<bool, Error> {
        let decision = self
            .decision_maker
            .make(DropCourse::new(student_id, course_id))
            .await?;
        let registered = decision.changes().iter().any(|change| {
            matches!(
                change,
                EnrollmentChange::PreferenceDropped {
                    registered: true,
                    ..
                }
            )
        });
        info!(registered, "course dropped");
        Ok(registered)
    }

    /// Lists the confirmed registrations of an approved student.
    #[instrument(skip(self), err)]
    pub async fn list_course(
        &self,
        student_id: StudentId,
    ) -> Result<HashMap<CourseId, String>, Error> {
        ensure_approved(self.store(), student_id).await?;
        let courses = self
            .store()
            .list_confirmed_preference_entries(student_id)
            .await
            .map_err(Error::storage)?;
        Ok(into_map(courses))
    }

    /// Returns the raw approval flag of the student, `0` for an unknown student.
    #[instrument(skip(self), err)]
    pub async fn is_approved(&self, student_id: StudentId) -> Result<i32, Error> {
        self.store()
            .approval_flag(student_id)
            .await
            .map_err(Error::storage)
    }

    /// Tells whether the student holds enough confirmed registrations.
    #[instrument(skip(self), err)]
    pub async fn is_registered(&self, student_id: StudentId) -> Result<bool, Error> {
        let confirmed = self
            .store()
            .count_confirmed_preference_entries(student_id)
            .await
            .map_err(Error::storage)?;
        Ok(confirmed >= REGISTRATION_THRESHOLD)
    }

    /// Lists every course selected by the student, pending and confirmed.
    #[instrument(skip(self), err)]
    pub async fn get_added_courses(
        &self,
        student_id: StudentId,
    ) -> Result<HashMap<CourseId, String>, Error> {
        let courses = self
            .store()
            .list_all_preference_entries(student_id)
            .await
            .map_err(Error::storage)?;
        Ok(into_map(courses))
    }

    /// Returns the registration flag set by `register_courses`.
    #[instrument(skip(self), err)]
    pub async fn is_student_registered(&self, student_id: StudentId) -> Result<bool, Error> {
        self.store()
            .registration_flag(student_id)
            .await
            .map_err(Error::storage)
    }
}

fn into_map(courses: Vec<Course>) -> HashMap<CourseId, String> {
    courses
        .into_iter()
        .map(|course| (course.course_id, course.name))
        .collect()
}
