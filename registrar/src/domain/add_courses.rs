use std::collections::BTreeMap;

use super::{
    CourseId, Enrollment, EnrollmentChange, EnrollmentError, EnrollmentQuery, Rank, StudentId,
};
use crate::Decision;

/// Number of preference entries a student may already hold when adding more.
///
/// The check runs against the entries existing before the call, so a single
/// call starting at this limit can bring the student one entry over it.
pub const MAX_PREFERENCE_ENTRIES: usize = 6;

#[derive(Debug, Clone)]
pub struct AddCourses {
    pub student_id: StudentId,
    pub selections: BTreeMap<CourseId, Rank>,
}

impl AddCourses {
    pub fn new(student_id: StudentId, selections: BTreeMap<CourseId, Rank>) -> Self {
        Self {
            student_id,
            selections,
        }
    }
}

impl Decision for AddCourses {
    type Error = EnrollmentError;

    fn state_query(&self) -> EnrollmentQuery {
        EnrollmentQuery::new(self.student_id).with_courses(self.selections.keys().cloned())
    }

    fn process(&self, state: &Enrollment) -> Result<Vec<EnrollmentChange>, Self::Error> {
        if state.student().is_none() {
            return Err(EnrollmentError::StudentNotFound(self.student_id));
        }

        if state.entries().len() > MAX_PREFERENCE_ENTRIES {
            return Err(EnrollmentError::CourseLimitExceeded(self.student_id));
        }

        if let Some(course_id) = self
            .selections
            .keys()
            .find(|course_id| state.course(course_id).is_none())
        {
            return Err(EnrollmentError::CourseNotFound(course_id.clone()));
        }

        if let Some(course_id) = self
            .selections
            .keys()
            .find(|course_id| state.entry(course_id).is_some())
        {
            return Err(EnrollmentError::DuplicateCourseEntry {
                student_id: self.student_id,
                course_id: course_id.clone(),
            });
        }

        Ok(self
            .selections
            .iter()
            .map(|(course_id, rank)| EnrollmentChange::PreferenceAdded {
                student_id: self.student_id,
                course_id: course_id.clone(),
                rank: *rank,
            })
            .collect())
    }
}
