use super::{Enrollment, EnrollmentChange, EnrollmentError, EnrollmentQuery, StudentId};
use crate::Decision;

/// Initiates the administrative registration of a student's courses.
#[derive(Debug, Clone)]
pub struct RegisterCourses {
    pub student_id: StudentId,
}

impl RegisterCourses {
    pub fn new(student_id: StudentId) -> Self {
        Self { student_id }
    }
}

impl Decision for RegisterCourses {
    type Error = EnrollmentError;

    fn state_query(&self) -> EnrollmentQuery {
        EnrollmentQuery::new(self.student_id)
    }

    fn process(&self, state: &Enrollment) -> Result<Vec<EnrollmentChange>, Self::Error> {
        if state.student().is_none() {
            return Err(EnrollmentError::StudentNotFound(self.student_id));
        }

        Ok(vec![EnrollmentChange::RegistrationTriggered {
            student_id: self.student_id,
        }])
    }
}
