use super::{CourseId, Enrollment, EnrollmentChange, EnrollmentError, EnrollmentQuery, StudentId};
use crate::Decision;

#[derive(Debug, Clone)]
pub struct DropCourse {
    pub student_id: StudentId,
    pub course_id: CourseId,
}

impl DropCourse {
    pub fn new(student_id: StudentId, course_id: CourseId) -> Self {
        Self {
            student_id,
            course_id,
        }
    }
}

impl Decision for DropCourse {
    type Error = EnrollmentError;

    fn state_query(&self) -> EnrollmentQuery {
        EnrollmentQuery::new(self.student_id).with_courses([self.course_id.clone()])
    }

    fn process(&self, state: &Enrollment) -> Result<Vec<EnrollmentChange>, Self::Error> {
        if state.student().is_none() {
            return Err(EnrollmentError::StudentNotFound(self.student_id));
        }

        if state.course(&self.course_id).is_none() {
            return Err(EnrollmentError::CourseNotFound(self.course_id.clone()));
        }

        let Some(entry) = state.entry(&self.course_id) else {
            return Err(EnrollmentError::PreferenceNotFound {
                student_id: self.student_id,
                course_id: self.course_id.clone(),
            });
        };

        Ok(vec![EnrollmentChange::PreferenceDropped {
            student_id: self.student_id,
            course_id: self.course_id.clone(),
            registered: entry.registered,
        }])
    }
}
