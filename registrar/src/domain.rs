//! Students, courses, preference entries, grades and the decisions that change them.
mod add_courses;
mod course;
mod drop_course;
mod enrollment;
mod grade;
mod preference;
mod register_courses;
mod student;

pub use add_courses::{AddCourses, MAX_PREFERENCE_ENTRIES};
pub use course::{Course, CourseId};
pub use drop_course::DropCourse;
pub use enrollment::{Enrollment, EnrollmentQuery, REGISTRATION_THRESHOLD};
pub use grade::{GradeRecord, ReportCard, ReportCardEntry};
pub use preference::{PreferenceEntry, Rank};
pub use register_courses::RegisterCourses;
pub use student::{Student, StudentId};
pub(crate) use student::is_approved;

use serde::{Deserialize, Serialize};

/// A change to the enrollment of a student, produced by a decision and applied by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change_type", rename_all = "snake_case")]
pub enum EnrollmentChange {
    /// A pending preference entry has been created.
    PreferenceAdded {
        student_id: StudentId,
        course_id: CourseId,
        rank: Rank,
    },
    /// A preference entry has been removed. `registered` holds the flag it had before deletion.
    PreferenceDropped {
        student_id: StudentId,
        course_id: CourseId,
        registered: bool,
    },
    /// The administrative registration of the student has been initiated.
    RegistrationTriggered { student_id: StudentId },
}

impl EnrollmentChange {
    pub fn student_id(&self) -> StudentId {
        match self {
            EnrollmentChange::PreferenceAdded { student_id, .. }
            | EnrollmentChange::PreferenceDropped { student_id, .. }
            | EnrollmentChange::RegistrationTriggered { student_id } => *student_id,
        }
    }
}

/// Business rule violations detected while processing an enrollment decision.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnrollmentError {
    #[error("student {0} not found")]
    StudentNotFound(StudentId),
    #[error("course {0} not found")]
    CourseNotFound(CourseId),
    #[error("student {0} has too many courses")]
    CourseLimitExceeded(StudentId),
    #[error("student {student_id} already added course {course_id}")]
    DuplicateCourseEntry {
        student_id: StudentId,
        course_id: CourseId,
    },
    #[error("student {student_id} has not added course {course_id}")]
    PreferenceNotFound {
        student_id: StudentId,
        course_id: CourseId,
    },
}
