use serde::{Deserialize, Serialize};

use super::{CourseId, StudentId};

/// Preference rank given by the student to a course. Lower is preferred.
pub type Rank = u32;

/// A course selected by a student.
///
/// While `registered` is false the entry is a pending preference; the
/// administrative confirmation turns it into a registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceEntry {
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub rank: Rank,
    pub registered: bool,
}

impl PreferenceEntry {
    pub fn new(student_id: StudentId, course_id: &str, rank: Rank) -> Self {
        Self {
            student_id,
            course_id: course_id.into(),
            rank,
            registered: false,
        }
    }

    pub fn confirmed(mut self) -> Self {
        self.registered = true;
        self
    }
}
