use serde::{Deserialize, Serialize};

use super::{CourseId, StudentId};

/// A grade assigned to a student for a course they attended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeRecord {
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub course_name: String,
    pub grade: String,
}

impl GradeRecord {
    pub fn new(student_id: StudentId, course_id: &str, course_name: &str, grade: &str) -> Self {
        Self {
            student_id,
            course_id: course_id.into(),
            course_name: course_name.into(),
            grade: grade.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCardEntry {
    pub course_id: CourseId,
    pub course_name: String,
    pub grade: String,
}

/// The grades of a student, in the order the store returned them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCard {
    pub student_id: StudentId,
    pub entries: Vec<ReportCardEntry>,
}

impl ReportCard {
    pub fn new(student_id: StudentId) -> Self {
        Self {
            student_id,
            entries: Vec::new(),
        }
    }

    pub fn add_grade(&mut self, course_id: CourseId, course_name: String, grade: String) {
        self.entries.push(ReportCardEntry {
            course_id,
            course_name,
            grade,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
