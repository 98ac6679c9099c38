use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Course, CourseId, PreferenceEntry, Student, StudentId};

/// Number of confirmed registrations that makes a student fully registered.
pub const REGISTRATION_THRESHOLD: usize = 4;

/// Describes the state a decision needs: the student and the catalog courses it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentQuery {
    student_id: StudentId,
    courses: Vec<CourseId>,
}

impl EnrollmentQuery {
    pub fn new(student_id: StudentId) -> Self {
        Self {
            student_id,
            courses: Vec::new(),
        }
    }

    pub fn with_courses(mut self, courses: impl IntoIterator<Item = CourseId>) -> Self {
        self.courses.extend(courses);
        self
    }

    pub fn student_id(&self) -> StudentId {
        self.student_id
    }

    pub fn courses(&self) -> &[CourseId] {
        &self.courses
    }
}

/// The enrollment of a student: the student record, all of its preference
/// entries, and the catalog courses named by the query that hydrated it.
///
/// `student` is `None` when the student does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    student_id: StudentId,
    student: Option<Student>,
    entries: Vec<PreferenceEntry>,
    catalog: BTreeMap<CourseId, Course>,
}

impl Enrollment {
    pub fn new(student_id: StudentId) -> Self {
        Self {
            student_id,
            student: None,
            entries: Vec::new(),
            catalog: BTreeMap::new(),
        }
    }

    pub fn with_student(mut self, student: Student) -> Self {
        self.student = Some(student);
        self
    }

    pub fn with_entry(mut self, entry: PreferenceEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn with_course(mut self, course: Course) -> Self {
        self.catalog.insert(course.course_id.clone(), course);
        self
    }

    pub fn student_id(&self) -> StudentId {
        self.student_id
    }

    pub fn student(&self) -> Option<&Student> {
        self.student.as_ref()
    }

    pub fn entries(&self) -> &[PreferenceEntry] {
        &self.entries
    }

    pub fn entry(&self, course_id: &str) -> Option<&PreferenceEntry> {
        self.entries.iter().find(|entry| entry.course_id == course_id)
    }

    /// Looks up a course among the ones resolved by the query.
    pub fn course(&self, course_id: &str) -> Option<&Course> {
        self.catalog.get(course_id)
    }

    /// Drops every catalog course the query does not name.
    pub(crate) fn restrict_to(&mut self, query: &EnrollmentQuery) {
        self.catalog
            .retain(|course_id, _| query.courses().contains(course_id));
    }
}
