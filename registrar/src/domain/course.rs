use serde::{Deserialize, Serialize};

pub type CourseId = String;

/// A course of the catalog.
///
/// Also used as the read projection of preference entries, which only expose
/// the course id and its display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Course {
    pub course_id: CourseId,
    pub name: String,
}

impl Course {
    pub fn new(course_id: &str, name: &str) -> Self {
        Self {
            course_id: course_id.into(),
            name: name.into(),
        }
    }
}
