use serde::{Deserialize, Serialize};

pub type StudentId = i64;

/// A student account as seen by the registration workflow.
///
/// `approval` and `registered` are owned by external processes: the approval
/// flag by the identity service, the registration flag by the administrative
/// registration trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub student_id: StudentId,
    pub email: String,
    pub name: String,
    pub approval: i32,
    pub registered: bool,
}

impl Student {
    pub fn new(student_id: StudentId, email: &str, name: &str) -> Self {
        Self {
            student_id,
            email: email.into(),
            name: name.into(),
            approval: 0,
            registered: false,
        }
    }

    pub fn approved(mut self) -> Self {
        self.approval = 1;
        self
    }

    /// A student may view courses and grades once the approval flag reaches 1.
    pub fn is_approved(&self) -> bool {
        is_approved(self.approval)
    }
}

pub(crate) fn is_approved(approval: i32) -> bool {
    approval >= 1
}
