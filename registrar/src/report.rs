use tracing::{debug, instrument};

use crate::domain::{Course, ReportCard, StudentId};
use crate::error::Error;
use crate::store::{ensure_approved, RegistrationStore};

/// Read side of the registration workflow: catalog, student lookup and grade reports.
pub struct ReportAggregator<S> {
    store: S,
}

impl<S: RegistrationStore> ReportAggregator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[instrument(skip(self), err)]
    pub async fn view_course_catalog(&self) -> Result<Vec<Course>, Error> {
        self.store.list_courses().await.map_err(Error::storage)
    }

    /// Assembles the grade report of an approved student.
    ///
    /// A student without grades gets an empty report.
    #[instrument(skip(self), err)]
    pub async fn view_report_card(&self, student_id: StudentId) -> Result<ReportCard, Error> {
        ensure_approved(&self.store, student_id).await?;
        let grades = self
            .store
            .list_grade_records(student_id)
            .await
            .map_err(Error::storage)?;

        let mut report_card = ReportCard::new(student_id);
        for grade in grades {
            report_card.add_grade(grade.course_id, grade.course_name, grade.grade);
        }
        debug!(entries = report_card.entries.len(), "report card assembled");
        Ok(report_card)
    }

    /// Resolves the id of the student registered with `email`.
    #[instrument(skip(self), err)]
    pub async fn get_student_by_email(&self, email: &str) -> Result<Option<StudentId>, Error> {
        self.store
            .resolve_student_id_by_email(email)
            .await
            .map_err(Error::storage)
    }
}
