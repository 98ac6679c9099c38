#![doc(hidden)]

use async_trait::async_trait;
use mockall::mock;

use crate::domain::{
    Course, Enrollment, EnrollmentChange, EnrollmentQuery, GradeRecord, StudentId,
};
use crate::memory::MemoryStoreError;
use crate::store::{Hydrated, RegistrationStore};

mock! {
    pub Store {}
    #[async_trait]
    impl RegistrationStore for Store {
        type Error = MemoryStoreError;

        async fn hydrate(&self, query: &EnrollmentQuery) -> Result<Hydrated<Enrollment>, MemoryStoreError>;
        async fn save(
            &self,
            state: &Hydrated<Enrollment>,
            changes: Vec<EnrollmentChange>,
        ) -> Result<Vec<EnrollmentChange>, MemoryStoreError>;
        async fn list_courses(&self) -> Result<Vec<Course>, MemoryStoreError>;
        async fn list_all_preference_entries(&self, student_id: StudentId) -> Result<Vec<Course>, MemoryStoreError>;
        async fn list_confirmed_preference_entries(&self, student_id: StudentId) -> Result<Vec<Course>, MemoryStoreError>;
        async fn count_confirmed_preference_entries(&self, student_id: StudentId) -> Result<usize, MemoryStoreError>;
        async fn list_grade_records(&self, student_id: StudentId) -> Result<Vec<GradeRecord>, MemoryStoreError>;
        async fn approval_flag(&self, student_id: StudentId) -> Result<i32, MemoryStoreError>;
        async fn registration_flag(&self, student_id: StudentId) -> Result<bool, MemoryStoreError>;
        async fn resolve_student_id_by_email(&self, email: &str) -> Result<Option<StudentId>, MemoryStoreError>;
    }
}
