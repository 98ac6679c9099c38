//! In-memory implementation of the registration store.
//!
//! Records are kept in tables protected by a single `RwLock`. The store is cheap to clone and
//! every clone shares the same tables. Besides the store operations it exposes the fixtures
//! needed to seed the records owned by external systems: students, the catalog, approvals,
//! confirmations and grades.
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::{
    Course, CourseId, Enrollment, EnrollmentChange, EnrollmentQuery, GradeRecord,
    PreferenceEntry, Student, StudentId,
};
use crate::store::{Hydrated, RegistrationStore, Revision};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MemoryStoreError {
    #[error("student {0} was modified concurrently")]
    Concurrency(StudentId),
    #[error("student {0} not found")]
    StudentNotFound(StudentId),
    #[error("course {0} not found")]
    CourseNotFound(CourseId),
    #[error("no preference entry of student {student_id} for course {course_id}")]
    PreferenceNotFound {
        student_id: StudentId,
        course_id: CourseId,
    },
    #[error("student {student_id} already has a preference entry for course {course_id}")]
    DuplicateEntry {
        student_id: StudentId,
        course_id: CourseId,
    },
    #[error("change of student {found} saved on the state of student {expected}")]
    UnexpectedStudent {
        expected: StudentId,
        found: StudentId,
    },
}

#[derive(Debug, Clone)]
struct StudentRow {
    student: Student,
    revision: Revision,
}

#[derive(Debug, Default)]
struct Tables {
    students: BTreeMap<StudentId, StudentRow>,
    courses: BTreeMap<CourseId, Course>,
    entries: Vec<PreferenceEntry>,
    grades: Vec<GradeRecord>,
}

impl Tables {
    fn student_courses<'a>(
        &'a self,
        student_id: StudentId,
        confirmed_only: bool,
    ) -> impl Iterator<Item = Course> + 'a {
        self.entries
            .iter()
            .filter(move |entry| {
                entry.student_id == student_id && (!confirmed_only || entry.registered)
            })
            .filter_map(move |entry| self.courses.get(&entry.course_id).cloned())
    }

    fn bump_revision(&mut self, student_id: StudentId) {
        if let Some(row) = self.students.get_mut(&student_id) {
            row.revision += 1;
        }
    }
}

/// A registration store keeping every record in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a student. A replaced student keeps its preference entries.
    pub async fn insert_student(&self, student: Student) {
        let mut tables = self.tables.write().await;
        let revision = tables
            .students
            .get(&student.student_id)
            .map_or(0, |row| row.revision + 1);
        tables
            .students
            .insert(student.student_id, StudentRow { student, revision });
    }

    /// Inserts or replaces a course of the catalog.
    pub async fn insert_course(&self, course: Course) {
        self.tables
            .write()
            .await
            .courses
            .insert(course.course_id.clone(), course);
    }

    /// Sets the approval flag of a student, as the identity service would.
    pub async fn set_approval(
        &self,
        student_id: StudentId,
        approval: i32,
    ) -> Result<(), MemoryStoreError> {
        let mut tables = self.tables.write().await;
        let row = tables
            .students
            .get_mut(&student_id)
            .ok_or(MemoryStoreError::StudentNotFound(student_id))?;
        row.student.approval = approval;
        row.revision += 1;
        Ok(())
    }

    /// Turns a pending preference into a confirmed registration, as the
    /// administrative confirmation would.
    pub async fn confirm_preference(
        &self,
        student_id: StudentId,
        course_id: &str,
    ) -> Result<(), MemoryStoreError> {
        let mut tables = self.tables.write().await;
        let entry = tables
            .entries
            .iter_mut()
            .find(|entry| entry.student_id == student_id && entry.course_id == course_id)
            .ok_or_else(|| MemoryStoreError::PreferenceNotFound {
                student_id,
                course_id: course_id.into(),
            })?;
        entry.registered = true;
        tables.bump_revision(student_id);
        Ok(())
    }

    /// Records a grade of a student.
    pub async fn record_grade(&self, grade: GradeRecord) {
        self.tables.write().await.grades.push(grade);
    }
}

#[async_trait]
impl RegistrationStore for InMemoryStore {
    type Error = MemoryStoreError;

    async fn hydrate(&self, query: &EnrollmentQuery) -> Result<Hydrated<Enrollment>, Self::Error> {
        let tables = self.tables.read().await;
        let student_id = query.student_id();
        let mut state = Enrollment::new(student_id);
        let mut revision = 0;

        if let Some(row) = tables.students.get(&student_id) {
            state = state.with_student(row.student.clone());
            revision = row.revision;
        }
        for entry in tables
            .entries
            .iter()
            .filter(|entry| entry.student_id == student_id)
        {
            state = state.with_entry(entry.clone());
        }
        for course_id in query.courses() {
            if let Some(course) = tables.courses.get(course_id) {
                state = state.with_course(course.clone());
            }
        }

        Ok(Hydrated::new(state, revision))
    }

    async fn save(
        &self,
        state: &Hydrated<Enrollment>,
        mut changes: Vec<EnrollmentChange>,
    ) -> Result<Vec<EnrollmentChange>, Self::Error> {
        if changes.is_empty() {
            return Ok(changes);
        }

        let student_id = state.student_id();
        let mut tables = self.tables.write().await;
        let row = tables
            .students
            .get(&student_id)
            .ok_or(MemoryStoreError::StudentNotFound(student_id))?;
        if row.revision != state.revision() {
            return Err(MemoryStoreError::Concurrency(student_id));
        }

        let mut student = row.student.clone();
        let mut entries = tables.entries.clone();
        for change in &mut changes {
            if change.student_id() != student_id {
                return Err(MemoryStoreError::UnexpectedStudent {
                    expected: student_id,
                    found: change.student_id(),
                });
            }
            debug!(?change, "applying change");
            match change {
                EnrollmentChange::PreferenceAdded {
                    course_id, rank, ..
                } => {
                    let course_id = &*course_id;
                    if !tables.courses.contains_key(course_id) {
                        return Err(MemoryStoreError::CourseNotFound(course_id.clone()));
                    }
                    if entries
                        .iter()
                        .any(|entry| entry.student_id == student_id && &entry.course_id == course_id)
                    {
                        return Err(MemoryStoreError::DuplicateEntry {
                            student_id,
                            course_id: course_id.clone(),
                        });
                    }
                    entries.push(PreferenceEntry::new(student_id, course_id, *rank));
                }
                EnrollmentChange::PreferenceDropped {
                    course_id,
                    registered,
                    ..
                } => {
                    let position = entries
                        .iter()
                        .position(|entry| {
                            entry.student_id == student_id && &entry.course_id == course_id
                        })
                        .ok_or_else(|| MemoryStoreError::PreferenceNotFound {
                            student_id,
                            course_id: course_id.clone(),
                        })?;
                    *registered = entries.remove(position).registered;
                }
                EnrollmentChange::RegistrationTriggered { .. } => {
                    student.registered = true;
                }
            }
        }

        tables.entries = entries;
        tables.students.insert(
            student_id,
            StudentRow {
                student,
                revision: state.revision() + 1,
            },
        );
        Ok(changes)
    }

    async fn list_courses(&self) -> Result<Vec<Course>, Self::Error> {
        Ok(self.tables.read().await.courses.values().cloned().collect())
    }

    async fn list_all_preference_entries(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<Course>, Self::Error> {
        Ok(self
            .tables
            .read()
            .await
            .student_courses(student_id, false)
            .collect())
    }

    async fn list_confirmed_preference_entries(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<Course>, Self::Error> {
        Ok(self
            .tables
            .read()
            .await
            .student_courses(student_id, true)
            .collect())
    }

    async fn count_confirmed_preference_entries(
        &self,
        student_id: StudentId,
    ) -> Result<usize, Self::Error> {
        Ok(self
            .tables
            .read()
            .await
            .entries
            .iter()
            .filter(|entry| entry.student_id == student_id && entry.registered)
            .count())
    }

    async fn list_grade_records(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<GradeRecord>, Self::Error> {
        Ok(self
            .tables
            .read()
            .await
            .grades
            .iter()
            .filter(|grade| grade.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn approval_flag(&self, student_id: StudentId) -> Result<i32, Self::Error> {
        Ok(self
            .tables
            .read()
            .await
            .students
            .get(&student_id)
            .map_or(0, |row| row.student.approval))
    }

    async fn registration_flag(&self, student_id: StudentId) -> Result<bool, Self::Error> {
        Ok(self
            .tables
            .read()
            .await
            .students
            .get(&student_id)
            .is_some_and(|row| row.student.registered))
    }

    async fn resolve_student_id_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StudentId>, Self::Error> {
        Ok(self
            .tables
            .read()
            .await
            .students
            .values()
            .find(|row| row.student.email == email)
            .map(|row| row.student.student_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> InMemoryStore {
        let store = InMemoryStore::new();
        store
            .insert_student(Student::new(1, "ada@example.com", "Ada"))
            .await;
        store
            .insert_course(Course::new("CS101", "Programming I"))
            .await;
        store
            .insert_course(Course::new("CS102", "Programming II"))
            .await;
        store
    }

    fn added(course_id: &str) -> EnrollmentChange {
        EnrollmentChange::PreferenceAdded {
            student_id: 1,
            course_id: course_id.into(),
            rank: 1,
        }
    }

    #[tokio::test]
    async fn it_hydrates_the_student_and_the_queried_courses() {
        let store = store().await;

        let state = store
            .hydrate(&EnrollmentQuery::new(1).with_courses(["CS101".to_string(), "CS999".to_string()]))
            .await
            .unwrap();

        assert_eq!(state.revision(), 0);
        assert!(state.student().is_some());
        assert!(state.course("CS101").is_some());
        assert!(state.course("CS102").is_none());
        assert!(state.course("CS999").is_none());
    }

    #[tokio::test]
    async fn it_hydrates_an_empty_state_for_an_unknown_student() {
        let store = store().await;

        let state = store.hydrate(&EnrollmentQuery::new(42)).await.unwrap();

        assert!(state.student().is_none());
        assert!(state.entries().is_empty());
    }

    #[tokio::test]
    async fn it_saves_changes_and_bumps_the_revision() {
        let store = store().await;
        let state = store.hydrate(&EnrollmentQuery::new(1)).await.unwrap();

        store
            .save(&state, vec![added("CS101"), added("CS102")])
            .await
            .unwrap();

        let state = store.hydrate(&EnrollmentQuery::new(1)).await.unwrap();
        assert_eq!(state.revision(), 1);
        assert_eq!(state.entries().len(), 2);
    }

    #[tokio::test]
    async fn it_should_reject_a_save_on_a_stale_revision() {
        let store = store().await;
        let stale = store.hydrate(&EnrollmentQuery::new(1)).await.unwrap();
        let current = store.hydrate(&EnrollmentQuery::new(1)).await.unwrap();
        store.save(&current, vec![added("CS101")]).await.unwrap();

        let result = store.save(&stale, vec![added("CS102")]).await;

        assert_eq!(result, Err(MemoryStoreError::Concurrency(1)));
        assert_eq!(store.list_all_preference_entries(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn it_writes_nothing_when_a_change_fails() {
        let store = store().await;
        let state = store.hydrate(&EnrollmentQuery::new(1)).await.unwrap();

        let result = store
            .save(&state, vec![added("CS101"), added("CS999")])
            .await;

        assert_eq!(result, Err(MemoryStoreError::CourseNotFound("CS999".into())));
        assert!(store.list_all_preference_entries(1).await.unwrap().is_empty());
        let state = store.hydrate(&EnrollmentQuery::new(1)).await.unwrap();
        assert_eq!(state.revision(), 0);
    }

    #[tokio::test]
    async fn it_keeps_the_revision_when_there_is_nothing_to_save() {
        let store = store().await;
        let state = store.hydrate(&EnrollmentQuery::new(1)).await.unwrap();

        let saved = store.save(&state, Vec::new()).await.unwrap();

        assert!(saved.is_empty());
        let state = store.hydrate(&EnrollmentQuery::new(1)).await.unwrap();
        assert_eq!(state.revision(), 0);
    }

    #[tokio::test]
    async fn it_invalidates_hydrated_states_on_confirmation() {
        let store = store().await;
        let state = store.hydrate(&EnrollmentQuery::new(1)).await.unwrap();
        store.save(&state, vec![added("CS101")]).await.unwrap();
        let state = store.hydrate(&EnrollmentQuery::new(1)).await.unwrap();

        store.confirm_preference(1, "CS101").await.unwrap();

        let result = store
            .save(
                &state,
                vec![EnrollmentChange::PreferenceDropped {
                    student_id: 1,
                    course_id: "CS101".into(),
                    registered: false,
                }],
            )
            .await;
        assert_eq!(result, Err(MemoryStoreError::Concurrency(1)));
        assert_eq!(store.count_confirmed_preference_entries(1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn it_reports_the_flag_of_the_dropped_entry() {
        let store = store().await;
        let state = store.hydrate(&EnrollmentQuery::new(1)).await.unwrap();
        store.save(&state, vec![added("CS101")]).await.unwrap();
        store.confirm_preference(1, "CS101").await.unwrap();
        let state = store.hydrate(&EnrollmentQuery::new(1)).await.unwrap();

        let saved = store
            .save(
                &state,
                vec![EnrollmentChange::PreferenceDropped {
                    student_id: 1,
                    course_id: "CS101".into(),
                    registered: false,
                }],
            )
            .await
            .unwrap();

        assert_eq!(
            saved,
            [EnrollmentChange::PreferenceDropped {
                student_id: 1,
                course_id: "CS101".into(),
                registered: true,
            }]
        );
        assert!(store.list_all_preference_entries(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn it_should_reject_changes_of_another_student() {
        let store = store().await;
        store
            .insert_student(Student::new(2, "grace@example.com", "Grace"))
            .await;
        let state = store.hydrate(&EnrollmentQuery::new(1)).await.unwrap();

        let result = store
            .save(
                &state,
                vec![EnrollmentChange::RegistrationTriggered { student_id: 2 }],
            )
            .await;

        assert_eq!(
            result,
            Err(MemoryStoreError::UnexpectedStudent {
                expected: 1,
                found: 2
            })
        );
        assert!(!store.registration_flag(2).await.unwrap());
    }

    #[tokio::test]
    async fn it_reads_flags_of_unknown_students_as_unset() {
        let store = store().await;

        assert_eq!(store.approval_flag(42).await.unwrap(), 0);
        assert!(!store.registration_flag(42).await.unwrap());
        assert_eq!(
            store.resolve_student_id_by_email("nobody@example.com").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn it_should_not_confirm_a_missing_preference() {
        let store = store().await;

        assert_eq!(
            store.confirm_preference(1, "CS101").await,
            Err(MemoryStoreError::PreferenceNotFound {
                student_id: 1,
                course_id: "CS101".into()
            })
        );
    }
}
