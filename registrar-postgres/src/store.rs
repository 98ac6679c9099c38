//! PostgreSQL Registration Store
//!
//! This module provides an implementation of the `RegistrationStore` trait using PostgreSQL as the
//! underlying storage. Every save runs in a single transaction that first bumps the revision of
//! the student, failing with `Error::Concurrency` when the revision moved since the hydration.

use async_trait::async_trait;
use registrar::domain::{
    Course, Enrollment, EnrollmentChange, EnrollmentQuery, GradeRecord, PreferenceEntry, Rank,
    Student, StudentId,
};
use registrar::{Hydrated, RegistrationStore, Revision};
use sqlx::{FromRow, PgPool};
use tracing::debug;

use crate::Error;

/// PostgreSQL registration store implementation.
#[derive(Clone)]
pub struct PgRegistrationStore {
    pool: PgPool,
}

impl PgRegistrationStore {
    /// Creates a new instance of `PgRegistrationStore`.
    ///
    /// The database must have been initialized with [`crate::setup`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Initializes the PostgreSQL DB and returns a new instance of `PgRegistrationStore`.
    pub async fn try_new(pool: PgPool) -> Result<Self, Error> {
        setup(&pool).await?;
        Ok(Self::new(pool))
    }
}

#[derive(FromRow)]
struct StudentRow {
    student_id: StudentId,
    email: String,
    name: String,
    approval: i32,
    registered: bool,
    revision: Revision,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Student {
            student_id: row.student_id,
            email: row.email,
            name: row.name,
            approval: row.approval,
            registered: row.registered,
        }
    }
}

#[derive(FromRow)]
struct PreferenceEntryRow {
    student_id: StudentId,
    course_id: String,
    #[sqlx(try_from = "i64")]
    rank: Rank,
    registered: bool,
}

impl From<PreferenceEntryRow> for PreferenceEntry {
    fn from(row: PreferenceEntryRow) -> Self {
        PreferenceEntry {
            student_id: row.student_id,
            course_id: row.course_id,
            rank: row.rank,
            registered: row.registered,
        }
    }
}

#[derive(FromRow)]
struct CourseRow {
    course_id: String,
    name: String,
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Course {
            course_id: row.course_id,
            name: row.name,
        }
    }
}

#[derive(FromRow)]
struct GradeRecordRow {
    student_id: StudentId,
    course_id: String,
    course_name: String,
    grade: String,
}

impl From<GradeRecordRow> for GradeRecord {
    fn from(row: GradeRecordRow) -> Self {
        GradeRecord {
            student_id: row.student_id,
            course_id: row.course_id,
            course_name: row.course_name,
            grade: row.grade,
        }
    }
}

#[async_trait]
impl RegistrationStore for PgRegistrationStore {
    type Error = Error;

    /// Loads the student, its preference entries and the queried courses.
    ///
    /// The student row is read first, so the revision returned is never newer than the entries
    /// read after it.
    async fn hydrate(&self, query: &EnrollmentQuery) -> Result<Hydrated<Enrollment>, Self::Error> {
        let student_id = query.student_id();
        let student = sqlx::query_as::<_, StudentRow>(
            "SELECT student_id, email, name, approval, registered, revision FROM student WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        let mut state = Enrollment::new(student_id);
        let mut revision = 0;
        if let Some(student) = student {
            revision = student.revision;
            state = state.with_student(student.into());
        }

        let entries = sqlx::query_as::<_, PreferenceEntryRow>(
            "SELECT student_id, course_id, rank, registered FROM preference_entry WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        for entry in entries {
            state = state.with_entry(entry.into());
        }

        if !query.courses().is_empty() {
            let courses = sqlx::query_as::<_, CourseRow>(
                "SELECT course_id, name FROM course WHERE course_id = ANY($1)",
            )
            .bind(query.courses())
            .fetch_all(&self.pool)
            .await?;
            for course in courses {
                state = state.with_course(course.into());
            }
        }

        Ok(Hydrated::new(state, revision))
    }

    /// Applies the changes in one transaction guarded by the revision of the student.
    ///
    /// External confirmations do not bump the revision, so a dropped entry reports the flag
    /// returned by the `DELETE` rather than the hydrated one.
    async fn save(
        &self,
        state: &Hydrated<Enrollment>,
        mut changes: Vec<EnrollmentChange>,
    ) -> Result<Vec<EnrollmentChange>, Self::Error> {
        if changes.is_empty() {
            return Ok(changes);
        }

        let student_id = state.student_id();
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query(
            "UPDATE student SET revision = revision + 1 WHERE student_id = $1 AND revision = $2",
        )
        .bind(student_id)
        .bind(state.revision())
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if updated == 0 {
            return Err(Error::Concurrency);
        }

        for change in &mut changes {
            if change.student_id() != student_id {
                return Err(Error::UnexpectedStudent {
                    expected: student_id,
                    found: change.student_id(),
                });
            }
            debug!(?change, "applying change");
            match change {
                EnrollmentChange::PreferenceAdded {
                    course_id, rank, ..
                } => {
                    sqlx::query(
                        "INSERT INTO preference_entry (student_id, course_id, rank, registered) VALUES ($1, $2, $3, false)",
                    )
                    .bind(student_id)
                    .bind(&*course_id)
                    .bind(i64::from(*rank))
                    .execute(&mut *tx)
                    .await
                    .map_err(map_concurrency_err)?;
                }
                EnrollmentChange::PreferenceDropped {
                    course_id,
                    registered,
                    ..
                } => {
                    let deleted: Option<bool> = sqlx::query_scalar(
                        "DELETE FROM preference_entry WHERE student_id = $1 AND course_id = $2 RETURNING registered",
                    )
                    .bind(student_id)
                    .bind(&*course_id)
                    .fetch_optional(&mut *tx)
                    .await?;
                    *registered = deleted.ok_or(Error::Concurrency)?;
                }
                EnrollmentChange::RegistrationTriggered { .. } => {
                    sqlx::query("UPDATE student SET registered = true WHERE student_id = $1")
                        .bind(student_id)
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }

        tx.commit().await?;

        Ok(changes)
    }

    async fn list_courses(&self) -> Result<Vec<Course>, Self::Error> {
        let courses = sqlx::query_as::<_, CourseRow>("SELECT course_id, name FROM course")
            .fetch_all(&self.pool)
            .await?;
        Ok(courses.into_iter().map(Course::from).collect())
    }

    async fn list_all_preference_entries(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<Course>, Self::Error> {
        let courses = sqlx::query_as::<_, CourseRow>(
            "SELECT c.course_id, c.name FROM preference_entry p JOIN course c ON c.course_id = p.course_id WHERE p.student_id = $1",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(courses.into_iter().map(Course::from).collect())
    }

    async fn list_confirmed_preference_entries(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<Course>, Self::Error> {
        let courses = sqlx::query_as::<_, CourseRow>(
            "SELECT c.course_id, c.name FROM preference_entry p JOIN course c ON c.course_id = p.course_id WHERE p.student_id = $1 AND p.registered",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(courses.into_iter().map(Course::from).collect())
    }

    async fn count_confirmed_preference_entries(
        &self,
        student_id: StudentId,
    ) -> Result<usize, Self::Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM preference_entry WHERE student_id = $1 AND registered",
        )
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;
        usize::try_from(count).map_err(|err| Error::Database(sqlx::Error::Decode(Box::new(err))))
    }

    /// Lists the grades of the student in the order they were recorded.
    async fn list_grade_records(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<GradeRecord>, Self::Error> {
        let grades = sqlx::query_as::<_, GradeRecordRow>(
            "SELECT g.student_id, g.course_id, c.name AS course_name, g.grade FROM grade_record g JOIN course c ON c.course_id = g.course_id WHERE g.student_id = $1 ORDER BY g.grade_id",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(grades.into_iter().map(GradeRecord::from).collect())
    }

    async fn approval_flag(&self, student_id: StudentId) -> Result<i32, Self::Error> {
        let approval: Option<i32> =
            sqlx::query_scalar("SELECT approval FROM student WHERE student_id = $1")
                .bind(student_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(approval.unwrap_or(0))
    }

    async fn registration_flag(&self, student_id: StudentId) -> Result<bool, Self::Error> {
        let registered: Option<bool> =
            sqlx::query_scalar("SELECT registered FROM student WHERE student_id = $1")
                .bind(student_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(registered.unwrap_or(false))
    }

    async fn resolve_student_id_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StudentId>, Self::Error> {
        Ok(
            sqlx::query_scalar("SELECT student_id FROM student WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?,
        )
    }
}

pub async fn setup(pool: &PgPool) -> Result<(), Error> {
    sqlx::query(include_str!("store/sql/table_student.sql"))
        .execute(pool)
        .await?;
    sqlx::query(include_str!("store/sql/table_course.sql"))
        .execute(pool)
        .await?;
    sqlx::query(include_str!("store/sql/table_preference_entry.sql"))
        .execute(pool)
        .await?;
    sqlx::query(include_str!(
        "store/sql/idx_preference_entry_registered.sql"
    ))
    .execute(pool)
    .await?;
    sqlx::query(include_str!("store/sql/table_grade_record.sql"))
        .execute(pool)
        .await?;
    sqlx::query(include_str!("store/sql/idx_grade_record_student_id.sql"))
        .execute(pool)
        .await?;
    Ok(())
}

fn map_concurrency_err(err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(ref description) = err {
        if description.code().as_deref() == Some("23505") {
            return Error::Concurrency;
        }
    }
    Error::Database(err)
}
