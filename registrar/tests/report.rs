use assert2::{check, let_assert};
use registrar::domain::{Course, GradeRecord, ReportCardEntry, Student};
use registrar::{ErrorKind, InMemoryStore, ReportAggregator};

async fn store() -> InMemoryStore {
    let store = InMemoryStore::new();
    store
        .insert_student(Student::new(1, "ada@example.com", "Ada"))
        .await;
    store
        .insert_student(Student::new(2, "grace@example.com", "Grace").approved())
        .await;
    store
        .insert_course(Course::new("CS101", "Programming I"))
        .await;
    store
        .insert_course(Course::new("CS102", "Programming II"))
        .await;
    store
}

#[tokio::test]
async fn the_catalog_lists_every_course() {
    let reports = ReportAggregator::new(store().await);

    let mut catalog = reports.view_course_catalog().await.unwrap();
    catalog.sort_by(|a, b| a.course_id.cmp(&b.course_id));

    check!(
        catalog
            == [
                Course::new("CS101", "Programming I"),
                Course::new("CS102", "Programming II")
            ]
    );
}

#[tokio::test]
async fn an_unapproved_student_cannot_view_the_report_card() {
    let reports = ReportAggregator::new(store().await);

    let_assert!(Err(err) = reports.view_report_card(1).await);
    check!(err.kind() == ErrorKind::UserNotApproved);

    let_assert!(Err(err) = reports.view_report_card(42).await);
    check!(err.kind() == ErrorKind::UserNotApproved);
}

#[tokio::test]
async fn the_report_card_of_a_student_without_grades_is_empty() {
    let reports = ReportAggregator::new(store().await);

    let report_card = reports.view_report_card(2).await.unwrap();

    check!(report_card.student_id == 2);
    check!(report_card.is_empty());
}

#[tokio::test]
async fn the_report_card_lists_the_grades_of_the_student() {
    let store = store().await;
    store
        .record_grade(GradeRecord::new(2, "CS101", "Programming I", "A"))
        .await;
    store
        .record_grade(GradeRecord::new(1, "CS102", "Programming II", "C"))
        .await;
    store
        .record_grade(GradeRecord::new(2, "CS102", "Programming II", "B+"))
        .await;
    let reports = ReportAggregator::new(store);

    let report_card = reports.view_report_card(2).await.unwrap();

    check!(
        report_card.entries
            == [
                ReportCardEntry {
                    course_id: "CS101".into(),
                    course_name: "Programming I".into(),
                    grade: "A".into(),
                },
                ReportCardEntry {
                    course_id: "CS102".into(),
                    course_name: "Programming II".into(),
                    grade: "B+".into(),
                },
            ]
    );
}

#[tokio::test]
async fn students_are_resolved_by_email() {
    let reports = ReportAggregator::new(store().await);

    check!(reports.get_student_by_email("grace@example.com").await.unwrap() == Some(2));
    check!(reports.get_student_by_email("nobody@example.com").await.unwrap() == None);
}
