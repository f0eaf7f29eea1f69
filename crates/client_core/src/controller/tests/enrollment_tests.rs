use super::*;
use crate::controller::fake_gateway::{section, semester, user, Call, FakeGateway};
use shared::{
    domain::{SemesterId, StudentId},
    protocol::EligibleSectionsResult,
};

fn eligible(message: &str) -> EligibleSectionsResult {
    EligibleSectionsResult {
        message: message.to_string(),
        student: None,
        sections: vec![section("CS201", &["TUESDAY 9AM-11AM"]).with_course_id(CourseId(77))],
    }
}

#[tokio::test]
async fn teachers_cannot_enroll() {
    let gateway = Arc::new(FakeGateway::default());
    let err = EnrollmentController::new(gateway, user(9, Role::Teacher))
        .err()
        .expect("teacher rejected");
    assert_eq!(
        err,
        ControllerError::AccessDenied {
            view: "enrollment",
            role: Role::Teacher
        }
    );
}

#[tokio::test]
async fn student_open_selects_semester_without_fetching_sections() {
    let gateway = Arc::new(
        FakeGateway::default().with_semesters(vec![semester(2, "Spring 2025"), semester(3, "Fall 2025")]),
    );
    let controller =
        EnrollmentController::new(gateway.clone(), user(21, Role::Student)).expect("controller");

    controller.open().await;

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.filter.student_id, Some(StudentId(21)));
    assert_eq!(snapshot.filter.semester_id, Some(SemesterId(2)));
    assert_eq!(gateway.calls(), vec![Call::Semesters]);
    assert!(!snapshot.loading);
}

#[tokio::test]
async fn fetch_eligible_requires_student_and_semester() {
    let gateway = Arc::new(FakeGateway::default());
    let controller =
        EnrollmentController::new(gateway.clone(), user(1, Role::Admin)).expect("controller");

    controller.fetch_eligible().await;
    assert_eq!(
        controller.take_notices().await,
        vec![Notice::new(
            NoticeKind::MissingSelection,
            "Please enter a student ID (Admin only)"
        )]
    );

    // Enrolling without a selection is a silent no-op.
    assert!(!controller.enroll(CourseId(77)).await);
    assert!(controller.take_notices().await.is_empty());
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn successful_enrollment_notifies_and_refreshes() {
    let gateway = Arc::new(FakeGateway::default().with_eligible(eligible("Eligible sections found.")));
    let controller =
        EnrollmentController::new(gateway.clone(), user(1, Role::Admin)).expect("controller");
    controller
        .select_filter(FilterChange::Student(Some(StudentId(5))))
        .await;
    controller
        .select_filter(FilterChange::Semester(Some(SemesterId(2))))
        .await;

    assert!(controller.enroll(CourseId(77)).await);

    assert_eq!(
        controller.take_notices().await,
        vec![Notice::new(NoticeKind::Info, "Enrolled successfully!")]
    );
    assert_eq!(
        gateway.calls(),
        vec![
            Call::Enroll(StudentId(5), CourseId(77), SemesterId(2)),
            Call::Eligible(StudentId(5), SemesterId(2)),
        ]
    );
    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.sections.len(), 1);
    assert_eq!(snapshot.message.as_deref(), Some("Eligible sections found."));
}

#[tokio::test]
async fn failed_enrollment_carries_server_message_or_fallback() {
    let gateway = Arc::new(FakeGateway::default());
    let controller =
        EnrollmentController::new(gateway.clone(), user(5, Role::Student)).expect("controller");
    controller
        .select_filter(FilterChange::Semester(Some(SemesterId(2))))
        .await;

    gateway.fail_enroll("Section is full");
    assert!(!controller.enroll(CourseId(77)).await);
    assert_eq!(
        controller.take_notices().await,
        vec![Notice::new(NoticeKind::EnrollFailed, "Section is full")]
    );

    gateway.fail_enroll("");
    assert!(!controller.enroll(CourseId(77)).await);
    assert_eq!(
        controller.take_notices().await,
        vec![Notice::new(NoticeKind::EnrollFailed, "Enrollment failed.")]
    );
    assert!(!gateway
        .calls()
        .iter()
        .any(|call| matches!(call, Call::Eligible(..))));
}

#[tokio::test]
async fn eligible_failure_clears_sections() {
    let gateway = Arc::new(FakeGateway::default().with_eligible(eligible("ok")));
    let controller =
        EnrollmentController::new(gateway.clone(), user(5, Role::Student)).expect("controller");
    controller
        .select_filter(FilterChange::Semester(Some(SemesterId(2))))
        .await;
    controller.fetch_eligible().await;
    assert_eq!(controller.snapshot().await.sections.len(), 1);

    gateway.fail_eligible(true);
    controller.fetch_eligible().await;

    let snapshot = controller.snapshot().await;
    assert!(snapshot.sections.is_empty());
    assert_eq!(
        snapshot.message.as_deref(),
        Some("Failed to load eligible sections.")
    );
    let notices = controller.take_notices().await;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind(), NoticeKind::FetchFailed);
}

#[tokio::test]
async fn student_cannot_switch_student_id() {
    let gateway = Arc::new(FakeGateway::default());
    let controller =
        EnrollmentController::new(gateway, user(5, Role::Student)).expect("controller");

    controller
        .select_filter(FilterChange::Student(Some(StudentId(6))))
        .await;

    assert_eq!(
        controller.snapshot().await.filter.student_id,
        Some(StudentId(5))
    );
    assert_eq!(
        controller.take_notices().await[0].kind(),
        NoticeKind::NotPermitted
    );
}
