use super::*;
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::domain::{Role, TeacherId, UserId};
use std::{collections::HashMap, sync::Arc};
use tokio::{net::TcpListener, sync::Mutex};

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}")
}

fn section_json(course: &str, meetings: &[&str]) -> Value {
    json!({
        "course": course,
        "teacher": "Grace Hopper",
        "room": "R101",
        "schedule": meetings,
        "students": "12 (8 spots available)"
    })
}

#[tokio::test]
async fn login_maps_response_to_session_user() {
    let router = Router::new().route(
        "/api/v1/login",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["username"], "admin@school.test");
            assert_eq!(body["password"], "secret");
            Json(json!({"userId": 1, "role": "ADMIN", "name": "Admin User", "email": "admin@school.test"}))
        }),
    );
    let gateway = HttpGateway::new(serve(router).await);

    let user = gateway
        .login("admin@school.test", "secret")
        .await
        .expect("login");
    assert_eq!(user.user_id, UserId(1));
    assert_eq!(user.role, Role::Admin);
    assert_eq!(user.name, "Admin User");
}

#[tokio::test]
async fn login_without_role_is_rejected() {
    let router = Router::new().route(
        "/api/v1/login",
        post(|| async { Json(json!({"userId": 1, "name": "Nobody"})) }),
    );
    let gateway = HttpGateway::new(serve(router).await);

    let err = gateway.login("x", "y").await.expect_err("must fail");
    assert!(matches!(err, GatewayError::Rejected(ref m) if m == "Invalid login response."));
}

#[tokio::test]
async fn unauthorized_login_carries_server_message() {
    let router = Router::new().route(
        "/api/v1/login",
        post(|| async {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"message": "Invalid username/password"})),
            )
        }),
    );
    let gateway = HttpGateway::new(serve(router).await);

    let err = gateway.login("x", "y").await.expect_err("must fail");
    assert_eq!(err.server_message(), Some("Invalid username/password"));
    match err {
        GatewayError::Api(api) => {
            assert_eq!(api.status, 401);
            assert_eq!(api.code, shared::error::ErrorCode::Unauthorized);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn fetches_semesters_and_teachers_from_envelope() {
    let router = Router::new()
        .route(
            "/api/v1/semesters",
            get(|| async {
                Json(json!({"success": true, "result": [
                    {"id": 1, "label": "Fall 2024"},
                    {"id": 2, "label": "Spring 2025"}
                ]}))
            }),
        )
        .route(
            "/api/v1/teachers",
            get(|| async {
                Json(json!({"success": true, "result": [
                    {"id": 9, "firstName": "Grace", "lastName": "Hopper", "email": "grace@school.test"}
                ]}))
            }),
        );
    let gateway = HttpGateway::new(serve(router).await);

    let semesters = gateway.fetch_semesters().await.expect("semesters");
    assert_eq!(semesters.len(), 2);
    assert_eq!(semesters[1].label, "Spring 2025");

    let teachers = gateway.fetch_teachers().await.expect("teachers");
    assert_eq!(teachers[0].id, TeacherId(9));
    assert_eq!(teachers[0].display_name(), "Grace Hopper");
}

#[tokio::test]
async fn null_result_decodes_as_empty_list() {
    let router = Router::new().route(
        "/api/v1/semesters",
        get(|| async { Json(json!({"success": true, "result": null})) }),
    );
    let gateway = HttpGateway::new(serve(router).await);

    assert!(gateway.fetch_semesters().await.expect("semesters").is_empty());
}

#[tokio::test]
async fn master_schedule_keeps_section_order_and_caption() {
    let router = Router::new().route(
        "/api/v1/schedule/:semester_id",
        get(|Path(semester_id): Path<i64>| async move {
            assert_eq!(semester_id, 4);
            Json(json!({"success": true, "result": {
                "semester": "Fall 2024",
                "sections": [
                    section_json("MATH101 - Algebra", &["MONDAY 9AM-11AM"]),
                    section_json("ENG201 - Poetry", &["MONDAY 9AM-11AM", "FRIDAY 3PM-5PM"])
                ]
            }}))
        }),
    );
    let gateway = HttpGateway::new(serve(router).await);

    let listing = gateway
        .fetch_schedule(&ScheduleTarget::Master {
            semester_id: SemesterId(4),
        })
        .await
        .expect("master");
    assert_eq!(listing.caption.as_deref(), Some("Fall 2024"));
    let courses: Vec<_> = listing
        .sections
        .iter()
        .map(|s| s.course_label.as_str())
        .collect();
    assert_eq!(courses, vec!["MATH101 - Algebra", "ENG201 - Poetry"]);
    assert_eq!(
        listing.sections[0].enrollment_summary.as_deref(),
        Some("12 (8 spots available)")
    );
}

#[tokio::test]
async fn course_schedule_flattens_groups_in_code_order() {
    let router = Router::new().route(
        "/api/v1/schedule/courses/:semester_id",
        get(|| async {
            Json(json!({"success": true, "result": {
                "semesterId": 1,
                "courses": {
                    "SCI100": [section_json("SCI100 - Biology", &["TUESDAY 1PM-3PM"])],
                    "ART100": [
                        section_json("ART100 - Drawing", &["MONDAY 9AM-11AM"]),
                        section_json("ART100 - Drawing", &["WEDNESDAY 9AM-11AM"])
                    ]
                }
            }}))
        }),
    );
    let gateway = HttpGateway::new(serve(router).await);

    let listing = gateway
        .fetch_schedule(&ScheduleTarget::Course {
            semester_id: SemesterId(1),
        })
        .await
        .expect("courses");
    let courses: Vec<_> = listing
        .sections
        .iter()
        .map(|s| s.course_label.as_str())
        .collect();
    assert_eq!(
        courses,
        vec!["ART100 - Drawing", "ART100 - Drawing", "SCI100 - Biology"]
    );
}

#[tokio::test]
async fn teacher_and_student_schedules_carry_subject() {
    let router = Router::new()
        .route(
            "/api/v1/schedule/teacher/:teacher_id",
            get(|| async {
                Json(json!({"success": true, "result": {
                    "teacher": {"id": 9, "name": "Grace Hopper", "email": "grace@school.test"},
                    "schedule": [section_json("CS101", &["THURSDAY 11AM-12PM"])]
                }}))
            }),
        )
        .route(
            "/api/v1/enrollment/student/:student_id/schedule",
            get(
                |Path(student_id): Path<i64>, Query(query): Query<HashMap<String, String>>| async move {
                    assert_eq!(student_id, 21);
                    assert_eq!(query.get("semesterId").map(String::as_str), Some("3"));
                    Json(json!({"success": true, "result": {
                        "student": {"id": 21, "name": "Ada", "email": "ada@school.test", "Grade level": 10},
                        "sections": []
                    }}))
                },
            ),
        );
    let gateway = HttpGateway::new(serve(router).await);

    let teacher = gateway
        .fetch_schedule(&ScheduleTarget::Teacher {
            teacher_id: TeacherId(9),
        })
        .await
        .expect("teacher");
    assert_eq!(teacher.sections.len(), 1);
    assert_eq!(
        teacher.subject.as_ref().map(|p| p.name.as_str()),
        Some("Grace Hopper")
    );

    let student = gateway
        .fetch_schedule(&ScheduleTarget::Student {
            student_id: StudentId(21),
            semester_id: SemesterId(3),
        })
        .await
        .expect("student");
    assert!(student.sections.is_empty());
    let subject = student.subject.expect("student subject");
    assert_eq!(subject.grade_level_label().as_deref(), Some("10"));
}

#[tokio::test]
async fn server_error_maps_to_api_error() {
    let router = Router::new().route(
        "/api/v1/schedule/:semester_id",
        get(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"success": false, "message": "An unexpected error occurred.", "error": "Semester not found: 99"})),
            )
        }),
    );
    let gateway = HttpGateway::new(serve(router).await);

    let err = gateway
        .fetch_schedule(&ScheduleTarget::Master {
            semester_id: SemesterId(99),
        })
        .await
        .expect_err("must fail");
    match err {
        GatewayError::Api(api) => {
            assert_eq!(api.status, 500);
            assert_eq!(api.details.as_deref(), Some("Semester not found: 99"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let router = Router::new().route("/api/v1/semesters", get(|| async { "<html>oops</html>" }));
    let gateway = HttpGateway::new(serve(router).await);

    let err = gateway.fetch_semesters().await.expect_err("must fail");
    assert!(matches!(err, GatewayError::Decode { .. }));
}

#[tokio::test]
async fn generate_and_enroll_post_expected_payloads() {
    let enrolled = Arc::new(Mutex::new(None::<Value>));
    let enrolled_in_handler = Arc::clone(&enrolled);
    let router = Router::new()
        .route(
            "/api/v1/schedule/generate",
            post(|Query(query): Query<HashMap<String, String>>| async move {
                assert_eq!(query.get("semesterId").map(String::as_str), Some("2"));
                Json(json!({"success": true, "generatedSections": 14}))
            }),
        )
        .route(
            "/api/v1/enrollment",
            post(move |Json(body): Json<Value>| {
                let enrolled = Arc::clone(&enrolled_in_handler);
                async move {
                    *enrolled.lock().await = Some(body);
                    Json(json!({"success": true, "result": {"message": "ok"}}))
                }
            }),
        );
    let gateway = HttpGateway::new(serve(router).await);

    let report = gateway
        .generate_master_schedule(SemesterId(2))
        .await
        .expect("generate");
    assert_eq!(report.generated_sections, 14);

    gateway
        .enroll(StudentId(5), CourseId(77), SemesterId(2))
        .await
        .expect("enroll");
    let body = enrolled.lock().await.clone().expect("enroll body");
    assert_eq!(body, json!({"studentId": 5, "courseId": 77, "semesterId": 2}));
}

#[tokio::test]
async fn eligible_sections_include_message_and_course_ids() {
    let router = Router::new().route(
        "/api/v1/enrollment/student/:student_id/eligible",
        get(|| async {
            Json(json!({"success": true, "result": {
                "message": "Eligible sections found.",
                "student": {"id": 5, "name": "Ada", "email": "ada@school.test", "gradeLevel": 11},
                "sections": [{
                    "sectionId": 31, "courseId": 77, "course": "CS201 - Data Structures",
                    "teacher": "Grace Hopper", "email": "grace@school.test", "room": "Lab 2",
                    "schedule": ["TUESDAY 9AM-11AM"]
                }]
            }}))
        }),
    );
    let gateway = HttpGateway::new(serve(router).await);

    let eligible = gateway
        .fetch_eligible_sections(StudentId(5), SemesterId(2))
        .await
        .expect("eligible");
    assert_eq!(eligible.message, "Eligible sections found.");
    assert_eq!(eligible.sections[0].course_id, Some(CourseId(77)));
    assert_eq!(
        eligible.sections[0].teacher_email.as_deref(),
        Some("grace@school.test")
    );
}

#[tokio::test]
async fn progress_transcript_and_analytics_decode() {
    let router = Router::new()
        .route(
            "/api/v1/student/academic/:student_id/progress",
            get(|| async {
                Json(json!({"success": true, "result": {
                    "success": true,
                    "student": {"id": 5, "name": "Ada", "email": "ada@school.test", "gradeLevel": 11},
                    "progress": {
                        "creditsEarned": 18.5, "creditsRequired": 30, "creditsRemaining": 11.5,
                        "corePassed": 4, "coreRequired": 6, "gpa": 3.42,
                        "predictedSemestersToGraduate": 2
                    },
                    "remainingCoreCourses": [{"courseId": 12, "code": "MATH301", "name": "Calculus", "semesterOrder": 1}]
                }}))
            }),
        )
        .route(
            "/api/v1/student/academic/:student_id/transcript",
            get(|| async {
                Json(json!({"success": true, "result": {
                    "student": {"id": 5, "name": "Ada"},
                    "transcript": [
                        {"courseId": 1, "courseCode": "ENG101", "courseName": "Writing", "credits": 3.0,
                         "semester": "Fall 2023", "status": "passed", "recordedAt": "2023-12-20T10:15:00"},
                        {"courseId": 2, "courseCode": "ART101", "courseName": "Drawing", "credits": null,
                         "semester": "Fall 2023", "status": "failed", "recordedAt": [2023, 12, 20]}
                    ]
                }}))
            }),
        )
        .route(
            "/api/v1/resource/teachers",
            get(|| async {
                Json(json!({"success": true, "result": [{
                    "teacherId": 9, "teacherName": "Grace Hopper", "sectionsAssigned": 3,
                    "weeklyHours": 12.0, "utilizationPercent": 30.0,
                    "dailyLoad": {"MONDAY": 4.0, "TUESDAY": 2.0}
                }]}))
            }),
        )
        .route(
            "/api/v1/resource/rooms",
            get(|| async {
                Json(json!({"success": true, "result": [{
                    "roomId": 2, "roomName": "Lab 2", "weeklyHoursUsed": 6.0,
                    "utilizationPercent": 15.0, "dailyLoad": {}, "overlapCount": 1
                }]}))
            }),
        );
    let gateway = HttpGateway::new(serve(router).await);

    let progress = gateway.fetch_progress(StudentId(5)).await.expect("progress");
    assert_eq!(progress.progress.core_passed, 4);
    assert_eq!(progress.progress.predicted_semesters_to_graduate, Some(2));
    assert_eq!(progress.remaining_core_courses[0].code, "MATH301");

    let transcript = gateway
        .fetch_transcript(StudentId(5))
        .await
        .expect("transcript");
    assert_eq!(transcript.transcript.len(), 2);
    assert!(transcript.transcript[0].recorded_at.is_some());
    assert!(transcript.transcript[1].recorded_at.is_none());
    assert_eq!(transcript.transcript[1].credits, None);

    let analytics = gateway.fetch_resource_analytics().await.expect("analytics");
    assert_eq!(analytics.teacher_stats[0].daily_load.get("MONDAY"), Some(&4.0));
    assert_eq!(analytics.room_stats[0].overlap_count, 1);
}
