use axum::http::{Method, StatusCode};
use serde_json::json;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};
use tower::ServiceExt;

use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;
use crate::test_support;

fn exam_payload(category_id: i64, start_offset: Duration, end_offset: Duration) -> serde_json::Value {
    let now = OffsetDateTime::now_utc().replace_nanosecond(0).expect("nanoseconds");
    let start_time = (now + start_offset).format(&Rfc3339).unwrap();
    let end_time = (now + end_offset).format(&Rfc3339).unwrap();

    json!({
        "category_id": category_id,
        "title": "Trigonometry final",
        "start_time": start_time,
        "end_time": end_time,
        "duration_minutes": 60
    })
}

#[tokio::test]
async fn exam_list_is_filtered_by_assigned_categories() {
    let Some(ctx) = test_support::try_setup_test_context().await else { return };
    let db = ctx.state.db();

    let manager =
        test_support::insert_user(db, "okul.muduru", "Okul", "Muduru", UserRole::Manager).await;
    let teacher =
        test_support::insert_user(db, "hoca.bir", "Hoca", "Bir", UserRole::Teacher).await;

    let math = test_support::insert_category(db, "Mathematics").await;
    let physics = test_support::insert_category(db, "Physics").await;
    test_support::assign_category(db, &teacher, &math).await;

    let now = primitive_now_utc();
    let math_exam = test_support::insert_exam(
        db,
        &math,
        "Algebra quiz",
        now,
        now + Duration::hours(1),
    )
    .await;
    test_support::insert_exam(db, &physics, "Optics quiz", now, now + Duration::hours(1)).await;

    // The teacher only sees exams in their assigned category.
    let teacher_token = test_support::bearer_token(&teacher, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/exams",
            Some(&teacher_token),
            None,
        ))
        .await
        .expect("teacher list");

    let listed = test_support::read_json(response).await;
    let items = listed.as_array().expect("exam list");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], math_exam.id);
    assert_eq!(items[0]["category_name"], "Mathematics");

    // The manager sees everything.
    let manager_token = test_support::bearer_token(&manager, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/exams",
            Some(&manager_token),
            None,
        ))
        .await
        .expect("manager list");

    let listed = test_support::read_json(response).await;
    assert_eq!(listed.as_array().expect("exam list").len(), 2);
}

#[tokio::test]
async fn student_list_carries_recorded_results() {
    let Some(ctx) = test_support::try_setup_test_context().await else { return };
    let db = ctx.state.db();

    let student =
        test_support::insert_user(db, "ogrenci.bir", "Ogrenci", "Bir", UserRole::Student).await;
    let category = test_support::insert_category(db, "Literature").await;
    test_support::assign_category(db, &student, &category).await;

    let now = primitive_now_utc();
    let taken = test_support::insert_exam(
        db,
        &category,
        "Poetry quiz",
        now - Duration::days(2),
        now - Duration::days(1),
    )
    .await;
    let open =
        test_support::insert_exam(db, &category, "Novel quiz", now, now + Duration::hours(1))
            .await;

    repositories::results::insert(
        db,
        repositories::results::InsertResult {
            student_id: student.id,
            exam_id: taken.id,
            score: 66,
            correct_count: 2,
            wrong_count: 1,
            taken_at: now - Duration::days(1),
        },
    )
    .await
    .expect("insert result");

    let token = test_support::bearer_token(&student, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/api/v1/exams", Some(&token), None))
        .await
        .expect("student list");

    let listed = test_support::read_json(response).await;
    let items = listed.as_array().expect("exam list");
    assert_eq!(items.len(), 2);

    let taken_entry = items.iter().find(|item| item["id"] == taken.id).expect("taken entry");
    assert_eq!(taken_entry["result"]["score"], 66);

    let open_entry = items.iter().find(|item| item["id"] == open.id).expect("open entry");
    assert!(open_entry.get("result").is_none());
}

#[tokio::test]
async fn create_exam_rejects_inverted_window() {
    let Some(ctx) = test_support::try_setup_test_context().await else { return };
    let db = ctx.state.db();

    let manager =
        test_support::insert_user(db, "okul.muduru", "Okul", "Muduru", UserRole::Manager).await;
    let category = test_support::insert_category(db, "Mathematics").await;

    let token = test_support::bearer_token(&manager, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/exams",
            Some(&token),
            Some(exam_payload(category.id, Duration::hours(2), Duration::hours(1))),
        ))
        .await
        .expect("create exam");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {body}");
    assert!(body["detail"].as_str().unwrap().contains("start_time"));
}

#[tokio::test]
async fn teacher_creates_exams_only_in_assigned_categories() {
    let Some(ctx) = test_support::try_setup_test_context().await else { return };
    let db = ctx.state.db();

    let teacher =
        test_support::insert_user(db, "hoca.iki", "Hoca", "Iki", UserRole::Teacher).await;
    let math = test_support::insert_category(db, "Mathematics").await;
    let physics = test_support::insert_category(db, "Physics").await;
    test_support::assign_category(db, &teacher, &math).await;

    let token = test_support::bearer_token(&teacher, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/exams",
            Some(&token),
            Some(exam_payload(math.id, Duration::hours(1), Duration::hours(2))),
        ))
        .await
        .expect("create in assigned category");

    assert_eq!(response.status(), StatusCode::CREATED);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/exams",
            Some(&token),
            Some(exam_payload(physics.id, Duration::hours(1), Duration::hours(2))),
        ))
        .await
        .expect("create outside assignment");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn question_crud_requires_scope_and_hides_nothing_from_staff() {
    let Some(ctx) = test_support::try_setup_test_context().await else { return };
    let db = ctx.state.db();

    let teacher =
        test_support::insert_user(db, "hoca.uc", "Hoca", "Uc", UserRole::Teacher).await;
    let category = test_support::insert_category(db, "Geometry").await;
    test_support::assign_category(db, &teacher, &category).await;

    let now = primitive_now_utc();
    let exam = test_support::insert_exam(
        db,
        &category,
        "Angles quiz",
        now,
        now + Duration::hours(1),
    )
    .await;

    let token = test_support::bearer_token(&teacher, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/exams/{}/questions", exam.id),
            Some(&token),
            Some(json!({
                "question_text": "Sum of triangle angles?",
                "option_a": "90",
                "option_b": "180",
                "option_c": "270",
                "option_d": "360",
                "correct_answer": "B"
            })),
        ))
        .await
        .expect("create question");

    let status = response.status();
    let created = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    let question_id = created["id"].as_i64().expect("question id");

    // Lowercase answer letters are rejected at the edge.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/exams/{}/questions", exam.id),
            Some(&token),
            Some(json!({
                "question_text": "Bad answer letter",
                "option_a": "a",
                "option_b": "b",
                "option_c": "c",
                "option_d": "d",
                "correct_answer": "b"
            })),
        ))
        .await
        .expect("create invalid question");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Staff listings include the answer key.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/exams/{}/questions", exam.id),
            Some(&token),
            None,
        ))
        .await
        .expect("list questions");

    let listed = test_support::read_json(response).await;
    let items = listed.as_array().expect("questions");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["correct_answer"], "B");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PATCH,
            &format!("/api/v1/questions/{question_id}"),
            Some(&token),
            Some(json!({ "correct_answer": "C" })),
        ))
        .await
        .expect("update question");

    let updated = test_support::read_json(response).await;
    assert_eq!(updated["correct_answer"], "C");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/v1/questions/{question_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("delete question");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
