use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::UserRole;
use crate::test_support;

#[tokio::test]
async fn login_returns_token_usable_for_me() {
    let Some(ctx) = test_support::try_setup_test_context().await else { return };
    let db = ctx.state.db();

    test_support::insert_user(db, "deniz.acar", "Deniz", "Acar", UserRole::Teacher).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({
                "username": "deniz.acar",
                "password": test_support::TEST_PASSWORD
            })),
        ))
        .await
        .expect("login");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["user"]["username"], "deniz.acar");
    let token = body["access_token"].as_str().expect("token").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/api/v1/auth/me", Some(&token), None))
        .await
        .expect("me");

    let me = test_support::read_json(response).await;
    assert_eq!(me["username"], "deniz.acar");
    assert_eq!(me["role"], "teacher");
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let Some(ctx) = test_support::try_setup_test_context().await else { return };
    let db = ctx.state.db();

    test_support::insert_user(db, "deniz.acar", "Deniz", "Acar", UserRole::Teacher).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": "deniz.acar", "password": "not-the-password" })),
        ))
        .await
        .expect("login");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn staff_accounts_are_a_manager_concern() {
    let Some(ctx) = test_support::try_setup_test_context().await else { return };
    let db = ctx.state.db();

    let manager =
        test_support::insert_user(db, "okul.muduru", "Okul", "Muduru", UserRole::Manager).await;
    let teacher =
        test_support::insert_user(db, "hoca.bir", "Hoca", "Bir", UserRole::Teacher).await;

    let manager_token = test_support::bearer_token(&manager, ctx.state.settings());
    let teacher_token = test_support::bearer_token(&teacher, ctx.state.settings());

    // A manager can create a teacher.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/users",
            Some(&manager_token),
            Some(json!({
                "username": "hoca.yeni",
                "name": "Hoca",
                "surname": "Yeni",
                "password": "long-enough-password",
                "role": "teacher"
            })),
        ))
        .await
        .expect("manager creates teacher");

    assert_eq!(response.status(), StatusCode::CREATED);

    // A teacher cannot create staff, but can enroll students.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/users",
            Some(&teacher_token),
            Some(json!({
                "username": "hoca.kacak",
                "name": "Hoca",
                "surname": "Kacak",
                "password": "long-enough-password",
                "role": "teacher"
            })),
        ))
        .await
        .expect("teacher creates teacher");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/users",
            Some(&teacher_token),
            Some(json!({
                "username": "ogrenci.yeni",
                "name": "Ogrenci",
                "surname": "Yeni",
                "password": "long-enough-password",
                "role": "student"
            })),
        ))
        .await
        .expect("teacher creates student");

    assert_eq!(response.status(), StatusCode::CREATED);

    // Duplicate usernames are refused.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/users",
            Some(&manager_token),
            Some(json!({
                "username": "ogrenci.yeni",
                "name": "Baska",
                "surname": "Biri",
                "password": "long-enough-password",
                "role": "student"
            })),
        ))
        .await
        .expect("duplicate username");

    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Staff listing is manager-only.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/users/staff",
            Some(&teacher_token),
            None,
        ))
        .await
        .expect("teacher lists staff");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn assignment_sync_replaces_the_set_idempotently() {
    let Some(ctx) = test_support::try_setup_test_context().await else { return };
    let db = ctx.state.db();

    let manager =
        test_support::insert_user(db, "okul.muduru", "Okul", "Muduru", UserRole::Manager).await;
    let teacher =
        test_support::insert_user(db, "hoca.bir", "Hoca", "Bir", UserRole::Teacher).await;

    let math = test_support::insert_category(db, "Mathematics").await;
    let physics = test_support::insert_category(db, "Physics").await;

    let token = test_support::bearer_token(&manager, ctx.state.settings());
    let uri = format!("/api/v1/users/{}/assignments", teacher.id);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &uri,
            Some(&token),
            Some(json!({ "category_ids": [math.id, physics.id] })),
        ))
        .await
        .expect("assign both");

    let body = test_support::read_json(response).await;
    assert_eq!(body.as_array().expect("assignments").len(), 2);

    // Re-sending the same set changes nothing.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &uri,
            Some(&token),
            Some(json!({ "category_ids": [math.id, physics.id] })),
        ))
        .await
        .expect("assign both again");

    let body = test_support::read_json(response).await;
    assert_eq!(body.as_array().expect("assignments").len(), 2);

    // Dropping a category removes its row; unknown ids are ignored.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &uri,
            Some(&token),
            Some(json!({ "category_ids": [physics.id, 999999] })),
        ))
        .await
        .expect("assign one");

    let body = test_support::read_json(response).await;
    let rows = body.as_array().expect("assignments");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["category_name"], "Physics");
}

#[tokio::test]
async fn teachers_see_only_students_sharing_their_categories() {
    let Some(ctx) = test_support::try_setup_test_context().await else { return };
    let db = ctx.state.db();

    let manager =
        test_support::insert_user(db, "okul.muduru", "Okul", "Muduru", UserRole::Manager).await;
    let teacher =
        test_support::insert_user(db, "hoca.bir", "Hoca", "Bir", UserRole::Teacher).await;
    let student_a =
        test_support::insert_user(db, "ogrenci.a", "Ogrenci", "A", UserRole::Student).await;
    let student_b =
        test_support::insert_user(db, "ogrenci.b", "Ogrenci", "B", UserRole::Student).await;

    let math = test_support::insert_category(db, "Mathematics").await;
    let physics = test_support::insert_category(db, "Physics").await;

    test_support::assign_category(db, &teacher, &math).await;
    // Student A shares math with the teacher twice over; the listing must
    // still show them once.
    test_support::assign_category(db, &student_a, &math).await;
    test_support::assign_category(db, &student_a, &physics).await;
    test_support::assign_category(db, &student_b, &physics).await;

    let teacher_token = test_support::bearer_token(&teacher, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/users/students",
            Some(&teacher_token),
            None,
        ))
        .await
        .expect("teacher students");

    let listed = test_support::read_json(response).await;
    let items = listed.as_array().expect("students");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["username"], "ogrenci.a");

    let manager_token = test_support::bearer_token(&manager, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/users/students",
            Some(&manager_token),
            None,
        ))
        .await
        .expect("manager students");

    let listed = test_support::read_json(response).await;
    assert_eq!(listed.as_array().expect("students").len(), 2);
}
