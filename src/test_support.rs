use std::sync::{Arc, OnceLock};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    Router,
};
use sqlx::PgPool;
use time::PrimitiveDateTime;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::api;
use crate::core::{config::Settings, security, state::AppState, time::primitive_now_utc};
use crate::db::models::{Category, Exam, Question, User};
use crate::db::types::UserRole;
use crate::repositories;
use crate::services::media::MediaStore;

pub(crate) const TEST_PASSWORD: &str = "secret-password";

pub(crate) struct TestContext {
    pub(crate) state: AppState,
    pub(crate) app: Router,
    _guard: OwnedMutexGuard<()>,
}

/// Serializes tests that touch process environment or the shared database.
pub(crate) async fn env_lock() -> OwnedMutexGuard<()> {
    static LOCK: OnceLock<Arc<Mutex<()>>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Arc::new(Mutex::new(()))).clone();
    lock.lock_owned().await
}

fn test_database_url() -> Option<String> {
    std::env::var("EXAMDESK_TEST_DATABASE_URL")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// DB-backed API tests opt in via EXAMDESK_TEST_DATABASE_URL. Without it the
/// caller gets `None` and should return early instead of failing on missing
/// infrastructure.
pub(crate) async fn try_setup_test_context() -> Option<TestContext> {
    let guard = env_lock().await;

    let Some(database_url) = test_database_url() else {
        eprintln!("skipping: EXAMDESK_TEST_DATABASE_URL not set");
        return None;
    };

    std::env::set_var("EXAMDESK_ENV", "test");
    std::env::set_var("SECRET_KEY", "test-secret");
    std::env::set_var("DATABASE_URL", &database_url);
    std::env::set_var(
        "MEDIA_ROOT",
        std::env::temp_dir().join("examdesk-test-media").display().to_string(),
    );
    std::env::remove_var("PROMETHEUS_ENABLED");

    let settings = Settings::load().expect("settings");
    let db = prepare_db(&settings).await;
    let media = MediaStore::from_settings(&settings);

    let state = AppState::new(settings, db, media);
    let app = api::router::router(state.clone());

    Some(TestContext { state, app, _guard: guard })
}

async fn prepare_db(settings: &Settings) -> PgPool {
    let db = crate::db::init_pool(settings).await.expect("db pool");
    ensure_schema(&db).await.expect("schema");
    reset_db(&db).await.expect("reset db");
    db
}

async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    let migrations_dir =
        std::env::var("EXAMDESK_MIGRATIONS_DIR").unwrap_or_else(|_| "migrations".to_string());
    let mut migrator = sqlx::migrate::Migrator::new(std::path::Path::new(&migrations_dir))
        .await
        .map_err(|error| sqlx::Error::Migrate(Box::new(error)))?;
    migrator.set_ignore_missing(true);
    migrator.run(pool).await.map_err(|error| sqlx::Error::Migrate(Box::new(error)))?;
    Ok(())
}

pub(crate) async fn reset_db(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "TRUNCATE exam_results, category_assignments, questions, exams, categories, users \
         RESTART IDENTITY CASCADE",
    )
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn insert_user(
    pool: &PgPool,
    username: &str,
    name: &str,
    surname: &str,
    role: UserRole,
) -> User {
    let hashed_password = security::hash_password(TEST_PASSWORD).expect("hash password");
    let now = primitive_now_utc();

    repositories::users::create(
        pool,
        repositories::users::CreateUser {
            username,
            name,
            surname,
            hashed_password,
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .expect("insert user")
}

pub(crate) async fn insert_category(pool: &PgPool, name: &str) -> Category {
    repositories::categories::create(pool, name, None).await.expect("insert category")
}

pub(crate) async fn assign_category(pool: &PgPool, user: &User, category: &Category) {
    sqlx::query(
        "INSERT INTO category_assignments (user_id, category_id, assigned_at)
         VALUES ($1, $2, $3)
         ON CONFLICT (user_id, category_id) DO NOTHING",
    )
    .bind(user.id)
    .bind(category.id)
    .bind(primitive_now_utc())
    .execute(pool)
    .await
    .expect("assign category");
}

pub(crate) async fn insert_exam(
    pool: &PgPool,
    category: &Category,
    title: &str,
    start_time: PrimitiveDateTime,
    end_time: PrimitiveDateTime,
) -> Exam {
    repositories::exams::create(
        pool,
        repositories::exams::CreateExam {
            category_id: category.id,
            title,
            start_time,
            end_time,
            duration_minutes: 45,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .expect("insert exam")
}

pub(crate) async fn insert_question(
    pool: &PgPool,
    exam: &Exam,
    question_text: &str,
    correct_answer: &str,
) -> Question {
    repositories::questions::create(
        pool,
        repositories::questions::CreateQuestion {
            exam_id: exam.id,
            question_text,
            option_a: "first option",
            option_b: "second option",
            option_c: "third option",
            option_d: "fourth option",
            correct_answer,
        },
    )
    .await
    .expect("insert question")
}

pub(crate) fn bearer_token(user: &User, settings: &Settings) -> String {
    security::create_access_token(&user.id.to_string(), settings, None).expect("token")
}

pub(crate) fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    if let Some(body) = body {
        let bytes = serde_json::to_vec(&body).expect("serialize body");
        builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(bytes))
            .expect("request body")
    } else {
        builder.body(Body::empty()).expect("request body")
    }
}

pub(crate) async fn read_json(response: axum::response::Response<Body>) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("response body");
    serde_json::from_slice(&body).unwrap_or_else(|err| {
        let body_text = String::from_utf8_lossy(&body);
        panic!("json parse: {err}; body: {body_text}");
    })
}
