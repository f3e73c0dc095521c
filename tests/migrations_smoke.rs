use sqlx::Row;

fn database_url() -> Option<String> {
    dotenvy::dotenv().ok();

    std::env::var("EXAMDESK_TEST_DATABASE_URL")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[tokio::test]
async fn migrations_apply_and_tables_exist() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        eprintln!("skipping: EXAMDESK_TEST_DATABASE_URL not set");
        return Ok(());
    };

    let pool =
        sqlx::postgres::PgPoolOptions::new().max_connections(1).connect(&database_url).await?;

    let migrations_dir =
        std::env::var("EXAMDESK_MIGRATIONS_DIR").unwrap_or_else(|_| "migrations".to_string());
    let migrator = sqlx::migrate::Migrator::new(std::path::Path::new(&migrations_dir)).await?;
    migrator.run(&pool).await?;

    let tables =
        ["users", "categories", "exams", "questions", "category_assignments", "exam_results"];

    for table in tables {
        let row = sqlx::query("SELECT to_regclass($1)::text").bind(table).fetch_one(&pool).await?;
        let regclass: Option<String> = row.try_get(0)?;
        assert!(regclass.is_some(), "expected table {table} to exist after migrations");
    }

    // The one-result-per-student-per-exam rule lives in the schema.
    let row = sqlx::query(
        "SELECT COUNT(*) FROM pg_constraint
         WHERE conname = 'exam_results_student_exam_key' AND contype = 'u'",
    )
    .fetch_one(&pool)
    .await?;
    let unique_keys: i64 = row.try_get(0)?;
    assert_eq!(unique_keys, 1);

    Ok(())
}
