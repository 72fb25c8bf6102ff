use crate::entities::drop_files;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use std::time::Duration;
use tracing::info;

pub async fn setup_database(db_url: &str) -> anyhow::Result<DatabaseConnection> {
    info!("📂 Database: {}", db_url);

    let mut opt = ConnectOptions::new(db_url);
    opt.connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    // Every connection to an in-memory sqlite database sees its own empty database
    if db_url.contains(":memory:") {
        opt.max_connections(1).min_connections(1);
    } else {
        opt.max_connections(16).min_connections(1);
    }

    let db = Database::connect(opt).await?;

    info!("✅ Database connected successfully");

    if !db_url.contains(":memory:") {
        // Readers stop blocking the writer; the setting is stored in the file
        db.execute_unprepared("PRAGMA journal_mode=WAL").await?;
    }

    run_migrations(&db).await?;

    Ok(db)
}

pub async fn run_migrations(db: &DatabaseConnection) -> anyhow::Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    info!("🔄 Running auto-migrations...");

    let stmt = schema
        .create_table_from_entity(drop_files::Entity)
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&stmt)).await?;
    info!("   - Table 'drop_files' checked/created");

    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_drop_files_owner_identity ON drop_files(owner_identity)",
        "CREATE INDEX IF NOT EXISTS idx_drop_files_created_at ON drop_files(created_at)",
    ];

    for query in indexes {
        match db
            .execute(sea_orm::Statement::from_string(builder, query.to_owned()))
            .await
        {
            Ok(_) => tracing::debug!("   - Executed schema update: {}", query),
            Err(e) => tracing::warn!("   - Schema update warning: {} -> {}", query, e),
        }
    }

    Ok(())
}
