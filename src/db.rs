use sea_orm::{
    ConnectionTrait, ConnectOptions, Database, DatabaseConnection, DbBackend, DbErr, Schema,
    Statement,
};
use sea_orm::sea_query::TableCreateStatement;
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::entity::{personnel, post};

/// Initialize database connection and auto-migrate tables
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let database_url = config.connection_url();

    info!("Connecting to database: {}:{}/{}", config.host, config.port, config.name);

    let mut opt = ConnectOptions::new(&database_url);
    opt.max_connections(20)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(true)
        .sqlx_logging_level(tracing::log::LevelFilter::Debug)
        .set_schema_search_path("public");

    let db = Database::connect(opt).await?;
    info!("Database connection established");

    auto_migrate(&db).await?;

    Ok(db)
}

/// Create missing tables and columns
async fn auto_migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    info!("Running auto-migration for all entities...");

    create_table_if_not_exists(db, backend, schema.create_table_from_entity(personnel::Entity)).await?;
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(post::Entity)).await?;

    // Tables imported from the old document store may predate the list column
    add_column_if_not_exists(db, backend, "school_personnel", "parent_ids", "JSONB").await?;

    create_index_if_not_exists(db, backend, "idx_school_personnel_collection", "school_personnel", "collection").await?;
    create_index_if_not_exists(db, backend, "idx_school_post_kind", "school_post", "kind").await?;

    info!("Auto-migration completed successfully");
    Ok(())
}

/// Add a column to a table if it doesn't exist
async fn add_column_if_not_exists(
    db: &DatabaseConnection,
    backend: DbBackend,
    table: &str,
    column: &str,
    column_def: &str,
) -> Result<(), DbErr> {
    // Check if column exists (PostgreSQL specific)
    let check_sql = format!(
        "SELECT column_name FROM information_schema.columns WHERE table_name = '{}' AND column_name = '{}'",
        table, column
    );

    let result = db.query_one(Statement::from_string(backend, check_sql)).await?;

    if result.is_none() {
        let alter_sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def);
        info!("Adding column {}.{}", table, column);
        db.execute(Statement::from_string(backend, alter_sql)).await?;
    }

    Ok(())
}

async fn create_index_if_not_exists(
    db: &DatabaseConnection,
    backend: DbBackend,
    name: &str,
    table: &str,
    column: &str,
) -> Result<(), DbErr> {
    let sql = format!("CREATE INDEX IF NOT EXISTS {} ON {} ({})", name, table, column);
    db.execute(Statement::from_string(backend, sql)).await?;
    Ok(())
}

/// Create a table if it doesn't exist
async fn create_table_if_not_exists(
    db: &DatabaseConnection,
    backend: DbBackend,
    mut stmt: TableCreateStatement,
) -> Result<(), DbErr> {
    stmt.if_not_exists();

    let sql = backend.build(&stmt);

    db.execute(Statement::from_string(backend, sql.to_string())).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_personnel_table_statement() {
        let schema = Schema::new(DbBackend::Postgres);
        let mut stmt = schema.create_table_from_entity(personnel::Entity);
        stmt.if_not_exists();
        let sql = DbBackend::Postgres.build(&stmt).to_string();
        assert!(sql.starts_with(r#"CREATE TABLE IF NOT EXISTS "school_personnel""#));
        assert!(sql.contains(r#""parent_ids" jsonb"#));
    }

    #[test]
    fn test_post_table_statement() {
        let schema = Schema::new(DbBackend::Postgres);
        let sql = DbBackend::Postgres
            .build(&schema.create_table_from_entity(post::Entity))
            .to_string();
        assert!(sql.contains(r#""school_post""#));
        assert!(sql.contains(r#""date" date"#));
    }
}
