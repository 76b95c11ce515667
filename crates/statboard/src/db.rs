//! Database connection utilities.

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// SQLite pragmas applied on connect.
///
/// WAL keeps readers from blocking the sync orchestrator's writes, and
/// the busy timeout absorbs short lock contention between concurrent
/// request workers instead of erroring out.
const SQLITE_PRAGMAS: [&str; 3] = [
    "PRAGMA journal_mode=WAL",
    "PRAGMA busy_timeout=5000",
    "PRAGMA synchronous=NORMAL",
];

async fn configure_sqlite(db: &DatabaseConnection) -> Result<(), DbErr> {
    use sea_orm::{ConnectionTrait, Statement};

    for pragma in SQLITE_PRAGMAS {
        db.execute(Statement::from_string(
            db.get_database_backend(),
            pragma.to_string(),
        ))
        .await?;
    }

    Ok(())
}

/// Establish a connection to the database.
///
/// SQLite connections get WAL journaling, a 5 second busy timeout and
/// NORMAL synchronous mode.
///
/// # Arguments
/// * `database_url` - connection string, e.g. `sqlite:///path/to/db` or
///   `postgres:///statboard`
///
/// # Errors
/// Returns `DbErr` if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url);
    options.sqlx_logging(false);

    let db = Database::connect(options).await?;

    if database_url.starts_with("sqlite:") {
        configure_sqlite(&db).await?;
    }

    Ok(db)
}

/// Establish a connection and run all pending migrations.
///
/// The recommended entry point for applications: the schema is always
/// up to date after this returns.
///
/// # Errors
/// Returns `DbErr` if the connection or a migration fails.
#[cfg(feature = "migrate")]
pub async fn connect_and_migrate(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    use sea_orm_migration::MigratorTrait;

    let db = connect(database_url).await?;
    crate::migration::Migrator::up(&db, None).await?;
    Ok(db)
}
