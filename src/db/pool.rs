use sqlx::{migrate::Migrator, sqlite::SqlitePoolOptions, Pool, Sqlite, SqlitePool};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Clone)]
pub struct DbPool {
    pub pool: Pool<Sqlite>,
}

impl DbPool {
    pub async fn new(database_url: &str) -> Result<DbPool, sqlx::Error> {
        let pool = SqlitePool::connect(database_url).await?;

        // Run the migrations
        MIGRATOR.run(&pool).await?;

        Ok(DbPool { pool })
    }

    /// In-memory database on a single pooled connection, used by tests and the
    /// demo binary. One connection keeps every caller on the same database.
    pub async fn new_in_memory() -> Result<DbPool, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        MIGRATOR.run(&pool).await?;

        Ok(DbPool { pool })
    }
}
