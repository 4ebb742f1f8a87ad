use anyhow::Result;
use sqlx::{Pool, Sqlite};

/// Handle to the SQLite store. Cloning shares the pool.
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Connect and bring the schema up to date with the embedded migrations.
    pub async fn open(db_url: &str, max_connections: u32) -> Result<Self> {
        let pool = super::connect_db(db_url, max_connections).await?;
        let db = Self::new(pool);
        db.migrate().await?;
        Ok(db)
    }

    pub async fn migrate(&self) -> Result<()> {
        tracing::debug!("Running database migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}
