use sqlx::sqlite::SqlitePool;

/// Users that own sessions. IDs are assigned by the auth provider.
#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the user if it does not exist yet. Returns true if it was created.
    pub async fn ensure(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("INSERT OR IGNORE INTO users (id) VALUES (?)")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
