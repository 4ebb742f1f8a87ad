use super::{Database, UserId};
use anyhow::Result;
use serde::Serialize;

#[derive(sqlx::FromRow, Serialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Option<String>,
    pub created_at: i64,
}

impl Database {
    pub async fn create_user(
        &self,
        name: &str,
        email: Option<&str>,
        created_at: i64,
    ) -> Result<User> {
        tracing::debug!(name = %name, "Creating user");
        let id = sqlx::query("INSERT INTO users (name, email, created_at) VALUES (?, ?, ?)")
            .bind(name)
            .bind(email)
            .bind(created_at)
            .execute(self.pool())
            .await?
            .last_insert_rowid();
        Ok(User {
            id: UserId(id),
            name: name.to_string(),
            email: email.map(str::to_string),
            created_at,
        })
    }

    /// Create a user together with their first bearer token. Either both rows
    /// are written or neither is.
    pub async fn register_user(
        &self,
        name: &str,
        email: Option<&str>,
        token: &str,
        created_at: i64,
    ) -> Result<User> {
        tracing::debug!(name = %name, "Registering user");
        let mut tx = self.pool().begin().await?;
        let id = sqlx::query("INSERT INTO users (name, email, created_at) VALUES (?, ?, ?)")
            .bind(name)
            .bind(email)
            .bind(created_at)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();
        sqlx::query("INSERT INTO tokens (user_id, token, issued_at) VALUES (?, ?, ?)")
            .bind(id)
            .bind(token)
            .bind(created_at)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(User {
            id: UserId(id),
            name: name.to_string(),
            email: email.map(str::to_string),
            created_at,
        })
    }

    pub async fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
        tracing::trace!(user_id = user_id.0, "Fetching user");
        sqlx::query_as("SELECT id, name, email, created_at FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(self.pool())
            .await
            .map_err(Into::into)
    }

    pub async fn update_user(
        &self,
        user_id: UserId,
        name: &str,
        email: Option<&str>,
    ) -> Result<u64> {
        tracing::debug!(user_id = user_id.0, "Updating user");
        let result = sqlx::query("UPDATE users SET name = ?, email = ? WHERE id = ?")
            .bind(name)
            .bind(email)
            .bind(user_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }

    /// Removes the user together with their tokens, pantry, plates and
    /// stored generations.
    pub async fn delete_user(&self, user_id: UserId) -> Result<u64> {
        tracing::debug!(user_id = user_id.0, "Deleting user");
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }
}
