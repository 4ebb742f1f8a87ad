use super::{Database, UserId};
use crate::recipe::Category;
use anyhow::Result;
use serde::Serialize;

/// A pantry ingredient saved by a user.
#[derive(sqlx::FromRow, Serialize, Debug, Clone, PartialEq)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub category: Category,
    pub created_at: i64,
}

impl Database {
    pub async fn add_ingredient(
        &self,
        user_id: UserId,
        name: &str,
        category: Category,
        created_at: i64,
    ) -> Result<Ingredient> {
        tracing::trace!(user_id = user_id.0, name = %name, %category, "Adding ingredient");
        let id = sqlx::query(
            "INSERT INTO ingredients (user_id, name, category, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(name)
        .bind(category)
        .bind(created_at)
        .execute(self.pool())
        .await?
        .last_insert_rowid();
        Ok(Ingredient {
            id,
            name: name.to_string(),
            category,
            created_at,
        })
    }

    pub async fn list_ingredients(&self, user_id: UserId) -> Result<Vec<Ingredient>> {
        tracing::trace!(user_id = user_id.0, "Listing ingredients");
        sqlx::query_as(
            "SELECT id, name, category, created_at FROM ingredients WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .map_err(Into::into)
    }

    pub async fn update_ingredient(
        &self,
        user_id: UserId,
        id: i64,
        name: &str,
        category: Category,
    ) -> Result<u64> {
        tracing::trace!(user_id = user_id.0, ingredient_id = id, "Updating ingredient");
        let result =
            sqlx::query("UPDATE ingredients SET name = ?, category = ? WHERE user_id = ? AND id = ?")
                .bind(name)
                .bind(category)
                .bind(user_id)
                .bind(id)
                .execute(self.pool())
                .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_ingredient(&self, user_id: UserId, id: i64) -> Result<u64> {
        tracing::trace!(user_id = user_id.0, ingredient_id = id, "Deleting ingredient");
        let result = sqlx::query("DELETE FROM ingredients WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }
}
