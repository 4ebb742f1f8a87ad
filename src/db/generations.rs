use super::{Database, UserId};
use crate::recipe::{RecipeGenerationRequest, RecipeResponse, RecipeSource};
use anyhow::Result;
use serde::Serialize;
use sqlx::types::Json;

/// A stored request/response pair.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Generation {
    pub id: String,
    pub request: RecipeGenerationRequest,
    pub recipe: RecipeResponse,
    pub source: RecipeSource,
    pub created_at: i64,
}

#[derive(sqlx::FromRow)]
struct GenerationRow {
    id: String,
    request: Json<RecipeGenerationRequest>,
    recipe: Json<RecipeResponse>,
    source: RecipeSource,
    created_at: i64,
}

impl From<GenerationRow> for Generation {
    fn from(row: GenerationRow) -> Self {
        Self {
            id: row.id,
            request: row.request.0,
            recipe: row.recipe.0,
            source: row.source,
            created_at: row.created_at,
        }
    }
}

impl Database {
    /// Persist a generated recipe under its own id.
    pub async fn save_generation(
        &self,
        user_id: UserId,
        request: &RecipeGenerationRequest,
        recipe: &RecipeResponse,
        source: RecipeSource,
        created_at: i64,
    ) -> Result<()> {
        tracing::debug!(
            user_id = user_id.0,
            recipe_id = %recipe.id,
            ?source,
            "Saving generation"
        );
        let usage = recipe.usage;
        sqlx::query(
            "INSERT INTO generations \
             (id, user_id, request, recipe, source, prompt_tokens, completion_tokens, total_tokens, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&recipe.id)
        .bind(user_id)
        .bind(Json(request))
        .bind(Json(recipe))
        .bind(source)
        .bind(usage.map(|u| u.prompt_tokens))
        .bind(usage.map(|u| u.completion_tokens))
        .bind(usage.map(|u| u.total_tokens))
        .bind(created_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Newest first.
    pub async fn list_generations(&self, user_id: UserId) -> Result<Vec<Generation>> {
        tracing::trace!(user_id = user_id.0, "Listing generations");
        let rows: Vec<GenerationRow> = sqlx::query_as(
            "SELECT id, request, recipe, source, created_at FROM generations \
             WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Generation::from).collect())
    }

    pub async fn get_generation(&self, user_id: UserId, id: &str) -> Result<Option<Generation>> {
        tracing::trace!(user_id = user_id.0, recipe_id = %id, "Fetching generation");
        let row: Option<GenerationRow> = sqlx::query_as(
            "SELECT id, request, recipe, source, created_at FROM generations \
             WHERE user_id = ? AND id = ?",
        )
        .bind(user_id)
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Generation::from))
    }

    pub async fn delete_generation(&self, user_id: UserId, id: &str) -> Result<u64> {
        tracing::debug!(user_id = user_id.0, recipe_id = %id, "Deleting generation");
        let result = sqlx::query("DELETE FROM generations WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }

    /// Sum of `total_tokens` across the user's stored generations.
    pub async fn total_tokens_used(&self, user_id: UserId) -> Result<i64> {
        let total: Option<i64> =
            sqlx::query_scalar("SELECT SUM(total_tokens) FROM generations WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(self.pool())
                .await?;
        Ok(total.unwrap_or(0))
    }
}
