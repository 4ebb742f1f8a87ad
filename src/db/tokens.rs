use super::{Database, UserId};
use anyhow::Result;
use serde::Serialize;

/// Length of the token prefix shown back to its owner.
pub const TOKEN_PREVIEW_LEN: usize = 6;

/// A bearer token as its owner may see it: the secret itself never leaves
/// the database, only its first few characters.
#[derive(sqlx::FromRow, Serialize, Debug, Clone, PartialEq)]
pub struct TokenInfo {
    pub id: i64,
    pub preview: String,
    pub issued_at: i64,
    pub last_used_at: Option<i64>,
    pub revoked_at: Option<i64>,
}

/// Fresh opaque bearer token.
pub fn generate_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

impl Database {
    pub async fn create_token(&self, user_id: UserId, token: &str, issued_at: i64) -> Result<()> {
        tracing::debug!(user_id = user_id.0, "Issuing token");
        sqlx::query("INSERT INTO tokens (user_id, token, issued_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(token)
            .bind(issued_at)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// The user's tokens, newest first, revoked ones included.
    pub async fn list_tokens(&self, user_id: UserId) -> Result<Vec<TokenInfo>> {
        sqlx::query_as(
            "SELECT id, substr(token, 1, ?) AS preview, issued_at, last_used_at, revoked_at \
             FROM tokens WHERE user_id = ? ORDER BY id DESC",
        )
        .bind(TOKEN_PREVIEW_LEN as i64)
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .map_err(Into::into)
    }

    /// Returns `false` when the token is unknown, belongs to someone else or
    /// was already revoked.
    pub async fn revoke_token(&self, user_id: UserId, token: &str, revoked_at: i64) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE tokens SET revoked_at = ? \
             WHERE user_id = ? AND token = ? AND revoked_at IS NULL",
        )
        .bind(revoked_at)
        .bind(user_id)
        .bind(token)
        .execute(self.pool())
        .await?;
        tracing::debug!(
            user_id = user_id.0,
            revoked = result.rows_affected(),
            "Revoked token"
        );
        Ok(result.rows_affected() > 0)
    }

    /// Resolve a live bearer token to its owner, stamping `last_used_at` in
    /// the same statement.
    pub async fn use_token(&self, token: &str, used_at: i64) -> Result<Option<UserId>> {
        let owner: Option<UserId> = sqlx::query_scalar(
            "UPDATE tokens SET last_used_at = ? \
             WHERE token = ? AND revoked_at IS NULL RETURNING user_id",
        )
        .bind(used_at)
        .bind(token)
        .fetch_optional(self.pool())
        .await?;
        tracing::trace!(found = owner.is_some(), "Resolved bearer token");
        Ok(owner)
    }
}
