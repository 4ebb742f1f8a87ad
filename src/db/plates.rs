use super::{Database, UserId};
use crate::recipe::IngredientInput;
use anyhow::Result;
use serde::Serialize;
use sqlx::types::Json;

/// A saved combination of ingredients that can be turned into a recipe.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Plate {
    pub id: i64,
    pub name: String,
    pub ingredients: Vec<IngredientInput>,
    pub created_at: i64,
}

#[derive(sqlx::FromRow)]
struct PlateRow {
    id: i64,
    name: String,
    ingredients: Json<Vec<IngredientInput>>,
    created_at: i64,
}

impl From<PlateRow> for Plate {
    fn from(row: PlateRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            ingredients: row.ingredients.0,
            created_at: row.created_at,
        }
    }
}

impl Database {
    pub async fn create_plate(
        &self,
        user_id: UserId,
        name: &str,
        ingredients: &[IngredientInput],
        created_at: i64,
    ) -> Result<Plate> {
        tracing::debug!(
            user_id = user_id.0,
            name = %name,
            ingredient_count = ingredients.len(),
            "Saving plate"
        );
        let id = sqlx::query(
            "INSERT INTO plates (user_id, name, ingredients, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(name)
        .bind(Json(ingredients))
        .bind(created_at)
        .execute(self.pool())
        .await?
        .last_insert_rowid();
        Ok(Plate {
            id,
            name: name.to_string(),
            ingredients: ingredients.to_vec(),
            created_at,
        })
    }

    pub async fn list_plates(&self, user_id: UserId) -> Result<Vec<Plate>> {
        tracing::trace!(user_id = user_id.0, "Listing plates");
        let rows: Vec<PlateRow> = sqlx::query_as(
            "SELECT id, name, ingredients, created_at FROM plates WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Plate::from).collect())
    }

    pub async fn get_plate(&self, user_id: UserId, id: i64) -> Result<Option<Plate>> {
        tracing::trace!(user_id = user_id.0, plate_id = id, "Fetching plate");
        let row: Option<PlateRow> = sqlx::query_as(
            "SELECT id, name, ingredients, created_at FROM plates WHERE user_id = ? AND id = ?",
        )
        .bind(user_id)
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Plate::from))
    }

    pub async fn delete_plate(&self, user_id: UserId, id: i64) -> Result<u64> {
        tracing::debug!(user_id = user_id.0, plate_id = id, "Deleting plate");
        let result = sqlx::query("DELETE FROM plates WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::Category;
    use crate::tests::util::{init_test_db, test_user};

    #[tokio::test]
    async fn plate_ingredients_survive_storage() -> Result<()> {
        let db = init_test_db().await;
        let user = test_user(&db).await;
        let ingredients = vec![
            IngredientInput::new("Salmon", Category::Protein),
            IngredientInput::new("Barley", Category::Grain),
        ];

        let plate = db.create_plate(user, "Dinner", &ingredients, 5).await?;
        let loaded = db.get_plate(user, plate.id).await?.unwrap();
        assert_eq!(loaded, plate);
        assert_eq!(loaded.ingredients, ingredients);

        assert_eq!(db.list_plates(user).await?.len(), 1);
        assert_eq!(db.delete_plate(user, plate.id).await?, 1);
        assert!(db.get_plate(user, plate.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn plates_are_private() -> Result<()> {
        let db = init_test_db().await;
        let owner = test_user(&db).await;
        let other = test_user(&db).await;
        let plate = db
            .create_plate(
                owner,
                "Lunch",
                &[IngredientInput::new("Beans", Category::Protein)],
                1,
            )
            .await?;

        assert!(db.get_plate(other, plate.id).await?.is_none());
        assert_eq!(db.delete_plate(other, plate.id).await?, 0);
        Ok(())
    }
}
