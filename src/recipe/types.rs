use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

pub const MAX_INGREDIENTS: usize = 15;
pub const MAX_USER_PROMPT_CHARS: usize = 500;
pub const MIN_COOKING_TIME: u32 = 5;
pub const MAX_COOKING_TIME: u32 = 240;

/// Harvard Plate food group of an ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Category {
    #[serde(alias = "vegetables", alias = "fruit", alias = "fruits")]
    Vegetable,
    #[serde(alias = "grains")]
    Grain,
    #[serde(alias = "proteins")]
    Protein,
    #[serde(alias = "fats", alias = "oil")]
    Fat,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Vegetable => "vegetable",
            Category::Grain => "grain",
            Category::Protein => "protein",
            Category::Fat => "fat",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ();

    /// Accepts the canonical names plus the loose forms models tend to emit
    /// ("Vegetables", "fruit", "oil").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vegetable" | "vegetables" | "fruit" | "fruits" => Ok(Category::Vegetable),
            "grain" | "grains" => Ok(Category::Grain),
            "protein" | "proteins" => Ok(Category::Protein),
            "fat" | "fats" | "oil" => Ok(Category::Fat),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientInput {
    pub name: String,
    pub category: Category,
}

impl IngredientInput {
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
        }
    }
}

/// What the caller wants cooked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeGenerationRequest {
    pub ingredients: Vec<IngredientInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dietary_preferences: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooking_time: Option<u32>,
}

impl RecipeGenerationRequest {
    pub fn new(ingredients: Vec<IngredientInput>) -> Self {
        Self {
            ingredients,
            user_prompt: None,
            dietary_preferences: None,
            cooking_time: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_ingredients(&self.ingredients)?;

        if let Some(prompt) = &self.user_prompt {
            if prompt.chars().count() > MAX_USER_PROMPT_CHARS {
                return Err(ValidationError::PromptTooLong {
                    max: MAX_USER_PROMPT_CHARS,
                });
            }
        }

        if let Some(minutes) = self.cooking_time {
            if !(MIN_COOKING_TIME..=MAX_COOKING_TIME).contains(&minutes) {
                return Err(ValidationError::CookingTime {
                    got: minutes,
                    min: MIN_COOKING_TIME,
                    max: MAX_COOKING_TIME,
                });
            }
        }

        Ok(())
    }
}

/// Shared by generation requests and saved plates.
pub fn validate_ingredients(ingredients: &[IngredientInput]) -> Result<(), ValidationError> {
    if ingredients.is_empty() || ingredients.len() > MAX_INGREDIENTS {
        return Err(ValidationError::IngredientCount {
            got: ingredients.len(),
            max: MAX_INGREDIENTS,
        });
    }
    if let Some(idx) = ingredients.iter().position(|i| i.name.trim().is_empty()) {
        return Err(ValidationError::EmptyIngredientName(idx + 1));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub name: String,
    pub quantity: String,
    pub category: Category,
}

impl RecipeIngredient {
    pub fn new(name: impl Into<String>, quantity: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
            category,
        }
    }
}

/// Per-serving estimate. Missing values fall back to [`Default`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutritionalInfo {
    pub calories: f64,
    pub proteins: f64,
    pub carbs: f64,
    pub fats: f64,
    pub fiber: f64,
}

impl Default for NutritionalInfo {
    fn default() -> Self {
        Self {
            calories: 350.0,
            proteins: 20.0,
            carbs: 40.0,
            fats: 15.0,
            fiber: 8.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub cooking_time: u32,
    pub difficulty: Difficulty,
    pub ingredients: Vec<RecipeIngredient>,
    pub steps: Vec<String>,
    pub nutritional_info: NutritionalInfo,
    pub plate_analysis: String,
    pub tips: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Where a stored recipe came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum RecipeSource {
    Model,
    Fallback,
}

pub fn new_recipe_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
