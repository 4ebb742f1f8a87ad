// Recipe records plus the pure parsing and fallback logic around them

pub mod fallback;
pub mod json_format;
pub mod text_format;
pub mod types;

pub use fallback::fallback_recipe;
pub use json_format::parse_json_recipe;
pub use text_format::parse_text_recipe;
pub use types::{
    Category, Difficulty, IngredientInput, NutritionalInfo, RecipeGenerationRequest,
    RecipeIngredient, RecipeResponse, RecipeSource, Usage,
};
