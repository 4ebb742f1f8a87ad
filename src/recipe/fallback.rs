//! Model-free recipe used when generation is unavailable.

use super::types::{
    new_recipe_id, Category, Difficulty, NutritionalInfo, RecipeGenerationRequest,
    RecipeIngredient, RecipeResponse,
};

const DESCRIPTION: &str =
    "A quick fresh salad made from your ingredients and dressed with olive oil and lemon juice.";
const COOKING_TIME: u32 = 15;
const STEPS: [&str; 6] = [
    "Wash all ingredients thoroughly.",
    "Cut the ingredients into bite-sized pieces.",
    "Cook any grains or proteins that need it and let them cool slightly.",
    "Combine everything in a large bowl.",
    "Whisk the olive oil with the lemon juice and season to taste.",
    "Pour the dressing over the salad, toss gently and serve.",
];
const NUTRITION: NutritionalInfo = NutritionalInfo {
    calories: 250.0,
    proteins: 15.0,
    carbs: 30.0,
    fats: 10.0,
    fiber: 12.0,
};
const PLATE_ANALYSIS: &str = "A simple salad built from the ingredients you have. \
Aim for half the plate vegetables, a quarter whole grains and a quarter protein, \
with olive oil as the healthy fat.";
const TIPS: [&str; 3] = [
    "Add a handful of leafy greens to increase the vegetable share.",
    "Serve with whole-grain bread if the plate lacks grains.",
    "Top with nuts or seeds for extra protein and healthy fats.",
];

/// Build a salad from the requested ingredients. Only `id` differs between
/// calls with the same request.
pub fn fallback_recipe(request: &RecipeGenerationRequest) -> RecipeResponse {
    let names: Vec<&str> = request
        .ingredients
        .iter()
        .map(|i| i.name.as_str())
        .collect();

    let mut ingredients: Vec<RecipeIngredient> = request
        .ingredients
        .iter()
        .map(|i| RecipeIngredient::new(i.name.clone(), "to taste", i.category))
        .collect();
    ingredients.push(RecipeIngredient::new("olive oil", "2 tbsp", Category::Fat));
    ingredients.push(RecipeIngredient::new(
        "lemon juice",
        "1 tbsp",
        Category::Vegetable,
    ));

    RecipeResponse {
        id: new_recipe_id(),
        title: format!("Salad \"{}\"", names.join(", ")),
        description: DESCRIPTION.to_string(),
        cooking_time: COOKING_TIME,
        difficulty: Difficulty::Easy,
        ingredients,
        steps: STEPS.iter().map(|s| s.to_string()).collect(),
        nutritional_info: NUTRITION,
        plate_analysis: PLATE_ANALYSIS.to_string(),
        tips: TIPS.iter().map(|s| s.to_string()).collect(),
        usage: None,
        created_at: None,
    }
}
