//! System prompts and the user prompt builder for recipe generation.
//!
//! Both system prompts carry the same Harvard Plate rules; they differ only
//! in the reply layout they demand, which must match the parser used on the
//! reply (see [`crate::ai::config::ResponseFormat`]).

use crate::ai::config::ResponseFormat;
use crate::recipe::RecipeGenerationRequest;

/// Reply as labeled sections, parsed by [`crate::recipe::parse_text_recipe`].
pub const TEXT_SYSTEM_PROMPT: &str = "You are a nutrition-aware chef. Every recipe must follow the Harvard Plate proportions: 50% vegetables and fruit, 25% whole grains, 25% healthy protein, and a moderate amount of healthy fats such as olive oil.
Reply in plain text without markdown, using exactly this layout:
TITLE: <recipe name>
DESCRIPTION: <one or two sentences>
COOKING_TIME: <total minutes as a number>
DIFFICULTY: <easy|medium|hard>
INGREDIENTS:
• <name> - <quantity> - <vegetable|grain|protein|fat>
STEPS:
1. <step>
NUTRITION:
Calories: <number>
Proteins: <grams>
Carbs: <grams>
Fats: <grams>
Fiber: <grams>
PLATE_ANALYSIS:
<how the dish matches the Harvard Plate>
TIPS:
• <tip>
Separate the sections with a blank line.";

/// Reply as one JSON object, parsed by [`crate::recipe::parse_json_recipe`].
pub const JSON_SYSTEM_PROMPT: &str = "You are a nutrition-aware chef. Every recipe must follow the Harvard Plate proportions: 50% vegetables and fruit, 25% whole grains, 25% healthy protein, and a moderate amount of healthy fats such as olive oil.
Respond with a single JSON object and nothing else, shaped like:
{\"title\": \"...\", \"description\": \"...\", \"cookingTime\": 30, \"difficulty\": \"easy|medium|hard\", \"ingredients\": [{\"name\": \"...\", \"quantity\": \"...\", \"category\": \"vegetable|grain|protein|fat\"}], \"steps\": [\"...\"], \"nutritionalInfo\": {\"calories\": 0, \"proteins\": 0, \"carbs\": 0, \"fats\": 0, \"fiber\": 0}, \"plateAnalysis\": \"...\", \"tips\": [\"...\"]}
The fields title, ingredients and steps are required.";

pub fn system_prompt(format: ResponseFormat) -> &'static str {
    match format {
        ResponseFormat::Text => TEXT_SYSTEM_PROMPT,
        ResponseFormat::Json => JSON_SYSTEM_PROMPT,
    }
}

/// Render the request as the user message. Same request, same string.
pub fn build_user_prompt(request: &RecipeGenerationRequest) -> String {
    let mut prompt =
        String::from("Create a recipe that uses all of the following ingredients:\n");
    for ingredient in &request.ingredients {
        prompt.push_str(&format!("- {} ({})\n", ingredient.name, ingredient.category));
    }

    let preferences = match &request.dietary_preferences {
        Some(prefs) if !prefs.is_empty() => prefs.join(", "),
        _ => "none".to_string(),
    };
    prompt.push_str(&format!("Dietary preferences: {preferences}\n"));

    if let Some(minutes) = request.cooking_time {
        prompt.push_str(&format!("Cooking time: no more than {minutes} minutes\n"));
    }
    if let Some(text) = &request.user_prompt {
        prompt.push_str(&format!("Additional wishes: {text}\n"));
    }
    prompt
}
