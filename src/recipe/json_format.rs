//! Parser for the JSON reply contract requested by
//! [`crate::ai::prompts::JSON_SYSTEM_PROMPT`].
//!
//! Models follow the contract loosely: `"Easy"`, `"25 minutes"`, `null`
//! where a list belongs. Each field is read through a lenient helper so a
//! sloppy value falls back to its default instead of failing the recipe.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;
use tracing::{debug, trace, warn};

use super::text_format::{DEFAULT_COOKING_TIME, DEFAULT_DESCRIPTION};
use super::types::{new_recipe_id, Difficulty, NutritionalInfo, RecipeIngredient, RecipeResponse};
use crate::error::ParseError;
use crate::text_utils::first_integer;

/// Quantity used when the model leaves it out.
const DEFAULT_QUANTITY: &str = "to taste";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecipeJson {
    #[serde(default, deserialize_with = "lenient_string")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    description: Option<String>,
    #[serde(default, alias = "cooking_time", deserialize_with = "lenient_minutes")]
    cooking_time: Option<u32>,
    #[serde(default, deserialize_with = "lenient_from_str")]
    difficulty: Option<Difficulty>,
    #[serde(default, deserialize_with = "lenient_ingredients")]
    ingredients: Option<Vec<RecipeIngredient>>,
    #[serde(default, deserialize_with = "lenient_strings")]
    steps: Option<Vec<String>>,
    #[serde(
        default,
        alias = "nutritional_info",
        alias = "nutrition",
        deserialize_with = "lenient_nutrition"
    )]
    nutritional_info: Option<NutritionalInfo>,
    #[serde(default, alias = "plate_analysis", deserialize_with = "lenient_string")]
    plate_analysis: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    tips: Option<Vec<String>>,
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Leading number of a value such as `420`, `"~420 kcal"` or `"7.5 g"`.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let start = s.find(|c: char| c.is_ascii_digit())?;
            let digits: String = s[start..]
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            digits.trim_end_matches('.').parse().ok()
        }
        _ => None,
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(text(&Value::deserialize(d)?))
}

fn lenient_minutes<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    let minutes = match Value::deserialize(d)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .and_then(|m| u32::try_from(m).ok()),
        Value::String(s) => first_integer(&s),
        _ => None,
    };
    Ok(minutes.filter(|m| *m > 0))
}

fn lenient_from_str<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s.parse().ok(),
        _ => None,
    })
}

fn lenient_strings<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<String>>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => Some(items.iter().filter_map(text).collect()),
        _ => None,
    })
}

fn ingredient(value: &Value) -> Option<RecipeIngredient> {
    let name = value.get("name").and_then(text)?;
    let category = value.get("category")?.as_str()?.parse().ok()?;
    let quantity = value
        .get("quantity")
        .and_then(text)
        .unwrap_or_else(|| DEFAULT_QUANTITY.to_string());
    Some(RecipeIngredient::new(name, quantity, category))
}

/// Entries without a name or with an unknown category are dropped, like
/// unparseable lines in the text format.
fn lenient_ingredients<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<Vec<RecipeIngredient>>, D::Error> {
    let Value::Array(items) = Value::deserialize(d)? else {
        return Ok(None);
    };
    let ingredients: Vec<_> = items.iter().filter_map(ingredient).collect();
    if ingredients.len() < items.len() {
        debug!(
            dropped = items.len() - ingredients.len(),
            "Dropped unusable ingredients from JSON reply"
        );
    }
    Ok(Some(ingredients))
}

fn lenient_nutrition<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<NutritionalInfo>, D::Error> {
    let Value::Object(map) = Value::deserialize(d)? else {
        return Ok(None);
    };
    let mut info = NutritionalInfo::default();
    let fields: [(&[&str], &mut f64); 5] = [
        (&["calories"], &mut info.calories),
        (&["proteins", "protein"], &mut info.proteins),
        (&["carbs", "carbohydrates"], &mut info.carbs),
        (&["fats", "fat"], &mut info.fats),
        (&["fiber", "fibre"], &mut info.fiber),
    ];
    for (keys, slot) in fields {
        if let Some(value) = keys.iter().find_map(|key| map.get(*key).and_then(number)) {
            *slot = value;
        }
    }
    Ok(Some(info))
}

/// Slice from the first `{` to the last `}` inclusive, dropping code fences
/// or prose around the object.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

pub fn parse_json_recipe(raw: &str) -> Result<RecipeResponse, ParseError> {
    let Some(object) = extract_json_object(raw) else {
        let snippet: String = raw.chars().take(200).collect();
        warn!(snippet = %snippet, "No JSON object in model output");
        return Err(ParseError::NoJsonObject);
    };
    trace!(object = %object, "Extracted JSON object");

    let parsed: RecipeJson = serde_json::from_str(object)?;

    let title = parsed
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or(ParseError::MissingField("title"))?;
    let ingredients = parsed
        .ingredients
        .filter(|i| !i.is_empty())
        .ok_or(ParseError::MissingField("ingredients"))?;
    let steps = parsed
        .steps
        .filter(|s| !s.is_empty())
        .ok_or(ParseError::MissingField("steps"))?;

    let recipe = RecipeResponse {
        id: new_recipe_id(),
        title,
        description: parsed
            .description
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        cooking_time: parsed.cooking_time.unwrap_or(DEFAULT_COOKING_TIME),
        difficulty: parsed.difficulty.unwrap_or_default(),
        ingredients,
        steps,
        nutritional_info: parsed.nutritional_info.unwrap_or_default(),
        plate_analysis: parsed.plate_analysis.unwrap_or_default(),
        tips: parsed.tips.unwrap_or_default(),
        usage: None,
        created_at: None,
    };
    debug!(
        title = %recipe.title,
        ingredient_count = recipe.ingredients.len(),
        step_count = recipe.steps.len(),
        "Parsed JSON recipe"
    );
    Ok(recipe)
}
