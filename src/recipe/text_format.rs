//! Parser for the labeled-section reply layout requested by
//! [`crate::ai::prompts::TEXT_SYSTEM_PROMPT`].
//!
//! Extraction never fails. Every field that cannot be found keeps a default,
//! and list entries that do not match their expected shape are dropped.

use tracing::{debug, trace};

use super::types::{
    new_recipe_id, NutritionalInfo, RecipeGenerationRequest, RecipeIngredient, RecipeResponse,
};
use crate::text_utils::{first_integer, strip_bullet, strip_step_number};

pub const DEFAULT_COOKING_TIME: u32 = 30;
pub const DEFAULT_DESCRIPTION: &str = "A balanced dish built on the Harvard Plate proportions.";
pub const DEFAULT_PLATE_ANALYSIS: &str = "No plate analysis provided.";

/// Lines after `NUTRITION:` that are searched for values.
const NUTRITION_WINDOW: usize = 5;

const TITLE: &[&str] = &["TITLE:"];
const DESCRIPTION: &[&str] = &["DESCRIPTION:"];
const COOKING_TIME: &[&str] = &["COOKING_TIME:", "COOKING TIME:"];
const DIFFICULTY: &[&str] = &["DIFFICULTY:"];
const SCALARS: [&[&str]; 4] = [TITLE, DESCRIPTION, COOKING_TIME, DIFFICULTY];

const INGREDIENTS: &[&str] = &["INGREDIENTS:"];
const STEPS: &[&str] = &["STEPS:"];
const NUTRITION: &[&str] = &["NUTRITION:"];
const PLATE_ANALYSIS: &[&str] = &["PLATE_ANALYSIS:", "PLATE ANALYSIS:"];
const TIPS: &[&str] = &["TIPS:"];
const SECTIONS: [&[&str]; 5] = [INGREDIENTS, STEPS, NUTRITION, PLATE_ANALYSIS, TIPS];

pub fn parse_text_recipe(raw: &str, request: &RecipeGenerationRequest) -> RecipeResponse {
    let lines: Vec<&str> = raw.lines().map(str::trim).collect();
    trace!(line_count = lines.len(), "Parsing labeled recipe text");

    let title = scalar(&lines, TITLE)
        .map(str::to_string)
        .unwrap_or_else(|| default_title(request));
    let description = scalar(&lines, DESCRIPTION)
        .unwrap_or(DEFAULT_DESCRIPTION)
        .to_string();
    let cooking_time = scalar(&lines, COOKING_TIME)
        .and_then(first_integer)
        .unwrap_or(DEFAULT_COOKING_TIME);
    let difficulty = scalar(&lines, DIFFICULTY)
        .and_then(|d| d.parse().ok())
        .unwrap_or_default();

    let ingredients: Vec<RecipeIngredient> = section(&lines, INGREDIENTS)
        .iter()
        .filter_map(|line| parse_ingredient_line(line))
        .collect();
    let steps: Vec<String> = section(&lines, STEPS)
        .iter()
        .map(|line| strip_step_number(line))
        .filter(|step| !step.is_empty())
        .map(str::to_string)
        .collect();
    let tips: Vec<String> = section(&lines, TIPS)
        .iter()
        .filter_map(|line| strip_bullet(line))
        .map(str::to_string)
        .collect();

    let recipe = RecipeResponse {
        id: new_recipe_id(),
        title,
        description,
        cooking_time,
        difficulty,
        ingredients,
        steps,
        nutritional_info: parse_nutrition(&lines),
        plate_analysis: parse_plate_analysis(&lines),
        tips,
        usage: None,
        created_at: None,
    };
    debug!(
        title = %recipe.title,
        ingredient_count = recipe.ingredients.len(),
        step_count = recipe.steps.len(),
        tip_count = recipe.tips.len(),
        "Parsed labeled recipe text"
    );
    recipe
}

/// Parse `• name - quantity - category`.
///
/// The name may itself contain ` - `; the last two fields are quantity and
/// category. Lines without a bullet, with fewer than three fields or with an
/// unknown category yield `None`.
pub fn parse_ingredient_line(line: &str) -> Option<RecipeIngredient> {
    let body = strip_bullet(line)?;
    let mut fields: Vec<&str> = body.split(" - ").map(str::trim).collect();
    if fields.len() < 3 {
        trace!(?line, "Skipping ingredient line without three fields");
        return None;
    }
    let category = fields.pop()?.parse().ok()?;
    let quantity = fields.pop()?;
    let name = fields.join(" - ");
    if name.is_empty() || quantity.is_empty() {
        return None;
    }
    Some(RecipeIngredient::new(name, quantity, category))
}

/// Values for labels missing from the block keep their defaults.
pub fn parse_nutrition(lines: &[&str]) -> NutritionalInfo {
    let mut info = NutritionalInfo::default();
    let Some(header) = find_section(lines, NUTRITION) else {
        return info;
    };

    for line in lines.iter().skip(header + 1).take(NUTRITION_WINDOW) {
        let lower = line.to_lowercase();
        let Some(value) = first_integer(line).map(f64::from) else {
            continue;
        };
        if lower.contains("calorie") {
            info.calories = value;
        } else if lower.contains("protein") {
            info.proteins = value;
        } else if lower.contains("carb") {
            info.carbs = value;
        } else if lower.contains("fiber") || lower.contains("fibre") {
            info.fiber = value;
        } else if lower.contains("fat") {
            info.fats = value;
        }
    }
    info
}

fn parse_plate_analysis(lines: &[&str]) -> String {
    let Some(header) = find_section(lines, PLATE_ANALYSIS) else {
        return DEFAULT_PLATE_ANALYSIS.to_string();
    };

    let mut parts = Vec::new();
    if let Some(inline) = after_label(lines[header], PLATE_ANALYSIS) {
        parts.push(inline);
    }
    parts.extend(section_body(lines, header).iter().copied());

    if parts.is_empty() {
        DEFAULT_PLATE_ANALYSIS.to_string()
    } else {
        parts.join("\n")
    }
}

fn default_title(request: &RecipeGenerationRequest) -> String {
    match request.ingredients.first() {
        Some(first) => format!("Recipe with {}", first.name),
        None => "Recipe".to_string(),
    }
}

/// Value of the first line starting with one of `labels`. Empty values count
/// as absent.
fn scalar<'a>(lines: &[&'a str], labels: &[&str]) -> Option<&'a str> {
    lines
        .iter()
        .find_map(|line| labels.iter().find_map(|label| line.strip_prefix(label)))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn is_header(line: &str) -> bool {
    SCALARS
        .iter()
        .flat_map(|labels| labels.iter())
        .any(|label| line.starts_with(label))
        || SECTIONS
            .iter()
            .flat_map(|labels| labels.iter())
            .any(|label| line.contains(label))
}

fn find_section(lines: &[&str], labels: &[&str]) -> Option<usize> {
    lines
        .iter()
        .position(|line| labels.iter().any(|label| line.contains(label)))
}

fn after_label<'a>(line: &'a str, labels: &[&str]) -> Option<&'a str> {
    labels
        .iter()
        .find_map(|label| line.find(label).map(|idx| &line[idx + label.len()..]))
        .map(str::trim)
        .filter(|rest| !rest.is_empty())
}

/// Lines after `header` up to the next blank line or recognized header.
fn section_body<'a, 'b>(lines: &'b [&'a str], header: usize) -> &'b [&'a str] {
    let start = header + 1;
    if start >= lines.len() {
        return &[];
    }
    let len = lines[start..]
        .iter()
        .position(|line| line.is_empty() || is_header(line))
        .unwrap_or(lines.len() - start);
    &lines[start..start + len]
}

fn section<'a, 'b>(lines: &'b [&'a str], labels: &[&str]) -> &'b [&'a str] {
    match find_section(lines, labels) {
        Some(header) => section_body(lines, header),
        None => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::types::{Category, Difficulty, IngredientInput};
    use proptest::prelude::*;

    const FULL_REPLY: &str = "TITLE: Tomato Quinoa Bowl
DESCRIPTION: A bright bowl with roasted tomatoes.
COOKING_TIME: 25 minutes
DIFFICULTY: easy
INGREDIENTS:
• Tomato - 2 pcs - vegetable
• Quinoa - 100 g - grain
• Chickpeas - 1 can - protein
• Olive oil - 1 tbsp - fat
STEPS:
1. Rinse the quinoa.
2. Roast the tomatoes.
3) Combine everything.
NUTRITION:
Calories: 480
Proteins: 18
Carbs: 62
Fats: 14
Fiber: 11
PLATE_ANALYSIS:
Half the bowl is vegetables.
A quarter is quinoa.
TIPS:
• Toast the quinoa first.
• Add lemon zest.
not a tip";

    fn tomato_request() -> RecipeGenerationRequest {
        let mut req =
            RecipeGenerationRequest::new(vec![IngredientInput::new("Tomato", Category::Vegetable)]);
        req.cooking_time = Some(20);
        req
    }

    #[test]
    fn parses_full_reply() {
        let recipe = parse_text_recipe(FULL_REPLY, &tomato_request());
        assert_eq!(recipe.title, "Tomato Quinoa Bowl");
        assert_eq!(recipe.description, "A bright bowl with roasted tomatoes.");
        assert_eq!(recipe.cooking_time, 25);
        assert_eq!(recipe.difficulty, Difficulty::Easy);
        assert_eq!(recipe.ingredients.len(), 4);
        assert_eq!(
            recipe.ingredients[1],
            RecipeIngredient::new("Quinoa", "100 g", Category::Grain)
        );
        assert_eq!(
            recipe.steps,
            vec!["Rinse the quinoa.", "Roast the tomatoes.", "Combine everything."]
        );
        assert_eq!(
            recipe.nutritional_info,
            NutritionalInfo {
                calories: 480.0,
                proteins: 18.0,
                carbs: 62.0,
                fats: 14.0,
                fiber: 11.0,
            }
        );
        assert_eq!(
            recipe.plate_analysis,
            "Half the bowl is vegetables.\nA quarter is quinoa."
        );
        assert_eq!(recipe.tips, vec!["Toast the quinoa first.", "Add lemon zest."]);
        assert!(recipe.usage.is_none());
        assert!(recipe.created_at.is_none());
    }

    #[test]
    fn empty_reply_uses_defaults() {
        let recipe = parse_text_recipe("", &tomato_request());
        assert_eq!(recipe.title, "Recipe with Tomato");
        assert_eq!(recipe.description, DEFAULT_DESCRIPTION);
        assert_eq!(recipe.cooking_time, 30);
        assert_eq!(recipe.difficulty, Difficulty::Medium);
        assert!(recipe.ingredients.is_empty());
        assert!(recipe.steps.is_empty());
        assert!(recipe.tips.is_empty());
        assert_eq!(recipe.nutritional_info, NutritionalInfo::default());
        assert_eq!(recipe.plate_analysis, DEFAULT_PLATE_ANALYSIS);
    }

    #[test]
    fn ingredient_line_with_three_fields() {
        assert_eq!(
            parse_ingredient_line("• Tomato - 2 pcs - vegetable"),
            Some(RecipeIngredient::new("Tomato", "2 pcs", Category::Vegetable))
        );
    }

    #[test]
    fn malformed_ingredient_lines_are_skipped() {
        assert_eq!(parse_ingredient_line("• Tomato"), None);
        assert_eq!(parse_ingredient_line("Tomato - 2 pcs - vegetable"), None);
        assert_eq!(parse_ingredient_line("• Tomato - 2 pcs - dairy"), None);
    }

    #[test]
    fn ingredient_name_may_contain_separator() {
        assert_eq!(
            parse_ingredient_line("- Salt - and - pepper - a pinch - Fats"),
            Some(RecipeIngredient::new(
                "Salt - and - pepper",
                "a pinch",
                Category::Fat
            ))
        );
    }

    #[test]
    fn skipped_ingredient_does_not_end_section() {
        let raw = "INGREDIENTS:\n• Tomato\n• Rice - 1 cup - grain\n";
        let recipe = parse_text_recipe(raw, &tomato_request());
        assert_eq!(
            recipe.ingredients,
            vec![RecipeIngredient::new("Rice", "1 cup", Category::Grain)]
        );
    }

    #[test]
    fn nutrition_missing_fiber_keeps_default() {
        let lines = vec![
            "NUTRITION:",
            "Calories: 410",
            "Proteins: 22",
            "Carbs: 35",
            "Fats: 12",
        ];
        let info = parse_nutrition(&lines);
        assert_eq!(info.calories, 410.0);
        assert_eq!(info.proteins, 22.0);
        assert_eq!(info.carbs, 35.0);
        assert_eq!(info.fats, 12.0);
        assert_eq!(info.fiber, 8.0);
    }

    #[test]
    fn nutrition_window_is_five_lines() {
        let lines = vec![
            "NUTRITION:",
            "Calories: 410",
            "",
            "",
            "",
            "",
            "Fiber: 3",
        ];
        let info = parse_nutrition(&lines);
        assert_eq!(info.calories, 410.0);
        assert_eq!(info.fiber, 8.0);
    }

    #[test]
    fn sections_stop_at_blank_line_or_next_header() {
        let raw = "STEPS:\n1. Chop.\n2. Fry.\n\n3. Orphan step.\nTIPS:\n• Serve hot.\nDIFFICULTY: hard";
        let recipe = parse_text_recipe(raw, &tomato_request());
        assert_eq!(recipe.steps, vec!["Chop.", "Fry."]);
        assert_eq!(recipe.tips, vec!["Serve hot."]);
        assert_eq!(recipe.difficulty, Difficulty::Hard);
    }

    #[test]
    fn first_scalar_match_wins() {
        let raw = "TITLE: First\nTITLE: Second\nCOOKING_TIME: about twenty";
        let recipe = parse_text_recipe(raw, &tomato_request());
        assert_eq!(recipe.title, "First");
        assert_eq!(recipe.cooking_time, DEFAULT_COOKING_TIME);
    }

    #[test]
    fn unknown_difficulty_defaults_to_medium() {
        let recipe = parse_text_recipe("DIFFICULTY: brutal", &tomato_request());
        assert_eq!(recipe.difficulty, Difficulty::Medium);
    }

    #[test]
    fn plate_analysis_includes_inline_text() {
        let raw = "PLATE ANALYSIS: Balanced.\nMostly greens.\nTIPS:\n• Enjoy";
        let recipe = parse_text_recipe(raw, &tomato_request());
        assert_eq!(recipe.plate_analysis, "Balanced.\nMostly greens.");
    }

    proptest! {
        #[test]
        fn prop_any_text_yields_titled_recipe(raw in "(?s).{0,400}") {
            let recipe = parse_text_recipe(&raw, &tomato_request());
            prop_assert!(!recipe.title.is_empty());
            prop_assert!(!recipe.description.is_empty());
        }

        #[test]
        fn prop_missing_nutrition_block_keeps_defaults(raw in "[a-z \n]{0,200}") {
            let recipe = parse_text_recipe(&raw, &tomato_request());
            prop_assert_eq!(recipe.nutritional_info, NutritionalInfo::default());
        }
    }
}
