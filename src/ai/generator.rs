use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::ai::client::ChatClient;
use crate::ai::config::{AiConfig, ResponseFormat};
use crate::ai::prompts::{build_user_prompt, system_prompt};
use crate::error::GenerateError;
use crate::recipe::{
    fallback_recipe, parse_json_recipe, parse_text_recipe, RecipeGenerationRequest,
    RecipeResponse, RecipeSource,
};

/// A recipe together with how it was produced.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub recipe: RecipeResponse,
    pub source: RecipeSource,
}

/// Prompt, call, parse. Built once at startup and shared by the API.
#[derive(Clone)]
pub struct RecipeGenerator {
    client: ChatClient,
    format: ResponseFormat,
}

impl RecipeGenerator {
    pub fn new(client: ChatClient, format: ResponseFormat) -> Self {
        Self { client, format }
    }

    pub fn from_config(config: &AiConfig) -> Self {
        Self::new(ChatClient::new(config), config.format)
    }

    /// Generate a recipe for an already validated request.
    ///
    /// With [`ResponseFormat::Text`] only upstream failures are possible; with
    /// [`ResponseFormat::Json`] a reply that does not hold a complete recipe
    /// object yields [`GenerateError::Parse`].
    #[instrument(level = "debug", skip_all, fields(format = ?self.format, ingredients = request.ingredients.len()))]
    pub async fn generate(
        &self,
        request: &RecipeGenerationRequest,
    ) -> Result<RecipeResponse, GenerateError> {
        let user_prompt = build_user_prompt(request);
        let completion = self
            .client
            .complete(
                system_prompt(self.format),
                &user_prompt,
                self.format == ResponseFormat::Json,
            )
            .await?;

        let mut recipe = match self.format {
            ResponseFormat::Text => parse_text_recipe(&completion.content, request),
            ResponseFormat::Json => parse_json_recipe(&completion.content)?,
        };
        recipe.usage = completion.usage;
        recipe.created_at = Some(Utc::now());

        info!(
            recipe_id = %recipe.id,
            title = %recipe.title,
            total_tokens = ?recipe.usage.map(|u| u.total_tokens),
            "Generated recipe"
        );
        Ok(recipe)
    }

    /// Like [`generate`](Self::generate) but never fails: errors are logged
    /// and replaced by the fallback recipe.
    pub async fn generate_or_fallback(&self, request: &RecipeGenerationRequest) -> GenerationOutcome {
        match self.generate(request).await {
            Ok(recipe) => GenerationOutcome {
                recipe,
                source: RecipeSource::Model,
            },
            Err(err) => {
                warn!(error = %err, "Recipe generation failed, using fallback recipe");
                fallback_outcome(request)
            }
        }
    }
}

pub fn fallback_outcome(request: &RecipeGenerationRequest) -> GenerationOutcome {
    let mut recipe = fallback_recipe(request);
    recipe.created_at = Some(Utc::now());
    GenerationOutcome {
        recipe,
        source: RecipeSource::Fallback,
    }
}
