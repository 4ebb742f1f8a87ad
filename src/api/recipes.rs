use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::extract::{ApiJson, OptionalApiJson};
use super::{
    bad_request_response, error_response, internal_error_response, mutation_response,
    not_found_response, AppState, AuthenticatedContext, RequestContext,
};
use crate::ai::{fallback_outcome, GenerationOutcome};
use crate::db::Generation;
use crate::error::GenerateError;
use crate::recipe::{RecipeGenerationRequest, RecipeResponse, RecipeSource};

/// Extra wishes for a recipe built from a saved plate.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PlateRecipeOptions {
    #[serde(default)]
    user_prompt: Option<String>,
    #[serde(default)]
    dietary_preferences: Option<Vec<String>>,
    #[serde(default)]
    cooking_time: Option<u32>,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    recipe: RecipeResponse,
    source: RecipeSource,
}

#[derive(Debug, Serialize)]
struct RecipesResponse {
    recipes: Vec<Generation>,
}

pub(super) async fn generate_recipe(
    State(state): State<AppState>,
    Extension(context): Extension<AuthenticatedContext>,
    Extension(request): Extension<RequestContext>,
    ApiJson(payload): ApiJson<RecipeGenerationRequest>,
) -> Response {
    generate_and_store(&state, &context, &request, payload).await
}

pub(super) async fn generate_from_plate(
    State(state): State<AppState>,
    Extension(context): Extension<AuthenticatedContext>,
    Extension(request): Extension<RequestContext>,
    Path(id): Path<i64>,
    OptionalApiJson(options): OptionalApiJson<PlateRecipeOptions>,
) -> Response {
    let plate = match state.db.get_plate(context.user_id, id).await {
        Ok(Some(plate)) => plate,
        Ok(None) => return not_found_response(),
        Err(err) => {
            tracing::error!(
                request_id = %request.request_id,
                user_id = context.user_id.0,
                plate_id = id,
                error = %err,
                "Failed to load plate"
            );
            return internal_error_response();
        }
    };

    let generation_request = RecipeGenerationRequest {
        ingredients: plate.ingredients,
        user_prompt: options.user_prompt,
        dietary_preferences: options.dietary_preferences,
        cooking_time: options.cooking_time,
    };
    generate_and_store(&state, &context, &request, generation_request).await
}

async fn generate_and_store(
    state: &AppState,
    context: &AuthenticatedContext,
    request: &RequestContext,
    generation_request: RecipeGenerationRequest,
) -> Response {
    if let Err(err) = generation_request.validate() {
        tracing::debug!(request_id = %request.request_id, error = %err, "Invalid generation request");
        return bad_request_response(err);
    }

    let outcome = match (&state.generator, state.fallback_on_failure) {
        (Some(generator), true) => generator.generate_or_fallback(&generation_request).await,
        (Some(generator), false) => match generator.generate(&generation_request).await {
            Ok(recipe) => GenerationOutcome {
                recipe,
                source: RecipeSource::Model,
            },
            Err(err) => {
                tracing::warn!(
                    request_id = %request.request_id,
                    user_id = context.user_id.0,
                    error = %err,
                    "Recipe generation failed"
                );
                return generate_error_response(&err);
            }
        },
        (None, true) => {
            tracing::debug!(request_id = %request.request_id, "No model configured, serving fallback recipe");
            fallback_outcome(&generation_request)
        }
        (None, false) => {
            return error_response(StatusCode::SERVICE_UNAVAILABLE, "ai_unavailable", None);
        }
    };

    if let Err(err) = state
        .db
        .save_generation(
            context.user_id,
            &generation_request,
            &outcome.recipe,
            outcome.source,
            Utc::now().timestamp(),
        )
        .await
    {
        tracing::error!(
            request_id = %request.request_id,
            user_id = context.user_id.0,
            recipe_id = %outcome.recipe.id,
            error = %err,
            "Failed to store generated recipe"
        );
        return internal_error_response();
    }

    (
        StatusCode::CREATED,
        Json(GenerateResponse {
            recipe: outcome.recipe,
            source: outcome.source,
        }),
    )
        .into_response()
}

fn generate_error_response(err: &GenerateError) -> Response {
    match err {
        GenerateError::Upstream(inner) => error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "ai_unavailable",
            Some(inner.to_string()),
        ),
        GenerateError::Parse(inner) => error_response(
            StatusCode::BAD_GATEWAY,
            "ai_bad_response",
            Some(inner.to_string()),
        ),
    }
}

pub(super) async fn list_recipes(
    State(state): State<AppState>,
    Extension(context): Extension<AuthenticatedContext>,
    Extension(request): Extension<RequestContext>,
) -> Response {
    match state.db.list_generations(context.user_id).await {
        Ok(recipes) => (StatusCode::OK, Json(RecipesResponse { recipes })).into_response(),
        Err(err) => {
            tracing::error!(
                request_id = %request.request_id,
                user_id = context.user_id.0,
                error = %err,
                "Failed to list recipes"
            );
            internal_error_response()
        }
    }
}

pub(super) async fn get_recipe(
    State(state): State<AppState>,
    Extension(context): Extension<AuthenticatedContext>,
    Extension(request): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Response {
    match state.db.get_generation(context.user_id, &id).await {
        Ok(Some(generation)) => (StatusCode::OK, Json(generation)).into_response(),
        Ok(None) => not_found_response(),
        Err(err) => {
            tracing::error!(
                request_id = %request.request_id,
                user_id = context.user_id.0,
                recipe_id = %id,
                error = %err,
                "Failed to load recipe"
            );
            internal_error_response()
        }
    }
}

pub(super) async fn delete_recipe(
    State(state): State<AppState>,
    Extension(context): Extension<AuthenticatedContext>,
    Extension(request): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Response {
    match state.db.delete_generation(context.user_id, &id).await {
        Ok(affected) => mutation_response(affected),
        Err(err) => {
            tracing::error!(
                request_id = %request.request_id,
                user_id = context.user_id.0,
                recipe_id = %id,
                error = %err,
                "Failed to delete recipe"
            );
            internal_error_response()
        }
    }
}
