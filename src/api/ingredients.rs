use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::extract::ApiJson;
use super::{
    bad_request_response, internal_error_response, mutation_response, AppState,
    AuthenticatedContext, RequestContext,
};
use crate::db::Ingredient;
use crate::error::ValidationError;
use crate::recipe::Category;

#[derive(Debug, Deserialize)]
pub(super) struct IngredientRequest {
    name: String,
    category: Category,
}

#[derive(Debug, Serialize)]
struct IngredientsResponse {
    ingredients: Vec<Ingredient>,
}

pub(super) async fn list_ingredients(
    State(state): State<AppState>,
    Extension(context): Extension<AuthenticatedContext>,
    Extension(request): Extension<RequestContext>,
) -> Response {
    match state.db.list_ingredients(context.user_id).await {
        Ok(ingredients) => (StatusCode::OK, Json(IngredientsResponse { ingredients })).into_response(),
        Err(err) => {
            tracing::error!(
                request_id = %request.request_id,
                user_id = context.user_id.0,
                error = %err,
                "Failed to list ingredients"
            );
            internal_error_response()
        }
    }
}

pub(super) async fn add_ingredient(
    State(state): State<AppState>,
    Extension(context): Extension<AuthenticatedContext>,
    Extension(request): Extension<RequestContext>,
    ApiJson(payload): ApiJson<IngredientRequest>,
) -> Response {
    let name = payload.name.trim();
    if name.is_empty() {
        return bad_request_response(ValidationError::Empty("name"));
    }
    match state
        .db
        .add_ingredient(context.user_id, name, payload.category, Utc::now().timestamp())
        .await
    {
        Ok(ingredient) => (StatusCode::CREATED, Json(ingredient)).into_response(),
        Err(err) => {
            tracing::error!(
                request_id = %request.request_id,
                user_id = context.user_id.0,
                error = %err,
                "Failed to add ingredient"
            );
            internal_error_response()
        }
    }
}

pub(super) async fn update_ingredient(
    State(state): State<AppState>,
    Extension(context): Extension<AuthenticatedContext>,
    Extension(request): Extension<RequestContext>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<IngredientRequest>,
) -> Response {
    let name = payload.name.trim();
    if name.is_empty() {
        return bad_request_response(ValidationError::Empty("name"));
    }
    match state
        .db
        .update_ingredient(context.user_id, id, name, payload.category)
        .await
    {
        Ok(affected) => mutation_response(affected),
        Err(err) => {
            tracing::error!(
                request_id = %request.request_id,
                user_id = context.user_id.0,
                ingredient_id = id,
                error = %err,
                "Failed to update ingredient"
            );
            internal_error_response()
        }
    }
}

pub(super) async fn delete_ingredient(
    State(state): State<AppState>,
    Extension(context): Extension<AuthenticatedContext>,
    Extension(request): Extension<RequestContext>,
    Path(id): Path<i64>,
) -> Response {
    match state.db.delete_ingredient(context.user_id, id).await {
        Ok(affected) => mutation_response(affected),
        Err(err) => {
            tracing::error!(
                request_id = %request.request_id,
                user_id = context.user_id.0,
                ingredient_id = id,
                error = %err,
                "Failed to delete ingredient"
            );
            internal_error_response()
        }
    }
}
