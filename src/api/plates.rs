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
    bad_request_response, internal_error_response, mutation_response, not_found_response,
    AppState, AuthenticatedContext, RequestContext,
};
use crate::db::Plate;
use crate::error::ValidationError;
use crate::recipe::{types::validate_ingredients, IngredientInput};

#[derive(Debug, Deserialize)]
pub(super) struct PlateRequest {
    name: String,
    ingredients: Vec<IngredientInput>,
}

#[derive(Debug, Serialize)]
struct PlatesResponse {
    plates: Vec<Plate>,
}

pub(super) async fn list_plates(
    State(state): State<AppState>,
    Extension(context): Extension<AuthenticatedContext>,
    Extension(request): Extension<RequestContext>,
) -> Response {
    match state.db.list_plates(context.user_id).await {
        Ok(plates) => (StatusCode::OK, Json(PlatesResponse { plates })).into_response(),
        Err(err) => {
            tracing::error!(
                request_id = %request.request_id,
                user_id = context.user_id.0,
                error = %err,
                "Failed to list plates"
            );
            internal_error_response()
        }
    }
}

pub(super) async fn create_plate(
    State(state): State<AppState>,
    Extension(context): Extension<AuthenticatedContext>,
    Extension(request): Extension<RequestContext>,
    ApiJson(payload): ApiJson<PlateRequest>,
) -> Response {
    let name = payload.name.trim();
    if name.is_empty() {
        return bad_request_response(ValidationError::Empty("name"));
    }
    if let Err(err) = validate_ingredients(&payload.ingredients) {
        tracing::debug!(request_id = %request.request_id, error = %err, "Invalid plate");
        return bad_request_response(err);
    }
    match state
        .db
        .create_plate(
            context.user_id,
            name,
            &payload.ingredients,
            Utc::now().timestamp(),
        )
        .await
    {
        Ok(plate) => (StatusCode::CREATED, Json(plate)).into_response(),
        Err(err) => {
            tracing::error!(
                request_id = %request.request_id,
                user_id = context.user_id.0,
                error = %err,
                "Failed to save plate"
            );
            internal_error_response()
        }
    }
}

pub(super) async fn get_plate(
    State(state): State<AppState>,
    Extension(context): Extension<AuthenticatedContext>,
    Extension(request): Extension<RequestContext>,
    Path(id): Path<i64>,
) -> Response {
    match state.db.get_plate(context.user_id, id).await {
        Ok(Some(plate)) => (StatusCode::OK, Json(plate)).into_response(),
        Ok(None) => not_found_response(),
        Err(err) => {
            tracing::error!(
                request_id = %request.request_id,
                user_id = context.user_id.0,
                plate_id = id,
                error = %err,
                "Failed to load plate"
            );
            internal_error_response()
        }
    }
}

pub(super) async fn delete_plate(
    State(state): State<AppState>,
    Extension(context): Extension<AuthenticatedContext>,
    Extension(request): Extension<RequestContext>,
    Path(id): Path<i64>,
) -> Response {
    match state.db.delete_plate(context.user_id, id).await {
        Ok(affected) => mutation_response(affected),
        Err(err) => {
            tracing::error!(
                request_id = %request.request_id,
                user_id = context.user_id.0,
                plate_id = id,
                error = %err,
                "Failed to delete plate"
            );
            internal_error_response()
        }
    }
}
