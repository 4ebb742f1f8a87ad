use axum::{
    extract::State,
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
use crate::db::{generate_token, TokenInfo, User};
use crate::error::ValidationError;

#[derive(Debug, Deserialize)]
pub(super) struct ProfileRequest {
    name: String,
    #[serde(default)]
    email: Option<String>,
}

impl ProfileRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Empty("name"));
        }
        Ok(())
    }

    fn email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}

#[derive(Debug, Serialize)]
struct RegisterResponse {
    user: User,
    token: String,
}

#[derive(Debug, Serialize)]
struct ProfileResponse {
    user: User,
    total_tokens_used: i64,
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    token: String,
}

#[derive(Debug, Serialize)]
struct TokensResponse {
    tokens: Vec<TokenInfo>,
}

pub(super) async fn register(
    State(state): State<AppState>,
    Extension(request): Extension<RequestContext>,
    ApiJson(payload): ApiJson<ProfileRequest>,
) -> Response {
    if let Err(err) = payload.validate() {
        tracing::debug!(request_id = %request.request_id, error = %err, "Invalid registration");
        return bad_request_response(err);
    }

    let token = generate_token();
    let user = match state
        .db
        .register_user(
            payload.name.trim(),
            payload.email(),
            &token,
            Utc::now().timestamp(),
        )
        .await
    {
        Ok(user) => user,
        Err(err) => {
            tracing::error!(request_id = %request.request_id, error = %err, "Failed to register user");
            return internal_error_response();
        }
    };

    tracing::info!(request_id = %request.request_id, user_id = user.id.0, "Registered user");
    (StatusCode::CREATED, Json(RegisterResponse { user, token })).into_response()
}

pub(super) async fn get_me(
    State(state): State<AppState>,
    Extension(context): Extension<AuthenticatedContext>,
    Extension(request): Extension<RequestContext>,
) -> Response {
    let user = match state.db.get_user(context.user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return not_found_response(),
        Err(err) => {
            tracing::error!(
                request_id = %request.request_id,
                user_id = context.user_id.0,
                error = %err,
                "Failed to load user"
            );
            return internal_error_response();
        }
    };
    let total_tokens_used = match state.db.total_tokens_used(context.user_id).await {
        Ok(total) => total,
        Err(err) => {
            tracing::error!(
                request_id = %request.request_id,
                user_id = context.user_id.0,
                error = %err,
                "Failed to sum token usage"
            );
            return internal_error_response();
        }
    };
    (
        StatusCode::OK,
        Json(ProfileResponse {
            user,
            total_tokens_used,
        }),
    )
        .into_response()
}

pub(super) async fn update_me(
    State(state): State<AppState>,
    Extension(context): Extension<AuthenticatedContext>,
    Extension(request): Extension<RequestContext>,
    ApiJson(payload): ApiJson<ProfileRequest>,
) -> Response {
    if let Err(err) = payload.validate() {
        return bad_request_response(err);
    }
    match state
        .db
        .update_user(context.user_id, payload.name.trim(), payload.email())
        .await
    {
        Ok(affected) => mutation_response(affected),
        Err(err) => {
            tracing::error!(
                request_id = %request.request_id,
                user_id = context.user_id.0,
                error = %err,
                "Failed to update user"
            );
            internal_error_response()
        }
    }
}

pub(super) async fn delete_me(
    State(state): State<AppState>,
    Extension(context): Extension<AuthenticatedContext>,
    Extension(request): Extension<RequestContext>,
) -> Response {
    match state.db.delete_user(context.user_id).await {
        Ok(affected) => {
            tracing::info!(
                request_id = %request.request_id,
                user_id = context.user_id.0,
                "Deleted user"
            );
            mutation_response(affected)
        }
        Err(err) => {
            tracing::error!(
                request_id = %request.request_id,
                user_id = context.user_id.0,
                error = %err,
                "Failed to delete user"
            );
            internal_error_response()
        }
    }
}

pub(super) async fn issue_token(
    State(state): State<AppState>,
    Extension(context): Extension<AuthenticatedContext>,
    Extension(request): Extension<RequestContext>,
) -> Response {
    let token = generate_token();
    match state
        .db
        .create_token(context.user_id, &token, Utc::now().timestamp())
        .await
    {
        Ok(()) => (StatusCode::CREATED, Json(TokenResponse { token })).into_response(),
        Err(err) => {
            tracing::error!(
                request_id = %request.request_id,
                user_id = context.user_id.0,
                error = %err,
                "Failed to issue token"
            );
            internal_error_response()
        }
    }
}

pub(super) async fn list_tokens(
    State(state): State<AppState>,
    Extension(context): Extension<AuthenticatedContext>,
    Extension(request): Extension<RequestContext>,
) -> Response {
    match state.db.list_tokens(context.user_id).await {
        Ok(tokens) => (StatusCode::OK, Json(TokensResponse { tokens })).into_response(),
        Err(err) => {
            tracing::error!(
                request_id = %request.request_id,
                user_id = context.user_id.0,
                error = %err,
                "Failed to list tokens"
            );
            internal_error_response()
        }
    }
}

pub(super) async fn revoke_current_token(
    State(state): State<AppState>,
    Extension(context): Extension<AuthenticatedContext>,
    Extension(request): Extension<RequestContext>,
) -> Response {
    match state
        .db
        .revoke_token(context.user_id, &context.token, Utc::now().timestamp())
        .await
    {
        Ok(revoked) => {
            tracing::debug!(
                request_id = %request.request_id,
                token_preview = %context.token_preview,
                revoked,
                "Revoked token"
            );
            mutation_response(u64::from(revoked))
        }
        Err(err) => {
            tracing::error!(
                request_id = %request.request_id,
                token_preview = %context.token_preview,
                error = %err,
                "Failed to revoke token"
            );
            internal_error_response()
        }
    }
}
