use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, HeaderName, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::ai::RecipeGenerator;
use crate::db::{Database, UserId};
use crate::system_info::{build_info, BuildInfo};

mod extract;
mod ingredients;
mod plates;
mod recipes;
mod users;

#[derive(Debug, Serialize)]
struct MutationResponse {
    affected: u64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    build: BuildInfo,
}

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub rate_limit_per_second: Option<u64>,
}

/// Everything the handlers need, constructed once in `run()`.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub generator: Option<RecipeGenerator>,
    pub fallback_on_failure: bool,
}

impl AppState {
    pub fn new(db: Database, generator: Option<RecipeGenerator>) -> Self {
        Self {
            db,
            generator,
            fallback_on_failure: true,
        }
    }
}

#[derive(Clone, Debug)]
struct RequestContext {
    request_id: String,
}

#[derive(Clone, Debug)]
struct AuthenticatedContext {
    user_id: UserId,
    token: String,
    token_preview: String,
}

/// Sliding one-second window shared by every route.
#[derive(Debug)]
struct RateLimiter {
    limit: u64,
    window: Duration,
    hits: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    fn per_second(limit: u64) -> Self {
        Self {
            limit,
            window: Duration::from_secs(1),
            hits: Mutex::new(VecDeque::new()),
        }
    }

    /// Records a hit at `now` unless the window is already full.
    async fn try_acquire(&self, now: Instant) -> bool {
        let mut hits = self.hits.lock().await;
        while hits
            .front()
            .is_some_and(|hit| now.duration_since(*hit) >= self.window)
        {
            hits.pop_front();
        }
        if hits.len() as u64 >= self.limit {
            return false;
        }
        hits.push_back(now);
        true
    }
}

pub fn router(state: AppState, config: ApiConfig) -> Router {
    let auth_layer = middleware::from_fn_with_state(state.db.clone(), require_auth);
    let request_id_layer = middleware::from_fn(assign_request_id);

    let mut public = Router::new()
        .route("/health", get(health))
        .route("/api/register", post(users::register));

    let mut protected = Router::new()
        .route(
            "/api/me",
            get(users::get_me)
                .put(users::update_me)
                .delete(users::delete_me),
        )
        .route(
            "/api/tokens",
            get(users::list_tokens).post(users::issue_token),
        )
        .route("/api/tokens/current", delete(users::revoke_current_token))
        .route(
            "/api/ingredients",
            get(ingredients::list_ingredients).post(ingredients::add_ingredient),
        )
        .route(
            "/api/ingredients/:id",
            put(ingredients::update_ingredient)
                .delete(ingredients::delete_ingredient),
        )
        .route(
            "/api/plates",
            get(plates::list_plates).post(plates::create_plate),
        )
        .route(
            "/api/plates/:id",
            get(plates::get_plate).delete(plates::delete_plate),
        )
        .route("/api/plates/:id/recipe", post(recipes::generate_from_plate))
        .route("/api/recipes/generate", post(recipes::generate_recipe))
        .route("/api/recipes", get(recipes::list_recipes))
        .route(
            "/api/recipes/:id",
            get(recipes::get_recipe).delete(recipes::delete_recipe),
        );

    if let Some(rate_limit) = config.rate_limit_per_second {
        let limiter = Arc::new(RateLimiter::per_second(rate_limit));
        public = public.route_layer(middleware::from_fn_with_state(
            limiter.clone(),
            rate_limit_requests,
        ));
        protected =
            protected.route_layer(middleware::from_fn_with_state(limiter, rate_limit_requests));
    }

    public
        .merge(protected.route_layer(auth_layer))
        .with_state(state)
        .layer(request_id_layer)
}

async fn health() -> Response {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            build: build_info(),
        }),
    )
        .into_response()
}

async fn require_auth(State(db): State<Database>, mut req: Request<Body>, next: Next) -> Response {
    let request_id = req
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.as_str())
        .unwrap_or("unknown");
    let token = match extract_bearer_token(req.headers()) {
        Some(token) => token,
        None => {
            tracing::debug!(request_id, "Missing bearer token");
            return unauthorized_response();
        }
    };

    let preview = token_preview(&token);
    tracing::debug!(request_id, token_preview = %preview, "Checking bearer token");
    let used_at = chrono::Utc::now().timestamp();
    let user_id = match db.use_token(&token, used_at).await {
        Ok(Some(user_id)) => user_id,
        Ok(None) => {
            tracing::debug!(request_id, token_preview = %preview, "Bearer token rejected");
            return unauthorized_response();
        }
        Err(err) => {
            tracing::error!(request_id, token_preview = %preview, error = %err, "Failed to validate bearer token");
            return internal_error_response();
        }
    };

    tracing::debug!(
        request_id,
        user_id = user_id.0,
        token_preview = %preview,
        "Authenticated API request"
    );
    req.extensions_mut().insert(AuthenticatedContext {
        user_id,
        token,
        token_preview: preview,
    });
    next.run(req).await
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            value
                .strip_prefix("Bearer ")
                .or_else(|| value.strip_prefix("bearer "))
        })
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

fn token_preview(token: &str) -> String {
    token.chars().take(6).collect()
}

async fn assign_request_id(mut req: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    req.extensions_mut().insert(RequestContext {
        request_id: request_id.clone(),
    });
    let method = req.method().clone();
    let uri = req.uri().clone();
    let mut response = next.run(req).await;
    let status = response.status();
    if let Ok(header_value) = request_id.parse() {
        response
            .headers_mut()
            .insert(HeaderName::from_static("x-request-id"), header_value);
    }
    tracing::debug!(
        request_id,
        method = %method,
        uri = %uri,
        status = %status,
        "API request completed"
    );
    response
}

async fn rate_limit_requests(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let request_id = req
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.as_str())
        .unwrap_or("unknown");
    let token_preview = req
        .extensions()
        .get::<AuthenticatedContext>()
        .map(|ctx| ctx.token_preview.as_str())
        .unwrap_or("anonymous");
    if !limiter.try_acquire(Instant::now()).await {
        tracing::debug!(request_id, token_preview, "API rate limit exceeded");
        return error_response(StatusCode::TOO_MANY_REQUESTS, "rate_limited", None);
    }
    next.run(req).await
}

fn error_response(status: StatusCode, error: &'static str, detail: Option<String>) -> Response {
    (status, Json(ErrorResponse { error, detail })).into_response()
}

fn unauthorized_response() -> Response {
    error_response(StatusCode::UNAUTHORIZED, "unauthorized", None)
}

fn internal_error_response() -> Response {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
}

fn bad_request_response(detail: impl ToString) -> Response {
    error_response(
        StatusCode::BAD_REQUEST,
        "invalid_request",
        Some(detail.to_string()),
    )
}

fn not_found_response() -> Response {
    error_response(StatusCode::NOT_FOUND, "not_found", None)
}

fn mutation_response(affected: u64) -> Response {
    if affected == 0 {
        return not_found_response();
    }
    (StatusCode::OK, Json(MutationResponse { affected })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::util::{init_test_db, test_user_with_token};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use proptest::prelude::*;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app(db: Database) -> Router {
        router(
            AppState::new(db, None),
            ApiConfig {
                rate_limit_per_second: None,
            },
        )
    }

    async fn body_json(response: Response) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let db = init_test_db().await;
        let response = app(db)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let payload = body_json(response).await;
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["build"]["package"], "plategate");
    }

    #[tokio::test]
    async fn protected_routes_require_auth() {
        let db = init_test_db().await;
        for (method, uri) in [
            ("GET", "/api/me"),
            ("GET", "/api/ingredients"),
            ("GET", "/api/plates"),
            ("GET", "/api/recipes"),
            ("POST", "/api/recipes/generate"),
        ] {
            let response = app(db.clone())
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert_eq!(body_json(response).await["error"], "unauthorized");
        }
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let db = init_test_db().await;
        let response = app(db)
            .oneshot(
                Request::builder()
                    .uri("/api/nothing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_token_rejected_and_not_stamped() {
        let db = init_test_db().await;
        let user = test_user_with_token(&db, "token-abc").await;

        let response = app(db.clone())
            .oneshot(
                Request::builder()
                    .uri("/api/me")
                    .header(AUTHORIZATION, "Bearer wrong-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let tokens = db.list_tokens(user).await.unwrap();
        assert!(tokens[0].last_used_at.is_none());
    }

    #[tokio::test]
    async fn register_then_read_profile() {
        let db = init_test_db().await;
        let app = app(db.clone());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/register")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::to_vec(&json!({ "name": "Maya", "email": "maya@example.com" }))
                            .unwrap(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let payload = body_json(response).await;
        let token = payload["token"].as_str().unwrap().to_string();
        assert_eq!(payload["user"]["name"], "Maya");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/me")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let payload = body_json(response).await;
        assert_eq!(payload["user"]["email"], "maya@example.com");
        assert_eq!(payload["total_tokens_used"], 0);
    }

    #[tokio::test]
    async fn register_rejects_blank_name() {
        let db = init_test_db().await;
        let response = app(db)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/register")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"name":"   "}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "invalid_request");
    }

    #[tokio::test]
    async fn revoked_token_stops_working() {
        let db = init_test_db().await;
        test_user_with_token(&db, "token-rev").await;
        let app = app(db);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/tokens/current")
                    .header(AUTHORIZATION, "Bearer token-rev")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/me")
                    .header(AUTHORIZATION, "Bearer token-rev")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn ingredient_crud_via_api() {
        let db = init_test_db().await;
        let user = test_user_with_token(&db, "token-ing").await;
        let app = app(db.clone());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/ingredients")
                    .header(AUTHORIZATION, "Bearer token-ing")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"name":"Kale","category":"vegetable"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let id = body_json(response).await["id"].as_i64().unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri(format!("/api/ingredients/{id}"))
                    .header(AUTHORIZATION, "Bearer token-ing")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"name":"Spinach","category":"vegetable"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(db.list_ingredients(user).await.unwrap()[0].name, "Spinach");

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/ingredients/{id}"))
                    .header(AUTHORIZATION, "Bearer token-ing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/ingredients/{id}"))
                    .header(AUTHORIZATION, "Bearer token-ing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn plate_validation_and_lookup() {
        let db = init_test_db().await;
        test_user_with_token(&db, "token-plate").await;
        let app = app(db);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/plates")
                    .header(AUTHORIZATION, "Bearer token-plate")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"name":"Empty","ingredients":[]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/plates")
                    .header(AUTHORIZATION, "Bearer token-plate")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::to_vec(&json!({
                            "name": "Bowl",
                            "ingredients": [
                                {"name": "Rice", "category": "grain"},
                                {"name": "Tofu", "category": "protein"}
                            ]
                        }))
                        .unwrap(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let id = body_json(response).await["id"].as_i64().unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/plates/{id}"))
                    .header(AUTHORIZATION, "Bearer token-plate")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let payload = body_json(response).await;
        assert_eq!(payload["name"], "Bowl");
        assert_eq!(payload["ingredients"][1]["category"], "protein");
    }

    #[tokio::test]
    async fn rate_limit_applies_to_public_routes() {
        let db = init_test_db().await;
        let app = router(
            AppState::new(db, None),
            ApiConfig {
                rate_limit_per_second: Some(1),
            },
        );
        let first = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        let second = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body_json(second).await["error"], "rate_limited");
    }

    #[tokio::test]
    async fn limiter_frees_slots_after_window() {
        let limiter = RateLimiter::per_second(2);
        let start = Instant::now();
        assert!(limiter.try_acquire(start).await);
        assert!(limiter.try_acquire(start).await);
        assert!(!limiter.try_acquire(start + Duration::from_millis(500)).await);
        assert!(limiter.try_acquire(start + Duration::from_secs(1)).await);
    }

    proptest! {
        #[test]
        fn bearer_token_parses_from_header(token in "[A-Za-z0-9_-]{1,64}") {
            let mut headers = HeaderMap::new();
            headers.insert(
                AUTHORIZATION,
                format!("Bearer {token}").parse().unwrap(),
            );
            let parsed = extract_bearer_token(&headers);
            prop_assert_eq!(parsed, Some(token));
        }
    }
}
