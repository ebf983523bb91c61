//! # REST Routes
//!
//! Thin handlers: extract, call a service, wrap the result in JSON.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Public                       │  Bearer token required (AuthUser)       │
//! │  ───────────────────────────  │  ─────────────────────────────────────  │
//! │  GET  /health                 │  GET    /auth/me                        │
//! │  POST /auth/register          │  GET    /cart          DELETE /cart     │
//! │  POST /auth/login             │  POST   /cart/items                     │
//! │  GET  /restaurants            │  PATCH  /cart/items/{id}  DELETE ...    │
//! │  GET  /restaurants/{id}       │  POST   /checkout                       │
//! │  GET  /restaurants/{id}/      │  GET    /orders   GET /orders/{code}    │
//! │       reviews                 │  PATCH  /orders/{code}/status           │
//! │                               │  POST   /reviews  GET /reviews/me       │
//! │                               │  PATCH  /reviews/{id}  DELETE ...       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use axum::extract::{FromRequestParts, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};

use feast_core::cart::CartView;
use feast_core::pagination::Paginated;
use feast_core::{Order, RestaurantDetail, RestaurantListing, Review, ReviewDetail, User};

use crate::auth::extract_bearer_token;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::services::auth_service::{AuthResponse, AuthService, LoginRequest, RegisterRequest};
use crate::services::cart_service::{
    AddItemRequest, CartEntryResponse, CartService, ClearedCart, UpdateQuantityRequest,
};
use crate::services::catalog_service::{CatalogService, RestaurantQuery};
use crate::services::checkout_service::{CheckoutRequest, CheckoutService};
use crate::services::health_service::{HealthService, ServingStatus};
use crate::services::order_service::{OrderDetail, OrderQuery, OrderService, UpdateStatusRequest};
use crate::services::review_service::{
    CreateReviewRequest, PageQuery, RestaurantReviews, ReviewQuery, ReviewService,
    UpdateReviewRequest,
};
use crate::state::AppState;

type AppStateRef = State<Arc<AppState>>;

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        // Auth
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        // Catalog
        .route("/restaurants", get(list_restaurants))
        .route("/restaurants/{id}", get(restaurant_detail))
        .route("/restaurants/{id}/reviews", get(restaurant_reviews))
        // Cart
        .route("/cart", get(view_cart).delete(clear_cart))
        .route("/cart/items", post(add_cart_item))
        .route("/cart/items/{id}", patch(update_cart_item).delete(remove_cart_item))
        // Orders
        .route("/checkout", post(checkout))
        .route("/orders", get(list_orders))
        .route("/orders/{code}", get(get_order))
        .route("/orders/{code}/status", patch(update_order_status))
        // Reviews
        .route("/reviews", post(create_review))
        .route("/reviews/me", get(my_reviews))
        .route("/reviews/{id}", patch(update_review).delete(delete_review))
        .with_state(state)
}

// =============================================================================
// Authenticated User Extractor
// =============================================================================

/// The user id behind a valid `Authorization: Bearer <token>` header.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub i64);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthenticated("Missing Authorization header"))?;

        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::unauthenticated("Expected a Bearer token"))?;

        let user_id = AuthService::new(state.clone()).authenticate(token).await?;
        Ok(AuthUser(user_id))
    }
}

// =============================================================================
// Health
// =============================================================================

async fn health(State(state): AppStateRef) -> impl IntoResponse {
    let report = HealthService::new(state).check().await;
    let status = match report.status {
        ServingStatus::Serving => StatusCode::OK,
        ServingStatus::NotServing => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(report))
}

// =============================================================================
// Auth
// =============================================================================

async fn register(
    State(state): AppStateRef,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let response = AuthService::new(state).register(body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn login(
    State(state): AppStateRef,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    Ok(Json(AuthService::new(state).login(body).await?))
}

async fn me(State(state): AppStateRef, AuthUser(user_id): AuthUser) -> ApiResult<Json<User>> {
    Ok(Json(AuthService::new(state).me(user_id).await?))
}

// =============================================================================
// Catalog
// =============================================================================

async fn list_restaurants(
    State(state): AppStateRef,
    ApiQuery(query): ApiQuery<RestaurantQuery>,
) -> ApiResult<Json<Paginated<RestaurantListing>>> {
    Ok(Json(CatalogService::new(state).list(query).await?))
}

async fn restaurant_detail(
    State(state): AppStateRef,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<RestaurantDetail>> {
    Ok(Json(CatalogService::new(state).detail(id).await?))
}

async fn restaurant_reviews(
    State(state): AppStateRef,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<ReviewQuery>,
) -> ApiResult<Json<RestaurantReviews>> {
    Ok(Json(ReviewService::new(state).for_restaurant(id, query).await?))
}

// =============================================================================
// Cart
// =============================================================================

async fn view_cart(State(state): AppStateRef, AuthUser(user_id): AuthUser) -> ApiResult<Json<CartView>> {
    Ok(Json(CartService::new(state).view(user_id).await?))
}

async fn add_cart_item(
    State(state): AppStateRef,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<AddItemRequest>,
) -> ApiResult<(StatusCode, Json<CartEntryResponse>)> {
    let entry = CartService::new(state).add_item(user_id, body).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn update_cart_item(
    State(state): AppStateRef,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<UpdateQuantityRequest>,
) -> ApiResult<Json<CartEntryResponse>> {
    Ok(Json(CartService::new(state).update_quantity(user_id, id, body).await?))
}

async fn remove_cart_item(
    State(state): AppStateRef,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    CartService::new(state).remove_item(user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_cart(
    State(state): AppStateRef,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<ClearedCart>> {
    Ok(Json(CartService::new(state).clear(user_id).await?))
}

// =============================================================================
// Checkout & Orders
// =============================================================================

async fn checkout(
    State(state): AppStateRef,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<CheckoutRequest>,
) -> ApiResult<(StatusCode, Json<OrderDetail>)> {
    let order = CheckoutService::new(state).checkout(user_id, body).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn list_orders(
    State(state): AppStateRef,
    AuthUser(user_id): AuthUser,
    ApiQuery(query): ApiQuery<OrderQuery>,
) -> ApiResult<Json<Paginated<Order>>> {
    Ok(Json(OrderService::new(state).list(user_id, query).await?))
}

async fn get_order(
    State(state): AppStateRef,
    AuthUser(user_id): AuthUser,
    ApiPath(code): ApiPath<String>,
) -> ApiResult<Json<OrderDetail>> {
    Ok(Json(OrderService::new(state).get(user_id, &code).await?))
}

async fn update_order_status(
    State(state): AppStateRef,
    AuthUser(user_id): AuthUser,
    ApiPath(code): ApiPath<String>,
    ApiJson(body): ApiJson<UpdateStatusRequest>,
) -> ApiResult<Json<Order>> {
    Ok(Json(OrderService::new(state).set_status(user_id, &code, body).await?))
}

// =============================================================================
// Reviews
// =============================================================================

async fn create_review(
    State(state): AppStateRef,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<CreateReviewRequest>,
) -> ApiResult<(StatusCode, Json<Review>)> {
    let review = ReviewService::new(state).create(user_id, body).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

async fn my_reviews(
    State(state): AppStateRef,
    AuthUser(user_id): AuthUser,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<Paginated<ReviewDetail>>> {
    Ok(Json(ReviewService::new(state).mine(user_id, query).await?))
}

async fn update_review(
    State(state): AppStateRef,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<UpdateReviewRequest>,
) -> ApiResult<Json<Review>> {
    Ok(Json(ReviewService::new(state).update(user_id, id, body).await?))
}

async fn delete_review(
    State(state): AppStateRef,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    ReviewService::new(state).delete(user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Router Tests
// =============================================================================
