use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        orders::{OrderList, OrderWithLines, UpdateOrderStatusRequest},
        products::{CreateNotebookRequest, CreateSmartphoneRequest, UpdateProductRequest},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Order, ProductDetail},
    product_kind::ProductKind,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::{admin_service, product_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/notebooks", post(create_notebook))
        .route("/smartphones", post(create_smartphone))
        .route(
            "/products/{ct_model}/{slug}",
            patch(update_product).delete(delete_product),
        )
        .route("/orders", get(list_all_orders))
        .route("/orders/{id}", get(get_order_admin))
        .route("/orders/{id}/status", patch(update_order_status))
}

#[utoipa::path(
    post,
    path = "/api/admin/notebooks",
    request_body = CreateNotebookRequest,
    responses(
        (status = 201, description = "Notebook created", body = ApiResponse<ProductDetail>),
        (status = 404, description = "Unknown category"),
        (status = 409, description = "Slug already taken"),
        (status = 422, description = "Image outside the allowed bounds"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_notebook(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateNotebookRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ProductDetail>>)> {
    let resp = product_service::create_notebook(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/admin/smartphones",
    request_body = CreateSmartphoneRequest,
    responses(
        (status = 201, description = "Smartphone created", body = ApiResponse<ProductDetail>),
        (status = 404, description = "Unknown category"),
        (status = 409, description = "Slug already taken"),
        (status = 422, description = "Image outside the allowed bounds"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_smartphone(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateSmartphoneRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ProductDetail>>)> {
    let resp = product_service::create_smartphone(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    patch,
    path = "/api/admin/products/{ct_model}/{slug}",
    params(
        ("ct_model" = String, Path, description = "Product kind: notebook, smartphone"),
        ("slug" = String, Path, description = "Product slug")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<ProductDetail>),
        (status = 404, description = "Unknown kind or product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path((ct_model, slug)): Path<(String, String)>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let kind = ProductKind::from_discriminator(&ct_model)?;
    let resp = product_service::update_product(&state, &user, kind, &slug, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/products/{ct_model}/{slug}",
    params(
        ("ct_model" = String, Path, description = "Product kind: notebook, smartphone"),
        ("slug" = String, Path, description = "Product slug")
    ),
    responses(
        (status = 200, description = "Product deleted and removed from carts", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Unknown kind or product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path((ct_model, slug)): Path<(String, String)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let kind = ProductKind::from_discriminator(&ct_model)?;
    let resp = product_service::delete_product(&state, &user, kind, &slug).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status: new, in_progress, is_ready, completed"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "List all orders", body = ApiResponse<OrderList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = admin_service::list_all_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order with its lines", body = ApiResponse<OrderWithLines>),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_order_admin(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithLines>>> {
    let resp = admin_service::get_order_admin(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order status updated", body = ApiResponse<Order>),
        (status = 400, description = "Completed orders cannot change status"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = admin_service::update_order_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
