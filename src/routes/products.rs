use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::catalog::ProductList,
    error::AppResult,
    models::ProductDetail,
    product_kind::ProductKind,
    response::ApiResponse,
    routes::params::{LatestQuery, ProductQuery},
    services::catalog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/latest", get(latest_products))
        .route("/{ct_model}", get(list_products))
        .route("/{ct_model}/{slug}", get(get_product))
}

#[utoipa::path(
    get,
    path = "/api/products/latest",
    params(
        ("with_respect_to" = Option<String>, Query, description = "Kind to list first: notebook, smartphone")
    ),
    responses(
        (status = 200, description = "Newest products of every kind", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn latest_products(
    State(state): State<AppState>,
    Query(query): Query<LatestQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = catalog_service::latest_products(&state, query.with_respect_to.as_deref()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{ct_model}",
    params(
        ("ct_model" = String, Path, description = "Product kind: notebook, smartphone"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("sort_by" = Option<String>, Query, description = "Sort by: created_at, price, title"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "Published products of one kind", body = ApiResponse<ProductList>),
        (status = 404, description = "Unknown product kind"),
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Path(ct_model): Path<String>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let kind = ProductKind::from_discriminator(&ct_model)?;
    let resp = catalog_service::list_products(&state, kind, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{ct_model}/{slug}",
    params(
        ("ct_model" = String, Path, description = "Product kind: notebook, smartphone"),
        ("slug" = String, Path, description = "Product slug")
    ),
    responses(
        (status = 200, description = "Product with its specs", body = ApiResponse<ProductDetail>),
        (status = 404, description = "Unknown kind or product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path((ct_model, slug)): Path<(String, String)>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let kind = ProductKind::from_discriminator(&ct_model)?;
    let resp = catalog_service::get_product(&state, kind, &slug).await?;
    Ok(Json(resp))
}
