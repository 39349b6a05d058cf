use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue},
    routing::{get, post},
};

use crate::{
    dto::cart::{CartView, ChangeQtyRequest},
    error::AppResult,
    middleware::{
        auth::{CART_TOKEN_HEADER, Identity},
        cart::CurrentCart,
    },
    product_kind::ProductKind,
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

type CartResponse = AppResult<(HeaderMap, Json<ApiResponse<CartView>>)>;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(view_cart)).route(
        "/{ct_model}/{slug}",
        post(add_to_cart)
            .patch(change_qty)
            .delete(remove_from_cart),
    )
}

// Product routes resolve the cart only after the kind is known, so an
// unknown kind never creates a cart.

/// Anonymous carts echo their token so the client can send it back.
fn respond(resp: ApiResponse<CartView>) -> CartResponse {
    let mut headers = HeaderMap::new();
    let token = resp.data.as_ref().and_then(|view| view.cart_token);
    if let Some(value) = token.and_then(|t| HeaderValue::from_str(&t.to_string()).ok()) {
        headers.insert(CART_TOKEN_HEADER, value);
    }
    Ok((headers, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    params(
        ("x-cart-token" = Option<String>, Header, description = "Anonymous cart token")
    ),
    responses(
        (status = 200, description = "Current cart with its lines", body = ApiResponse<CartView>)
    ),
    security((), ("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn view_cart(State(state): State<AppState>, current: CurrentCart) -> CartResponse {
    respond(cart_service::view_cart(&state, &current).await?)
}

#[utoipa::path(
    post,
    path = "/api/cart/{ct_model}/{slug}",
    params(
        ("ct_model" = String, Path, description = "Product kind: notebook, smartphone"),
        ("slug" = String, Path, description = "Product slug"),
        ("x-cart-token" = Option<String>, Header, description = "Anonymous cart token")
    ),
    responses(
        (status = 200, description = "Product added to cart", body = ApiResponse<CartView>),
        (status = 404, description = "Unknown kind or product not found"),
        (status = 409, description = "Cart already finalized"),
    ),
    security((), ("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    Path((ct_model, slug)): Path<(String, String)>,
    State(state): State<AppState>,
    identity: Identity,
) -> CartResponse {
    let kind = ProductKind::from_discriminator(&ct_model)?;
    let current = cart_service::resolve_cart(&state, identity).await?;
    respond(cart_service::add_to_cart(&state, &current, kind, &slug).await?)
}

#[utoipa::path(
    patch,
    path = "/api/cart/{ct_model}/{slug}",
    params(
        ("ct_model" = String, Path, description = "Product kind: notebook, smartphone"),
        ("slug" = String, Path, description = "Product slug"),
        ("x-cart-token" = Option<String>, Header, description = "Anonymous cart token")
    ),
    request_body = ChangeQtyRequest,
    responses(
        (status = 200, description = "Quantity changed", body = ApiResponse<CartView>),
        (status = 400, description = "Quantity below 1"),
        (status = 404, description = "Product is not in the cart"),
    ),
    security((), ("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn change_qty(
    Path((ct_model, slug)): Path<(String, String)>,
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<ChangeQtyRequest>,
) -> CartResponse {
    let kind = ProductKind::from_discriminator(&ct_model)?;
    let current = cart_service::resolve_cart(&state, identity).await?;
    respond(cart_service::change_qty(&state, &current, kind, &slug, payload.qty).await?)
}

#[utoipa::path(
    delete,
    path = "/api/cart/{ct_model}/{slug}",
    params(
        ("ct_model" = String, Path, description = "Product kind: notebook, smartphone"),
        ("slug" = String, Path, description = "Product slug"),
        ("x-cart-token" = Option<String>, Header, description = "Anonymous cart token")
    ),
    responses(
        (status = 200, description = "Product removed from cart", body = ApiResponse<CartView>),
        (status = 404, description = "Product is not in the cart"),
    ),
    security((), ("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    Path((ct_model, slug)): Path<(String, String)>,
    State(state): State<AppState>,
    identity: Identity,
) -> CartResponse {
    let kind = ProductKind::from_discriminator(&ct_model)?;
    let current = cart_service::resolve_cart(&state, identity).await?;
    respond(cart_service::remove_from_cart(&state, &current, kind, &slug).await?)
}
