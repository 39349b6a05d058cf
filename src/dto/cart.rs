use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Cart, CartLine};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeQtyRequest {
    pub qty: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub cart: Cart,
    pub lines: Vec<CartLine>,
    /// Marker an anonymous client sends back in `x-cart-token`.
    pub cart_token: Option<Uuid>,
}
