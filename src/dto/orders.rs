use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    entity::orders::{BuyingType, OrderStatus},
    models::{CartLine, Order},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: Option<String>,
    #[serde(default)]
    pub buying_type: BuyingType,
    pub comment: Option<String>,
    /// Requested pickup/delivery date, defaults to today.
    pub order_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithLines {
    pub order: Order,
    pub lines: Vec<CartLine>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
