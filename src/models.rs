use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::orders::{BuyingType, OrderStatus},
    product_kind::ProductKind,
};

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: Option<String>,
    pub slug: String,
    pub url: String,
}

/// Sidebar entry: a category and how many products it holds.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SidebarCategory {
    pub name: Option<String>,
    pub slug: String,
    pub url: String,
    pub count: i64,
}

/// Fields shared by every product kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductRef {
    pub kind: ProductKind,
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub image: Option<String>,
    pub is_published: bool,
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NotebookSpecs {
    pub diagonal: String,
    pub display_type: String,
    pub processor_freq: String,
    pub ram: String,
    pub video: String,
    pub time_without_charge: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SmartphoneSpecs {
    pub diagonal: String,
    pub display_type: String,
    pub resolution: String,
    pub accum_volume: String,
    pub ram: String,
    pub sd: bool,
    pub sd_volume_max: Option<String>,
    pub main_cam_mp: String,
    pub frontal_cam_mp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProductSpecs {
    Notebook(NotebookSpecs),
    Smartphone(SmartphoneSpecs),
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductDetail {
    pub product: ProductRef,
    pub category: Option<Category>,
    pub specs: ProductSpecs,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    pub id: Uuid,
    pub user_id: Uuid,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    pub id: Uuid,
    pub owner_id: Option<Uuid>,
    pub for_anonymous_user: bool,
    pub in_order: bool,
    pub total_products: i32,
    #[schema(value_type = String)]
    pub final_price: Decimal,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub id: Uuid,
    pub content_type: ProductKind,
    pub object_id: Uuid,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub qty: i32,
    #[schema(value_type = String)]
    pub final_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub cart_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: Option<String>,
    pub status: OrderStatus,
    pub buying_type: BuyingType,
    pub comment: Option<String>,
    #[schema(value_type = String)]
    pub final_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub order_date: NaiveDate,
}

pub fn product_url(kind: ProductKind, slug: &str) -> String {
    format!("/api/products/{}/{}", kind.as_str(), slug)
}

pub fn category_url(slug: &str) -> String {
    format!("/api/categories/{slug}")
}
