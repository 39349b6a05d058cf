use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Category, ProductRef, SidebarCategory};

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<ProductRef>)]
    pub items: Vec<ProductRef>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct SidebarList {
    #[schema(value_type = Vec<SidebarCategory>)]
    pub items: Vec<SidebarCategory>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryDetail {
    pub category: Category,
    pub products: Vec<ProductRef>,
    pub categories: Vec<SidebarCategory>,
}
