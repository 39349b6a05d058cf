use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::image_policy::ImageUpload;

/// Fields every product kind is created with.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductFields {
    pub title: String,
    pub description: String,
    pub slug: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub category_slug: Option<String>,
    pub is_published: Option<bool>,
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateNotebookRequest {
    #[serde(flatten)]
    pub product: ProductFields,
    pub diagonal: String,
    pub display_type: String,
    pub processor_freq: String,
    pub ram: String,
    pub video: String,
    pub time_without_charge: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSmartphoneRequest {
    #[serde(flatten)]
    pub product: ProductFields,
    pub diagonal: String,
    pub display_type: String,
    pub resolution: String,
    pub accum_volume: String,
    pub ram: String,
    pub sd: Option<bool>,
    pub sd_volume_max: Option<String>,
    pub main_cam_mp: String,
    pub frontal_cam_mp: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub is_published: Option<bool>,
    pub category_slug: Option<String>,
}
