use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};

use crate::{
    audit,
    dto::customers::UpdateProfileRequest,
    entity::customers::{ActiveModel as CustomerActive, Model as CustomerModel},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Customer,
    response::{ApiResponse, Meta},
    services::cart_service,
    state::AppState,
};

const PHONE_MAX: usize = 20;
const ADDRESS_MAX: usize = 255;

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Customer>> {
    let customer = cart_service::get_or_create_customer(state, user.user_id).await?;
    Ok(ApiResponse::success(
        "Profile",
        customer_from_entity(customer),
        Some(Meta::empty()),
    ))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<Customer>> {
    let phone = normalize(payload.phone, "phone", PHONE_MAX)?;
    let address = normalize(payload.address, "address", ADDRESS_MAX)?;

    let customer = cart_service::get_or_create_customer(state, user.user_id).await?;
    let mut active: CustomerActive = customer.into();
    if let Some(phone) = phone {
        active.phone = Set(phone);
    }
    if let Some(address) = address {
        active.address = Set(address);
    }
    let customer = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "profile_update",
        "customers",
        serde_json::json!({ "customer_id": customer.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Profile updated",
        customer_from_entity(customer),
        Some(Meta::empty()),
    ))
}

/// `None` leaves the field alone, a blank string clears it.
fn normalize(
    value: Option<String>,
    field: &str,
    max: usize,
) -> Result<Option<Option<String>>, AppError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let value = value.trim().to_string();
    if value.chars().count() > max {
        return Err(AppError::BadRequest(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(Some((!value.is_empty()).then_some(value)))
}

pub fn customer_from_entity(model: CustomerModel) -> Customer {
    Customer {
        id: model.id,
        user_id: model.user_id,
        phone: model.phone,
        address: model.address,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
