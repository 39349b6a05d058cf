use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{OrderList, OrderWithLines, UpdateOrderStatusRequest},
    entity::orders::{ActiveModel as OrderActive, Entity as Orders, OrderStatus},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Order,
    response::{ApiResponse, Meta},
    routes::params::OrderListQuery,
    services::order_service::{order_from_entity, paginate_orders, with_lines},
    state::AppState,
};

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    paginate_orders(state, Orders::find(), query).await
}

pub async fn get_order_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithLines>> {
    ensure_admin(user)?;
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let data = with_lines(state, order).await?;
    Ok(ApiResponse::success(
        "Order found",
        data,
        Some(Meta::empty()),
    ))
}

/// A completed order is closed; any other status may move to any status.
pub fn check_transition(from: OrderStatus, to: OrderStatus) -> Result<(), AppError> {
    if from == OrderStatus::Completed && to != OrderStatus::Completed {
        return Err(AppError::BadRequest(
            "Completed orders cannot change status".into(),
        ));
    }
    Ok(())
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;

    let existing = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    check_transition(existing.status, payload.status)?;
    let previous = existing.status;

    let mut active: OrderActive = existing.into();
    active.status = Set(payload.status);
    let order = active.update(&state.orm).await?;

    tracing::info!(order_id = %order.id, from = ?previous, to = ?order.status, "order status changed");
    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": order.id, "status": order.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order updated",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_orders_move_freely() {
        assert!(check_transition(OrderStatus::New, OrderStatus::InProgress).is_ok());
        assert!(check_transition(OrderStatus::Ready, OrderStatus::New).is_ok());
        assert!(check_transition(OrderStatus::InProgress, OrderStatus::Completed).is_ok());
    }

    #[test]
    fn completed_orders_are_closed() {
        assert!(matches!(
            check_transition(OrderStatus::Completed, OrderStatus::New),
            Err(AppError::BadRequest(_))
        ));
        assert!(check_transition(OrderStatus::Completed, OrderStatus::Completed).is_ok());
    }
}
