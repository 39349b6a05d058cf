use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{CheckoutRequest, OrderList, OrderWithLines},
    entity::{
        carts::{ActiveModel as CartActive, Entity as Carts},
        orders::{
            ActiveModel as OrderActive, BuyingType, Column as OrderCol, Entity as Orders,
            Model as OrderModel, OrderStatus,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Identity},
    models::Order,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::cart_service,
    state::AppState,
};

const NAME_MAX: usize = 255;
const PHONE_MAX: usize = 20;
const ADDRESS_MAX: usize = 1024;

/// Reject checkout details the orders table would not hold.
pub fn validate_checkout(payload: &CheckoutRequest) -> Result<(), AppError> {
    for (field, value) in [
        ("first_name", &payload.first_name),
        ("last_name", &payload.last_name),
    ] {
        let value = value.trim();
        if value.is_empty() || value.chars().count() > NAME_MAX {
            return Err(AppError::BadRequest(format!(
                "{field} must be 1 to {NAME_MAX} characters"
            )));
        }
    }

    let phone = payload.phone.trim();
    if phone.is_empty() || phone.chars().count() > PHONE_MAX {
        return Err(AppError::BadRequest(format!(
            "phone must be 1 to {PHONE_MAX} characters"
        )));
    }

    let address = payload.address.as_deref().map(str::trim).unwrap_or("");
    if address.chars().count() > ADDRESS_MAX {
        return Err(AppError::BadRequest(format!(
            "address must be at most {ADDRESS_MAX} characters"
        )));
    }
    if payload.buying_type == BuyingType::Delivery && address.is_empty() {
        return Err(AppError::BadRequest("delivery requires an address".into()));
    }
    Ok(())
}

/// Turn the caller's active cart into an order. Anonymous visitors must log in first.
pub async fn checkout(
    state: &AppState,
    identity: Identity,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderWithLines>> {
    identity.require_user()?;
    validate_checkout(&payload)?;
    let current = cart_service::resolve_cart(state, identity).await?;
    let customer = current.customer.as_ref().ok_or(AppError::NoIdentity)?;

    let txn = state.orm.begin().await?;

    let cart = Carts::find_by_id(current.cart.id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    if cart.in_order {
        return Err(AppError::CartFinalized);
    }

    // Totals are recomputed under the lock before they are copied.
    let cart = cart_service::save_cart(&txn, cart).await?;
    if cart.total_products == 0 {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        customer_id: Set(customer.id),
        cart_id: Set(Some(cart.id)),
        first_name: Set(payload.first_name.trim().to_string()),
        last_name: Set(payload.last_name.trim().to_string()),
        phone: Set(payload.phone.trim().to_string()),
        address: Set(payload
            .address
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())),
        status: Set(OrderStatus::New),
        buying_type: Set(payload.buying_type),
        comment: Set(payload.comment.filter(|c| !c.trim().is_empty())),
        final_price: Set(cart.final_price),
        created_at: NotSet,
        order_date: Set(payload
            .order_date
            .unwrap_or_else(|| Utc::now().date_naive())),
    }
    .insert(&txn)
    .await?;

    let mut finalized: CartActive = cart.into();
    finalized.in_order = Set(true);
    let cart = finalized.update(&txn).await?;

    let lines = cart_service::cart_lines(&txn, cart.id).await?;
    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        cart_id = %cart.id,
        customer_id = %customer.id,
        final_price = %order.final_price,
        "checkout completed"
    );
    audit::record(
        &state.pool,
        current.user_id(),
        "checkout",
        "orders",
        serde_json::json!({ "order_id": order.id, "cart_id": cart.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order placed",
        OrderWithLines {
            order: order_from_entity(order),
            lines,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let customer = cart_service::get_or_create_customer(state, user.user_id).await?;

    let finder = Orders::find().filter(OrderCol::CustomerId.eq(customer.id));
    paginate_orders(state, finder, query).await
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithLines>> {
    let customer = cart_service::get_or_create_customer(state, user.user_id).await?;

    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::CustomerId.eq(customer.id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let data = with_lines(state, order).await?;
    Ok(ApiResponse::success("OK", data, Some(Meta::empty())))
}

/// Shared by the customer and admin order listings.
pub(crate) async fn paginate_orders(
    state: &AppState,
    finder: Select<Orders>,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut finder = finder;
    if let Some(status) = query.status {
        finder = finder.filter(OrderCol::Status.eq(status));
    }
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub(crate) async fn with_lines(state: &AppState, order: OrderModel) -> AppResult<OrderWithLines> {
    let lines = match order.cart_id {
        Some(cart_id) => cart_service::cart_lines(&state.orm, cart_id).await?,
        None => Vec::new(),
    };
    Ok(OrderWithLines {
        order: order_from_entity(order),
        lines,
    })
}

pub(crate) fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        customer_id: model.customer_id,
        cart_id: model.cart_id,
        first_name: model.first_name,
        last_name: model.last_name,
        phone: model.phone,
        address: model.address,
        status: model.status,
        buying_type: model.buying_type,
        comment: model.comment,
        final_price: model.final_price,
        created_at: model.created_at.with_timezone(&Utc),
        order_date: model.order_date,
    }
}
