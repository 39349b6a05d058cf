use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::cart::CartView,
    entity::{
        cart_products::{ActiveModel as LineActive, Column as LineCol, Entity as CartProducts},
        carts::{ActiveModel as CartActive, Column as CartCol, Entity as Carts, Model as CartModel},
        customers::{Column as CustomerCol, Entity as Customers, Model as CustomerModel},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::{auth::Identity, cart::CurrentCart},
    models::{Cart, CartLine, ProductRef},
    product_kind::ProductKind,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Whose active cart is being looked up.
#[derive(Debug, Clone, Copy)]
pub enum CartOwner {
    Customer(Uuid),
    Anonymous(Uuid),
}

impl CartOwner {
    fn condition(self) -> Condition {
        let active = Condition::all().add(CartCol::InOrder.eq(false));
        match self {
            CartOwner::Customer(customer_id) => active.add(CartCol::OwnerId.eq(customer_id)),
            CartOwner::Anonymous(token) => active
                .add(CartCol::ForAnonymousUser.eq(true))
                .add(CartCol::AnonymousToken.eq(token)),
        }
    }
}

pub async fn find_active_cart<C: ConnectionTrait>(
    db: &C,
    owner: CartOwner,
) -> AppResult<Option<CartModel>> {
    Ok(Carts::find().filter(owner.condition()).one(db).await?)
}

/// Attach the caller's active cart, creating the customer and cart on first use.
pub async fn resolve_cart(state: &AppState, identity: Identity) -> AppResult<CurrentCart> {
    match identity {
        Identity::Authenticated(user) => {
            let customer = get_or_create_customer(state, user.user_id).await?;
            let cart = active_cart(state, CartOwner::Customer(customer.id)).await?;
            Ok(CurrentCart {
                identity: Identity::Authenticated(user),
                customer: Some(customer),
                cart,
            })
        }
        Identity::Anonymous { cart_token } => {
            let token = cart_token.unwrap_or_else(Uuid::new_v4);
            let cart = active_cart(state, CartOwner::Anonymous(token)).await?;
            Ok(CurrentCart {
                identity: Identity::Anonymous {
                    cart_token: Some(token),
                },
                customer: None,
                cart,
            })
        }
    }
}

pub async fn get_or_create_customer(state: &AppState, user_id: Uuid) -> AppResult<CustomerModel> {
    if let Some(customer) = find_customer(state, user_id).await? {
        return Ok(customer);
    }

    if Users::find_by_id(user_id).one(&state.orm).await?.is_none() {
        return Err(AppError::NoIdentity);
    }

    let inserted = sqlx::query(
        "INSERT INTO customers (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(user_id)
    .execute(&state.pool)
    .await?;
    if inserted.rows_affected() > 0 {
        tracing::info!(%user_id, "customer created");
    }

    find_customer(state, user_id)
        .await?
        .ok_or(AppError::NoIdentity)
}

async fn find_customer(state: &AppState, user_id: Uuid) -> AppResult<Option<CustomerModel>> {
    Ok(Customers::find()
        .filter(CustomerCol::UserId.eq(user_id))
        .one(&state.orm)
        .await?)
}

/// The partial unique indexes on `carts` allow one active cart per owner,
/// so a concurrent first request loses the insert and reads the winner's row.
async fn active_cart(state: &AppState, owner: CartOwner) -> AppResult<CartModel> {
    if let Some(cart) = find_active_cart(&state.orm, owner).await? {
        return Ok(cart);
    }

    let insert = match owner {
        CartOwner::Customer(customer_id) => {
            sqlx::query("INSERT INTO carts (owner_id) VALUES ($1) ON CONFLICT DO NOTHING")
                .bind(customer_id)
        }
        CartOwner::Anonymous(token) => sqlx::query(
            "INSERT INTO carts (anonymous_token, for_anonymous_user) VALUES ($1, TRUE) ON CONFLICT DO NOTHING",
        )
        .bind(token),
    };
    let created = insert.execute(&state.pool).await?;

    let cart = find_active_cart(&state.orm, owner)
        .await?
        .ok_or(AppError::CartCreationRace)?;
    if created.rows_affected() > 0 {
        tracing::info!(cart_id = %cart.id, owner = ?owner, "cart created");
    }
    Ok(cart)
}

/// Persist the cart; the save hook recomputes its totals from its lines.
pub async fn save_cart<C: ConnectionTrait>(db: &C, cart: CartModel) -> AppResult<CartModel> {
    let active: CartActive = cart.into();
    Ok(active.update(db).await?)
}

pub async fn published_product<C: ConnectionTrait>(
    db: &C,
    kind: ProductKind,
    slug: &str,
) -> AppResult<ProductRef> {
    kind.find_by_slug(db, slug)
        .await?
        .filter(|p| p.is_published)
        .ok_or(AppError::ProductNotFound)
}

async fn find_line<C: ConnectionTrait>(
    db: &C,
    cart_id: Uuid,
    kind: ProductKind,
    object_id: Uuid,
) -> AppResult<Option<crate::entity::cart_products::Model>> {
    Ok(CartProducts::find()
        .filter(LineCol::CartId.eq(cart_id))
        .filter(LineCol::ContentType.eq(kind))
        .filter(LineCol::ObjectId.eq(object_id))
        .one(db)
        .await?)
}

fn ensure_active(cart: &CartModel) -> AppResult<()> {
    if cart.in_order {
        return Err(AppError::CartFinalized);
    }
    Ok(())
}

/// Re-read the cart under a row lock. Checkout takes the same lock, so a
/// request that resolved its cart earlier sees the finalized row here.
async fn lock_open_cart<C: ConnectionTrait>(db: &C, cart_id: Uuid) -> AppResult<CartModel> {
    let cart = Carts::find_by_id(cart_id)
        .lock(LockType::Update)
        .one(db)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_active(&cart)?;
    Ok(cart)
}

pub async fn view_cart(
    state: &AppState,
    current: &CurrentCart,
) -> AppResult<ApiResponse<CartView>> {
    let view = build_view(state, current.cart.id).await?;
    Ok(ApiResponse::success("Cart", view, Some(Meta::empty())))
}

pub async fn add_to_cart(
    state: &AppState,
    current: &CurrentCart,
    kind: ProductKind,
    slug: &str,
) -> AppResult<ApiResponse<CartView>> {
    let product = published_product(&state.orm, kind, slug).await?;

    let txn = state.orm.begin().await?;
    let cart = lock_open_cart(&txn, current.cart.id).await?;
    if find_line(&txn, cart.id, kind, product.id).await?.is_none() {
        LineActive {
            id: Set(Uuid::new_v4()),
            cart_id: Set(cart.id),
            customer_id: Set(current.customer.as_ref().map(|c| c.id)),
            content_type: Set(kind),
            object_id: Set(product.id),
            qty: Set(1),
            final_price: NotSet,
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
    }
    let cart = save_cart(&txn, cart).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        current.user_id(),
        "cart_add",
        "cart_products",
        serde_json::json!({ "cart_id": cart.id, "content_type": kind, "object_id": product.id }),
    )
    .await;

    let view = build_view(state, cart.id).await?;
    Ok(ApiResponse::success("Added to cart", view, Some(Meta::empty())))
}

pub async fn remove_from_cart(
    state: &AppState,
    current: &CurrentCart,
    kind: ProductKind,
    slug: &str,
) -> AppResult<ApiResponse<CartView>> {
    let product = kind
        .find_by_slug(&state.orm, slug)
        .await?
        .ok_or(AppError::ProductNotFound)?;

    let txn = state.orm.begin().await?;
    let cart = lock_open_cart(&txn, current.cart.id).await?;
    let line = find_line(&txn, cart.id, kind, product.id)
        .await?
        .ok_or(AppError::NotFound)?;
    CartProducts::delete_by_id(line.id).exec(&txn).await?;
    let cart = save_cart(&txn, cart).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        current.user_id(),
        "cart_remove",
        "cart_products",
        serde_json::json!({ "cart_id": cart.id, "content_type": kind, "object_id": product.id }),
    )
    .await;

    let view = build_view(state, cart.id).await?;
    Ok(ApiResponse::success("Removed from cart", view, Some(Meta::empty())))
}

pub async fn change_qty(
    state: &AppState,
    current: &CurrentCart,
    kind: ProductKind,
    slug: &str,
    qty: i32,
) -> AppResult<ApiResponse<CartView>> {
    if qty <= 0 {
        return Err(AppError::BadRequest("qty must be greater than 0".to_string()));
    }
    let product = published_product(&state.orm, kind, slug).await?;

    let txn = state.orm.begin().await?;
    let cart = lock_open_cart(&txn, current.cart.id).await?;
    let line = find_line(&txn, cart.id, kind, product.id)
        .await?
        .ok_or(AppError::NotFound)?;
    let mut active: LineActive = line.into();
    active.qty = Set(qty);
    active.update(&txn).await?;
    let cart = save_cart(&txn, cart).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        current.user_id(),
        "cart_change_qty",
        "cart_products",
        serde_json::json!({ "cart_id": cart.id, "object_id": product.id, "qty": qty }),
    )
    .await;

    let view = build_view(state, cart.id).await?;
    Ok(ApiResponse::success("Quantity changed", view, Some(Meta::empty())))
}

/// Lines of a cart with their products resolved through the kind registry.
pub async fn cart_lines<C: ConnectionTrait>(db: &C, cart_id: Uuid) -> AppResult<Vec<CartLine>> {
    let rows = CartProducts::find()
        .filter(LineCol::CartId.eq(cart_id))
        .order_by_asc(LineCol::CreatedAt)
        .all(db)
        .await?;

    let mut lines = Vec::with_capacity(rows.len());
    for row in rows {
        let product = row.content_type.find_by_id(db, row.object_id).await?;
        lines.push(CartLine {
            id: row.id,
            content_type: row.content_type,
            object_id: row.object_id,
            title: product.as_ref().map(|p| p.title.clone()),
            slug: product.map(|p| p.slug),
            qty: row.qty,
            final_price: row.final_price,
        });
    }
    Ok(lines)
}

/// Totals and lines are read together so the view agrees with itself.
async fn build_view(state: &AppState, cart_id: Uuid) -> AppResult<CartView> {
    let cart = Carts::find_by_id(cart_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let lines = cart_lines(&state.orm, cart.id).await?;
    Ok(CartView {
        cart: cart_from_entity(&cart),
        lines,
        cart_token: cart.anonymous_token,
    })
}

pub fn cart_from_entity(model: &CartModel) -> Cart {
    Cart {
        id: model.id,
        owner_id: model.owner_id,
        for_anonymous_user: model.for_anonymous_user,
        in_order: model.in_order,
        total_products: model.total_products,
        final_price: model.final_price,
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
