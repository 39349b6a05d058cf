use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{LockType, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::products::{
        CreateNotebookRequest, CreateSmartphoneRequest, ProductFields, UpdateProductRequest,
    },
    entity::{
        cart_products::{ActiveModel as LineActive, Column as LineCol, Entity as CartProducts},
        carts::{Column as CartCol, Entity as Carts, Model as CartModel},
        notebooks::ActiveModel as NotebookActive,
        product_slugs::{ActiveModel as SlugActive, Entity as ProductSlugs},
        smartphones::ActiveModel as SmartphoneActive,
    },
    error::{AppError, AppResult},
    image_policy::accept_image,
    middleware::auth::{AuthUser, ensure_admin},
    models::ProductDetail,
    product_kind::{CommonPatch, ProductKind},
    response::{ApiResponse, Meta},
    services::{cart_service, catalog_service},
    state::AppState,
};

/// Common fields after validation, ready to be written.
struct CheckedFields {
    title: String,
    description: String,
    slug: String,
    price: Decimal,
    category_id: Option<Uuid>,
    is_published: bool,
    image: Option<String>,
}

const TITLE_MAX: usize = 100;

async fn check_fields(
    txn: &DatabaseTransaction,
    kind: ProductKind,
    fields: ProductFields,
) -> AppResult<CheckedFields> {
    let image = accept_image(fields.image.as_ref())?;

    let title = fields.title.trim().to_string();
    if title.is_empty() || title.chars().count() > TITLE_MAX {
        return Err(AppError::BadRequest(format!(
            "title must be 1 to {TITLE_MAX} characters"
        )));
    }
    let slug = fields.slug.trim().to_string();
    if slug.is_empty() {
        return Err(AppError::BadRequest("slug must not be empty".into()));
    }
    if fields.price < Decimal::ZERO {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }

    // Products land in their kind's category unless told otherwise.
    let category_slug = fields
        .category_slug
        .unwrap_or_else(|| kind.descriptor().category_slug.to_string());
    let category = catalog_service::category_by_slug(txn, &category_slug).await?;

    Ok(CheckedFields {
        title,
        description: fields.description,
        slug,
        price: fields.price.round_dp(2),
        category_id: Some(category.id),
        is_published: fields.is_published.unwrap_or(true),
        image,
    })
}

/// Slugs are unique across every kind; the registry row's primary key decides.
async fn claim_slug(
    txn: &DatabaseTransaction,
    kind: ProductKind,
    slug: &str,
    object_id: Uuid,
) -> AppResult<()> {
    let claimed = SlugActive {
        slug: Set(slug.to_string()),
        content_type: Set(kind),
        object_id: Set(object_id),
    }
    .insert(txn)
    .await;

    match claimed {
        Ok(_) => Ok(()),
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Err(AppError::SlugTaken(slug.to_string()))
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn create_notebook(
    state: &AppState,
    user: &AuthUser,
    payload: CreateNotebookRequest,
) -> AppResult<ApiResponse<ProductDetail>> {
    ensure_admin(user)?;
    let kind = ProductKind::Notebook;

    let txn = state.orm.begin().await?;
    let fields = check_fields(&txn, kind, payload.product).await?;
    let id = Uuid::new_v4();
    claim_slug(&txn, kind, &fields.slug, id).await?;

    NotebookActive {
        id: Set(id),
        category_id: Set(fields.category_id),
        title: Set(fields.title),
        description: Set(fields.description),
        image: Set(fields.image),
        is_published: Set(fields.is_published),
        slug: Set(fields.slug.clone()),
        price: Set(fields.price),
        created_at: NotSet,
        diagonal: Set(payload.diagonal),
        display_type: Set(payload.display_type),
        processor_freq: Set(payload.processor_freq),
        ram: Set(payload.ram),
        video: Set(payload.video),
        time_without_charge: Set(payload.time_without_charge),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    created(state, user, kind, &fields.slug).await
}

pub async fn create_smartphone(
    state: &AppState,
    user: &AuthUser,
    payload: CreateSmartphoneRequest,
) -> AppResult<ApiResponse<ProductDetail>> {
    ensure_admin(user)?;
    let kind = ProductKind::Smartphone;

    let txn = state.orm.begin().await?;
    let fields = check_fields(&txn, kind, payload.product).await?;
    let id = Uuid::new_v4();
    claim_slug(&txn, kind, &fields.slug, id).await?;

    SmartphoneActive {
        id: Set(id),
        category_id: Set(fields.category_id),
        title: Set(fields.title),
        description: Set(fields.description),
        image: Set(fields.image),
        is_published: Set(fields.is_published),
        slug: Set(fields.slug.clone()),
        price: Set(fields.price),
        created_at: NotSet,
        diagonal: Set(payload.diagonal),
        display_type: Set(payload.display_type),
        resolution: Set(payload.resolution),
        accum_volume: Set(payload.accum_volume),
        ram: Set(payload.ram),
        sd: Set(payload.sd.unwrap_or(true)),
        sd_volume_max: Set(payload.sd_volume_max),
        main_cam_mp: Set(payload.main_cam_mp),
        frontal_cam_mp: Set(payload.frontal_cam_mp),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    created(state, user, kind, &fields.slug).await
}

async fn created(
    state: &AppState,
    user: &AuthUser,
    kind: ProductKind,
    slug: &str,
) -> AppResult<ApiResponse<ProductDetail>> {
    let detail = load_detail(state, kind, slug).await?;
    tracing::info!(kind = %kind, slug, product_id = %detail.product.id, "product created");

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_create",
        kind.descriptor().table,
        serde_json::json!({ "product_id": detail.product.id, "slug": slug }),
    )
    .await;

    Ok(ApiResponse::success("Product created", detail, Some(Meta::empty())))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    kind: ProductKind,
    slug: &str,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<ProductDetail>> {
    ensure_admin(user)?;
    if payload.price.is_some_and(|p| p < Decimal::ZERO) {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    if payload
        .title
        .as_deref()
        .is_some_and(|t| t.trim().is_empty() || t.chars().count() > TITLE_MAX)
    {
        return Err(AppError::BadRequest(format!(
            "title must be 1 to {TITLE_MAX} characters"
        )));
    }

    let txn = state.orm.begin().await?;
    let product = kind
        .find_by_slug(&txn, slug)
        .await?
        .ok_or(AppError::ProductNotFound)?;

    let category_id = match &payload.category_slug {
        Some(category_slug) => Some(catalog_service::category_by_slug(&txn, category_slug).await?.id),
        None => None,
    };
    let patch = CommonPatch {
        title: payload.title.map(|t| t.trim().to_string()),
        description: payload.description,
        price: payload.price.map(|p| p.round_dp(2)),
        is_published: payload.is_published,
        category_id,
    };
    if patch.is_empty() {
        return Err(AppError::BadRequest("nothing to update".into()));
    }
    kind.update_common(&txn, product.id, &patch).await?;

    // Lines in open carts follow the new price; finalized carts keep theirs.
    if patch.price.is_some() {
        reprice_open_lines(&txn, kind, product.id).await?;
    }
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_update",
        kind.descriptor().table,
        serde_json::json!({ "product_id": product.id, "slug": slug }),
    )
    .await;

    let detail = load_detail(state, kind, slug).await?;
    Ok(ApiResponse::success("Product updated", detail, Some(Meta::empty())))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    kind: ProductKind,
    slug: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    let product = kind
        .find_by_slug(&txn, slug)
        .await?
        .ok_or(AppError::ProductNotFound)?;

    // Finalized carts keep their lines so past orders stay intact.
    let open_carts = lock_open_carts_holding(&txn, kind, product.id).await?;
    let cart_ids: Vec<Uuid> = open_carts.iter().map(|cart| cart.id).collect();
    CartProducts::delete_many()
        .filter(LineCol::ContentType.eq(kind))
        .filter(LineCol::ObjectId.eq(product.id))
        .filter(LineCol::CartId.is_in(cart_ids))
        .exec(&txn)
        .await?;
    ProductSlugs::delete_by_id(product.slug.clone())
        .exec(&txn)
        .await?;
    kind.delete(&txn, product.id).await?;
    resave_carts(&txn, open_carts).await?;
    txn.commit().await?;

    tracing::info!(kind = %kind, slug, product_id = %product.id, "product deleted");
    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_delete",
        kind.descriptor().table,
        serde_json::json!({ "product_id": product.id, "slug": slug }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product deleted",
        serde_json::json!({ "id": product.id }),
        Some(Meta::empty()),
    ))
}

/// Open carts holding the product, locked in id order like the cart
/// mutations lock them one at a time.
async fn lock_open_carts_holding<C: ConnectionTrait>(
    db: &C,
    kind: ProductKind,
    object_id: Uuid,
) -> AppResult<Vec<CartModel>> {
    let holding = Query::select()
        .column(LineCol::CartId)
        .from(CartProducts)
        .and_where(LineCol::ContentType.eq(kind))
        .and_where(LineCol::ObjectId.eq(object_id))
        .to_owned();

    Ok(Carts::find()
        .filter(CartCol::InOrder.eq(false))
        .filter(CartCol::Id.in_subquery(holding))
        .order_by_asc(CartCol::Id)
        .lock(LockType::Update)
        .all(db)
        .await?)
}

async fn reprice_open_lines<C: ConnectionTrait>(
    db: &C,
    kind: ProductKind,
    object_id: Uuid,
) -> AppResult<()> {
    let open_carts = lock_open_carts_holding(db, kind, object_id).await?;
    let lines = CartProducts::find()
        .filter(LineCol::ContentType.eq(kind))
        .filter(LineCol::ObjectId.eq(object_id))
        .filter(LineCol::CartId.is_in(open_carts.iter().map(|cart| cart.id)))
        .all(db)
        .await?;

    for line in lines {
        // The save hook sets the new line price.
        let active: LineActive = line.into();
        active.update(db).await?;
    }
    resave_carts(db, open_carts).await
}

async fn resave_carts<C: ConnectionTrait>(db: &C, carts: Vec<CartModel>) -> AppResult<()> {
    for cart in carts {
        cart_service::save_cart(db, cart).await?;
    }
    Ok(())
}

async fn load_detail(state: &AppState, kind: ProductKind, slug: &str) -> AppResult<ProductDetail> {
    let (product, specs) = kind
        .find_detail(&state.orm, slug)
        .await?
        .ok_or(AppError::ProductNotFound)?;
    let category = match product.category_id {
        Some(id) => catalog_service::find_category(&state.orm, id).await?,
        None => None,
    };
    Ok(ProductDetail {
        product,
        category,
        specs,
    })
}
