use std::collections::HashMap;

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    dto::catalog::{CategoryDetail, ProductList, SidebarList},
    entity::categories::{Column as CategoryCol, Entity as Categories, Model as CategoryModel},
    error::{AppError, AppResult},
    models::{Category, ProductDetail, ProductRef, SidebarCategory, category_url},
    product_kind::{ListWindow, ProductKind},
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
};

/// How many of the newest products of each kind the main page shows.
pub const LATEST_PER_KIND: u64 = 5;

pub async fn sidebar<C: ConnectionTrait>(db: &C) -> AppResult<Vec<SidebarCategory>> {
    let categories = Categories::find()
        .order_by_asc(CategoryCol::Slug)
        .all(db)
        .await?;

    let mut counts: HashMap<Uuid, i64> = HashMap::new();
    for kind in ProductKind::ALL {
        for (category_id, count) in kind.count_by_category(db).await? {
            if let Some(category_id) = category_id {
                *counts.entry(category_id).or_default() += count;
            }
        }
    }

    Ok(build_sidebar(categories, &counts))
}

/// Sidebar entries in category order; categories without products count zero.
pub fn build_sidebar(
    categories: Vec<CategoryModel>,
    counts: &HashMap<Uuid, i64>,
) -> Vec<SidebarCategory> {
    categories
        .into_iter()
        .map(|c| SidebarCategory {
            name: c.name.or_else(|| {
                ProductKind::for_category_slug(&c.slug)
                    .map(|kind| kind.descriptor().display_name.to_string())
            }),
            url: category_url(&c.slug),
            count: counts.get(&c.id).copied().unwrap_or(0),
            slug: c.slug,
        })
        .collect()
}

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<SidebarList>> {
    let items = sidebar(&state.orm).await?;
    let meta = Meta::single_page(items.len());
    Ok(ApiResponse::success("Categories", SidebarList { items }, Some(meta)))
}

pub async fn category_detail(
    state: &AppState,
    slug: &str,
) -> AppResult<ApiResponse<CategoryDetail>> {
    let category = Categories::find()
        .filter(CategoryCol::Slug.eq(slug))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::UnknownCategory(slug.to_string()))?;

    let mut products = Vec::new();
    for kind in ProductKind::ALL {
        products.extend(kind.in_category(&state.orm, category.id).await?);
    }
    products.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let categories = sidebar(&state.orm).await?;
    let meta = Meta::single_page(products.len());
    Ok(ApiResponse::success(
        "Category",
        CategoryDetail {
            category: category_from_entity(category),
            products,
            categories,
        },
        Some(meta),
    ))
}

pub async fn list_products(
    state: &AppState,
    kind: ProductKind,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let window = ListWindow {
        sort_by: query.sort_by.unwrap_or(ProductSortBy::CreatedAt),
        sort_order: query.sort_order.unwrap_or(SortOrder::Desc),
        limit: limit as u64,
        offset: offset as u64,
    };
    let (items, total) = kind.list_published(&state.orm, window).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(
    state: &AppState,
    kind: ProductKind,
    slug: &str,
) -> AppResult<ApiResponse<ProductDetail>> {
    let (product, specs) = kind
        .find_detail(&state.orm, slug)
        .await?
        .filter(|(p, _)| p.is_published)
        .ok_or(AppError::ProductNotFound)?;

    let category = match product.category_id {
        Some(id) => find_category(&state.orm, id).await?,
        None => None,
    };

    Ok(ApiResponse::success(
        "Product",
        ProductDetail {
            product,
            category,
            specs,
        },
        None,
    ))
}

/// Newest products of every kind for the main page.
pub async fn latest_products(
    state: &AppState,
    with_respect_to: Option<&str>,
) -> AppResult<ApiResponse<ProductList>> {
    let mut items = Vec::new();
    for kind in ProductKind::ALL {
        items.extend(kind.latest(&state.orm, LATEST_PER_KIND).await?);
    }

    // Unknown kinds are ignored rather than rejected.
    let preferred = with_respect_to.and_then(|name| ProductKind::from_discriminator(name).ok());
    let items = order_with_respect_to(items, preferred);

    let meta = Meta::single_page(items.len());
    Ok(ApiResponse::success("Latest products", ProductList { items }, Some(meta)))
}

/// Move products of the preferred kind to the front, keeping relative order.
pub fn order_with_respect_to(
    mut products: Vec<ProductRef>,
    preferred: Option<ProductKind>,
) -> Vec<ProductRef> {
    if let Some(kind) = preferred {
        products.sort_by_key(|p| p.kind != kind);
    }
    products
}

pub(crate) async fn category_by_slug<C: ConnectionTrait>(
    db: &C,
    slug: &str,
) -> AppResult<CategoryModel> {
    Categories::find()
        .filter(CategoryCol::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or_else(|| AppError::UnknownCategory(slug.to_string()))
}

pub(crate) async fn find_category<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> AppResult<Option<Category>> {
    Ok(Categories::find_by_id(id)
        .one(db)
        .await?
        .map(category_from_entity))
}

pub fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        url: category_url(&model.slug),
        name: model.name,
        slug: model.slug,
    }
}
