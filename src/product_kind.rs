//! Product kinds and the accessors behind the content-type discriminator.
//!
//! A cart line points at a product through `(content_type, object_id)`.
//! `ProductKind` is the closed set of discriminators, and every kind is
//! backed by one table implementing [`CatalogEntity`]. Lookups go through
//! `with_catalog_entity!`, so adding a kind means adding a variant, its
//! descriptor and its `CatalogEntity` impl; the exhaustive matches below
//! point at anything left out.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    entity::{notebooks, smartphones},
    error::AppError,
    models::{NotebookSpecs, ProductRef, ProductSpecs, SmartphoneSpecs, product_url},
    routes::params::{ProductSortBy, SortOrder},
};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    #[sea_orm(string_value = "notebook")]
    Notebook,
    #[sea_orm(string_value = "smartphone")]
    Smartphone,
}

/// Registration data for one product kind.
#[derive(Debug)]
pub struct KindDescriptor {
    pub kind: ProductKind,
    pub discriminator: &'static str,
    pub display_name: &'static str,
    pub table: &'static str,
    /// Slug of the category that lists this kind.
    pub category_slug: &'static str,
}

static NOTEBOOK: KindDescriptor = KindDescriptor {
    kind: ProductKind::Notebook,
    discriminator: "notebook",
    display_name: "Notebooks",
    table: "notebooks",
    category_slug: "notebooks",
};

static SMARTPHONE: KindDescriptor = KindDescriptor {
    kind: ProductKind::Smartphone,
    discriminator: "smartphone",
    display_name: "Smartphones",
    table: "smartphones",
    category_slug: "smartphones",
};

impl ProductKind {
    pub const ALL: [ProductKind; 2] = [ProductKind::Notebook, ProductKind::Smartphone];

    pub fn descriptor(self) -> &'static KindDescriptor {
        match self {
            ProductKind::Notebook => &NOTEBOOK,
            ProductKind::Smartphone => &SMARTPHONE,
        }
    }

    pub fn registry() -> impl Iterator<Item = &'static KindDescriptor> {
        Self::ALL.into_iter().map(Self::descriptor)
    }

    pub fn as_str(self) -> &'static str {
        self.descriptor().discriminator
    }

    pub fn from_discriminator(value: &str) -> Result<Self, AppError> {
        Self::registry()
            .find(|d| d.discriminator == value)
            .map(|d| d.kind)
            .ok_or_else(|| AppError::UnknownContentType(value.to_string()))
    }

    pub fn for_category_slug(slug: &str) -> Option<Self> {
        Self::registry()
            .find(|d| d.category_slug == slug)
            .map(|d| d.kind)
    }
}

impl std::fmt::Display for ProductKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column accessors shared by every product table.
pub trait CatalogEntity: EntityTrait {
    const KIND: ProductKind;

    fn id_column() -> Self::Column;
    fn slug_column() -> Self::Column;
    fn title_column() -> Self::Column;
    fn description_column() -> Self::Column;
    fn price_column() -> Self::Column;
    fn published_column() -> Self::Column;
    fn category_column() -> Self::Column;
    fn created_at_column() -> Self::Column;

    fn summary(model: &Self::Model) -> ProductRef;
    fn specs(model: &Self::Model) -> ProductSpecs;
}

impl CatalogEntity for notebooks::Entity {
    const KIND: ProductKind = ProductKind::Notebook;

    fn id_column() -> Self::Column {
        notebooks::Column::Id
    }
    fn slug_column() -> Self::Column {
        notebooks::Column::Slug
    }
    fn title_column() -> Self::Column {
        notebooks::Column::Title
    }
    fn description_column() -> Self::Column {
        notebooks::Column::Description
    }
    fn price_column() -> Self::Column {
        notebooks::Column::Price
    }
    fn published_column() -> Self::Column {
        notebooks::Column::IsPublished
    }
    fn category_column() -> Self::Column {
        notebooks::Column::CategoryId
    }
    fn created_at_column() -> Self::Column {
        notebooks::Column::CreatedAt
    }

    fn summary(m: &notebooks::Model) -> ProductRef {
        ProductRef {
            kind: Self::KIND,
            id: m.id,
            slug: m.slug.clone(),
            title: m.title.clone(),
            description: m.description.clone(),
            price: m.price,
            image: m.image.clone(),
            is_published: m.is_published,
            category_id: m.category_id,
            created_at: m.created_at.with_timezone(&Utc),
            url: product_url(Self::KIND, &m.slug),
        }
    }

    fn specs(m: &notebooks::Model) -> ProductSpecs {
        ProductSpecs::Notebook(NotebookSpecs {
            diagonal: m.diagonal.clone(),
            display_type: m.display_type.clone(),
            processor_freq: m.processor_freq.clone(),
            ram: m.ram.clone(),
            video: m.video.clone(),
            time_without_charge: m.time_without_charge.clone(),
        })
    }
}

impl CatalogEntity for smartphones::Entity {
    const KIND: ProductKind = ProductKind::Smartphone;

    fn id_column() -> Self::Column {
        smartphones::Column::Id
    }
    fn slug_column() -> Self::Column {
        smartphones::Column::Slug
    }
    fn title_column() -> Self::Column {
        smartphones::Column::Title
    }
    fn description_column() -> Self::Column {
        smartphones::Column::Description
    }
    fn price_column() -> Self::Column {
        smartphones::Column::Price
    }
    fn published_column() -> Self::Column {
        smartphones::Column::IsPublished
    }
    fn category_column() -> Self::Column {
        smartphones::Column::CategoryId
    }
    fn created_at_column() -> Self::Column {
        smartphones::Column::CreatedAt
    }

    fn summary(m: &smartphones::Model) -> ProductRef {
        ProductRef {
            kind: Self::KIND,
            id: m.id,
            slug: m.slug.clone(),
            title: m.title.clone(),
            description: m.description.clone(),
            price: m.price,
            image: m.image.clone(),
            is_published: m.is_published,
            category_id: m.category_id,
            created_at: m.created_at.with_timezone(&Utc),
            url: product_url(Self::KIND, &m.slug),
        }
    }

    fn specs(m: &smartphones::Model) -> ProductSpecs {
        ProductSpecs::Smartphone(SmartphoneSpecs {
            diagonal: m.diagonal.clone(),
            display_type: m.display_type.clone(),
            resolution: m.resolution.clone(),
            accum_volume: m.accum_volume.clone(),
            ram: m.ram.clone(),
            sd: m.sd,
            sd_volume_max: m.sd_volume_max.clone(),
            main_cam_mp: m.main_cam_mp.clone(),
            frontal_cam_mp: m.frontal_cam_mp.clone(),
        })
    }
}

/// Run `$body` with `$entity` bound to the table type behind `$kind`.
macro_rules! with_catalog_entity {
    ($kind:expr, |$entity:ident| $body:expr) => {
        match $kind {
            ProductKind::Notebook => {
                type $entity = notebooks::Entity;
                $body
            }
            ProductKind::Smartphone => {
                type $entity = smartphones::Entity;
                $body
            }
        }
    };
}

/// Listing window for [`ProductKind::list_published`].
#[derive(Debug, Clone, Copy)]
pub struct ListWindow {
    pub sort_by: ProductSortBy,
    pub sort_order: SortOrder,
    pub limit: u64,
    pub offset: u64,
}

/// Changes to the fields every product kind has.
#[derive(Debug, Clone, Default)]
pub struct CommonPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub is_published: Option<bool>,
    pub category_id: Option<Uuid>,
}

impl CommonPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.is_published.is_none()
            && self.category_id.is_none()
    }
}

impl ProductKind {
    pub async fn find_by_slug<C: ConnectionTrait>(
        self,
        db: &C,
        slug: &str,
    ) -> Result<Option<ProductRef>, DbErr> {
        with_catalog_entity!(self, |E| find_one::<E, C>(db, E::slug_column().eq(slug))
            .await
            .map(|m| m.as_ref().map(E::summary)))
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        self,
        db: &C,
        id: Uuid,
    ) -> Result<Option<ProductRef>, DbErr> {
        with_catalog_entity!(self, |E| find_one::<E, C>(db, E::id_column().eq(id))
            .await
            .map(|m| m.as_ref().map(E::summary)))
    }

    /// Product summary plus its kind-specific specs.
    pub async fn find_detail<C: ConnectionTrait>(
        self,
        db: &C,
        slug: &str,
    ) -> Result<Option<(ProductRef, ProductSpecs)>, DbErr> {
        with_catalog_entity!(self, |E| find_one::<E, C>(db, E::slug_column().eq(slug))
            .await
            .map(|m| m.as_ref().map(|m| (E::summary(m), E::specs(m)))))
    }

    pub async fn list_published<C: ConnectionTrait>(
        self,
        db: &C,
        window: ListWindow,
    ) -> Result<(Vec<ProductRef>, i64), DbErr> {
        with_catalog_entity!(self, |E| list_published::<E, C>(db, window).await)
    }

    /// Newest published products of this kind.
    pub async fn latest<C: ConnectionTrait>(
        self,
        db: &C,
        limit: u64,
    ) -> Result<Vec<ProductRef>, DbErr> {
        let window = ListWindow {
            sort_by: ProductSortBy::CreatedAt,
            sort_order: SortOrder::Desc,
            limit,
            offset: 0,
        };
        Ok(self.list_published(db, window).await?.0)
    }

    pub async fn in_category<C: ConnectionTrait>(
        self,
        db: &C,
        category_id: Uuid,
    ) -> Result<Vec<ProductRef>, DbErr> {
        with_catalog_entity!(self, |E| {
            let rows = E::find()
                .filter(E::published_column().eq(true))
                .filter(E::category_column().eq(category_id))
                .order_by_desc(E::created_at_column())
                .all(db)
                .await?;
            Ok(rows.iter().map(E::summary).collect())
        })
    }

    /// Number of products of this kind per category id.
    pub async fn count_by_category<C: ConnectionTrait>(
        self,
        db: &C,
    ) -> Result<Vec<(Option<Uuid>, i64)>, DbErr> {
        with_catalog_entity!(self, |E| {
            E::find()
                .select_only()
                .column(E::category_column())
                .column_as(Expr::col(E::id_column()).count(), "count")
                .group_by(E::category_column())
                .into_tuple::<(Option<Uuid>, i64)>()
                .all(db)
                .await
        })
    }

    pub async fn update_common<C: ConnectionTrait>(
        self,
        db: &C,
        id: Uuid,
        patch: &CommonPatch,
    ) -> Result<u64, DbErr> {
        if patch.is_empty() {
            return Ok(0);
        }
        with_catalog_entity!(self, |E| {
            let mut update = E::update_many().filter(E::id_column().eq(id));
            if let Some(title) = &patch.title {
                update = update.col_expr(E::title_column(), Expr::value(title.clone()));
            }
            if let Some(description) = &patch.description {
                update = update.col_expr(E::description_column(), Expr::value(description.clone()));
            }
            if let Some(price) = patch.price {
                update = update.col_expr(E::price_column(), Expr::value(price));
            }
            if let Some(is_published) = patch.is_published {
                update = update.col_expr(E::published_column(), Expr::value(is_published));
            }
            if let Some(category_id) = patch.category_id {
                update = update.col_expr(E::category_column(), Expr::value(category_id));
            }
            Ok(update.exec(db).await?.rows_affected)
        })
    }

    pub async fn delete<C: ConnectionTrait>(self, db: &C, id: Uuid) -> Result<u64, DbErr> {
        with_catalog_entity!(self, |E| {
            let result = E::delete_many()
                .filter(E::id_column().eq(id))
                .exec(db)
                .await?;
            Ok(result.rows_affected)
        })
    }
}

async fn find_one<E, C>(
    db: &C,
    condition: sea_orm::sea_query::SimpleExpr,
) -> Result<Option<E::Model>, DbErr>
where
    E: CatalogEntity,
    C: ConnectionTrait,
{
    E::find().filter(condition).one(db).await
}

async fn list_published<E, C>(db: &C, window: ListWindow) -> Result<(Vec<ProductRef>, i64), DbErr>
where
    E: CatalogEntity,
    C: ConnectionTrait,
{
    let sort_col = match window.sort_by {
        ProductSortBy::CreatedAt => E::created_at_column(),
        ProductSortBy::Price => E::price_column(),
        ProductSortBy::Title => E::title_column(),
    };

    let total = E::find()
        .filter(E::published_column().eq(true))
        .select_only()
        .column_as(Expr::col(E::id_column()).count(), "count")
        .into_tuple::<i64>()
        .one(db)
        .await?
        .unwrap_or(0);

    let mut finder = E::find().filter(E::published_column().eq(true));
    finder = match window.sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let rows = finder
        .limit(window.limit)
        .offset(window.offset)
        .all(db)
        .await?;

    Ok((rows.iter().map(E::summary).collect(), total))
}
