use async_trait::async_trait;
use sea_orm::Set;
use sea_orm::entity::prelude::*;

use crate::{pricing::line_price, product_kind::ProductKind};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cart_products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub cart_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub content_type: ProductKind,
    pub object_id: Uuid,
    pub qty: i32,
    #[sea_orm(column_type = "Decimal(Some((9, 2)))")]
    pub final_price: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::carts::Entity",
        from = "Column::CartId",
        to = "super::carts::Column::Id"
    )]
    Carts,
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id"
    )]
    Customers,
}

impl Related<super::carts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Carts.def()
    }
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

/// `final_price` is always `qty` times the referenced product's current price.
#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let kind = super::required(&self.content_type, "content_type")?;
        let object_id = super::required(&self.object_id, "object_id")?;
        let qty = super::required(&self.qty, "qty")?;
        if qty <= 0 {
            return Err(DbErr::Custom(format!("cart line qty must be positive, got {qty}")));
        }

        let product = kind
            .find_by_id(db, object_id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("{} {object_id}", kind.as_str())))?;

        self.final_price = Set(line_price(qty, product.price));
        Ok(self)
    }
}
