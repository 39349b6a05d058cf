use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::{QuerySelect, Set};

use crate::pricing::CartTotals;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "carts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Option<Uuid>,
    pub anonymous_token: Option<Uuid>,
    pub for_anonymous_user: bool,
    pub in_order: bool,
    pub total_products: i32,
    #[sea_orm(column_type = "Decimal(Some((9, 2)))")]
    pub final_price: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::OwnerId",
        to = "super::customers::Column::Id"
    )]
    Customers,
    #[sea_orm(has_many = "super::cart_products::Entity")]
    CartProducts,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl Related<super::cart_products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartProducts.def()
    }
}

/// Every save recomputes `total_products` and `final_price` from the stored
/// lines before the row is written.
#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let totals = match super::present(&self.id) {
            Some(cart_id) => {
                let prices = super::cart_products::Entity::find()
                    .select_only()
                    .column(super::cart_products::Column::FinalPrice)
                    .filter(super::cart_products::Column::CartId.eq(cart_id))
                    .into_tuple::<Decimal>()
                    .all(db)
                    .await?;
                CartTotals::from_line_prices(prices)
            }
            None => CartTotals::empty(),
        };

        self.total_products = Set(totals.total_products);
        self.final_price = Set(totals.final_price);
        if !insert {
            self.updated_at = Set(chrono::Utc::now().into());
        }
        Ok(self)
    }
}
