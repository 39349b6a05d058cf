use sea_orm::{ActiveValue, DbErr, Value};

pub mod audit_logs;
pub mod cart_products;
pub mod carts;
pub mod categories;
pub mod customers;
pub mod notebooks;
pub mod orders;
pub mod product_slugs;
pub mod smartphones;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use cart_products::Entity as CartProducts;
pub use carts::Entity as Carts;
pub use categories::Entity as Categories;
pub use customers::Entity as Customers;
pub use notebooks::Entity as Notebooks;
pub use orders::Entity as Orders;
pub use product_slugs::Entity as ProductSlugs;
pub use smartphones::Entity as Smartphones;
pub use users::Entity as Users;

/// Value of an active field that is either set or loaded from the row.
pub(crate) fn present<V>(value: &ActiveValue<V>) -> Option<V>
where
    V: Into<Value> + Clone,
{
    match value {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => Some(v.clone()),
        ActiveValue::NotSet => None,
    }
}

pub(crate) fn required<V>(value: &ActiveValue<V>, field: &str) -> Result<V, DbErr>
where
    V: Into<Value> + Clone,
{
    present(value).ok_or_else(|| DbErr::Custom(format!("{field} must be set before saving")))
}
