use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Alias, ArrayType, Nullable, ValueType, ValueTypeErr};
use sea_orm::{ColIdx, TryGetError, TryGetable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_id: Uuid,
    pub cart_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: Option<String>,
    pub status: OrderStatus,
    pub buying_type: BuyingType,
    pub comment: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((9, 2)))")]
    pub final_price: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub order_date: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id"
    )]
    Customers,
    #[sea_orm(
        belongs_to = "super::carts::Entity",
        from = "Column::CartId",
        to = "super::carts::Column::Id"
    )]
    Carts,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl Related<super::carts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Carts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "new")]
    New,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "is_ready")]
    #[serde(rename = "is_ready")]
    Ready,
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// `self` is a keyword, so `DeriveActiveEnum` cannot generate this mapping;
/// the stored values are spelled out in the `ActiveEnum` impl below.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, Serialize, Deserialize, ToSchema)]
pub enum BuyingType {
    #[default]
    #[serde(rename = "self")]
    SelfPickup,
    #[serde(rename = "delivery")]
    Delivery,
}

impl BuyingType {
    pub fn as_str(self) -> &'static str {
        match self {
            BuyingType::SelfPickup => "self",
            BuyingType::Delivery => "delivery",
        }
    }
}

impl ActiveEnum for BuyingType {
    type Value = String;
    type ValueVec = Vec<String>;

    fn name() -> DynIden {
        SeaRc::new(Alias::new("buying_type"))
    }

    fn to_value(&self) -> String {
        self.as_str().to_owned()
    }

    fn try_from_value(v: &String) -> Result<Self, DbErr> {
        match v.as_str() {
            "self" => Ok(BuyingType::SelfPickup),
            "delivery" => Ok(BuyingType::Delivery),
            other => Err(DbErr::Type(format!(
                "unexpected value for BuyingType enum: {other}"
            ))),
        }
    }

    fn db_type() -> ColumnDef {
        ColumnType::Text.def()
    }
}

impl From<BuyingType> for Value {
    fn from(value: BuyingType) -> Self {
        value.to_value().into()
    }
}

impl TryGetable for BuyingType {
    fn try_get_by<I: ColIdx>(res: &QueryResult, idx: I) -> Result<Self, TryGetError> {
        let value = String::try_get_by(res, idx)?;
        BuyingType::try_from_value(&value).map_err(TryGetError::DbErr)
    }
}

impl ValueType for BuyingType {
    fn try_from(v: Value) -> Result<Self, ValueTypeErr> {
        let value = <String as ValueType>::try_from(v)?;
        BuyingType::try_from_value(&value).map_err(|_| ValueTypeErr)
    }

    fn type_name() -> String {
        <String as ValueType>::type_name()
    }

    fn array_type() -> ArrayType {
        <String as ValueType>::array_type()
    }

    fn column_type() -> ColumnType {
        ColumnType::Text
    }

    fn enum_type_name() -> Option<&'static str> {
        Some("BuyingType")
    }
}

impl Nullable for BuyingType {
    fn null() -> Value {
        <String as Nullable>::null()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buying_type_round_trips_stored_values() {
        for (kind, stored) in [
            (BuyingType::SelfPickup, "self"),
            (BuyingType::Delivery, "delivery"),
        ] {
            assert_eq!(kind.to_value(), stored);
            assert_eq!(BuyingType::try_from_value(&stored.to_string()).unwrap(), kind);
            let value: Value = kind.into();
            assert_eq!(<BuyingType as ValueType>::try_from(value).unwrap(), kind);
            assert_eq!(serde_json::to_string(&kind).unwrap(), format!("\"{stored}\""));
        }
        assert!(matches!(
            BuyingType::try_from_value(&"courier".to_string()),
            Err(DbErr::Type(_))
        ));
    }

    #[test]
    fn order_status_uses_stored_names() {
        assert_eq!(OrderStatus::Ready.to_value(), "is_ready");
    }
}
