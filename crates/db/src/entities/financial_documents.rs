//! `SeaORM` Entity for financial_documents table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "financial_documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: String,
    #[sea_orm(unique)]
    pub numero: String,
    pub counterparty_id: Option<Uuid>,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub category: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub fiscal_reference: Option<String>,
    pub issue_date: Date,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub settled_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total_interest: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total_fine: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total_discount: Decimal,
    pub status: String,
    pub next_due_date: Option<Date>,
    #[sea_orm(column_type = "JsonBinary")]
    pub installments: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub history: Json,
    pub cancelled: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<Uuid>,
    pub cancelled_at: Option<DateTimeWithTimeZone>,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_by: Option<Uuid>,
    pub updated_at: DateTimeWithTimeZone,
    pub version: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::counterparties::Entity",
        from = "Column::CounterpartyId",
        to = "super::counterparties::Column::Id"
    )]
    Counterparties,
}

impl Related<super::counterparties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Counterparties.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
