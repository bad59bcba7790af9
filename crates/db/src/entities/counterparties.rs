//! `SeaORM` Entity for counterparties table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "counterparties")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: String,
    pub name: String,
    pub tax_id: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total_settled: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub open_balance: Decimal,
    pub last_settlement_at: Option<Date>,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::financial_documents::Entity")]
    FinancialDocuments,
}

impl Related<super::financial_documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialDocuments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
