use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "snake_case")]
pub enum PrizeType {
    #[sea_orm(string_value = "job")]
    Job,
    #[sea_orm(string_value = "basic_income")]
    BasicIncome,
}

impl std::fmt::Display for PrizeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrizeType::Job => write!(f, "job"),
            PrizeType::BasicIncome => write!(f, "basic_income"),
        }
    }
}

/// 中奖记录，(registration_id, monthly_draw_id) 唯一
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "winners")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub registration_id: i64,
    pub monthly_draw_id: i64,
    pub prize_type: PrizeType,
    #[sea_orm(column_type = "Text")]
    pub prize_details: String,
    pub is_claimed: bool,
    pub claim_date: Option<DateTime<Utc>>,
    pub created_date: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::registrations::Entity",
        from = "Column::RegistrationId",
        to = "super::registrations::Column::Id"
    )]
    Registration,
    #[sea_orm(
        belongs_to = "super::monthly_draws::Entity",
        from = "Column::MonthlyDrawId",
        to = "super::monthly_draws::Column::Id"
    )]
    MonthlyDraw,
}

impl Related<super::registrations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Registration.def()
    }
}

impl Related<super::monthly_draws::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MonthlyDraw.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
