use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "snake_case")]
pub enum Region {
    #[sea_orm(string_value = "accra")]
    Accra,
    #[sea_orm(string_value = "ashanti")]
    Ashanti,
    #[sea_orm(string_value = "eastern")]
    Eastern,
    #[sea_orm(string_value = "central")]
    Central,
    #[sea_orm(string_value = "western")]
    Western,
    #[sea_orm(string_value = "volta")]
    Volta,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "snake_case")]
pub enum MobileMoneyProvider {
    #[sea_orm(string_value = "mtn")]
    Mtn,
    #[sea_orm(string_value = "vodafone")]
    Vodafone,
    #[sea_orm(string_value = "airteltigo")]
    AirtelTigo,
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(2))")]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[sea_orm(string_value = "en")]
    En,
    #[sea_orm(string_value = "nl")]
    Nl,
}

/// 参赛者（报名记录）
/// 由外部 CRUD 层创建和校验；核心只读取 is_active 与支付资格。
/// 不做物理删除，停用通过 is_active = false。
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "registrations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: NaiveDate,
    pub region: Region,
    pub mobile_money_provider: MobileMoneyProvider,
    pub cv_file: String,
    pub language: Language,
    pub registration_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub terms_accepted: bool,
}

impl Model {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
    #[sea_orm(has_many = "super::winners::Entity")]
    Winners,
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::winners::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Winners.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
