use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter, Iterable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 每月抽奖状态
///
/// pending -> active -> completed，cancelled 可从 pending / active 进入，
/// completed 与 cancelled 为终态。
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "snake_case")]
pub enum DrawStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl DrawStatus {
    pub fn can_transition_to(self, next: DrawStatus) -> bool {
        match (self, next) {
            (DrawStatus::Pending, DrawStatus::Active) => true,
            (DrawStatus::Active, DrawStatus::Completed) => true,
            (DrawStatus::Pending | DrawStatus::Active, DrawStatus::Cancelled) => true,
            _ => false,
        }
    }

    /// 可以推进到 next 的全部状态，用作条件更新的过滤集合
    pub fn sources_of(next: DrawStatus) -> Vec<DrawStatus> {
        DrawStatus::iter()
            .filter(|status| status.can_transition_to(next))
            .collect()
    }
}

impl std::fmt::Display for DrawStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawStatus::Pending => write!(f, "pending"),
            DrawStatus::Active => write!(f, "active"),
            DrawStatus::Completed => write!(f, "completed"),
            DrawStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// 每月抽奖
/// - draw_month: 当月 1 号，唯一
/// - current_participants: 冗余计数，只能通过存储层原子自增修改
/// - winners_selected: 置 true 后 status 必为 completed，且不可回退
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "monthly_draws")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub draw_month: NaiveDate,
    pub minimum_participants: i32,
    pub current_participants: i32,
    pub status: DrawStatus,
    pub winners_selected: bool,
    pub created_date: Option<DateTime<Utc>>,
}

impl Model {
    /// 人数达标且处于 active 才可开奖；手动把 status 改成 active 不足以绕过人数检查
    pub fn is_ready_for_draw(&self) -> bool {
        self.status == DrawStatus::Active && self.current_participants >= self.minimum_participants
    }

    /// 参与进度（百分比，封顶 100）
    pub fn progress_percent(&self) -> f64 {
        if self.minimum_participants <= 0 {
            return 100.0;
        }
        let pct = self.current_participants as f64 / self.minimum_participants as f64 * 100.0;
        pct.min(100.0)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::winners::Entity")]
    Winners,
}

impl Related<super::winners::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Winners.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
