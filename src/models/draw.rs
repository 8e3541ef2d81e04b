use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{
    DrawStatus, PrizeType, monthly_draw_entity as draw_entity, winner_entity,
};
use crate::utils::{format_month, month_label};

/// 月份查询参数，缺省为当月
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct MonthQuery {
    /// `YYYY-MM`
    pub month: Option<String>,
}

/// 每月抽奖概况
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DrawResponse {
    pub id: i64,
    /// `YYYY-MM`
    pub month: String,
    /// e.g. "October 2025"
    pub label: String,
    pub status: DrawStatus,
    pub current_participants: i32,
    pub minimum_participants: i32,
    /// 参与进度百分比，封顶 100
    pub progress_percent: f64,
    pub is_ready: bool,
    pub winners_selected: bool,
}

impl From<draw_entity::Model> for DrawResponse {
    fn from(m: draw_entity::Model) -> Self {
        DrawResponse {
            id: m.id,
            month: format_month(m.draw_month),
            label: month_label(m.draw_month),
            status: m.status,
            current_participants: m.current_participants,
            minimum_participants: m.minimum_participants,
            progress_percent: m.progress_percent(),
            is_ready: m.is_ready_for_draw(),
            winners_selected: m.winners_selected,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EligibilityResponse {
    pub registration_id: i64,
    pub month: String,
    pub eligible: bool,
}

/// 参赛者的中奖记录
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WinnerResponse {
    pub id: i64,
    pub month: Option<String>,
    pub prize_type: PrizeType,
    pub prize_details: String,
    pub is_claimed: bool,
    pub claim_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<(winner_entity::Model, Option<draw_entity::Model>)> for WinnerResponse {
    fn from((w, draw): (winner_entity::Model, Option<draw_entity::Model>)) -> Self {
        WinnerResponse {
            id: w.id,
            month: draw.map(|d| format_month(d.draw_month)),
            prize_type: w.prize_type,
            prize_details: w.prize_details,
            is_claimed: w.is_claimed,
            claim_date: w.claim_date,
            created_at: w.created_date.unwrap_or_else(Utc::now),
        }
    }
}

/// 一次开奖中的单个中奖者
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WinnerLine {
    pub registration_id: i64,
    pub full_name: String,
    pub email: String,
    pub prize_type: PrizeType,
    /// 职位标题或 "Basic Income"
    pub prize_name: String,
    pub prize_details: String,
}

/// 开奖结果汇总（dry run 与正式开奖共用）
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SelectionSummary {
    pub month: String,
    pub dry_run: bool,
    pub eligible_participants: usize,
    pub job_winners_selected: usize,
    pub income_winners_selected: usize,
    pub winners: Vec<WinnerLine>,
}

impl SelectionSummary {
    pub fn total_winners(&self) -> usize {
        self.job_winners_selected + self.income_winners_selected
    }
}
