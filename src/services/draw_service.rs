use crate::entities::{DrawStatus, monthly_draw_entity as draws, winner_entity as winners};
use crate::error::{AppError, AppResult};
use crate::models::{DrawResponse, WinnerResponse};
use crate::utils::{current_month, first_of_month, format_month, month_label};
use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};

/// 每月抽奖状态机
///
/// 所有状态推进都是带条件的单条 UPDATE，靠 rows_affected 判断是否抢到这次推进，
/// 不做 "先读后写"。
#[derive(Clone)]
pub struct DrawService {
    pool: DatabaseConnection,
    minimum_participants: i32,
}

impl DrawService {
    pub fn new(pool: DatabaseConnection, minimum_participants: i32) -> Self {
        Self {
            pool,
            minimum_participants,
        }
    }

    /// 获取（不存在则创建）某月的抽奖
    ///
    /// 并发调用通过 `ON CONFLICT (draw_month) DO NOTHING` 收敛到同一行。
    pub async fn get_or_create<C: ConnectionTrait>(
        &self,
        db: &C,
        month: NaiveDate,
    ) -> Result<draws::Model, DbErr> {
        let month = first_of_month(month);

        let inserted = draws::Entity::insert(draws::ActiveModel {
            draw_month: Set(month),
            minimum_participants: Set(self.minimum_participants),
            current_participants: Set(0),
            status: Set(DrawStatus::Pending),
            winners_selected: Set(false),
            created_date: Set(Some(Utc::now())),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::column(draws::Column::DrawMonth)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

        if inserted > 0 {
            log::info!(
                "Created monthly draw for {} (minimum participants: {})",
                month_label(month),
                self.minimum_participants
            );
        }

        draws::Entity::find()
            .filter(draws::Column::DrawMonth.eq(month))
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("monthly draw {}", format_month(month))))
    }

    pub async fn find_by_month<C: ConnectionTrait>(
        &self,
        db: &C,
        month: NaiveDate,
    ) -> Result<Option<draws::Model>, DbErr> {
        draws::Entity::find()
            .filter(draws::Column::DrawMonth.eq(first_of_month(month)))
            .one(db)
            .await
    }

    /// 当月抽奖概况
    pub async fn current_draw(&self) -> AppResult<DrawResponse> {
        self.draw_for_month(current_month()).await
    }

    pub async fn draw_for_month(&self, month: NaiveDate) -> AppResult<DrawResponse> {
        let draw = self.get_or_create(&self.pool, month).await?;
        Ok(draw.into())
    }

    /// 参与人数原子 +1
    pub async fn increment_participants<C: ConnectionTrait>(
        &self,
        db: &C,
        draw_id: i64,
    ) -> Result<(), DbErr> {
        let res = draws::Entity::update_many()
            .col_expr(
                draws::Column::CurrentParticipants,
                Expr::col(draws::Column::CurrentParticipants).add(1),
            )
            .filter(draws::Column::Id.eq(draw_id))
            .exec(db)
            .await?;

        if res.rows_affected == 0 {
            return Err(DbErr::RecordNotFound(format!("monthly draw id {draw_id}")));
        }
        Ok(())
    }

    /// pending -> active，仅当人数已达下限
    ///
    /// 返回 true 表示本次调用完成了推进。
    pub async fn activate_if_threshold_met<C: ConnectionTrait>(
        &self,
        db: &C,
        draw_id: i64,
    ) -> Result<bool, DbErr> {
        let res = draws::Entity::update_many()
            .col_expr(draws::Column::Status, Expr::value(DrawStatus::Active))
            .filter(draws::Column::Id.eq(draw_id))
            .filter(
                draws::Column::Status.is_in(DrawStatus::sources_of(DrawStatus::Active)),
            )
            .filter(
                Expr::col(draws::Column::CurrentParticipants)
                    .gte(Expr::col(draws::Column::MinimumParticipants)),
            )
            .exec(db)
            .await?;

        Ok(res.rows_affected == 1)
    }

    /// active -> completed，同时置 winners_selected
    ///
    /// 返回 false 说明其他执行者已经完成了开奖（或状态不对）。
    pub async fn mark_completed<C: ConnectionTrait>(
        &self,
        db: &C,
        draw_id: i64,
    ) -> Result<bool, DbErr> {
        let res = draws::Entity::update_many()
            .col_expr(draws::Column::WinnersSelected, Expr::value(true))
            .col_expr(draws::Column::Status, Expr::value(DrawStatus::Completed))
            .filter(draws::Column::Id.eq(draw_id))
            .filter(draws::Column::WinnersSelected.eq(false))
            .filter(
                draws::Column::Status.is_in(DrawStatus::sources_of(DrawStatus::Completed)),
            )
            .exec(db)
            .await?;

        Ok(res.rows_affected == 1)
    }

    /// 取消抽奖（pending / active -> cancelled）
    pub async fn cancel_draw(&self, month: NaiveDate) -> AppResult<draws::Model> {
        let month = first_of_month(month);

        let res = draws::Entity::update_many()
            .col_expr(draws::Column::Status, Expr::value(DrawStatus::Cancelled))
            .filter(draws::Column::DrawMonth.eq(month))
            .filter(draws::Column::WinnersSelected.eq(false))
            .filter(
                draws::Column::Status.is_in(DrawStatus::sources_of(DrawStatus::Cancelled)),
            )
            .exec(&self.pool)
            .await?;

        let draw = self
            .find_by_month(&self.pool, month)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No draw found for {}", month_label(month))))?;

        if res.rows_affected == 0 {
            return Err(AppError::ValidationError(format!(
                "Draw for {} is {} and cannot be cancelled",
                month_label(month),
                draw.status
            )));
        }

        log::info!("Cancelled draw for {}", month_label(month));
        Ok(draw)
    }

    /// 参赛者的全部中奖记录，新的在前
    pub async fn winners_for_registration(
        &self,
        registration_id: i64,
    ) -> AppResult<Vec<WinnerResponse>> {
        let rows = winners::Entity::find()
            .filter(winners::Column::RegistrationId.eq(registration_id))
            .find_also_related(draws::Entity)
            .order_by_desc(winners::Column::Id)
            .all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
