use crate::entities::{
    PaymentStatus, monthly_draw_entity as draws, payment_entity as payments,
    registration_entity as registrations,
};
use crate::error::{AppError, AppResult};
use crate::models::EligibilityResponse;
use crate::services::DrawService;
use crate::utils::{first_of_month, format_month, month_label};
use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

/// 抽奖资格
///
/// 某月有资格 = 参赛者 is_active 且存在该月 status = success 的支付。
/// 计数只在支付首次成功时 +1，由调用方保证（见 PaymentService::confirm_success）。
#[derive(Clone)]
pub struct EligibilityService {
    pool: DatabaseConnection,
    draw_service: DrawService,
}

impl EligibilityService {
    pub fn new(pool: DatabaseConnection, draw_service: DrawService) -> Self {
        Self { pool, draw_service }
    }

    /// 记一次成功付费的参赛：取/建当月抽奖 -> 人数原子 +1 -> 达标则激活
    pub async fn record_paid_entry<C: ConnectionTrait>(
        &self,
        db: &C,
        month: NaiveDate,
    ) -> Result<draws::Model, DbErr> {
        let draw = self.draw_service.get_or_create(db, month).await?;
        self.draw_service.increment_participants(db, draw.id).await?;
        let activated = self
            .draw_service
            .activate_if_threshold_met(db, draw.id)
            .await?;

        let draw = draws::Entity::find_by_id(draw.id)
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("monthly draw id {}", draw.id)))?;

        if activated {
            log::info!(
                "Draw for {} reached {} participants and is now active",
                month_label(draw.draw_month),
                draw.current_participants
            );
        }

        Ok(draw)
    }

    /// 某月全部有资格的参赛者（去重，按 id 升序）
    pub async fn eligible_entrants<C: ConnectionTrait>(
        &self,
        db: &C,
        month: NaiveDate,
    ) -> Result<Vec<registrations::Model>, DbErr> {
        registrations::Entity::find()
            .inner_join(payments::Entity)
            .filter(registrations::Column::IsActive.eq(true))
            .filter(payments::Column::Status.eq(PaymentStatus::Success))
            .filter(payments::Column::MonthPaidFor.eq(first_of_month(month)))
            .distinct()
            .order_by_asc(registrations::Column::Id)
            .all(db)
            .await
    }

    pub async fn is_eligible(&self, registration_id: i64, month: NaiveDate) -> AppResult<bool> {
        let registration = registrations::Entity::find_by_id(registration_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Registration {registration_id}")))?;

        if !registration.is_active {
            return Ok(false);
        }

        let paid = payments::Entity::find()
            .filter(payments::Column::RegistrationId.eq(registration_id))
            .filter(payments::Column::Status.eq(PaymentStatus::Success))
            .filter(payments::Column::MonthPaidFor.eq(first_of_month(month)))
            .count(&self.pool)
            .await?;

        Ok(paid > 0)
    }

    pub async fn eligibility(
        &self,
        registration_id: i64,
        month: NaiveDate,
    ) -> AppResult<EligibilityResponse> {
        let eligible = self.is_eligible(registration_id, month).await?;
        Ok(EligibilityResponse {
            registration_id,
            month: format_month(first_of_month(month)),
            eligible,
        })
    }
}
